/// Shared data structures for the catalog
///
/// These structs represent the rows that flow between
/// the database layer and the UI layer.

/// One entry in the catalog
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CatalogRecord {
    /// Path of the image file; callers treat it as the key
    pub filename: String,
    pub title: String,
    pub artist: String,
}

impl CatalogRecord {
    pub fn new(
        filename: impl Into<String>,
        title: impl Into<String>,
        artist: impl Into<String>,
    ) -> Self {
        Self {
            filename: filename.into(),
            title: title.into(),
            artist: artist.into(),
        }
    }
}
