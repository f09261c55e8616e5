/// State management module
///
/// This module handles persistent application state:
/// - The catalog database connector (catalog.rs)
/// - Shared record types (data.rs)

pub mod catalog;
pub mod data;

pub use catalog::Catalog;
pub use data::CatalogRecord;
