/// iced adapters for the image display
///
/// - `surface.rs` renders fitted/zoomed frames into an image handle
/// - `canvas.rs` turns pointer and wheel events into display inputs and
///   draws the selection band and placeholder border

pub mod canvas;
pub mod surface;

pub use canvas::SelectionOverlay;
pub use surface::FrameSurface;
