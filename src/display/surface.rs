use iced::Size;
use image::DynamicImage;

/// Something the image display can render into.
///
/// The display drives it in a fixed order: `load` once per image, then
/// `fit_to_size` on every re-fit, optionally followed by
/// `apply_zoom_transform` on the fitted result.
pub trait Surface {
    /// Replace the source image
    fn load(&mut self, image: DynamicImage);

    /// Render the source scaled to fit `viewport`, keeping its aspect ratio
    fn fit_to_size(&mut self, viewport: Size);

    /// Scale the last fitted render uniformly by `factor`
    fn apply_zoom_transform(&mut self, factor: f32);

    /// Drop everything; the display shows its placeholder
    fn clear(&mut self);
}

/// Largest size with the aspect ratio of `natural` that fits in `viewport`.
///
/// Each side is at least one pixel. Returns `None` when either the image or
/// the viewport is empty.
pub fn fit_within(natural: (u32, u32), viewport: Size) -> Option<(u32, u32)> {
    let (width, height) = natural;
    if width == 0 || height == 0 || viewport.width < 1.0 || viewport.height < 1.0 {
        return None;
    }

    let scale = (viewport.width / width as f32).min(viewport.height / height as f32);
    let fitted_width = ((width as f32 * scale).round() as u32).clamp(1, viewport.width as u32);
    let fitted_height = ((height as f32 * scale).round() as u32).clamp(1, viewport.height as u32);

    Some((fitted_width, fitted_height))
}
