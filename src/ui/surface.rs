use iced::widget::image::Handle;
use iced::Size;
use image::{imageops::FilterType, DynamicImage, GenericImageView, RgbaImage};

use crate::display::{fit_within, Surface};

/// Resampling filter for both fitting and zooming
const FILTER: FilterType = FilterType::Triangle;

/// Upper bound on a zoomed frame (4096 x 4096 RGBA, 64 MiB)
pub const MAX_FRAME_PIXELS: u64 = 4096 * 4096;

/// CPU-rendered surface for the iced image widget.
///
/// Keeps the decoded source and the last rendered frame; every render
/// publishes a fresh `Handle` for the view.
#[derive(Debug, Default)]
pub struct FrameSurface {
    source: Option<DynamicImage>,
    frame: Option<RgbaImage>,
    handle: Option<Handle>,
}

impl FrameSurface {
    pub fn new() -> Self {
        Self::default()
    }

    /// Handle for the last rendered frame
    pub fn handle(&self) -> Option<&Handle> {
        self.handle.as_ref()
    }

    /// Pixel size of the last rendered frame
    pub fn frame_size(&self) -> Option<Size> {
        self.frame
            .as_ref()
            .map(|frame| Size::new(frame.width() as f32, frame.height() as f32))
    }

    pub fn frame(&self) -> Option<&RgbaImage> {
        self.frame.as_ref()
    }

    fn publish(&mut self, frame: Option<RgbaImage>) {
        self.handle = frame
            .as_ref()
            .map(|frame| Handle::from_rgba(frame.width(), frame.height(), frame.as_raw().clone()));
        self.frame = frame;
    }
}

impl Surface for FrameSurface {
    fn load(&mut self, image: DynamicImage) {
        self.source = Some(image);
        self.publish(None);
    }

    fn fit_to_size(&mut self, viewport: Size) {
        let frame = self.source.as_ref().and_then(|source| {
            let (width, height) = fit_within(source.dimensions(), viewport)?;
            Some(source.resize_exact(width, height, FILTER).to_rgba8())
        });
        self.publish(frame);
    }

    fn apply_zoom_transform(&mut self, factor: f32) {
        let Some(frame) = self.frame.take() else {
            return;
        };

        let Some((width, height)) = zoomed_size(frame.dimensions(), factor) else {
            self.publish(Some(frame));
            return;
        };
        let zoomed = image::imageops::resize(&frame, width, height, FILTER);
        self.publish(Some(zoomed));
    }

    fn clear(&mut self) {
        self.source = None;
        self.publish(None);
    }
}

/// Size of a frame scaled by `factor`, shrunk uniformly to stay within
/// [`MAX_FRAME_PIXELS`]. `None` for a factor that can't be applied.
fn zoomed_size(frame: (u32, u32), factor: f32) -> Option<(u32, u32)> {
    if !factor.is_finite() || factor <= 0.0 {
        return None;
    }

    let width = frame.0 as f64 * factor as f64;
    let height = frame.1 as f64 * factor as f64;
    let area = width * height;
    let shrink = if area > MAX_FRAME_PIXELS as f64 {
        (MAX_FRAME_PIXELS as f64 / area).sqrt()
    } else {
        1.0
    };

    let width = ((width * shrink).floor() as u32).max(1);
    let height = ((height * shrink).floor() as u32).max(1);
    Some((width, height))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn loaded(width: u32, height: u32) -> FrameSurface {
        let mut surface = FrameSurface::new();
        surface.load(DynamicImage::new_rgb8(width, height));
        surface
    }

    #[test]
    fn test_fit_keeps_aspect_ratio() {
        let mut surface = loaded(400, 200);
        surface.fit_to_size(Size::new(300.0, 300.0));

        assert_eq!(surface.frame_size(), Some(Size::new(300.0, 150.0)));
        assert!(surface.handle().is_some());
    }

    #[test]
    fn test_zoom_scales_fitted_frame() {
        let mut surface = loaded(400, 200);
        surface.fit_to_size(Size::new(200.0, 200.0));
        surface.apply_zoom_transform(1.5);

        assert_eq!(surface.frame_size(), Some(Size::new(300.0, 150.0)));
    }

    #[test]
    fn test_zoomed_size_is_capped() {
        let (width, height) = zoomed_size((1600, 1000), 8.0).unwrap();

        assert!(width as u64 * height as u64 <= MAX_FRAME_PIXELS);
        // Aspect ratio survives the cap
        assert!((width as f32 / height as f32 - 1.6).abs() < 0.01);
        // Small frames are scaled as asked
        assert_eq!(zoomed_size((100, 50), 2.0), Some((200, 100)));
    }

    #[test]
    fn test_unusable_factor_keeps_frame() {
        let mut surface = loaded(40, 20);
        surface.fit_to_size(Size::new(40.0, 20.0));
        surface.apply_zoom_transform(f32::INFINITY);
        surface.apply_zoom_transform(f32::NAN);

        assert_eq!(surface.frame_size(), Some(Size::new(40.0, 20.0)));
    }

    #[test]
    fn test_refit_discards_zoom() {
        let mut surface = loaded(100, 100);
        surface.fit_to_size(Size::new(50.0, 50.0));
        surface.apply_zoom_transform(2.0);
        surface.fit_to_size(Size::new(50.0, 50.0));

        assert_eq!(surface.frame_size(), Some(Size::new(50.0, 50.0)));
    }

    #[test]
    fn test_empty_viewport_renders_nothing() {
        let mut surface = loaded(10, 10);
        surface.fit_to_size(Size::ZERO);
        surface.apply_zoom_transform(2.0);

        assert_eq!(surface.frame_size(), None);
        assert!(surface.handle().is_none());
    }

    #[test]
    fn test_clear_drops_everything() {
        let mut surface = loaded(10, 10);
        surface.fit_to_size(Size::new(10.0, 10.0));
        surface.clear();
        surface.fit_to_size(Size::new(10.0, 10.0));

        assert!(surface.frame().is_none());
        assert!(surface.handle().is_none());
    }
}
