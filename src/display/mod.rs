/// Image display module
///
/// Widget logic for viewing a single image, independent of the GUI toolkit:
/// - Fit-to-viewport rendering through a `Surface` (surface.rs)
/// - Modifier + wheel zoom with a 1.0 floor (zoom.rs)
/// - Left-drag rubber-band selection (selection.rs)
/// - Notifications to registered listeners (events.rs)
///
/// The iced adapter lives in `crate::ui`.

pub mod events;
pub mod selection;
pub mod surface;
pub mod zoom;

pub use events::{DisplayEvent, EventBus, ListenerId};
pub use selection::RubberBand;
pub use surface::{fit_within, Surface};
pub use zoom::Zoom;

use iced::mouse::Button;
use iced::{Point, Rectangle, Size};
use image::GenericImageView;
use std::path::{Path, PathBuf};

use crate::error::Result;

/// Raw input fed to the display by the toolkit adapter
#[derive(Debug, Clone, PartialEq)]
pub enum Input {
    /// Vertical wheel movement; positive is away from the user
    Wheel { delta_y: f32, modifier_held: bool },
    Pressed { button: Button, position: Point },
    Moved(Point),
    Released { button: Button, position: Point },
    Resized(Size),
}

/// Pan/zoom/select image view driving a rendering [`Surface`]
#[derive(Debug)]
pub struct ImageDisplay<S> {
    surface: S,
    /// Last successfully loaded file
    file: Option<PathBuf>,
    /// Natural (width, height) of `file`
    natural_size: Option<(u32, u32)>,
    /// Whether the surface currently holds an image
    displayed: bool,
    /// Placeholder border (shown after a bad path)
    bordered: bool,
    zoom: Zoom,
    rubber_band: Option<RubberBand>,
    viewport: Size,
    events: EventBus,
}

impl<S: Surface> ImageDisplay<S> {
    pub fn new(surface: S) -> Self {
        Self::with_zoom_step(surface, zoom::DEFAULT_ZOOM_STEP)
    }

    pub fn with_zoom_step(surface: S, zoom_step: f32) -> Self {
        Self {
            surface,
            file: None,
            natural_size: None,
            displayed: false,
            bordered: false,
            zoom: Zoom::new(zoom_step),
            rubber_band: None,
            viewport: Size::ZERO,
            events: EventBus::new(),
        }
    }

    /// Show the image at `path` and emit [`DisplayEvent::ImageAdded`].
    ///
    /// Returns `Ok(false)` without emitting when `path` is not a file; the
    /// display is cleared to its bordered placeholder in that case.
    pub fn set_image(&mut self, path: impl AsRef<Path>) -> Result<bool> {
        let path = path.as_ref();
        let loaded = self.set_image_no_signal(path)?;
        if loaded {
            self.events.emit(DisplayEvent::ImageAdded(path.to_path_buf()));
        }
        Ok(loaded)
    }

    /// Same as [`set_image`](Self::set_image) but never emits
    pub fn set_image_no_signal(&mut self, path: impl AsRef<Path>) -> Result<bool> {
        let path = path.as_ref();

        if !path.is_file() {
            tracing::debug!("Not a file, showing placeholder: {}", path.display());
            self.surface.clear();
            self.displayed = false;
            self.bordered = true;
            return Ok(false);
        }
        self.bordered = false;

        let image = image::open(path)?;
        let (width, height) = image.dimensions();
        tracing::info!("Loaded {} ({}x{})", path.display(), width, height);

        self.file = Some(path.to_path_buf());
        self.natural_size = Some((width, height));
        self.zoom.reset();

        self.surface.load(image);
        self.surface.fit_to_size(self.viewport);
        self.displayed = true;

        Ok(true)
    }

    /// Path of the last successfully loaded image
    pub fn image(&self) -> Option<&Path> {
        self.file.as_deref()
    }

    /// Natural (width, height) of the last successfully loaded image
    pub fn image_size(&self) -> Option<(u32, u32)> {
        self.natural_size
    }

    pub fn has_image(&self) -> bool {
        self.displayed
    }

    pub fn is_bordered(&self) -> bool {
        self.bordered
    }

    pub fn zoom_factor(&self) -> f32 {
        self.zoom.factor()
    }

    pub fn viewport(&self) -> Size {
        self.viewport
    }

    /// Normalized rectangle of the rubber band being dragged, if any
    pub fn selection(&self) -> Option<Rectangle> {
        self.rubber_band.map(|band| band.rect())
    }

    pub fn surface(&self) -> &S {
        &self.surface
    }

    pub fn subscribe(&mut self, listener: impl FnMut(&DisplayEvent) + 'static) -> ListenerId {
        self.events.subscribe(listener)
    }

    pub fn unsubscribe(&mut self, id: ListenerId) -> bool {
        self.events.unsubscribe(id)
    }

    /// Route an input to its handler. Returns whether the input was consumed.
    pub fn handle(&mut self, input: Input) -> Result<bool> {
        match input {
            Input::Wheel {
                delta_y,
                modifier_held,
            } => self.on_wheel(delta_y, modifier_held),
            Input::Pressed { button, position } => Ok(self.on_press(button, position)),
            Input::Moved(position) => Ok(self.on_move(position)),
            Input::Released { button, position } => Ok(self.on_release(button, position)),
            Input::Resized(size) => {
                self.on_resize(size);
                Ok(true)
            }
        }
    }

    /// Zoom on modifier + wheel. Plain scrolling is left to the caller (panning).
    pub fn on_wheel(&mut self, delta_y: f32, modifier_held: bool) -> Result<bool> {
        if !modifier_held || delta_y == 0.0 {
            return Ok(false);
        }
        if !self.displayed {
            return Ok(true);
        }

        if delta_y > 0.0 {
            self.zoom.zoom_in();
        } else {
            self.zoom.zoom_out();
        }

        // Back at neutral: reload instead of applying a unit transform so
        // repeated resampling doesn't leave the image slightly cropped
        if self.zoom.is_neutral() {
            if let Some(file) = self.file.clone() {
                self.set_image_no_signal(file)?;
            }
            return Ok(true);
        }

        let factor = self.zoom.factor();
        tracing::debug!("Zoom factor {:.3}", factor);
        self.surface.fit_to_size(self.viewport);
        self.surface.apply_zoom_transform(factor);

        Ok(true)
    }

    /// Re-fit to the new viewport. The zoom level is kept but not reapplied.
    pub fn on_resize(&mut self, size: Size) {
        self.viewport = size;
        if self.displayed {
            self.surface.fit_to_size(size);
        }
        self.events.emit(DisplayEvent::Resized(size));
    }

    pub fn on_press(&mut self, button: Button, position: Point) -> bool {
        match button {
            Button::Right => {
                self.events.emit(DisplayEvent::ClearSelection);
                true
            }
            Button::Left => {
                self.rubber_band = Some(RubberBand::new(position));
                true
            }
            _ => false,
        }
    }

    pub fn on_move(&mut self, position: Point) -> bool {
        match self.rubber_band.as_mut() {
            Some(band) => {
                band.update(position);
                true
            }
            None => false,
        }
    }

    pub fn on_release(&mut self, button: Button, position: Point) -> bool {
        if button != Button::Left {
            return false;
        }
        let Some(band) = self.rubber_band.take() else {
            return false;
        };

        tracing::debug!("Selection captured from {:?} to {:?}", band.origin, position);
        self.events
            .emit(DisplayEvent::RectangleCaptured(band.origin, position));
        true
    }
}
