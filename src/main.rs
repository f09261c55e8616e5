use iced::widget::scrollable::{Direction, Scrollbar};
use iced::widget::{
    button, canvas, column, container, image as picture, row, scrollable, stack, text, Space,
};
use iced::{window, Alignment, Element, Length, Size, Subscription, Task, Theme};
use rfd::FileDialog;
use std::cell::RefCell;
use std::path::{Path, PathBuf};
use std::rc::Rc;
use walkdir::WalkDir;

use omen::display::{DisplayEvent, ImageDisplay, Input};
use omen::settings::Settings;
use omen::state::Catalog;
use omen::ui::{FrameSurface, SelectionOverlay};

/// Height taken by the toolbar and status bar around the display
const CHROME_HEIGHT: f32 = 96.0;

/// Extensions offered in the file picker and picked up by folder imports
const IMAGE_EXTENSIONS: [&str; 8] = ["png", "jpg", "jpeg", "gif", "bmp", "tif", "tiff", "webp"];

/// Result of a folder import operation
#[derive(Debug, Clone)]
struct ImportResult {
    imported_count: usize,
    skipped_count: usize,
}

/// Main application state
struct Omen {
    settings: Settings,
    display: ImageDisplay<FrameSurface>,
    /// The catalog database
    catalog: Catalog,
    /// Events delivered by the display's listener, drained in `update`
    inbox: Rc<RefCell<Vec<DisplayEvent>>>,
    /// Status message to display to the user
    status: String,
}

/// Application messages (events)
#[derive(Debug, Clone)]
enum Message {
    /// User clicked "Open Image"
    OpenImage,
    /// User clicked "Import Folder"
    ImportFolder,
    /// Background import completed
    ImportComplete(Result<ImportResult, String>),
    /// Add the shown image to the catalog
    Remember,
    /// Remove the shown image from the catalog
    Forget,
    /// Pointer/wheel input from the overlay
    Display(Input),
    WindowResized(Size),
}

impl Omen {
    /// Create a new instance of the application
    fn new(settings: Settings) -> (Self, Task<Message>) {
        let mut display =
            ImageDisplay::with_zoom_step(FrameSurface::new(), settings.zoom_step);

        let inbox = Rc::new(RefCell::new(Vec::new()));
        let sink = inbox.clone();
        display.subscribe(move |event| sink.borrow_mut().push(event.clone()));
        display.on_resize(viewport_for(window::Settings::default().size));

        // The app still works as a viewer without its catalog
        let mut catalog = Catalog::new(&settings.db_path);
        let status = match catalog.connect().and_then(|_| catalog.count()) {
            Ok(count) => format!("Ready. {} files in catalog.", count),
            Err(err) => {
                tracing::error!("Catalog unavailable: {}", err);
                format!("Catalog unavailable: {}", err)
            }
        };

        let mut app = Omen {
            settings,
            display,
            catalog,
            inbox,
            status,
        };
        app.drain_events();

        (app, Task::none())
    }

    /// Handle application messages and update state
    fn update(&mut self, message: Message) -> Task<Message> {
        let task = match message {
            Message::OpenImage => {
                let file = FileDialog::new()
                    .set_title("Open Image")
                    .add_filter("Images", &IMAGE_EXTENSIONS)
                    .pick_file();

                if let Some(path) = file {
                    if let Err(err) = self.display.set_image(&path) {
                        tracing::error!("Failed to open {}: {}", path.display(), err);
                        self.status = format!("Could not open {}: {}", path.display(), err);
                    }
                }
                Task::none()
            }
            Message::ImportFolder => {
                let folder = FileDialog::new()
                    .set_title("Select Folder with Images")
                    .pick_folder();

                if let Some(folder_path) = folder {
                    self.status = format!("Importing from {}...", folder_path.display());
                    let db_path = self.catalog.path().to_path_buf();

                    return Task::perform(
                        import_folder_async(folder_path, db_path),
                        Message::ImportComplete,
                    );
                }
                Task::none()
            }
            Message::ImportComplete(Ok(result)) => {
                self.status = format!(
                    "Import complete. Added {} files, skipped {} already catalogued.",
                    result.imported_count, result.skipped_count
                );
                Task::none()
            }
            Message::ImportComplete(Err(err)) => {
                self.status = format!("Import failed: {}", err);
                Task::none()
            }
            Message::Remember => {
                if let Some(path) = self.display.image().map(Path::to_path_buf) {
                    let filename = path.to_string_lossy();
                    let result = self.catalog.get(&filename).and_then(|existing| {
                        if existing.is_empty() {
                            self.catalog.insert(&filename, &title_for(&path), "")
                        } else {
                            Ok(0)
                        }
                    });
                    self.status = match result {
                        Ok(0) => format!("{} is already in the catalog.", filename),
                        Ok(_) => format!("Added {} to the catalog.", filename),
                        Err(err) => format!("Catalog error: {}", err),
                    };
                }
                Task::none()
            }
            Message::Forget => {
                if let Some(path) = self.display.image() {
                    let filename = path.to_string_lossy();
                    self.status = match self.catalog.remove(&filename) {
                        Ok(removed) => format!("Removed {} record(s) for {}.", removed, filename),
                        Err(err) => format!("Catalog error: {}", err),
                    };
                }
                Task::none()
            }
            Message::Display(input) => {
                if let Err(err) = self.display.handle(input) {
                    tracing::error!("Display error: {}", err);
                    self.status = format!("Display error: {}", err);
                }
                Task::none()
            }
            Message::WindowResized(size) => {
                self.display.on_resize(viewport_for(size));
                Task::none()
            }
        };

        self.drain_events();
        task
    }

    /// Turn queued display events into status messages
    fn drain_events(&mut self) {
        let events: Vec<_> = self.inbox.borrow_mut().drain(..).collect();
        for event in events {
            tracing::debug!(?event, "display event");
            match event {
                DisplayEvent::ImageAdded(path) => {
                    let size = self
                        .display
                        .image_size()
                        .map(|(w, h)| format!(" ({}x{})", w, h))
                        .unwrap_or_default();
                    self.status = format!("Showing {}{}", path.display(), size);
                }
                DisplayEvent::RectangleCaptured(a, b) => {
                    self.status = format!(
                        "Selected ({:.0}, {:.0}) to ({:.0}, {:.0})",
                        a.x, a.y, b.x, b.y
                    );
                }
                DisplayEvent::ClearSelection => {
                    self.status = "Selection cleared.".to_string();
                }
                DisplayEvent::Resized(_) => {}
            }
        }
    }

    /// Build the user interface
    fn view(&self) -> Element<Message> {
        let has_image = self.display.image().is_some();
        let toolbar = row![
            button("Open Image").on_press(Message::OpenImage).padding(10),
            button("Import Folder").on_press(Message::ImportFolder).padding(10),
            button("Remember")
                .on_press_maybe(has_image.then_some(Message::Remember))
                .padding(10),
            button("Forget")
                .on_press_maybe(has_image.then_some(Message::Forget))
                .padding(10),
        ]
        .spacing(10)
        .align_y(Alignment::Center);

        let viewport = self.display.viewport();
        let frame_size = self.display.surface().frame_size().unwrap_or(Size::ZERO);
        let width = frame_size.width.max(viewport.width);
        let height = frame_size.height.max(viewport.height);

        let shown: Element<Message> = match self.display.surface().handle() {
            Some(handle) => picture(handle.clone())
                .width(Length::Fixed(frame_size.width))
                .height(Length::Fixed(frame_size.height))
                .into(),
            None => Space::new(Length::Fixed(width), Length::Fixed(height)).into(),
        };

        let overlay = canvas(SelectionOverlay::new(
            self.display.selection(),
            self.display.is_bordered(),
            self.settings.zoom_modifier,
            Message::Display,
        ))
        .width(Length::Fixed(width))
        .height(Length::Fixed(height));

        let surface = scrollable(stack![shown, overlay])
            .direction(Direction::Both {
                vertical: Scrollbar::default(),
                horizontal: Scrollbar::default(),
            })
            .width(Length::Fill)
            .height(Length::Fill);

        let zoom = format!("{:.0}%", self.display.zoom_factor() * 100.0);
        let status_bar = row![
            text(&self.status).size(14).width(Length::Fill),
            text(zoom).size(14),
        ]
        .spacing(10);

        let content = column![toolbar, surface, status_bar]
            .spacing(8)
            .padding(8);

        container(content)
            .width(Length::Fill)
            .height(Length::Fill)
            .into()
    }

    fn subscription(&self) -> Subscription<Message> {
        window::resize_events().map(|(_id, size)| Message::WindowResized(size))
    }

    /// Set the application theme
    fn theme(&self) -> Theme {
        Theme::Dark
    }
}

fn main() -> iced::Result {
    let settings = match Settings::load() {
        Ok(settings) => settings,
        Err(err) => {
            eprintln!("⚠️  Could not read {}: {}", Settings::path().display(), err);
            Settings::default()
        }
    };
    omen::logging::init(&settings.log_level);

    // First run: write the defaults out so they can be edited
    let settings_path = Settings::path();
    if !settings_path.exists() {
        match settings.save_to(&settings_path) {
            Ok(()) => tracing::info!("Wrote default settings to {}", settings_path.display()),
            Err(err) => tracing::warn!("Could not write {}: {}", settings_path.display(), err),
        }
    }

    iced::application("Omen", Omen::update, Omen::view)
        .subscription(Omen::subscription)
        .theme(Omen::theme)
        .centered()
        .run_with(move || Omen::new(settings))
}

/// Size available to the display inside a window of `window_size`
fn viewport_for(window_size: Size) -> Size {
    Size::new(
        window_size.width.max(0.0),
        (window_size.height - CHROME_HEIGHT).max(0.0),
    )
}

/// Catalog title for a file: its name without extension
fn title_for(path: &Path) -> String {
    path.file_stem()
        .map(|stem| stem.to_string_lossy().into_owned())
        .unwrap_or_default()
}

fn is_image(path: &Path) -> bool {
    path.extension()
        .map(|ext| ext.to_string_lossy().to_lowercase())
        .is_some_and(|ext| IMAGE_EXTENSIONS.contains(&ext.as_str()))
}

/// Async function to import all image files from a folder
/// Runs on a blocking thread to avoid stalling the UI
async fn import_folder_async(folder_path: PathBuf, db_path: PathBuf) -> Result<ImportResult, String> {
    tokio::task::spawn_blocking(move || import_folder(&folder_path, &db_path))
        .await
        .map_err(|e| format!("Task join error: {}", e))?
        .map_err(|e| e.to_string())
}

fn import_folder(folder_path: &Path, db_path: &Path) -> omen::Result<ImportResult> {
    let mut imported_count = 0;
    let mut skipped_count = 0;

    // Open a separate connection for this thread
    let mut catalog = Catalog::new(db_path);
    catalog.connect()?;

    tracing::info!("🔍 Scanning folder: {}", folder_path.display());

    // Walk the directory tree recursively
    for entry in WalkDir::new(folder_path)
        .follow_links(true)
        .into_iter()
        .filter_map(|e| e.ok())
    {
        let path = entry.path();
        if !path.is_file() || !is_image(path) {
            continue;
        }

        let filename = path.to_string_lossy();
        if !catalog.get(&filename)?.is_empty() {
            skipped_count += 1;
            continue;
        }

        match catalog.insert(&filename, &title_for(path), "") {
            Ok(_) => {
                imported_count += 1;
                if imported_count % 100 == 0 {
                    tracing::info!("⏳ Imported {} files...", imported_count);
                }
            }
            Err(err) => {
                tracing::warn!("⚠️  Error importing {}: {}", filename, err);
            }
        }
    }

    tracing::info!(
        "✅ Import complete: {} new, {} skipped",
        imported_count,
        skipped_count
    );
    catalog.close()?;

    Ok(ImportResult {
        imported_count,
        skipped_count,
    })
}
