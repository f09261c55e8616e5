use iced::keyboard::Modifiers;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

use crate::display::zoom::DEFAULT_ZOOM_STEP;
use crate::error::Result;

/// Application settings, stored as JSON in the user's config directory.
///
/// Every field has a default so a partial (or missing) file is fine.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Settings {
    /// Location of the catalog database
    #[serde(default = "default_db_path")]
    pub db_path: PathBuf,

    /// Multiplier applied per wheel notch while zooming
    #[serde(default = "default_zoom_step")]
    pub zoom_step: f32,

    /// Modifier that turns wheel scrolling into zooming
    #[serde(default)]
    pub zoom_modifier: ZoomModifier,

    /// Fallback log filter when `OMEN_LOG` is not set
    #[serde(default = "default_log_level")]
    pub log_level: String,
}

/// Key that must be held (alone) for wheel events to zoom
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ZoomModifier {
    #[default]
    Control,
    Shift,
    Alt,
    Logo,
}

impl ZoomModifier {
    pub fn modifiers(self) -> Modifiers {
        match self {
            ZoomModifier::Control => Modifiers::CTRL,
            ZoomModifier::Shift => Modifiers::SHIFT,
            ZoomModifier::Alt => Modifiers::ALT,
            ZoomModifier::Logo => Modifiers::LOGO,
        }
    }

    /// True when exactly this modifier is held
    pub fn is_held(self, current: Modifiers) -> bool {
        current == self.modifiers()
    }
}

fn default_db_path() -> PathBuf {
    dirs::data_dir()
        .or_else(dirs::home_dir)
        .unwrap_or_else(|| PathBuf::from("."))
        .join("omen")
        .join("library.db")
}

fn default_zoom_step() -> f32 {
    DEFAULT_ZOOM_STEP
}

fn default_log_level() -> String {
    "info".to_string()
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            db_path: default_db_path(),
            zoom_step: default_zoom_step(),
            zoom_modifier: ZoomModifier::default(),
            log_level: default_log_level(),
        }
    }
}

impl Settings {
    /// Where the settings file lives:
    /// - Linux: ~/.config/omen/settings.json
    /// - macOS: ~/Library/Application Support/omen/settings.json
    /// - Windows: %APPDATA%\omen\settings.json
    pub fn path() -> PathBuf {
        dirs::config_dir()
            .or_else(dirs::home_dir)
            .unwrap_or_else(|| PathBuf::from("."))
            .join("omen")
            .join("settings.json")
    }

    /// Load the settings file, falling back to defaults when it doesn't exist
    pub fn load() -> Result<Self> {
        Self::load_from(&Self::path())
    }

    pub fn load_from(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Ok(Self::default());
        }

        let contents = fs::read_to_string(path)?;
        Ok(Self::from_json(&contents)?)
    }

    /// Parse settings, replacing out-of-range values with defaults
    pub fn from_json(json: &str) -> std::result::Result<Self, serde_json::Error> {
        serde_json::from_str::<Self>(json).map(Self::sanitized)
    }

    pub fn save_to(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }
        fs::write(path, serde_json::to_string_pretty(self)?)?;
        Ok(())
    }

    /// Replace values that would break the zoom floor with defaults
    fn sanitized(mut self) -> Self {
        if !self.zoom_step.is_finite() || self.zoom_step <= 1.0 {
            tracing::warn!(
                "Ignoring zoom_step {} (must be > 1.0), using {}",
                self.zoom_step,
                DEFAULT_ZOOM_STEP
            );
            self.zoom_step = DEFAULT_ZOOM_STEP;
        }
        self
    }
}
