//! Omen: an image display with zoom and rubber-band selection, plus a
//! small SQLite catalog of (filename, title, artist) records.
//!
//! - `display` holds the toolkit-neutral widget logic
//! - `ui` adapts it to iced (rendering surface and input overlay)
//! - `state` owns the catalog connector

pub mod display;
pub mod error;
pub mod logging;
pub mod settings;
pub mod state;
pub mod ui;

pub use error::{Error, Result};
