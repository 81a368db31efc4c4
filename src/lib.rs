//! Interactive console for one Google Sheets spreadsheet.
//!
//! The menu loop lives in [`commands`], the per-command logic in
//! [`handlers`]. Remote calls go through the [`sheets::SheetsApi`] trait so
//! the console can run against the real service or an in-memory double.

pub mod address;
pub mod auth;
pub mod commands;
pub mod config;
pub mod error;
pub mod handlers;
pub mod locator;
pub mod sheets;
pub mod table;

pub use commands::{handle_commands, Prompt, Session};
pub use error::{ConsoleError, Result};
pub use locator::locate_append_row;
pub use sheets::{Grid, SheetsApi, SheetsClient};
pub use table::render;
