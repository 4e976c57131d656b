//! Meeting workbook schedule server
//!
//! Extracts meeting schedules from workbook PDF text, imports weekly
//! programs from the workbook site into SQLite, and erases circular
//! regions from drawn map paths.

pub mod config;
pub mod db;
pub mod error;
pub mod geometry;
pub mod ingest;
pub mod period;
pub mod program;
pub mod routes;
pub mod schedule;
pub mod state;
pub mod text;

pub use config::Config;
pub use error::{AppError, Result};
pub use state::AppState;
