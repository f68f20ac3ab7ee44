//! Web server: JSON/NDJSON API plus the embedded front-end.

pub mod app;
pub mod error;
pub mod handlers;
pub mod state;
