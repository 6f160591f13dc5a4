pub mod config;
pub mod logging;
pub mod models;
pub mod schedule;
pub mod source;
pub mod tui;
