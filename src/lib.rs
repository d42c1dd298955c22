// File: src/lib.rs
pub mod calendar;
pub mod config;
pub mod db;
pub mod error;
pub mod logging;
pub mod model;
pub mod paths;
pub mod service;
pub mod store;
pub mod timefmt;
#[cfg(feature = "tui")]
pub mod tui;
