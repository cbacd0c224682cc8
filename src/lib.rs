//! Scry Alert - a modal alert dialog for the terminal.
//!
//! This library exposes the alert core and its terminal host for testing and reuse.

pub mod alert;
pub mod app;
pub mod config;
pub mod input;
pub mod logging;
pub mod ui;
