//! Terminal host for alerts.
//!
//! This module contains the ratatui side of an alert:
//! - Rendering and key handling
//! - The focus/detach host the lifecycle talks to
//! - Text wrapping

pub mod alert_view;
pub mod host;
pub mod text;

pub use alert_view::{render_alert, AlertView, ViewAction};
pub use host::TerminalHost;
