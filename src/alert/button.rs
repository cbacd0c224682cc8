//! Action buttons and their activation.

use std::fmt;
use std::rc::Rc;

use super::value::AlertValue;

/// Callback run with the collected value; reports whether the alert stays open.
pub type ButtonHandler = Rc<dyn Fn(&AlertValue) -> bool>;

/// Return values accepted from a button handler.
///
/// Only an explicit `false` keeps the alert open.
pub trait HandlerReturn {
    fn keeps_open(&self) -> bool;
}

impl HandlerReturn for () {
    fn keeps_open(&self) -> bool {
        false
    }
}

impl HandlerReturn for bool {
    fn keeps_open(&self) -> bool {
        !*self
    }
}

impl HandlerReturn for Option<bool> {
    fn keeps_open(&self) -> bool {
        *self == Some(false)
    }
}

/// An action button declaration.
#[derive(Clone, Default)]
pub struct ButtonSpec {
    pub text: String,
    /// Free-form role, e.g. `"cancel"`; reported with the dismissal.
    pub role: Option<String>,
    pub css_class: Option<String>,
    handler: Option<ButtonHandler>,
}

impl ButtonSpec {
    pub fn new(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            ..Default::default()
        }
    }

    pub fn role(mut self, role: impl Into<String>) -> Self {
        self.role = Some(role.into());
        self
    }

    pub fn css_class(mut self, css_class: impl Into<String>) -> Self {
        self.css_class = Some(css_class.into());
        self
    }

    /// Attach a handler. Returning `false` (or `Some(false)`) keeps the alert open.
    pub fn handler<F, R>(mut self, handler: F) -> Self
    where
        F: Fn(&AlertValue) -> R + 'static,
        R: HandlerReturn,
    {
        self.handler = Some(Rc::new(move |value| handler(value).keeps_open()));
        self
    }

    pub fn has_handler(&self) -> bool {
        self.handler.is_some()
    }

    /// Classes applied to the rendered button.
    pub fn classes(&self) -> Vec<String> {
        let mut classes = vec!["alert-button".to_string()];
        if let Some(extra) = &self.css_class {
            classes.extend(extra.split_whitespace().map(str::to_string));
        }
        classes
    }
}

impl From<&str> for ButtonSpec {
    fn from(text: &str) -> Self {
        Self::new(text)
    }
}

impl From<String> for ButtonSpec {
    fn from(text: String) -> Self {
        Self::new(text)
    }
}

impl fmt::Debug for ButtonSpec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ButtonSpec")
            .field("text", &self.text)
            .field("role", &self.role)
            .field("css_class", &self.css_class)
            .field("handler", &self.handler.is_some())
            .finish()
    }
}

/// Run the button's handler, if any, once with `value`.
///
/// Returns whether the alert should be dismissed.
pub fn activate(button: &ButtonSpec, value: &AlertValue) -> bool {
    match &button.handler {
        Some(handler) => !handler(value),
        None => true,
    }
}
