//! Input declarations and their normalization.
//!
//! An alert accepts text fields, radio options or checkboxes, but never a
//! mix of them. Raw [`InputSpec`]s are partially filled in by the caller;
//! [`normalize`] turns them into fully populated [`CanonicalInput`]s and
//! picks the single [`InteractionMode`] for the whole alert.

use std::fmt;
use std::rc::Rc;

use serde::{Deserialize, Serialize};
use tracing::warn;

/// Callback invoked when a radio option or checkbox is toggled.
pub type InputHandler = Rc<dyn Fn(&CanonicalInput)>;

/// The kind of control an input renders as.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum InputKind {
    #[default]
    Text,
    Radio,
    Checkbox,
}

impl InputKind {
    /// Returns the lowercase name used in diagnostics.
    pub const fn as_str(&self) -> &'static str {
        match self {
            InputKind::Text => "text",
            InputKind::Radio => "radio",
            InputKind::Checkbox => "checkbox",
        }
    }

    /// Whether this kind is a selection control (radio or checkbox).
    pub const fn is_selection(&self) -> bool {
        matches!(self, InputKind::Radio | InputKind::Checkbox)
    }
}

impl fmt::Display for InputKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// The single interaction style governing an alert.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum InteractionMode {
    /// No inputs at all.
    #[default]
    None,
    Text,
    Radio,
    Checkbox,
}

impl From<InputKind> for InteractionMode {
    fn from(kind: InputKind) -> Self {
        match kind {
            InputKind::Text => InteractionMode::Text,
            InputKind::Radio => InteractionMode::Radio,
            InputKind::Checkbox => InteractionMode::Checkbox,
        }
    }
}

/// A caller-supplied input declaration. Every field is optional.
#[derive(Clone, Default)]
pub struct InputSpec {
    pub kind: Option<InputKind>,
    pub name: Option<String>,
    pub placeholder: Option<String>,
    pub value: Option<String>,
    pub label: Option<String>,
    pub checked: Option<bool>,
    pub disabled: Option<bool>,
    pub id: Option<String>,
    pub handler: Option<InputHandler>,
    pub min: Option<String>,
    pub max: Option<String>,
}

impl InputSpec {
    /// Create a text input declaration.
    pub fn text() -> Self {
        Self::of_kind(InputKind::Text)
    }

    /// Create a radio option declaration.
    pub fn radio() -> Self {
        Self::of_kind(InputKind::Radio)
    }

    /// Create a checkbox declaration.
    pub fn checkbox() -> Self {
        Self::of_kind(InputKind::Checkbox)
    }

    fn of_kind(kind: InputKind) -> Self {
        Self {
            kind: Some(kind),
            ..Default::default()
        }
    }

    pub fn name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    pub fn placeholder(mut self, placeholder: impl Into<String>) -> Self {
        self.placeholder = Some(placeholder.into());
        self
    }

    pub fn value(mut self, value: impl Into<String>) -> Self {
        self.value = Some(value.into());
        self
    }

    pub fn label(mut self, label: impl Into<String>) -> Self {
        self.label = Some(label.into());
        self
    }

    pub fn checked(mut self, checked: bool) -> Self {
        self.checked = Some(checked);
        self
    }

    pub fn disabled(mut self, disabled: bool) -> Self {
        self.disabled = Some(disabled);
        self
    }

    pub fn id(mut self, id: impl Into<String>) -> Self {
        self.id = Some(id.into());
        self
    }

    /// Set the bounds for numeric-like text inputs.
    pub fn bounds(mut self, min: impl Into<String>, max: impl Into<String>) -> Self {
        self.min = Some(min.into());
        self.max = Some(max.into());
        self
    }

    /// Set the callback run when this input is selected or toggled.
    pub fn on_toggle(mut self, handler: impl Fn(&CanonicalInput) + 'static) -> Self {
        self.handler = Some(Rc::new(handler));
        self
    }
}

impl fmt::Debug for InputSpec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("InputSpec")
            .field("kind", &self.kind)
            .field("name", &self.name)
            .field("value", &self.value)
            .field("label", &self.label)
            .field("checked", &self.checked)
            .field("disabled", &self.disabled)
            .field("id", &self.id)
            .field("handler", &self.handler.is_some())
            .finish_non_exhaustive()
    }
}

/// A fully defaulted input, rebuilt from its [`InputSpec`] on every pass.
#[derive(Clone)]
pub struct CanonicalInput {
    pub kind: InputKind,
    pub name: String,
    pub placeholder: String,
    pub value: String,
    pub label: Option<String>,
    pub checked: bool,
    pub disabled: bool,
    pub id: String,
    pub handler: Option<InputHandler>,
    pub min: Option<String>,
    pub max: Option<String>,
}

impl CanonicalInput {
    /// Run the toggle callback, if any, with this input's current state.
    pub(crate) fn notify(&self) {
        if let Some(handler) = &self.handler {
            handler(self);
        }
    }
}

impl fmt::Debug for CanonicalInput {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CanonicalInput")
            .field("kind", &self.kind)
            .field("name", &self.name)
            .field("placeholder", &self.placeholder)
            .field("value", &self.value)
            .field("label", &self.label)
            .field("checked", &self.checked)
            .field("disabled", &self.disabled)
            .field("id", &self.id)
            .field("handler", &self.handler.is_some())
            .field("min", &self.min)
            .field("max", &self.max)
            .finish()
    }
}

impl From<&CanonicalInput> for InputSpec {
    fn from(input: &CanonicalInput) -> Self {
        Self {
            kind: Some(input.kind),
            name: Some(input.name.clone()),
            placeholder: Some(input.placeholder.clone()),
            value: Some(input.value.clone()),
            label: input.label.clone(),
            checked: Some(input.checked),
            disabled: Some(input.disabled),
            id: Some(input.id.clone()),
            handler: input.handler.clone(),
            min: input.min.clone(),
            max: input.max.clone(),
        }
    }
}

/// Inputs of more than one kind were declared alongside radios or checkboxes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct KindConflict {
    /// Distinct kinds in first-seen order.
    pub kinds: Vec<InputKind>,
}

impl fmt::Display for KindConflict {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let kinds: Vec<&str> = self.kinds.iter().map(InputKind::as_str).collect();
        write!(f, "Alert cannot mix input types: {}", kinds.join("/"))
    }
}

/// Output of [`normalize`].
#[derive(Debug, Clone, Default)]
pub struct NormalizedInputs {
    pub inputs: Vec<CanonicalInput>,
    pub mode: InteractionMode,
    /// Set when the declarations mixed kinds; `mode` is still the first-seen kind.
    pub conflict: Option<KindConflict>,
}

impl NormalizedInputs {
    pub fn into_parts(self) -> (Vec<CanonicalInput>, InteractionMode) {
        (self.inputs, self.mode)
    }
}

/// Build the canonical input list and the active interaction mode.
///
/// A mix of kinds that includes radio or checkbox is logged as a warning and
/// resolved in favour of the first kind encountered.
pub fn normalize(raw: &[InputSpec], alert_id: &str) -> NormalizedInputs {
    let inputs: Vec<CanonicalInput> = raw
        .iter()
        .enumerate()
        .map(|(index, spec)| canonicalize(spec, index, alert_id))
        .collect();

    let mut kinds: Vec<InputKind> = Vec::new();
    for input in &inputs {
        if !kinds.contains(&input.kind) {
            kinds.push(input.kind);
        }
    }

    let conflict = if kinds.len() > 1 && kinds.iter().any(InputKind::is_selection) {
        let conflict = KindConflict {
            kinds: kinds.clone(),
        };
        warn!(alert_id, "{}", conflict);
        Some(conflict)
    } else {
        None
    };

    let mode = kinds
        .first()
        .copied()
        .map(InteractionMode::from)
        .unwrap_or_default();

    NormalizedInputs {
        inputs,
        mode,
        conflict,
    }
}

fn canonicalize(spec: &InputSpec, index: usize, alert_id: &str) -> CanonicalInput {
    CanonicalInput {
        kind: spec.kind.unwrap_or_default(),
        name: non_empty(&spec.name).unwrap_or_else(|| index.to_string()),
        placeholder: spec.placeholder.clone().unwrap_or_default(),
        value: spec.value.clone().unwrap_or_default(),
        label: spec.label.clone(),
        checked: spec.checked.unwrap_or(false),
        disabled: spec.disabled.unwrap_or(false),
        id: non_empty(&spec.id).unwrap_or_else(|| format!("alert-input-{}-{}", alert_id, index)),
        handler: spec.handler.clone(),
        min: non_empty(&spec.min),
        max: non_empty(&spec.max),
    }
}

fn non_empty(field: &Option<String>) -> Option<String> {
    field.as_ref().filter(|s| !s.is_empty()).cloned()
}
