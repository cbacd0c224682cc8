//! Collects the single result value of an alert.

use serde::Serialize;
use serde_json::{Map, Value};

use super::input::{CanonicalInput, InteractionMode};

/// The value an alert resolves to when a button is activated.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize)]
#[serde(untagged)]
pub enum AlertValue {
    /// No inputs, or a radio group with nothing checked.
    #[default]
    Undefined,
    /// The checked radio option's value.
    Scalar(String),
    /// Values of every checked checkbox, in input order.
    List(Vec<String>),
    /// Text input values keyed by input name, in declaration order.
    Map(Map<String, Value>),
}

impl AlertValue {
    pub fn is_undefined(&self) -> bool {
        matches!(self, AlertValue::Undefined)
    }

    pub fn as_scalar(&self) -> Option<&str> {
        match self {
            AlertValue::Scalar(value) => Some(value),
            _ => None,
        }
    }

    /// Value of the text input named `name`.
    pub fn field(&self, name: &str) -> Option<&str> {
        match self {
            AlertValue::Map(fields) => fields.get(name).and_then(Value::as_str),
            _ => None,
        }
    }

    /// Convert to JSON; `Undefined` becomes `null`.
    pub fn to_json(&self) -> Value {
        serde_json::to_value(self).unwrap_or(Value::Null)
    }
}

/// Produce the value for `inputs` under the given interaction mode.
///
/// Text inputs sharing a name resolve last-write-wins, keeping the position
/// of the first declaration.
pub fn collect(inputs: &[CanonicalInput], mode: InteractionMode) -> AlertValue {
    match mode {
        InteractionMode::None => AlertValue::Undefined,
        InteractionMode::Radio => inputs
            .iter()
            .find(|input| input.checked)
            .map(|input| AlertValue::Scalar(input.value.clone()))
            .unwrap_or(AlertValue::Undefined),
        InteractionMode::Checkbox => AlertValue::List(
            inputs
                .iter()
                .filter(|input| input.checked)
                .map(|input| input.value.clone())
                .collect(),
        ),
        InteractionMode::Text => AlertValue::Map(
            inputs
                .iter()
                .map(|input| (input.name.clone(), Value::String(input.value.clone())))
                .collect(),
        ),
    }
}
