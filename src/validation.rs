//! Structured validation errors for request bodies and path parameters.
//!
//! The errors are grouped the same way for every endpoint: problems with the
//! input as a whole go in `formErrors`, problems with a single field go in
//! `fieldErrors` keyed by the field name.

use std::collections::BTreeMap;

use serde::Serialize;
use serde_json::{Map, Value};

/// Machine readable code describing why a value was rejected.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum IssueCode {
    /// The value was missing or had the wrong JSON type.
    InvalidType,
    /// The value was a string, but not one of the allowed options.
    InvalidEnumValue,
    /// The value was a string in the wrong format, e.g. a malformed UUID.
    InvalidString,
    /// The input could not be parsed as a JSON object.
    InvalidJson,
    /// The value is a valid number, but too large to be accepted.
    TooBig,
}

/// A single reason a value was rejected.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Issue {
    /// Human readable description of the problem.
    pub message: String,
    /// The kind of problem.
    #[serde(rename = "errorCode")]
    pub error_code: IssueCode,
}

/// The collection of issues found while validating one input.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ValidationErrors {
    form_errors: Vec<Issue>,
    field_errors: BTreeMap<String, Vec<Issue>>,
}

impl ValidationErrors {
    /// Create an empty set of validation errors.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create validation errors with a single issue for `field`.
    pub fn for_field(field: &str, message: impl Into<String>, error_code: IssueCode) -> Self {
        let mut errors = Self::new();
        errors.add_field_error(field, message, error_code);
        errors
    }

    /// Create validation errors with a single issue about the whole input.
    pub fn for_form(message: impl Into<String>, error_code: IssueCode) -> Self {
        Self {
            form_errors: vec![Issue {
                message: message.into(),
                error_code,
            }],
            field_errors: BTreeMap::new(),
        }
    }

    /// Record an issue with `field`.
    pub fn add_field_error(
        &mut self,
        field: &str,
        message: impl Into<String>,
        error_code: IssueCode,
    ) {
        self.field_errors
            .entry(field.to_owned())
            .or_default()
            .push(Issue {
                message: message.into(),
                error_code,
            });
    }

    /// Whether no issues were recorded.
    #[cfg(test)]
    pub fn is_empty(&self) -> bool {
        self.form_errors.is_empty() && self.field_errors.is_empty()
    }

    /// The issues recorded for `field`, empty if the field was valid.
    #[cfg(test)]
    pub fn field(&self, field: &str) -> &[Issue] {
        self.field_errors
            .get(field)
            .map(Vec::as_slice)
            .unwrap_or_default()
    }

    /// The issues about the input as a whole.
    #[cfg(test)]
    pub fn form(&self) -> &[Issue] {
        &self.form_errors
    }
}

/// The name of a JSON value's type as shown in validation messages.
pub fn json_type_name(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}

fn record_type_error(
    body: &Map<String, Value>,
    field: &str,
    expected: &str,
    errors: &mut ValidationErrors,
) {
    match body.get(field) {
        None => errors.add_field_error(field, "Required", IssueCode::InvalidType),
        Some(value) => errors.add_field_error(
            field,
            format!("Expected {expected}, received {}", json_type_name(value)),
            IssueCode::InvalidType,
        ),
    }
}

/// Get the string stored under `field`, recording an issue in `errors` if it
/// is missing or not a string.
pub fn required_string(
    body: &Map<String, Value>,
    field: &str,
    errors: &mut ValidationErrors,
) -> Option<String> {
    match body.get(field) {
        Some(Value::String(text)) => Some(text.clone()),
        _ => {
            record_type_error(body, field, "string", errors);
            None
        }
    }
}

/// Get the finite number stored under `field`, recording an issue in
/// `errors` if it is missing or not a number.
pub fn required_number(
    body: &Map<String, Value>,
    field: &str,
    errors: &mut ValidationErrors,
) -> Option<f64> {
    match body.get(field).and_then(Value::as_f64) {
        Some(number) if number.is_finite() => Some(number),
        _ => {
            record_type_error(body, field, "number", errors);
            None
        }
    }
}

/// Get the string stored under `field` if it is one of `options`, recording
/// an issue in `errors` otherwise.
pub fn required_enum<'a>(
    body: &Map<String, Value>,
    field: &str,
    options: &[&'a str],
    errors: &mut ValidationErrors,
) -> Option<&'a str> {
    let expected = options
        .iter()
        .map(|option| format!("'{option}'"))
        .collect::<Vec<_>>()
        .join(" | ");

    let Some(Value::String(text)) = body.get(field) else {
        record_type_error(body, field, &expected, errors);
        return None;
    };

    let option = options.iter().find(|option| **option == text.as_str());

    if option.is_none() {
        errors.add_field_error(
            field,
            format!("Invalid enum value. Expected {expected}, received '{text}'"),
            IssueCode::InvalidEnumValue,
        );
    }

    option.copied()
}
