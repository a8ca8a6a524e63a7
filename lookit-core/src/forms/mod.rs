use std::collections::BTreeMap;

use serde::Serialize;
use thiserror::Error;

pub mod study;

pub use study::{CleanedStudy, StudyBuildForm, StudyEditForm, StudyForm};

/// Key under which errors that belong to the whole form are collected.
pub const NON_FIELD_ERRORS: &str = "__all__";

pub const FIELD_REQUIRED: &str = "This field is required.";

/// A single validation failure message.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("{message}")]
pub struct ValidationError {
    message: String,
}

impl ValidationError {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }

    pub fn message(&self) -> &str {
        &self.message
    }
}

/// All validation failures of one form submission, keyed by field name.
#[derive(Error, Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[error("{}", joined(.0))]
#[serde(transparent)]
pub struct FormErrors(BTreeMap<String, Vec<String>>);

impl FormErrors {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add(&mut self, field: &str, error: ValidationError) {
        self.0
            .entry(field.to_string())
            .or_default()
            .push(error.message);
    }

    pub fn add_non_field(&mut self, error: ValidationError) {
        self.add(NON_FIELD_ERRORS, error)
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn field(&self, field: &str) -> &[String] {
        self.0.get(field).map(|v| v.as_slice()).unwrap_or(&[])
    }

    pub fn non_field(&self) -> &[String] {
        self.field(NON_FIELD_ERRORS)
    }

    /// Single message shown to the submitter, non-field errors first.
    pub fn message(&self) -> String {
        joined(&self.0)
    }

    /// `Ok(value)` when nothing was reported, the errors otherwise.
    pub fn into_result<T>(self, value: T) -> Result<T, FormErrors> {
        if self.is_empty() {
            Ok(value)
        } else {
            Err(self)
        }
    }
}

fn joined(errors: &BTreeMap<String, Vec<String>>) -> String {
    errors
        .get(NON_FIELD_ERRORS)
        .into_iter()
        .flatten()
        .chain(
            errors
                .iter()
                .filter(|(k, _)| k.as_str() != NON_FIELD_ERRORS)
                .flat_map(|(_, v)| v.iter()),
        )
        .map(|s| s.as_str())
        .collect::<Vec<_>>()
        .join(" ")
}

pub(crate) fn require(errors: &mut FormErrors, field: &str, value: &str) {
    if value.trim().is_empty() {
        errors.add(field, ValidationError::new(FIELD_REQUIRED));
    }
}

pub(crate) fn parse_json(value: &str, message: &str) -> Result<serde_json::Value, ValidationError> {
    serde_json::from_str(value).map_err(|e| {
        tracing::trace!(err = e.to_string(), "rejecting invalid JSON");
        ValidationError::new(message)
    })
}
