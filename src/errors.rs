use std::fmt;

use serde::Serialize;
use thiserror::Error;

/// The reason given for an unaccepted consent flag.
pub const CONSENT_REQUIRED: &str = "consent must be true";

/// Field name used for errors that concern the whole document.
pub const ROOT_FIELD: &str = "__root__";

/// Enumerates the ways a single field can fail validation.
#[derive(Clone, Copy, Debug, Eq, PartialEq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorKind {
    /// A required field was absent or null.
    Missing,

    /// The field had the wrong JSON type.
    Type,

    /// The field was too short or too long.
    Length,

    /// The field was not a valid email address.
    Format,

    /// The field was outside its permitted range.
    Range,

    /// Consent was not given.
    Consent,

    /// The document itself could not be read.
    Malformed,
}

/// A single field that failed validation and why.
#[derive(Clone, Debug, Eq, PartialEq, Serialize)]
pub struct FieldError {
    pub(crate) field: String,
    pub(crate) kind: ErrorKind,
    pub(crate) reason: String,
}

impl FieldError {
    pub fn new(field: impl Into<String>, kind: ErrorKind, reason: impl Into<String>) -> Self {
        FieldError {
            field: field.into(),
            kind,
            reason: reason.into(),
        }
    }

    pub fn field(&self) -> &str {
        &self.field
    }

    pub fn kind(&self) -> ErrorKind {
        self.kind
    }

    pub fn reason(&self) -> &str {
        &self.reason
    }
}

impl fmt::Display for FieldError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.field, self.reason)
    }
}

/// Returned when a submission fails validation. Lists every offending
/// field, not just the first.
#[derive(Clone, Debug, Error, Eq, PartialEq, Serialize)]
#[error("invalid submission: {}", summarize(.errors))]
pub struct SchemaValidationError {
    errors: Vec<FieldError>,
}

impl SchemaValidationError {
    pub fn new(errors: Vec<FieldError>) -> Self {
        SchemaValidationError { errors }
    }

    pub fn malformed(reason: impl Into<String>) -> Self {
        SchemaValidationError::new(vec![FieldError::new(ROOT_FIELD, ErrorKind::Malformed, reason)])
    }

    pub fn errors(&self) -> &[FieldError] {
        &self.errors
    }

    /// Names of the fields that failed, in the order they were reported.
    pub fn fields(&self) -> Vec<&str> {
        self.errors.iter().map(FieldError::field).collect()
    }

    /// The error reported for `field`, if any.
    pub fn get(&self, field: &str) -> Option<&FieldError> {
        self.errors.iter().find(|e| e.field == field)
    }

    /// Whether the submission was rejected for lack of consent.
    pub fn is_consent_error(&self) -> bool {
        self.errors.iter().any(|e| e.kind == ErrorKind::Consent)
    }
}

fn summarize(errors: &[FieldError]) -> String {
    errors
        .iter()
        .map(|e| e.to_string())
        .collect::<Vec<_>>()
        .join("; ")
}

/// Enumerates errors returned by the store subsystem.
#[derive(Debug, Error)]
pub enum StoreError {
    /// Represents an error turning the record into JSON.
    #[error("Serialization error")]
    Serialization { source: serde_json::Error },

    /// Represents an error writing to the underlying sink.
    #[error("I/O error")]
    Io { source: std::io::Error },

    /// Represents a sink that can no longer be written to.
    #[error("Sink poisoned")]
    Poisoned,
}
