use std::convert::TryFrom;
use std::fmt;

use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use time::OffsetDateTime;
use validator::{Validate, ValidationErrors};

use crate::errors::{ErrorKind, FieldError, SchemaValidationError, CONSENT_REQUIRED};
use crate::hashing::{hour_bucket, sha256_hex};
use crate::normalization;

/// Field names in declaration order. Errors are reported in this order.
pub const FIELDS: [&str; 8] = [
    "name",
    "email",
    "age",
    "consent",
    "rating",
    "comments",
    "user_agent",
    "submission_id",
];

/// An opaque identifier for a submission. Either supplied by the client
/// or derived from the email and the hour the submission arrived in.
#[derive(Clone, Debug, Deserialize, Eq, Hash, PartialEq, Serialize)]
#[serde(transparent)]
pub struct SubmissionId(String);

impl SubmissionId {
    /// Derives the identifier shared by all submissions from `email`
    /// within the UTC hour containing `at`.
    pub fn derive(email: &str, at: OffsetDateTime) -> Self {
        SubmissionId(sha256_hex(format!("{}{}", email, hour_bucket(at))))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for SubmissionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// A single validated survey response. Can only be obtained through
/// [`Submission::parse`] and friends, so every instance satisfies every
/// field constraint.
#[derive(Clone, Deserialize, Eq, PartialEq)]
#[serde(try_from = "Map<String, Value>")]
pub struct Submission {
    name: String,
    email: String,
    age: u8,
    consent: bool,
    rating: u8,
    comments: Option<String>,
    user_agent: Option<String>,
    submission_id: SubmissionId,
}

impl Submission {
    /// Validates `raw`, deriving the submission ID from the current time
    /// if the client didn't supply one.
    pub fn parse(raw: Map<String, Value>) -> Result<Self, SchemaValidationError> {
        Self::parse_at(raw, OffsetDateTime::now_utc())
    }

    /// Validates `raw`, deriving the submission ID from `now` if the
    /// client didn't supply one.
    pub fn parse_at(mut raw: Map<String, Value>, now: OffsetDateTime) -> Result<Self, SchemaValidationError> {
        assign_submission_id(&mut raw, now);
        validate(raw)
    }

    /// Parses a JSON document and validates it as with [`Submission::parse`].
    pub fn from_json(text: &str) -> Result<Self, SchemaValidationError> {
        Self::from_json_at(text, OffsetDateTime::now_utc())
    }

    /// Parses a JSON document and validates it as with [`Submission::parse_at`].
    pub fn from_json_at(text: &str, now: OffsetDateTime) -> Result<Self, SchemaValidationError> {
        match serde_json::from_str(text) {
            Ok(Value::Object(raw)) => Self::parse_at(raw, now),
            Ok(_) => Err(SchemaValidationError::malformed("expected a JSON object")),
            Err(e) => Err(SchemaValidationError::malformed(e.to_string())),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn email(&self) -> &str {
        &self.email
    }

    pub fn age(&self) -> u8 {
        self.age
    }

    pub fn consent(&self) -> bool {
        self.consent
    }

    pub fn rating(&self) -> u8 {
        self.rating
    }

    pub fn comments(&self) -> Option<&str> {
        self.comments.as_deref()
    }

    pub fn user_agent(&self) -> Option<&str> {
        self.user_agent.as_deref()
    }

    pub fn submission_id(&self) -> &SubmissionId {
        &self.submission_id
    }
}

impl TryFrom<Map<String, Value>> for Submission {
    type Error = SchemaValidationError;

    fn try_from(raw: Map<String, Value>) -> Result<Self, Self::Error> {
        Submission::parse(raw)
    }
}

impl fmt::Debug for Submission {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Submission")
            .field("name", &self.name)
            .field("email", &"[REDACTED]")
            .field("age", &"[REDACTED]")
            .field("consent", &self.consent)
            .field("rating", &self.rating)
            .field("comments", &self.comments)
            .field("user_agent", &self.user_agent)
            .field("submission_id", &self.submission_id)
            .finish()
    }
}

/// Fills in `submission_id` unless the client supplied one. Never fails:
/// a missing or unusable email just leaves the ID unset, and validation
/// reports the email.
fn assign_submission_id(raw: &mut Map<String, Value>, now: OffsetDateTime) {
    match raw.get("submission_id") {
        None | Some(Value::Null) => {}
        Some(Value::String(id)) if id.is_empty() => {}
        Some(_) => return,
    }

    let id = match raw.get("email") {
        Some(Value::String(email)) if !email.is_empty() => SubmissionId::derive(email, now),
        _ => return,
    };

    raw.insert("submission_id".to_owned(), Value::String(id.0));
}

/// The typed fields of a submission before constraints are checked.
/// Fields that were absent or of the wrong type are `None`.
#[derive(Debug, Validate)]
struct SubmissionForm {
    #[validate(length(min = 1, max = 100, message = "name must be between 1 and 100 characters"))]
    name: Option<String>,

    #[validate(email(message = "value is not a valid email address"))]
    email: Option<String>,

    #[validate(range(min = 13, max = 120, message = "age must be between 13 and 120"))]
    age: Option<i64>,

    consent: Option<bool>,

    #[validate(range(min = 1, max = 5, message = "rating must be between 1 and 5"))]
    rating: Option<i64>,

    /// Checked before trimming.
    #[validate(length(max = 1000, message = "comments must be at most 1000 characters"))]
    comments: Option<String>,

    user_agent: Option<String>,

    submission_id: Option<String>,
}

fn validate(raw: Map<String, Value>) -> Result<Submission, SchemaValidationError> {
    let mut extractor = Extractor::new(raw);

    let form = SubmissionForm {
        name: extractor.required("name", "a string"),
        email: extractor.required("email", "a string"),
        age: extractor.required("age", "an integer"),
        consent: extractor.required("consent", "a boolean"),
        rating: extractor.required("rating", "an integer"),
        comments: extractor.optional("comments", "a string"),
        user_agent: extractor.optional("user_agent", "a string"),
        submission_id: extractor.optional("submission_id", "a string"),
    };

    let mut errors = extractor.errors;

    if let Err(e) = form.validate() {
        errors.extend(constraint_errors(&e));
    }

    if form.consent == Some(false) {
        errors.push(FieldError::new("consent", ErrorKind::Consent, CONSENT_REQUIRED));
    }

    errors.sort_by_key(|e| position(e.field()));

    let age = form.age.and_then(|age| u8::try_from(age).ok());
    let rating = form.rating.and_then(|rating| u8::try_from(rating).ok());

    // Every `None` below has already been reported in `errors`. An ID is
    // only ever missing when the email is, since it is derived from it.
    match (form.name, form.email, age, form.consent, rating, form.submission_id) {
        (Some(name), Some(email), Some(age), Some(consent), Some(rating), Some(id)) if errors.is_empty() => {
            Ok(Submission {
                name,
                email,
                age,
                consent,
                rating,
                comments: form.comments.map(normalization::normalize_comment),
                user_agent: form.user_agent,
                submission_id: SubmissionId(id),
            })
        }
        _ => Err(SchemaValidationError::new(errors)),
    }
}

fn constraint_errors(errors: &ValidationErrors) -> Vec<FieldError> {
    errors
        .field_errors()
        .into_iter()
        .flat_map(|(field, errors)| {
            errors.iter().map(move |e| {
                let kind = match &*e.code {
                    "length" => ErrorKind::Length,
                    "range" => ErrorKind::Range,
                    _ => ErrorKind::Format,
                };
                let reason = e
                    .message
                    .as_ref()
                    .map(|m| m.to_string())
                    .unwrap_or_else(|| e.code.to_string());

                FieldError::new(field, kind, reason)
            })
        })
        .collect()
}

fn position(field: &str) -> usize {
    FIELDS.iter().position(|f| *f == field).unwrap_or(FIELDS.len())
}

/// Pulls typed fields out of a raw mapping, recording a [`FieldError`]
/// for every field that is missing or of the wrong type.
struct Extractor {
    raw: Map<String, Value>,
    errors: Vec<FieldError>,
}

impl Extractor {
    fn new(raw: Map<String, Value>) -> Self {
        Extractor { raw, errors: vec![] }
    }

    fn required<T: DeserializeOwned>(&mut self, field: &'static str, expected: &str) -> Option<T> {
        let present = self.raw.get(field).map_or(false, |v| !v.is_null());

        if !present {
            self.errors.push(FieldError::new(field, ErrorKind::Missing, "field required"));
        }

        self.optional(field, expected)
    }

    fn optional<T: DeserializeOwned>(&mut self, field: &'static str, expected: &str) -> Option<T> {
        let value = match self.raw.remove(field) {
            None | Some(Value::Null) => return None,
            Some(value) => value,
        };

        let found = describe(&value);

        match T::deserialize(value) {
            Ok(parsed) => Some(parsed),
            Err(_) => {
                self.errors.push(FieldError::new(
                    field,
                    ErrorKind::Type,
                    format!("expected {}, found {}", expected, found),
                ));
                None
            }
        }
    }
}

fn describe(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(n) if n.is_f64() => "a number",
        Value::Number(_) => "an integer",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}
