use std::sync::Arc;

use log::{debug, info, o, Logger};
use serde::Serialize;
use serde_json::{Map, Value};
use time::OffsetDateTime;

use crate::errors::{FieldError, SchemaValidationError};
use crate::record::StoredRecord;
use crate::submission::Submission;

/// Turns raw submissions into stored records, logging the outcome.
#[derive(Clone)]
pub struct Intake {
    logger: Arc<Logger>,
}

impl Intake {
    pub fn new(logger: Arc<Logger>) -> Self {
        Intake { logger }
    }

    /// Validates `raw` as received from `ip` at `received_at`. The
    /// submission ID, if derived, uses the hour of `received_at`.
    pub fn accept(
        &self,
        raw: Map<String, Value>,
        received_at: OffsetDateTime,
        ip: impl Into<String>,
    ) -> Result<StoredRecord, Rejection> {
        let ip = ip.into();
        let context = Context::intake(ip.clone());

        self.record(context, Submission::parse_at(raw, received_at), received_at, ip)
    }

    /// Like [`Intake::accept`], but for line `line` of a JSON lines import.
    pub fn accept_json(
        &self,
        line: usize,
        text: &str,
        received_at: OffsetDateTime,
        ip: impl Into<String>,
    ) -> Result<StoredRecord, Rejection> {
        let submission = Submission::from_json_at(text, received_at);

        self.record(Context::import(line), submission, received_at, ip.into())
    }

    fn record(
        &self,
        context: Context,
        submission: Result<Submission, SchemaValidationError>,
        received_at: OffsetDateTime,
        ip: String,
    ) -> Result<StoredRecord, Rejection> {
        let logger = self.logger.new(o!("context" => format!("{:?}", context)));

        match submission {
            Ok(submission) => {
                debug!(logger, "Accepted submission"; "submission_id" => submission.submission_id().as_str());

                Ok(StoredRecord::new(submission, received_at, ip))
            }
            Err(error) => {
                info!(logger, "Rejected submission"; "fields" => error.fields().join(","));

                Err(Rejection::new(context, error))
            }
        }
    }
}

/// A rejected submission and where it came from.
#[derive(Debug)]
pub struct Rejection {
    pub(crate) context: Context,
    pub(crate) error: SchemaValidationError,
}

impl Rejection {
    pub fn new(context: Context, error: SchemaValidationError) -> Self {
        Rejection { context, error }
    }

    pub fn error(&self) -> &SchemaValidationError {
        &self.error
    }

    /// The body to send back to whoever made the submission.
    pub fn flatten(&self) -> FlattenedRejection {
        FlattenedRejection {
            context: self.context.clone(),
            message: format!("{}", self.error),
            errors: self.error.errors().to_vec(),
        }
    }
}

#[derive(Debug, Serialize)]
pub struct FlattenedRejection {
    #[serde(flatten)]
    pub(crate) context: Context,
    pub(crate) message: String,
    pub(crate) errors: Vec<FieldError>,
}

#[derive(Clone, Debug, Serialize)]
#[serde(untagged)]
pub enum Context {
    Import { line: usize },
    Intake { ip: String },
}

impl Context {
    pub fn import(line: usize) -> Context {
        Context::Import { line }
    }

    pub fn intake(ip: String) -> Context {
        Context::Intake { ip }
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use serde_json::{json, Value};
    use time::OffsetDateTime;

    use super::Intake;
    use crate::hashing::sha256_hex;

    fn intake() -> Intake {
        Intake::new(Arc::new(log::discard()))
    }

    fn received_at() -> OffsetDateTime {
        OffsetDateTime::from_unix_timestamp(1_614_834_367).unwrap()
    }

    #[test]
    fn accepts_and_wraps() {
        let raw = match json!({ "name": "Ann", "email": "ann@x.com", "age": 30, "consent": true, "rating": 4 }) {
            Value::Object(map) => map,
            _ => unreachable!(),
        };

        let record = intake().accept(raw, received_at(), "10.0.0.1").unwrap();

        assert_eq!(record.ip(), "10.0.0.1");
        assert_eq!(record.received_at(), received_at());
        assert_eq!(
            record.submission().submission_id().as_str(),
            sha256_hex("ann@x.com2021030405")
        );
    }

    #[test]
    fn flattened_rejection_lists_fields() {
        let raw = match json!({ "name": "Ann", "email": "ann@x.com", "age": 12, "consent": false, "rating": 4 }) {
            Value::Object(map) => map,
            _ => unreachable!(),
        };

        let rejection = intake().accept(raw, received_at(), "10.0.0.1").unwrap_err();
        let body = serde_json::to_value(rejection.flatten()).unwrap();

        assert_eq!(body["ip"], "10.0.0.1");
        assert_eq!(body["errors"][0]["field"], "age");
        assert_eq!(body["errors"][0]["kind"], "range");
        assert_eq!(body["errors"][1]["field"], "consent");
        assert_eq!(body["errors"][1]["reason"], "consent must be true");
        assert_eq!(body["errors"].as_array().map(Vec::len), Some(2));
    }

    #[test]
    fn import_rejections_carry_line_numbers() {
        let rejection = intake().accept_json(7, "not json", received_at(), "127.0.0.1").unwrap_err();
        let body = serde_json::to_value(rejection.flatten()).unwrap();

        assert_eq!(body["line"], 7);
        assert_eq!(body["errors"][0]["kind"], "malformed");
    }
}
