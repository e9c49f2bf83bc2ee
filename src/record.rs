use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use time::OffsetDateTime;

use crate::hashing::sha256_hex;
use crate::submission::{Submission, SubmissionId};

/// A validated submission together with where and when it was received.
///
/// Keeps the plaintext email and age in memory. It deliberately has no
/// `Serialize` implementation: the only way to write one out is
/// [`StoredRecord::export`].
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct StoredRecord {
    /// The submission itself.
    submission: Submission,

    /// When the submission was received. Set by the receiver, never by
    /// the client.
    received_at: OffsetDateTime,

    /// The network address the submission came from.
    ip: String,
}

impl StoredRecord {
    pub fn new(submission: Submission, received_at: OffsetDateTime, ip: impl Into<String>) -> Self {
        StoredRecord {
            submission,
            received_at,
            ip: ip.into(),
        }
    }

    pub fn submission(&self) -> &Submission {
        &self.submission
    }

    pub fn received_at(&self) -> OffsetDateTime {
        self.received_at
    }

    pub fn ip(&self) -> &str {
        &self.ip
    }

    /// Produces the pseudonymized representation of this record, with
    /// the email and age replaced by their SHA-256 digests.
    pub fn export(&self) -> ExportedRecord {
        let submission = &self.submission;

        ExportedRecord {
            name: submission.name().to_owned(),
            email: sha256_hex(submission.email()),
            age: sha256_hex(submission.age().to_string()),
            consent: submission.consent(),
            rating: submission.rating(),
            comments: submission.comments().map(str::to_owned),
            user_agent: submission.user_agent().map(str::to_owned),
            submission_id: submission.submission_id().clone(),
            received_at: self.received_at,
            ip: self.ip.clone(),
        }
    }
}

/// The representation of a [`StoredRecord`] that may be written to
/// storage or logs.
#[derive(Clone, Debug, Deserialize, Eq, PartialEq, Serialize)]
pub struct ExportedRecord {
    pub(crate) name: String,

    /// Digest of the email address.
    pub(crate) email: String,

    /// Digest of the age in decimal.
    pub(crate) age: String,

    pub(crate) consent: bool,

    pub(crate) rating: u8,

    pub(crate) comments: Option<String>,

    pub(crate) user_agent: Option<String>,

    pub(crate) submission_id: SubmissionId,

    #[serde(with = "time::serde::timestamp")]
    pub(crate) received_at: OffsetDateTime,

    pub(crate) ip: String,
}

impl ExportedRecord {
    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn email_digest(&self) -> &str {
        &self.email
    }

    pub fn age_digest(&self) -> &str {
        &self.age
    }

    pub fn submission_id(&self) -> &SubmissionId {
        &self.submission_id
    }

    pub fn ip(&self) -> &str {
        &self.ip
    }

    /// The record as a plain mapping of field name to value.
    pub fn to_map(&self) -> Map<String, Value> {
        let mut map = Map::new();

        map.insert("name".to_owned(), Value::from(self.name.as_str()));
        map.insert("email".to_owned(), Value::from(self.email.as_str()));
        map.insert("age".to_owned(), Value::from(self.age.as_str()));
        map.insert("consent".to_owned(), Value::from(self.consent));
        map.insert("rating".to_owned(), Value::from(self.rating));
        map.insert("comments".to_owned(), self.comments.as_deref().map_or(Value::Null, Value::from));
        map.insert("user_agent".to_owned(), self.user_agent.as_deref().map_or(Value::Null, Value::from));
        map.insert("submission_id".to_owned(), Value::from(self.submission_id.as_str()));
        map.insert("received_at".to_owned(), Value::from(self.received_at.unix_timestamp()));
        map.insert("ip".to_owned(), Value::from(self.ip.as_str()));

        map
    }
}
