//! Validation and pseudonymization of survey submissions.
//!
//! Raw input becomes a [`Submission`], which is wrapped with receipt
//! details into a [`StoredRecord`], which is exported as an
//! [`ExportedRecord`] with the email and age replaced by digests.

pub mod config;
pub mod errors;
pub mod hashing;
pub mod intake;
pub mod normalization;
pub mod record;
pub mod store;
pub mod submission;

pub use errors::{ErrorKind, FieldError, SchemaValidationError};
pub use record::{ExportedRecord, StoredRecord};
pub use submission::{Submission, SubmissionId};
