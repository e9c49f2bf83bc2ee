use std::io::Write;
use std::sync::Mutex;

use crate::errors::StoreError;
use crate::record::ExportedRecord;

#[cfg(test)]
pub(crate) mod mock;

/// Somewhere exported records can be written to. Only accepts the
/// pseudonymized representation, so plaintext never reaches storage.
pub trait RecordSink: Send + Sync {
    /// The type of successful result.
    type Output;

    /// Writes the given record.
    fn write(&self, record: &ExportedRecord) -> Result<Self::Output, StoreError>;
}

/// A sink that writes each record as a single line of JSON.
pub struct JsonLinesSink<W> {
    writer: Mutex<W>,
}

impl<W: Write + Send> JsonLinesSink<W> {
    /// Creates a new instance.
    pub fn new(writer: W) -> Self {
        JsonLinesSink {
            writer: Mutex::new(writer),
        }
    }

    /// Returns the underlying writer.
    pub fn into_inner(self) -> Result<W, StoreError> {
        self.writer.into_inner().map_err(|_| StoreError::Poisoned)
    }
}

impl<W: Write + Send> RecordSink for JsonLinesSink<W> {
    type Output = ();

    fn write(&self, record: &ExportedRecord) -> Result<(), StoreError> {
        let mut line = serde_json::to_vec(record).map_err(|source| StoreError::Serialization { source })?;
        line.push(b'\n');

        let mut writer = self.writer.lock().map_err(|_| StoreError::Poisoned)?;

        writer
            .write_all(&line)
            .and_then(|_| writer.flush())
            .map_err(|source| StoreError::Io { source })
    }
}
