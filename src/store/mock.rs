use std::sync::RwLock;

use crate::errors::StoreError;
use crate::record::ExportedRecord;
use crate::store::RecordSink;

#[derive(Default)]
pub(crate) struct MockSink {
    pub(crate) records: RwLock<Vec<ExportedRecord>>,
}

impl RecordSink for MockSink {
    type Output = ();

    fn write(&self, record: &ExportedRecord) -> Result<(), StoreError> {
        self.records.write().unwrap().push(record.clone());

        Ok(())
    }
}
