//! Hand-off of the finished listing to whatever consumes it.

use std::{
    fs::{self, File},
    io::Write,
    path::{Path, PathBuf},
};

use chrono::{DateTime, Utc};
use onboard_domain::FormValues;
use serde::{Deserialize, Serialize};
use tracing::info;
use uuid::Uuid;

use super::wizard::WizardContext;
use crate::errors::SubmissionError;

/// What a sink receives once the wizard reaches `Submitted`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SubmissionRecord {
    pub id: Uuid,
    pub submitted_at: DateTime<Utc>,
    pub context: WizardContext,
    pub values: FormValues,
}

impl SubmissionRecord {
    pub fn new(context: WizardContext, values: FormValues) -> Self {
        Self {
            id: Uuid::new_v4(),
            submitted_at: Utc::now(),
            context,
            values,
        }
    }
}

/// Receiver for completed listings. Errors keep the wizard on its last step.
pub trait SubmissionSink {
    fn submit(&mut self, record: &SubmissionRecord) -> Result<(), SubmissionError>;
}

/// Accepts and drops every record.
#[derive(Debug, Default, Clone, Copy)]
pub struct NoopSink;

impl SubmissionSink for NoopSink {
    fn submit(&mut self, _record: &SubmissionRecord) -> Result<(), SubmissionError> {
        Ok(())
    }
}

/// Emits each record as a structured log event.
#[derive(Debug, Default, Clone, Copy)]
pub struct LogSink;

impl SubmissionSink for LogSink {
    fn submit(&mut self, record: &SubmissionRecord) -> Result<(), SubmissionError> {
        let payload = serde_json::to_string(&record.values)?;
        info!(
            submission = %record.id,
            role = %record.context.role,
            offers = record.values.offers().len(),
            payload = %payload,
            "listing submitted"
        );
        Ok(())
    }
}

/// Keeps records in memory, in arrival order.
#[derive(Debug, Default, Clone)]
pub struct MemorySink {
    pub records: Vec<SubmissionRecord>,
}

impl MemorySink {
    pub fn new() -> Self {
        Self::default()
    }
}

impl SubmissionSink for MemorySink {
    fn submit(&mut self, record: &SubmissionRecord) -> Result<(), SubmissionError> {
        self.records.push(record.clone());
        Ok(())
    }
}

/// Writes `<dir>/<submission id>.json`, staging through a temporary file.
#[derive(Debug, Clone)]
pub struct JsonFileSink {
    dir: PathBuf,
    written: Vec<PathBuf>,
}

impl JsonFileSink {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self {
            dir: dir.into(),
            written: Vec::new(),
        }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Paths written so far by this sink.
    pub fn written(&self) -> &[PathBuf] {
        &self.written
    }
}

impl SubmissionSink for JsonFileSink {
    fn submit(&mut self, record: &SubmissionRecord) -> Result<(), SubmissionError> {
        fs::create_dir_all(&self.dir)?;
        let path = self.dir.join(format!("{}.json", record.id));
        let tmp = path.with_extension("json.tmp");
        let json = serde_json::to_string_pretty(record)?;
        let mut file = File::create(&tmp)?;
        file.write_all(json.as_bytes())?;
        file.flush()?;
        fs::rename(&tmp, &path)?;
        info!(path = %path.display(), "submission written");
        self.written.push(path);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use onboard_domain::FieldValue;
    use tempfile::tempdir;

    fn record() -> SubmissionRecord {
        let mut values = FormValues::new();
        values.insert("name", FieldValue::text("Ana"));
        SubmissionRecord::new(WizardContext::default(), values)
    }

    #[test]
    fn json_sink_writes_readable_record() {
        let dir = tempdir().unwrap();
        let mut sink = JsonFileSink::new(dir.path().join("submissions"));
        let record = record();

        sink.submit(&record).unwrap();

        assert_eq!(sink.written().len(), 1);
        let data = fs::read_to_string(&sink.written()[0]).unwrap();
        let restored: SubmissionRecord = serde_json::from_str(&data).unwrap();
        assert_eq!(restored, record);
    }

    #[test]
    fn log_and_noop_sinks_accept_records() {
        let record = record();
        assert!(LogSink.submit(&record).is_ok());
        assert!(NoopSink.submit(&record).is_ok());
    }

    #[test]
    fn memory_sink_keeps_order() {
        let mut sink = MemorySink::new();
        let first = record();
        let second = record();
        sink.submit(&first).unwrap();
        sink.submit(&second).unwrap();
        assert_eq!(sink.records, vec![first, second]);
    }
}
