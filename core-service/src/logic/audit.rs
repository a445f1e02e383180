//! Audit Log Module - Ghi lại mọi feature record đã build
//!
//! Purpose: trace exactly what was sent to the classifier.
//!
//! Log format: CSV, header row once, one row per record in FEATURE_LAYOUT order
//! Location: configurable, default `input_data.csv` in the working directory
//!
//! The file is never rotated or truncated.

use std::fs::OpenOptions;
use std::io::Write;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicU64, Ordering};

use parking_lot::{Mutex, RwLock};
use thiserror::Error;

use crate::logic::features::layout::{validate_names, LayoutMismatchError, FEATURE_LAYOUT};
use crate::logic::features::record::{FeatureRecord, RowError};

// ============================================================================
// CONSTANTS
// ============================================================================

pub const AUDIT_FILE_NAME: &str = "input_data.csv";

// ============================================================================
// ERRORS
// ============================================================================

/// Non-fatal: reported by the sink, logged by the caller
#[derive(Debug, Error)]
pub enum AuditWriteError {
    #[error("audit log I/O failed for {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("audit row encoding failed: {0}")]
    Encode(#[from] csv::Error),
}

#[derive(Debug, Error)]
pub enum AuditReadError {
    #[error("audit log read failed: {0}")]
    Csv(#[from] csv::Error),

    #[error("audit log header does not match the feature layout: {0}")]
    Header(#[from] LayoutMismatchError),

    #[error("audit log line {line}: {source}")]
    Row {
        line: u64,
        #[source]
        source: RowError,
    },
}

// ============================================================================
// SINK TRAIT
// ============================================================================

/// Append-only destination for built records
pub trait AuditSink: Send + Sync {
    fn append(&self, record: &FeatureRecord) -> Result<(), AuditWriteError>;
}

/// Disabled audit
#[derive(Debug, Default, Clone, Copy)]
pub struct NullAuditSink;

impl AuditSink for NullAuditSink {
    fn append(&self, _record: &FeatureRecord) -> Result<(), AuditWriteError> {
        Ok(())
    }
}

/// In-memory audit, for tests and inspection
#[derive(Debug, Default)]
pub struct MemoryAuditSink {
    records: RwLock<Vec<FeatureRecord>>,
}

impl MemoryAuditSink {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn records(&self) -> Vec<FeatureRecord> {
        self.records.read().clone()
    }

    pub fn len(&self) -> usize {
        self.records.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.read().is_empty()
    }
}

impl AuditSink for MemoryAuditSink {
    fn append(&self, record: &FeatureRecord) -> Result<(), AuditWriteError> {
        self.records.write().push(record.clone());
        Ok(())
    }
}

// ============================================================================
// CSV FILE SINK
// ============================================================================

/// Flat CSV audit file.
///
/// Each append is serialized in memory and written with one `write_all` on
/// an append-mode handle, under a lock, so rows never interleave.
#[derive(Debug)]
pub struct CsvAuditLog {
    path: PathBuf,
    lock: Mutex<()>,
    write_count: AtomicU64,
}

impl CsvAuditLog {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            lock: Mutex::new(()),
            write_count: AtomicU64::new(0),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Rows appended by this process
    pub fn write_count(&self) -> u64 {
        self.write_count.load(Ordering::Relaxed)
    }

    fn io_error(&self, source: std::io::Error) -> AuditWriteError {
        AuditWriteError::Io {
            path: self.path.clone(),
            source,
        }
    }

    /// Replay the log into records
    pub fn read_records(&self) -> Result<Vec<FeatureRecord>, AuditReadError> {
        if !self.path.exists() {
            return Ok(Vec::new());
        }

        let mut reader = csv::Reader::from_path(&self.path)?;
        let headers: Vec<String> = reader.headers()?.iter().map(|h| h.to_string()).collect();
        validate_names(&headers)?;

        let mut records = Vec::new();
        for row in reader.records() {
            let row = row?;
            let line = row.position().map(|p| p.line()).unwrap_or(0);
            let cells: Vec<&str> = row.iter().collect();
            let record =
                FeatureRecord::from_row(&cells).map_err(|source| AuditReadError::Row { line, source })?;
            records.push(record);
        }

        log::info!("Loaded {} audit records from {}", records.len(), self.path.display());
        Ok(records)
    }
}

impl AuditSink for CsvAuditLog {
    fn append(&self, record: &FeatureRecord) -> Result<(), AuditWriteError> {
        let _guard = self.lock.lock();

        // Ensure parent directory exists
        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent).map_err(|e| self.io_error(e))?;
            }
        }

        let mut file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.path)
            .map_err(|e| self.io_error(e))?;

        let mut buf = Vec::new();
        let is_empty = file.metadata().map_err(|e| self.io_error(e))?.len() == 0;
        if is_empty {
            buf.extend(encode_row(FEATURE_LAYOUT)?);
        }
        buf.extend(encode_row(&record.to_row())?);

        file.write_all(&buf).map_err(|e| self.io_error(e))?;

        self.write_count.fetch_add(1, Ordering::Relaxed);
        Ok(())
    }
}

fn encode_row<I, T>(fields: I) -> Result<Vec<u8>, csv::Error>
where
    I: IntoIterator<Item = T>,
    T: AsRef<[u8]>,
{
    let mut writer = csv::WriterBuilder::new()
        .has_headers(false)
        .from_writer(Vec::new());
    writer.write_record(fields)?;
    writer
        .into_inner()
        .map_err(|e| csv::Error::from(e.into_error()))
}

// ============================================================================
// TESTS
// ============================================================================
