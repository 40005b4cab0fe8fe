//! JSON-lines log of batch reads, one record per card or duplex pair.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use std::fs::{self, OpenOptions};
use std::io::{BufRead, BufReader, BufWriter, Write};
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};

use crate::core::duplex::DuplexVerdict;
use crate::core::encoding::Hollerith;
use crate::core::reader::CardReading;

const REPORT_VERSION: u8 = 1;

/// One scanned face as it appears in a report.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct FaceRecord {
    pub path: PathBuf,
    pub sha256: String,
}

impl FaceRecord {
    pub fn for_file(path: &Path) -> Result<Self> {
        Ok(Self {
            path: path.to_path_buf(),
            sha256: file_digest(path)?,
        })
    }
}

/// Outcome of reading one card.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ReadRecord {
    pub version: u8,
    pub timestamp: DateTime<Utc>,
    pub front: FaceRecord,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub back: Option<FaceRecord>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub text: Option<String>,
    #[serde(default)]
    pub binary: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub verdict: Option<DuplexVerdict>,
    #[serde(default)]
    pub findings: usize,
    #[serde(default)]
    pub columns: Vec<Hollerith>,
    /// Set when the card could not be registered.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl ReadRecord {
    pub fn new(front: FaceRecord, back: Option<FaceRecord>) -> Self {
        Self {
            version: REPORT_VERSION,
            timestamp: Utc::now(),
            front,
            back,
            text: None,
            binary: false,
            verdict: None,
            findings: 0,
            columns: Vec::new(),
            error: None,
        }
    }

    pub fn with_reading(mut self, reading: &CardReading) -> Self {
        self.text = Some(reading.text());
        self.binary = !reading.decoded.is_printable();
        self.findings = reading.findings.len();
        self.columns = reading.pattern.columns().to_vec();
        self
    }

    pub fn with_verdict(mut self, verdict: DuplexVerdict) -> Self {
        self.verdict = Some(verdict);
        self
    }

    pub fn with_error(mut self, error: impl ToString) -> Self {
        self.error = Some(error.to_string());
        self
    }
}

/// Appends records to a report file.
pub struct ReportWriter {
    writer: BufWriter<fs::File>,
    path: PathBuf,
}

impl ReportWriter {
    pub fn append(path: &Path) -> Result<Self> {
        let file = OpenOptions::new()
            .append(true)
            .create(true)
            .open(path)
            .with_context(|| format!("failed to open report {}", path.display()))?;
        Ok(Self {
            writer: BufWriter::new(file),
            path: path.to_path_buf(),
        })
    }

    pub fn write(&mut self, record: &ReadRecord) -> Result<()> {
        serde_json::to_writer(&mut self.writer, record)
            .with_context(|| format!("failed to serialize record for {}", self.path.display()))?;
        self.writer.write_all(b"\n")?;
        Ok(())
    }

    pub fn finish(mut self) -> Result<()> {
        self.writer
            .flush()
            .with_context(|| format!("failed to write report {}", self.path.display()))
    }
}

pub fn load_report(path: &Path) -> Result<Vec<ReadRecord>> {
    let file = fs::File::open(path)
        .with_context(|| format!("failed to open report {}", path.display()))?;
    let mut records = Vec::new();
    for (idx, raw) in BufReader::new(file).lines().enumerate() {
        let raw = raw?;
        if raw.trim().is_empty() {
            continue;
        }
        let record = serde_json::from_str(&raw).with_context(|| {
            format!("failed to parse record at line {} in {}", idx + 1, path.display())
        })?;
        records.push(record);
    }
    Ok(records)
}

/// Hex SHA-256 of a file's bytes.
pub fn file_digest(path: &Path) -> Result<String> {
    let bytes = fs::read(path).with_context(|| format!("failed to read {}", path.display()))?;
    let digest = Sha256::digest(&bytes);
    Ok(format!("{digest:x}"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn records_append_and_load() {
        let dir = tempfile::tempdir().unwrap();
        let scan = dir.path().join("card.png");
        fs::write(&scan, b"abc").unwrap();
        let report = dir.path().join("read.jsonl");

        let face = FaceRecord::for_file(&scan).unwrap();
        assert_eq!(
            face.sha256,
            "ba7816bf8f01cfea414140de5dae2223b00361a396177a9cb410ff61f20015ad"
        );
        let good = ReadRecord::new(face.clone(), Some(face.clone())).with_verdict(DuplexVerdict::Good);
        let failed = ReadRecord::new(face, None).with_error("card aborted");

        let mut writer = ReportWriter::append(&report).unwrap();
        writer.write(&good).unwrap();
        writer.finish().unwrap();
        let mut writer = ReportWriter::append(&report).unwrap();
        writer.write(&failed).unwrap();
        writer.finish().unwrap();

        let loaded = load_report(&report).unwrap();
        assert_eq!(loaded, vec![good, failed]);
    }
}
