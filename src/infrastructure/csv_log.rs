// CSV signal log - Append-only record of every raw reading
use crate::domain::reading::LogRecord;
use std::fs::{self, OpenOptions};
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use thiserror::Error;

pub const LOG_HEADER: [&str; 10] = [
    "Timestamp",
    "RSRP (dBm)",
    "RSRQ (dB)",
    "RSSI (dBm)",
    "SINR (dB)",
    "PCI",
    "Cell ID",
    "Band",
    "DL Bandwidth",
    "UL Bandwidth",
];

#[derive(Debug, Error)]
pub enum LogError {
    #[error("failed to create signal log {path}: {source}")]
    Init { path: PathBuf, source: io::Error },
    #[error("failed to append to signal log {path}: {source}")]
    Append { path: PathBuf, source: io::Error },
}

#[derive(Debug, Clone)]
pub struct CsvSignalLog {
    path: PathBuf,
}

impl CsvSignalLog {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Create the file with its header row unless it already exists.
    /// An existing file is never touched.
    pub fn ensure_initialized(&self) -> Result<(), LogError> {
        let init_err = |source| LogError::Init {
            path: self.path.clone(),
            source,
        };

        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent).map_err(init_err)?;
            }
        }

        // create_new fails if the file exists, so the header is written once
        match OpenOptions::new().write(true).create_new(true).open(&self.path) {
            Ok(mut file) => {
                file.write_all(encode_row(LOG_HEADER).as_bytes())
                    .and_then(|_| file.flush())
                    .map_err(init_err)?;
                tracing::info!("Created signal log {}", self.path.display());
                Ok(())
            }
            Err(e) if e.kind() == io::ErrorKind::AlreadyExists => Ok(()),
            Err(e) => Err(init_err(e)),
        }
    }

    /// Append one row. The file is opened, flushed and closed per call.
    pub fn append(&self, record: &LogRecord) -> Result<(), LogError> {
        let append_err = |source| LogError::Append {
            path: self.path.clone(),
            source,
        };

        let mut file = OpenOptions::new()
            .append(true)
            .open(&self.path)
            .map_err(append_err)?;
        file.write_all(encode_row(record.columns()).as_bytes())
            .and_then(|_| file.flush())
            .map_err(append_err)
    }
}

fn encode_row<I, S>(columns: I) -> String
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    let fields: Vec<String> = columns
        .into_iter()
        .map(|c| escape_field(c.as_ref()))
        .collect();
    format!("{}\r\n", fields.join(","))
}

fn escape_field(field: &str) -> String {
    if field.contains([',', '"', '\r', '\n']) {
        format!("\"{}\"", field.replace('"', "\"\""))
    } else {
        field.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::reading::RawReading;
    use chrono::NaiveDate;

    const HEADER_LINE: &str = "Timestamp,RSRP (dBm),RSRQ (dB),RSSI (dBm),SINR (dB),PCI,Cell ID,Band,DL Bandwidth,UL Bandwidth";

    fn record(second: u32, rsrp: &str) -> LogRecord {
        let timestamp = NaiveDate::from_ymd_opt(2024, 3, 9)
            .unwrap()
            .and_hms_opt(7, 5, second)
            .unwrap();
        let reading = RawReading::default()
            .with_field("rsrp", rsrp)
            .with_field("rsrq", "-14.0dB")
            .with_field("band", "3")
            .with_field("dlbandwidth", "20MHz");
        LogRecord::new(timestamp, reading)
    }

    fn lines(log: &CsvSignalLog) -> Vec<String> {
        fs::read_to_string(log.path())
            .unwrap()
            .lines()
            .map(str::to_string)
            .collect()
    }

    #[test]
    fn test_initialize_twice_writes_one_header() {
        let dir = tempfile::tempdir().unwrap();
        let log = CsvSignalLog::new(dir.path().join("signal_data.csv"));

        log.ensure_initialized().unwrap();
        log.ensure_initialized().unwrap();

        assert_eq!(lines(&log), vec![HEADER_LINE]);
    }

    #[test]
    fn test_appends_rows_after_header() {
        let dir = tempfile::tempdir().unwrap();
        let log = CsvSignalLog::new(dir.path().join("signal_data.csv"));
        log.ensure_initialized().unwrap();

        for second in 0..4 {
            log.append(&record(second, "-110dBm")).unwrap();
        }

        let lines = lines(&log);
        assert_eq!(lines.len(), 5);
        assert_eq!(lines[0], HEADER_LINE);
        assert_eq!(
            lines[1],
            "2024-03-09 07:05:00,-110dBm,-14.0dB,,,,,3,20MHz,"
        );
    }

    #[test]
    fn test_reinitialize_keeps_existing_rows() {
        let dir = tempfile::tempdir().unwrap();
        let log = CsvSignalLog::new(dir.path().join("signal_data.csv"));
        log.ensure_initialized().unwrap();
        log.append(&record(1, "-100dBm")).unwrap();
        log.append(&record(2, "-105dBm")).unwrap();
        let before = fs::read_to_string(log.path()).unwrap();

        log.ensure_initialized().unwrap();

        assert_eq!(fs::read_to_string(log.path()).unwrap(), before);
    }

    #[test]
    fn test_creates_parent_directories() {
        let dir = tempfile::tempdir().unwrap();
        let log = CsvSignalLog::new(dir.path().join("logs/lte/signal.csv"));
        log.ensure_initialized().unwrap();
        assert_eq!(lines(&log), vec![HEADER_LINE]);
    }

    #[test]
    fn test_append_without_file_fails() {
        let dir = tempfile::tempdir().unwrap();
        let log = CsvSignalLog::new(dir.path().join("missing/signal.csv"));

        let err = log.append(&record(0, "-90dBm")).unwrap_err();
        assert!(matches!(err, LogError::Append { .. }));
    }

    #[test]
    fn test_escapes_special_characters() {
        assert_eq!(escape_field("20MHz"), "20MHz");
        assert_eq!(escape_field("a,b"), "\"a,b\"");
        assert_eq!(escape_field("say \"hi\""), "\"say \"\"hi\"\"\"");
    }
}
