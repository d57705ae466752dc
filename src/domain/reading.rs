// Signal reading domain models
use super::signal_value::parse_signal_value;
use chrono::NaiveDateTime;
use serde::Serialize;
use std::collections::BTreeMap;

pub const TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

/// Router fields in log column order.
pub const READING_FIELDS: [&str; 9] = [
    "rsrp",
    "rsrq",
    "rssi",
    "sinr",
    "pci",
    "cell_id",
    "band",
    "dlbandwidth",
    "ulbandwidth",
];

/// Display labels matching `READING_FIELDS`.
const FIELD_LABELS: [&str; 9] = [
    "RSRP",
    "RSRQ",
    "RSSI",
    "SINR",
    "PCI",
    "Cell ID",
    "Band",
    "DL Bandwidth",
    "UL Bandwidth",
];

/// Fields as reported by the router, units and all.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct RawReading {
    fields: BTreeMap<String, String>,
}

impl RawReading {
    pub fn new(fields: BTreeMap<String, String>) -> Self {
        Self { fields }
    }

    #[cfg(test)]
    pub fn with_field(mut self, key: &str, value: &str) -> Self {
        self.fields.insert(key.to_string(), value.to_string());
        self
    }

    /// Missing fields read as an empty string.
    pub fn get(&self, key: &str) -> &str {
        self.fields.get(key).map(String::as_str).unwrap_or("")
    }

    pub fn fields(&self) -> &BTreeMap<String, String> {
        &self.fields
    }

    pub fn parse(&self) -> ParsedSample {
        ParsedSample {
            rsrp: parse_signal_value(self.get("rsrp")),
            rsrq: parse_signal_value(self.get("rsrq")),
            rssi: parse_signal_value(self.get("rssi")),
            sinr: parse_signal_value(self.get("sinr")),
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize)]
pub struct ParsedSample {
    pub rsrp: Option<f64>,
    pub rsrq: Option<f64>,
    pub rssi: Option<f64>,
    pub sinr: Option<f64>,
}

/// A reading stamped at acquisition time, as written to the log.
#[derive(Debug, Clone, PartialEq)]
pub struct LogRecord {
    pub timestamp: NaiveDateTime,
    pub reading: RawReading,
}

impl LogRecord {
    pub fn new(timestamp: NaiveDateTime, reading: RawReading) -> Self {
        Self { timestamp, reading }
    }

    pub fn formatted_timestamp(&self) -> String {
        self.timestamp.format(TIMESTAMP_FORMAT).to_string()
    }

    /// Timestamp followed by the raw fields in log column order.
    pub fn columns(&self) -> Vec<String> {
        let mut columns = Vec::with_capacity(READING_FIELDS.len() + 1);
        columns.push(self.formatted_timestamp());
        columns.extend(
            READING_FIELDS
                .iter()
                .map(|field| self.reading.get(field).to_string()),
        );
        columns
    }

    /// Multi-line label text, one `Label: value` per line.
    pub fn describe(&self) -> String {
        let mut text = format!("Timestamp: {}\n", self.formatted_timestamp());
        for (label, field) in FIELD_LABELS.iter().zip(READING_FIELDS) {
            text.push_str(&format!("{}: {}\n", label, self.reading.get(field)));
        }
        text
    }
}
