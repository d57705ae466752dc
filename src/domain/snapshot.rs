// Snapshot domain model - What the session hands to the renderer after a tick
use super::reading::{LogRecord, ParsedSample};
use serde::Serialize;
use std::collections::BTreeMap;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum SessionState {
    Idle,
    Armed,
    Ticking,
}

/// One window buffer entry.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct SamplePoint {
    pub index: u64,
    #[serde(flatten)]
    pub sample: ParsedSample,
}

impl SamplePoint {
    pub fn new(index: u64, sample: ParsedSample) -> Self {
        Self { index, sample }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "kind", rename_all = "lowercase")]
pub enum SnapshotBody {
    /// Nothing fetched yet.
    Waiting,
    Reading {
        timestamp: String,
        text: String,
        fields: BTreeMap<String, String>,
        samples: Vec<SamplePoint>,
        log_error: Option<String>,
    },
    Failure {
        cause: String,
    },
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Snapshot {
    pub state: SessionState,
    pub body: SnapshotBody,
}

impl Snapshot {
    pub fn waiting(state: SessionState) -> Self {
        Self {
            state,
            body: SnapshotBody::Waiting,
        }
    }

    pub fn reading(
        state: SessionState,
        record: &LogRecord,
        samples: Vec<SamplePoint>,
        log_error: Option<String>,
    ) -> Self {
        Self {
            state,
            body: SnapshotBody::Reading {
                timestamp: record.formatted_timestamp(),
                text: record.describe(),
                fields: record.reading.fields().clone(),
                samples,
                log_error,
            },
        }
    }

    pub fn failure(state: SessionState, cause: String) -> Self {
        Self {
            state,
            body: SnapshotBody::Failure { cause },
        }
    }

    #[cfg(test)]
    pub fn is_failure(&self) -> bool {
        matches!(self.body, SnapshotBody::Failure { .. })
    }
}
