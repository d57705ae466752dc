// Monitor session - Drives the fetch -> parse -> buffer -> log -> snapshot loop
use crate::application::acquisition_client::AcquisitionClient;
use crate::application::window_buffer::{WindowBuffer, DEFAULT_CAPACITY};
use crate::domain::endpoint::{ConfigError, Endpoint};
use crate::domain::reading::{LogRecord, ParsedSample, RawReading};
use crate::domain::snapshot::{SessionState, Snapshot};
use crate::infrastructure::csv_log::CsvSignalLog;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::watch;

pub const TICK_INTERVAL: Duration = Duration::from_millis(2000);

/// Result of one tick, consumed by the snapshot path.
#[derive(Debug, Clone, PartialEq)]
pub enum TickOutcome {
    Recorded {
        index: u64,
        record: LogRecord,
        sample: ParsedSample,
        log_error: Option<String>,
    },
    Failed {
        cause: String,
    },
}

pub struct MonitorSession {
    client: Arc<dyn AcquisitionClient>,
    log: CsvSignalLog,
    buffer: WindowBuffer,
    endpoint: Option<Endpoint>,
    state: SessionState,
    sample_index: u64,
    snapshot_tx: watch::Sender<Snapshot>,
}

impl MonitorSession {
    pub fn new(client: Arc<dyn AcquisitionClient>, log: CsvSignalLog) -> Self {
        Self::with_capacity(client, log, DEFAULT_CAPACITY)
    }

    pub fn with_capacity(
        client: Arc<dyn AcquisitionClient>,
        log: CsvSignalLog,
        capacity: usize,
    ) -> Self {
        let (snapshot_tx, _) = watch::channel(Snapshot::waiting(SessionState::Idle));
        Self {
            client,
            log,
            buffer: WindowBuffer::new(capacity),
            endpoint: None,
            state: SessionState::Idle,
            sample_index: 0,
            snapshot_tx,
        }
    }

    /// Receiver that always holds the latest complete snapshot.
    pub fn subscribe(&self) -> watch::Receiver<Snapshot> {
        self.snapshot_tx.subscribe()
    }

    #[cfg(test)]
    pub fn state(&self) -> SessionState {
        self.state
    }

    #[cfg(test)]
    pub fn endpoint(&self) -> Option<&Endpoint> {
        self.endpoint.as_ref()
    }

    #[cfg(test)]
    pub fn buffer(&self) -> &WindowBuffer {
        &self.buffer
    }

    /// Validate credentials, arm the session and run the first tick right away.
    /// On a configuration error nothing changes.
    pub async fn connect(
        &mut self,
        host: &str,
        password: &str,
    ) -> Result<TickOutcome, ConfigError> {
        let endpoint = Endpoint::new(host, password)?;
        tracing::info!("Connecting to router at {}", endpoint.host());

        self.endpoint = Some(endpoint.clone());
        self.state = SessionState::Armed;
        self.snapshot_tx
            .send_replace(Snapshot::waiting(SessionState::Armed));

        Ok(self.tick_with(&endpoint).await)
    }

    /// One fetch-parse-persist cycle. Does nothing until connected.
    pub async fn tick(&mut self) -> Option<TickOutcome> {
        let endpoint = self.endpoint.clone()?;
        Some(self.tick_with(&endpoint).await)
    }

    /// Tick forever, sleeping a fixed interval after each tick completes.
    /// Ticks never overlap since each one finishes before the next sleep.
    pub async fn run(mut self) {
        loop {
            tokio::time::sleep(TICK_INTERVAL).await;
            self.tick().await;
        }
    }

    async fn tick_with(&mut self, endpoint: &Endpoint) -> TickOutcome {
        self.state = SessionState::Ticking;
        self.snapshot_tx
            .send_modify(|snapshot| snapshot.state = SessionState::Ticking);

        let outcome = match self.client.fetch_metrics(endpoint).await {
            Ok(reading) => self.record(reading),
            Err(e) => {
                tracing::warn!("Failed to fetch signal from {}: {}", endpoint.host(), e);
                TickOutcome::Failed {
                    cause: e.to_string(),
                }
            }
        };

        if let TickOutcome::Recorded { index, sample, .. } = &outcome {
            tracing::debug!(
                "Sample {}: rsrp={:?} rsrq={:?} rssi={:?} sinr={:?}",
                index,
                sample.rsrp,
                sample.rsrq,
                sample.rssi,
                sample.sinr
            );
        }

        self.state = SessionState::Armed;
        self.publish(&outcome);
        outcome
    }

    fn record(&mut self, reading: RawReading) -> TickOutcome {
        let record = LogRecord::new(chrono::Local::now().naive_local(), reading);
        let sample = record.reading.parse();

        // The buffer is updated even if the log write fails
        let log_error = match self.log.append(&record) {
            Ok(()) => None,
            Err(e) => {
                tracing::warn!("{}", e);
                Some(e.to_string())
            }
        };

        self.sample_index += 1;
        self.buffer.append(self.sample_index, sample);

        TickOutcome::Recorded {
            index: self.sample_index,
            record,
            sample,
            log_error,
        }
    }

    fn publish(&self, outcome: &TickOutcome) {
        let snapshot = match outcome {
            TickOutcome::Recorded {
                record, log_error, ..
            } => Snapshot::reading(
                self.state,
                record,
                self.buffer.snapshot(),
                log_error.clone(),
            ),
            TickOutcome::Failed { cause } => Snapshot::failure(self.state, cause.clone()),
        };
        self.snapshot_tx.send_replace(snapshot);
    }
}
