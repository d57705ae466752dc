// Application state for HTTP handlers
use crate::domain::snapshot::Snapshot;
use tokio::sync::watch;

#[derive(Clone)]
pub struct AppState {
    pub snapshots: watch::Receiver<Snapshot>,
}
