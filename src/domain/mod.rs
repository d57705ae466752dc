// Domain layer - Signal readings, samples and snapshots
pub mod endpoint;
pub mod reading;
pub mod signal_value;
pub mod snapshot;
