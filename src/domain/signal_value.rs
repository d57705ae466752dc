// Signal value parsing - vendor strings like "-110dBm" to numbers

/// Convert a measurement such as `-110dBm` or `-14.0dB` to a number.
/// Returns `None` for empty input or anything that is not a finite decimal
/// once the unit suffix is removed.
pub fn parse_signal_value(value: &str) -> Option<f64> {
    if value.is_empty() {
        return None;
    }

    // "dbm" must go first, otherwise "db" would leave a dangling "m"
    let cleaned = value.to_lowercase().replace("dbm", "").replace("db", "");
    cleaned
        .trim()
        .parse::<f64>()
        .ok()
        .filter(|v| v.is_finite())
}
