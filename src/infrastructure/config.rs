use serde::Deserialize;

pub const CONFIG_FILE: &str = "config/monitor";
pub const ENV_PREFIX: &str = "SIGNAL_MONITOR";

#[derive(Debug, Deserialize, Clone, Default)]
pub struct MonitorConfig {
    #[serde(default)]
    pub device: DeviceSettings,
    #[serde(default)]
    pub log: LogSettings,
    #[serde(default)]
    pub server: ServerSettings,
}

#[derive(Debug, Deserialize, Clone)]
pub struct DeviceSettings {
    #[serde(default)]
    pub host: String,
    #[serde(default)]
    pub password: String,
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
}

impl Default for DeviceSettings {
    fn default() -> Self {
        Self {
            host: String::new(),
            password: String::new(),
            timeout_secs: default_timeout_secs(),
        }
    }
}

#[derive(Debug, Deserialize, Clone)]
pub struct LogSettings {
    #[serde(default = "default_log_path")]
    pub path: String,
}

impl Default for LogSettings {
    fn default() -> Self {
        Self {
            path: default_log_path(),
        }
    }
}

#[derive(Debug, Deserialize, Clone)]
pub struct ServerSettings {
    #[serde(default = "default_bind")]
    pub bind: String,
}

impl Default for ServerSettings {
    fn default() -> Self {
        Self {
            bind: default_bind(),
        }
    }
}

fn default_timeout_secs() -> u64 {
    5
}

fn default_log_path() -> String {
    "signal_data.csv".to_string()
}

fn default_bind() -> String {
    "0.0.0.0:8080".to_string()
}

/// Load `config/monitor.*` (optional) with `SIGNAL_MONITOR__SECTION__KEY` overrides.
pub fn load_monitor_config() -> anyhow::Result<MonitorConfig> {
    let settings = config::Config::builder()
        .add_source(config::File::with_name(CONFIG_FILE).required(false))
        .add_source(config::Environment::with_prefix(ENV_PREFIX).separator("__"))
        .build()?;

    Ok(settings.try_deserialize()?)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn from_toml(text: &str) -> MonitorConfig {
        config::Config::builder()
            .add_source(config::File::from_str(text, config::FileFormat::Toml))
            .build()
            .unwrap()
            .try_deserialize()
            .unwrap()
    }

    #[test]
    fn test_full_config() {
        let config = from_toml(
            r#"
            [device]
            host = "192.168.8.1"
            password = "secret"
            timeout_secs = 3

            [log]
            path = "/var/log/signal.csv"

            [server]
            bind = "127.0.0.1:9000"
            "#,
        );

        assert_eq!(config.device.host, "192.168.8.1");
        assert_eq!(config.device.password, "secret");
        assert_eq!(config.device.timeout_secs, 3);
        assert_eq!(config.log.path, "/var/log/signal.csv");
        assert_eq!(config.server.bind, "127.0.0.1:9000");
    }

    #[test]
    fn test_defaults() {
        let config = from_toml("[device]\nhost = \"192.168.8.1\"\n");

        assert_eq!(config.device.password, "");
        assert_eq!(config.device.timeout_secs, 5);
        assert_eq!(config.log.path, "signal_data.csv");
        assert_eq!(config.server.bind, "0.0.0.0:8080");
    }
}
