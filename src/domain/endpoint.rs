// Endpoint domain model - Where and how to reach the router
use thiserror::Error;

/// Username the router web API expects; no other account is supported.
pub const DEFAULT_USERNAME: &str = "admin";

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ConfigError {
    #[error("router host must not be empty")]
    EmptyHost,
    #[error("router password must not be empty")]
    EmptyPassword,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Endpoint {
    host: String,
    password: String,
    username: &'static str,
}

impl Endpoint {
    /// Both values are trimmed before validation.
    pub fn new(host: &str, password: &str) -> Result<Self, ConfigError> {
        let host = host.trim().trim_end_matches('/');
        let password = password.trim();

        if host.is_empty() {
            return Err(ConfigError::EmptyHost);
        }
        if password.is_empty() {
            return Err(ConfigError::EmptyPassword);
        }

        Ok(Self {
            host: host.to_string(),
            password: password.to_string(),
            username: DEFAULT_USERNAME,
        })
    }

    pub fn host(&self) -> &str {
        &self.host
    }

    pub fn username(&self) -> &str {
        self.username
    }

    pub fn password(&self) -> &str {
        &self.password
    }

    /// Connection target of the form `http://admin:<password>@<host>/`.
    pub fn url(&self) -> String {
        let (scheme, host) = match self.host.split_once("://") {
            Some((scheme, rest)) => (scheme, rest),
            None => ("http", self.host.as_str()),
        };
        format!(
            "{}://{}:{}@{}/",
            scheme,
            self.username,
            urlencoding::encode(&self.password),
            host
        )
    }
}
