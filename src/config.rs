use std::env;

use thiserror::Error;

/// Enumerates errors returned while reading configuration.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// Represents a required environment variable that isn't set.
    #[error("must define {name} environment variable")]
    Missing { name: String },
}

/// Returns the value of the named environment variable.
pub fn get_variable(name: &str) -> Result<String, ConfigError> {
    env::var(name).map_err(|_| ConfigError::Missing { name: name.to_owned() })
}

/// Settings for the `survey` command.
#[derive(Clone, Debug)]
pub struct Config {
    /// The origin address recorded for every submission read from
    /// standard input.
    pub(crate) source_ip: String,
}

impl Config {
    pub fn new(source_ip: impl Into<String>) -> Self {
        Self {
            source_ip: source_ip.into(),
        }
    }

    pub fn from_env() -> Result<Self, ConfigError> {
        Ok(Self::new(get_variable("SURVEY_SOURCE_IP")?))
    }

    pub fn source_ip(&self) -> &str {
        &self.source_ip
    }
}
