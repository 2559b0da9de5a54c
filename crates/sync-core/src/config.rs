//! Normalized connection configuration.
//!
//! `Config` is produced by the host layer (CLI flags, environment, files) and
//! handed to [`Driver::init`](crate::Driver::init). It carries no dialect
//! knowledge; each driver decides how to translate the free-form options.

use serde::{Deserialize, Serialize};
use std::fmt;
use tracing::debug;

/// Dialect-independent connection parameters.
#[derive(Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Config {
    /// Server hostname or IP address
    pub hostname: String,

    /// Server TCP port
    pub port: u16,

    /// Login user
    pub username: String,

    /// Login password
    #[serde(default)]
    pub password: String,

    /// Database to connect to
    pub database: String,

    /// Free-form `key=value` connection options, in caller order
    #[serde(default)]
    pub options: Vec<String>,
}

impl Config {
    /// Well-formed options as ordered `(key, value)` pairs.
    ///
    /// Entries that do not split into exactly one key and one value are
    /// dropped. A repeated key keeps its first position and its last value.
    pub fn parsed_options(&self) -> Vec<(String, String)> {
        let mut parsed: Vec<(String, String)> = Vec::new();

        for option in &self.options {
            let Some((key, value)) = parse_option(option) else {
                debug!("Ignoring malformed connection option: {:?}", option);
                continue;
            };

            match parsed.iter_mut().find(|(k, _)| k == key) {
                Some(existing) => existing.1 = value.to_string(),
                None => parsed.push((key.to_string(), value.to_string())),
            }
        }

        parsed
    }

    /// `host:port/database`, safe to log.
    pub fn target(&self) -> String {
        format!("{}:{}/{}", self.hostname, self.port, self.database)
    }
}

impl fmt::Debug for Config {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Config")
            .field("hostname", &self.hostname)
            .field("port", &self.port)
            .field("username", &self.username)
            .field("password", &"***")
            .field("database", &self.database)
            .field("options", &self.options)
            .finish()
    }
}

/// Split a `key=value` option string.
///
/// Returns `None` unless the string contains exactly one `=`.
pub fn parse_option(option: &str) -> Option<(&str, &str)> {
    let mut parts = option.split('=');
    match (parts.next(), parts.next(), parts.next()) {
        (Some(key), Some(value), None) => Some((key, value)),
        _ => None,
    }
}
