//! MySQL connection setup
//!
//! Translates a normalized [`Config`] into `mysql_async` options and opens the
//! single connection a [`MySQLSource`](crate::MySQLSource) owns.

use mysql_async::{Conn, Opts, OptsBuilder};
use sync_core::{Config, SourceError};
use tracing::{debug, info};
use url::Url;

/// Option keys `mysql_async` interprets itself, as in its `mysql://` URLs.
///
/// Every other option is a server session variable.
pub const CLIENT_PARAMS: &[&str] = &[
    "pool_min",
    "pool_max",
    "inactive_connection_ttl",
    "ttl_check_interval",
    "conn_ttl",
    "abs_conn_ttl",
    "abs_conn_ttl_jitter",
    "tcp_keepalive",
    "max_allowed_packet",
    "wait_timeout",
    "enable_cleartext_plugin",
    "reset_connection",
    "tcp_nodelay",
    "stmt_cache_size",
    "prefer_socket",
    "secure_auth",
    "client_found_rows",
    "socket",
    "compression",
    "require_ssl",
    "verify_ca",
    "verify_identity",
    "built_in_roots",
];

pub fn is_client_param(key: &str) -> bool {
    CLIENT_PARAMS.contains(&key)
}

/// Connection parameters derived from a [`Config`].
///
/// Options naming a client setting configure `mysql_async` directly. The rest
/// become session setup statements run right after the handshake, the same
/// way a MySQL DSN applies its unknown query parameters. Session values are
/// sent as written and must come from a trusted caller; statement separators
/// are refused.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConnectionParams {
    pub hostname: String,
    pub port: u16,
    pub username: String,
    password: String,
    pub database: String,
    pub params: Vec<(String, String)>,
}

impl ConnectionParams {
    pub fn from_config(config: &Config) -> Result<Self, SourceError> {
        let params = config.parsed_options();

        for (key, value) in &params {
            if !is_plain_identifier(key) {
                return Err(SourceError::connection(format!(
                    "Invalid connection option name {key:?}: expected letters, digits and underscores"
                )));
            }
            if !is_client_param(key) && value.contains(';') {
                return Err(SourceError::connection(format!(
                    "Invalid value for connection option {key:?}: ';' is not allowed"
                )));
            }
        }

        Ok(Self {
            hostname: config.hostname.clone(),
            port: config.port,
            username: config.username.clone(),
            password: config.password.clone(),
            database: config.database.clone(),
            params,
        })
    }

    /// Look up a connection parameter by name.
    pub fn param(&self, key: &str) -> Option<&str> {
        self.params
            .iter()
            .find(|(k, _)| k == key)
            .map(|(_, v)| v.as_str())
    }

    /// Parameters handled by the client library.
    pub fn client_params(&self) -> impl Iterator<Item = (&str, &str)> {
        self.params
            .iter()
            .filter(|(k, _)| is_client_param(k))
            .map(|(k, v)| (k.as_str(), v.as_str()))
    }

    /// Statements executed on every new connection.
    pub fn init_statements(&self) -> Vec<String> {
        self.params
            .iter()
            .filter(|(key, _)| !is_client_param(key))
            .map(|(key, value)| match key.as_str() {
                "charset" => format!("SET NAMES {value}"),
                _ => format!("SET {key}={value}"),
            })
            .collect()
    }

    /// Client options, with client parameters parsed by `mysql_async` itself.
    pub fn to_opts(&self) -> Result<Opts, SourceError> {
        let mut url = Url::parse("mysql://localhost/")
            .map_err(|e| SourceError::connection(format!("Invalid base URL: {e}")))?;
        if self.client_params().next().is_some() {
            url.query_pairs_mut().extend_pairs(self.client_params());
        }

        let base = Opts::from_url(url.as_str()).map_err(|e| {
            SourceError::connection(format!("Invalid MySQL client option: {e}"))
        })?;

        let builder = OptsBuilder::from_opts(base)
            .ip_or_hostname(self.hostname.clone())
            .tcp_port(self.port)
            .user(Some(self.username.clone()))
            .pass(Some(self.password.clone()))
            .db_name(Some(self.database.clone()))
            .init(self.init_statements());

        Ok(Opts::from(builder))
    }

    /// `host:port/database`, safe to log.
    pub fn target(&self) -> String {
        format!("{}:{}/{}", self.hostname, self.port, self.database)
    }
}

fn is_plain_identifier(key: &str) -> bool {
    !key.is_empty() && key.chars().all(|c| c.is_ascii_alphanumeric() || c == '_')
}

/// Open a MySQL connection from normalized configuration.
pub async fn connect(config: &Config) -> Result<Conn, SourceError> {
    let params = ConnectionParams::from_config(config)?;
    let target = params.target();
    debug!(
        "Connecting to MySQL at {} with {} connection parameter(s)",
        target,
        params.params.len()
    );

    let opts = params.to_opts()?;
    let conn = Conn::new(opts).await.map_err(|e| {
        SourceError::connection(format!("Failed to connect to MySQL at '{target}': {e}"))
    })?;

    info!("Connected to MySQL at {}", target);
    Ok(conn)
}
