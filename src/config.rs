use anyhow::Context;
use std::time::Duration;

const DEFAULT_BIND_ADDR: &str = "127.0.0.1:3000";
const DEFAULT_DIRECTORY_TIMEOUT: Duration = Duration::from_secs(5);
/// Session cookie keys need 64 bytes of material.
pub const SESSION_SECRET_MIN_LEN: usize = 64;

/// Runtime settings, read from the environment.
///
/// - `BIND_ADDR` listen address, default `127.0.0.1:3000`
/// - `DB_URL` PostgreSQL url; without it users live in memory
/// - `SESSION_SECRET` session cookie key material, at least 64 bytes
/// - `DIRECTORY_TIMEOUT_MS` bound on each user directory call, default 5000
#[derive(Clone)]
pub struct Config {
    bind: String,
    database: Option<String>,
    secret: Option<String>,
    timeout: Duration,
}

impl Config {
    pub fn from_env() -> anyhow::Result<Self> {
        Self::from_vars(|key| std::env::var(key).ok())
    }

    pub fn from_vars<F>(var: F) -> anyhow::Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let bind = var("BIND_ADDR").unwrap_or_else(|| DEFAULT_BIND_ADDR.to_string());
        let database = var("DB_URL").filter(|s| !s.is_empty());
        let secret = var("SESSION_SECRET").filter(|s| !s.is_empty());
        if let Some(ref secret) = secret {
            anyhow::ensure!(
                secret.len() >= SESSION_SECRET_MIN_LEN,
                "SESSION_SECRET must be at least {} bytes",
                SESSION_SECRET_MIN_LEN
            );
        }
        let timeout = match var("DIRECTORY_TIMEOUT_MS") {
            Some(ms) => ms
                .trim()
                .parse::<u64>()
                .map(Duration::from_millis)
                .context("DIRECTORY_TIMEOUT_MS must be a whole number of milliseconds")?,
            None => DEFAULT_DIRECTORY_TIMEOUT,
        };
        anyhow::ensure!(!timeout.is_zero(), "DIRECTORY_TIMEOUT_MS must be positive");
        Ok(Self {
            bind,
            database,
            secret,
            timeout,
        })
    }

    pub fn bind(&self) -> &str {
        &self.bind
    }
    pub fn database(&self) -> Option<&str> {
        self.database.as_deref()
    }
    pub fn secret(&self) -> Option<&[u8]> {
        self.secret.as_ref().map(|s| s.as_bytes())
    }
    pub fn timeout(&self) -> Duration {
        self.timeout
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            bind: DEFAULT_BIND_ADDR.to_string(),
            database: None,
            secret: None,
            timeout: DEFAULT_DIRECTORY_TIMEOUT,
        }
    }
}

impl std::fmt::Debug for Config {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Config")
            .field("bind", &self.bind)
            .field("database", &self.database.is_some())
            .field("secret", &self.secret.is_some())
            .field("timeout", &self.timeout)
            .finish()
    }
}
