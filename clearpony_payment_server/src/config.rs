use std::env;

use chrono::Duration;
use log::*;

const DEFAULT_CPG_HOST: &str = "127.0.0.1";
const DEFAULT_CPG_PORT: u16 = 8370;
const DEFAULT_INTENT_TTL: Duration = Duration::seconds(300);
const DEFAULT_EXPIRY_INTERVAL: std::time::Duration = std::time::Duration::from_secs(60);
const DEFAULT_NOTIFIER_TIMEOUT: std::time::Duration = std::time::Duration::from_secs(10);

/// How many confirmation events may queue up before publishers start applying back-pressure.
pub const EVENT_BUFFER_SIZE: usize = 50;

#[derive(Clone, Debug)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
    pub database_url: String,
    /// The expiry applied to new payment intents when the request does not carry one.
    pub default_intent_ttl: Duration,
    /// How often the expiry worker sweeps overdue pending intents.
    pub expiry_interval: std::time::Duration,
    /// Per-request timeout for merchant callback dispatches.
    pub notifier_timeout: std::time::Duration,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: DEFAULT_CPG_HOST.to_string(),
            port: DEFAULT_CPG_PORT,
            database_url: String::default(),
            default_intent_ttl: DEFAULT_INTENT_TTL,
            expiry_interval: DEFAULT_EXPIRY_INTERVAL,
            notifier_timeout: DEFAULT_NOTIFIER_TIMEOUT,
        }
    }
}

impl ServerConfig {
    pub fn new(host: &str, port: u16) -> Self {
        Self { host: host.to_string(), port, ..Default::default() }
    }

    pub fn from_env_or_default() -> Self {
        let host = env::var("CPG_HOST").ok().unwrap_or_else(|| DEFAULT_CPG_HOST.into());
        let port = env::var("CPG_PORT")
            .map(|s| {
                s.parse::<u16>().unwrap_or_else(|e| {
                    error!(
                        "🪛️ {s} is not a valid port for CPG_PORT. {e} Using the default, {DEFAULT_CPG_PORT}, instead."
                    );
                    DEFAULT_CPG_PORT
                })
            })
            .ok()
            .unwrap_or(DEFAULT_CPG_PORT);
        let database_url = env::var("CPG_DATABASE_URL").ok().unwrap_or_else(|| {
            error!("🪛️ CPG_DATABASE_URL is not set. Please set it to the URL for the gateway database.");
            String::default()
        });
        let default_intent_ttl = duration_from_env("CPG_DEFAULT_INTENT_TTL", DEFAULT_INTENT_TTL.num_seconds())
            .map(Duration::seconds)
            .unwrap_or(DEFAULT_INTENT_TTL);
        let expiry_interval = duration_from_env("CPG_EXPIRY_INTERVAL", DEFAULT_EXPIRY_INTERVAL.as_secs() as i64)
            .map(|secs| std::time::Duration::from_secs(secs as u64))
            .unwrap_or(DEFAULT_EXPIRY_INTERVAL);
        let notifier_timeout = duration_from_env("CPG_NOTIFIER_TIMEOUT", DEFAULT_NOTIFIER_TIMEOUT.as_secs() as i64)
            .map(|secs| std::time::Duration::from_secs(secs as u64))
            .unwrap_or(DEFAULT_NOTIFIER_TIMEOUT);
        Self { host, port, database_url, default_intent_ttl, expiry_interval, notifier_timeout }
    }
}

/// Reads a number of seconds from the environment, falling back (with a log entry) on absent or unusable values.
fn duration_from_env(var: &str, default_secs: i64) -> Option<i64> {
    env::var(var)
        .map_err(|_| {
            info!("🪛️ {var} is not set. Using the default value of {default_secs} s.");
        })
        .and_then(|s| {
            s.parse::<i64>()
                .map_err(|e| warn!("🪛️ Invalid configuration value for {var}. {e}"))
                .and_then(|secs| if secs > 0 { Ok(secs) } else { Err(warn!("🪛️ {var} must be positive.")) })
        })
        .ok()
}

//-------------------------------------------------  ServerOptions  ----------------------------------------------------
/// The subset of the server configuration that request handlers need. Kept as small as possible so that nothing
/// sensitive gets passed around the request path.
#[derive(Clone, Copy, Debug)]
pub struct ServerOptions {
    pub default_intent_ttl: Duration,
}

impl ServerOptions {
    pub fn from_config(config: &ServerConfig) -> Self {
        Self { default_intent_ttl: config.default_intent_ttl }
    }
}
