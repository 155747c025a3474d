//! Environment-driven configuration.

/// Default admin secret used to derive the sealing key when the operator
/// has not provisioned one. Matches the well-known key shipped with the
/// admin UI; anyone on the admin network is trusted by definition.
const DEFAULT_ADMIN_SECRET_KEY: &str = "cd0f3ecc8e84e06b1d16bf33bf9a972b99a5d0f2";

const DEFAULT_DAPPMANAGER_URL: &str = "http://dappmanager.dappnode";

#[derive(Debug, Clone)]
pub struct Config {
    /// Base URL of the dappmanager RPC endpoint.
    pub dappmanager_url: String,
    /// URL of the push event stream.
    pub events_url: String,
    /// Secret used when sealing the seed phrase.
    pub admin_secret_key: String,
    /// Seconds to wait before reopening a dropped event stream.
    pub reconnect_secs: u64,
    /// In-process bus capacity; lagging listeners drop the oldest events.
    pub bus_capacity: usize,
}

impl Config {
    pub fn from_env() -> Self {
        let dappmanager_url = env_or("DAPPNODE_ADMIN_DAPPMANAGER_URL", DEFAULT_DAPPMANAGER_URL);
        let events_url = std::env::var("DAPPNODE_ADMIN_EVENTS_URL")
            .unwrap_or_else(|_| format!("{}/events", dappmanager_url.trim_end_matches('/')));
        Self {
            dappmanager_url,
            events_url,
            admin_secret_key: env_or("DAPPNODE_ADMIN_SECRET_KEY", DEFAULT_ADMIN_SECRET_KEY),
            reconnect_secs: env_parse("DAPPNODE_ADMIN_RECONNECT_SECS", 3),
            bus_capacity: env_parse("DAPPNODE_ADMIN_BUS_CAPACITY", 256),
        }
    }
}

fn env_or(key: &str, default: &str) -> String {
    std::env::var(key).unwrap_or_else(|_| default.to_string())
}

fn env_parse<T: std::str::FromStr>(key: &str, default: T) -> T {
    std::env::var(key)
        .ok()
        .and_then(|v| v.parse().ok())
        .unwrap_or(default)
}
