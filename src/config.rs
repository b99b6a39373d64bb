//--------------------------------------------------------------------------------------------------
// MODULE OVERVIEW
//--------------------------------------------------------------------------------------------------
// Process configuration, read once at bootstrap. No module outside this one calls `std::env`
// directly — every other part of the crate receives its settings through `Config`.
//--------------------------------------------------------------------------------------------------

use std::env;
use std::net::SocketAddr;

use dotenv::dotenv;

const BIND_ADDR: &str = "BIND_ADDR";
const STORAGE_BACKEND: &str = "ORDERBOOK_STORAGE";
const JSON_PATH: &str = "ORDERBOOK_JSON_PATH";
const DATABASE_URL: &str = "DATABASE_URL";
const HOSTNAME: &str = "HOSTNAME";

const DEFAULT_BIND_ADDR: &str = "0.0.0.0:8080";

/// Which storage adapter to construct at bootstrap.
#[derive(Debug, Clone)]
pub enum StorageBackend {
    Noop,
    JsonFile { path: String },
    Sql { database_url: String },
}

#[derive(Debug, Clone)]
pub struct Config {
    pub bind_addr: SocketAddr,
    pub storage_backend: StorageBackend,
    pub host_id: String,
}

impl Config {
    /// Loads configuration from the process environment (via a `.env` file if present). Fails
    /// fast with a panic on a missing or malformed required variable, matching the bootstrap
    /// style of the rest of this process: configuration errors are not recoverable at runtime.
    pub fn from_env() -> Config {
        dotenv().ok();

        let bind_addr = env::var(BIND_ADDR)
            .unwrap_or_else(|_| DEFAULT_BIND_ADDR.to_string())
            .parse()
            .expect("failed to parse BIND_ADDR as a socket address");

        let storage_backend = match env::var(STORAGE_BACKEND)
            .unwrap_or_else(|_| "noop".to_string())
            .to_lowercase()
            .as_str()
        {
            "noop" => StorageBackend::Noop,
            "json" | "json_file" => {
                let path = env::var(JSON_PATH)
                    .expect("ORDERBOOK_JSON_PATH must be set when ORDERBOOK_STORAGE=json");
                StorageBackend::JsonFile { path }
            }
            "sql" | "postgres" => {
                let database_url = env::var(DATABASE_URL)
                    .expect("DATABASE_URL must be set when ORDERBOOK_STORAGE=sql");
                StorageBackend::Sql { database_url }
            }
            other => panic!("unknown ORDERBOOK_STORAGE backend: {other}"),
        };

        let host_id = env::var(HOSTNAME).unwrap_or_else(|_| "unknown".to_string());

        Config {
            bind_addr,
            storage_backend,
            host_id,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_bind_addr_parses() {
        let addr: SocketAddr = DEFAULT_BIND_ADDR.parse().unwrap();
        assert_eq!(addr.port(), 8080);
    }
}
