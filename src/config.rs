use std::env;
use std::path::PathBuf;

pub const DEFAULT_PORT: u16 = 8000;
pub const DEFAULT_TIMEOUT_MS: u64 = 30_000;
pub const DEFAULT_PAGE_ORIGIN: &str = "file://";

/// Settings shared by the `serve` and `ask` subcommands.
#[derive(Debug, Clone)]
pub struct AppConfig {
    pub port: u16,
    pub agent_cmd: String,
    pub timeout_ms: u64,
    pub static_dir: Option<PathBuf>,
    pub page_origin: String,
}

impl AppConfig {
    pub fn from_env() -> Self {
        Self::from_lookup(|key| env::var(key).ok())
    }

    fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let port = lookup("PORT")
            .and_then(|value| value.parse::<u16>().ok())
            .unwrap_or(DEFAULT_PORT);

        let agent_cmd = lookup("AGENT_CMD").unwrap_or_default();

        let timeout_ms = lookup("AGENT_TIMEOUT_MS")
            .and_then(|value| value.parse::<u64>().ok())
            .unwrap_or(DEFAULT_TIMEOUT_MS);

        let static_dir = lookup("STATIC_DIR")
            .filter(|value| !value.trim().is_empty())
            .map(PathBuf::from);

        let page_origin =
            lookup("PAGE_ORIGIN").unwrap_or_else(|| DEFAULT_PAGE_ORIGIN.to_string());

        Self {
            port,
            agent_cmd,
            timeout_ms,
            static_dir,
            page_origin,
        }
    }
}
