//! Server configuration, loaded from environment variables at startup and
//! optionally overridden on the command line.

use std::path::PathBuf;

use clap::Parser;

/// 64 MiB.
pub const DEFAULT_MAX_BODY_BYTES: usize = 64 * 1024 * 1024;

/// Command-line overrides. Anything not given here falls back to the
/// environment (see [`Config::from_env`]).
#[derive(Debug, Default, Parser)]
#[command(name = "parley-server", version, about = "Chat thread store and streaming LLM proxy")]
pub struct Cli {
    /// TCP address to bind, e.g. `127.0.0.1:8000`.
    #[arg(long)]
    pub bind: Option<String>,

    /// Directory holding thread documents and `models.json`.
    #[arg(long)]
    pub data_dir: Option<PathBuf>,

    /// Emit log records as newline-delimited JSON.
    #[arg(long)]
    pub log_json: bool,
}

/// Runtime configuration for parley-server.
#[derive(Debug, Clone)]
pub struct Config {
    /// TCP address to bind (default: `"0.0.0.0:8000"`).
    pub bind_address: String,

    /// Record store directory (default: `"data"`). Created on startup if missing.
    pub data_dir: PathBuf,

    /// `tracing` filter string, e.g. `"info"` or `"debug,tower_http=warn"`.
    pub log_level: String,

    /// When `true`, emit log records as newline-delimited JSON.
    pub log_json: bool,

    /// When set, logs are also written to daily-rolled files in this directory.
    pub log_dir: Option<PathBuf>,

    /// Comma-separated CORS origins. `None` allows any origin.
    pub cors_allowed_origins: Option<String>,

    /// Root of the OpenAI-compatible upstream API.
    pub upstream_base_url: String,

    /// Bearer key sent to the upstream. Required by `main`.
    pub upstream_api_key: Option<String>,

    /// Connect timeout for upstream calls. Streams themselves are not time-limited.
    pub upstream_connect_timeout_secs: u64,

    /// Serve the generated OpenAPI document at `/api-docs/openapi.json`.
    pub enable_openapi: bool,

    /// Largest accepted JSON request body. Threads grow with every turn, so
    /// this sits well above axum's 2 MiB default.
    pub max_body_bytes: usize,
}

impl Config {
    /// Environment first, then command-line overrides.
    pub fn load() -> Self {
        Self::from_env().with_cli(Cli::parse())
    }

    /// Build [`Config`] from environment variables, falling back to defaults.
    pub fn from_env() -> Self {
        Self {
            bind_address: env_or("PARLEY_BIND", "0.0.0.0:8000"),
            data_dir: PathBuf::from(env_or("PARLEY_DATA_DIR", "data")),
            log_level: env_or("PARLEY_LOG", "info"),
            log_json: env_flag("PARLEY_LOG_JSON", false),
            log_dir: env_opt("PARLEY_LOG_DIR").map(PathBuf::from),
            cors_allowed_origins: env_opt("PARLEY_CORS_ORIGINS")
                .or_else(|| env_opt("ALLOWED_ORIGINS")),
            upstream_base_url: env_or("PARLEY_UPSTREAM_BASE_URL", "https://openrouter.ai/api/v1"),
            upstream_api_key: env_opt("PARLEY_UPSTREAM_API_KEY")
                .or_else(|| env_opt("OPENROUTER_API_KEY")),
            upstream_connect_timeout_secs: parse_env("PARLEY_UPSTREAM_CONNECT_TIMEOUT_SECS", 10),
            enable_openapi: env_flag("PARLEY_ENABLE_OPENAPI", true),
            max_body_bytes: parse_env("PARLEY_MAX_BODY_BYTES", DEFAULT_MAX_BODY_BYTES),
        }
    }

    pub fn with_cli(mut self, cli: Cli) -> Self {
        if let Some(bind) = cli.bind {
            self.bind_address = bind;
        }
        if let Some(dir) = cli.data_dir {
            self.data_dir = dir;
        }
        if cli.log_json {
            self.log_json = true;
        }
        self
    }
}

// ── private helpers ──────────────────────────────────────────────────────────

fn env_or(key: &str, default: &str) -> String {
    std::env::var(key).unwrap_or_else(|_| default.to_owned())
}

/// Unset and blank values are both treated as absent.
fn env_opt(key: &str) -> Option<String> {
    std::env::var(key)
        .ok()
        .map(|v| v.trim().to_owned())
        .filter(|v| !v.is_empty())
}

fn env_flag(key: &str, default: bool) -> bool {
    std::env::var(key)
        .map(|v| v == "1" || v.eq_ignore_ascii_case("true"))
        .unwrap_or(default)
}

fn parse_env<T: std::str::FromStr>(key: &str, default: T) -> T {
    std::env::var(key)
        .ok()
        .and_then(|v| v.parse().ok())
        .unwrap_or(default)
}

#[cfg(test)]
mod test {
    use super::*;

    fn base() -> Config {
        Config {
            bind_address: "0.0.0.0:8000".into(),
            data_dir: PathBuf::from("data"),
            log_level: "info".into(),
            log_json: false,
            log_dir: None,
            cors_allowed_origins: None,
            upstream_base_url: "https://openrouter.ai/api/v1".into(),
            upstream_api_key: None,
            upstream_connect_timeout_secs: 10,
            enable_openapi: true,
            max_body_bytes: DEFAULT_MAX_BODY_BYTES,
        }
    }

    #[test]
    fn cli_overrides_env_values() {
        let cli = Cli::parse_from([
            "parley-server",
            "--bind",
            "127.0.0.1:9999",
            "--data-dir",
            "/tmp/parley",
            "--log-json",
        ]);
        let cfg = base().with_cli(cli);
        assert_eq!(cfg.bind_address, "127.0.0.1:9999");
        assert_eq!(cfg.data_dir, PathBuf::from("/tmp/parley"));
        assert!(cfg.log_json);
    }

    #[test]
    fn empty_cli_keeps_env_values() {
        let cfg = base().with_cli(Cli::parse_from(["parley-server"]));
        assert_eq!(cfg.bind_address, "0.0.0.0:8000");
        assert_eq!(cfg.data_dir, PathBuf::from("data"));
        assert!(!cfg.log_json);
    }
}
