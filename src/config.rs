use anyhow::{Context, Result};
use clap::Args;
use std::path::PathBuf;

/// Global options shared by every subcommand
#[derive(Args, Debug)]
pub struct GlobalArgs {
    /// Base URL of the bottles backend API
    #[arg(long, env = "BOTTLES_API_URL", default_value = "http://localhost:8000")]
    pub api_url: String,

    /// Path to the token store database
    #[arg(long, env = "BOTTLES_TOKEN_DB")]
    pub token_db: Option<String>,

    /// Log level (trace, debug, info, warn, error)
    #[arg(long, env = "LOG_LEVEL", default_value = "warn")]
    pub log_level: String,

    /// Token refresh threshold in seconds
    #[arg(long, env = "TOKEN_REFRESH_THRESHOLD", default_value = "300")]
    pub refresh_threshold: u64,

    /// HTTP request timeout in seconds
    #[arg(long, env = "HTTP_REQUEST_TIMEOUT", default_value = "30")]
    pub http_timeout: u64,

    /// HTTP max retries for transient failures
    #[arg(long, env = "HTTP_MAX_RETRIES", default_value = "3")]
    pub http_retries: u32,
}

#[derive(Clone, Debug)]
pub struct Config {
    pub api_base_url: String,
    pub token_db_file: PathBuf,
    pub refresh_threshold: u64,
    pub http_request_timeout: u64,
    pub http_max_retries: u32,
    pub log_level: String,
}

impl Config {
    /// Build configuration from parsed arguments.
    /// Priority: CLI > ENV > defaults (clap handles the first two; the
    /// caller loads .env before parsing).
    pub fn from_args(args: &GlobalArgs) -> Result<Self> {
        let token_db_file = match &args.token_db {
            Some(path) => expand_tilde(path),
            None => default_token_db_path()?,
        };

        Ok(Config {
            api_base_url: args.api_url.trim_end_matches('/').to_string(),
            token_db_file,
            refresh_threshold: args.refresh_threshold,
            http_request_timeout: args.http_timeout,
            http_max_retries: args.http_retries,
            log_level: args.log_level.clone(),
        })
    }

    pub fn endpoints(&self) -> Endpoints {
        Endpoints::new(&self.api_base_url)
    }
}

/// URL builder for the backend API surface
#[derive(Clone, Debug)]
pub struct Endpoints {
    base: String,
}

impl Endpoints {
    pub fn new(base: &str) -> Self {
        Self {
            base: base.trim_end_matches('/').to_string(),
        }
    }

    pub fn auth_register(&self) -> String {
        format!("{}/auth/register", self.base)
    }

    pub fn auth_login(&self) -> String {
        format!("{}/auth/login", self.base)
    }

    pub fn auth_refresh(&self) -> String {
        format!("{}/auth/refresh", self.base)
    }

    pub fn bottles(&self) -> String {
        format!("{}/bottles", self.base)
    }

    pub fn bottle(&self, id: u64) -> String {
        format!("{}/bottles/{}", self.base, id)
    }

    pub fn barcode_lookup(&self, barcode: &str) -> String {
        format!("{}/barcode/lookup/{}", self.base, barcode)
    }

    pub fn barcode_register(&self) -> String {
        format!("{}/barcode/register", self.base)
    }

    pub fn recipes(&self) -> String {
        format!("{}/recipes", self.base)
    }

    pub fn recipe(&self, id: u64) -> String {
        format!("{}/recipes/{}", self.base, id)
    }

    pub fn spirit_types(&self) -> String {
        format!("{}/spirit_types", self.base)
    }
}

/// Default token store location under the platform data directory
fn default_token_db_path() -> Result<PathBuf> {
    let dir = dirs::data_local_dir().context("Could not determine local data directory")?;
    Ok(dir.join("bottles-cli").join("tokens.db"))
}

/// Expand tilde (~) in file paths to user's home directory
fn expand_tilde(path: &str) -> PathBuf {
    if path.starts_with("~/") {
        if let Some(home) = dirs::home_dir() {
            return home.join(&path[2..]);
        }
    }
    PathBuf::from(path)
}
