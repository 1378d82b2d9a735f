use clap::Parser;
use figment::{
    providers::{Env, Format, Serialized, Toml},
    Figment,
};
use serde::{Deserialize, Serialize};

/// syncpad collaborative editing relay
#[derive(Parser, Serialize, Deserialize, Clone, Debug)]
#[command(name = "syncpad-server", version, about = "syncpad collaborative editing relay")]
pub struct Config {
    /// Port to listen on
    #[arg(long, env = "SYNCPAD_PORT", default_value = "5000")]
    pub port: u16,

    /// Bind address
    #[arg(long, env = "SYNCPAD_BIND_ADDRESS", default_value = "0.0.0.0")]
    pub bind_address: String,

    /// Path to TOML config file
    #[arg(long, default_value = "./syncpad.toml")]
    pub config: String,

    /// Enable structured JSON logging (for Docker/production)
    #[arg(long, env = "SYNCPAD_JSON_LOGS")]
    pub json_logs: bool,

    /// Output a commented TOML config template and exit
    #[arg(long)]
    pub generate_config: bool,

    /// Base URL of the judge service used by the execution proxy
    #[arg(
        long,
        env = "SYNCPAD_JUDGE_URL",
        default_value = "https://judge0-ce.p.rapidapi.com"
    )]
    pub judge_url: String,

    /// API key for the judge service (required for live execution)
    #[arg(long, env = "SYNCPAD_JUDGE_API_KEY", default_value = "")]
    pub judge_api_key: String,

    /// Timeout in seconds for a single judge request
    #[arg(long, env = "SYNCPAD_EXEC_TIMEOUT_SECS", default_value = "30")]
    pub exec_timeout_secs: u64,

    /// Origins allowed to make cross-origin requests (empty = any)
    #[arg(long, env = "SYNCPAD_ALLOWED_ORIGINS", value_delimiter = ',')]
    pub allowed_origins: Vec<String>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            port: 5000,
            bind_address: "0.0.0.0".to_string(),
            config: "./syncpad.toml".to_string(),
            json_logs: false,
            generate_config: false,
            judge_url: "https://judge0-ce.p.rapidapi.com".to_string(),
            judge_api_key: String::new(),
            exec_timeout_secs: 30,
            allowed_origins: Vec::new(),
        }
    }
}

impl Config {
    /// Load config with layered precedence:
    /// built-in defaults < TOML file < env vars (SYNCPAD_*) < CLI args
    pub fn load() -> Result<Self, figment::Error> {
        let cli = Config::parse();
        let config_path = cli.config.clone();

        Figment::new()
            .merge(Serialized::defaults(Config::default()))
            .merge(Toml::file(&config_path))
            .merge(Env::prefixed("SYNCPAD_"))
            .merge(Serialized::defaults(cli))
            .extract()
    }
}

/// Generate a commented TOML config template
pub fn generate_config_template() -> String {
    r#"# syncpad relay server configuration
# Place this file at ./syncpad.toml or specify with --config <path>
# All settings can be overridden via environment variables (SYNCPAD_PORT, etc.)
# or CLI flags (--port, etc.)

# Server port (default: 5000)
# port = 5000

# Bind address (default: 0.0.0.0 — all interfaces)
# bind_address = "0.0.0.0"

# Enable structured JSON logging for Docker/production
# json_logs = false

# ---- Execution proxy ----

# Base URL of the Judge0-compatible judge service
# judge_url = "https://judge0-ce.p.rapidapi.com"

# API key sent as X-RapidAPI-Key (required for live execution)
# judge_api_key = ""

# Upstream request timeout in seconds. The judge call blocks until the
# remote run finishes or this deadline fires.
# exec_timeout_secs = 30

# ---- CORS ----

# Origins allowed to open cross-origin connections/requests.
# Empty list = any origin.
# allowed_origins = ["https://editor.example.com"]
"#
    .to_string()
}
