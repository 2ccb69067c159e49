use std::{path::PathBuf, time::Duration};

use clap::{Parser, Subcommand, ValueEnum};
use nutritot_core::domain::common::{
    DatabaseConfig, HistoryConfig, LLMConfig, NutritotConfig, OcrConfig, OutboxConfig,
};

#[derive(Debug, Clone, Parser)]
#[command(name = "nutritot", version, about = "Baby-food label analyzer")]
pub struct Args {
    #[command(flatten)]
    pub log: LogArgs,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Clone, Subcommand)]
pub enum Command {
    /// Run the HTTP server
    Serve(ServeArgs),
    /// Read a label photo, analyze it and save the result
    Scan(ScanArgs),
    /// Show or edit the stored toddler profile
    Profile(ProfileArgs),
    /// List analysis history from the server
    History(HistoryArgs),
}

#[derive(Debug, Clone, clap::Args)]
pub struct LogArgs {
    #[arg(
        long = "log-filter",
        env = "LOG_FILTER",
        default_value = "info",
        global = true
    )]
    pub filter: String,

    #[arg(long = "log-json", env = "LOG_JSON", global = true)]
    pub json: bool,
}

#[derive(Debug, Clone, clap::Args)]
pub struct ServeArgs {
    #[command(flatten)]
    pub server: ServerArgs,

    #[command(flatten)]
    pub llm: LlmArgs,

    #[command(flatten)]
    pub db: DatabaseArgs,

    #[command(flatten)]
    pub outbox: OutboxArgs,
}

#[derive(Debug, Clone, clap::Args)]
pub struct ServerArgs {
    #[arg(long = "server-host", env = "SERVER_HOST", default_value = "0.0.0.0")]
    pub host: String,

    #[arg(long = "server-port", env = "SERVER_PORT", default_value_t = 3001)]
    pub port: u16,

    #[arg(long = "server-root-path", env = "SERVER_ROOT_PATH", default_value = "")]
    pub root_path: String,

    #[arg(
        long = "allowed-origins",
        env = "ALLOWED_ORIGINS",
        value_delimiter = ',',
        default_value = "http://localhost:3000"
    )]
    pub allowed_origins: Vec<String>,

    #[arg(long = "tls-cert", env = "TLS_CERT", requires = "tls_key")]
    pub tls_cert: Option<PathBuf>,

    #[arg(long = "tls-key", env = "TLS_KEY", requires = "tls_cert")]
    pub tls_key: Option<PathBuf>,

    #[arg(
        long = "metrics",
        env = "METRICS_ENABLED",
        default_value_t = true,
        action = clap::ArgAction::Set
    )]
    pub metrics: bool,
}

#[derive(Debug, Clone, clap::Args)]
pub struct LlmArgs {
    /// Full chat-completions URL, including deployment and api-version
    #[arg(long = "llm-endpoint", env = "AZURE_OPENAI_ENDPOINT")]
    pub endpoint: String,

    #[arg(long = "llm-api-key", env = "AZURE_OPENAI_API_KEY", hide_env_values = true)]
    pub api_key: String,

    #[arg(long = "llm-temperature", env = "LLM_TEMPERATURE", default_value_t = 0.2)]
    pub temperature: f32,

    #[arg(long = "llm-max-tokens", env = "LLM_MAX_TOKENS", default_value_t = 800)]
    pub max_tokens: u32,

    /// Request timeout in seconds; no timeout when unset
    #[arg(long = "llm-timeout-secs", env = "LLM_TIMEOUT_SECS")]
    pub timeout_secs: Option<u64>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum HistoryBackend {
    Postgres,
    Memory,
}

#[derive(Debug, Clone, clap::Args)]
pub struct DatabaseArgs {
    #[arg(
        long = "history-backend",
        env = "HISTORY_BACKEND",
        value_enum,
        default_value_t = HistoryBackend::Postgres
    )]
    pub backend: HistoryBackend,

    #[arg(long = "database-host", env = "DATABASE_HOST", default_value = "localhost")]
    pub db_host: String,

    #[arg(long = "database-port", env = "DATABASE_PORT", default_value_t = 5432)]
    pub db_port: u16,

    #[arg(long = "database-user", env = "DATABASE_USER", default_value = "nutritot")]
    pub db_user: String,

    #[arg(
        long = "database-password",
        env = "DATABASE_PASSWORD",
        default_value = "nutritot",
        hide_env_values = true
    )]
    pub db_password: String,

    #[arg(long = "database-name", env = "DATABASE_NAME", default_value = "nutritot")]
    pub db_name: String,
}

#[derive(Debug, Clone, clap::Args)]
pub struct OutboxArgs {
    #[arg(long = "outbox-capacity", env = "OUTBOX_CAPACITY", default_value_t = 256)]
    pub capacity: usize,

    #[arg(long = "outbox-max-attempts", env = "OUTBOX_MAX_ATTEMPTS", default_value_t = 5)]
    pub max_attempts: u32,

    #[arg(
        long = "outbox-base-delay-ms",
        env = "OUTBOX_BASE_DELAY_MS",
        default_value_t = 500
    )]
    pub base_delay_ms: u64,

    #[arg(
        long = "outbox-backoff-factor",
        env = "OUTBOX_BACKOFF_FACTOR",
        default_value_t = 2.0
    )]
    pub backoff_factor: f64,

    #[arg(
        long = "outbox-max-delay-ms",
        env = "OUTBOX_MAX_DELAY_MS",
        default_value_t = 30_000
    )]
    pub max_delay_ms: u64,
}

#[derive(Debug, Clone, clap::Args)]
pub struct ClientArgs {
    /// Base URL of the history service
    #[arg(
        long = "server-url",
        env = "NUTRITOT_SERVER_URL",
        default_value = "http://localhost:3001"
    )]
    pub server_url: String,

    /// Directory holding the stored profile
    #[arg(
        long = "profile-dir",
        env = "NUTRITOT_PROFILE_DIR",
        default_value = ".nutritot"
    )]
    pub profile_dir: PathBuf,
}

#[derive(Debug, Clone, clap::Args)]
pub struct ScanArgs {
    /// Photo of the ingredient label
    #[arg(long)]
    pub image: PathBuf,

    #[arg(long = "user-id", env = "NUTRITOT_USER_ID")]
    pub user_id: Option<String>,

    #[arg(long = "tesseract-bin", env = "TESSERACT_BIN", default_value = "tesseract")]
    pub tesseract_bin: PathBuf,

    #[arg(long = "ocr-lang", env = "OCR_LANG", default_value = "eng")]
    pub ocr_lang: String,

    #[command(flatten)]
    pub client: ClientArgs,

    #[command(flatten)]
    pub llm: LlmArgs,
}

#[derive(Debug, Clone, clap::Args)]
pub struct ProfileArgs {
    #[command(flatten)]
    pub client: ClientArgs,

    #[command(subcommand)]
    pub action: ProfileAction,
}

#[derive(Debug, Clone, Subcommand)]
pub enum ProfileAction {
    /// Print the stored profile
    Show,
    /// Replace the profile
    Set {
        /// Age in months
        #[arg(long)]
        age: u32,

        #[arg(long = "allergy")]
        allergies: Vec<String>,
    },
    AddAllergy {
        allergy: String,
    },
    /// Remove the allergy at a zero-based index
    RemoveAllergy {
        index: usize,
    },
}

#[derive(Debug, Clone, clap::Args)]
pub struct HistoryArgs {
    #[command(flatten)]
    pub client: ClientArgs,

    #[arg(long = "user-id", env = "NUTRITOT_USER_ID")]
    pub user_id: Option<String>,
}

impl From<LlmArgs> for LLMConfig {
    fn from(args: LlmArgs) -> Self {
        Self {
            endpoint: args.endpoint,
            api_key: args.api_key,
            temperature: args.temperature,
            max_tokens: args.max_tokens,
            timeout: args.timeout_secs.map(Duration::from_secs),
        }
    }
}

impl From<DatabaseArgs> for HistoryConfig {
    fn from(args: DatabaseArgs) -> Self {
        match args.backend {
            HistoryBackend::Memory => HistoryConfig::Memory,
            HistoryBackend::Postgres => HistoryConfig::Postgres(DatabaseConfig {
                host: args.db_host,
                port: args.db_port,
                username: args.db_user,
                password: args.db_password,
                name: args.db_name,
            }),
        }
    }
}

impl From<OutboxArgs> for OutboxConfig {
    fn from(args: OutboxArgs) -> Self {
        Self {
            capacity: args.capacity,
            max_attempts: args.max_attempts,
            base_delay: Duration::from_millis(args.base_delay_ms),
            backoff_factor: args.backoff_factor,
            max_delay: Duration::from_millis(args.max_delay_ms),
        }
    }
}

impl From<ServeArgs> for NutritotConfig {
    fn from(args: ServeArgs) -> Self {
        Self {
            history: args.db.into(),
            llm: args.llm.into(),
            outbox: args.outbox.into(),
        }
    }
}

impl From<&ScanArgs> for OcrConfig {
    fn from(args: &ScanArgs) -> Self {
        Self {
            binary: args.tesseract_bin.clone(),
            language: args.ocr_lang.clone(),
        }
    }
}
