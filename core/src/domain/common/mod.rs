use std::{path::PathBuf, time::Duration};

use chrono::{DateTime, Utc};
use uuid::Uuid;

pub mod entities;
pub mod services;

#[derive(Clone, Debug)]
pub struct NutritotConfig {
    pub history: HistoryConfig,
    pub llm: LLMConfig,
    pub outbox: OutboxConfig,
}

#[derive(Clone, Debug)]
pub enum HistoryConfig {
    Postgres(DatabaseConfig),
    Memory,
}

#[derive(Clone, Debug)]
pub struct DatabaseConfig {
    pub host: String,
    pub port: u16,
    pub username: String,
    pub password: String,
    pub name: String,
}

impl DatabaseConfig {
    pub fn url(&self) -> String {
        format!(
            "postgres://{}:{}@{}:{}/{}",
            self.username, self.password, self.host, self.port, self.name
        )
    }
}

#[derive(Clone, Debug)]
pub struct LLMConfig {
    /// Full chat-completions URL, deployment and api-version included.
    pub endpoint: String,
    pub api_key: String,
    pub temperature: f32,
    pub max_tokens: u32,
    pub timeout: Option<Duration>,
}

#[derive(Clone, Debug)]
pub struct OutboxConfig {
    pub capacity: usize,
    pub max_attempts: u32,
    pub base_delay: Duration,
    pub backoff_factor: f64,
    pub max_delay: Duration,
}

impl Default for OutboxConfig {
    fn default() -> Self {
        Self {
            capacity: 256,
            max_attempts: 5,
            base_delay: Duration::from_millis(500),
            backoff_factor: 2.0,
            max_delay: Duration::from_secs(30),
        }
    }
}

#[derive(Clone, Debug)]
pub struct OcrConfig {
    pub binary: PathBuf,
    pub language: String,
}

impl Default for OcrConfig {
    fn default() -> Self {
        Self {
            binary: PathBuf::from("tesseract"),
            language: "eng".to_string(),
        }
    }
}

pub fn generate_timestamp() -> DateTime<Utc> {
    Utc::now()
}

pub fn generate_uuid_v4() -> Uuid {
    Uuid::new_v4()
}
