use std::path::PathBuf;
use std::str::FromStr;

use anyhow::{Context, Result};

use crate::llm_client::{DEFAULT_MODEL, DEFAULT_TIMEOUT_SECS};
use crate::recommendation::loader::EmbeddingBackend;

/// Artifacts shipped with the crate; independent of the working directory.
pub const DEFAULT_MODEL_DIR: &str = concat!(env!("CARGO_MANIFEST_DIR"), "/models");

/// Application configuration loaded from environment variables.
/// Every variable has a default; malformed values fail startup.
#[derive(Debug, Clone)]
pub struct Config {
    pub port: u16,
    pub rust_log: String,
    /// Directory holding `model_metadata.json`, `labels.json` and optional embeddings.
    pub model_dir: PathBuf,
    pub embedding_backend: EmbeddingBackend,
    pub eager_model_load: bool,
    /// Chat endpoints answer 503 when unset.
    pub openrouter_api_key: Option<String>,
    pub openrouter_model: String,
    pub chat_timeout_secs: u64,
}

impl Default for Config {
    fn default() -> Self {
        Config {
            port: 8080,
            rust_log: "info".to_string(),
            model_dir: PathBuf::from(DEFAULT_MODEL_DIR),
            embedding_backend: EmbeddingBackend::Hash,
            eager_model_load: true,
            openrouter_api_key: None,
            openrouter_model: DEFAULT_MODEL.to_string(),
            chat_timeout_secs: DEFAULT_TIMEOUT_SECS,
        }
    }
}

impl Config {
    pub fn from_env() -> Result<Self> {
        dotenvy::dotenv().ok(); // load .env if present; ignore if missing
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Builds a config from any key lookup; empty values count as unset.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self> {
        let get = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());
        let defaults = Config::default();

        Ok(Config {
            port: parse_or(&get, "PORT", defaults.port)?,
            rust_log: get("RUST_LOG").unwrap_or(defaults.rust_log),
            model_dir: get("MODEL_DIR").map(PathBuf::from).unwrap_or(defaults.model_dir),
            embedding_backend: parse_or(&get, "EMBEDDING_BACKEND", defaults.embedding_backend)?,
            eager_model_load: match get("EAGER_MODEL_LOAD") {
                Some(raw) => parse_flag(&raw).with_context(|| {
                    format!("EAGER_MODEL_LOAD must be true or false, got '{raw}'")
                })?,
                None => defaults.eager_model_load,
            },
            openrouter_api_key: get("OPENROUTER_API_KEY"),
            openrouter_model: get("OPENROUTER_MODEL").unwrap_or(defaults.openrouter_model),
            chat_timeout_secs: parse_or(&get, "CHAT_TIMEOUT_SECS", defaults.chat_timeout_secs)?,
        })
    }
}

fn parse_or<T>(get: &impl Fn(&str) -> Option<String>, key: &str, default: T) -> Result<T>
where
    T: FromStr,
    T::Err: std::fmt::Display,
{
    match get(key) {
        Some(raw) => raw
            .trim()
            .parse::<T>()
            .map_err(|e| anyhow::anyhow!("{e}"))
            .with_context(|| format!("Environment variable '{key}' has invalid value '{raw}'")),
        None => Ok(default),
    }
}

fn parse_flag(raw: &str) -> Option<bool> {
    match raw.trim().to_ascii_lowercase().as_str() {
        "true" | "1" | "yes" => Some(true),
        "false" | "0" | "no" => Some(false),
        _ => None,
    }
}
