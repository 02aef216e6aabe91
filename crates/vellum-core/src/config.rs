//! Runtime configuration pulled from environment variables.
//!
//! The index API key is a secret and is never persisted by us; everything
//! comes from the process environment. The CLI loads `.env` before calling
//! in here.

use std::env;

use crate::embed;

pub const API_KEY_VAR: &str = "PINECONE_API_KEY";
pub const INDEX_HOST_VAR: &str = "PINECONE_INDEX_HOST";
pub const NAMESPACE_VAR: &str = "PINECONE_NAMESPACE";
pub const OLLAMA_HOST_VAR: &str = "OLLAMA_HOST";
pub const EMBED_MODEL_VAR: &str = "VELLUM_EMBED_MODEL";

#[derive(Debug, Clone)]
pub struct Config {
    /// API key for the managed index.
    pub api_key: String,
    /// Data-plane host of the index, normalized to include a scheme.
    pub index_host: String,
    /// Namespace within the index. Empty means the default namespace.
    pub namespace: String,
    /// Base URL of the Ollama server used for embeddings.
    pub ollama_url: String,
    /// Embedding model name.
    pub embed_model: String,
}

impl Config {
    /// Read config from the process environment.
    pub fn from_env() -> Result<Self, ConfigError> {
        Ok(Self {
            api_key: require(API_KEY_VAR)?,
            index_host: normalize_host(&require(INDEX_HOST_VAR)?),
            namespace: env::var(NAMESPACE_VAR).unwrap_or_default(),
            ollama_url: env::var(OLLAMA_HOST_VAR)
                .unwrap_or_else(|_| embed::DEFAULT_BASE_URL.to_string()),
            embed_model: env::var(EMBED_MODEL_VAR)
                .unwrap_or_else(|_| embed::DEFAULT_EMBED_MODEL.to_string()),
        })
    }
}

fn require(name: &'static str) -> Result<String, ConfigError> {
    require_value(name, env::var(name).ok())
}

/// Rejects missing or blank values so a typo'd `.env` fails loudly.
fn require_value(name: &'static str, value: Option<String>) -> Result<String, ConfigError> {
    match value {
        Some(v) if !v.trim().is_empty() => Ok(v),
        _ => Err(ConfigError::MissingVar(name)),
    }
}

/// Index hosts come with or without a scheme; requests need one. Bare hosts
/// get https, trailing slashes are stripped.
fn normalize_host(host: &str) -> String {
    let h = host.trim().trim_end_matches('/');
    if h.starts_with("http://") || h.starts_with("https://") {
        h.to_string()
    } else {
        format!("https://{}", h)
    }
}

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("missing required environment variable: {0}")]
    MissingVar(&'static str),
}
