//! Service configuration.

use serde::Deserialize;
use std::path::Path;
use tallybook_extract::{DEFAULT_BASE_URL, DEFAULT_MODEL};

/// Key value shipped in sample configuration files; treated as "not configured".
pub const PLACEHOLDER_API_KEY: &str = "your_api_key_here";

/// Service configuration loaded from environment variables.
#[derive(Debug, Clone)]
pub struct ServiceConfig {
    /// Address to listen on (default: "0.0.0.0:8080").
    pub listen_addr: String,

    /// Where to persist the ledger snapshot. In-memory only when unset.
    pub snapshot_path: Option<String>,

    /// Gemini API key. Document extraction is disabled without one.
    pub gemini_api_key: Option<String>,

    /// Gemini model (default: "gemini-2.5-flash").
    pub gemini_model: String,

    /// Gemini API root.
    pub gemini_base_url: String,

    /// CORS allowed origins.
    pub cors_origins: Vec<String>,

    /// Maximum request body size in bytes.
    pub max_body_bytes: usize,

    /// Request timeout in seconds.
    pub request_timeout_seconds: u64,
}

/// Gemini secrets file structure.
#[derive(Debug, Deserialize)]
struct GeminiSecrets {
    api_key: String,
    #[serde(default)]
    model: Option<String>,
}

impl ServiceConfig {
    /// Load configuration from environment variables and secrets files.
    #[must_use]
    pub fn from_env() -> Self {
        let defaults = Self::default();
        let (gemini_api_key, secrets_model) = load_gemini_secrets();

        Self {
            listen_addr: std::env::var("LISTEN_ADDR").unwrap_or(defaults.listen_addr),
            snapshot_path: std::env::var("SNAPSHOT_PATH")
                .ok()
                .filter(|p| !p.trim().is_empty()),
            gemini_api_key: usable_key(gemini_api_key),
            gemini_model: secrets_model
                .or_else(|| std::env::var("GEMINI_MODEL").ok())
                .unwrap_or(defaults.gemini_model),
            gemini_base_url: std::env::var("GEMINI_BASE_URL").unwrap_or(defaults.gemini_base_url),
            cors_origins: std::env::var("CORS_ORIGINS")
                .unwrap_or_else(|_| "*".into())
                .split(',')
                .map(|s| s.trim().to_string())
                .collect(),
            max_body_bytes: std::env::var("MAX_BODY_BYTES")
                .ok()
                .and_then(|s| s.parse().ok())
                .unwrap_or(defaults.max_body_bytes),
            request_timeout_seconds: std::env::var("REQUEST_TIMEOUT_SECONDS")
                .ok()
                .and_then(|s| s.parse().ok())
                .unwrap_or(defaults.request_timeout_seconds),
        }
    }

    /// Whether a usable Gemini key is present.
    #[must_use]
    pub fn extraction_configured(&self) -> bool {
        self.gemini_api_key.is_some()
    }
}

/// Drop blank and placeholder keys.
fn usable_key(key: Option<String>) -> Option<String> {
    key.map(|k| k.trim().to_string())
        .filter(|k| !k.is_empty() && k != PLACEHOLDER_API_KEY)
}

/// Load Gemini secrets from file or environment.
fn load_gemini_secrets() -> (Option<String>, Option<String>) {
    let secret_paths = [
        ".secrets/gemini.json",
        "tallybook/.secrets/gemini.json",
        "../.secrets/gemini.json",
    ];

    for path in &secret_paths {
        if let Ok(secrets) = load_secrets_file::<GeminiSecrets>(path) {
            tracing::info!(path = %path, "Loaded Gemini secrets from file");
            return (Some(secrets.api_key), secrets.model);
        }
    }

    tracing::debug!("Gemini secrets file not found, using environment variables");
    (std::env::var("GEMINI_API_KEY").ok(), None)
}

/// Load secrets from a JSON file.
fn load_secrets_file<T: serde::de::DeserializeOwned>(path: &str) -> Result<T, std::io::Error> {
    let path = Path::new(path);
    if !path.exists() {
        return Err(std::io::Error::new(
            std::io::ErrorKind::NotFound,
            "Secrets file not found",
        ));
    }
    let contents = std::fs::read_to_string(path)?;
    serde_json::from_str(&contents)
        .map_err(|e| std::io::Error::new(std::io::ErrorKind::InvalidData, e))
}

impl Default for ServiceConfig {
    fn default() -> Self {
        Self {
            listen_addr: "0.0.0.0:8080".into(),
            snapshot_path: None,
            gemini_api_key: None,
            gemini_model: DEFAULT_MODEL.into(),
            gemini_base_url: DEFAULT_BASE_URL.into(),
            cors_origins: vec!["*".into()],
            max_body_bytes: 25 * 1024 * 1024, // 25 MiB
            request_timeout_seconds: 180,
        }
    }
}
