//! Application configuration loaded from environment variables.
//!
//! Secrets are optional at startup. A missing secret only fails the external
//! call or session check that needs it.

use std::env;
use std::time::Duration;

const DEFAULT_PORT: u16 = 3000;
const DEFAULT_UPSTREAM_TIMEOUT_SECS: u64 = 10;

/// Application configuration, loaded once at startup.
#[derive(Debug, Clone)]
pub struct Config {
    // --- Environment Variables (non-sensitive) ---
    /// Server port
    pub port: u16,
    /// Frontend origin allowed by CORS
    pub frontend_url: String,
    /// Directory holding the single-page frontend
    pub static_dir: String,
    /// GCP project for Firestore; `None` leaves the store offline
    pub gcp_project_id: Option<String>,
    /// Google OAuth client ID
    pub google_client_id: Option<String>,
    /// Absolute URL Google redirects back to after consent
    pub google_callback_url: String,
    /// Base URLs of the external APIs (overridable for tests)
    pub geodb_base_url: String,
    pub openaq_base_url: String,
    pub openweather_base_url: String,
    /// Timeout applied to every outbound HTTP call
    pub upstream_timeout: Duration,

    // --- Secrets ---
    /// Google OAuth client secret
    pub google_client_secret: Option<String>,
    /// Signing key for session tokens and OAuth state (raw bytes)
    pub session_secret: Option<Vec<u8>>,
    /// Key expected in the `x-app-api-key` header
    pub client_api_key: Option<String>,
    pub geodb_api_key: Option<String>,
    pub openaq_api_key: Option<String>,
    pub openweather_api_key: Option<String>,
}

impl Default for Config {
    /// Local development defaults with no secrets configured.
    fn default() -> Self {
        Self {
            port: DEFAULT_PORT,
            frontend_url: "http://localhost:3000".to_string(),
            static_dir: "public".to_string(),
            gcp_project_id: None,
            google_client_id: None,
            google_callback_url: "http://localhost:3000/auth/google/callback".to_string(),
            geodb_base_url: "https://wft-geo-db.p.rapidapi.com".to_string(),
            openaq_base_url: "https://api.openaq.org".to_string(),
            openweather_base_url: "https://api.openweathermap.org".to_string(),
            upstream_timeout: Duration::from_secs(DEFAULT_UPSTREAM_TIMEOUT_SECS),
            google_client_secret: None,
            session_secret: None,
            client_api_key: None,
            geodb_api_key: None,
            openaq_api_key: None,
            openweather_api_key: None,
        }
    }
}

impl Config {
    /// Load configuration from environment variables.
    ///
    /// A `.env` file in the working directory is read first when present.
    pub fn from_env() -> Result<Self, ConfigError> {
        dotenvy::dotenv().ok(); // Load .env file if present

        let defaults = Self::default();

        Ok(Self {
            port: parse_var("PORT")?.unwrap_or(defaults.port),
            frontend_url: var("FRONTEND_URL").unwrap_or(defaults.frontend_url),
            static_dir: var("STATIC_DIR").unwrap_or(defaults.static_dir),
            gcp_project_id: var("GCP_PROJECT_ID"),
            google_client_id: var("GOOGLE_CLIENT_ID"),
            google_callback_url: var("GOOGLE_CALLBACK_URL")
                .unwrap_or(defaults.google_callback_url),
            geodb_base_url: var("GEODB_BASE_URL").unwrap_or(defaults.geodb_base_url),
            openaq_base_url: var("OPENAQ_BASE_URL").unwrap_or(defaults.openaq_base_url),
            openweather_base_url: var("OPENWEATHERMAP_BASE_URL")
                .unwrap_or(defaults.openweather_base_url),
            upstream_timeout: parse_var("UPSTREAM_TIMEOUT_SECS")?
                .map(Duration::from_secs)
                .unwrap_or(defaults.upstream_timeout),

            google_client_secret: var("GOOGLE_CLIENT_SECRET"),
            session_secret: var("SESSION_SECRET").map(String::into_bytes),
            client_api_key: var("CLIENT_API_KEY"),
            geodb_api_key: var("GEODB_API_KEY"),
            openaq_api_key: var("OPENAQ_API_KEY"),
            openweather_api_key: var("OPENWEATHERMAP_API_KEY"),
        })
    }

    /// Config with every secret populated, for tests.
    pub fn test_default() -> Self {
        Self {
            google_client_id: Some("test_client_id".to_string()),
            google_client_secret: Some("test_client_secret".to_string()),
            session_secret: Some(b"test_session_secret_32_bytes_min!".to_vec()),
            client_api_key: Some("test-app-api-key".to_string()),
            geodb_api_key: Some("test_geodb_key".to_string()),
            openaq_api_key: Some("test_openaq_key".to_string()),
            openweather_api_key: Some("test_openweather_key".to_string()),
            upstream_timeout: Duration::from_secs(2),
            ..Self::default()
        }
    }

    /// Whether session cookies must carry the `Secure` attribute.
    pub fn secure_cookies(&self) -> bool {
        self.google_callback_url.starts_with("https://")
    }
}

/// Read a variable, treating blank values as unset.
fn var(name: &str) -> Option<String> {
    env::var(name)
        .ok()
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

fn parse_var<T: std::str::FromStr>(name: &'static str) -> Result<Option<T>, ConfigError> {
    var(name)
        .map(|raw| raw.parse().map_err(|_| ConfigError::Invalid(name, raw)))
        .transpose()
}

/// Configuration errors
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Invalid value for environment variable {0}: {1:?}")]
    Invalid(&'static str, String),
}
