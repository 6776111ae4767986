//! Client configuration loaded from environment variables.
//!
//! Runtime settings (API URL, timeout, session location, polling intervals)
//! come from the environment; upload limits, catalogues and validation
//! thresholds are static constants.

use std::env;
use std::path::PathBuf;
use std::time::Duration;

/// Default API base URL for local development.
pub const DEFAULT_API_URL: &str = "http://localhost:3001/api";

/// Default request timeout.
pub const DEFAULT_TIMEOUT_MS: u64 = 10_000;

/// Institutional email domains accepted at registration.
pub const EMAIL_DOMAINS: [&str; 2] = ["@univali.br", "@edu.univali.br"];

pub const COURSES: [&str; 11] = [
    "Ciência da Computação",
    "Engenharia de Software",
    "Sistemas de Informação",
    "Engenharia Civil",
    "Engenharia Mecânica",
    "Engenharia Elétrica",
    "Administração",
    "Direito",
    "Medicina",
    "Psicologia",
    "Outro",
];

pub const PERIODS: [&str; 10] = ["1º", "2º", "3º", "4º", "5º", "6º", "7º", "8º", "9º", "10º"];

pub const SUBJECTS: [&str; 16] = [
    "Cálculo I",
    "Cálculo II",
    "Cálculo III",
    "Física I",
    "Física II",
    "Física III",
    "Química",
    "Biologia",
    "Matemática",
    "Programação",
    "Estrutura de Dados",
    "Banco de Dados",
    "Redes de Computadores",
    "Engenharia de Software",
    "Sistemas Operacionais",
    "Outro",
];

/// Limits for user-supplied images.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct UploadLimits {
    pub max_file_size: u64,
    pub allowed_types: &'static [&'static str],
    pub max_width: u32,
    pub max_height: u32,
}

pub const UPLOAD_LIMITS: UploadLimits = UploadLimits {
    max_file_size: 5 * 1024 * 1024,
    allowed_types: &[
        "image/jpeg",
        "image/jpg",
        "image/png",
        "image/gif",
        "image/webp",
    ],
    max_width: 2000,
    max_height: 2000,
};

impl UploadLimits {
    /// Check a candidate upload against the size and MIME type limits.
    pub fn accepts(&self, content_type: &str, size: u64) -> bool {
        size <= self.max_file_size && self.allowed_types.contains(&content_type)
    }
}

pub const MAX_MESSAGE_LENGTH: usize = 1000;
pub const MESSAGES_PER_PAGE: u32 = 50;
pub const LATEST_MESSAGES: u32 = 10;
pub const NOTIFICATIONS_PER_PAGE: u32 = 20;

/// Thresholds checked by hand-written rules. Field length and participant
/// bounds are declared on the request types.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ValidationRules {
    pub password_min_length: usize,
    pub message_max_length: usize,
}

pub const VALIDATION_RULES: ValidationRules = ValidationRules {
    password_min_length: 8,
    message_max_length: MAX_MESSAGE_LENGTH,
};

/// Client configuration, loaded once at startup.
#[derive(Debug, Clone)]
pub struct Config {
    /// Base URL of the REST API (no trailing slash)
    pub api_url: String,
    /// Per-request timeout
    pub timeout: Duration,
    /// Directory holding the persisted session keys
    pub session_dir: PathBuf,
    /// Chat refresh interval
    pub chat_poll_interval: Duration,
    /// Notification refresh interval
    pub notifications_poll_interval: Duration,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            api_url: DEFAULT_API_URL.to_string(),
            timeout: Duration::from_millis(DEFAULT_TIMEOUT_MS),
            session_dir: default_session_dir(),
            chat_poll_interval: Duration::from_millis(3_000),
            notifications_poll_interval: Duration::from_millis(10_000),
        }
    }
}

impl Config {
    /// Load configuration from environment variables.
    ///
    /// A `.env` file in the working directory is honored when present.
    pub fn from_env() -> Result<Self, ConfigError> {
        dotenvy::dotenv().ok();

        let defaults = Self::default();

        Ok(Self {
            api_url: env::var("CONNEXA_API_URL")
                .map(|v| v.trim().trim_end_matches('/').to_string())
                .unwrap_or(defaults.api_url),
            timeout: millis_var("CONNEXA_TIMEOUT_MS")?.unwrap_or(defaults.timeout),
            session_dir: env::var("CONNEXA_SESSION_DIR")
                .map(PathBuf::from)
                .unwrap_or(defaults.session_dir),
            chat_poll_interval: millis_var("CONNEXA_CHAT_POLL_MS")?
                .unwrap_or(defaults.chat_poll_interval),
            notifications_poll_interval: millis_var("CONNEXA_NOTIFICATIONS_POLL_MS")?
                .unwrap_or(defaults.notifications_poll_interval),
        })
    }

    /// Config pointing at a specific server, for tests and embedding.
    pub fn with_api_url(api_url: impl Into<String>) -> Self {
        Self {
            api_url: api_url.into().trim_end_matches('/').to_string(),
            ..Self::default()
        }
    }
}

fn default_session_dir() -> PathBuf {
    dirs::data_local_dir()
        .unwrap_or_else(std::env::temp_dir)
        .join("connexa")
}

fn millis_var(name: &'static str) -> Result<Option<Duration>, ConfigError> {
    match env::var(name) {
        Ok(raw) => raw
            .trim()
            .parse::<u64>()
            .map(|ms| Some(Duration::from_millis(ms)))
            .map_err(|_| ConfigError::Invalid(name)),
        Err(_) => Ok(None),
    }
}

/// Configuration errors
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Invalid value for environment variable: {0}")]
    Invalid(&'static str),
}
