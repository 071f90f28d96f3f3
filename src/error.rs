use thiserror::Error;

pub type Result<T> = std::result::Result<T, CollectorError>;

#[derive(Error, Debug)]
pub enum CollectorError {
    #[error("File I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("HTTP transport error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("HTTP {status} from {url}")]
    HttpStatus { status: u16, url: String },

    #[error("Transient HTTP {status} from {url}")]
    TransientStatus { status: u16, url: String },

    #[error("Gave up after {attempts} attempts (last status {status})")]
    RetriesExhausted { attempts: u32, status: u16 },

    #[error("Invalid response: {0}")]
    InvalidResponse(String),

    #[error("--date must be YYYY-MM-DD, got '{0}'")]
    InvalidDate(String),

    #[error("Provide --api-key or set OWM_API_KEY in .env")]
    MissingApiKey,

    #[error("Reference page scrape failed: {0}")]
    Scrape(String),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Settings error: {0}")]
    Settings(#[from] config::ConfigError),

    #[error("Validation error: {0}")]
    Validation(#[from] validator::ValidationErrors),

    #[error("Failed to replace file: {0}")]
    Persist(#[from] tempfile::PersistError),
}

impl CollectorError {
    /// True for provider-side throttling or server errors worth retrying.
    pub fn is_transient(&self) -> bool {
        matches!(self, CollectorError::TransientStatus { .. })
    }
}
