/// Error types for the Machine Translation crate
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MtError {
    /// The translation provider answered with a non-success status or could not be reached
    Provider { status: Option<u16>, detail: String },
    /// Marker tokens missing from the provider output (strict marker policy only)
    MissingMarkers(Vec<usize>),
    /// Invalid language code
    InvalidLocale(String),
    /// Invalid or missing configuration
    ConfigError(String),
    /// HTTP client could not be set up
    NetworkError(String),
    /// Localization catalog could not be loaded, updated or saved
    CatalogError(String),
    /// General error with context
    Other(String),
}

impl MtError {
    pub fn provider(status: Option<u16>, detail: impl Into<String>) -> Self {
        MtError::Provider {
            status,
            detail: detail.into(),
        }
    }
}

impl std::fmt::Display for MtError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            MtError::Provider {
                status: Some(status),
                detail,
            } => write!(f, "Translation provider error ({}): {}", status, detail),
            MtError::Provider {
                status: None,
                detail,
            } => write!(f, "Translation provider error: {}", detail),
            MtError::MissingMarkers(indices) => {
                write!(f, "Marker tokens missing from translation: {:?}", indices)
            }
            MtError::InvalidLocale(msg) => write!(f, "Invalid locale: {}", msg),
            MtError::ConfigError(msg) => write!(f, "Configuration error: {}", msg),
            MtError::NetworkError(msg) => write!(f, "Network error: {}", msg),
            MtError::CatalogError(msg) => write!(f, "Catalog error: {}", msg),
            MtError::Other(msg) => write!(f, "{}", msg),
        }
    }
}

impl std::error::Error for MtError {}

impl From<reqwest::Error> for MtError {
    fn from(err: reqwest::Error) -> Self {
        MtError::Provider {
            status: err.status().map(|s| s.as_u16()),
            detail: err.to_string(),
        }
    }
}

/// Result type for MT operations
pub type MtResult<T> = Result<T, MtError>;
