/// Error types for notification delivery
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum NotificationError {
    /// The notification could not be delivered; carries the underlying reason
    Unprocessable(String),
}

impl std::fmt::Display for NotificationError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            NotificationError::Unprocessable(msg) => {
                write!(f, "Notification unprocessable: {}", msg)
            }
        }
    }
}

impl std::error::Error for NotificationError {}

impl From<reqwest::Error> for NotificationError {
    fn from(err: reqwest::Error) -> Self {
        NotificationError::Unprocessable(err.to_string())
    }
}

/// Result type for notification operations
pub type NotifyResult<T> = Result<T, NotificationError>;
