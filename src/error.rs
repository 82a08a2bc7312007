//! Error types for the dashboard

use thiserror::Error;

/// Main error type for the dashboard
#[derive(Error, Debug)]
pub enum Error {
    /// A required setting was not provided
    #[error("Configuration missing: {0}")]
    ConfigMissing(String),

    /// A setting was provided but is invalid
    #[error("Configuration error: {0}")]
    Configuration(String),

    /// The database could not serve the request (pool exhausted, connection or query failure)
    #[error("Data unavailable: {0}")]
    DataUnavailable(#[from] sqlx::Error),

    /// Chart figure could not be serialized
    #[error("Render error: {0}")]
    Render(#[from] serde_json::Error),

    /// Metric registration or encoding failed
    #[error("Metrics error: {0}")]
    Metrics(#[from] prometheus::Error),

    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl Error {
    /// Whether the failure came from the database collaborator
    pub fn is_data_unavailable(&self) -> bool {
        matches!(self, Error::DataUnavailable(_))
    }
}

/// Result type alias
pub type Result<T> = std::result::Result<T, Error>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = Error::ConfigMissing("DATABASE_URL".to_string());
        assert_eq!(err.to_string(), "Configuration missing: DATABASE_URL");

        let err = Error::DataUnavailable(sqlx::Error::PoolTimedOut);
        assert!(err.to_string().starts_with("Data unavailable:"));
        assert!(err.is_data_unavailable());
        assert!(!Error::Configuration("bad".into()).is_data_unavailable());
    }
}
