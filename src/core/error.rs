use thiserror::Error;

/// Failure taxonomy shared by the core, the sync layer and the backend client.
///
/// None of these are fatal: configuration problems fall back to sample data,
/// network problems keep the last known data, and validation problems are
/// reported before anything is sent.
#[derive(Debug, Error)]
pub enum PerrosError {
    #[error("Backend not configured: {0}")]
    Configuration(String),

    #[error("Network error: {0}")]
    Network(String),

    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("Storage error: {0}")]
    Storage(String),
}

impl PerrosError {
    /// Whether the failure should flip the client into fallback mode.
    pub fn degrades_to_fallback(&self) -> bool {
        matches!(self, PerrosError::Configuration(_) | PerrosError::Network(_))
    }
}

impl From<reqwest::Error> for PerrosError {
    fn from(e: reqwest::Error) -> Self {
        PerrosError::Network(e.to_string())
    }
}

impl From<fjall::Error> for PerrosError {
    fn from(e: fjall::Error) -> Self {
        PerrosError::Storage(e.to_string())
    }
}

impl From<serde_json::Error> for PerrosError {
    fn from(e: serde_json::Error) -> Self {
        PerrosError::Storage(e.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fallback_classification() {
        assert!(PerrosError::Configuration("no url".into()).degrades_to_fallback());
        assert!(PerrosError::Network("timeout".into()).degrades_to_fallback());
        assert!(!PerrosError::Validation("name".into()).degrades_to_fallback());
        assert!(!PerrosError::InvalidInput("price".into()).degrades_to_fallback());
    }

    #[test]
    fn test_messages() {
        assert_eq!(
            PerrosError::Validation("Necesitamos tu ubicación".into()).to_string(),
            "Validation error: Necesitamos tu ubicación"
        );
    }
}
