use thiserror::Error;

/// Top-level error type for the Websage system.
///
/// Only configuration problems at startup are allowed to be fatal.
/// Runtime failures from external providers are caught at the boundary
/// of the component that made the call and converted into substitute
/// data or a state transition, so they never appear here.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum WebsageError {
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Missing credential: {0} is not set")]
    MissingCredential(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serialization(String),
}

impl From<toml::de::Error> for WebsageError {
    fn from(err: toml::de::Error) -> Self {
        WebsageError::Config(err.to_string())
    }
}

impl From<toml::ser::Error> for WebsageError {
    fn from(err: toml::ser::Error) -> Self {
        WebsageError::Config(err.to_string())
    }
}

impl From<serde_json::Error> for WebsageError {
    fn from(err: serde_json::Error) -> Self {
        WebsageError::Serialization(err.to_string())
    }
}

/// A specialized `Result` type for Websage operations.
pub type Result<T> = std::result::Result<T, WebsageError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = WebsageError::Config("missing field".to_string());
        assert_eq!(err.to_string(), "Configuration error: missing field");

        let err = WebsageError::MissingCredential("GEMINI_API_KEY".to_string());
        assert_eq!(
            err.to_string(),
            "Missing credential: GEMINI_API_KEY is not set"
        );
    }

    #[test]
    fn test_io_error_conversion() {
        let io_err = std::io::Error::new(std::io::ErrorKind::NotFound, "file not found");
        let err: WebsageError = io_err.into();
        assert!(matches!(err, WebsageError::Io(_)));
        assert!(err.to_string().contains("file not found"));
    }

    #[test]
    fn test_error_from_toml_de() {
        let bad_toml = "invalid = [[[";
        let parsed: std::result::Result<toml::Value, _> = toml::from_str(bad_toml);
        assert!(parsed.is_err());
        let err: WebsageError = parsed.unwrap_err().into();
        assert!(matches!(err, WebsageError::Config(_)));
    }

    #[test]
    fn test_error_from_serde_json() {
        let bad_json = "{ invalid json }";
        let parsed: std::result::Result<serde_json::Value, _> = serde_json::from_str(bad_json);
        assert!(parsed.is_err());
        let err: WebsageError = parsed.unwrap_err().into();
        assert!(matches!(err, WebsageError::Serialization(_)));
    }

    #[test]
    fn test_result_type_with_question_mark() {
        fn inner() -> Result<String> {
            let io_result: std::result::Result<i32, std::io::Error> = Ok(42);
            let _value = io_result?;
            Ok("success".to_string())
        }

        assert_eq!(inner().unwrap(), "success");
    }

    #[test]
    fn test_error_debug_impl() {
        let err = WebsageError::MissingCredential("GOOGLE_CSE_ID".to_string());
        let dbg = format!("{:?}", err);
        assert!(dbg.contains("MissingCredential"));
        assert!(dbg.contains("GOOGLE_CSE_ID"));
    }
}
