//! Custom error types for translation operations

use thiserror::Error;

/// Translation-related errors
#[derive(Error, Debug)]
pub enum TranslationError {
    /// Input XML could not be parsed
    #[error("Parse error: {path} - {message}")]
    ParseError {
        path: String,
        message: String,
    },

    /// One segment of a long text failed to translate
    #[error("Segment {index} failed: {message}")]
    SegmentTranslationError {
        index: usize,
        message: String,
    },

    /// Failure while walking the document tree
    #[error("Walk error: {0}")]
    WalkError(Box<TranslationError>),

    /// Output file could not be written
    #[error("Write error: {path} - {message}")]
    WriteError {
        path: String,
        message: String,
    },

    /// API request failed
    #[error("API error: {status} - {message}")]
    ApiError {
        status: u16,
        message: String,
    },

    /// Rate limit exceeded
    #[error("Rate limit exceeded")]
    RateLimitError,

    /// Network error
    #[error("Network error: {message}")]
    NetworkError {
        message: String,
    },

    /// Invalid response from API
    #[error("Invalid response: {message}")]
    InvalidResponseError {
        message: String,
    },

    /// File operation error
    #[error("File error: {path} - {message}")]
    FileError {
        path: String,
        message: String,
    },

    /// Configuration error
    #[error("Configuration error: {message}")]
    ConfigError {
        message: String,
    },

    /// Broken internal invariant
    #[error("Internal error: {0}")]
    InternalError(String),

    /// Reqwest error
    #[error("HTTP client error: {0}")]
    HttpError(#[from] reqwest::Error),

}

impl TranslationError {
    /// Wrap an error raised during traversal
    pub fn walk(err: TranslationError) -> Self {
        match err {
            TranslationError::WalkError(_) => err,
            other => TranslationError::WalkError(Box::new(other)),
        }
    }
}

/// Result type for translation operations
pub type Result<T> = std::result::Result<T, TranslationError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_walk_error_is_not_nested() {
        let err = TranslationError::walk(TranslationError::RateLimitError);
        let err = TranslationError::walk(err);

        match err {
            TranslationError::WalkError(inner) => {
                assert!(matches!(*inner, TranslationError::RateLimitError));
            }
            other => panic!("unexpected error: {}", other),
        }
    }

    #[test]
    fn test_error_messages() {
        let err = TranslationError::ParseError {
            path: "file.xml".to_string(),
            message: "unexpected end".to_string(),
        };
        assert_eq!(err.to_string(), "Parse error: file.xml - unexpected end");
    }
}
