//! Central error handling for the nimbus3d renderer
//!
//! Provides a unified CloudError enum with consistent categorization
//! for configuration, bake, and render failures.

/// Centralized error type for all renderer operations
#[derive(thiserror::Error, Debug)]
pub enum CloudError {
    #[error("Config error: {0}")]
    Config(String),

    #[error("Bake error: {0}")]
    Bake(String),

    #[error("Render error: {0}")]
    Render(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl CloudError {
    /// Convenience constructors for common error types
    pub fn config<T: ToString>(msg: T) -> Self {
        CloudError::Config(msg.to_string())
    }

    pub fn bake<T: ToString>(msg: T) -> Self {
        CloudError::Bake(msg.to_string())
    }

    pub fn render<T: ToString>(msg: T) -> Self {
        CloudError::Render(msg.to_string())
    }
}

/// Convenient Result type alias for renderer operations
pub type CloudResult<T> = Result<T, CloudError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn error_messages_carry_category_prefix() {
        assert_eq!(
            CloudError::config("bad extents").to_string(),
            "Config error: bad extents"
        );
        assert_eq!(CloudError::bake("oops").to_string(), "Bake error: oops");
    }

    #[test]
    fn io_errors_convert() {
        let io = std::io::Error::new(std::io::ErrorKind::NotFound, "missing");
        let err: CloudError = io.into();
        assert!(matches!(err, CloudError::Io(_)));
    }
}
