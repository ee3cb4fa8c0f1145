// src/infra/errors.rs — Error types for depkeeper

use thiserror::Error;

#[derive(Error, Debug)]
pub enum Error {
    /// A setup problem the user must fix (bad config file, missing or
    /// rejected credentials, unknown platform). Reported as the bare message,
    /// without further context.
    #[error("{0}")]
    Configuration(String),

    #[error("platform '{platform}' request failed: {message}")]
    Platform { platform: String, message: String },

    #[error("repository '{repository}': {message}")]
    Worker { repository: String, message: String },

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),
}

pub type Result<T> = std::result::Result<T, Error>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn configuration_displays_bare_message() {
        let err = Error::Configuration("a personal access token is required".into());
        assert_eq!(err.to_string(), "a personal access token is required");
    }

    #[test]
    fn worker_display_includes_repository() {
        let err = Error::Worker {
            repository: "org/app".into(),
            message: "spawn failed".into(),
        };
        let display = err.to_string();
        assert!(display.contains("org/app"));
        assert!(display.contains("spawn failed"));
    }

    #[test]
    fn io_error_converts() {
        let io = std::io::Error::new(std::io::ErrorKind::PermissionDenied, "denied");
        let err: Error = io.into();
        assert!(err.to_string().contains("denied"));
    }
}
