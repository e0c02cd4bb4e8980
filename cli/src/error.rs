#![deny(missing_docs)]

//! # CLI Errors
//!
//! Error types for the CLI crate.

use apimodel_core::AppError;
use derive_more::{Display, From};

/// Main error enum for CLI operations.
#[derive(Debug, Display, From)]
pub enum CliError {
    /// IO Error wrapper.
    #[display("IO Error: {}", _0)]
    Io(std::io::Error),

    /// Model loading or evaluation failed.
    #[display("{}", _0)]
    Model(AppError),

    /// YAML rendering failed.
    #[display("YAML Error: {}", _0)]
    Yaml(serde_yaml::Error),

    /// JSON rendering failed.
    #[display("JSON Error: {}", _0)]
    Json(serde_json::Error),

    /// Walking the model repository failed.
    #[display("Repository scan failed: {}", _0)]
    Walk(walkdir::Error),

    /// The requested API alias is not in the model repository.
    #[from(ignore)]
    #[display("Unknown API '{}'", _0)]
    UnknownApi(String),

    /// Cloning the model repository failed.
    #[from(ignore)]
    #[display("git clone of {} failed: {}", url, status)]
    Clone {
        /// Repository URL.
        url: String,
        /// Exit status reported by git.
        status: String,
    },

    /// General failure message.
    #[from(ignore)]
    #[display("Operation failed: {}", _0)]
    General(String),
}

/// Manual implementation of the standard Error trait.
impl std::error::Error for CliError {}

/// Result type alias.
pub type CliResult<T> = Result<T, CliError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_display() {
        assert_eq!(CliError::UnknownApi("nope".into()).to_string(), "Unknown API 'nope'");
        let model: CliError = AppError::NotFound {
            kind: "resource",
            name: "Widget".into(),
        }
        .into();
        assert_eq!(model.to_string(), "No such resource: 'Widget'");
    }
}
