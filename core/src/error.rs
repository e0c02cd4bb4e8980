#![deny(missing_docs)]

//! # Error Handling
//!
//! Provides the unified `AppError` enum used across the workspace.

use derive_more::{Display, From};

/// The Global Error Enum.
///
/// Construction failures (`Json`, `MissingField`, `DanglingReference`,
/// `UnknownShapeKind`, `MissingListElement`, `CyclicList`) are fatal for the
/// model being evaluated. `NotFound` is reserved for lookups against an
/// already-built model.
#[derive(Debug, Display, From)]
pub enum AppError {
    /// Wrapper for standard IO errors.
    #[display("IO Error: {_0}")]
    Io(std::io::Error),

    /// The model document is not valid JSON or does not match the expected layout.
    #[display("Malformed API model: {_0}")]
    Json(serde_json::Error),

    /// A required top-level field is absent from the model document.
    #[from(ignore)]
    #[display("Malformed API model: missing required field '{_0}'")]
    MissingField(String),

    /// A shape, member or operation references a shape that does not exist.
    #[from(ignore)]
    #[display("Dangling reference: '{referrer}' refers to unknown shape '{target}'")]
    DanglingReference {
        /// The shape member or operation holding the reference.
        referrer: String,
        /// The shape name that could not be resolved.
        target: String,
    },

    /// A shape declares a `type` outside the recognised vocabulary.
    #[from(ignore)]
    #[display("Unknown shape kind '{kind}' for shape '{shape}'")]
    UnknownShapeKind {
        /// Shape name.
        shape: String,
        /// The unrecognised `type` value.
        kind: String,
    },

    /// A list shape has no `member` element reference.
    #[from(ignore)]
    #[display("List shape '{_0}' has no element shape")]
    MissingListElement(String),

    /// A list's element chain leads back to itself without a structure in between.
    #[from(ignore)]
    #[display("List shape '{_0}' contains itself")]
    CyclicList(String),

    /// A lookup against a built model found nothing.
    #[from(ignore)]
    #[display("No such {kind}: '{name}'")]
    NotFound {
        /// What was looked up (e.g. "resource").
        kind: &'static str,
        /// The requested name.
        name: String,
    },

    /// Generic errors.
    #[display("General Error: {_0}")]
    General(String),
}

/// Manual implementation of the standard Error trait.
impl std::error::Error for AppError {}

impl AppError {
    /// Builds a `DanglingReference` error.
    pub fn dangling(referrer: impl Into<String>, target: impl Into<String>) -> Self {
        AppError::DanglingReference {
            referrer: referrer.into(),
            target: target.into(),
        }
    }

    /// Returns true for the "lookup miss" class rather than a construction failure.
    pub fn is_not_found(&self) -> bool {
        matches!(self, AppError::NotFound { .. })
    }
}

/// Helper type alias for Result using AppError.
pub type AppResult<T> = Result<T, AppError>;
