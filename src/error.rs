use std::path::PathBuf;

use thiserror::Error;

/// Failures that stop the pipeline before any parsing is attempted.
///
/// These are never folded into a report's error list; they are returned to
/// the caller as-is.
#[derive(Error, Debug)]
pub enum InputError {
    #[error("Cannot find file specified: {}", .0.display())]
    FileNotFound(PathBuf),

    #[error("Failed to read {source_name}: {error}")]
    Read {
        source_name: String,
        #[source]
        error: std::io::Error,
    },

    #[error("Failed to read clipboard: {0}")]
    Clipboard(#[from] arboard::Error),

    #[error("Invalid input type: {0} (expected base64, xml or har)")]
    InvalidInputType(String),

    #[error("Input is not valid base64: {0}")]
    Base64(#[from] base64::DecodeError),

    #[error("Decoded input is not valid UTF-8")]
    Utf8(#[from] std::string::FromUtf8Error),

    #[error("Input is not a valid HAR capture: {0}")]
    Har(#[from] serde_json::Error),

    #[error("No SAML response found in HAR capture")]
    HarNoSamlResponse,
}
