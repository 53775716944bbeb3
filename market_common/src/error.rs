//! Error types shared by the vendor-facing binaries.
//!
//! The `FetchError` enum unifies the failure classes of one fetch run:
//! I/O, transport, vendor session rejections and missing configuration.
//! Each fatal class maps to a stable process exit code so the dashboard
//! can tell a credential problem from a vendor outage.
use std::io;

use thiserror::Error;

/// Unified error type shared by the heatmap and indices binaries.
#[derive(Error, Debug)]
pub enum FetchError {
    /// I/O error originating from the standard library (files, directories).
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    /// Failure while encoding/decoding JSON via serde_json.
    #[error("JSON serialization/deserialization error: {0}")]
    Json(#[from] serde_json::Error),

    /// HTTP-level failure while talking to a vendor endpoint.
    #[error("Transport error: {0}")]
    Transport(String),

    /// The vendor endpoint could not be reached or initialized at all.
    #[error("Vendor unavailable: {0}")]
    Unavailable(String),

    /// Required credentials are missing from the environment.
    #[error("Missing {0} in environment")]
    MissingCredentials(String),

    /// The vendor rejected the login request.
    #[error("login failed ({code}): {msg}")]
    Login {
        /// Vendor status code returned by the login call.
        code: i64,
        /// Vendor-supplied rejection message.
        msg: String,
    },

    /// A vendor query returned a nonzero status code.
    #[error("{api} error: {code}")]
    Query {
        /// Name of the vendor API that failed (e.g. `css`).
        api: String,
        /// Vendor status code.
        code: i64,
    },

    /// Generic formatting/validation error with a human-readable message.
    #[error("Format error: {0}")]
    Format(String),
}

impl FetchError {
    /// Process exit code for this failure class.
    ///
    /// Credential, login and query failures each get a distinct code;
    /// everything else (including an unreachable vendor) exits with 1.
    pub fn exit_code(&self) -> i32 {
        match self {
            FetchError::MissingCredentials(_) => 2,
            FetchError::Login { .. } => 3,
            FetchError::Query { .. } => 4,
            _ => 1,
        }
    }
}
