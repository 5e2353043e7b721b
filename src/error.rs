//! Errors reported by the Catastro services.

use std::fmt::{self, Display, Formatter};

/// An error reported by a Catastro service.
///
/// The Callejero endpoints report failures as a `lerr` list of code/description
/// pairs; malformed or empty responses are reported without a code. The error is
/// carried inside [`anyhow::Error`] and can be recovered with
/// [`downcast_ref`](anyhow::Error::downcast_ref).
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ServerError {
    /// The error code assigned by the service, if any.
    pub code: Option<String>,
    /// Human-readable description of the failure.
    pub message: String,
}

impl ServerError {
    /// A failure reported by the service with a `lerr` entry.
    pub fn reported(code: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            code: Some(code.into()),
            message: message.into(),
        }
    }

    /// The service returned an empty body.
    pub fn empty_response() -> Self {
        Self {
            code: None,
            message: "the server returned an empty response".into(),
        }
    }

    /// The service returned a body that is not valid JSON.
    pub fn not_json(raw: &[u8]) -> Self {
        Self {
            code: None,
            message: format!(
                "the server did not return JSON; raw body: {}",
                String::from_utf8_lossy(raw)
            ),
        }
    }
}

impl Display for ServerError {
    fn fmt(&self, f: &mut Formatter) -> fmt::Result {
        match &self.code {
            Some(code) => write!(f, "Catastro error {code}: {}", self.message),
            None => write!(f, "Catastro error: {}", self.message),
        }
    }
}

impl std::error::Error for ServerError {}
