//! Centralised error taxonomy.
//!
//! The split that matters is transient vs terminal: only [`CheckinError::Transient`]
//! is worth retrying. Credential rejections and protocol drift are deterministic,
//! so retrying them just burns attempts (and risks an account lockout).

use thiserror::Error;

#[derive(Debug, Error)]
pub enum CheckinError {
    /// Invalid or incomplete configuration (empty account list, webvpn mode
    /// without webvpn bases). Never retried, surfaced before any network call.
    #[error("configuration error: {0}")]
    Config(String),

    /// The identity server rejected the credentials. Fatal for the account.
    #[error("authentication rejected: {0}")]
    Auth(String),

    /// Connectivity problem, timeout, or an unexpected HTTP status. Retriable.
    #[error("transient network error: {0}")]
    Transient(String),

    /// Application-level rejection from the check-in endpoint that is not a
    /// session problem (e.g. outside the signin window).
    #[error("signin rejected: {0}")]
    Signin(String),

    /// A 2xx response whose body did not match the expected schema. Indicates
    /// upstream contract drift; the raw body is kept for diagnosis.
    #[error("unexpected response format: {0}")]
    ResponseFormat(String),

    /// The retry policy ran out of attempts on a transient error.
    #[error("{last} (gave up after {attempts} attempts)")]
    Exhausted {
        attempts: u32,
        #[source]
        last: Box<CheckinError>,
    },
}

impl CheckinError {
    pub fn is_transient(&self) -> bool {
        matches!(self, CheckinError::Transient(_))
    }
}

impl From<reqwest::Error> for CheckinError {
    // Connection resets, DNS failures and timeouts all land here.
    fn from(err: reqwest::Error) -> Self {
        CheckinError::Transient(err.to_string())
    }
}

pub type Result<T> = std::result::Result<T, CheckinError>;
