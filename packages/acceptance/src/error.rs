//! Error types for the acceptance steps

use std::time::Duration;

use thiserror::Error;

use crate::binder::StepKeyword;

/// Main error type for step execution.
///
/// Nothing in this crate recovers from these locally: every error aborts the
/// current scenario and is reported by the runner.
#[derive(Error, Debug)]
pub enum AcceptanceError {
    /// Required configuration is missing or malformed
    #[error("Configuration error: {0}")]
    Config(String),

    /// A step referenced a page name that is not in the registry
    #[error("Unknown page: '{0}' is not registered")]
    UnknownPage(String),

    /// Element lookup found nothing for any of the target's locators
    #[error("Element not found: {target}")]
    LocatorNotFound { target: String },

    /// Awaited condition did not hold within the bound
    #[error("Timed out after {timeout:?} waiting for {target} to be {condition}")]
    WaitTimeout {
        target: String,
        condition: String,
        timeout: Duration,
    },

    /// An expected value did not hold
    #[error("Assertion failed: {0}")]
    AssertionFailed(String),

    /// The same phrase was bound twice
    #[error("Duplicate step binding: {keyword} \"{pattern}\"")]
    DuplicateStep {
        keyword: StepKeyword,
        pattern: String,
    },

    /// No binding matches the step text
    #[error("Undefined step: {keyword} \"{text}\"")]
    UndefinedStep { keyword: StepKeyword, text: String },

    /// A browser step ran before "a new user," started the session
    #[error("No browser session: the scenario has not started a driver")]
    SessionNotStarted,

    /// The browser process could not be launched
    #[error("Failed to launch browser: {0}")]
    Launch(String),

    /// Browser protocol or driver failure
    #[error("Browser error: {0}")]
    Browser(String),

    /// Filesystem failure while cleaning up a browser profile
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl From<chromiumoxide::error::CdpError> for AcceptanceError {
    fn from(e: chromiumoxide::error::CdpError) -> Self {
        AcceptanceError::Browser(e.to_string())
    }
}

/// Result type alias for acceptance operations
pub type Result<T> = std::result::Result<T, AcceptanceError>;
