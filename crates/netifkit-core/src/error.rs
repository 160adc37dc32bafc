//! Error handling for NetifKit
//!
//! Provides error types for the two fallible layers of the core:
//! - Lifecycle errors (interface enable/disable transitions)
//! - Session errors (PPP modem session coordination)
//!
//! The event registry and translator never fail observably; unknown or
//! malformed events are dropped by policy, so there is no error type for
//! them. All error types use `thiserror` for ergonomic error handling.

use crate::types::DriverStatus;
use thiserror::Error;

/// Interface lifecycle error type
///
/// Represents errors from interface enable/disable transitions and the
/// shared-driver init/teardown sequence they coordinate.
#[derive(Error, Debug, Clone)]
pub enum LifecycleError {
    /// The vendor driver returned a non-success status
    #[error("Driver call failed with status {status}")]
    Driver {
        /// The vendor status code, carried verbatim for diagnostics.
        status: DriverStatus,
    },

    /// A required configuration parameter is missing or invalid
    #[error("Configuration error: {reason}")]
    Configuration {
        /// The reason the configuration is invalid.
        reason: String,
    },

    /// A shared resource is already in use
    #[error("Resource busy: {resource}")]
    Busy {
        /// The resource that is already owned.
        resource: String,
    },

    /// A bounded wait elapsed before the condition was met
    #[error("Operation timed out after {timeout_ms}ms")]
    Timeout {
        /// The timeout duration in milliseconds.
        timeout_ms: u64,
    },
}

/// Modem session error type
///
/// Represents errors from the PPP modem session startup protocol and its
/// command-mode operations.
#[derive(Error, Debug, Clone)]
pub enum SessionError {
    /// A required session parameter is missing or invalid
    #[error("Configuration error: {reason}")]
    Configuration {
        /// The reason the configuration is invalid.
        reason: String,
    },

    /// A bus pin or the session itself is already owned
    #[error("Resource busy: {resource}")]
    ResourceBusy {
        /// The resource that is already owned.
        resource: String,
    },

    /// The modem driver returned a non-success status
    #[error("Driver call failed with status {status}")]
    Driver {
        /// The vendor status code, carried verbatim for diagnostics.
        status: DriverStatus,
    },

    /// A command was issued while the session is in an incompatible mode
    #[error("Wrong session mode: {current} (requires {required})")]
    WrongMode {
        /// The current session mode name.
        current: String,
        /// The mode the operation requires.
        required: String,
    },

    /// A bounded wait elapsed before the condition was met
    #[error("Operation timed out after {timeout_ms}ms")]
    Timeout {
        /// The timeout duration in milliseconds.
        timeout_ms: u64,
    },
}

/// Main error type for NetifKit
///
/// A unified error type that can represent any error from all layers.
/// This is the primary error type used in public APIs.
#[derive(Error, Debug)]
pub enum Error {
    /// Interface lifecycle error
    #[error(transparent)]
    Lifecycle(#[from] LifecycleError),

    /// Modem session error
    #[error(transparent)]
    Session(#[from] SessionError),

    /// Standard I/O error
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Generic error
    #[error("{0}")]
    Other(String),
}

impl Error {
    /// Create an error from a string message
    pub fn other(msg: impl Into<String>) -> Self {
        Error::Other(msg.into())
    }

    /// Check if this is a timeout error
    pub fn is_timeout(&self) -> bool {
        matches!(
            self,
            Error::Lifecycle(LifecycleError::Timeout { .. })
                | Error::Session(SessionError::Timeout { .. })
        )
    }

    /// Check if this error carries a vendor driver status code
    pub fn is_driver_error(&self) -> bool {
        matches!(
            self,
            Error::Lifecycle(LifecycleError::Driver { .. })
                | Error::Session(SessionError::Driver { .. })
        )
    }

    /// Get the vendor driver status code, if this error carries one
    pub fn driver_status(&self) -> Option<DriverStatus> {
        match self {
            Error::Lifecycle(LifecycleError::Driver { status }) => Some(*status),
            Error::Session(SessionError::Driver { status }) => Some(*status),
            _ => None,
        }
    }

    /// Check if this is a configuration error
    pub fn is_configuration_error(&self) -> bool {
        matches!(
            self,
            Error::Lifecycle(LifecycleError::Configuration { .. })
                | Error::Session(SessionError::Configuration { .. })
        )
    }

    /// Check if this is a resource-busy error
    pub fn is_busy(&self) -> bool {
        matches!(
            self,
            Error::Lifecycle(LifecycleError::Busy { .. })
                | Error::Session(SessionError::ResourceBusy { .. })
        )
    }

    /// Check if this is a wrong-mode error
    pub fn is_wrong_mode(&self) -> bool {
        matches!(self, Error::Session(SessionError::WrongMode { .. }))
    }
}

/// Result type using Error
pub type Result<T> = std::result::Result<T, Error>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_driver_status_carried_verbatim() {
        let err: Error = LifecycleError::Driver {
            status: DriverStatus(0x3002),
        }
        .into();
        assert!(err.is_driver_error());
        assert_eq!(err.driver_status(), Some(DriverStatus(0x3002)));
        assert!(err.to_string().contains("0x3002"));
    }

    #[test]
    fn test_classification_helpers() {
        let timeout: Error = SessionError::Timeout { timeout_ms: 10 }.into();
        assert!(timeout.is_timeout());
        assert!(!timeout.is_busy());

        let busy: Error = SessionError::ResourceBusy {
            resource: "pin 17".to_string(),
        }
        .into();
        assert!(busy.is_busy());

        let mode: Error = SessionError::WrongMode {
            current: "data".to_string(),
            required: "command".to_string(),
        }
        .into();
        assert!(mode.is_wrong_mode());
        assert!(mode.to_string().contains("command"));
    }

    #[test]
    fn test_other() {
        let err = Error::other("something unexpected");
        assert_eq!(err.to_string(), "something unexpected");
        assert!(!err.is_driver_error());
    }
}
