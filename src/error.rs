//! Unified error types for the API server.

use std::net::SocketAddr;

use thiserror::Error;

/// Unified error type for the API server.
///
/// Failures inside a request handler are not represented here: they are
/// recovered by the responder and surfaced to the client as a 500.
#[derive(Error, Debug)]
pub enum AppError {
    /// Configuration loading error.
    #[error("configuration error: {0}")]
    Config(#[from] envy::Error),

    /// Configuration loaded but failed validation.
    #[error("invalid configuration: {0}")]
    InvalidConfig(String),

    /// The listening socket could not be acquired.
    #[error("failed to bind {addr}: {source}")]
    Bind {
        /// Address we tried to listen on.
        addr: SocketAddr,
        /// Underlying socket error.
        #[source]
        source: std::io::Error,
    },

    /// The server loop failed after binding.
    #[error("server error: {0}")]
    Serve(#[source] std::io::Error),

    /// Re-executing the server binary failed.
    #[error("reload failed: {0}")]
    Reload(#[source] std::io::Error),
}

impl AppError {
    /// Whether this is a failure to acquire the listening socket.
    pub fn is_bind_error(&self) -> bool {
        matches!(self, AppError::Bind { .. })
    }
}

/// Convenient Result type alias.
pub type Result<T> = std::result::Result<T, AppError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn bind_error_names_the_address() {
        let addr: SocketAddr = "127.0.0.1:5000".parse().unwrap();
        let err = AppError::Bind {
            addr,
            source: std::io::Error::new(std::io::ErrorKind::AddrInUse, "address in use"),
        };

        assert!(err.is_bind_error());
        assert_eq!(err.to_string(), "failed to bind 127.0.0.1:5000: address in use");
    }

    #[test]
    fn invalid_config_is_not_a_bind_error() {
        let err = AppError::InvalidConfig("BJJ_API_HOST must be an IP address".to_string());
        assert!(!err.is_bind_error());
    }
}
