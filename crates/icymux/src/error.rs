//! Error types for icymux
//!
//! Centralized error handling using thiserror.

use thiserror::Error;

/// Main error type for ICY stream handling
#[derive(Error, Debug)]
pub enum IcyError {
    #[error("{}", friendly_network_error(.0))]
    Network(#[from] reqwest::Error),

    #[error("HTTP {0}")]
    BadStatus(u16),

    #[error("response has no body")]
    MissingBody,

    #[error("unexpected end of stream inside a metadata frame")]
    TruncatedStream,

    #[error("giving up after {attempts} reconnect attempts")]
    ReconnectExhausted { attempts: u32 },

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Result type alias for icymux
pub type Result<T> = std::result::Result<T, IcyError>;

fn friendly_network_error(e: &reqwest::Error) -> String {
    if e.is_builder() {
        if let Some(url) = e.url() {
            return format!("Invalid URL: {url}");
        }
        return "Invalid URL".to_string();
    }
    if e.is_connect() {
        if let Some(url) = e.url() {
            return format!("Could not connect to {}", url.host_str().unwrap_or("server"));
        }
        return "Could not connect to server".to_string();
    }
    if e.is_timeout() {
        return "Connection timed out".to_string();
    }
    format!("Network error: {e}")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn bad_status_display() {
        let e = IcyError::BadStatus(404);
        assert_eq!(e.to_string(), "HTTP 404");
    }

    #[test]
    fn reconnect_exhausted_includes_attempt_count() {
        let e = IcyError::ReconnectExhausted { attempts: 3 };
        assert!(e.to_string().contains('3'));
    }

    #[test]
    fn io_error_converts() {
        let io = std::io::Error::new(std::io::ErrorKind::UnexpectedEof, "eof");
        let e: IcyError = io.into();
        assert!(matches!(e, IcyError::Io(_)));
    }
}
