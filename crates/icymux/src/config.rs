//! Configuration for ICY stream handling

use std::time::Duration;

/// Network-related constants
pub mod network {
    /// User agent for HTTP requests
    pub const USER_AGENT: &str = concat!("icymux/", env!("CARGO_PKG_VERSION"));

    /// Default connection timeout
    pub const DEFAULT_CONNECT_TIMEOUT_SECS: u64 = 10;

    /// Default read timeout
    pub const DEFAULT_READ_TIMEOUT_SECS: u64 = 30;

    /// Default number of reconnect attempts before giving up
    pub const DEFAULT_MAX_RETRIES: u32 = 3;

    /// Default delay between reconnect attempts (fixed, no backoff)
    pub const DEFAULT_RETRY_DELAY_MS: u64 = 2000;

    /// Maximum redirects followed when redirects are enabled
    pub const MAX_REDIRECTS: usize = 10;
}

/// ICY protocol constants
pub mod protocol {
    /// Metadata frame lengths are declared in units of 16 bytes
    pub const METADATA_LENGTH_UNIT: usize = 16;

    /// Maximum metadata frame body: length byte 255 × 16 bytes
    pub const MAX_METADATA_LEN: usize = 255 * METADATA_LENGTH_UNIT;

    /// Chunk size for raw reads when no read size is imposed by the caller
    pub const READ_CHUNK_SIZE: usize = 8 * 1024;
}

/// Immutable per-track stream configuration.
///
/// Created once and shared read-only by every session and every reconnect
/// attempt derived from the same track. Nothing here is mutated after
/// construction, so concurrent tracks can share a clone freely.
#[derive(Debug, Clone)]
pub struct StreamConfig {
    /// Reconnect transparently when the connection drops mid-playback
    pub auto_reconnect: bool,
    /// Request and strip in-band ICY metadata
    pub enable_metadata: bool,
    /// TCP/TLS connect timeout
    pub connect_timeout: Duration,
    /// Timeout for individual body reads
    pub read_timeout: Duration,
    /// Reconnect attempts before the stream fails for good
    pub max_retries: u32,
    /// Fixed wait before each reconnect attempt
    pub retry_delay: Duration,
    /// Follow HTTP redirects on connect
    pub follow_redirects: bool,
}

impl Default for StreamConfig {
    fn default() -> Self {
        Self {
            auto_reconnect: true,
            enable_metadata: true,
            connect_timeout: Duration::from_secs(network::DEFAULT_CONNECT_TIMEOUT_SECS),
            read_timeout: Duration::from_secs(network::DEFAULT_READ_TIMEOUT_SECS),
            max_retries: network::DEFAULT_MAX_RETRIES,
            retry_delay: Duration::from_millis(network::DEFAULT_RETRY_DELAY_MS),
            follow_redirects: true,
        }
    }
}
