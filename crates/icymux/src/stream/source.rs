//! Stream source: URL eligibility and track loading
//!
//! Decides whether a URL looks like an internet radio stream, builds the
//! track descriptor for it, and opens the supervised stream.

use std::sync::Arc;
use std::time::Duration;

use tracing::debug;

use crate::config::StreamConfig;
use crate::error::{IcyError, Result};
use crate::net::{default_transport, HttpTransport};
use crate::stream::connect::{IcyHeaders, ICY_REQUEST_HEADERS};
use crate::stream::supervisor::IcyStream;

/// File extensions that identify a stream URL without probing
const STREAM_EXTENSIONS: &[&str] = &["mp3", "aac", "aacp", "m3u8", "pls"];

/// URL substrings that identify a stream URL without probing
const STREAM_KEYWORDS: &[&str] = &["radio", "stream", "live", "broadcast"];

/// Content types a probe accepts as a radio stream
const STREAM_CONTENT_TYPES: &[&str] = &[
    "audio/mpeg",
    "audio/aac",
    "audio/aacp",
    "audio/x-mpegurl",
    "application/vnd.apple.mpegurl",
    "audio/mpegurl",
    "audio/x-scpls",
];

/// Descriptor for a playable radio stream
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TrackInfo {
    /// Station name, or "Radio Stream" when the server does not say
    pub title: String,
    /// Station genre, or "Unknown" when the server does not say
    pub author: String,
    /// None: live streams have no duration
    pub duration: Option<Duration>,
    /// The stream URL
    pub identifier: String,
    pub is_stream: bool,
    /// `icy-br` as display text
    pub bitrate: Option<String>,
}

/// Entry point for turning URLs into playable streams.
pub struct IcySource {
    config: StreamConfig,
    transport: Arc<dyn HttpTransport>,
}

impl IcySource {
    pub fn new(config: StreamConfig) -> Result<Self> {
        let transport = default_transport(&config)?;
        Ok(Self::with_transport(config, transport))
    }

    pub fn with_transport(config: StreamConfig, transport: Arc<dyn HttpTransport>) -> Self {
        Self { config, transport }
    }

    /// Does this URL look like an internet radio stream?
    ///
    /// Cheap string checks first (scheme, extension, well-known keywords);
    /// only URLs those cannot classify get a HEAD probe. A probe that fails
    /// or times out answers no rather than erroring.
    pub fn is_stream_url(&self, url: &str) -> bool {
        let lower = url.to_ascii_lowercase();
        if !lower.starts_with("http://") && !lower.starts_with("https://") {
            return false;
        }

        if let Some(ext) = url_extension(&lower) {
            if STREAM_EXTENSIONS.contains(&ext) {
                return true;
            }
        }
        if STREAM_KEYWORDS.iter().any(|kw| lower.contains(kw)) {
            return true;
        }

        self.probe(url)
    }

    /// HEAD the URL and look for stream markers: a known audio content type,
    /// or any ICY station header.
    fn probe(&self, url: &str) -> bool {
        let response = match self.transport.head(url, ICY_REQUEST_HEADERS) {
            Ok(r) => r,
            Err(e) => {
                debug!(url, error = %e, "stream probe failed");
                return false;
            }
        };
        if !response.is_success() {
            return false;
        }

        let headers = IcyHeaders::from_response(&response);
        if let Some(content_type) = &headers.content_type {
            let bare = content_type
                .split(';')
                .next()
                .unwrap_or(content_type)
                .trim()
                .to_ascii_lowercase();
            if STREAM_CONTENT_TYPES.contains(&bare.as_str()) {
                return true;
            }
        }
        headers.station_name.is_some() || headers.genre.is_some()
    }

    /// Build the track descriptor without opening the stream for playback.
    pub fn load_track(&self, url: &str) -> Result<TrackInfo> {
        let response = self.transport.head(url, ICY_REQUEST_HEADERS)?;
        if !response.is_success() {
            return Err(IcyError::BadStatus(response.status));
        }

        let headers = IcyHeaders::from_response(&response);
        Ok(TrackInfo {
            title: headers
                .station_name
                .unwrap_or_else(|| "Radio Stream".to_string()),
            author: headers.genre.unwrap_or_else(|| "Unknown".to_string()),
            duration: None,
            identifier: url.to_string(),
            is_stream: true,
            bitrate: headers.bitrate,
        })
    }

    /// Open the URL as a supervised stream.
    pub fn open(&self, url: &str) -> Result<IcyStream> {
        IcyStream::open_with_transport(url, self.config.clone(), self.transport.clone())
    }
}

/// Extension of the last path segment, ignoring query and fragment.
fn url_extension(url: &str) -> Option<&str> {
    let path = url.split(['?', '#']).next().unwrap_or(url);
    let segment = path.rsplit('/').next().unwrap_or(path);
    let (stem, ext) = segment.rsplit_once('.')?;
    if stem.is_empty() || ext.is_empty() {
        return None;
    }
    Some(ext)
}
