//! ICY stream connector
//!
//! Opens an HTTP connection, negotiates ICY headers, and wraps the response
//! body in the right demultiplexer mode for one `StreamSession`.

use std::io::{self, Read};
use std::sync::Arc;

use tracing::info;

use crate::config::StreamConfig;
use crate::error::{IcyError, Result};
use crate::net::{HttpResponse, HttpTransport};
use crate::stream::demux::{ListenerSet, MetadataDemuxer, StreamBody};
use crate::stream::metadata::sanitize_header_value;

/// Request headers sent on every stream connect. `Accept-Encoding: identity`
/// is mandatory: compression would invalidate the fixed-interval byte
/// framing. The user agent is set by the transport.
pub(crate) const ICY_REQUEST_HEADERS: &[(&str, &str)] = &[
    ("Icy-MetaData", "1"),
    ("Accept", "*/*"),
    ("Accept-Encoding", "identity"),
    ("Connection", "close"),
];

/// Headers parsed (and sanitized) from an ICY stream response
#[derive(Debug, Clone)]
pub struct IcyHeaders {
    /// Byte interval between metadata frames, 0 = metadata disabled
    pub meta_int: usize,
    pub station_name: Option<String>,
    pub genre: Option<String>,
    /// `icy-br` as sanitized display text, never parsed further
    pub bitrate: Option<String>,
    pub content_type: Option<String>,
}

impl IcyHeaders {
    pub fn from_response(response: &HttpResponse) -> Self {
        Self {
            meta_int: parse_meta_int(response.header("icy-metaint")),
            station_name: response.header("icy-name").and_then(sanitize_header_value),
            genre: response.header("icy-genre").and_then(sanitize_header_value),
            bitrate: response.header("icy-br").and_then(sanitize_header_value),
            content_type: response
                .header("content-type")
                .and_then(sanitize_header_value),
        }
    }
}

/// Parse `icy-metaint` as a non-negative integer. Missing, empty, non-numeric,
/// or negative values disable metadata rather than failing the connect.
fn parse_meta_int(raw: Option<&str>) -> usize {
    let Some(text) = raw.and_then(sanitize_header_value) else {
        return 0;
    };
    match text.parse::<i64>() {
        Ok(v) if v >= 0 => v as usize,
        _ => 0,
    }
}

/// One live connection attempt. Replaced wholesale on reconnect, never
/// mutated; destroyed when the caller closes the track.
pub struct StreamSession {
    pub url: String,
    pub headers: IcyHeaders,
    body: StreamBody<Box<dyn Read + Send>>,
}

impl StreamSession {
    pub fn meta_int(&self) -> usize {
        self.headers.meta_int
    }
}

impl Read for StreamSession {
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        self.body.read(buf)
    }
}

/// Opens ICY stream sessions over an `HttpTransport`.
pub struct StreamConnector {
    transport: Arc<dyn HttpTransport>,
    config: StreamConfig,
}

impl StreamConnector {
    pub fn new(transport: Arc<dyn HttpTransport>, config: StreamConfig) -> Self {
        Self { transport, config }
    }

    /// Connect to `url` and build a session in the right demultiplexer mode.
    ///
    /// Fails with `Network` (unreachable), `BadStatus`, or `MissingBody`;
    /// a missing or malformed `icy-metaint` header is not a failure.
    pub fn connect(&self, url: &str, listeners: &ListenerSet) -> Result<StreamSession> {
        let response = self.transport.get(url, ICY_REQUEST_HEADERS)?;

        if !response.is_success() {
            return Err(IcyError::BadStatus(response.status));
        }

        let headers = IcyHeaders::from_response(&response);
        info!(
            url,
            name = headers.station_name.as_deref().unwrap_or("Unknown"),
            genre = headers.genre.as_deref().unwrap_or("Unknown"),
            bitrate = headers.bitrate.as_deref().unwrap_or("Unknown"),
            meta_int = headers.meta_int,
            "connected to stream"
        );

        let raw = response.body.ok_or(IcyError::MissingBody)?;

        let body = if headers.meta_int > 0 && self.config.enable_metadata {
            StreamBody::Demuxed(MetadataDemuxer::new(raw, headers.meta_int, listeners.clone()))
        } else {
            StreamBody::PassThrough(raw)
        };

        Ok(StreamSession {
            url: url.to_string(),
            headers,
            body,
        })
    }
}
