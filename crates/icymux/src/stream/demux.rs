//! In-band metadata demultiplexer
//!
//! Presents a logically contiguous audio byte stream while silently stripping
//! the interleaved ICY metadata frames. The transport payload is a sequence of
//! `(audio[meta_int bytes], [len][len*16 bytes of text])` pairs; a length byte
//! of 0 is an empty frame.

use std::io::{self, Read};
use std::sync::{Arc, Mutex};

use crossbeam_channel::Sender;
use tracing::{debug, info};

use crate::config::protocol::{MAX_METADATA_LEN, METADATA_LENGTH_UNIT};
use crate::error::IcyError;
use crate::stream::metadata::{decode_metadata_block, parse_metadata, NowPlaying};

/// Registered now-playing listeners, shared between the supervisor and the
/// current session's demuxer so subscriptions survive reconnects.
pub type ListenerSet = Arc<Mutex<Vec<Sender<NowPlaying>>>>;

/// Build a listener set from any collection of senders.
pub fn listener_set<I>(senders: I) -> ListenerSet
where
    I: IntoIterator<Item = Sender<NowPlaying>>,
{
    Arc::new(Mutex::new(senders.into_iter().collect()))
}

/// Read adapter that strips metadata frames every `meta_int` audio bytes.
///
/// Byte accounting depends only on byte counts, never on what the metadata
/// text contains. Metadata decode faults are logged and swallowed; framing
/// faults (truncated frame) propagate as I/O errors and end the session.
pub struct MetadataDemuxer<R> {
    inner: R,
    meta_int: usize,
    /// Audio bytes remaining before the next metadata frame, in [0, meta_int]
    countdown: usize,
    /// Last title emitted; identical consecutive titles notify only once
    last_title: Option<String>,
    listeners: ListenerSet,
}

impl<R: Read> MetadataDemuxer<R> {
    pub fn new(inner: R, meta_int: usize, listeners: ListenerSet) -> Self {
        debug_assert!(meta_int > 0);
        Self {
            inner,
            meta_int,
            countdown: meta_int,
            last_title: None,
            listeners,
        }
    }

    pub fn meta_int(&self) -> usize {
        self.meta_int
    }

    /// Consume one `[len][len*16]` metadata frame from the raw stream.
    fn consume_metadata_frame(&mut self) -> io::Result<()> {
        let mut len_byte = [0u8; 1];
        self.inner.read_exact(&mut len_byte).map_err(truncated)?;

        let len = len_byte[0] as usize * METADATA_LENGTH_UNIT;
        if len == 0 {
            return Ok(());
        }

        // The length byte is a u8, so `len` never exceeds MAX_METADATA_LEN;
        // reading into a fixed buffer keeps the declared size away from any
        // allocation.
        let mut frame = [0u8; MAX_METADATA_LEN];
        self.inner.read_exact(&mut frame[..len]).map_err(truncated)?;

        self.handle_frame(&frame[..len]);
        Ok(())
    }

    /// Decode and parse one frame body, notifying listeners on title change.
    /// Never fails: metadata faults must not interrupt audio delivery.
    fn handle_frame(&mut self, raw: &[u8]) {
        let text = decode_metadata_block(raw);
        if text.is_empty() {
            return;
        }

        let Some(frame) = parse_metadata(&text) else {
            debug!(%text, "metadata frame carried no recognized fields");
            return;
        };

        let Some(title) = frame.title else {
            return;
        };
        if self.last_title.as_deref() == Some(title.as_str()) {
            return;
        }

        info!(%title, "now playing");
        self.last_title = Some(title.clone());

        let event = NowPlaying {
            title,
            url: frame.url,
        };
        // Unbounded channel sends never block byte delivery; drop listeners
        // that have gone away.
        if let Ok(mut listeners) = self.listeners.lock() {
            listeners.retain(|tx| tx.send(event.clone()).is_ok());
        }
    }
}

fn truncated(e: io::Error) -> io::Error {
    if e.kind() == io::ErrorKind::UnexpectedEof {
        io::Error::new(io::ErrorKind::UnexpectedEof, IcyError::TruncatedStream)
    } else {
        e
    }
}

impl<R: Read> Read for MetadataDemuxer<R> {
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        if buf.is_empty() {
            return Ok(0);
        }

        if self.countdown == 0 {
            self.consume_metadata_frame()?;
            self.countdown = self.meta_int;
        }

        let want = buf.len().min(self.countdown);
        let n = self.inner.read(&mut buf[..want])?;
        self.countdown -= n;
        Ok(n)
    }
}

/// One byte-reading capability, with or without the metadata-stripping
/// decorator. Selected once at connect time.
pub enum StreamBody<R> {
    /// Transport bytes returned untouched (no metadata, or metadata disabled)
    PassThrough(R),
    /// Metadata frames stripped every `meta_int` bytes
    Demuxed(MetadataDemuxer<R>),
}

impl<R: Read> Read for StreamBody<R> {
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        match self {
            StreamBody::PassThrough(inner) => inner.read(buf),
            StreamBody::Demuxed(demuxer) => demuxer.read(buf),
        }
    }
}
