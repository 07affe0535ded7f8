//! Icymux — ICY internet radio stream client
//!
//! Connects to Icecast/Shoutcast streams, demultiplexes the in-band ICY
//! metadata into now-playing events, and keeps the audio byte stream alive
//! across network drops.
//!
//! ## Quick start
//!
//! ```no_run
//! use std::io::Read;
//! use icymux::{IcySource, StreamConfig};
//!
//! let source = IcySource::new(StreamConfig::default())?;
//! let mut stream = source.open("http://radio.example/stream.mp3")?;
//! let titles = stream.subscribe();
//!
//! let mut buf = [0u8; 8192];
//! let _n = stream.read(&mut buf)?;
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```

pub mod config;
pub mod error;
pub mod net;
pub mod stream;

pub use config::StreamConfig;
pub use error::{IcyError, Result};
pub use stream::{IcySource, IcyStream, NowPlaying, StreamState, TrackInfo};
