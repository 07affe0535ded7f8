//! Internet radio stream handling
//!
//! Connects to ICY (Icecast/Shoutcast) streams, strips in-band metadata,
//! and keeps the byte stream alive across network drops.

pub mod connect;
pub mod demux;
pub mod metadata;
pub mod source;
pub mod supervisor;

pub use connect::{IcyHeaders, StreamConnector, StreamSession};
pub use demux::{listener_set, ListenerSet, MetadataDemuxer, StreamBody};
pub use metadata::{parse_metadata, sanitize_header_value, MetadataFrame, NowPlaying};
pub use source::{IcySource, TrackInfo};
pub use supervisor::{IcyStream, StreamState};

use std::sync::atomic::{AtomicBool, Ordering};
use std::thread;
use std::time::{Duration, Instant};

/// Sleep out the retry delay, waking early if the stop flag is raised.
/// Returns false when interrupted.
pub(crate) fn retry_sleep(total: Duration, stop_flag: &AtomicBool) -> bool {
    // Check the flag every 250ms so close() does not hang behind a long delay
    let check_interval = Duration::from_millis(250);
    let deadline = Instant::now() + total;

    loop {
        if stop_flag.load(Ordering::Relaxed) {
            return false;
        }
        let remaining = deadline.saturating_duration_since(Instant::now());
        if remaining.is_zero() {
            return true;
        }
        thread::sleep(remaining.min(check_interval));
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::AtomicBool;

    #[test]
    fn retry_sleep_completes_when_not_stopped() {
        let stop = AtomicBool::new(false);
        let started = Instant::now();
        assert!(retry_sleep(Duration::from_millis(30), &stop));
        assert!(started.elapsed() >= Duration::from_millis(30));
    }

    #[test]
    fn retry_sleep_returns_false_when_already_stopped() {
        let stop = AtomicBool::new(true);
        let started = Instant::now();
        assert!(!retry_sleep(Duration::from_secs(60), &stop));
        assert!(started.elapsed() < Duration::from_secs(1));
    }

    #[test]
    fn retry_sleep_zero_duration_completes() {
        let stop = AtomicBool::new(false);
        assert!(retry_sleep(Duration::ZERO, &stop));
    }
}
