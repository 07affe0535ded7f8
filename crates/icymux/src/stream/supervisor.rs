//! Reconnecting stream supervisor
//!
//! Wraps a `StreamSession` in a `Read` implementation that survives network
//! drops: when a read fails or the server closes a live stream, the supervisor
//! waits a fixed delay and reopens the connection, up to a bounded number of
//! attempts. Successive successful reconnects reset the attempt counter, so
//! the bound applies per outage rather than per track lifetime.

use std::io::{self, Read};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;

use crossbeam_channel::{unbounded, Receiver};
use tracing::warn;

use crate::config::StreamConfig;
use crate::error::{IcyError, Result};
use crate::net::{default_transport, HttpTransport};
use crate::stream::connect::{IcyHeaders, StreamConnector, StreamSession};
use crate::stream::demux::{listener_set, ListenerSet};
use crate::stream::metadata::NowPlaying;
use crate::stream::retry_sleep;

/// Where the supervised stream currently stands
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StreamState {
    /// A session is live and serving bytes
    Connected,
    /// Between sessions, about to run the given attempt (1-based)
    Reconnecting(u32),
    /// Gave up: retries exhausted, or a drop with reconnects disabled
    Failed,
    /// Closed by the caller, no further reads possible
    Disabled,
}

type SleepFn = Box<dyn FnMut(Duration) -> bool + Send>;

/// A supervised ICY stream: a `Read` over the audio bytes that reconnects
/// transparently, plus now-playing subscriptions that outlive any single
/// session.
pub struct IcyStream {
    url: String,
    config: StreamConfig,
    connector: StreamConnector,
    session: Option<StreamSession>,
    /// Shared with every session's demuxer so subscribers keep receiving
    /// events after a reconnect swaps the session out
    listeners: ListenerSet,
    /// Consecutive failed attempts in the current outage
    attempts: u32,
    state: StreamState,
    stop_flag: Arc<AtomicBool>,
    sleep: SleepFn,
}

impl IcyStream {
    /// Open a stream with the default HTTP transport. The initial connect
    /// failure propagates directly, without retries.
    pub fn open(url: &str, config: StreamConfig) -> Result<Self> {
        let transport = default_transport(&config)?;
        Self::open_with_transport(url, config, transport)
    }

    pub fn open_with_transport(
        url: &str,
        config: StreamConfig,
        transport: Arc<dyn HttpTransport>,
    ) -> Result<Self> {
        let connector = StreamConnector::new(transport, config.clone());
        let listeners = listener_set([]);
        let session = connector.connect(url, &listeners)?;

        let stop_flag = Arc::new(AtomicBool::new(false));
        let sleep: SleepFn = {
            let stop_flag = stop_flag.clone();
            Box::new(move |delay| retry_sleep(delay, &stop_flag))
        };

        Ok(Self {
            url: url.to_string(),
            config,
            connector,
            session: Some(session),
            listeners,
            attempts: 0,
            state: StreamState::Connected,
            stop_flag,
            sleep,
        })
    }

    /// Register a now-playing listener. Events flow for the lifetime of the
    /// stream, across reconnects; after a reconnect the current title is
    /// re-announced because the new session starts with no title history.
    pub fn subscribe(&self) -> Receiver<NowPlaying> {
        let (tx, rx) = unbounded();
        if let Ok(mut listeners) = self.listeners.lock() {
            listeners.push(tx);
        }
        rx
    }

    /// ICY headers of the current session, absent once the stream is down.
    pub fn headers(&self) -> Option<&IcyHeaders> {
        self.session.as_ref().map(|s| &s.headers)
    }

    pub fn url(&self) -> &str {
        &self.url
    }

    pub fn state(&self) -> StreamState {
        self.state
    }

    /// Tear the stream down. Raises the stop flag so an in-progress retry
    /// delay wakes up; subsequent reads fail with `NotConnected`.
    pub fn close(&mut self) {
        self.stop_flag.store(true, Ordering::Relaxed);
        self.session = None;
        self.state = StreamState::Disabled;
    }

    /// Replace the dead session, waiting `retry_delay` before each attempt.
    /// The attempt counter carries across calls and resets only on success.
    fn reconnect(&mut self) -> io::Result<()> {
        self.session = None;

        loop {
            if self.attempts >= self.config.max_retries {
                self.state = StreamState::Failed;
                return Err(io::Error::other(IcyError::ReconnectExhausted {
                    attempts: self.attempts,
                }));
            }

            self.attempts += 1;
            self.state = StreamState::Reconnecting(self.attempts);
            warn!(
                url = %self.url,
                attempt = self.attempts,
                max = self.config.max_retries,
                "stream dropped, reconnecting"
            );

            if !(self.sleep)(self.config.retry_delay) {
                self.state = StreamState::Disabled;
                return Err(io::Error::new(
                    io::ErrorKind::Interrupted,
                    "stream closed during reconnect",
                ));
            }

            match self.connector.connect(&self.url, &self.listeners) {
                Ok(session) => {
                    self.session = Some(session);
                    self.attempts = 0;
                    self.state = StreamState::Connected;
                    return Ok(());
                }
                Err(e) => warn!(attempt = self.attempts, error = %e, "reconnect failed"),
            }
        }
    }

    #[cfg(test)]
    fn set_sleep_fn(&mut self, sleep: SleepFn) {
        self.sleep = sleep;
    }
}

impl Read for IcyStream {
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        if buf.is_empty() {
            return Ok(0);
        }

        loop {
            let Some(session) = self.session.as_mut() else {
                return Err(io::Error::new(
                    io::ErrorKind::NotConnected,
                    "stream is closed",
                ));
            };

            match session.read(buf) {
                // Live streams never end; EOF means the server dropped us
                Ok(0) => {
                    if !self.config.auto_reconnect {
                        self.session = None;
                        self.state = StreamState::Failed;
                        return Ok(0);
                    }
                    self.reconnect()?;
                }
                Ok(n) => return Ok(n),
                Err(e) => {
                    if !self.config.auto_reconnect {
                        self.session = None;
                        self.state = StreamState::Failed;
                        return Err(e);
                    }
                    warn!(error = %e, "stream read failed");
                    self.reconnect()?;
                }
            }
        }
    }
}

impl Drop for IcyStream {
    fn drop(&mut self) {
        self.stop_flag.store(true, Ordering::Relaxed);
    }
}
