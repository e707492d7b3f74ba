//! The per-connection streaming loop.
//!
//! A [`StreamSession`] owns the write half of one connection, its tick counter
//! and its random source. Nothing in it is shared with other sessions, so a
//! stalled or failed session cannot affect its neighbours.
//!
//! Lifecycle: `Connected` (status message) → `Streaming` (tick loop) →
//! `Closed` (peer went away, a write failed, or the process is shutting down).

use std::fmt::Display;
use std::future::Future;
use std::time::Duration;

use datalake_core::{TickSampler, Variable, connected_status, now_millis};
use futures::{Sink, SinkExt};
use metrics::counter;
use rand::Rng;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info};

use super::cadence::Ticker;
use crate::metrics::{STREAM_MESSAGES_TOTAL, STREAM_TICKS_TOTAL};

/// Ticks between two progress log lines.
const PROGRESS_EVERY: u64 = 10;

/// Upper bound on flushing the close handshake once a session ends.
const CLOSE_TIMEOUT: Duration = Duration::from_secs(1);

/// Where a session is in its forward-only lifecycle.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SessionState {
    /// Accepted; status message not yet sent.
    Connected,
    /// Status sent; emitting variables every tick.
    Streaming,
    /// Stopped; the connection is released.
    Closed,
}

/// Why a session stopped.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum CloseReason {
    /// The peer closed the connection or the read side ended.
    PeerClosed,
    /// Writing a message failed.
    WriteFailed(String),
    /// The server is shutting down.
    Shutdown,
}

impl CloseReason {
    /// Short label for logs and metrics.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::PeerClosed => "peer_closed",
            Self::WriteFailed(_) => "write_failed",
            Self::Shutdown => "shutdown",
        }
    }
}

/// Summary returned when a session ends.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SessionReport {
    /// Why it ended.
    pub reason: CloseReason,
    /// Ticks fully or partially sent.
    pub ticks: u64,
}

/// One client's stream.
pub struct StreamSession<S, R> {
    sink: S,
    sampler: TickSampler<R>,
    prefix: String,
    peer: String,
    tick: u64,
    state: SessionState,
}

impl<S, R> StreamSession<S, R>
where
    S: Sink<String> + Unpin,
    S::Error: Display,
    R: Rng,
{
    /// Create a session writing to `sink`.
    pub fn new(sink: S, rng: R, prefix: impl Into<String>, peer: impl Into<String>) -> Self {
        Self {
            sink,
            sampler: TickSampler::new(rng),
            prefix: prefix.into(),
            peer: peer.into(),
            tick: 0,
            state: SessionState::Connected,
        }
    }

    /// Current tick counter (0 before the first cycle).
    pub fn tick(&self) -> u64 {
        self.tick
    }

    /// Current lifecycle state.
    pub fn state(&self) -> SessionState {
        self.state
    }

    async fn send(&mut self, variable: Variable) -> Result<(), CloseReason> {
        let message = variable.with_prefix(&self.prefix).encode();
        self.sink
            .send(message)
            .await
            .map_err(|e| CloseReason::WriteFailed(e.to_string()))
    }

    /// Send the connection status message and enter `Streaming`.
    pub async fn announce(&mut self) -> Result<(), CloseReason> {
        self.send(connected_status()).await?;
        self.state = SessionState::Streaming;
        Ok(())
    }

    /// Run one cycle: bump the counter and send the full variable set.
    pub async fn step(&mut self) -> Result<(), CloseReason> {
        self.tick += 1;
        let tick = self.tick;
        for variable in self.sampler.sample(tick, now_millis()) {
            self.send(variable).await?;
            counter!(STREAM_MESSAGES_TOTAL).increment(1);
        }
        counter!(STREAM_TICKS_TOTAL).increment(1);
        if tick % PROGRESS_EVERY == 0 {
            debug!(peer = %self.peer, tick, "sent variable set");
        }
        Ok(())
    }

    /// Drive the session until the peer leaves, a write fails, or `cancel`
    /// fires. `closed` resolves when the read side of the connection ends.
    pub async fn run<C>(
        mut self,
        mut ticker: Ticker,
        closed: C,
        cancel: CancellationToken,
    ) -> SessionReport
    where
        C: Future<Output = ()>,
    {
        let mut closed = std::pin::pin!(closed);
        let reason = loop {
            let outcome = if self.state == SessionState::Connected {
                tokio::select! {
                    biased;
                    () = cancel.cancelled() => Err(CloseReason::Shutdown),
                    () = &mut closed => Err(CloseReason::PeerClosed),
                    res = self.announce() => res,
                }
            } else {
                tokio::select! {
                    biased;
                    () = cancel.cancelled() => Err(CloseReason::Shutdown),
                    () = &mut closed => Err(CloseReason::PeerClosed),
                    res = async {
                        self.step().await?;
                        ticker.wait().await;
                        Ok::<(), CloseReason>(())
                    } => res,
                }
            };
            if let Err(reason) = outcome {
                break reason;
            }
        };
        self.close(&reason).await;
        SessionReport {
            reason,
            ticks: self.tick,
        }
    }

    async fn close(&mut self, reason: &CloseReason) {
        self.state = SessionState::Closed;
        if !matches!(reason, CloseReason::WriteFailed(_)) {
            let _ = tokio::time::timeout(CLOSE_TIMEOUT, self.sink.close()).await;
        }
        info!(peer = %self.peer, reason = reason.as_str(), ticks = self.tick, "session closed");
    }
}
