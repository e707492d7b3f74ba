//! `WebSocket` glue: turns an upgraded socket into a running [`StreamSession`].

use std::fmt::Display;
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Instant;

use axum::extract::ws::{Message, WebSocket};
use futures::{FutureExt, SinkExt, Stream, StreamExt, future};
use metrics::{counter, histogram};
use rand::SeedableRng;
use rand::rngs::StdRng;
use tokio_util::sync::CancellationToken;
use tracing::{info, instrument, trace};

use super::cadence::Ticker;
use super::stream::StreamSession;
use super::tracker::SessionTracker;
use crate::config::StreamConfig;
use crate::metrics::{WS_CONNECTION_DURATION_SECONDS, WS_CONNECTIONS_TOTAL, WS_DISCONNECTIONS_TOTAL};

/// Run a stream session for a freshly upgraded connection.
///
/// The session owns both halves of the socket. Incoming frames are read only
/// to notice the peer leaving; their contents are discarded.
#[instrument(skip_all, fields(peer = %peer))]
pub async fn run_ws_session(
    ws: WebSocket,
    peer: SocketAddr,
    config: Arc<StreamConfig>,
    tracker: Arc<SessionTracker>,
    cancel: CancellationToken,
) {
    let _guard = tracker.enter();
    let started = Instant::now();
    info!("client connected");
    counter!(WS_CONNECTIONS_TOTAL).increment(1);

    let (ws_tx, ws_rx) = ws.split();
    let sink = ws_tx.with(|text: String| future::ready(Ok::<_, axum::Error>(Message::Text(text.into()))));

    let session = StreamSession::new(sink, StdRng::from_os_rng(), config.prefix.clone(), peer.to_string());
    let ticker = Ticker::new(config.cadence, config.tick_interval);
    let closed = wait_for_close(ws_rx).map(|end| trace!(?end, "read side ended"));
    let report = session.run(ticker, closed, cancel).await;

    counter!(WS_DISCONNECTIONS_TOTAL, "reason" => report.reason.as_str()).increment(1);
    histogram!(WS_CONNECTION_DURATION_SECONDS).record(started.elapsed().as_secs_f64());
}

/// How the read side of a connection ended.
#[derive(Debug, PartialEq, Eq)]
enum ReadEnd {
    /// The peer sent a close frame.
    CloseFrame,
    /// The transport reported an error.
    Error,
    /// The stream ended without a close frame.
    Eof,
}

/// Resolves once the peer sends a close frame, errors, or the stream ends.
async fn wait_for_close<S, E>(mut ws_rx: S) -> ReadEnd
where
    S: Stream<Item = Result<Message, E>> + Unpin,
    E: Display,
{
    while let Some(frame) = ws_rx.next().await {
        match frame {
            Ok(Message::Close(frame)) => {
                trace!(?frame, "close frame received");
                return ReadEnd::CloseFrame;
            }
            // Ping replies are queued by the transport; everything else is ignored.
            Ok(other) => trace!(len = other.into_data().len(), "discarding inbound frame"),
            Err(e) => {
                info!(error = %e, "connection read failed");
                return ReadEnd::Error;
            }
        }
    }
    ReadEnd::Eof
}
