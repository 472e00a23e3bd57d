use actix_web::web::Bytes;
use chrono::{DateTime, Utc};
use rand::distributions::Alphanumeric;
use rand::Rng;
use std::collections::HashMap;
use std::convert::Infallible;
use std::pin::Pin;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, PoisonError, RwLock};
use std::task::{Context, Poll};
use std::time::Duration;
use tokio::sync::mpsc;
use tokio::time::{Instant, Interval, MissedTickBehavior};
use tokio_stream::Stream;

/// SSE comment line; ignored by clients, keeps the connection observable.
const KEEP_ALIVE_FRAME: &[u8] = b": keep-alive\n\n";

/// Length of the random part of a session token
const TOKEN_RANDOM_LEN: usize = 16;

/// The push channel's write side has gone away.
#[derive(Debug, thiserror::Error)]
#[error("push channel for session {0} is closed")]
pub struct ChannelClosed(pub String);

/// An open push channel and the token that names it.
#[derive(Debug)]
pub struct Session {
    token: String,
    sender: mpsc::UnboundedSender<Bytes>,
    next_message_id: AtomicU64,
    opened_at: DateTime<Utc>,
}

impl Session {
    pub fn token(&self) -> &str {
        &self.token
    }

    pub fn opened_at(&self) -> DateTime<Utc> {
        self.opened_at
    }

    /// Allocate the next message id for this session: 1, 2, 3, ...
    pub fn next_message_id(&self) -> String {
        (self.next_message_id.fetch_add(1, Ordering::Relaxed) + 1).to_string()
    }

    /// Queue a frame for delivery. Frames leave in the order they were
    /// queued; the queue has a single consumer, the channel stream.
    pub fn send(&self, frame: Bytes) -> Result<(), ChannelClosed> {
        self.sender
            .send(frame)
            .map_err(|_| ChannelClosed(self.token.clone()))
    }
}

/// Live sessions keyed by token.
#[derive(Debug, Default)]
pub struct SessionRegistry {
    sessions: RwLock<HashMap<String, Arc<Session>>>,
}

impl SessionRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Allocate a fresh session. The receiver is the read side of the
    /// session's frame queue.
    pub fn open(&self) -> (Arc<Session>, mpsc::UnboundedReceiver<Bytes>) {
        let (sender, receiver) = mpsc::unbounded_channel();
        let mut sessions = self.sessions.write().unwrap_or_else(PoisonError::into_inner);

        let mut token = generate_token();
        while sessions.contains_key(&token) {
            token = generate_token();
        }

        let session = Arc::new(Session {
            token: token.clone(),
            sender,
            next_message_id: AtomicU64::new(0),
            opened_at: Utc::now(),
        });
        sessions.insert(token, session.clone());

        tracing::info!(
            client_id = %session.token,
            sessions = sessions.len(),
            "Session opened"
        );
        (session, receiver)
    }

    pub fn get(&self, token: &str) -> Option<Arc<Session>> {
        self.sessions
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .get(token)
            .cloned()
    }

    /// Remove a session. Idempotent: returns `false` when the token was not
    /// live, which happens when a disconnect races a failed push.
    pub fn close(&self, token: &str) -> bool {
        let mut sessions = self.sessions.write().unwrap_or_else(PoisonError::into_inner);
        let removed = sessions.remove(token).is_some();
        if removed {
            tracing::info!(client_id = %token, sessions = sessions.len(), "Session closed");
        } else {
            tracing::debug!(client_id = %token, "Session already closed");
        }
        removed
    }

    pub fn len(&self) -> usize {
        self.sessions
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

// Millisecond timestamp prefix plus a random alphanumeric suffix.
fn generate_token() -> String {
    let suffix: String = rand::thread_rng()
        .sample_iter(&Alphanumeric)
        .take(TOKEN_RANDOM_LEN)
        .map(char::from)
        .collect();
    format!("{}-{}", Utc::now().timestamp_millis(), suffix)
}

/// Body of the push channel response.
///
/// Yields queued frames in order, interleaved with keep-alive comments while
/// idle. Dropping the stream (client disconnect, transport error, server
/// shutdown) closes the session; this is the single teardown path.
pub struct ChannelStream {
    token: String,
    frames: mpsc::UnboundedReceiver<Bytes>,
    keep_alive: Option<Interval>,
    sessions: Arc<SessionRegistry>,
}

impl ChannelStream {
    /// Must be called from within a Tokio runtime when `keep_alive` is set.
    pub fn new(
        token: String,
        frames: mpsc::UnboundedReceiver<Bytes>,
        keep_alive: Option<Duration>,
        sessions: Arc<SessionRegistry>,
    ) -> Self {
        let keep_alive = keep_alive.map(|period| {
            let mut interval = tokio::time::interval_at(Instant::now() + period, period);
            interval.set_missed_tick_behavior(MissedTickBehavior::Delay);
            interval
        });

        Self {
            token,
            frames,
            keep_alive,
            sessions,
        }
    }

    pub fn token(&self) -> &str {
        &self.token
    }
}

impl Stream for ChannelStream {
    type Item = Result<Bytes, Infallible>;

    fn poll_next(self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Option<Self::Item>> {
        let this = self.get_mut();

        match this.frames.poll_recv(cx) {
            Poll::Ready(Some(frame)) => return Poll::Ready(Some(Ok(frame))),
            Poll::Ready(None) => return Poll::Ready(None),
            Poll::Pending => {}
        }

        if let Some(keep_alive) = this.keep_alive.as_mut() {
            if keep_alive.poll_tick(cx).is_ready() {
                return Poll::Ready(Some(Ok(Bytes::from_static(KEEP_ALIVE_FRAME))));
            }
        }

        Poll::Pending
    }
}

impl Drop for ChannelStream {
    fn drop(&mut self) {
        tracing::debug!(client_id = %self.token, "Push channel dropped");
        self.sessions.close(&self.token);
    }
}
