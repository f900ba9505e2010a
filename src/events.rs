//! Structured events emitted by the session manager and the gateway.
//!
//! Components never log directly; they hand [`Event`]s to an injected
//! [`EventSink`]. The default sink forwards to `tracing`, and
//! [`ChannelSink`] lets callers (and tests) observe the stream.

use serde::{Deserialize, Serialize};
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::{SystemTime, UNIX_EPOCH};
use tokio::sync::mpsc;

use crate::auth::SessionState;

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum SessionEvent {
    StoredTokensFound {
        expires_at: i64,
        has_refresh_token: bool,
    },
    NoStoredTokens,
    StoredTokensDiscarded {
        reason: String,
    },
    TokenExpired {
        has_refresh_token: bool,
    },
    LoginUrlBuilt,
    CodeExchangeStarted {
        code_prefix: String,
    },
    DuplicateCallbackIgnored {
        code_prefix: String,
    },
    RefreshStarted,
    RefreshTokenRotated,
    TokensStored {
        expires_at: i64,
    },
    ProfileLoaded {
        email: String,
    },
    SessionCleared,
    StateChanged {
        from: SessionState,
        to: SessionState,
    },
    Failed {
        message: String,
    },
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum GatewayEvent {
    PrimaryAttempt { model: String },
    PrimarySucceeded,
    PrimaryFailed { message: String },
    FallbackAttempt { model: String },
    FallbackSucceeded,
    FallbackFailed { message: String },
    FallbackSkipped { reason: String },
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(tag = "source", content = "event", rename_all = "snake_case")]
pub enum Event {
    Session(SessionEvent),
    Gateway(GatewayEvent),
}

impl From<SessionEvent> for Event {
    fn from(value: SessionEvent) -> Self {
        Self::Session(value)
    }
}

impl From<GatewayEvent> for Event {
    fn from(value: GatewayEvent) -> Self {
        Self::Gateway(value)
    }
}

/// Sequenced event with capture time.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct EventEnvelope {
    pub seq: u64,
    pub ts_unix_ms: u64,
    pub event: Event,
}

impl EventEnvelope {
    pub fn new(seq: u64, event: Event) -> Self {
        Self {
            seq,
            ts_unix_ms: now_unix_millis(),
            event,
        }
    }
}

/// Destination for structured events.
pub trait EventSink: Send + Sync {
    fn emit(&self, event: Event);
}

/// Forwards events to `tracing` at a level matching their severity.
#[derive(Debug, Default, Clone, Copy)]
pub struct TracingSink;

impl EventSink for TracingSink {
    fn emit(&self, event: Event) {
        match &event {
            Event::Session(SessionEvent::Failed { message }) => {
                tracing::warn!(target: "alchemailyst::session", %message, "session failure");
            }
            Event::Session(SessionEvent::StoredTokensDiscarded { reason }) => {
                tracing::warn!(target: "alchemailyst::session", %reason, "stored tokens discarded");
            }
            Event::Session(SessionEvent::StateChanged { from, to }) => {
                tracing::debug!(target: "alchemailyst::session", %from, %to, "state changed");
            }
            Event::Session(other) => {
                tracing::info!(target: "alchemailyst::session", event = ?other);
            }
            Event::Gateway(GatewayEvent::PrimaryFailed { message }) => {
                tracing::warn!(target: "alchemailyst::gateway", %message, "primary provider failed, falling back");
            }
            Event::Gateway(GatewayEvent::FallbackFailed { message }) => {
                tracing::error!(target: "alchemailyst::gateway", %message, "fallback provider failed");
            }
            Event::Gateway(other) => {
                tracing::debug!(target: "alchemailyst::gateway", event = ?other);
            }
        }
    }
}

/// Sends enveloped events over an unbounded channel. Events emitted after
/// the receiver is dropped are discarded.
#[derive(Debug)]
pub struct ChannelSink {
    tx: mpsc::UnboundedSender<EventEnvelope>,
    seq: AtomicU64,
}

impl ChannelSink {
    pub fn new() -> (Self, mpsc::UnboundedReceiver<EventEnvelope>) {
        let (tx, rx) = mpsc::unbounded_channel();
        (
            Self {
                tx,
                seq: AtomicU64::new(0),
            },
            rx,
        )
    }
}

impl EventSink for ChannelSink {
    fn emit(&self, event: Event) {
        let seq = self.seq.fetch_add(1, Ordering::Relaxed);
        let _ = self.tx.send(EventEnvelope::new(seq, event));
    }
}

/// First few characters of a secret, for logs.
pub(crate) fn redact(value: &str) -> String {
    let prefix: String = value.chars().take(6).collect();
    if prefix.len() < value.len() {
        format!("{prefix}…")
    } else {
        prefix
    }
}

fn now_unix_millis() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .unwrap_or_default()
        .as_millis() as u64
}

/// Drain everything currently buffered on a channel sink receiver.
#[cfg(test)]
pub(crate) fn drain(rx: &mut mpsc::UnboundedReceiver<EventEnvelope>) -> Vec<Event> {
    let mut out = Vec::new();
    while let Ok(envelope) = rx.try_recv() {
        out.push(envelope.event);
    }
    out
}
