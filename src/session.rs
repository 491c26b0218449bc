//! Chat sessions for the HTTP and MCP surfaces.
//!
//! A session owns one [`Conversation`] and allows at most one turn in
//! flight. The lock is never held across the engine call: a turn works on
//! a snapshot and commits it only if the conversation was not reset in
//! the meantime. "start over" skips the in-flight gate so the user can
//! always bail out.
//!
//! MCP clients never delete their sessions, so sessions idle for longer
//! than the store's TTL are evicted whenever a session is created or a
//! turn starts. A session with a turn in flight is never evicted.

use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use std::time::{Duration, Instant};

use chrono::{DateTime, Utc};
use serde::Serialize;
use thiserror::Error;
use uuid::Uuid;

use crate::client::OrderingApi;
use crate::engine::{parse, ChatEngine, ChatReply, Command, Conversation, Stage};
use crate::models::{CartLine, Order, Restaurant};
use crate::pricing::Totals;
use crate::render::{render, resolve_selection, Capabilities, Platform, RenderedReply};
use crate::tracking::OrderTracker;

/// Idle time after which a session is evicted, unless configured otherwise.
pub const DEFAULT_SESSION_TTL: Duration = Duration::from_secs(30 * 60);

pub const STILL_WORKING: &str = "Still working on your last message, one moment...";
pub const STALE_DISCARDED: &str =
    "The conversation was reset while that message was being handled, so its reply was discarded.";

#[derive(Debug, Error)]
pub enum SessionError {
    #[error("session not found: {0}")]
    NotFound(Uuid),
}

struct Session {
    conversation: Conversation,
    capabilities: Capabilities,
    /// A turn is running against a snapshot of `conversation`.
    busy: bool,
    /// The last committed reply, for resolving typed selections.
    last_reply: ChatReply,
    tracker: Option<OrderTracker>,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
    last_active: Instant,
}

impl Session {
    fn expired(&self, ttl: Duration) -> bool {
        !self.busy && self.last_active.elapsed() >= ttl
    }

    fn snapshot(&self, id: Uuid) -> SessionSnapshot {
        SessionSnapshot {
            id,
            platform: self.capabilities.platform,
            capabilities: self.capabilities,
            stage: self.conversation.stage,
            restaurant: self.conversation.restaurant.clone(),
            cart: self.conversation.cart.to_lines(),
            totals: self.conversation.totals(),
            last_order_id: self.conversation.last_order_id.clone(),
            busy: self.busy,
            created_at: self.created_at,
            updated_at: self.updated_at,
        }
    }

    fn outcome(&self, id: Uuid, reply: RenderedReply, applied: bool) -> TurnOutcome {
        TurnOutcome {
            session_id: id,
            reply,
            stage: self.conversation.stage,
            cart: self.conversation.cart.to_lines(),
            totals: self.conversation.totals(),
            applied,
        }
    }

    /// Remember and render a reply that was committed to the conversation.
    fn commit(&mut self, id: Uuid, reply: ChatReply) -> TurnOutcome {
        let rendered = render(&reply, &self.capabilities);
        self.last_reply = reply;
        self.updated_at = Utc::now();
        self.last_active = Instant::now();
        self.outcome(id, rendered, true)
    }

    /// Answer without touching the conversation.
    fn notice(&self, id: Uuid, message: &str) -> TurnOutcome {
        let reply = RenderedReply {
            text: message.to_string(),
            actions: Vec::new(),
            stage: self.conversation.stage,
        };
        self.outcome(id, reply, false)
    }
}

/// Read-only view of a session.
#[derive(Debug, Clone, Serialize)]
pub struct SessionSnapshot {
    pub id: Uuid,
    pub platform: Platform,
    pub capabilities: Capabilities,
    pub stage: Stage,
    pub restaurant: Option<Restaurant>,
    pub cart: Vec<CartLine>,
    pub totals: Totals,
    pub last_order_id: Option<String>,
    pub busy: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize)]
pub struct CreatedSession {
    pub session_id: Uuid,
    pub capabilities: Capabilities,
    pub reply: RenderedReply,
}

/// Result of one turn.
#[derive(Debug, Clone, Serialize)]
pub struct TurnOutcome {
    pub session_id: Uuid,
    pub reply: RenderedReply,
    pub stage: Stage,
    pub cart: Vec<CartLine>,
    pub totals: Totals,
    /// `false` when the turn was rejected by the in-flight gate or its
    /// result was discarded after a reset.
    pub applied: bool,
}

pub struct SessionStore {
    engine: Arc<ChatEngine>,
    api: Arc<dyn OrderingApi>,
    track_interval: Duration,
    default_platform: Platform,
    idle_ttl: Duration,
    sessions: Mutex<HashMap<Uuid, Session>>,
}

/// Clears a session's busy flag when the turn ends, including when the
/// turn future is dropped mid-flight.
struct BusyGuard<'a> {
    store: &'a SessionStore,
    id: Uuid,
}

impl Drop for BusyGuard<'_> {
    fn drop(&mut self) {
        let mut sessions = self.store.sessions.lock().expect("session lock poisoned");
        if let Some(session) = sessions.get_mut(&self.id) {
            session.busy = false;
        }
    }
}

impl SessionStore {
    pub fn new(
        engine: Arc<ChatEngine>,
        api: Arc<dyn OrderingApi>,
        track_interval: Duration,
        default_platform: Platform,
    ) -> Self {
        Self {
            engine,
            api,
            track_interval,
            default_platform,
            idle_ttl: DEFAULT_SESSION_TTL,
            sessions: Mutex::new(HashMap::new()),
        }
    }

    pub fn with_idle_ttl(mut self, ttl: Duration) -> Self {
        self.idle_ttl = ttl;
        self
    }

    /// Drop idle sessions other than `keep`. Dropping a session stops its
    /// order tracker.
    fn evict_idle(&self, sessions: &mut HashMap<Uuid, Session>, keep: Option<Uuid>) {
        let before = sessions.len();
        sessions.retain(|id, s| Some(*id) == keep || !s.expired(self.idle_ttl));
        let evicted = before - sessions.len();
        if evicted > 0 {
            tracing::info!(evicted, remaining = sessions.len(), "evicted idle chat sessions");
        }
    }

    pub fn engine(&self) -> &ChatEngine {
        &self.engine
    }

    /// Open a session and return its welcome reply.
    pub fn create(&self, platform: Option<Platform>) -> CreatedSession {
        let capabilities = Capabilities::for_platform(platform.unwrap_or(self.default_platform));
        let id = Uuid::new_v4();
        let now = Utc::now();

        let mut session = Session {
            conversation: Conversation::new(),
            capabilities,
            busy: false,
            last_reply: ChatReply::new("", Stage::Search),
            tracker: None,
            created_at: now,
            updated_at: now,
            last_active: Instant::now(),
        };
        let welcome = self.engine.welcome(&capabilities);
        let reply = session.commit(id, welcome).reply;

        let mut sessions = self.sessions.lock().expect("session lock poisoned");
        self.evict_idle(&mut sessions, None);
        sessions.insert(id, session);
        tracing::info!(session_id = %id, platform = %capabilities.platform, "chat session created");

        CreatedSession {
            session_id: id,
            capabilities,
            reply,
        }
    }

    pub fn get(&self, id: Uuid) -> Result<SessionSnapshot, SessionError> {
        let sessions = self.sessions.lock().expect("session lock poisoned");
        sessions
            .get(&id)
            .map(|s| s.snapshot(id))
            .ok_or(SessionError::NotFound(id))
    }

    /// Remove a session, stopping its order tracker.
    pub fn delete(&self, id: Uuid) -> Result<(), SessionError> {
        let removed = {
            let mut sessions = self.sessions.lock().expect("session lock poisoned");
            sessions.remove(&id)
        };
        match removed {
            Some(_) => {
                tracing::info!(session_id = %id, "chat session deleted");
                Ok(())
            }
            None => Err(SessionError::NotFound(id)),
        }
    }

    pub fn contains(&self, id: Uuid) -> bool {
        let sessions = self.sessions.lock().expect("session lock poisoned");
        sessions.contains_key(&id)
    }

    pub fn len(&self) -> usize {
        let sessions = self.sessions.lock().expect("session lock poisoned");
        sessions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Latest snapshot of the order placed in this session, if it is
    /// being tracked and has been polled at least once.
    pub fn tracked_order(&self, id: Uuid) -> Result<Option<Order>, SessionError> {
        let sessions = self.sessions.lock().expect("session lock poisoned");
        let session = sessions.get(&id).ok_or(SessionError::NotFound(id))?;
        Ok(session.tracker.as_ref().and_then(|t| t.latest()))
    }

    /// Handle one line of user input.
    pub async fn turn(&self, id: Uuid, input: &str) -> Result<TurnOutcome, SessionError> {
        let (mut conversation, capabilities, epoch, input) = {
            let mut sessions = self.sessions.lock().expect("session lock poisoned");
            self.evict_idle(&mut sessions, Some(id));
            let session = sessions.get_mut(&id).ok_or(SessionError::NotFound(id))?;

            let input = resolve_selection(input, &session.last_reply, &session.capabilities)
                .unwrap_or_else(|| input.to_string());

            if parse::parse_command(&input) == Command::StartOver {
                session.tracker = None;
                let reply = self
                    .engine
                    .start_over(&mut session.conversation, &session.capabilities);
                return Ok(session.commit(id, reply));
            }

            if session.busy {
                tracing::debug!(session_id = %id, "turn rejected, another is in flight");
                return Ok(session.notice(id, STILL_WORKING));
            }

            session.busy = true;
            (
                session.conversation.clone(),
                session.capabilities,
                session.conversation.epoch,
                input,
            )
        };
        let _busy = BusyGuard { store: self, id };

        let previous_order = conversation.last_order_id.clone();
        let reply = self
            .engine
            .handle_turn(&mut conversation, &input, &capabilities)
            .await;

        let mut sessions = self.sessions.lock().expect("session lock poisoned");
        let session = sessions.get_mut(&id).ok_or(SessionError::NotFound(id))?;

        if session.conversation.epoch != epoch {
            tracing::debug!(session_id = %id, "discarding reply from before reset");
            return Ok(session.notice(id, STALE_DISCARDED));
        }

        if conversation.last_order_id != previous_order {
            if let Some(order_id) = &conversation.last_order_id {
                session.tracker = Some(OrderTracker::spawn(
                    self.api.clone(),
                    order_id.clone(),
                    self.track_interval,
                ));
            }
        }
        session.conversation = conversation;
        session.busy = false;
        Ok(session.commit(id, reply))
    }
}
