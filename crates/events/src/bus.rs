//! In-process event bus backed by a `tokio::sync::broadcast` channel.
//!
//! [`EventBus`] is the publish/subscribe hub for [`PlatformEvent`]s. It is
//! shared via `Arc<EventBus>` across the application. Events are only
//! published after the mutation they describe has committed.

use std::fmt;

use chrono::{DateTime, Utc};
use gighub_core::types::DbId;
use serde::{Deserialize, Serialize};
use tokio::sync::broadcast;

// ---------------------------------------------------------------------------
// EventKind
// ---------------------------------------------------------------------------

/// What happened to a project.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum EventKind {
    #[serde(rename = "application.submitted")]
    ApplicationSubmitted,
    #[serde(rename = "application.accepted")]
    ApplicationAccepted,
    #[serde(rename = "application.rejected")]
    ApplicationRejected,
    #[serde(rename = "project.assigned")]
    ProjectAssigned,
    #[serde(rename = "project.update_posted")]
    ProjectUpdatePosted,
    #[serde(rename = "project.status_changed")]
    ProjectStatusChanged,
}

impl EventKind {
    /// Dot-separated event name, stored as `notifications.event_type`.
    pub fn as_str(self) -> &'static str {
        match self {
            EventKind::ApplicationSubmitted => "application.submitted",
            EventKind::ApplicationAccepted => "application.accepted",
            EventKind::ApplicationRejected => "application.rejected",
            EventKind::ProjectAssigned => "project.assigned",
            EventKind::ProjectUpdatePosted => "project.update_posted",
            EventKind::ProjectStatusChanged => "project.status_changed",
        }
    }
}

impl fmt::Display for EventKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// ---------------------------------------------------------------------------
// PlatformEvent
// ---------------------------------------------------------------------------

/// A committed change to one project.
///
/// Constructed via [`PlatformEvent::new`] and enriched with
/// [`notify`](PlatformEvent::notify) and
/// [`with_payload`](PlatformEvent::with_payload).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PlatformEvent {
    pub kind: EventKind,

    pub project_id: DbId,

    /// Project title at the time of the event, for human-readable messages.
    pub project_title: String,

    /// The user whose action produced the event.
    pub actor_user_id: DbId,

    /// Users who should be told about it. Never contains the actor.
    pub recipients: Vec<DbId>,

    /// Event-specific data (application id, progress, new status, ...).
    pub payload: serde_json::Value,

    /// When the event was created (UTC).
    pub timestamp: DateTime<Utc>,
}

impl PlatformEvent {
    /// Create an event with no recipients and an empty payload.
    pub fn new(
        kind: EventKind,
        project_id: DbId,
        project_title: impl Into<String>,
        actor_user_id: DbId,
    ) -> Self {
        Self {
            kind,
            project_id,
            project_title: project_title.into(),
            actor_user_id,
            recipients: Vec::new(),
            payload: serde_json::Value::Object(Default::default()),
            timestamp: Utc::now(),
        }
    }

    /// Add a recipient. The actor and repeated ids are skipped.
    pub fn notify(mut self, user_id: DbId) -> Self {
        if user_id != self.actor_user_id && !self.recipients.contains(&user_id) {
            self.recipients.push(user_id);
        }
        self
    }

    /// Set the JSON payload for the event.
    pub fn with_payload(mut self, payload: serde_json::Value) -> Self {
        self.payload = payload;
        self
    }
}

// ---------------------------------------------------------------------------
// EventBus
// ---------------------------------------------------------------------------

/// Default buffer capacity for the broadcast channel.
const DEFAULT_CAPACITY: usize = 1024;

/// In-process fan-out event bus.
///
/// Wraps a [`broadcast::Sender`] so that any number of subscribers can
/// independently receive every published [`PlatformEvent`].
///
/// ```rust
/// use gighub_events::bus::{EventBus, EventKind, PlatformEvent};
///
/// let bus = EventBus::default();
/// let _rx = bus.subscribe();
///
/// bus.publish(PlatformEvent::new(EventKind::ProjectAssigned, 1, "Landing page", 10).notify(20));
/// ```
pub struct EventBus {
    sender: broadcast::Sender<PlatformEvent>,
}

impl EventBus {
    /// Create a bus with a specific channel capacity.
    ///
    /// When the buffer is full, the oldest un-consumed messages are dropped
    /// and slow receivers will observe a `RecvError::Lagged`.
    pub fn new(capacity: usize) -> Self {
        let (sender, _) = broadcast::channel(capacity);
        Self { sender }
    }

    /// Publish an event to all current subscribers.
    ///
    /// With no active subscribers the event is dropped.
    pub fn publish(&self, event: PlatformEvent) {
        tracing::debug!(
            kind = %event.kind,
            project_id = event.project_id,
            recipients = event.recipients.len(),
            "Publishing event",
        );
        // SendError only means there are zero receivers.
        let _ = self.sender.send(event);
    }

    /// Subscribe to all events published on this bus.
    pub fn subscribe(&self) -> broadcast::Receiver<PlatformEvent> {
        self.sender.subscribe()
    }
}

impl Default for EventBus {
    fn default() -> Self {
        Self::new(DEFAULT_CAPACITY)
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
