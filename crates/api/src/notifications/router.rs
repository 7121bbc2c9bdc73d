//! Event-to-notification routing.
//!
//! [`NotificationRouter`] subscribes to the platform event bus and writes one
//! `notifications` row per recipient of each event.

use gighub_db::models::notification::CreateNotification;
use gighub_db::repositories::NotificationRepo;
use gighub_db::DbPool;
use gighub_events::{EventKind, PlatformEvent};
use tokio::sync::broadcast;

/// Stores a notification for every recipient of every published event.
pub struct NotificationRouter {
    pool: DbPool,
}

impl NotificationRouter {
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }

    /// Run the routing loop.
    ///
    /// The loop exits when the channel is closed (i.e. the
    /// [`EventBus`](gighub_events::EventBus) is dropped).
    pub async fn run(self, mut receiver: broadcast::Receiver<PlatformEvent>) {
        loop {
            match receiver.recv().await {
                Ok(event) => {
                    if let Err(e) = self.route_event(&event).await {
                        tracing::error!(
                            error = %e,
                            kind = %event.kind,
                            project_id = event.project_id,
                            "Failed to route event"
                        );
                    }
                }
                Err(broadcast::error::RecvError::Lagged(n)) => {
                    tracing::warn!(skipped = n, "Notification router lagged");
                }
                Err(broadcast::error::RecvError::Closed) => {
                    tracing::info!("Event bus closed, notification router shutting down");
                    break;
                }
            }
        }
    }

    /// Store one notification per recipient.
    async fn route_event(&self, event: &PlatformEvent) -> Result<(), sqlx::Error> {
        let message = message_for(event);
        for &user_id in &event.recipients {
            let id = NotificationRepo::create(
                &self.pool,
                &CreateNotification {
                    user_id,
                    event_type: event.kind.as_str().to_string(),
                    project_id: Some(event.project_id),
                    message: message.clone(),
                },
            )
            .await?;
            tracing::debug!(notification_id = id, user_id, kind = %event.kind, "Notification stored");
        }
        Ok(())
    }
}

/// Human-readable notification text for an event.
pub fn message_for(event: &PlatformEvent) -> String {
    let title = &event.project_title;
    match event.kind {
        EventKind::ApplicationSubmitted => format!("New application received for \"{title}\""),
        EventKind::ApplicationAccepted => {
            format!("Your application for \"{title}\" was accepted")
        }
        EventKind::ApplicationRejected => {
            format!("Your application for \"{title}\" was rejected")
        }
        EventKind::ProjectAssigned => format!("You have been assigned to \"{title}\""),
        EventKind::ProjectUpdatePosted => match event.payload.get("progress") {
            Some(progress) => format!("New progress update on \"{title}\": {progress}%"),
            None => format!("New progress update on \"{title}\""),
        },
        EventKind::ProjectStatusChanged => {
            match event.payload.get("to").and_then(|v| v.as_str()) {
                Some(status) => format!("\"{title}\" is now {}", status.replace('_', " ")),
                None => format!("The status of \"{title}\" changed"),
            }
        }
    }
}
