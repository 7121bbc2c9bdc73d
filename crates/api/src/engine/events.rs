//! Derives the notification event for a committed project change.

use gighub_core::caller::Caller;
use gighub_core::lifecycle::ProjectChange;
use gighub_core::project::Project;
use gighub_core::status::ApplicationStatus;
use gighub_events::{EventKind, PlatformEvent};
use serde_json::json;

/// Build the event describing `change`, or `None` for changes nobody needs
/// to hear about.
///
/// `before` and `after` are the aggregate on either side of the change, both
/// read under the same row lock.
pub(crate) fn event_for(
    before: &Project,
    after: &Project,
    caller: &Caller,
    change: &ProjectChange,
) -> Option<PlatformEvent> {
    let event = |kind| PlatformEvent::new(kind, after.id, after.title.clone(), caller.user_id);

    match change {
        ProjectChange::Assign { freelancer_id } => Some(
            event(EventKind::ProjectAssigned)
                .notify(*freelancer_id)
                .with_payload(json!({
                    "freelancer_id": freelancer_id,
                    "previous_freelancer_id": before.freelancer_id,
                })),
        ),
        ProjectChange::SubmitApplication(new) => {
            let application_id = after.application_from(new.freelancer_id).map(|a| a.id);
            Some(
                event(EventKind::ApplicationSubmitted)
                    .notify(after.client_id)
                    .with_payload(json!({
                        "application_id": application_id,
                        "freelancer_id": new.freelancer_id,
                    })),
            )
        }
        ProjectChange::DecideApplication {
            application_id,
            decision,
            ..
        } => {
            let kind = match decision {
                ApplicationStatus::Accepted => EventKind::ApplicationAccepted,
                ApplicationStatus::Rejected => EventKind::ApplicationRejected,
                ApplicationStatus::Pending => return None,
            };
            let applicant = after.find_application(*application_id)?.freelancer_id;
            Some(
                event(kind)
                    .notify(applicant)
                    .with_payload(json!({ "application_id": application_id })),
            )
        }
        ProjectChange::PostUpdate(update) => Some(
            event(EventKind::ProjectUpdatePosted)
                .notify(after.client_id)
                .with_payload(json!({
                    "progress": update.progress,
                    "note": update.note,
                })),
        ),
        ProjectChange::ChangeStatus { status } => {
            let mut event = event(EventKind::ProjectStatusChanged).with_payload(json!({
                "from": before.status,
                "to": status,
            }));
            if let Some(freelancer_id) = after.freelancer_id {
                event = event.notify(freelancer_id);
            }
            Some(event)
        }
        ProjectChange::EditDetails(_) => None,
    }
}
