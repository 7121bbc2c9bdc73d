//! What part of a project aggregate a caller may read.
//!
//! The project's client sees everything. Anyone else sees the listing, the
//! questions and only their own application. Progress updates are shown to
//! the client and the assigned freelancer, matching
//! [`ensure_can_view_updates`].

use crate::caller::Caller;
use crate::ledger::ensure_can_view_updates;
use crate::project::Project;

/// Strip the parts of `project` that `caller` is not allowed to read.
pub fn visible_to(mut project: Project, caller: &Caller) -> Project {
    if project.is_client(caller.user_id) {
        return project;
    }

    if ensure_can_view_updates(&project, caller).is_err() {
        project.updates.clear();
    }
    project
        .applications
        .retain(|a| a.freelancer_id == caller.user_id);
    project
}
