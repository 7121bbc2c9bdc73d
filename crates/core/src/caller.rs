//! The authenticated principal every engine operation receives.

use crate::error::CoreError;
use crate::roles::Role;
use crate::types::DbId;

/// An already-authenticated identity plus its role.
///
/// Built by the HTTP layer from a verified token; the engine never looks at
/// request state directly.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Caller {
    pub user_id: DbId,
    pub role: Role,
}

impl Caller {
    pub fn new(user_id: DbId, role: Role) -> Self {
        Self { user_id, role }
    }

    pub fn client(user_id: DbId) -> Self {
        Self::new(user_id, Role::Client)
    }

    pub fn freelancer(user_id: DbId) -> Self {
        Self::new(user_id, Role::Freelancer)
    }

    /// Fail with `Forbidden` unless the caller holds `role`.
    ///
    /// `action` completes the sentence "Only a <role> can ...".
    pub fn require_role(&self, role: Role, action: &str) -> Result<(), CoreError> {
        if self.role != role {
            return Err(CoreError::Forbidden(format!("Only a {role} can {action}")));
        }
        Ok(())
    }
}
