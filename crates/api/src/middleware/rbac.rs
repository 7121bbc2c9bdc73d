//! Role-based access control (RBAC) extractors.
//!
//! Each extractor wraps [`AuthUser`] and rejects requests whose role does not
//! match. Routes whose error ordering depends on project state (applying,
//! deciding) take a plain [`AuthUser`] and leave role checks to the engine.

use axum::extract::FromRequestParts;
use axum::http::request::Parts;
use gighub_core::error::CoreError;
use gighub_core::roles::Role;

use super::auth::AuthUser;
use crate::error::AppError;
use crate::state::AppState;

async fn require_role(
    parts: &mut Parts,
    state: &AppState,
    role: Role,
) -> Result<AuthUser, AppError> {
    let user = AuthUser::from_request_parts(parts, state).await?;
    if user.role != role {
        return Err(AppError::Core(CoreError::Forbidden(format!(
            "{} role required",
            match role {
                Role::Client => "Client",
                Role::Freelancer => "Freelancer",
            }
        ))));
    }
    Ok(user)
}

/// Requires the `client` role. Rejects with 403 Forbidden otherwise.
///
/// ```ignore
/// async fn clients_only(RequireClient(user): RequireClient) -> AppResult<Json<()>> {
///     Ok(Json(()))
/// }
/// ```
pub struct RequireClient(pub AuthUser);

impl FromRequestParts<AppState> for RequireClient {
    type Rejection = AppError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        require_role(parts, state, Role::Client).await.map(RequireClient)
    }
}

/// Requires the `freelancer` role. Rejects with 403 Forbidden otherwise.
pub struct RequireFreelancer(pub AuthUser);

impl FromRequestParts<AppState> for RequireFreelancer {
    type Rejection = AppError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        require_role(parts, state, Role::Freelancer)
            .await
            .map(RequireFreelancer)
    }
}

/// Requires any authenticated user (any valid role).
///
/// Functionally equivalent to [`AuthUser`] but named explicitly for route
/// definitions where "this route requires authentication" should be
/// self-documenting.
pub struct RequireAuth(pub AuthUser);

impl FromRequestParts<AppState> for RequireAuth {
    type Rejection = AppError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let user = AuthUser::from_request_parts(parts, state).await?;
        Ok(RequireAuth(user))
    }
}
