use axum::{
    async_trait,
    extract::{rejection::JsonRejection, FromRef, FromRequest, FromRequestParts, Request},
    http::{header::AUTHORIZATION, request::Parts, HeaderMap},
    Json,
};
use tracing::warn;
use uuid::Uuid;

use crate::{
    auth::{
        jwt::TokenKeys,
        repo::{Role, User},
    },
    error::ApiError,
    state::AppState,
};

/// Identity attached to a request by the authorization gate: the verified
/// user id plus the role resolved from the credential store.
#[derive(Debug, Clone, Copy)]
pub struct CurrentUser {
    pub id: Uuid,
    pub role: Role,
}

impl CurrentUser {
    /// Role gate composed in front of a handler. A wrong role is a 403,
    /// distinct from the 401 of a failed token check.
    pub fn require_role(&self, role: Role) -> Result<(), ApiError> {
        if self.role == role {
            return Ok(());
        }
        let name = match role {
            Role::Admin => "admin",
            Role::User => "user",
        };
        Err(ApiError::Authorization(format!(
            "Access denied: {name} role required"
        )))
    }
}

/// Pull the bearer token out of the Authorization header.
fn bearer_token(headers: &HeaderMap) -> Result<&str, ApiError> {
    let header = headers
        .get(AUTHORIZATION)
        .and_then(|v| v.to_str().ok())
        .ok_or_else(|| ApiError::Authentication("Missing Authorization header".into()))?;
    header
        .strip_prefix("Bearer ")
        .or_else(|| header.strip_prefix("bearer "))
        .ok_or_else(|| ApiError::Authentication("Invalid Authorization header".into()))
}

#[async_trait]
impl FromRequestParts<AppState> for CurrentUser {
    type Rejection = ApiError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let token = bearer_token(&parts.headers)?;

        let keys = TokenKeys::from_ref(state);
        let claims = keys.verify_access(token).map_err(|_| {
            warn!("invalid or expired access token");
            ApiError::Authentication("Invalid or expired token".into())
        })?;

        // The token only carries the id; the role comes from the store. A
        // token for a deleted user is as good as no token.
        let user = User::find_by_id(&state.db, claims.sub)
            .await?
            .ok_or_else(|| ApiError::Authentication("User not found".into()))?;

        Ok(CurrentUser {
            id: user.id,
            role: user.role,
        })
    }
}

/// Admin-gated identity: bearer extraction plus the role check composed
/// once, instead of a role `if` repeated in every admin handler.
pub struct AdminUser(pub CurrentUser);

#[async_trait]
impl FromRequestParts<AppState> for AdminUser {
    type Rejection = ApiError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let user = CurrentUser::from_request_parts(parts, state).await?;
        user.require_role(Role::Admin)?;
        Ok(AdminUser(user))
    }
}

/// `Json` with its rejection folded into the shared failure taxonomy: a
/// missing or malformed request body answers with the usual `{"message"}`
/// envelope instead of axum's plain-text default.
pub struct JsonBody<T>(pub T);

#[async_trait]
impl<S, T> FromRequest<S> for JsonBody<T>
where
    Json<T>: FromRequest<S, Rejection = JsonRejection>,
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        let Json(value) = Json::<T>::from_request(req, state)
            .await
            .map_err(|rejection| ApiError::Validation(rejection.body_text()))?;
        Ok(JsonBody(value))
    }
}
