//! Authentication extractors.
//!
//! The route guard resolves the session and places the signed-in
//! [`CurrentUser`] in the request extensions; these extractors read it back.

use axum::{
    extract::FromRequestParts,
    http::request::Parts,
    response::{IntoResponse, Response},
};
use tower_sessions::Session;

use quickcart_core::models::User;

use crate::error::AppError;
use crate::models::{CurrentUser, session_keys};
use crate::state::AppState;

/// Extractor that requires a signed-in user.
///
/// # Example
///
/// ```rust,ignore
/// async fn protected_handler(
///     RequireAuth(user): RequireAuth,
/// ) -> impl IntoResponse {
///     format!("Hello, {}!", user.email)
/// }
/// ```
pub struct RequireAuth(pub CurrentUser);

/// Error returned when a handler needs a user the guard did not provide.
#[derive(Debug)]
pub struct AuthRejection;

impl IntoResponse for AuthRejection {
    fn into_response(self) -> Response {
        AppError::Unauthorized("Sign in required".to_string()).into_response()
    }
}

impl<S> FromRequestParts<S> for RequireAuth
where
    S: Send + Sync,
{
    type Rejection = AuthRejection;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        parts
            .extensions
            .get::<CurrentUser>()
            .cloned()
            .map(Self)
            .ok_or(AuthRejection)
    }
}

/// Extractor that requires a signed-in seller.
///
/// Loads (or first creates) the caller's user document and rejects with
/// `403 Forbidden` unless `isSeller` is set.
pub struct RequireSeller(pub CurrentUser, pub User);

impl FromRequestParts<AppState> for RequireSeller {
    type Rejection = Response;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let RequireAuth(current) = RequireAuth::from_request_parts(parts, state)
            .await
            .map_err(IntoResponse::into_response)?;

        let user = state
            .users()
            .get_or_create(&current.to_new_user())
            .await
            .map_err(|e| AppError::from(e).into_response())?;

        if !user.is_seller {
            tracing::debug!(subject = %current.subject, "seller route refused");
            return Err(AppError::Forbidden("Seller access required".to_string()).into_response());
        }

        Ok(Self(current, user))
    }
}

/// Helper to set the current user in the session (sign-in).
///
/// # Errors
///
/// Returns an error if the session cannot be modified.
pub async fn set_current_user(
    session: &Session,
    user: &CurrentUser,
) -> Result<(), tower_sessions::session::Error> {
    session.insert(session_keys::CURRENT_USER, user).await
}

/// Helper to clear the current user from the session (sign-out).
///
/// # Errors
///
/// Returns an error if the session cannot be modified.
pub async fn clear_current_user(session: &Session) -> Result<(), tower_sessions::session::Error> {
    session
        .remove::<CurrentUser>(session_keys::CURRENT_USER)
        .await?;
    Ok(())
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use std::sync::Arc;

    use axum::http::{Request, StatusCode};
    use quickcart_core::{Email, OwnerId};
    use tower_sessions::MemoryStore;

    use super::*;

    fn current() -> CurrentUser {
        CurrentUser {
            subject: OwnerId::new("user_1"),
            email: Email::parse("a@x.io").unwrap(),
            name: None,
            image_url: None,
        }
    }

    #[tokio::test]
    async fn test_require_auth_reads_extension() {
        let (mut parts, ()) = Request::new(()).into_parts();
        assert!(RequireAuth::from_request_parts(&mut parts, &()).await.is_err());

        parts.extensions.insert(current());
        let RequireAuth(user) = RequireAuth::from_request_parts(&mut parts, &()).await.unwrap();
        assert_eq!(user, current());
    }

    #[test]
    fn test_rejection_is_unauthorized() {
        assert_eq!(AuthRejection.into_response().status(), StatusCode::UNAUTHORIZED);
    }

    #[tokio::test]
    async fn test_set_and_clear_current_user() {
        let session = Session::new(None, Arc::new(MemoryStore::default()), None);

        set_current_user(&session, &current()).await.unwrap();
        let stored: Option<CurrentUser> = session.get(session_keys::CURRENT_USER).await.unwrap();
        assert_eq!(stored, Some(current()));

        clear_current_user(&session).await.unwrap();
        let stored: Option<CurrentUser> = session.get(session_keys::CURRENT_USER).await.unwrap();
        assert!(stored.is_none());
    }

    #[tokio::test]
    async fn test_require_seller_refuses_buyers() {
        let state = AppState::in_memory();
        let (mut parts, ()) = Request::new(()).into_parts();
        parts.extensions.insert(current());

        let err = RequireSeller::from_request_parts(&mut parts, &state)
            .await
            .err()
            .unwrap();
        assert_eq!(err.status(), StatusCode::FORBIDDEN);

        let user = state.users().get_by_email(&current().email).await.unwrap().unwrap();
        state.users().set_seller(user.id, true).await.unwrap();
        let RequireSeller(_, seller) = RequireSeller::from_request_parts(&mut parts, &state)
            .await
            .ok()
            .unwrap();
        assert!(seller.is_seller);
    }
}
