//! Integration tests for QuickCart.
//!
//! Tests drive the full storefront router in-process with
//! `tower::ServiceExt::oneshot`, on the in-memory document store and an
//! in-memory session store. No database or running server is needed.
//!
//! ```bash
//! cargo test -p quickcart-integration-tests
//! ```
//!
//! Sign-in belongs to the auth provider; [`TestApp::sign_in`] plays its part
//! by writing a session record directly and returning the cookie for it.

use std::collections::HashMap;

use axum::Router;
use axum::body::{Body, to_bytes};
use axum::http::{HeaderMap, Method, Request, StatusCode, header};
use serde::Serialize;
use serde_json::Value;
use tower::ServiceExt;
use tower_sessions::cookie::time::{Duration, OffsetDateTime};
use tower_sessions::session::{Id, Record};
use tower_sessions::{MemoryStore, SessionStore};

use quickcart_core::models::User;
use quickcart_core::{Email, OwnerId};
use quickcart_storefront::middleware::SESSION_COOKIE_NAME;
use quickcart_storefront::models::{CurrentUser, session_keys};
use quickcart_storefront::state::AppState;

/// Largest response body the helpers will read.
const BODY_LIMIT: usize = 1024 * 1024;

/// A response, with the body parsed as JSON when possible.
#[derive(Debug)]
pub struct TestResponse {
    pub status: StatusCode,
    pub headers: HeaderMap,
    /// JSON body; a non-JSON body becomes a string, an empty one `Null`.
    pub body: Value,
}

impl TestResponse {
    /// The `Location` header, if any.
    #[must_use]
    pub fn location(&self) -> Option<&str> {
        self.headers
            .get(header::LOCATION)
            .and_then(|v| v.to_str().ok())
    }
}

/// The storefront app with its state and session store.
pub struct TestApp {
    pub state: AppState,
    sessions: MemoryStore,
    router: Router,
}

impl Default for TestApp {
    fn default() -> Self {
        Self::new()
    }
}

impl TestApp {
    /// A fresh app with empty stores.
    #[must_use]
    pub fn new() -> Self {
        let state = AppState::in_memory();
        let sessions = MemoryStore::default();
        let router = quickcart_storefront::app(state.clone(), sessions.clone());
        Self {
            state,
            sessions,
            router,
        }
    }

    /// Store a signed-in session for `subject` and return its cookie.
    ///
    /// # Panics
    ///
    /// Panics if the email is invalid or the session cannot be stored.
    pub async fn sign_in(&self, subject: &str, email: &str) -> String {
        let user = CurrentUser {
            subject: OwnerId::new(subject),
            email: Email::parse(email).expect("valid test email"),
            name: None,
            image_url: None,
        };

        let mut record = Record {
            id: Id::default(),
            data: HashMap::from([(
                session_keys::CURRENT_USER.to_string(),
                serde_json::to_value(&user).expect("serializable user"),
            )]),
            expiry_date: OffsetDateTime::now_utc() + Duration::hours(1),
        };
        self.sessions
            .create(&mut record)
            .await
            .expect("session stored");

        format!("{SESSION_COOKIE_NAME}={}", record.id)
    }

    /// Sign in and grant seller access.
    ///
    /// # Panics
    ///
    /// Panics if the user cannot be created or updated.
    pub async fn sign_in_seller(&self, subject: &str, email: &str) -> String {
        let cookie = self.sign_in(subject, email).await;
        let user = self.user(email).await;
        self.state
            .users()
            .set_seller(user.id, true)
            .await
            .expect("seller flag set");
        cookie
    }

    /// Load (creating if needed) the user document for `email`.
    ///
    /// # Panics
    ///
    /// Panics if the store fails.
    pub async fn user(&self, email: &str) -> User {
        let email = Email::parse(email).expect("valid test email");
        self.state
            .users()
            .get_or_create(&quickcart_core::models::NewUser::new(email))
            .await
            .expect("user loaded")
    }

    /// Send a GET request.
    pub async fn get(&self, uri: &str, cookie: Option<&str>) -> TestResponse {
        self.send(Method::GET, uri, cookie, Body::empty(), false).await
    }

    /// Send a POST request with a JSON body.
    ///
    /// # Panics
    ///
    /// Panics if `body` cannot be serialized.
    pub async fn post_json(
        &self,
        uri: &str,
        cookie: Option<&str>,
        body: &impl Serialize,
    ) -> TestResponse {
        let bytes = serde_json::to_vec(body).expect("serializable body");
        self.send(Method::POST, uri, cookie, Body::from(bytes), true)
            .await
    }

    async fn send(
        &self,
        method: Method,
        uri: &str,
        cookie: Option<&str>,
        body: Body,
        json: bool,
    ) -> TestResponse {
        let mut builder = Request::builder().method(method).uri(uri);
        if let Some(cookie) = cookie {
            builder = builder.header(header::COOKIE, cookie);
        }
        if json {
            builder = builder.header(header::CONTENT_TYPE, "application/json");
        }
        let request = builder.body(body).expect("valid request");

        let response = self
            .router
            .clone()
            .oneshot(request)
            .await
            .expect("infallible router");

        let status = response.status();
        let headers = response.headers().clone();
        let bytes = to_bytes(response.into_body(), BODY_LIMIT)
            .await
            .expect("readable body");

        let body = if bytes.is_empty() {
            Value::Null
        } else {
            serde_json::from_slice(&bytes)
                .unwrap_or_else(|_| Value::String(String::from_utf8_lossy(&bytes).into_owned()))
        };

        TestResponse {
            status,
            headers,
            body,
        }
    }
}
