//! HTTP middleware stack for the storefront.
//!
//! # Middleware Order (outermost first)
//!
//! 1. Sentry layers (capture errors, transactions; added in `main`)
//! 2. `TraceLayer` (request span with a `request_id` field)
//! 3. Request ID (fill the span field, echo the header)
//! 4. Session layer (tower-sessions)
//! 5. Route guard (bypass, public, or require a signed-in user)
//!
//! `/health` and `/health/ready` sit outside the session layer and guard.

pub mod auth;
pub mod request_id;
pub mod route_guard;
pub mod session;

pub use auth::{AuthRejection, RequireAuth, RequireSeller, clear_current_user, set_current_user};
pub use request_id::{RequestId, request_id_middleware};
pub use route_guard::{Access, PublicRoutes, RequestFilter, RouteGuard, route_guard_middleware};
pub use session::{SESSION_COOKIE_NAME, create_session_layer};
