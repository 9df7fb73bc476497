//! Route guard.
//!
//! Every request passes through two checks before a handler runs:
//!
//! 1. The [`RequestFilter`] decides whether the guard looks at the request
//!    at all. Framework internals and static files are skipped.
//! 2. [`PublicRoutes`] classifies the path. A public path proceeds without a
//!    session; anything else needs a signed-in [`CurrentUser`].
//!
//! The public list is an allow-list: a path no pattern matches is protected.

use std::sync::LazyLock;

use axum::{
    extract::{Request, State},
    middleware::Next,
    response::{IntoResponse, Redirect, Response},
};
use regex::Regex;
use tower_sessions::Session;

use crate::config::GuardConfig;
use crate::error::{AppError, set_sentry_user};
use crate::models::{CurrentUser, session_keys};
use crate::state::AppState;

/// Path remainder ending in a file extension, e.g. `logo.png` or `a/b.min.js`.
static FILE_EXTENSION_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^.+\.\w+$").expect("Invalid regex"));

/// Suffix wildcard accepted in public-route patterns.
const WILDCARD: &str = "(.*)";

/// Errors building the guard from configuration.
#[derive(Debug, thiserror::Error)]
pub enum PatternError {
    /// Patterns are absolute paths.
    #[error("route pattern {0:?} must start with '/'")]
    NotAbsolute(String),
    /// The compiled pattern was rejected by the regex engine.
    #[error("route pattern {pattern:?} is invalid: {source}")]
    Invalid {
        pattern: String,
        #[source]
        source: regex::Error,
    },
}

/// One public-route pattern.
///
/// Literal text matches itself, ignoring ASCII case; `(.*)` matches any
/// remainder, including nothing. Without a wildcard, a single trailing slash
/// is tolerated.
#[derive(Debug, Clone)]
pub struct RoutePattern {
    source: String,
    regex: Regex,
}

impl RoutePattern {
    /// Compile a pattern such as `/`, `/all-products` or `/product(.*)`.
    ///
    /// # Errors
    ///
    /// Returns `PatternError` if the pattern is not an absolute path.
    pub fn parse(pattern: &str) -> Result<Self, PatternError> {
        if !pattern.starts_with('/') {
            return Err(PatternError::NotAbsolute(pattern.to_owned()));
        }

        let body = pattern
            .split(WILDCARD)
            .map(regex::escape)
            .collect::<Vec<_>>()
            .join(".*");
        let trailing_slash = if pattern.contains(WILDCARD) || pattern == "/" {
            ""
        } else {
            "/?"
        };

        let regex = Regex::new(&format!("(?i)^{body}{trailing_slash}$")).map_err(|source| {
            PatternError::Invalid {
                pattern: pattern.to_owned(),
                source,
            }
        })?;

        Ok(Self {
            source: pattern.to_owned(),
            regex,
        })
    }

    /// The pattern as configured.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.source
    }

    /// Whether `path` matches this pattern.
    #[must_use]
    pub fn matches(&self, path: &str) -> bool {
        self.regex.is_match(path)
    }
}

/// Ordered list of public-route patterns.
#[derive(Debug, Clone)]
pub struct PublicRoutes {
    patterns: Vec<RoutePattern>,
}

impl PublicRoutes {
    /// Compile patterns, keeping their order.
    ///
    /// # Errors
    ///
    /// Returns the first `PatternError` encountered.
    pub fn new<I, P>(patterns: I) -> Result<Self, PatternError>
    where
        I: IntoIterator<Item = P>,
        P: AsRef<str>,
    {
        let patterns = patterns
            .into_iter()
            .map(|p| RoutePattern::parse(p.as_ref()))
            .collect::<Result<_, _>>()?;
        Ok(Self { patterns })
    }

    /// The first pattern matching `path`, if any.
    #[must_use]
    pub fn matching(&self, path: &str) -> Option<&RoutePattern> {
        self.patterns.iter().find(|p| p.matches(path))
    }

    /// Whether `path` may be served without a session.
    #[must_use]
    pub fn is_public(&self, path: &str) -> bool {
        self.matching(path).is_some()
    }
}

/// Decides which requests the guard evaluates.
#[derive(Debug, Clone, Copy, Default)]
pub struct RequestFilter;

impl RequestFilter {
    /// Whether the guard should evaluate `path`.
    ///
    /// `/` and everything under `/api` or `/trpc` is always evaluated, even
    /// when it looks like a file. Otherwise `_next` internals and paths
    /// ending in a file extension are skipped.
    #[must_use]
    pub fn intercepts(self, path: &str) -> bool {
        if path == "/" || Self::is_programmatic(path) {
            return true;
        }

        let rest = path.strip_prefix('/').unwrap_or(path);
        !(rest.starts_with("_next") || FILE_EXTENSION_RE.is_match(rest))
    }

    /// API-style paths, answered with 401 instead of a redirect.
    #[must_use]
    pub fn is_programmatic(path: &str) -> bool {
        path.starts_with("/api") || path.starts_with("/trpc")
    }
}

/// How the guard treats a path.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Access {
    /// Not evaluated at all.
    Bypass,
    /// Evaluated and allowed without a session.
    Public,
    /// Evaluated and requires a session.
    Protected,
}

/// The configured route guard.
#[derive(Debug, Clone)]
pub struct RouteGuard {
    filter: RequestFilter,
    public: PublicRoutes,
    sign_in_url: String,
}

impl RouteGuard {
    /// Build the guard from configuration.
    ///
    /// A sign-in URL on this site is always public, along with everything
    /// under it; otherwise signed-out visitors would be redirected to a page
    /// they cannot reach.
    ///
    /// # Errors
    ///
    /// Returns `PatternError` if a public-route pattern is invalid.
    pub fn new(config: &GuardConfig) -> Result<Self, PatternError> {
        let sign_in = sign_in_pattern(&config.sign_in_url);
        let patterns = config.public_routes.iter().map(String::as_str).chain(sign_in.as_deref());

        Ok(Self {
            filter: RequestFilter,
            public: PublicRoutes::new(patterns)?,
            sign_in_url: config.sign_in_url.clone(),
        })
    }

    /// Classify a request path.
    #[must_use]
    pub fn classify(&self, path: &str) -> Access {
        if !self.filter.intercepts(path) {
            Access::Bypass
        } else if self.public.is_public(path) {
            Access::Public
        } else {
            Access::Protected
        }
    }

    /// Where a signed-out visitor to `target` is sent.
    #[must_use]
    pub fn sign_in_redirect(&self, target: &str) -> String {
        let separator = if self.sign_in_url.contains('?') { '&' } else { '?' };
        format!(
            "{}{separator}redirect_url={}",
            self.sign_in_url,
            urlencoding::encode(target)
        )
    }

    /// Response for a protected request without a session.
    #[must_use]
    pub fn reject(&self, path: &str, target: &str) -> Response {
        if RequestFilter::is_programmatic(path) {
            AppError::Unauthorized("Sign in required".to_string()).into_response()
        } else {
            Redirect::to(&self.sign_in_redirect(target)).into_response()
        }
    }
}

/// Public pattern covering a same-site sign-in URL, e.g. `/sign-in(.*)`.
fn sign_in_pattern(sign_in_url: &str) -> Option<String> {
    let path = sign_in_url.split(['?', '#']).next().unwrap_or_default();
    let path = path.trim_end_matches('/');
    (path.starts_with('/') && !path.starts_with("//")).then(|| format!("{path}{WILDCARD}"))
}

/// Read the signed-in user from the session, if any.
async fn session_user(session: Option<Session>) -> Option<CurrentUser> {
    let Some(session) = session else {
        tracing::error!("session layer missing; treating request as signed out");
        return None;
    };

    match session.get::<CurrentUser>(session_keys::CURRENT_USER).await {
        Ok(user) => user,
        Err(e) => {
            tracing::warn!(error = %e, "failed to read session");
            None
        }
    }
}

/// Middleware enforcing the [`RouteGuard`].
///
/// A signed-in user is placed in the request extensions on every evaluated
/// path, public or not, for handlers to pick up with `RequireAuth`.
pub async fn route_guard_middleware(
    State(state): State<AppState>,
    mut request: Request,
    next: Next,
) -> Response {
    let guard = state.guard();
    let path = request.uri().path().to_owned();

    let access = guard.classify(&path);
    if access == Access::Bypass {
        return next.run(request).await;
    }

    let session = request.extensions().get::<Session>().cloned();
    match session_user(session).await {
        Some(user) => {
            set_sentry_user(&user.subject, Some(user.email.as_str()));
            request.extensions_mut().insert(user);
            next.run(request).await
        }
        None if access == Access::Public => next.run(request).await,
        None => {
            tracing::debug!(path = %path, "signed-out request to protected route");
            let target = request
                .uri()
                .path_and_query()
                .map_or(path.as_str(), |pq| pq.as_str());
            guard.reject(&path, target)
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use axum::http::{StatusCode, header};

    use super::*;

    fn guard() -> RouteGuard {
        RouteGuard::new(&GuardConfig::default()).unwrap()
    }

    #[test]
    fn test_public_routes_allow_without_session() {
        let guard = guard();
        for path in ["/", "/all-products", "/all-products/", "/product/42", "/product", "/products"] {
            assert_eq!(guard.classify(path), Access::Public, "{path}");
        }
    }

    #[test]
    fn test_other_paths_are_protected() {
        let guard = guard();
        for path in ["/cart", "/orders/123", "/my-orders", "/api/cart/get", "/all-products/x"] {
            assert_eq!(guard.classify(path), Access::Protected, "{path}");
        }
    }

    #[test]
    fn test_static_files_bypass() {
        let guard = guard();
        assert_eq!(guard.classify("/logo.png"), Access::Bypass);
        assert_eq!(guard.classify("/assets/app.min.js"), Access::Bypass);
        assert_eq!(guard.classify("/_next/static/chunk"), Access::Bypass);
    }

    #[test]
    fn test_api_paths_are_always_evaluated() {
        let guard = guard();
        assert_eq!(guard.classify("/api/file.json"), Access::Protected);
        assert_eq!(guard.classify("/trpc/cart.get"), Access::Protected);
    }

    #[test]
    fn test_filter_edge_cases() {
        let filter = RequestFilter;
        assert!(filter.intercepts("/"));
        assert!(filter.intercepts("/.well-known"));
        assert!(filter.intercepts("/v1.2/orders"));
        assert!(!filter.intercepts("/robots.txt"));
    }

    #[test]
    fn test_first_match_wins() {
        let routes = PublicRoutes::new(["/shop(.*)", "/shop/cart"]).unwrap();
        assert_eq!(routes.matching("/shop/cart").map(RoutePattern::as_str), Some("/shop(.*)"));
        assert!(routes.matching("/cart").is_none());
    }

    #[test]
    fn test_pattern_literals_are_escaped() {
        let pattern = RoutePattern::parse("/a.b").unwrap();
        assert!(pattern.matches("/a.b"));
        assert!(!pattern.matches("/axb"));
        assert!(matches!(RoutePattern::parse("cart"), Err(PatternError::NotAbsolute(_))));
    }

    #[test]
    fn test_rejection_shapes() {
        let guard = guard();

        let api = guard.reject("/api/order/list", "/api/order/list");
        assert_eq!(api.status(), StatusCode::UNAUTHORIZED);

        let page = guard.reject("/cart", "/cart?step=2");
        assert_eq!(page.status(), StatusCode::SEE_OTHER);
        assert_eq!(
            page.headers().get(header::LOCATION).unwrap(),
            "/sign-in?redirect_url=%2Fcart%3Fstep%3D2"
        );
    }

    #[test]
    fn test_public_routes_ignore_case() {
        let guard = guard();
        for path in ["/Product/1", "/ALL-PRODUCTS", "/All-Products/"] {
            assert_eq!(guard.classify(path), Access::Public, "{path}");
        }
        assert_eq!(guard.classify("/CART"), Access::Protected);
    }

    #[test]
    fn test_sign_in_page_is_public() {
        let guard = guard();
        assert_eq!(guard.classify("/sign-in"), Access::Public);
        assert_eq!(guard.classify("/sign-in/factor-one"), Access::Public);

        let guard = RouteGuard::new(&GuardConfig {
            sign_in_url: "/auth/login?next=1".to_string(),
            ..GuardConfig::default()
        })
        .unwrap();
        assert_eq!(guard.classify("/auth/login"), Access::Public);
        assert_eq!(guard.classify("/sign-in"), Access::Protected);
    }

    #[test]
    fn test_external_sign_in_adds_no_route() {
        assert_eq!(sign_in_pattern("/sign-in"), Some("/sign-in(.*)".to_string()));
        assert_eq!(sign_in_pattern("https://auth.example/login"), None);
        assert_eq!(sign_in_pattern("//auth.example/login"), None);
    }

    #[test]
    fn test_sign_in_url_with_query() {
        let guard = RouteGuard::new(&GuardConfig {
            sign_in_url: "https://auth.example/login?app=shop".to_string(),
            ..GuardConfig::default()
        })
        .unwrap();
        assert_eq!(
            guard.sign_in_redirect("/cart"),
            "https://auth.example/login?app=shop&redirect_url=%2Fcart"
        );
    }
}
