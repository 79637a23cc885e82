// header consts from `crate::headers` are borrowed for lookups only
#![allow(clippy::borrow_interior_mutable_const)]

mod builder;
mod config;
mod error;

pub use builder::CorsMiddlewareBuilder;
pub use config::{load_config, CorsConfig};
pub use error::CorsConfigError;

use std::time::Duration;

use http::header::HeaderValue;
use http::{request, response, Method, Response, StatusCode};
use smallvec::SmallVec;
use tracing::debug;

use crate::headers::{
    self, ACAC, ACAH, ACAM, ACAO, ACAPN, ACEH, ACMA, ACRH, ACRM, ACRPN, ORIGIN, VALUE_ORIGIN,
    VALUE_TRUE, VALUE_VARY_OPTIONS, VALUE_WILDCARD,
};
use crate::middleware::Middleware;
use crate::origin::{Corpus, Origin};
use crate::util::SortedSet;

/// Browsers cap preflight caching at 24 hours (Firefox) or less.
pub const MAX_MAX_AGE_SECS: u32 = 86_400;

/// Most services allow a handful of methods; keep them inline.
pub(crate) type MethodVec = SmallVec<[Method; 8]>;

/// Origin validation strategy
#[derive(Debug, Clone)]
pub(crate) enum OriginValidation {
    /// Any origin (`*`)
    Any,
    /// Exact and subdomain patterns, one suffix tree per scheme
    Patterns(Corpus),
}

impl OriginValidation {
    fn is_allowed(&self, origin: &str) -> bool {
        match self {
            OriginValidation::Any => true,
            OriginValidation::Patterns(corpus) => {
                Origin::parse(origin).is_some_and(|o| corpus.contains(&o))
            }
        }
    }

    fn is_wildcard(&self) -> bool {
        matches!(self, OriginValidation::Any)
    }
}

/// Request-header validation strategy
#[derive(Debug, Clone)]
pub(crate) enum HeaderValidation {
    /// Any header (`*`); the requested list is echoed back
    Any,
    /// Lowercased allow-list
    Names(SortedSet),
}

impl HeaderValidation {
    fn is_allowed(&self, csv: &str) -> bool {
        match self {
            HeaderValidation::Any => true,
            HeaderValidation::Names(set) => set.subsumes(csv),
        }
    }
}

/// Method validation strategy
#[derive(Debug, Clone)]
pub(crate) enum MethodValidation {
    /// Any method (`*`)
    Any,
    /// Explicit list, compared case-sensitively
    List(MethodVec),
}

impl MethodValidation {
    fn is_allowed(&self, method: &Method) -> bool {
        is_safelisted(method)
            || match self {
                MethodValidation::Any => true,
                MethodValidation::List(methods) => methods.contains(method),
            }
    }
}

/// GET, HEAD and POST never need to be listed in `Access-Control-Allow-Methods`.
fn is_safelisted(method: &Method) -> bool {
    *method == Method::GET || *method == Method::HEAD || *method == Method::POST
}

/// Why a preflight request failed
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PreflightRejection {
    /// The Origin is malformed or not allowed
    Origin,
    /// The requested method is malformed or not allowed
    Method,
    /// The requested headers are not a sorted, deduplicated subset of the
    /// allowed ones
    Headers,
    /// Private-network access was requested but is not allowed
    PrivateNetwork,
}

impl PreflightRejection {
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            PreflightRejection::Origin => "origin not allowed",
            PreflightRejection::Method => "method not allowed",
            PreflightRejection::Headers => "request headers not allowed",
            PreflightRejection::PrivateNetwork => "private-network access not allowed",
        }
    }
}

/// CORS (Cross-Origin Resource Sharing) middleware
///
/// Answers preflight requests and decorates the responses to actual
/// cross-origin requests. All matching structures are built once by
/// [`CorsMiddlewareBuilder`] and only read afterwards, so one instance can be
/// shared by every worker.
///
/// # Matching
///
/// - Origins go through a per-scheme suffix tree: exact origins and
///   `scheme://*.domain` patterns cost time linear in the Origin's length,
///   regardless of how many patterns are configured.
/// - `Access-Control-Request-Headers` is checked in one bounded pass against
///   a sorted set of lowercased names.
///
/// # Usage
///
/// ```rust
/// use brrtcors::middleware::CorsMiddlewareBuilder;
/// use http::Method;
///
/// let cors = CorsMiddlewareBuilder::new()
///     .allowed_origins(&["https://example.com", "https://*.example.com"])
///     .allowed_methods(&[Method::GET, Method::PUT])
///     .allowed_headers(&["Content-Type", "X-Request-Id"])
///     .allow_credentials(true)
///     .build()
///     .expect("valid CORS configuration");
///
/// assert!(cors.is_origin_allowed("https://api.example.com"));
/// assert!(!cors.is_origin_allowed("https://example.org"));
/// assert!(cors.are_headers_allowed("content-type,x-request-id"));
/// ```
#[derive(Debug, Clone)]
pub struct CorsMiddleware {
    pub(crate) origins: OriginValidation,
    pub(crate) allowed_headers: HeaderValidation,
    pub(crate) allowed_methods: MethodValidation,
    pub(crate) allow_credentials: bool,
    pub(crate) expose_headers: Option<HeaderValue>,
    pub(crate) max_age: Option<HeaderValue>,
    pub(crate) allow_private_network: bool,
    pub(crate) preflight_status: StatusCode,
}

impl CorsMiddleware {
    /// Create a permissive CORS middleware for development/testing
    ///
    /// Allows any origin, any method and any request header, without
    /// credentials. **Do not use in production.**
    ///
    /// ```rust
    /// use brrtcors::middleware::CorsMiddleware;
    ///
    /// let cors = CorsMiddleware::permissive();
    /// assert!(cors.is_origin_allowed("https://anything.example"));
    /// ```
    #[must_use]
    pub fn permissive() -> Self {
        Self {
            origins: OriginValidation::Any,
            allowed_headers: HeaderValidation::Any,
            allowed_methods: MethodValidation::Any,
            allow_credentials: false,
            expose_headers: None,
            max_age: None,
            allow_private_network: false,
            preflight_status: StatusCode::NO_CONTENT,
        }
    }

    /// Reports whether `origin` (an `Origin` header value) is allowed.
    #[must_use]
    pub fn is_origin_allowed(&self, origin: &str) -> bool {
        self.origins.is_allowed(origin)
    }

    /// Reports whether an `Access-Control-Request-Headers` value is allowed.
    ///
    /// The value must list lowercase names, sorted, without duplicates or
    /// whitespace, as browsers send it.
    #[must_use]
    pub fn are_headers_allowed(&self, csv: &str) -> bool {
        self.allowed_headers.is_allowed(csv)
    }

    /// Reports whether a preflight may request `method`.
    #[must_use]
    pub fn is_method_allowed(&self, method: &Method) -> bool {
        self.allowed_methods.is_allowed(method)
    }

    /// Whether responses must not depend on the request's Origin.
    fn is_public(&self) -> bool {
        self.origins.is_wildcard() && !self.allow_credentials
    }

    fn allow_origin_value(&self, origin: &HeaderValue) -> HeaderValue {
        if self.is_public() {
            VALUE_WILDCARD
        } else {
            origin.clone()
        }
    }

    /// Check a preflight request against the configured policy.
    ///
    /// # Errors
    ///
    /// Returns the first reason the preflight must fail.
    pub fn check_preflight(&self, req: &request::Parts) -> Result<(), PreflightRejection> {
        let origin = headers::first_str(&req.headers, &ORIGIN).ok_or(PreflightRejection::Origin)?;
        if !self.is_origin_allowed(origin) {
            return Err(PreflightRejection::Origin);
        }

        let method = headers::first(&req.headers, &ACRM)
            .and_then(|(v, _)| Method::from_bytes(v.as_bytes()).ok())
            .ok_or(PreflightRejection::Method)?;
        if !self.is_method_allowed(&method) {
            return Err(PreflightRejection::Method);
        }

        if let Some((acrh, _)) = headers::first(&req.headers, &ACRH) {
            let acrh = acrh.to_str().map_err(|_| PreflightRejection::Headers)?;
            if !self.are_headers_allowed(acrh) {
                return Err(PreflightRejection::Headers);
            }
        }

        if requests_private_network(req) && !self.allow_private_network {
            return Err(PreflightRejection::PrivateNetwork);
        }
        Ok(())
    }

    /// Build the response to a preflight request
    ///
    /// Success yields the configured status (204 by default) with the
    /// `Access-Control-Allow-*` headers; failure yields 403 without any of
    /// them. Both vary on the preflight request headers.
    fn handle_preflight(&self, req: &request::Parts) -> Response<()> {
        let mut res = Response::new(());
        headers::add_vary(res.headers_mut(), VALUE_VARY_OPTIONS);

        if let Err(rejection) = self.check_preflight(req) {
            debug!(
                origin = ?req.headers.get(&ORIGIN),
                method = ?req.headers.get(&ACRM),
                reason = rejection.as_str(),
                "CORS preflight rejected"
            );
            *res.status_mut() = StatusCode::FORBIDDEN;
            return res;
        }

        *res.status_mut() = self.preflight_status;
        let hdrs = res.headers_mut();
        if let Some((origin, _)) = headers::first(&req.headers, &ORIGIN) {
            hdrs.insert(ACAO, self.allow_origin_value(origin));
        }
        if self.allow_credentials {
            hdrs.insert(ACAC, VALUE_TRUE);
        }
        if requests_private_network(req) {
            hdrs.insert(ACAPN, VALUE_TRUE);
        }
        if let Some((acrm, _)) = headers::first(&req.headers, &ACRM) {
            let safelisted = Method::from_bytes(acrm.as_bytes()).is_ok_and(|m| is_safelisted(&m));
            if !safelisted {
                hdrs.insert(ACAM, acrm.clone());
            }
        }
        if let Some((acrh, _)) = headers::first(&req.headers, &ACRH) {
            // validated against the allow-list above
            if !acrh.is_empty() {
                hdrs.insert(ACAH, acrh.clone());
            }
        }
        if let Some(max_age) = &self.max_age {
            hdrs.insert(ACMA, max_age.clone());
        }
        res
    }
}

/// A preflight is one `OPTIONS` request carrying `Access-Control-Request-Method`.
fn is_preflight(req: &request::Parts) -> bool {
    req.method == Method::OPTIONS && req.headers.contains_key(&ACRM)
}

fn requests_private_network(req: &request::Parts) -> bool {
    headers::first(&req.headers, &ACRPN).is_some_and(|(v, _)| v == "true")
}

/// Default CORS policy - secure by default
///
/// No origin is allowed until configured. Methods and headers mirror
/// [`CorsMiddlewareBuilder::new`].
impl Default for CorsMiddleware {
    fn default() -> Self {
        Self {
            origins: OriginValidation::Patterns(Corpus::new()),
            allowed_headers: HeaderValidation::Names(SortedSet::new(["authorization", "content-type"])),
            allowed_methods: MethodValidation::List(builder::default_methods()),
            allow_credentials: false,
            expose_headers: None,
            max_age: None,
            allow_private_network: false,
            preflight_status: StatusCode::NO_CONTENT,
        }
    }
}

impl Middleware for CorsMiddleware {
    /// Answer CORS preflight requests
    ///
    /// Returns `Some(response)` for preflights that carry an Origin (success
    /// or 403), `None` for everything else, including `OPTIONS` requests that
    /// are not preflights.
    fn before(&self, req: &request::Parts) -> Option<Response<()>> {
        if !is_preflight(req) || !req.headers.contains_key(&ORIGIN) {
            return None;
        }
        Some(self.handle_preflight(req))
    }

    /// Add CORS headers to the response of an actual request
    ///
    /// Actual requests are never rejected here: without the
    /// `Access-Control-Allow-Origin` header the browser withholds the
    /// response from the calling script.
    ///
    /// # Headers Added
    ///
    /// - `Access-Control-Allow-Origin`: the request's Origin, or `*` for a
    ///   public policy
    /// - `Access-Control-Allow-Credentials`: when credentials are allowed
    /// - `Access-Control-Expose-Headers`: when configured
    /// - `Vary: Origin`: unless the policy is public
    fn after(&self, req: &request::Parts, res: &mut response::Parts, _latency: Duration) {
        if !self.is_public() {
            headers::add_vary(&mut res.headers, VALUE_ORIGIN);
        }
        let Some((origin, _)) = headers::first(&req.headers, &ORIGIN) else {
            return;
        };
        let allowed = origin.to_str().is_ok_and(|o| self.is_origin_allowed(o));
        if !allowed {
            debug!(origin = ?origin, "CORS: origin not allowed, no CORS headers added");
            return;
        }

        res.headers.insert(ACAO, self.allow_origin_value(origin));
        if self.allow_credentials {
            res.headers.insert(ACAC, VALUE_TRUE);
        }
        if let Some(expose) = &self.expose_headers {
            res.headers.insert(ACEH, expose.clone());
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use http::Request;

    fn preflight(origin: &str, method: &str, acrh: Option<&str>) -> request::Parts {
        let mut builder = Request::builder()
            .method(Method::OPTIONS)
            .uri("/resource")
            .header(ORIGIN, origin)
            .header(ACRM, method);
        if let Some(acrh) = acrh {
            builder = builder.header(ACRH, acrh);
        }
        builder.body(()).unwrap().into_parts().0
    }

    fn cors() -> CorsMiddleware {
        CorsMiddlewareBuilder::new()
            .allowed_origins(&["https://example.com", "https://*.example.com"])
            .allowed_methods(&[Method::GET, Method::PUT])
            .allowed_headers(&["Content-Type", "X-Custom", "Authorization"])
            .build()
            .unwrap()
    }

    #[test]
    fn test_check_preflight_reasons() {
        let cors = cors();
        assert_eq!(cors.check_preflight(&preflight("https://a.example.com", "PUT", None)), Ok(()));
        assert_eq!(
            cors.check_preflight(&preflight("https://example.org", "PUT", None)),
            Err(PreflightRejection::Origin)
        );
        assert_eq!(
            cors.check_preflight(&preflight("https://example.com", "DELETE", None)),
            Err(PreflightRejection::Method)
        );
        assert_eq!(
            cors.check_preflight(&preflight("https://example.com", "PUT", Some("x-custom,content-type"))),
            Err(PreflightRejection::Headers)
        );
        assert_eq!(
            cors.check_preflight(&preflight("https://example.com", "PUT", Some("content-type,x-custom"))),
            Ok(())
        );
    }

    #[test]
    fn test_safelisted_methods_always_allowed() {
        let cors = cors();
        assert!(cors.is_method_allowed(&Method::POST));
        assert!(cors.is_method_allowed(&Method::HEAD));
        assert!(!cors.is_method_allowed(&Method::PATCH));
    }

    #[test]
    fn test_default_allows_no_origin() {
        let cors = CorsMiddleware::default();
        assert!(!cors.is_origin_allowed("https://example.com"));
        assert!(cors.are_headers_allowed("authorization,content-type"));
        assert!(!cors.is_public());
    }

    #[test]
    fn test_permissive_is_public() {
        let cors = CorsMiddleware::permissive();
        assert!(cors.is_public());
        assert!(cors.is_method_allowed(&Method::from_bytes(b"PURGE").unwrap()));
        assert!(cors.are_headers_allowed("anything,goes"));
    }

    #[test]
    fn test_rejection_messages() {
        assert_eq!(PreflightRejection::Origin.as_str(), "origin not allowed");
        assert_eq!(PreflightRejection::Headers.as_str(), "request headers not allowed");
    }
}
