use http::header::HeaderValue;
use http::{Method, StatusCode};
use tracing::{debug, info, warn};

use super::{
    CorsConfigError, CorsMiddleware, HeaderValidation, MethodValidation, MethodVec,
    OriginValidation, MAX_MAX_AGE_SECS,
};
use crate::headers;
use crate::origin::{Corpus, OriginPattern};
use crate::util::SortedSet;

/// `GET, POST, PUT, DELETE, OPTIONS`
pub(crate) fn default_methods() -> MethodVec {
    MethodVec::from_iter([
        Method::GET,
        Method::POST,
        Method::PUT,
        Method::DELETE,
        Method::OPTIONS,
    ])
}

/// Builder for creating `CorsMiddleware` with a fluent API
///
/// Setters only record what they are given; every check happens in
/// [`build`](Self::build), which compiles origins into suffix trees and
/// header names into a sorted set.
///
/// # Example
///
/// ```rust
/// use brrtcors::middleware::CorsMiddlewareBuilder;
/// use http::Method;
///
/// let cors = CorsMiddlewareBuilder::new()
///     .allowed_origins(&["https://example.com", "https://*.example.com"])
///     .allowed_methods(&[Method::GET, Method::POST, Method::PUT])
///     .allowed_headers(&["Content-Type", "Authorization", "X-Custom-Header"])
///     .allow_credentials(true)
///     .expose_headers(&["X-Total-Count", "X-Page-Number"])
///     .max_age(3600) // Cache preflight for 1 hour
///     .build()
///     .expect("Invalid CORS configuration");
/// # assert!(cors.is_origin_allowed("https://api.example.com"));
/// ```
#[derive(Debug, Clone)]
pub struct CorsMiddlewareBuilder {
    allowed_origins: Vec<String>,
    allowed_headers: Vec<String>,
    /// `None` means any method
    allowed_methods: Option<MethodVec>,
    allow_credentials: bool,
    expose_headers: Vec<String>,
    max_age: Option<u32>,
    allow_private_network: bool,
    preflight_status: u16,
}

impl CorsMiddlewareBuilder {
    /// Create a new builder with secure defaults
    ///
    /// Default configuration:
    /// - No origins allowed (empty list)
    /// - Common headers: `["Content-Type", "Authorization"]`
    /// - Common methods: `GET, POST, PUT, DELETE, OPTIONS`
    /// - Credentials: `false`
    /// - Exposed headers: empty
    /// - Max age: `None` (no preflight caching)
    /// - Private-network access: `false`
    /// - Preflight success status: `204`
    #[must_use]
    pub fn new() -> Self {
        Self {
            allowed_origins: vec![],
            allowed_headers: vec!["Content-Type".into(), "Authorization".into()],
            allowed_methods: Some(default_methods()),
            allow_credentials: false,
            expose_headers: vec![],
            max_age: None,
            allow_private_network: false,
            preflight_status: StatusCode::NO_CONTENT.as_u16(),
        }
    }

    /// Set allowed origins
    ///
    /// Each entry is either an exact origin (`https://example.com:8443`), a
    /// subdomain pattern (`https://*.example.com`), a pattern with any port
    /// (`http://localhost:*`), or the lone `*` for any origin (insecure,
    /// rejected together with credentials).
    #[must_use]
    pub fn allowed_origins<S: AsRef<str>>(mut self, origins: &[S]) -> Self {
        self.allowed_origins = origins.iter().map(|s| s.as_ref().to_owned()).collect();
        self
    }

    /// Set allowed HTTP methods
    ///
    /// `GET`, `HEAD` and `POST` are always allowed in preflights.
    #[must_use]
    pub fn allowed_methods(mut self, methods: &[Method]) -> Self {
        self.allowed_methods = Some(methods.iter().cloned().collect());
        self
    }

    /// Allow any method in preflight requests
    #[must_use]
    pub fn allow_any_method(mut self) -> Self {
        self.allowed_methods = None;
        self
    }

    /// Set allowed request headers
    ///
    /// Names are case-insensitive. Use `&["*"]` to allow any header.
    #[must_use]
    pub fn allowed_headers<S: AsRef<str>>(mut self, headers: &[S]) -> Self {
        self.allowed_headers = headers.iter().map(|s| s.as_ref().to_owned()).collect();
        self
    }

    /// Enable or disable credentials
    ///
    /// When enabled, sets `Access-Control-Allow-Credentials: true` header.
    /// **Important**: Cannot be used with wildcard origin (`*`).
    #[must_use]
    pub fn allow_credentials(mut self, allow: bool) -> Self {
        self.allow_credentials = allow;
        self
    }

    /// Set headers to expose to JavaScript
    #[must_use]
    pub fn expose_headers<S: AsRef<str>>(mut self, headers: &[S]) -> Self {
        self.expose_headers = headers.iter().map(|s| s.as_ref().to_owned()).collect();
        self
    }

    /// Set preflight cache duration, at most 86400 seconds
    #[must_use]
    pub fn max_age(mut self, seconds: u32) -> Self {
        self.max_age = Some(seconds);
        self
    }

    /// Grant private-network access to allowed origins that request it
    #[must_use]
    pub fn allow_private_network(mut self, allow: bool) -> Self {
        self.allow_private_network = allow;
        self
    }

    /// Status of successful preflight responses (2xx, default 204)
    #[must_use]
    pub fn preflight_success_status(mut self, status: u16) -> Self {
        self.preflight_status = status;
        self
    }

    /// Build the CORS middleware
    ///
    /// # Errors
    ///
    /// - `WildcardWithCredentials` / `EmptyOriginsWithCredentials` when
    ///   credentials are allowed without explicit origins
    /// - `InvalidOriginPattern` for a malformed origin or pattern
    /// - `InvalidHeaderName` / `InvalidMethod` for names that are not tokens
    /// - `MaxAgeTooLarge`, `PrivateNetworkWithWildcard`,
    ///   `InvalidPreflightStatus`
    pub fn build(self) -> Result<CorsMiddleware, CorsConfigError> {
        let any_origin = self.allowed_origins.iter().any(|o| o == "*");
        if self.allow_credentials {
            if any_origin {
                return Err(CorsConfigError::WildcardWithCredentials);
            }
            if self.allowed_origins.is_empty() {
                return Err(CorsConfigError::EmptyOriginsWithCredentials);
            }
        }
        if self.allow_private_network && any_origin {
            return Err(CorsConfigError::PrivateNetworkWithWildcard);
        }

        // entries next to `*` are still validated
        let patterns = self
            .allowed_origins
            .iter()
            .filter(|o| *o != "*")
            .map(|p| OriginPattern::parse(p))
            .collect::<Result<Vec<_>, _>>()?;
        let origins = if any_origin {
            if !patterns.is_empty() {
                warn!(
                    ignored = patterns.len(),
                    "CORS: \"*\" allows any origin; other origin patterns ignored"
                );
            }
            OriginValidation::Any
        } else {
            for pattern in &patterns {
                debug!(
                    %pattern,
                    scheme = pattern.scheme(),
                    subdomains = pattern.is_wildcard_host(),
                    "CORS origin pattern"
                );
            }
            let mut corpus = Corpus::new();
            corpus.extend(patterns);
            OriginValidation::Patterns(corpus)
        };

        let any_header = self.allowed_headers.iter().any(|h| h == "*");
        let header_names = lowercase_names(self.allowed_headers.iter().filter(|h| *h != "*"))?;
        let allowed_headers = if any_header {
            if !header_names.is_empty() {
                warn!(
                    ignored = ?header_names,
                    "CORS: \"*\" allows any header; other header names ignored"
                );
            }
            HeaderValidation::Any
        } else {
            HeaderValidation::Names(SortedSet::new(header_names))
        };

        let allowed_methods = match self.allowed_methods {
            None => MethodValidation::Any,
            Some(methods) => MethodValidation::List(methods),
        };

        let expose_headers = if self.expose_headers.is_empty() {
            None
        } else {
            let names = lowercase_names(&self.expose_headers)?;
            let joined = names.join(headers::VALUE_SEP);
            // token characters are always valid header-value bytes
            let value = HeaderValue::from_str(&joined)
                .map_err(|_| CorsConfigError::InvalidHeaderName { name: joined })?;
            Some(value)
        };

        let max_age = match self.max_age {
            Some(seconds) if seconds > MAX_MAX_AGE_SECS => {
                return Err(CorsConfigError::MaxAgeTooLarge { seconds });
            }
            Some(seconds) => Some(HeaderValue::from(seconds)),
            None => None,
        };

        let preflight_status = StatusCode::from_u16(self.preflight_status)
            .ok()
            .filter(StatusCode::is_success)
            .ok_or(CorsConfigError::InvalidPreflightStatus {
                status: self.preflight_status,
            })?;

        match (&origins, &allowed_headers) {
            (OriginValidation::Patterns(corpus), HeaderValidation::Names(set)) => info!(
                origin_patterns = corpus.len(),
                allowed_headers = %set,
                credentials = self.allow_credentials,
                "CORS policy built"
            ),
            _ => info!(
                any_origin,
                any_header = matches!(allowed_headers, HeaderValidation::Any),
                credentials = self.allow_credentials,
                "CORS policy built"
            ),
        }

        Ok(CorsMiddleware {
            origins,
            allowed_headers,
            allowed_methods,
            allow_credentials: self.allow_credentials,
            expose_headers,
            max_age,
            allow_private_network: self.allow_private_network,
            preflight_status,
        })
    }
}

impl Default for CorsMiddlewareBuilder {
    fn default() -> Self {
        Self::new()
    }
}

/// Validates header names and lowercases them.
fn lowercase_names<'a>(
    names: impl IntoIterator<Item = &'a String>,
) -> Result<Vec<String>, CorsConfigError> {
    names
        .into_iter()
        .map(|name| {
            if headers::is_valid(name) {
                Ok(name.to_ascii_lowercase())
            } else {
                Err(CorsConfigError::InvalidHeaderName { name: name.clone() })
            }
        })
        .collect()
}

/// Parses method names; `*` is not handled here.
pub(crate) fn parse_methods<S: AsRef<str>>(names: &[S]) -> Result<MethodVec, CorsConfigError> {
    names
        .iter()
        .map(|name| {
            let name = name.as_ref();
            if !crate::util::is_token(name) {
                return Err(CorsConfigError::InvalidMethod { method: name.to_owned() });
            }
            Method::from_bytes(name.as_bytes())
                .map_err(|_| CorsConfigError::InvalidMethod { method: name.to_owned() })
        })
        .collect()
}
