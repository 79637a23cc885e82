use std::fmt;

/// CORS configuration error
///
/// Returned by `CorsMiddlewareBuilder::build()` (and `CorsConfig::build()`)
/// when the configuration is invalid or violates CORS requirements. All
/// validation happens at build time; nothing on the request path can fail.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CorsConfigError {
    /// Wildcard origin (`*`) cannot be used with credentials
    WildcardWithCredentials,
    /// Invalid origin pattern
    ///
    /// The pattern does not match `scheme://host[:port]`, with an optional
    /// leading `*.` in the host and an optional `*` port.
    InvalidOriginPattern {
        /// The rejected pattern
        pattern: String,
        /// Why it was rejected
        reason: &'static str,
    },
    /// Header name is not a valid HTTP token
    InvalidHeaderName {
        /// The rejected name
        name: String,
    },
    /// Method name is not a valid HTTP token
    InvalidMethod {
        /// The rejected method
        method: String,
    },
    /// Empty origins list with credentials
    EmptyOriginsWithCredentials,
    /// Max age above the 24h cap browsers enforce anyway
    MaxAgeTooLarge {
        /// The configured value, in seconds
        seconds: u32,
    },
    /// Private-network access cannot be granted to any origin
    PrivateNetworkWithWildcard,
    /// Preflight success status outside 200..=299
    InvalidPreflightStatus {
        /// The configured status code
        status: u16,
    },
}

impl fmt::Display for CorsConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CorsConfigError::WildcardWithCredentials => {
                write!(
                    f,
                    "CORS configuration error: Cannot use wildcard origin (*) with credentials. \
                    When allow_credentials is true, you must specify explicit origin patterns."
                )
            }
            CorsConfigError::InvalidOriginPattern { pattern, reason } => {
                write!(
                    f,
                    "CORS configuration error: Invalid origin pattern '{}': {}. \
                    Expected format: scheme://host[:port] (e.g., https://*.example.com)",
                    pattern, reason
                )
            }
            CorsConfigError::InvalidHeaderName { name } => {
                write!(f, "CORS configuration error: Invalid header name '{}'", name)
            }
            CorsConfigError::InvalidMethod { method } => {
                write!(f, "CORS configuration error: Invalid method '{}'", method)
            }
            CorsConfigError::EmptyOriginsWithCredentials => {
                write!(
                    f,
                    "CORS configuration error: Cannot use credentials with empty origins list. \
                    When allow_credentials is true, at least one origin must be specified."
                )
            }
            CorsConfigError::MaxAgeTooLarge { seconds } => {
                write!(
                    f,
                    "CORS configuration error: max age {} exceeds the maximum of {} seconds",
                    seconds,
                    super::MAX_MAX_AGE_SECS
                )
            }
            CorsConfigError::PrivateNetworkWithWildcard => {
                write!(
                    f,
                    "CORS configuration error: Cannot allow private-network access \
                    with wildcard origin (*)."
                )
            }
            CorsConfigError::InvalidPreflightStatus { status } => {
                write!(
                    f,
                    "CORS configuration error: preflight success status {} is not a 2xx status",
                    status
                )
            }
        }
    }
}

impl std::error::Error for CorsConfigError {}
