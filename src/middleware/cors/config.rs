use std::path::Path;

use anyhow::Context;
use serde::{Deserialize, Serialize};
use tracing::warn;

use super::builder::parse_methods;
use super::{CorsConfigError, CorsMiddleware, CorsMiddlewareBuilder};

/// File form of a CORS policy
///
/// Every key is optional; missing keys take the [`CorsMiddlewareBuilder`]
/// defaults.
///
/// ```yaml
/// allowedOrigins:
///   - https://example.com
///   - https://*.example.com
/// allowedMethods: [GET, PUT, DELETE]
/// allowedHeaders: [Content-Type, Authorization]
/// allowCredentials: true
/// maxAge: 3600
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default, deny_unknown_fields)]
pub struct CorsConfig {
    pub allowed_origins: Vec<String>,
    /// `None` keeps the default methods; `["*"]` allows any method
    pub allowed_methods: Option<Vec<String>>,
    /// `None` keeps the default headers; `["*"]` allows any header
    pub allowed_headers: Option<Vec<String>>,
    pub allow_credentials: bool,
    pub expose_headers: Vec<String>,
    pub max_age: Option<u32>,
    pub allow_private_network: bool,
    pub preflight_success_status: Option<u16>,
}

impl CorsConfig {
    /// Convert into a builder, parsing method names
    ///
    /// # Errors
    ///
    /// Returns `CorsConfigError::InvalidMethod` for a method that is not a
    /// token.
    pub fn into_builder(self) -> Result<CorsMiddlewareBuilder, CorsConfigError> {
        let mut builder = CorsMiddlewareBuilder::new()
            .allowed_origins(&self.allowed_origins)
            .allow_credentials(self.allow_credentials)
            .expose_headers(&self.expose_headers)
            .allow_private_network(self.allow_private_network);

        if let Some(methods) = &self.allowed_methods {
            if methods.iter().any(|m| m == "*") {
                if methods.len() > 1 {
                    warn!(?methods, "CORS: \"*\" allows any method; other entries ignored");
                }
                builder = builder.allow_any_method();
            } else {
                builder = builder.allowed_methods(&parse_methods(methods)?);
            }
        }
        if let Some(headers) = &self.allowed_headers {
            builder = builder.allowed_headers(headers);
        }
        if let Some(seconds) = self.max_age {
            builder = builder.max_age(seconds);
        }
        if let Some(status) = self.preflight_success_status {
            builder = builder.preflight_success_status(status);
        }
        Ok(builder)
    }

    /// Validate and compile the policy
    ///
    /// # Errors
    ///
    /// See [`CorsMiddlewareBuilder::build`].
    pub fn build(self) -> Result<CorsMiddleware, CorsConfigError> {
        self.into_builder()?.build()
    }
}

/// Load a [`CorsConfig`] from a YAML (`.yaml`/`.yml`) or JSON file
///
/// # Errors
///
/// Fails when the file cannot be read or does not deserialize.
pub fn load_config(path: impl AsRef<Path>) -> anyhow::Result<CorsConfig> {
    let path = path.as_ref();
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("failed to read CORS config {}", path.display()))?;
    let is_yaml = matches!(
        path.extension().and_then(|e| e.to_str()),
        Some("yaml" | "yml")
    );
    let config = if is_yaml {
        serde_yaml::from_str(&content)
            .with_context(|| format!("invalid YAML in {}", path.display()))?
    } else {
        serde_json::from_str(&content)
            .with_context(|| format!("invalid JSON in {}", path.display()))?
    };
    Ok(config)
}

#[cfg(test)]
mod tests {
    use super::*;
    use http::Method;

    #[test]
    fn test_empty_yaml_uses_defaults() {
        let config: CorsConfig = serde_yaml::from_str("{}").unwrap();
        assert_eq!(config, CorsConfig::default());
        let cors = config.build().unwrap();
        assert!(!cors.is_origin_allowed("https://example.com"));
        assert!(cors.is_method_allowed(&Method::DELETE));
        assert!(!cors.is_method_allowed(&Method::PATCH));
    }

    #[test]
    fn test_camel_case_keys() {
        let config: CorsConfig = serde_json::from_str(
            r#"{
                "allowedOrigins": ["https://*.example.com"],
                "allowedMethods": ["PATCH"],
                "allowedHeaders": ["X-Custom"],
                "allowCredentials": true,
                "maxAge": 600,
                "allowPrivateNetwork": true,
                "preflightSuccessStatus": 200
            }"#,
        )
        .unwrap();
        let cors = config.build().unwrap();
        assert!(cors.is_origin_allowed("https://a.example.com"));
        assert!(cors.is_method_allowed(&Method::PATCH));
        assert!(cors.are_headers_allowed("x-custom"));
        assert_eq!(cors.max_age.unwrap(), "600");
    }

    #[test]
    fn test_unknown_key_rejected() {
        let err = serde_yaml::from_str::<CorsConfig>("allowedOrigin: [x]").unwrap_err();
        assert!(err.to_string().contains("allowedOrigin"));
    }

    #[test]
    fn test_any_method() {
        let config = CorsConfig {
            allowed_methods: Some(vec!["*".into()]),
            ..CorsConfig::default()
        };
        assert!(config.build().unwrap().is_method_allowed(&Method::from_bytes(b"PURGE").unwrap()));
    }

    #[test]
    fn test_invalid_method() {
        let config = CorsConfig {
            allowed_methods: Some(vec!["GET".into(), "NOT VALID".into()]),
            ..CorsConfig::default()
        };
        assert_eq!(
            config.build().unwrap_err(),
            CorsConfigError::InvalidMethod { method: "NOT VALID".into() }
        );
    }
}
