//! Request middleware: the [`Middleware`] hook trait and the CORS policy
//! built on it.

mod core;
mod cors;

pub use core::Middleware;
pub use cors::{
    load_config, CorsConfig, CorsConfigError, CorsMiddleware, CorsMiddlewareBuilder,
    PreflightRejection, MAX_MAX_AGE_SECS,
};
