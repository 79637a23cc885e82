//! # brrtcors
//!
//! **brrtcors** is the matching core of a CORS (Cross-Origin Resource
//! Sharing) middleware: it decides, in time linear in the request's header
//! values and independent of the policy's size, whether a cross-origin
//! request is allowed, and writes the matching response headers.
//!
//! ## Architecture
//!
//! - **[`origin::radix`]** - right-to-left compressed trie matching hosts
//!   against exact and `*.domain` patterns, each tagged with a port
//! - **[`origin`]** - Origin and origin-pattern parsing; one tree per scheme
//! - **[`util`]** - HTTP token validation and the sorted set that checks
//!   `Access-Control-Request-Headers` in a single bounded pass
//! - **[`headers`]** - CORS header names and values, `HeaderMap` helpers
//! - **[`middleware`]** - the CORS policy, its builder and its file form
//! - **[`logging`]** - `tracing` subscriber setup
//! - **[`cli`]** - the `brrtcors` command
//!
//! ## Example
//!
//! ```rust
//! use brrtcors::middleware::{CorsMiddlewareBuilder, Middleware};
//! use http::{Method, Request, StatusCode};
//!
//! let cors = CorsMiddlewareBuilder::new()
//!     .allowed_origins(&["https://*.example.com"])
//!     .allowed_methods(&[Method::PUT])
//!     .build()?;
//!
//! let (req, ()) = Request::builder()
//!     .method(Method::OPTIONS)
//!     .uri("/items/1")
//!     .header("origin", "https://app.example.com")
//!     .header("access-control-request-method", "PUT")
//!     .body(())?
//!     .into_parts();
//!
//! let res = cors.before(&req).expect("preflight is answered");
//! assert_eq!(res.status(), StatusCode::NO_CONTENT);
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```

pub mod cli;
pub mod headers;
pub mod logging;
pub mod middleware;
pub mod origin;
pub mod util;
