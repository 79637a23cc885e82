//! # CLI Module
//!
//! Command-line access to a CORS policy file, for checking a configuration
//! before deploying it.
//!
//! ## Commands
//!
//! ### `validate`
//!
//! Load and compile a policy, reporting the first configuration error:
//!
//! ```bash
//! brrtcors validate --config cors.yaml
//! ```
//!
//! ### `check`
//!
//! Evaluate one request against a policy and print the CORS response
//! headers it would receive. With `--method` the request is a preflight;
//! without it, an actual `GET`.
//!
//! ```bash
//! brrtcors check --config cors.yaml --origin https://app.example.com
//! brrtcors check --config cors.yaml --origin https://app.example.com \
//!     --method PUT --headers content-type,x-request-id
//! ```
//!
//! The exit status is non-zero when the request is rejected.

mod commands;

#[cfg(test)]
mod tests;

pub use commands::{run_cli, Cli, Commands};
