use std::io::Write;
use std::path::{Path, PathBuf};
use std::time::Duration;

use anyhow::Context;
use clap::{Parser, Subcommand};
use http::{Method, Request, Response};
use tracing::debug;

use crate::headers::{ACRH, ACRM, ACRPN, ORIGIN};
use crate::middleware::{load_config, CorsMiddleware, Middleware};

/// Command-line interface for brrtcors
#[derive(Parser, Debug)]
#[command(name = "brrtcors", version)]
#[command(about = "Validate CORS policies and evaluate requests against them", long_about = None)]
pub struct Cli {
    /// The subcommand to execute
    #[command(subcommand)]
    pub command: Commands,
}

/// Available CLI commands
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Load and compile a CORS policy file
    Validate {
        /// Path to the policy file (YAML or JSON)
        #[arg(short, long)]
        config: PathBuf,
    },
    /// Evaluate a request against a CORS policy file
    Check {
        /// Path to the policy file (YAML or JSON)
        #[arg(short, long)]
        config: PathBuf,

        /// Value of the request's Origin header
        #[arg(short, long)]
        origin: String,

        /// Access-Control-Request-Method; makes the request a preflight
        #[arg(short, long)]
        method: Option<String>,

        /// Access-Control-Request-Headers, as a browser sends it
        #[arg(long, requires = "method")]
        headers: Option<String>,

        /// Request private-network access
        #[arg(long, default_value_t = false, requires = "method")]
        private_network: bool,
    },
}

/// Run a parsed command, writing the report to `out`
///
/// Returns whether the request (or the policy, for `validate`) was accepted.
///
/// # Errors
///
/// Fails when the policy file cannot be loaded or compiled, or when the
/// request cannot be represented.
pub fn run_cli(cli: &Cli, out: &mut impl Write) -> anyhow::Result<bool> {
    match &cli.command {
        Commands::Validate { config } => {
            load_policy(config)?;
            writeln!(out, "{}: ok", config.display())?;
            Ok(true)
        }
        Commands::Check {
            config,
            origin,
            method,
            headers,
            private_network,
        } => {
            let cors = load_policy(config)?;
            let mut req = Request::builder().header(ORIGIN, origin.as_str());
            req = match method {
                Some(method) => {
                    let mut req = req.method(Method::OPTIONS).header(ACRM, method.as_str());
                    if let Some(headers) = headers {
                        req = req.header(ACRH, headers.as_str());
                    }
                    if *private_network {
                        req = req.header(ACRPN, "true");
                    }
                    req
                }
                None => req.method(Method::GET),
            };
            let (parts, ()) = req
                .uri("/")
                .body(())
                .context("request headers are not valid header values")?
                .into_parts();

            let allowed = match cors.before(&parts) {
                Some(res) => {
                    let allowed = res.status().is_success();
                    report(out, &res, allowed)?;
                    allowed
                }
                None => {
                    let (mut res, ()) = Response::new(()).into_parts();
                    cors.after(&parts, &mut res, Duration::ZERO);
                    let res = Response::from_parts(res, ());
                    let allowed = res.headers().contains_key(crate::headers::ACAO);
                    report(out, &res, allowed)?;
                    allowed
                }
            };
            debug!(origin = %origin, allowed, "CORS check complete");
            Ok(allowed)
        }
    }
}

fn load_policy(path: &Path) -> anyhow::Result<CorsMiddleware> {
    let config = load_config(path)?;
    config
        .build()
        .with_context(|| format!("invalid CORS policy in {}", path.display()))
}

fn report(out: &mut impl Write, res: &Response<()>, allowed: bool) -> anyhow::Result<()> {
    writeln!(out, "{} {}", if allowed { "ALLOWED" } else { "REJECTED" }, res.status())?;
    for (name, value) in res.headers() {
        writeln!(out, "{}: {}", name, String::from_utf8_lossy(value.as_bytes()))?;
    }
    Ok(())
}
