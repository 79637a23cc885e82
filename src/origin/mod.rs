//! # Origin Module
//!
//! Parsing of `Origin` header values and of configured origin patterns, and
//! the [`Corpus`] that answers "is this origin allowed?" in time linear in the
//! length of the origin.
//!
//! ## Patterns
//!
//! | Pattern | Matches |
//! |---|---|
//! | `https://example.com` | exactly that origin |
//! | `https://*.example.com` | any subdomain of `example.com` (at any depth), not `example.com` itself |
//! | `http://localhost:8080` | that host on port 8080 only |
//! | `http://localhost:*` | that host on any port, or none |
//!
//! The single pattern `*` (any origin) is handled by the CORS middleware and
//! never reaches this module.
//!
//! ## Matching
//!
//! Patterns are grouped by scheme; each scheme owns a suffix-matching
//! [`radix::Tree`] keyed by host pattern and tagged by port number (`0` when
//! the origin has no explicit port, [`radix::WILDCARD_ELEM`] for `:*`).

pub mod radix;

use std::fmt;

use smallvec::SmallVec;

use crate::middleware::CorsConfigError;
use radix::{Tree, WILDCARD_ELEM};

/// Longest origin worth looking at; anything longer cannot be a configured one.
pub const MAX_ORIGIN_LEN: usize = 4096;

/// A serialized origin as sent by browsers in the `Origin` header.
///
/// Borrows from the header value; parsing does not allocate.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Origin<'a> {
    /// Lowercase scheme, e.g. `https`
    pub scheme: &'a str,
    /// Host as sent, brackets included for IPv6 literals
    pub host: &'a str,
    /// Explicit port, or `0` when absent
    pub port: u16,
}

impl<'a> Origin<'a> {
    /// Parses `s` as `scheme "://" host [ ":" port ]`.
    ///
    /// Returns `None` for `null`, for anything with a path, query, fragment or
    /// userinfo, and for any other malformed value.
    #[must_use]
    pub fn parse(s: &'a str) -> Option<Self> {
        if s.len() > MAX_ORIGIN_LEN {
            return None;
        }
        let (scheme, rest) = s.split_once("://")?;
        if !is_scheme(scheme) {
            return None;
        }
        let (host, port) = split_host_port(rest)?;
        if !is_host(host) {
            return None;
        }
        let port = match port {
            None => 0,
            Some(p) => parse_port(p)?,
        };
        Some(Self { scheme, host, port })
    }
}

/// A configured origin pattern.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OriginPattern {
    scheme: String,
    /// Host, possibly prefixed by `*.`
    host: String,
    /// Port tag: `0` for none, [`WILDCARD_ELEM`] for any
    port: i32,
}

impl OriginPattern {
    /// Parses and validates an origin pattern.
    ///
    /// # Errors
    ///
    /// Returns [`CorsConfigError::InvalidOriginPattern`] with the reason the
    /// pattern was rejected.
    pub fn parse(pattern: &str) -> Result<Self, CorsConfigError> {
        let invalid = |reason: &'static str| CorsConfigError::InvalidOriginPattern {
            pattern: pattern.to_string(),
            reason,
        };

        let (scheme, rest) = pattern
            .split_once("://")
            .ok_or_else(|| invalid("missing \"://\" after scheme"))?;
        if !is_scheme(scheme) {
            return Err(invalid("invalid scheme"));
        }
        let (host, port) = split_host_port(rest).ok_or_else(|| invalid("invalid authority"))?;

        let bare_host = host.strip_prefix("*.").unwrap_or(host);
        if bare_host.contains('*') {
            return Err(invalid("wildcard allowed only as a leading \"*.\" label"));
        }
        if bare_host.len() != host.len() && is_ip_literal(bare_host) {
            return Err(invalid("wildcard not allowed with an IP literal"));
        }
        if bare_host.bytes().any(|b| b.is_ascii_uppercase()) {
            return Err(invalid("host must be lowercase"));
        }
        if !is_host(bare_host) {
            return Err(invalid("invalid host"));
        }

        let port = match port {
            None => 0,
            Some("*") => WILDCARD_ELEM,
            Some(p) => {
                let p = parse_port(p).ok_or_else(|| invalid("invalid port"))?;
                if Some(p) == default_port(scheme) {
                    return Err(invalid("default port must be omitted"));
                }
                i32::from(p)
            }
        };

        Ok(Self {
            scheme: scheme.to_string(),
            host: host.to_string(),
            port,
        })
    }

    /// Reports whether the host part starts with `*.`.
    #[must_use]
    pub fn is_wildcard_host(&self) -> bool {
        self.host.starts_with("*.")
    }

    #[must_use]
    pub fn scheme(&self) -> &str {
        &self.scheme
    }
}

impl fmt::Display for OriginPattern {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}://{}", self.scheme, self.host)?;
        match self.port {
            0 => Ok(()),
            WILDCARD_ELEM => f.write_str(":*"),
            p => write!(f, ":{p}"),
        }
    }
}

/// A set of origin patterns, one suffix tree per scheme.
///
/// Services rarely configure more than `http` and `https`, so trees are kept
/// inline and found by linear scan.
#[derive(Debug, Clone, Default)]
pub struct Corpus {
    trees: SmallVec<[(Box<str>, Tree); 2]>,
    len: usize,
}

impl Corpus {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a pattern to the corpus.
    pub fn add(&mut self, pattern: &OriginPattern) {
        let tree = match self
            .trees
            .iter()
            .position(|(scheme, _)| scheme.as_ref() == pattern.scheme.as_str())
        {
            Some(i) => &mut self.trees[i].1,
            None => {
                self.trees
                    .push((Box::from(pattern.scheme.as_str()), Tree::new()));
                let last = self.trees.len() - 1;
                &mut self.trees[last].1
            }
        };
        tree.insert(&pattern.host, pattern.port);
        self.len += 1;
    }

    /// Reports whether `origin` matches one of the patterns.
    #[must_use]
    pub fn contains(&self, origin: &Origin<'_>) -> bool {
        self.trees
            .iter()
            .find(|(scheme, _)| scheme.as_ref() == origin.scheme)
            .is_some_and(|(_, tree)| tree.contains(origin.host, i32::from(origin.port)))
    }

    /// Number of patterns added so far.
    #[must_use]
    pub fn len(&self) -> usize {
        self.len
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len == 0
    }
}

impl Extend<OriginPattern> for Corpus {
    fn extend<I: IntoIterator<Item = OriginPattern>>(&mut self, iter: I) {
        for pattern in iter {
            self.add(&pattern);
        }
    }
}

/// `scheme = ALPHA *( ALPHA / DIGIT / "+" / "-" / "." )`, lowercase only.
fn is_scheme(s: &str) -> bool {
    let mut bytes = s.bytes();
    bytes.next().is_some_and(|b| b.is_ascii_lowercase())
        && bytes.all(|b| b.is_ascii_lowercase() || b.is_ascii_digit() || b"+-.".contains(&b))
}

/// Splits an authority into host and optional port, without validating either.
fn split_host_port(authority: &str) -> Option<(&str, Option<&str>)> {
    let host_end = if authority.starts_with('[') {
        authority.find(']')? + 1
    } else {
        authority.find(':').unwrap_or(authority.len())
    };
    let (host, after) = authority.split_at(host_end);
    match after {
        "" => Some((host, None)),
        _ => after.strip_prefix(':').map(|port| (host, Some(port))),
    }
}

/// A registered name (`[a-z0-9_-]` labels joined by dots, any case) or a
/// bracketed IPv6 literal.
fn is_host(host: &str) -> bool {
    if let Some(inner) = host.strip_prefix('[') {
        return inner.strip_suffix(']').is_some_and(|ip| {
            ip.len() >= 2 && ip.bytes().all(|b| b.is_ascii_hexdigit() || b == b':' || b == b'.')
        });
    }
    !host.is_empty()
        && host.split('.').all(|label| {
            !label.is_empty()
                && label
                    .bytes()
                    .all(|b| b.is_ascii_alphanumeric() || b == b'-' || b == b'_')
        })
}

/// A bracketed IPv6 literal or a dotted-decimal IPv4 address.
fn is_ip_literal(host: &str) -> bool {
    host.starts_with('[')
        || (!host.is_empty() && host.bytes().all(|b| b.is_ascii_digit() || b == b'.'))
}

/// `1*5DIGIT` without leading zero, in `1..=65535`.
fn parse_port(s: &str) -> Option<u16> {
    if s.is_empty() || s.len() > 5 || s.starts_with('0') || !s.bytes().all(|b| b.is_ascii_digit())
    {
        return None;
    }
    s.parse().ok()
}

fn default_port(scheme: &str) -> Option<u16> {
    match scheme {
        "http" => Some(80),
        "https" => Some(443),
        _ => None,
    }
}
