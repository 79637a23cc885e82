//! Header names, constant values and allocation-light helpers over
//! [`http::HeaderMap`] used on the request hot path.

// `HeaderName`/`HeaderValue` consts hold `Bytes` built from static data, as
// the `http` crate's own `header::*` consts do; nothing is mutated through them.
#![allow(clippy::declare_interior_mutable_const, clippy::borrow_interior_mutable_const)]

use http::header::{self, Entry, HeaderMap, HeaderName, HeaderValue};

use crate::util;

// common request headers
pub const ORIGIN: HeaderName = header::ORIGIN;

// preflight-only request headers
pub const ACRPN: HeaderName = HeaderName::from_static("access-control-request-private-network");
pub const ACRM: HeaderName = header::ACCESS_CONTROL_REQUEST_METHOD;
pub const ACRH: HeaderName = header::ACCESS_CONTROL_REQUEST_HEADERS;

// common response headers
pub const ACAO: HeaderName = header::ACCESS_CONTROL_ALLOW_ORIGIN;
pub const ACAC: HeaderName = header::ACCESS_CONTROL_ALLOW_CREDENTIALS;

// preflight-only response headers
pub const ACAPN: HeaderName = HeaderName::from_static("access-control-allow-private-network");
pub const ACAM: HeaderName = header::ACCESS_CONTROL_ALLOW_METHODS;
pub const ACAH: HeaderName = header::ACCESS_CONTROL_ALLOW_HEADERS;
pub const ACMA: HeaderName = header::ACCESS_CONTROL_MAX_AGE;

// actual-only response headers
pub const ACEH: HeaderName = header::ACCESS_CONTROL_EXPOSE_HEADERS;

pub const VARY: HeaderName = header::VARY;

pub const VALUE_TRUE: HeaderValue = HeaderValue::from_static("true");
pub const VALUE_WILDCARD: HeaderValue = HeaderValue::from_static("*");
pub const VALUE_ORIGIN: HeaderValue = HeaderValue::from_static("Origin");
pub const VALUE_VARY_OPTIONS: HeaderValue = HeaderValue::from_static(
    "Access-Control-Request-Headers, Access-Control-Request-Method, \
     Access-Control-Request-Private-Network, Origin",
);

pub const VALUE_SEP: &str = ",";

/// Reports whether `name` is a valid header name per the Fetch standard.
#[inline]
#[must_use]
pub fn is_valid(name: &str) -> bool {
    util::is_token(name)
}

/// Adds `value` under `name`: installs it as the sole value when `name` is
/// absent, appends it to the existing values otherwise.
///
/// Constant values built with `HeaderValue::from_static` are moved in as is,
/// so the fast path does not copy.
#[inline]
pub fn add(hdrs: &mut HeaderMap, name: HeaderName, value: HeaderValue) {
    match hdrs.entry(name) {
        Entry::Vacant(e) => {
            e.insert(value);
        }
        Entry::Occupied(mut e) => e.append(value),
    }
}

/// [`add`] specialised to `Vary`.
#[inline]
pub fn add_vary(hdrs: &mut HeaderMap, value: HeaderValue) {
    add(hdrs, VARY, value);
}

/// Returns the first value of `name`, both by reference and as a singleton
/// slice, or `None` when `name` is absent.
///
/// The slice view lets callers copy the value into another map without
/// looking it up twice.
#[inline]
#[must_use]
pub fn first<'a>(hdrs: &'a HeaderMap, name: &HeaderName) -> Option<(&'a HeaderValue, &'a [HeaderValue])> {
    hdrs.get(name).map(|v| (v, std::slice::from_ref(v)))
}

/// [`first`] narrowed to values that are visible ASCII.
#[inline]
#[must_use]
pub fn first_str<'a>(hdrs: &'a HeaderMap, name: &HeaderName) -> Option<&'a str> {
    first(hdrs, name).and_then(|(v, _)| v.to_str().ok())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_add_vary_installs_then_appends() {
        let mut hdrs = HeaderMap::new();
        add_vary(&mut hdrs, VALUE_ORIGIN);
        assert_eq!(hdrs.get_all(VARY).iter().count(), 1);
        assert_eq!(hdrs.get(VARY), Some(&VALUE_ORIGIN));

        add_vary(&mut hdrs, VALUE_VARY_OPTIONS);
        let all: Vec<_> = hdrs.get_all(VARY).iter().collect();
        assert_eq!(all, vec![&VALUE_ORIGIN, &VALUE_VARY_OPTIONS]);
    }

    #[test]
    fn test_add_keeps_existing_values() {
        let mut hdrs = HeaderMap::new();
        hdrs.insert(VARY, HeaderValue::from_static("Accept-Encoding"));
        add_vary(&mut hdrs, VALUE_ORIGIN);
        let all: Vec<_> = hdrs.get_all(VARY).iter().map(|v| v.to_str().unwrap()).collect();
        assert_eq!(all, vec!["Accept-Encoding", "Origin"]);
    }

    #[test]
    fn test_first() {
        let mut hdrs = HeaderMap::new();
        assert!(first(&hdrs, &ORIGIN).is_none());

        hdrs.append(ORIGIN, HeaderValue::from_static("https://a.example"));
        hdrs.append(ORIGIN, HeaderValue::from_static("https://b.example"));
        let (v, sgl) = first(&hdrs, &ORIGIN).unwrap();
        assert_eq!(v, "https://a.example");
        assert_eq!(sgl.len(), 1);
        assert_eq!(&sgl[0], v);
        assert_eq!(first_str(&hdrs, &ORIGIN), Some("https://a.example"));
    }

    #[test]
    fn test_first_str_rejects_opaque_bytes() {
        let mut hdrs = HeaderMap::new();
        hdrs.insert(ORIGIN, HeaderValue::from_bytes(b"https://\xffexample").unwrap());
        assert!(first(&hdrs, &ORIGIN).is_some());
        assert!(first_str(&hdrs, &ORIGIN).is_none());
    }

    #[test]
    fn test_is_valid() {
        assert!(is_valid("X-Custom"));
        assert!(!is_valid("X Custom"));
        assert!(!is_valid(""));
    }
}
