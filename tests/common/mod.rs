//! Shared request/response builders for integration tests.
#![allow(dead_code)]

use http::{request, response, Method, Request, Response};

pub fn create_test_request(method: Method, headers: &[(&str, &str)]) -> request::Parts {
    let mut builder = Request::builder().method(method).uri("/api/items");
    for (name, value) in headers {
        builder = builder.header(*name, *value);
    }
    builder.body(()).unwrap().into_parts().0
}

pub fn preflight(origin: &str, method: &str) -> request::Parts {
    create_test_request(
        Method::OPTIONS,
        &[("origin", origin), ("access-control-request-method", method)],
    )
}

pub fn preflight_with_headers(origin: &str, method: &str, acrh: &str) -> request::Parts {
    create_test_request(
        Method::OPTIONS,
        &[
            ("origin", origin),
            ("access-control-request-method", method),
            ("access-control-request-headers", acrh),
        ],
    )
}

pub fn create_test_response() -> response::Parts {
    Response::new(()).into_parts().0
}

/// Collects every value of `name`, in insertion order.
pub fn all_values(hdrs: &http::HeaderMap, name: &str) -> Vec<String> {
    hdrs.get_all(name)
        .iter()
        .map(|v| v.to_str().unwrap().to_string())
        .collect()
}
