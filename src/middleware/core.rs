use std::time::Duration;

use http::{request, response, Response};

/// Request/response hook run around a handler
///
/// `before` may answer the request itself; `after` decorates the handler's
/// response.
pub trait Middleware: Send + Sync {
    fn before(&self, _req: &request::Parts) -> Option<Response<()>> {
        None
    }
    fn after(&self, _req: &request::Parts, _res: &mut response::Parts, _latency: Duration) {}
}
