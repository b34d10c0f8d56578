//! Per-request context.

use uuid::Uuid;

/// Context passed explicitly into every service operation.
///
/// Created once per inbound request and dropped with it. Holds no
/// mutable state; the store owns everything that outlives a request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RequestContext {
    /// Correlates log lines emitted while serving one request.
    pub request_id: Uuid,
}

impl RequestContext {
    /// Create a context with a fresh UUIDv7 request id.
    pub fn new() -> Self {
        Self {
            request_id: Uuid::now_v7(),
        }
    }
}

impl Default for RequestContext {
    fn default() -> Self {
        Self::new()
    }
}
