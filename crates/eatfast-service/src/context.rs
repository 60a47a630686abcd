//! Request metadata passed into flows that record where a request came from.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Client details of the current request.
///
/// Built by the HTTP layer; flows use it for logging and to tag OAuth state
/// nonces with the requester address.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RequestContext {
    /// IP address of the request origin.
    pub ip_address: Option<String>,
    /// User-Agent header value.
    pub user_agent: Option<String>,
    /// When the request was received.
    pub request_time: DateTime<Utc>,
}

impl RequestContext {
    /// Creates a new request context.
    pub fn new(ip_address: Option<String>, user_agent: Option<String>) -> Self {
        Self {
            ip_address,
            user_agent,
            request_time: Utc::now(),
        }
    }
}
