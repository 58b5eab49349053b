//! Shared HTTP transport settings for registry clients

use crate::error::Result;
use std::time::Duration;

const CONNECT_TIMEOUT: Duration = Duration::from_secs(30);
const TCP_KEEPALIVE: Duration = Duration::from_secs(30);
const POOL_IDLE_TIMEOUT: Duration = Duration::from_secs(30);

/// Client builder with the transport defaults every endpoint shares.
///
/// Connection reuse is disabled so each request dials a fresh connection,
/// and HTTP/2 is kept off: its per-stream flow control caps upload
/// throughput on large blob pushes.
pub(crate) fn client_builder() -> reqwest::ClientBuilder {
    reqwest::Client::builder()
        .connect_timeout(CONNECT_TIMEOUT)
        .tcp_keepalive(TCP_KEEPALIVE)
        .pool_idle_timeout(POOL_IDLE_TIMEOUT)
        .pool_max_idle_per_host(0)
        .http1_only()
}

/// Build a client with the default transport settings and no extra trust
/// material.
pub fn default_client() -> Result<reqwest::Client> {
    Ok(client_builder().build()?)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_client_builds() {
        default_client().unwrap();
    }
}
