//! Attaches credential resolution to resolved endpoints

use crate::auth::session::{Credentials, SessionAuthenticator};
use crate::endpoint::Endpoint;
use crate::error::Result;
use std::fmt;
use std::sync::Arc;

/// Challenge authorizer shared by every endpoint of one hostname.
///
/// The wire-level authentication handshake belongs to the transfer client;
/// this hands it the credential lookup plus the HTTP client it must use for
/// that handshake, which is always the first endpoint's client.
pub struct Authorizer {
    client: reqwest::Client,
    authenticator: Arc<SessionAuthenticator>,
}

impl Authorizer {
    pub fn new(client: reqwest::Client, authenticator: Arc<SessionAuthenticator>) -> Self {
        Authorizer {
            client,
            authenticator,
        }
    }

    /// Resolve credentials for `host` through the attached sessions.
    pub async fn credentials(&self, host: &str) -> Result<Credentials> {
        self.authenticator.credentials(host).await
    }

    /// Client to perform the authentication handshake with.
    pub fn auth_client(&self) -> &reqwest::Client {
        &self.client
    }
}

impl fmt::Debug for Authorizer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Authorizer").finish_non_exhaustive()
    }
}

/// Attach one shared authorizer, backed by the first endpoint's client, to
/// every endpoint in the list. An empty list passes through untouched.
pub fn with_authorizer(
    mut endpoints: Vec<Endpoint>,
    authenticator: &Arc<SessionAuthenticator>,
) -> Vec<Endpoint> {
    let Some(first) = endpoints.first() else {
        return endpoints;
    };
    let authorizer = Arc::new(Authorizer::new(
        first.client.clone(),
        Arc::clone(authenticator),
    ));
    for endpoint in &mut endpoints {
        endpoint.authorizer = Some(Arc::clone(&authorizer));
    }
    endpoints
}
