//! Hostname resolution into authenticated endpoint lists

use crate::auth::{self, SessionAuthenticator};
use crate::endpoint::{self, Endpoint, RegistryHosts};
use crate::error::Result;
use std::sync::Arc;
use tracing::debug;

/// Resolves registry hostnames into endpoint lists with session-backed
/// authorization attached.
///
/// ```no_run
/// use registry_endpoints::{
///     CredentialFn, Credentials, RegistryConfig, RegistryHosts, Resolver, SessionAuthenticator,
/// };
/// use std::collections::HashMap;
/// use std::sync::Arc;
///
/// # async fn example() -> registry_endpoints::Result<()> {
/// let mut configs = HashMap::new();
/// configs.insert(
///     "registry.example".to_string(),
///     RegistryConfig::default().with_mirrors(["mirror.example"]),
/// );
///
/// let authenticator = Arc::new(SessionAuthenticator::new(Arc::new(CredentialFn::new(
///     |_host| {
///         Ok(Credentials {
///             username: "ci".to_string(),
///             secret: "token".to_string(),
///         })
///     },
/// ))));
///
/// let resolver = Resolver::new(RegistryHosts::new(configs), authenticator);
/// for endpoint in resolver.endpoints("registry.example").await? {
///     println!("{}://{}{}", endpoint.scheme, endpoint.host, endpoint.path);
/// }
/// # Ok(())
/// # }
/// ```
pub struct Resolver {
    hosts: RegistryHosts,
    authenticator: Arc<SessionAuthenticator>,
}

impl Resolver {
    pub fn new(hosts: RegistryHosts, authenticator: Arc<SessionAuthenticator>) -> Self {
        Resolver {
            hosts,
            authenticator,
        }
    }

    /// Configured endpoints for `host`, each carrying the shared authorizer.
    ///
    /// A host without configuration resolves to an empty list; deciding
    /// whether that is an error belongs to the caller.
    pub async fn endpoints(&self, host: &str) -> Result<Vec<Endpoint>> {
        let endpoints = self.hosts.endpoints(host).await?;
        Ok(auth::with_authorizer(endpoints, &self.authenticator))
    }

    /// Like [`Resolver::endpoints`], but a host without configuration falls
    /// back to its default public endpoint instead of an empty list.
    pub async fn endpoints_or_default(&self, host: &str) -> Result<Vec<Endpoint>> {
        let endpoints = self.endpoints(host).await?;
        if !endpoints.is_empty() {
            return Ok(endpoints);
        }

        debug!(host, "no registry configuration, using default endpoint");
        let fallback = vec![endpoint::default_endpoint(host)?];
        Ok(auth::with_authorizer(fallback, &self.authenticator))
    }

    /// Shared authenticator, for attaching further sessions.
    pub fn authenticator(&self) -> &Arc<SessionAuthenticator> {
        &self.authenticator
    }
}
