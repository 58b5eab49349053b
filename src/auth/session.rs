//! Session credential sources and cached resolution
//!
//! Every attached client session contributes one credential source. Lookups
//! prefer the newest session and fall back through older ones, and a
//! successful answer is cached per host for a short window so repeated
//! challenges against the same registry do not ping the session each time.

use crate::error::{ResolverError, Result};
use async_trait::async_trait;
use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio::sync::RwLock;
use tracing::{debug, trace};

/// How long a resolved credential stays fresh before its source is consulted
/// again.
const CREDENTIAL_TTL: Duration = Duration::from_secs(60);

/// A username and secret resolved for one registry host.
///
/// The secret may be a password or an identity token; the endpoint consumer
/// decides which. `Debug` redacts it.
#[derive(Clone, PartialEq, Eq)]
pub struct Credentials {
    pub username: String,
    pub secret: String,
}

impl fmt::Debug for Credentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Credentials")
            .field("username", &self.username)
            .field("secret", &"<redacted>")
            .finish()
    }
}

/// One origin of authentication material, typically backed by a client
/// session.
#[async_trait]
pub trait CredentialSource: Send + Sync {
    /// Resolve credentials for `host`.
    async fn resolve(&self, host: &str) -> Result<Credentials>;
}

/// Adapter turning a plain lookup function into a [`CredentialSource`].
pub struct CredentialFn<F>(F);

impl<F> CredentialFn<F>
where
    F: Fn(&str) -> Result<Credentials> + Send + Sync,
{
    pub fn new(lookup: F) -> Self {
        CredentialFn(lookup)
    }
}

#[async_trait]
impl<F> CredentialSource for CredentialFn<F>
where
    F: Fn(&str) -> Result<Credentials> + Send + Sync,
{
    async fn resolve(&self, host: &str) -> Result<Credentials> {
        (self.0)(host)
    }
}

#[derive(Clone)]
struct CachedCredentials {
    credentials: Credentials,
    created: Instant,
}

/// Resolves registry credentials across attached sessions.
///
/// Sessions and the per-host cache sit behind independent locks, so a slow
/// credential lookup never blocks cache reads for other hosts.
pub struct SessionAuthenticator {
    sources: RwLock<Vec<Arc<dyn CredentialSource>>>,
    cache: RwLock<HashMap<String, CachedCredentials>>,
    ttl: Duration,
}

impl Default for SessionAuthenticator {
    /// An authenticator with no sessions attached yet.
    fn default() -> Self {
        SessionAuthenticator {
            sources: RwLock::new(Vec::new()),
            cache: RwLock::new(HashMap::new()),
            ttl: CREDENTIAL_TTL,
        }
    }
}

impl SessionAuthenticator {
    /// Create an authenticator seeded with the initial session's source.
    pub fn new(source: Arc<dyn CredentialSource>) -> Self {
        SessionAuthenticator {
            sources: RwLock::new(vec![source]),
            cache: RwLock::new(HashMap::new()),
            ttl: CREDENTIAL_TTL,
        }
    }

    /// Override the freshness window applied to cached credentials.
    pub fn with_ttl(mut self, ttl: Duration) -> Self {
        self.ttl = ttl;
        self
    }

    /// Append the source of a newly attached session.
    ///
    /// Later sessions take precedence over earlier ones on the next lookup.
    /// Cached credentials are left in place until they age out.
    pub async fn add_session(&self, source: Arc<dyn CredentialSource>) {
        self.sources.write().await.push(source);
    }

    /// Resolve credentials for `host`.
    ///
    /// A fresh cache entry answers immediately. Otherwise sources are tried
    /// newest-first and the first success is cached; failures are never
    /// cached. When every source fails, the error of the oldest one is
    /// returned.
    pub async fn credentials(&self, host: &str) -> Result<Credentials> {
        {
            let cache = self.cache.read().await;
            if let Some(entry) = cache.get(host) {
                if entry.created.elapsed() < self.ttl {
                    trace!(host, "credential cache hit");
                    return Ok(entry.credentials.clone());
                }
            }
        }

        let sources = self.sources.read().await;
        let mut last_err = None;
        for source in sources.iter().rev() {
            match source.resolve(host).await {
                Ok(credentials) => {
                    let entry = CachedCredentials {
                        credentials: credentials.clone(),
                        created: Instant::now(),
                    };
                    self.cache.write().await.insert(host.to_string(), entry);
                    debug!(host, "resolved registry credentials");
                    return Ok(credentials);
                }
                Err(err) => last_err = Some(err),
            }
        }

        Err(last_err.unwrap_or_else(|| ResolverError::NoCredentials {
            host: host.to_string(),
        }))
    }
}
