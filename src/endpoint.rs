//! Registry endpoint model and construction
//!
//! A hostname resolves to an ordered endpoint list: configured mirrors first,
//! restricted to pull and resolve, then the host itself with full
//! capabilities. Each endpoint carries its own HTTP client built from the
//! trust material of the host it points at.

use crate::auth::Authorizer;
use crate::config::{RegistryConfig, RegistryConfigs};
use crate::error::{ResolverError, Result};
use crate::tls;
use crate::transport;
use std::fmt;
use std::net::IpAddr;
use std::ops::BitOr;
use std::sync::Arc;
use tracing::debug;
use url::Url;

/// Path prefix of the registry API.
const DEFAULT_PATH: &str = "/v2";

/// Registry API operations an endpoint may service.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct HostCapabilities(u8);

impl HostCapabilities {
    /// Fetch manifests and blobs by digest.
    pub const PULL: HostCapabilities = HostCapabilities(1 << 0);
    /// Resolve tags to digests.
    pub const RESOLVE: HostCapabilities = HostCapabilities(1 << 1);
    /// Push manifests and blobs.
    pub const PUSH: HostCapabilities = HostCapabilities(1 << 2);

    /// Whether every capability in `other` is present.
    pub const fn has(self, other: HostCapabilities) -> bool {
        self.0 & other.0 == other.0
    }

    pub const fn is_empty(self) -> bool {
        self.0 == 0
    }
}

impl BitOr for HostCapabilities {
    type Output = HostCapabilities;

    fn bitor(self, rhs: HostCapabilities) -> HostCapabilities {
        HostCapabilities(self.0 | rhs.0)
    }
}

/// URL scheme an endpoint is reached over.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Scheme {
    Http,
    Https,
}

impl Scheme {
    pub fn as_str(self) -> &'static str {
        match self {
            Scheme::Http => "http",
            Scheme::Https => "https",
        }
    }
}

impl fmt::Display for Scheme {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A fully configured network target for one registry or mirror host.
#[derive(Debug, Clone)]
pub struct Endpoint {
    pub scheme: Scheme,
    pub host: String,
    pub path: String,
    pub capabilities: HostCapabilities,
    /// Client carrying this host's trust material and transport settings.
    pub client: reqwest::Client,
    /// Challenge authorizer shared across the host's endpoint list, attached
    /// during resolution.
    pub authorizer: Option<Arc<Authorizer>>,
}

impl Endpoint {
    /// Base URL of the registry API on this endpoint.
    pub fn base_url(&self) -> Result<Url> {
        let raw = format!("{}://{}{}", self.scheme, self.host, self.path);
        Url::parse(&raw).map_err(|source| ResolverError::EndpointUrl { url: raw, source })
    }
}

/// Builds endpoint lists from a host-keyed configuration map.
#[derive(Debug, Clone, Default)]
pub struct RegistryHosts {
    configs: RegistryConfigs,
}

impl RegistryHosts {
    pub fn new(configs: RegistryConfigs) -> Self {
        RegistryHosts { configs }
    }

    /// Resolve `host` into its configured endpoint list.
    ///
    /// Mirrors come first with pull and resolve capabilities, each evaluated
    /// against its own configuration entry, followed by the host itself with
    /// full capabilities. A host absent from the configuration resolves to an
    /// empty list.
    pub async fn endpoints(&self, host: &str) -> Result<Vec<Endpoint>> {
        let Some(config) = self.configs.get(host) else {
            return Ok(Vec::new());
        };

        let mut out = Vec::with_capacity(config.mirrors.len() + 1);

        for mirror in &config.mirrors {
            let mirror_config = self.configs.get(mirror).cloned().unwrap_or_default();
            let endpoint = build_endpoint(
                mirror,
                &mirror_config,
                HostCapabilities::PULL | HostCapabilities::RESOLVE,
            )
            .await?;
            out.push(endpoint);
        }

        let primary = canonical_host(host);
        let endpoint = build_endpoint(
            primary,
            config,
            HostCapabilities::PUSH | HostCapabilities::PULL | HostCapabilities::RESOLVE,
        )
        .await?;
        out.push(endpoint);

        debug!(host, endpoints = out.len(), "resolved registry endpoints");
        Ok(out)
    }
}

/// Fallback endpoint for a host with no configuration entry: the well-known
/// public registry over HTTPS, or plain HTTP for loopback hosts, with full
/// capabilities and default trust.
pub fn default_endpoint(host: &str) -> Result<Endpoint> {
    let scheme = if matches_localhost(host) {
        Scheme::Http
    } else {
        Scheme::Https
    };
    Ok(Endpoint {
        scheme,
        host: canonical_host(host).to_string(),
        path: DEFAULT_PATH.to_string(),
        capabilities: HostCapabilities::PUSH | HostCapabilities::PULL | HostCapabilities::RESOLVE,
        client: transport::default_client()?,
        authorizer: None,
    })
}

async fn build_endpoint(
    host: &str,
    config: &RegistryConfig,
    capabilities: HostCapabilities,
) -> Result<Endpoint> {
    let mut material = tls::load_tls_material(config).await?;
    let mut scheme = Scheme::Https;

    if config.plain_http == Some(true) {
        scheme = Scheme::Http;
    } else if config.insecure == Some(true) {
        material.set_insecure_skip_verify(true);
    } else if config.plain_http.is_none() && matches_localhost(host) {
        scheme = Scheme::Http;
    }

    let client = material.apply(transport::client_builder()).build()?;

    Ok(Endpoint {
        scheme,
        host: host.to_string(),
        path: DEFAULT_PATH.to_string(),
        capabilities,
        client,
        authorizer: None,
    })
}

/// Docker Hub is addressed as `docker.io` but served from
/// `registry-1.docker.io`.
fn canonical_host(host: &str) -> &str {
    if host == "docker.io" {
        "registry-1.docker.io"
    } else {
        host
    }
}

/// Whether `host`, with an optional port, names the local machine.
pub fn matches_localhost(host: &str) -> bool {
    let host = strip_port(host);
    if host == "localhost" {
        return true;
    }
    match host.trim_start_matches('[').trim_end_matches(']').parse::<IpAddr>() {
        Ok(ip) => ip.is_loopback(),
        Err(_) => false,
    }
}

/// Drop a trailing `:port`, leaving bare IPv6 addresses untouched.
fn strip_port(host: &str) -> &str {
    if let Some(bracket_end) = host.find(']') {
        return &host[..=bracket_end];
    }
    let mut colons = host.match_indices(':');
    match (colons.next(), colons.next()) {
        (Some((idx, _)), None) => &host[..idx],
        _ => host,
    }
}
