//! Per-registry configuration consumed by the endpoint builder

use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::PathBuf;

/// Registry configuration keyed by hostname.
///
/// Keys are bare hostnames with an optional port, such as `docker.io` or
/// `localhost:5000`. Mirror hostnames listed inside a [`RegistryConfig`] are
/// looked up in the same map for their own configuration.
pub type RegistryConfigs = HashMap<String, RegistryConfig>;

/// Settings for a single registry host.
///
/// All fields are optional; the zero value describes a plain public registry
/// reached over HTTPS with system trust roots and no mirrors.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct RegistryConfig {
    /// Mirror hostnames consulted before the host itself, in order.
    pub mirrors: Vec<String>,

    /// Use plain HTTP instead of HTTPS. When unset, loopback hosts default
    /// to plain HTTP and everything else to HTTPS.
    pub plain_http: Option<bool>,

    /// Skip TLS certificate verification while still using HTTPS.
    pub insecure: Option<bool>,

    /// Directories scanned for additional `*.crt` trust roots and
    /// `*.cert`/`*.key` client key pairs.
    pub tls_config_dirs: Vec<PathBuf>,

    /// Explicitly configured CA certificate files.
    pub root_cas: Vec<PathBuf>,

    /// Explicitly configured client certificate and key files.
    pub key_pairs: Vec<TlsKeyPair>,
}

/// A client certificate file paired with its private key file.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TlsKeyPair {
    pub certificate: PathBuf,
    pub key: PathBuf,
}

impl RegistryConfig {
    /// Set the mirror list, replacing any previous value.
    pub fn with_mirrors<I, S>(mut self, mirrors: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.mirrors = mirrors.into_iter().map(Into::into).collect();
        self
    }

    /// Force plain HTTP on or off.
    pub fn with_plain_http(mut self, plain_http: bool) -> Self {
        self.plain_http = Some(plain_http);
        self
    }

    /// Enable or disable certificate verification skipping.
    pub fn with_insecure(mut self, insecure: bool) -> Self {
        self.insecure = Some(insecure);
        self
    }

    /// Add a directory to scan for TLS material.
    pub fn with_tls_config_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.tls_config_dirs.push(dir.into());
        self
    }

    /// Add a CA certificate file.
    pub fn with_root_ca(mut self, path: impl Into<PathBuf>) -> Self {
        self.root_cas.push(path.into());
        self
    }

    /// Add a client certificate and key file pair.
    pub fn with_key_pair(
        mut self,
        certificate: impl Into<PathBuf>,
        key: impl Into<PathBuf>,
    ) -> Self {
        self.key_pairs.push(TlsKeyPair {
            certificate: certificate.into(),
            key: key.into(),
        });
        self
    }
}
