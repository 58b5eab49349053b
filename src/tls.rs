//! TLS trust material loading for registry hosts
//!
//! Each host resolves its own trust material independently: explicitly
//! configured CA and key-pair paths come first, then anything discovered in
//! the host's TLS configuration directories. Discovered `*.crt` files become
//! additional trust roots and `*.cert` files are paired with a `*.key` file
//! of the same stem.

use crate::config::{RegistryConfig, TlsKeyPair};
use crate::error::{ResolverError, Result};
use reqwest::tls::{Certificate, Identity};
use std::io;
use std::path::{Path, PathBuf};
use tracing::trace;

/// Trust material resolved for one host.
///
/// Applied onto an HTTP client builder just before construction. Built-in
/// trust roots stay active; configured CAs extend them.
#[derive(Debug, Default)]
pub struct TlsMaterial {
    pub(crate) root_cas: Vec<Certificate>,
    pub(crate) identities: Vec<Identity>,
    pub(crate) insecure_skip_verify: bool,
}

impl TlsMaterial {
    /// Disable certificate verification for clients built from this material.
    pub(crate) fn set_insecure_skip_verify(&mut self, skip: bool) {
        self.insecure_skip_verify = skip;
    }

    /// Apply the material to a client builder.
    ///
    /// The TLS stack presents a single client identity per connection, so
    /// when several key pairs are configured the last one wins.
    pub(crate) fn apply(self, mut builder: reqwest::ClientBuilder) -> reqwest::ClientBuilder {
        for ca in self.root_cas {
            builder = builder.add_root_certificate(ca);
        }
        for identity in self.identities {
            builder = builder.identity(identity);
        }
        if self.insecure_skip_verify {
            builder = builder.danger_accept_invalid_certs(true);
        }
        builder
    }
}

/// Load the trust material described by `config`.
///
/// Absent or permission-restricted configuration directories are treated as
/// holding no material. Unreadable or unparseable certificate and key files
/// are fatal.
pub async fn load_tls_material(config: &RegistryConfig) -> Result<TlsMaterial> {
    let mut ca_paths = config.root_cas.clone();
    let mut key_pairs = config.key_pairs.clone();

    for dir in &config.tls_config_dirs {
        scan_config_dir(dir, &mut ca_paths, &mut key_pairs).await?;
    }

    let mut material = TlsMaterial::default();

    for path in &ca_paths {
        let pem = tokio::fs::read(path)
            .await
            .map_err(|err| ResolverError::tls_material(path, &err))?;
        let cert = Certificate::from_pem(&pem)
            .map_err(|err| ResolverError::tls_material(path, &err))?;
        material.root_cas.push(cert);
    }

    for pair in &key_pairs {
        material.identities.push(load_identity(pair).await?);
    }

    trace!(
        root_cas = material.root_cas.len(),
        identities = material.identities.len(),
        "loaded TLS material"
    );
    Ok(material)
}

/// Collect `*.crt` and `*.cert`/`*.key` paths from one directory.
async fn scan_config_dir(
    dir: &Path,
    ca_paths: &mut Vec<PathBuf>,
    key_pairs: &mut Vec<TlsKeyPair>,
) -> Result<()> {
    let scan_err = |source: io::Error| ResolverError::TlsScan {
        dir: dir.to_path_buf(),
        source,
    };

    let mut entries = match tokio::fs::read_dir(dir).await {
        Ok(entries) => entries,
        Err(err)
            if matches!(
                err.kind(),
                io::ErrorKind::NotFound | io::ErrorKind::PermissionDenied
            ) =>
        {
            trace!(dir = %dir.display(), "skipping inaccessible TLS config directory");
            return Ok(());
        }
        Err(err) => return Err(scan_err(err)),
    };

    while let Some(entry) = entries.next_entry().await.map_err(scan_err)? {
        let name = entry.file_name();
        let Some(name) = name.to_str() else {
            continue;
        };
        if name.ends_with(".crt") {
            ca_paths.push(dir.join(name));
        }
        if let Some(stem) = name.strip_suffix(".cert") {
            key_pairs.push(TlsKeyPair {
                certificate: dir.join(name),
                key: dir.join(format!("{stem}.key")),
            });
        }
    }
    Ok(())
}

/// Read a certificate/key file pair into a client identity.
async fn load_identity(pair: &TlsKeyPair) -> Result<Identity> {
    let mut pem = tokio::fs::read(&pair.certificate)
        .await
        .map_err(|err| ResolverError::tls_material(&pair.certificate, &err))?;
    let key = tokio::fs::read(&pair.key)
        .await
        .map_err(|err| ResolverError::tls_material(&pair.key, &err))?;

    pem.push(b'\n');
    pem.extend_from_slice(&key);
    Identity::from_pem(&pem).map_err(|err| ResolverError::tls_material(&pair.certificate, &err))
}

#[cfg(test)]
mod tests {
    use super::*;
    use rcgen::{CertificateParams, KeyPair};
    use std::fs;
    use tempfile::TempDir;

    fn generate_cert_pem(host: &str) -> (String, String) {
        let key_pair = KeyPair::generate().unwrap();
        let params = CertificateParams::new(vec![host.to_string()]).unwrap();
        let cert = params.self_signed(&key_pair).unwrap();
        (cert.pem(), key_pair.serialize_pem())
    }

    #[tokio::test]
    async fn test_empty_config_loads_empty_material() {
        let material = load_tls_material(&RegistryConfig::default()).await.unwrap();
        assert!(material.root_cas.is_empty());
        assert!(material.identities.is_empty());
        assert!(!material.insecure_skip_verify);
    }

    #[tokio::test]
    async fn test_missing_config_dir_is_skipped() {
        let config =
            RegistryConfig::default().with_tls_config_dir("/nonexistent/certs.d/registry.example");
        let material = load_tls_material(&config).await.unwrap();
        assert!(material.root_cas.is_empty());
        assert!(material.identities.is_empty());
    }

    #[tokio::test]
    async fn test_config_dir_that_is_a_file_is_fatal() {
        let tmp = TempDir::new().unwrap();
        let not_a_dir = tmp.path().join("certs.d");
        fs::write(&not_a_dir, "plain file").unwrap();

        let config = RegistryConfig::default().with_tls_config_dir(&not_a_dir);
        let err = load_tls_material(&config).await.unwrap_err();
        match err {
            ResolverError::TlsScan { dir, .. } => assert_eq!(dir, not_a_dir),
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_scan_collects_crt_and_cert_key_pairs() {
        let dir = TempDir::new().unwrap();
        let (ca_pem, _) = generate_cert_pem("ca.registry.example");
        let (client_pem, client_key) = generate_cert_pem("client.registry.example");

        fs::write(dir.path().join("extra-ca.crt"), &ca_pem).unwrap();
        fs::write(dir.path().join("client.cert"), &client_pem).unwrap();
        fs::write(dir.path().join("client.key"), &client_key).unwrap();
        fs::write(dir.path().join("notes.txt"), "ignored").unwrap();

        let config = RegistryConfig::default().with_tls_config_dir(dir.path());
        let material = load_tls_material(&config).await.unwrap();

        assert_eq!(material.root_cas.len(), 1);
        assert_eq!(material.identities.len(), 1);
    }

    #[tokio::test]
    async fn test_explicit_paths_load_alongside_scanned_ones() {
        let dir = TempDir::new().unwrap();
        let (scanned_ca, _) = generate_cert_pem("scanned.registry.example");
        fs::write(dir.path().join("scanned.crt"), &scanned_ca).unwrap();

        let explicit = TempDir::new().unwrap();
        let (explicit_ca, _) = generate_cert_pem("explicit.registry.example");
        let explicit_path = explicit.path().join("pinned-ca.pem");
        fs::write(&explicit_path, &explicit_ca).unwrap();

        let config = RegistryConfig::default()
            .with_root_ca(&explicit_path)
            .with_tls_config_dir(dir.path());
        let material = load_tls_material(&config).await.unwrap();

        assert_eq!(material.root_cas.len(), 2);
    }

    #[tokio::test]
    async fn test_cert_without_key_file_is_fatal() {
        let dir = TempDir::new().unwrap();
        let (client_pem, _) = generate_cert_pem("client.registry.example");
        fs::write(dir.path().join("client.cert"), &client_pem).unwrap();

        let config = RegistryConfig::default().with_tls_config_dir(dir.path());
        let err = load_tls_material(&config).await.unwrap_err();
        match err {
            ResolverError::TlsMaterial { path, .. } => {
                assert_eq!(path, dir.path().join("client.key"));
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_garbage_key_pair_is_fatal() {
        let dir = TempDir::new().unwrap();
        fs::write(dir.path().join("client.cert"), "not a certificate").unwrap();
        fs::write(dir.path().join("client.key"), "not a key").unwrap();

        let config = RegistryConfig::default().with_tls_config_dir(dir.path());
        let err = load_tls_material(&config).await.unwrap_err();
        assert!(matches!(err, ResolverError::TlsMaterial { .. }));
    }

    #[tokio::test]
    async fn test_unreadable_explicit_ca_is_fatal() {
        let config = RegistryConfig::default().with_root_ca("/nonexistent/pinned-ca.pem");
        let err = load_tls_material(&config).await.unwrap_err();
        match err {
            ResolverError::TlsMaterial { path, .. } => {
                assert_eq!(path, PathBuf::from("/nonexistent/pinned-ca.pem"));
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_material_applies_to_client_builder() {
        let dir = TempDir::new().unwrap();
        let (ca_pem, _) = generate_cert_pem("ca.registry.example");
        let (client_pem, client_key) = generate_cert_pem("client.registry.example");
        fs::write(dir.path().join("extra-ca.crt"), &ca_pem).unwrap();
        fs::write(dir.path().join("client.cert"), &client_pem).unwrap();
        fs::write(dir.path().join("client.key"), &client_key).unwrap();

        let config = RegistryConfig::default().with_tls_config_dir(dir.path());
        let material = load_tls_material(&config).await.unwrap();
        material.apply(reqwest::Client::builder()).build().unwrap();
    }
}
