//! Error types for endpoint construction and credential resolution

use std::fmt;
use std::io;
use std::path::PathBuf;
use thiserror::Error;

/// Convenience alias used throughout the crate.
pub type Result<T> = std::result::Result<T, ResolverError>;

/// Errors surfaced while building endpoints or resolving credentials.
#[derive(Debug, Error)]
pub enum ResolverError {
    /// A TLS configuration directory could not be scanned. Directories that
    /// are absent or unreadable for permission reasons are skipped silently
    /// and never produce this error.
    #[error("failed to scan TLS config directory {}: {}", .dir.display(), .source)]
    TlsScan {
        dir: PathBuf,
        #[source]
        source: io::Error,
    },

    /// A configured certificate or key could not be read or parsed.
    #[error("failed to load TLS material from {}: {}", .path.display(), .reason)]
    TlsMaterial { path: PathBuf, reason: String },

    /// An endpoint's scheme, host, and path did not form a valid URL.
    #[error("invalid endpoint URL {url}: {source}")]
    EndpointUrl {
        url: String,
        #[source]
        source: url::ParseError,
    },

    /// No credential source produced credentials and none reported a cause.
    #[error("no credentials available for {host}")]
    NoCredentials { host: String },

    /// A credential source failed while resolving a host.
    #[error("credential lookup failed for {host}: {reason}")]
    CredentialLookup { host: String, reason: String },

    /// The underlying HTTP client could not be constructed.
    #[error("failed to build HTTP client: {0}")]
    Client(#[from] reqwest::Error),
}

impl ResolverError {
    /// Build a [`ResolverError::TlsMaterial`] with the offending path.
    pub fn tls_material(path: impl Into<PathBuf>, reason: impl fmt::Display) -> Self {
        ResolverError::TlsMaterial {
            path: path.into(),
            reason: reason.to_string(),
        }
    }

    /// Build a [`ResolverError::CredentialLookup`] for a host.
    ///
    /// Intended for [`CredentialSource`](crate::auth::CredentialSource)
    /// implementations reporting a failed lookup.
    pub fn credential_lookup(host: impl Into<String>, reason: impl fmt::Display) -> Self {
        ResolverError::CredentialLookup {
            host: host.into(),
            reason: reason.to_string(),
        }
    }
}
