//! Registry endpoint resolution
//!
//! Turns container registry hostnames into ordered lists of ready-to-use
//! endpoints: mirrors first, then the registry itself, each with its own
//! TLS trust material, transport settings, and a shared credential
//! authorizer backed by attached client sessions.

pub mod auth;
pub mod config;
pub mod endpoint;
pub mod error;
pub mod resolver;
pub mod tls;
pub mod transport;

pub use auth::{Authorizer, CredentialFn, CredentialSource, Credentials, SessionAuthenticator};
pub use config::{RegistryConfig, RegistryConfigs, TlsKeyPair};
pub use endpoint::{Endpoint, HostCapabilities, RegistryHosts, Scheme, default_endpoint};
pub use error::{ResolverError, Result};
pub use resolver::Resolver;
pub use tls::{TlsMaterial, load_tls_material};
pub use transport::default_client;
