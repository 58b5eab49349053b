//! Credential resolution and authorizer wiring
//!
//! Sessions contribute credential sources, the authenticator caches their
//! answers per host, and resolved endpoint lists get one shared authorizer
//! wired through them.

pub mod authorizer;
pub mod session;

pub use authorizer::{Authorizer, with_authorizer};
pub use session::{CredentialFn, CredentialSource, Credentials, SessionAuthenticator};
