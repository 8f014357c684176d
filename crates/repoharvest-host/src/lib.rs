//! Remote-host API access: credential providers, the blocking REST client,
//! and the adapter binding one repository to a session as a mirror upstream.

pub mod client;
pub mod credentials;
pub mod upstream;

pub use client::{HostClient, HostSession};
pub use credentials::{AnonymousCredentials, AppKeyPair, CredentialProvider, TokenCredentials};
pub use upstream::BoundRepo;
