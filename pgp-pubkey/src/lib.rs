//! Retrieve OpenPGP public keys for an email address, key ID or fingerprint.
//!
//! Every backend implements the [`KeySource`] trait, so callers can switch between
//! them without touching lookup code:
//!
//! - [`HkpClient`]: a keyserver speaking [HKP], addressed by URL.
//! - [`Discovery`]: finds a domain's keyserver through `_hkp._tcp` DNS `SRV`
//!   records and hands back an [`HkpClient`].
//! - [`LocalKeyring`]: exports from the local keyring with `gpg --export`.
//!
//! # Examples
//!
//! Fetching a certificate from a known keyserver:
//!
//! ```no_run
//! # use pgp_pubkey::{HkpClient, Result};
//! # async fn f() -> Result<()> {
//! let keyserver = HkpClient::new("hkps://keys.openpgp.org")?;
//! let certs = keyserver.search("0x31855247603831FD").await?;
//! println!("{} certificate(s)", certs.len());
//! # Ok(())
//! # }
//! ```
//!
//! Discovering the keyserver of a domain:
//!
//! ```no_run
//! # async fn f() -> pgp_pubkey::Result<()> {
//! let keyserver = pgp_pubkey::lookup("example.com").await?;
//! let certs = keyserver.search("alice@example.com").await?;
//! # Ok(()) }
//! ```
//!
//! [HKP]: https://tools.ietf.org/html/draft-shaw-openpgp-hkp-00

#![deny(missing_docs)]
#![deny(rustdoc::broken_intra_doc_links)]

pub mod errors;
pub mod hkp;
pub mod keyring;
mod local;
mod source;

pub mod prelude;

// --- PUBLIC API EXPORTS ---
pub use source::KeySource;

// Backends
pub use hkp::client::{HkpClient, HkpClientBuilder, HkpOption};
pub use hkp::discovery::{lookup, Discovery, SrvRecord, SrvResolver, SystemResolver};
pub use local::LocalKeyring;

// Error types
pub use errors::{BuildError, Error, Result};

// Constants
pub use hkp::client::{DEFAULT_KEYSERVER, HKP_PORT, LOOKUP_PATH};
pub use hkp::discovery::HKP_SERVICE;
pub use local::DEFAULT_LOCAL_COMMAND;

// Re-exports of crates that we use in our API.
pub use hickory_resolver::error::ResolveError;
pub use reqwest;
pub use sequoia_openpgp as openpgp;
pub use sequoia_openpgp::Cert;
