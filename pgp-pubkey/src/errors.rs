//! Unified error types for the `pgp-pubkey` crate.
//!
//! Every backend reports failures through the single top-level [`Error`] enum and
//! the [`Result`] alias. Errors from lower layers (`reqwest`, `hickory-resolver`,
//! `sequoia-openpgp`, URL parsing, process spawning) are mapped into structured
//! variants so callers can tell an unreachable keyserver from unusable key data.
//!
//! Absence is not an error: a keyserver answering `404 Not Found`, or a local
//! keyring exporting nothing, yields `Ok(vec![])`.

use std::process::ExitStatus;

use thiserror::Error;

// --- Build-Time Error ---

/// Errors that can occur while building an [`crate::HkpClient`] or a [`crate::Discovery`].
#[derive(Debug, Error)]
pub enum BuildError {
    /// Failed to build the HTTP client (reqwest configuration).
    #[error("Failed to build the HTTP client: {0}")]
    Http(#[from] reqwest::Error),

    /// Failed to read the system DNS configuration.
    #[error("Failed to build the DNS resolver: {0}")]
    Resolver(#[from] hickory_resolver::error::ResolveError),
}

// --- The Main Operational Error Enum ---

/// The crate’s top-level error type.
///
/// It groups failures into high-level categories:
/// - [`Error::Request`] — HTTP transport failures and unexpected status codes
/// - [`Error::KeyRing`] — the key material could not be parsed
/// - [`Error::Discovery`] — SRV based keyserver discovery failed
/// - [`Error::Local`] — the local keyring command could not be run
/// - [`Error::Parse`] — a keyserver URL could not be parsed or built
/// - [`Error::Build`] — construction of a client failed
#[derive(Debug, Error)]
pub enum Error {
    /// HTTP request/response failed (transport or server status).
    #[error("Request failed: {0}")]
    Request(#[from] RequestError),

    /// The returned data was not a valid OpenPGP key ring.
    #[error("Invalid key ring: {0}")]
    KeyRing(#[from] KeyRingError),

    /// No keyserver could be discovered for a domain.
    #[error("Keyserver discovery failed: {0}")]
    Discovery(#[from] DiscoveryError),

    /// Exporting from the local keyring failed.
    #[error("Local keyring failed: {0}")]
    Local(#[from] LocalError),

    /// URL parsing failed while preparing a keyserver URL.
    #[error("Failed to parse URL: {0}")]
    Parse(#[from] url::ParseError),

    /// Building a client failed.
    #[error("Client build failed: {0}")]
    Build(#[from] BuildError),
}

// --- Request Errors ---

/// Transport and server-side HTTP errors.
#[derive(Debug, Error)]
pub enum RequestError {
    /// Network/protocol failure from reqwest (connect, TLS, I/O, timeouts).
    #[error("HTTP transport error: {0}")]
    Transport(#[from] reqwest::Error),

    /// The keyserver answered with a status other than `200` or `404`.
    #[error("Server responded with an error: {status}")]
    Server {
        /// The HTTP status code returned by the server.
        status: reqwest::StatusCode,
    },

    /// The keyserver URL is not usable (unsupported scheme, no host).
    #[error("Invalid keyserver URL: {message}")]
    Validation {
        /// Human-readable explanation of what was invalid.
        message: String,
    },
}

// --- Key Ring Errors ---

/// The key material returned by a backend could not be parsed.
///
/// Distinguishes "the source answered, but its content is unusable" from absence.
#[derive(Debug, Error)]
#[error("{0:#}")]
pub struct KeyRingError(pub(crate) anyhow::Error);

impl KeyRingError {
    /// Returns the underlying OpenPGP parser error.
    pub fn inner(&self) -> &anyhow::Error {
        &self.0
    }
}

// --- Discovery Errors ---

/// Failures of SRV based keyserver discovery.
///
/// The two causes are kept apart: a failing resolver is reported verbatim as
/// [`DiscoveryError::Resolve`], while a successful resolution that produced no
/// records at all is [`DiscoveryError::NotFound`].
#[derive(Debug, Error)]
pub enum DiscoveryError {
    /// The resolver answered, but without any `_hkp._tcp` record.
    #[error("hkp: no server found during lookup")]
    NotFound,

    /// The DNS resolver itself failed (NXDOMAIN, unreachable name server, ...).
    #[error(transparent)]
    Resolve(#[from] hickory_resolver::error::ResolveError),
}

// --- Local Keyring Errors ---

/// Errors running the local key export command.
#[derive(Debug, Error)]
pub enum LocalError {
    /// The command could not be started (not installed, not executable).
    #[error("Failed to run `{command}`: {source}")]
    Spawn {
        /// The program that was invoked.
        command: String,
        /// The underlying I/O error.
        source: std::io::Error,
    },

    /// The command ran but exited unsuccessfully.
    #[error("`{command}` exited with {status}: {stderr}")]
    CommandFailed {
        /// The program that was invoked.
        command: String,
        /// Its exit status.
        status: ExitStatus,
        /// Captured standard error, lossily decoded and trimmed.
        stderr: String,
    },
}

/// A specialized `Result` type for `pgp-pubkey` operations.
pub type Result<T> = std::result::Result<T, Error>;

// Ergonomic "Staircase" From Implementations ---
macro_rules! impl_from_for_error {
    ($from_type:ty, $to_variant:path) => {
        impl From<$from_type> for Error {
            fn from(err: $from_type) -> Self {
                $to_variant(err.into())
            }
        }
    };
}

impl_from_for_error!(reqwest::Error, Error::Request);
impl_from_for_error!(hickory_resolver::error::ResolveError, Error::Discovery);
