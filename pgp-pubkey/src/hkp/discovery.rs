//! Keyserver discovery through DNS `SRV` records.
//!
//! A domain advertises its keyserver with an `_hkp._tcp.<domain>` record. The
//! first record the resolver returns is used; priority and weight are not
//! re-ordered, and other records are never tried as fallbacks.

use std::fmt::Debug;
use std::sync::Arc;

use async_trait::async_trait;
use hickory_resolver::{
    config::{ResolverConfig, ResolverOpts},
    error::{ResolveError, ResolveErrorKind},
    proto::op::ResponseCode,
    TokioAsyncResolver,
};
use tracing::debug;
use url::Url;

use super::client::{HkpClient, HkpClientBuilder};
use crate::errors::{BuildError, DiscoveryError, Result};

/// Service and protocol labels prepended to the domain for the `SRV` query.
pub const HKP_SERVICE: &str = "_hkp._tcp";

/// One `SRV` answer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SrvRecord {
    /// Host name of the server, possibly with a trailing root dot.
    pub target: String,
    /// TCP port the service listens on.
    pub port: u16,
    /// Lower values are preferred.
    pub priority: u16,
    /// Relative weight among records of equal priority.
    pub weight: u16,
}

impl SrvRecord {
    /// A record for `target:port` with priority and weight zero.
    pub fn new(target: impl Into<String>, port: u16) -> Self {
        Self {
            target: target.into(),
            port,
            priority: 0,
            weight: 0,
        }
    }
}

/// Resolves `SRV` records.
///
/// Implementations return records in the order they want them tried. Errors are
/// handed to the caller unchanged.
#[async_trait]
pub trait SrvResolver: Debug + Send + Sync {
    /// Looks up the `SRV` records of the fully assembled `name`,
    /// e.g. `_hkp._tcp.example.com`.
    async fn lookup_srv(&self, name: &str) -> std::result::Result<Vec<SrvRecord>, ResolveError>;
}

/// [`SrvResolver`] backed by `hickory-resolver`.
#[derive(Clone)]
pub struct SystemResolver {
    inner: TokioAsyncResolver,
}

impl Debug for SystemResolver {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SystemResolver").finish_non_exhaustive()
    }
}

impl SystemResolver {
    /// Uses the operating system's resolver configuration (`/etc/resolv.conf` on Unix).
    pub fn from_system_conf() -> std::result::Result<Self, BuildError> {
        Ok(Self {
            inner: TokioAsyncResolver::tokio_from_system_conf()?,
        })
    }

    /// Uses an explicit name server configuration.
    pub fn with_config(config: ResolverConfig, opts: ResolverOpts) -> Self {
        Self {
            inner: TokioAsyncResolver::tokio(config, opts),
        }
    }
}

#[async_trait]
impl SrvResolver for SystemResolver {
    async fn lookup_srv(&self, name: &str) -> std::result::Result<Vec<SrvRecord>, ResolveError> {
        let answers = match self.inner.srv_lookup(name).await {
            Ok(answers) => answers,
            Err(error) if is_no_data(&error) => {
                debug!(%name, "Name exists without SRV records");
                return Ok(Vec::new());
            }
            Err(error) => return Err(error),
        };

        Ok(answers
            .iter()
            .map(|srv| SrvRecord {
                target: srv.target().to_utf8(),
                port: srv.port(),
                priority: srv.priority(),
                weight: srv.weight(),
            })
            .collect())
    }
}

/// NODATA: the name resolved, but has no records of the requested type.
///
/// `NXDOMAIN` and every other failure stay errors.
fn is_no_data(error: &ResolveError) -> bool {
    matches!(
        error.kind(),
        ResolveErrorKind::NoRecordsFound {
            response_code: ResponseCode::NoError,
            ..
        }
    )
}

/// Finds the keyserver of a domain and returns a client bound to it.
///
/// ```no_run
/// # use pgp_pubkey::Discovery;
/// # async fn run() -> pgp_pubkey::Result<()> {
/// let keyserver = Discovery::new()?.lookup("example.com").await?;
/// let certs = keyserver.search("alice@example.com").await?;
/// # Ok(()) }
/// ```
///
/// Transport settings for the discovered client are configured up front:
/// ```no_run
/// # use std::time::Duration;
/// # use pgp_pubkey::Discovery;
/// let mut discovery = Discovery::new()?;
/// discovery.client(|c| c.request_timeout(Duration::from_secs(5)));
/// # Ok::<_, pgp_pubkey::Error>(())
/// ```
#[derive(Debug, Clone)]
pub struct Discovery {
    resolver: Arc<dyn SrvResolver>,
    client: HkpClientBuilder,
}

impl Discovery {
    /// Discovery through the system resolver, with default client settings.
    pub fn new() -> Result<Self> {
        Ok(Self::with_resolver(SystemResolver::from_system_conf()?))
    }

    /// Discovery through a custom resolver.
    pub fn with_resolver<R: SrvResolver + 'static>(resolver: R) -> Self {
        Self {
            resolver: Arc::new(resolver),
            client: HkpClientBuilder::default(),
        }
    }

    /// Allows mutating the [`HkpClientBuilder`] used for discovered keyservers.
    pub fn client<F>(&mut self, f: F) -> &mut Self
    where
        F: FnOnce(&mut HkpClientBuilder) -> &mut HkpClientBuilder,
    {
        f(&mut self.client);

        self
    }

    /// Resolves `_hkp._tcp.<domain>` and returns a client for the first record.
    ///
    /// # Errors
    /// - [`DiscoveryError::Resolve`] if the resolver failed; the error is passed through.
    /// - [`DiscoveryError::NotFound`] if resolution succeeded without any record, or
    ///   the first record's target is `.` (service not available).
    pub async fn lookup(&self, domain: &str) -> Result<HkpClient> {
        let name = format!("{HKP_SERVICE}.{domain}");
        let records = self
            .resolver
            .lookup_srv(&name)
            .await
            .map_err(DiscoveryError::from)?;

        let record = records.first().ok_or(DiscoveryError::NotFound)?;
        if record.target.trim_end_matches('.').is_empty() {
            debug!(%name, "Keyserver service explicitly unavailable");
            return Err(DiscoveryError::NotFound.into());
        }
        debug!(
            %name,
            target = %record.target,
            port = record.port,
            candidates = records.len(),
            "Discovered keyserver"
        );

        self.client.build_with_url(base_url(record)?)
    }
}

/// Discovers the keyserver of `domain` with the system resolver.
pub async fn lookup(domain: &str) -> Result<HkpClient> {
    Discovery::new()?.lookup(domain).await
}

/// Maps a record to `<scheme>://<target>[:<port>]`.
///
/// Ports 80 and 443 mean a plain HTTP or HTTPS front end on the default port. Any
/// other port is kept explicit over plain HTTP.
pub(crate) fn base_url(record: &SrvRecord) -> Result<Url> {
    let target = record.target.trim_end_matches('.');
    let host = if target.contains(':') {
        format!("[{target}]")
    } else {
        target.to_string()
    };

    let url = match record.port {
        80 => format!("http://{host}"),
        443 => format!("https://{host}"),
        port => format!("http://{host}:{port}"),
    };

    Ok(Url::parse(&url)?)
}
