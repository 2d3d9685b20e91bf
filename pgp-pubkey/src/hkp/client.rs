//! HKP lookups against a single keyserver.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::{header::ACCEPT, Response, StatusCode};
use sequoia_openpgp::Cert;
use tracing::{debug, trace};
use url::Url;

use crate::{
    errors::{BuildError, RequestError, Result},
    keyring, KeySource,
};

const DEFAULT_USER_AGENT: &str = concat!("pgp-pubkey", "@", env!("CARGO_PKG_VERSION"),);

/// Keyserver used by [`HkpClient::default_keyserver`].
pub const DEFAULT_KEYSERVER: &str = "https://keys.openpgp.org";

/// Conventional port of plain `hkp://` keyservers.
pub const HKP_PORT: u16 = 11371;

/// The server absolute path, defined in section 3.
pub const LOOKUP_PATH: &str = "/pks/lookup";

const PGP_KEYS_MEDIA_TYPE: &str = "application/pgp-keys";

/// Values for the `options` parameter, defined in section 3.2.1.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HkpOption {
    /// `mr`: machine readable output.
    MachineReadable,
    /// `nm`: no modification; return keys exactly as stored.
    NoModification,
}

impl HkpOption {
    /// The value sent on the wire.
    pub fn as_str(&self) -> &'static str {
        match self {
            HkpOption::MachineReadable => "mr",
            HkpOption::NoModification => "nm",
        }
    }
}

#[derive(Debug, Clone, Default)]
#[must_use]
/// Configures an [`HkpClient`] before construction.
///
/// # Defaults
/// - HTTP request timeout: reqwest default (no global timeout) unless set via
///   [`Self::request_timeout`]
/// - User-agent: `pgp-pubkey@<crate-version>` plus any [`Self::user_agent_extra`]
///
/// Supplying a ready-made client with [`Self::http_client`] overrides both.
///
/// # Example
/// ```no_run
/// use std::time::Duration;
/// # use pgp_pubkey::HkpClient;
/// let client = HkpClient::builder()
///     .request_timeout(Duration::from_secs(10))
///     .user_agent_extra("myapp/1.2.3")
///     .build("hkps://keys.openpgp.org")?;
/// # Ok::<_, pgp_pubkey::Error>(())
/// ```
pub struct HkpClientBuilder {
    http_request_timeout: Option<Duration>,

    /// Optional user-agent segment appended to the default UA.
    user_agent_extra: Option<String>,

    http: Option<reqwest::Client>,
}

impl HkpClientBuilder {
    /// Set HTTP requests timeout.
    pub fn request_timeout(&mut self, timeout: Duration) -> &mut Self {
        self.http_request_timeout = Some(timeout);

        self
    }

    /// Append an extra user-agent segment after the default `pgp-pubkey@<version>`.
    pub fn user_agent_extra<S: Into<String>>(&mut self, extra: S) -> &mut Self {
        self.user_agent_extra = Some(extra.into());
        self
    }

    /// Use an existing [`reqwest::Client`] as transport.
    ///
    /// Timeouts, proxies, redirect policy and DNS overrides are then whatever that
    /// client was configured with.
    pub fn http_client(&mut self, client: reqwest::Client) -> &mut Self {
        self.http = Some(client);
        self
    }

    /// Build an [`HkpClient`] for the keyserver at `url`.
    ///
    /// Accepts `http://`, `https://`, `hkp://` and `hkps://` URLs. `hkp://`
    /// defaults to port 11371, `hkps://` to 443. URLs carrying credentials, a
    /// query or a fragment are rejected with [`RequestError::Validation`].
    pub fn build(&self, url: &str) -> Result<HkpClient> {
        self.build_with_url(normalize_base_url(url)?)
    }

    pub(crate) fn build_with_url(&self, url: Url) -> Result<HkpClient> {
        Ok(HkpClient {
            url,
            http: self.build_http()?,
        })
    }

    fn build_http(&self) -> std::result::Result<reqwest::Client, BuildError> {
        if let Some(client) = &self.http {
            return Ok(client.clone());
        }

        let user_agent = match &self.user_agent_extra {
            Some(extra) if !extra.trim().is_empty() => {
                format!("{DEFAULT_USER_AGENT} {}", extra.trim())
            }
            _ => DEFAULT_USER_AGENT.to_string(),
        };

        let mut http_builder = reqwest::Client::builder().user_agent(user_agent);
        if let Some(timeout) = self.http_request_timeout {
            http_builder = http_builder.timeout(timeout);
        }

        Ok(http_builder.build()?)
    }
}

/// Client for a single keyserver speaking the [HKP] protocol.
///
/// The base URL is fixed at construction. Every [`search`](Self::search) issues one
/// `GET <base>/pks/lookup?op=get&options=mr&search=<query>` request with
/// `Accept: application/pgp-keys`, and parses the armored key ring in the answer.
///
/// Status handling:
/// - `200 OK`: the body is parsed; malformed data is an [`crate::Error::KeyRing`].
/// - `404 Not Found`: nothing is known about the query, `Ok(vec![])`.
/// - anything else: [`crate::errors::RequestError::Server`] carrying the status.
///
/// No retries are made. Redirects and timeouts follow the transport's configuration.
///
/// Cloning is cheap; clones share the connection pool.
///
/// ```no_run
/// # use pgp_pubkey::HkpClient;
/// # async fn run() -> pgp_pubkey::Result<()> {
/// let keyserver = HkpClient::new("hkps://keys.openpgp.org")?;
/// for cert in keyserver.search("alice@example.com").await? {
///     println!("{}", cert.fingerprint());
/// }
/// # Ok(()) }
/// ```
///
/// [HKP]: https://tools.ietf.org/html/draft-shaw-openpgp-hkp-00
#[derive(Clone, Debug)]
pub struct HkpClient {
    url: Url,
    http: reqwest::Client,
}

impl HkpClient {
    /// Returns a client for the given keyserver URL with default transport settings.
    pub fn new(url: &str) -> Result<Self> {
        Self::builder().build(url)
    }

    /// Returns a client for the given URL that sends requests through `client`.
    pub fn with_client(url: &str, client: reqwest::Client) -> Result<Self> {
        Self::builder().http_client(client).build(url)
    }

    /// Returns a client for [`DEFAULT_KEYSERVER`].
    pub fn default_keyserver() -> Result<Self> {
        Self::new(DEFAULT_KEYSERVER)
    }

    /// Returns a builder to edit transport settings before creating an [`HkpClient`].
    pub fn builder() -> HkpClientBuilder {
        HkpClientBuilder::default()
    }

    /// Returns the keyserver's base URL.
    pub fn url(&self) -> &Url {
        &self.url
    }

    /// Retrieves the certificates matching `query`.
    ///
    /// `query` is sent verbatim (form-URL-encoded) as the `search` parameter.
    ///
    /// # Warning
    ///
    /// Returned certificates must be mistrusted, and be carefully
    /// interpreted under a policy and trust model.
    pub async fn search(&self, query: &str) -> Result<Vec<Cert>> {
        let url = self.lookup_url(query)?;
        debug!(%url, "Looking up keys");

        let response = self
            .http
            .get(url)
            .header(ACCEPT, PGP_KEYS_MEDIA_TYPE)
            .send()
            .await?;

        match response.status() {
            StatusCode::OK => {
                let body = response.bytes().await?;
                trace!(len = body.len(), "Parsing armored key ring");
                keyring::parse_armored_key_ring(&body)
            }
            StatusCode::NOT_FOUND => {
                drain(response).await;
                Ok(Vec::new())
            }
            status => {
                drain(response).await;
                Err(RequestError::Server { status }.into())
            }
        }
    }

    /// `<base>/pks/lookup` with the `op`, `options` and `search` parameters set.
    pub(crate) fn lookup_url(&self, query: &str) -> Result<Url> {
        let mut url = self.url.clone();

        url.path_segments_mut()
            .map_err(|()| invalid_url("keyserver URL cannot be a base"))?
            .pop_if_empty()
            .extend(LOOKUP_PATH.split('/').filter(|s| !s.is_empty()));

        url.query_pairs_mut()
            .clear()
            .append_pair("op", "get")
            .append_pair("options", HkpOption::MachineReadable.as_str())
            .append_pair("search", query);

        Ok(url)
    }
}

#[async_trait]
impl KeySource for HkpClient {
    async fn search(&self, query: &str) -> Result<Vec<Cert>> {
        HkpClient::search(self, query).await
    }
}

/// Reads what is left of the body so the connection can be reused.
async fn drain(response: Response) {
    if let Err(error) = response.bytes().await {
        trace!(%error, "Discarding unreadable response body");
    }
}

/// Turns a user supplied keyserver URL into the `http(s)` base URL requests go to.
fn normalize_base_url(input: &str) -> Result<Url> {
    let url = Url::parse(input)?;

    let (scheme, default_port) = match url.scheme() {
        "http" | "https" => (url.scheme(), None),
        "hkp" => ("http", Some(HKP_PORT)),
        "hkps" => ("https", None),
        other => {
            return Err(invalid_url(&format!(
                "unsupported scheme `{other}`; expected http, https, hkp or hkps"
            )))
        }
    };

    let host = url
        .host_str()
        .filter(|host| !host.is_empty())
        .ok_or_else(|| invalid_url("missing host"))?;

    if !url.username().is_empty() || url.password().is_some() {
        return Err(invalid_url("credentials are not supported in a keyserver URL"));
    }
    if url.query().is_some() || url.fragment().is_some() {
        return Err(invalid_url("keyserver URL cannot carry a query or fragment"));
    }

    let mut base = Url::parse(&format!("{scheme}://{host}"))?;
    base.set_port(url.port().or(default_port))
        .map_err(|()| invalid_url("cannot carry a port"))?;
    base.set_path(url.path());

    Ok(base)
}

fn invalid_url(message: &str) -> crate::Error {
    RequestError::Validation {
        message: message.to_string(),
    }
    .into()
}
