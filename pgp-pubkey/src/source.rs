use std::sync::Arc;

use async_trait::async_trait;
use sequoia_openpgp::Cert;

use crate::errors::Result;

/// Something that can look up OpenPGP certificates for a query.
///
/// The query (an email address, key ID, fingerprint or name) is passed to the
/// backend as-is. An empty `Vec` means "nothing matched" and is not an error.
///
/// Callers should depend on this trait rather than on a concrete backend, so a
/// keyserver can be swapped for the local keyring (or anything else) freely:
///
/// ```no_run
/// # use pgp_pubkey::{HkpClient, KeySource, LocalKeyring};
/// # async fn run() -> pgp_pubkey::Result<()> {
/// let sources: Vec<Box<dyn KeySource>> = vec![
///     Box::new(LocalKeyring::new()),
///     Box::new(HkpClient::new("hkps://keys.openpgp.org")?),
/// ];
/// for source in &sources {
///     let certs = source.search("alice@example.com").await?;
///     if !certs.is_empty() {
///         println!("found {} certificate(s)", certs.len());
///         break;
///     }
/// }
/// # Ok(()) }
/// ```
///
/// # Warning
///
/// Returned certificates must be mistrusted, and be carefully interpreted under a
/// policy and trust model.
#[async_trait]
pub trait KeySource: Send + Sync {
    /// Returns every certificate the backend has for `query`, in backend order.
    async fn search(&self, query: &str) -> Result<Vec<Cert>>;
}

#[async_trait]
impl<S: KeySource + ?Sized> KeySource for Box<S> {
    async fn search(&self, query: &str) -> Result<Vec<Cert>> {
        (**self).search(query).await
    }
}

#[async_trait]
impl<S: KeySource + ?Sized> KeySource for Arc<S> {
    async fn search(&self, query: &str) -> Result<Vec<Cert>> {
        (**self).search(query).await
    }
}
