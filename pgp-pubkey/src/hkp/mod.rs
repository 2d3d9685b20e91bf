//! Keyserver access over the [HKP] protocol.
//!
//! - [`HkpClient`] talks to one keyserver whose URL is known.
//! - [`Discovery`] finds a domain's keyserver through DNS `SRV` records and returns
//!   an [`HkpClient`] bound to it.
//!
//! [HKP]: https://tools.ietf.org/html/draft-shaw-openpgp-hkp-00

pub mod client;
pub mod discovery;
