//! Boundary to the OpenPGP parser.
//!
//! Backends hand raw bytes to these functions and forward whatever comes back.
//! Certificates are returned in the order they appear in the input; their
//! contents are not inspected here.

use sequoia_openpgp::{
    armor::{Kind, Reader, ReaderMode},
    cert::{Cert, CertParser},
    parse::Parse,
};

use crate::errors::{KeyRingError, Result};

/// Parses an ASCII-armored `PUBLIC KEY BLOCK` containing zero or more certificates.
///
/// Fails if the input carries no armor header, or if the armored payload is not a
/// sequence of well-formed certificates.
pub fn parse_armored_key_ring(data: &[u8]) -> Result<Vec<Cert>> {
    let reader = Reader::from_bytes(data, ReaderMode::Tolerant(Some(Kind::PublicKey)));
    let parser = CertParser::from_reader(reader).map_err(KeyRingError)?;
    collect(parser)
}

/// Parses a key ring that is either binary or armored, as produced by `gpg --export`.
pub fn parse_key_ring(data: &[u8]) -> Result<Vec<Cert>> {
    let parser = CertParser::from_bytes(data).map_err(KeyRingError)?;
    collect(parser)
}

fn collect(parser: CertParser<'_>) -> Result<Vec<Cert>> {
    let certs = parser
        .collect::<sequoia_openpgp::Result<Vec<Cert>>>()
        .map_err(KeyRingError)?;
    Ok(certs)
}
