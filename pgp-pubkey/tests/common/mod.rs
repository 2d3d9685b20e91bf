#![allow(dead_code)]

use async_trait::async_trait;
use pgp_pubkey::{
    openpgp::{
        armor::{Kind, Writer},
        cert::CertBuilder,
        serialize::Serialize,
        Cert,
    },
    ResolveError, SrvRecord, SrvResolver,
};
use std::sync::{Arc, Mutex};

/// Generates a fresh certificate for `userid`.
pub fn cert(userid: &str) -> Cert {
    let (cert, _revocation) = CertBuilder::new()
        .add_userid(userid)
        .generate()
        .expect("generate cert");
    cert
}

/// Serializes `certs` into one armored public key block.
pub fn armored(certs: &[Cert]) -> Vec<u8> {
    let mut w = Writer::new(Vec::new(), Kind::PublicKey).expect("armor writer");
    for cert in certs {
        cert.serialize(&mut w).expect("serialize cert");
    }
    w.finalize().expect("finalize armor")
}

/// Serializes `certs` as a binary key ring.
pub fn binary(certs: &[Cert]) -> Vec<u8> {
    let mut out = Vec::new();
    for cert in certs {
        cert.serialize(&mut out).expect("serialize cert");
    }
    out
}

/// Resolver answering every query with a fixed result, remembering the names asked for.
#[derive(Debug)]
pub struct StaticResolver {
    answer: Result<Vec<SrvRecord>, &'static str>,
    queries: Arc<Mutex<Vec<String>>>,
}

impl StaticResolver {
    pub fn records(records: Vec<SrvRecord>) -> Self {
        Self {
            answer: Ok(records),
            queries: Arc::default(),
        }
    }

    /// Handle to the names looked up so far; stays valid after the resolver moved.
    pub fn queries(&self) -> Arc<Mutex<Vec<String>>> {
        Arc::clone(&self.queries)
    }

    pub fn failing(message: &'static str) -> Self {
        Self {
            answer: Err(message),
            queries: Arc::default(),
        }
    }
}

#[async_trait]
impl SrvResolver for StaticResolver {
    async fn lookup_srv(&self, name: &str) -> Result<Vec<SrvRecord>, ResolveError> {
        self.queries.lock().unwrap().push(name.to_string());
        match &self.answer {
            Ok(records) => Ok(records.clone()),
            Err(message) => Err(ResolveError::from(*message)),
        }
    }
}
