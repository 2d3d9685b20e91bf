mod common;

use common::StaticResolver;
use httpmock::prelude::*;
use pgp_pubkey::{errors::DiscoveryError, Discovery, Error, KeySource, SrvRecord};
use url::Url;

#[tokio::test]
async fn record_port_selects_scheme() -> anyhow::Result<()> {
    let cases = [
        (80, "http://keys.example.com"),
        (443, "https://keys.example.com"),
        (11371, "http://keys.example.com:11371"),
    ];

    for (port, expected) in cases {
        let discovery = Discovery::with_resolver(StaticResolver::records(vec![SrvRecord::new(
            "keys.example.com.",
            port,
        )]));
        let keyserver = discovery.lookup("example.com").await?;
        assert_eq!(keyserver.url(), &Url::parse(expected)?, "port {port}");
    }
    Ok(())
}

#[tokio::test]
async fn queries_the_hkp_service_name() -> anyhow::Result<()> {
    let resolver = StaticResolver::records(vec![SrvRecord::new("keys.example.com.", 11371)]);
    let queries = resolver.queries();

    Discovery::with_resolver(resolver).lookup("example.com").await?;

    assert_eq!(*queries.lock().unwrap(), vec!["_hkp._tcp.example.com"]);
    Ok(())
}

#[tokio::test]
async fn first_record_wins() -> anyhow::Result<()> {
    let records = vec![
        SrvRecord {
            target: "second-choice.example.com.".into(),
            port: 443,
            priority: 20,
            weight: 0,
        },
        SrvRecord {
            target: "first-choice.example.com.".into(),
            port: 11371,
            priority: 10,
            weight: 100,
        },
    ];

    let keyserver = Discovery::with_resolver(StaticResolver::records(records))
        .lookup("example.com")
        .await?;

    // Resolver order is kept; priority is not re-sorted.
    assert_eq!(
        keyserver.url(),
        &Url::parse("https://second-choice.example.com")?
    );
    Ok(())
}

#[tokio::test]
async fn no_records_is_not_found() {
    let err = Discovery::with_resolver(StaticResolver::records(Vec::new()))
        .lookup("example.com")
        .await
        .unwrap_err();

    assert!(
        matches!(err, Error::Discovery(DiscoveryError::NotFound)),
        "{err}"
    );
}

#[tokio::test]
async fn root_target_is_not_found() {
    for target in [".", ""] {
        let resolver = StaticResolver::records(vec![SrvRecord::new(target, 11371)]);
        let err = Discovery::with_resolver(resolver)
            .lookup("example.com")
            .await
            .unwrap_err();

        assert!(
            matches!(err, Error::Discovery(DiscoveryError::NotFound)),
            "{target:?}: {err}"
        );
    }
}

#[tokio::test]
async fn resolver_failure_is_propagated() {
    let err = Discovery::with_resolver(StaticResolver::failing("simulated NXDOMAIN"))
        .lookup("does-not-exist.example")
        .await
        .unwrap_err();

    match err {
        Error::Discovery(DiscoveryError::Resolve(inner)) => {
            assert_eq!(inner.to_string(), "simulated NXDOMAIN")
        }
        other => panic!("expected the resolver error, got {other}"),
    }
}

#[tokio::test]
async fn discovered_keyserver_is_searched() -> anyhow::Result<()> {
    let alice = common::cert("Alice <alice@example.com>");
    let alice_laptop = common::cert("Alice <alice@example.com>");
    let ring = common::armored(&[alice.clone(), alice_laptop.clone()]);

    let server = MockServer::start_async().await;
    let lookup = server
        .mock_async(|when, then| {
            when.method(GET)
                .path("/pks/lookup")
                .query_param("op", "get")
                .query_param("options", "mr")
                .query_param("search", "alice@example.com")
                .header("accept", "application/pgp-keys");
            then.status(200).body(&ring);
        })
        .await;

    // Route keys.example.com to the mock server instead of the real DNS.
    let http = reqwest::Client::builder()
        .resolve("keys.example.com", *server.address())
        .build()?;

    let mut discovery = Discovery::with_resolver(StaticResolver::records(vec![SrvRecord::new(
        "keys.example.com.",
        server.port(),
    )]));
    discovery.client(move |c| c.http_client(http));

    let source: Box<dyn KeySource> = Box::new(discovery.lookup("example.com").await?);
    let certs = source.search("alice@example.com").await?;

    lookup.assert_async().await;
    assert_eq!(certs.len(), 2);
    assert_eq!(certs[0].fingerprint(), alice.fingerprint());
    assert_eq!(certs[1].fingerprint(), alice_laptop.fingerprint());
    Ok(())
}
