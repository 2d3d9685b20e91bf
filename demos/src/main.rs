use std::io;

use anyhow::Result;
use clap::{ArgGroup, Parser};
use pgp_pubkey::{
    openpgp::serialize::Serialize, Discovery, HkpClient, KeySource, LocalKeyring,
    DEFAULT_KEYSERVER,
};
use tracing::info;
use tracing::level_filters::LevelFilter;
use tracing_subscriber::{fmt, EnvFilter};

#[derive(Parser)]
#[command(
    version,
    about = "Look up OpenPGP certificates and print them armored on stdout."
)]
#[command(group(ArgGroup::new("source").args(["domain", "keyserver", "local"])))]
struct Cli {
    /// Email address, key ID or fingerprint to search for.
    query: String,

    /// Discover the keyserver of this domain through `_hkp._tcp` SRV records.
    #[arg(long)]
    domain: Option<String>,

    /// Keyserver URL (http, https, hkp or hkps). Used when no other source is given.
    #[arg(long, default_value = DEFAULT_KEYSERVER)]
    keyserver: String,

    /// Export from the local keyring with `gpg` instead.
    #[arg(long)]
    local: bool,

    /// Maximum tracing verbosity to enable: error|warn|info|debug|trace
    #[arg(long, default_value_t = LevelFilter::WARN, value_parser = clap::value_parser!(LevelFilter))]
    level: LevelFilter,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.level);

    let source: Box<dyn KeySource> = if cli.local {
        Box::new(LocalKeyring::new())
    } else if let Some(domain) = &cli.domain {
        let keyserver = Discovery::new()?.lookup(domain).await?;
        info!(url = %keyserver.url(), "Discovered keyserver");
        Box::new(keyserver)
    } else {
        Box::new(HkpClient::new(&cli.keyserver)?)
    };

    let certs = source.search(&cli.query).await?;
    info!(query = %cli.query, found = certs.len(), "Lookup complete");

    for cert in certs {
        cert.armored().serialize(&mut io::stdout())?;
    }
    Ok(())
}

fn init_tracing(level: LevelFilter) {
    let env_filter = EnvFilter::builder()
        .with_default_directive(level.into())
        .from_env_lossy();

    fmt()
        .with_env_filter(env_filter)
        .with_writer(io::stderr)
        .with_target(false)
        .with_level(true)
        .init();
}
