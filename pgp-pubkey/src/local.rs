//! Certificates from the local keyring, exported with `gpg` (or a compatible tool).

use std::process::Stdio;

use async_trait::async_trait;
use sequoia_openpgp::Cert;
use tokio::process::Command;
use tracing::debug;

use crate::{
    errors::{LocalError, Result},
    keyring, KeySource,
};

/// Program run by [`LocalKeyring::new`].
pub const DEFAULT_LOCAL_COMMAND: &str = "gpg";

/// Runs `<command> --export <query>` and parses what it prints on stdout.
///
/// Nothing exported means nothing matched: the search returns `Ok(vec![])`.
/// A non-zero exit status is reported as [`LocalError::CommandFailed`].
#[derive(Debug, Clone)]
pub struct LocalKeyring {
    command: String,
}

impl Default for LocalKeyring {
    fn default() -> Self {
        Self::new()
    }
}

impl LocalKeyring {
    /// Exports through [`DEFAULT_LOCAL_COMMAND`].
    pub fn new() -> Self {
        Self::with_command(DEFAULT_LOCAL_COMMAND)
    }

    /// Exports through `command`, e.g. `gpg2` or an absolute path.
    pub fn with_command(command: impl Into<String>) -> Self {
        Self {
            command: command.into(),
        }
    }

    /// The program that gets invoked.
    pub fn command(&self) -> &str {
        &self.command
    }

    /// Exports the certificates matching `query` from the local keyring.
    pub async fn search(&self, query: &str) -> Result<Vec<Cert>> {
        debug!(command = %self.command, %query, "Exporting from local keyring");

        let output = Command::new(&self.command)
            .arg("--export")
            .arg(query)
            .stdin(Stdio::null())
            .kill_on_drop(true)
            .output()
            .await
            .map_err(|source| LocalError::Spawn {
                command: self.command.clone(),
                source,
            })?;

        if !output.status.success() {
            return Err(LocalError::CommandFailed {
                command: self.command.clone(),
                status: output.status,
                stderr: String::from_utf8_lossy(&output.stderr).trim().to_string(),
            }
            .into());
        }

        if output.stdout.is_empty() {
            return Ok(Vec::new());
        }

        keyring::parse_key_ring(&output.stdout)
    }
}

#[async_trait]
impl KeySource for LocalKeyring {
    async fn search(&self, query: &str) -> Result<Vec<Cert>> {
        LocalKeyring::search(self, query).await
    }
}

#[cfg(all(test, unix))]
mod tests {
    use super::*;
    use crate::errors::Error;

    #[test]
    fn defaults_to_gpg() {
        assert_eq!(LocalKeyring::new().command(), "gpg");
        assert_eq!(LocalKeyring::default().command(), DEFAULT_LOCAL_COMMAND);
    }

    #[tokio::test]
    async fn empty_export_is_not_an_error() {
        // `true` ignores its arguments and prints nothing.
        let certs = LocalKeyring::with_command("true")
            .search("alice@example.com")
            .await
            .unwrap();
        assert!(certs.is_empty());
    }

    #[tokio::test]
    async fn failing_command() {
        let err = LocalKeyring::with_command("false")
            .search("alice@example.com")
            .await
            .unwrap_err();
        assert!(
            matches!(err, Error::Local(LocalError::CommandFailed { .. })),
            "{err}"
        );
    }

    #[tokio::test]
    async fn missing_command() {
        let err = LocalKeyring::with_command("/nonexistent/pgp-pubkey-test-gpg")
            .search("alice@example.com")
            .await
            .unwrap_err();
        assert!(
            matches!(err, Error::Local(LocalError::Spawn { .. })),
            "{err}"
        );
    }
}
