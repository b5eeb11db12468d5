//! Infrastructure implementation of the `KeyGenerator` port on `ssh-keygen`.

use std::path::Path;

use anyhow::{Context, Result};

use crate::application::ports::{CommandRunner, KeyGenerator, KeyPair};
use crate::infra::command_runner::{DEFAULT_CMD_TIMEOUT, TokioCommandRunner};

/// Key size for the run's throwaway RSA key.
pub const RSA_KEY_BITS: &str = "2048";

const KEY_FILE: &str = "id_rsa";
const KEY_COMMENT: &str = "netcheck";

/// `KeyGenerator` that shells out to `ssh-keygen`.
pub struct SshKeygen<R: CommandRunner> {
    runner: R,
}

impl<R: CommandRunner> SshKeygen<R> {
    pub fn new(runner: R) -> Self {
        Self { runner }
    }

    #[must_use]
    pub fn runner(&self) -> &R {
        &self.runner
    }
}

impl SshKeygen<TokioCommandRunner> {
    /// Convenience constructor for production use.
    #[must_use]
    pub fn default_runner() -> Self {
        Self::new(TokioCommandRunner::new(DEFAULT_CMD_TIMEOUT))
    }
}

impl<R: CommandRunner> KeyGenerator for SshKeygen<R> {
    async fn generate(&self, dir: &Path) -> Result<KeyPair> {
        let private_key_path = dir.join(KEY_FILE);
        let path_str = private_key_path.to_string_lossy().into_owned();

        let out = self
            .runner
            .run(
                "ssh-keygen",
                &[
                    "-q", "-t", "rsa", "-b", RSA_KEY_BITS, "-N", "", "-C", KEY_COMMENT, "-f",
                    &path_str,
                ],
            )
            .await
            .context("running ssh-keygen")?;
        anyhow::ensure!(
            out.status.success(),
            "ssh-keygen failed: {}",
            String::from_utf8_lossy(&out.stderr).trim()
        );

        let public_path = dir.join(format!("{KEY_FILE}.pub"));
        let public_key = tokio::fs::read_to_string(&public_path)
            .await
            .with_context(|| format!("reading {}", public_path.display()))?;
        let public_key = public_key.trim().to_string();
        anyhow::ensure!(
            public_key.starts_with("ssh-rsa "),
            "unexpected public key format in {}",
            public_path.display()
        );

        Ok(KeyPair {
            private_key_path,
            public_key,
        })
    }
}
