//! Infrastructure implementation of the `SshClient` port on OpenSSH.
//!
//! Each call writes a private `ssh_config` next to the run's key and invokes
//! `ssh -F <config> [-J hop1,hop2] target command`. Jump hosts are dialled by
//! OpenSSH itself, which passes the same `-F` file down to every hop.

use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;

use anyhow::{Context, Result};

use crate::application::ports::{CommandRunner, KeyPair, SshClient};
use crate::domain::SshHost;
use crate::infra::command_runner::{DEFAULT_CMD_TIMEOUT, TokioCommandRunner};

/// Extra time per invocation on top of the per-hop connect timeouts.
const COMMAND_GRACE: Duration = Duration::from_secs(30);

/// Render the client configuration shared by every hop.
#[must_use]
pub fn render_ssh_config(identity: &Path, connect_timeout: Duration) -> String {
    format!(
        "Host *\n  \
         IdentityFile {}\n  \
         IdentitiesOnly yes\n  \
         BatchMode yes\n  \
         PasswordAuthentication no\n  \
         StrictHostKeyChecking no\n  \
         UserKnownHostsFile /dev/null\n  \
         LogLevel ERROR\n  \
         ConnectTimeout {}\n  \
         ServerAliveInterval 5\n  \
         ServerAliveCountMax 2\n",
        identity.display(),
        connect_timeout.as_secs()
    )
}

/// Arguments after `ssh` for running `command` on the last host of `route`.
///
/// # Errors
///
/// Returns an error if `route` is empty.
pub fn ssh_args(config: &Path, route: &[SshHost], command: &str) -> Result<Vec<String>> {
    let (target, jumps) = route
        .split_last()
        .ok_or_else(|| anyhow::anyhow!("SSH route has no hosts"))?;
    let mut args = vec!["-F".to_string(), config.display().to_string()];
    if !jumps.is_empty() {
        let chain: Vec<String> = jumps.iter().map(SshHost::destination).collect();
        args.push("-J".to_string());
        args.push(chain.join(","));
    }
    args.push(target.destination());
    args.push(command.to_string());
    Ok(args)
}

/// `SshClient` backed by the `ssh` binary.
pub struct OpenSshClient<R: CommandRunner> {
    runner: R,
    connect_timeout: Duration,
    counter: AtomicU64,
}

impl<R: CommandRunner> OpenSshClient<R> {
    pub fn new(runner: R, connect_timeout: Duration) -> Self {
        Self {
            runner,
            connect_timeout,
            counter: AtomicU64::new(0),
        }
    }

    #[must_use]
    pub fn runner(&self) -> &R {
        &self.runner
    }

    /// Write a fresh config file beside the key. Concurrent probes each get
    /// their own file.
    async fn write_config(&self, key: &KeyPair) -> Result<PathBuf> {
        let dir = key
            .private_key_path
            .parent()
            .ok_or_else(|| anyhow::anyhow!("key path has no parent directory"))?;
        let n = self.counter.fetch_add(1, Ordering::Relaxed);
        let path = dir.join(format!("ssh_config.{n}"));
        let content = render_ssh_config(&key.private_key_path, self.connect_timeout);
        let target = path.clone();
        tokio::task::spawn_blocking(move || write_private(&target, &content))
            .await
            .context("ssh config write task panicked")??;
        Ok(path)
    }
}

impl OpenSshClient<TokioCommandRunner> {
    /// Convenience constructor for production use.
    #[must_use]
    pub fn default_runner(connect_timeout: Duration) -> Self {
        Self::new(TokioCommandRunner::new(DEFAULT_CMD_TIMEOUT), connect_timeout)
    }
}

impl<R: CommandRunner> SshClient for OpenSshClient<R> {
    async fn run(&self, route: &[SshHost], key: &KeyPair, command: &str) -> Result<String> {
        anyhow::ensure!(!route.is_empty(), "SSH route has no hosts");
        let config = self.write_config(key).await?;
        let args = ssh_args(&config, route, command)?;
        let arg_refs: Vec<&str> = args.iter().map(String::as_str).collect();
        let hops = u32::try_from(route.len()).unwrap_or(u32::MAX);
        let timeout = self.connect_timeout.saturating_mul(hops) + COMMAND_GRACE;

        let result = self.runner.run_with_timeout("ssh", &arg_refs, timeout).await;
        let _ = tokio::fs::remove_file(&config).await;
        let out = result.context("running ssh")?;

        anyhow::ensure!(
            out.status.success(),
            "ssh to {} exited with {}: {}",
            route
                .iter()
                .map(|h| h.hostname.as_str())
                .collect::<Vec<_>>()
                .join(" -> "),
            out.status,
            String::from_utf8_lossy(&out.stderr).trim()
        );
        Ok(String::from_utf8_lossy(&out.stdout).into_owned())
    }
}

/// Write `content` to `path` with mode 600 and its parent directory 700.
fn write_private(path: &Path, content: &str) -> Result<()> {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)
            .with_context(|| format!("create dir {}", parent.display()))?;
        set_permissions(parent, 0o700)?;
    }
    std::fs::write(path, content).with_context(|| format!("write {}", path.display()))?;
    set_permissions(path, 0o600)?;
    Ok(())
}

#[cfg(unix)]
fn set_permissions(path: &Path, mode: u32) -> Result<()> {
    use std::os::unix::fs::PermissionsExt;
    std::fs::set_permissions(path, std::fs::Permissions::from_mode(mode))
        .with_context(|| format!("set permissions on {}", path.display()))
}

#[cfg(not(unix))]
fn set_permissions(_path: &Path, _mode: u32) -> Result<()> {
    Ok(())
}
