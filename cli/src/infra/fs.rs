//! Filesystem infrastructure: implements `ModuleStager`.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use tracing::debug;

use crate::application::ports::ModuleStager;

/// Prefix of every staged workspace directory.
pub const WORKSPACE_PREFIX: &str = "netcheck-";

/// Whether an entry named `name` belongs in a staged copy.
///
/// Hidden entries (`.terraform`, `.git`, `.netcheck`, ...) and local state or
/// variable files are left behind so the copy starts clean.
#[must_use]
pub fn should_copy(name: &str) -> bool {
    if name.starts_with('.') {
        return false;
    }
    if name.starts_with("terraform.tfstate") {
        return false;
    }
    !(name == "terraform.tfvars"
        || name == "terraform.tfvars.json"
        || name.ends_with(".auto.tfvars")
        || name.ends_with(".auto.tfvars.json"))
}

/// Recursively copy `src` into the existing directory `dst`.
fn copy_tree(src: &Path, dst: &Path) -> Result<u64> {
    let mut copied = 0;
    for entry in std::fs::read_dir(src).with_context(|| format!("reading {}", src.display()))? {
        let entry = entry.with_context(|| format!("reading entry in {}", src.display()))?;
        let name = entry.file_name();
        if !should_copy(&name.to_string_lossy()) {
            continue;
        }
        let from = entry.path();
        let to = dst.join(&name);
        let meta =
            std::fs::metadata(&from).with_context(|| format!("stat {}", from.display()))?;
        if meta.is_dir() {
            std::fs::create_dir_all(&to)
                .with_context(|| format!("creating directory {}", to.display()))?;
            copied += copy_tree(&from, &to)?;
        } else if meta.is_file() {
            std::fs::copy(&from, &to)
                .with_context(|| format!("copying {} to {}", from.display(), to.display()))?;
            copied += 1;
        }
    }
    Ok(copied)
}

/// Stages modules into directories under the system temp dir.
pub struct LocalModuleStager;

impl ModuleStager for LocalModuleStager {
    async fn stage(&self, root_dir: &Path) -> Result<PathBuf> {
        let root = root_dir.to_path_buf();
        tokio::task::spawn_blocking(move || {
            anyhow::ensure!(root.is_dir(), "{} is not a directory", root.display());
            let workspace = tempfile::Builder::new()
                .prefix(WORKSPACE_PREFIX)
                .tempdir()
                .context("creating workspace directory")?
                .keep();
            match copy_tree(&root, &workspace) {
                Ok(files) => {
                    debug!(files, workspace = %workspace.display(), "staged module tree");
                    Ok(workspace)
                }
                Err(e) => {
                    let _ = std::fs::remove_dir_all(&workspace);
                    Err(e)
                }
            }
        })
        .await
        .context("spawn_blocking for stage")?
    }

    async fn remove(&self, workspace_dir: &Path) -> Result<()> {
        let dir = workspace_dir.to_path_buf();
        tokio::task::spawn_blocking(move || {
            if dir.exists() {
                std::fs::remove_dir_all(&dir)
                    .with_context(|| format!("removing directory {}", dir.display()))?;
            }
            Ok::<(), anyhow::Error>(())
        })
        .await
        .context("spawn_blocking for remove")?
    }
}
