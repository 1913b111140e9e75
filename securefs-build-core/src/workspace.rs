//! Build workspace resolution.
//!
//! A user-supplied root is created if needed and returned as-is. Without
//! one, a fresh `securefs*` directory is made under `/dev/shm` when that
//! exists, else under the platform temp dir. Generated workspaces are never
//! removed so failed builds can be inspected afterwards.

use crate::error::{BuildError, BuildResult};
use anyhow::Context;
use camino::{Utf8Path, Utf8PathBuf};
use fs_err as fs;
use tracing::debug;

/// Name prefix of generated workspaces.
pub const EPHEMERAL_PREFIX: &str = "securefs";

/// In-memory filesystem preferred for generated workspaces.
pub const SHM_DIR: &str = "/dev/shm";

/// An existing directory that build artifacts are written to.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedWorkspace {
    pub path: Utf8PathBuf,
    /// True when the directory was generated rather than user-supplied.
    pub ephemeral: bool,
}

/// Resolve (and create) the workspace for `build_root`.
pub fn resolve_workspace(build_root: Option<&Utf8Path>) -> BuildResult<ResolvedWorkspace> {
    match build_root {
        Some(root) => prepare_user_root(root),
        None => create_ephemeral(&ephemeral_base()?),
    }
}

fn prepare_user_root(root: &Utf8Path) -> BuildResult<ResolvedWorkspace> {
    fs::create_dir_all(root).map_err(|source| BuildError::Workspace {
        path: root.to_path_buf(),
        source,
    })?;
    let path = camino::absolute_utf8(root)
        .with_context(|| format!("make build root {root} absolute"))?;
    debug!(workspace = %path, "using supplied build root");
    Ok(ResolvedWorkspace {
        path,
        ephemeral: false,
    })
}

/// Create a uniquely named, persistent `securefs*` directory under `base`.
pub fn create_ephemeral(base: &Utf8Path) -> BuildResult<ResolvedWorkspace> {
    let dir = tempfile::Builder::new()
        .prefix(EPHEMERAL_PREFIX)
        .tempdir_in(base)
        .map_err(|source| BuildError::Workspace {
            path: base.join(format!("{EPHEMERAL_PREFIX}*")),
            source,
        })?;
    let path = Utf8PathBuf::from_path_buf(dir.keep())
        .map_err(|p| anyhow::anyhow!("workspace path is not UTF-8: {}", p.display()))?;
    debug!(workspace = %path, "created ephemeral build root");
    Ok(ResolvedWorkspace {
        path,
        ephemeral: true,
    })
}

/// `/dev/shm` when it is a directory, otherwise the system temp dir.
fn ephemeral_base() -> BuildResult<Utf8PathBuf> {
    if cfg!(unix) && Utf8Path::new(SHM_DIR).is_dir() {
        return Ok(Utf8PathBuf::from(SHM_DIR));
    }
    let tmp = std::env::temp_dir();
    Utf8PathBuf::from_path_buf(tmp)
        .map_err(|p| anyhow::anyhow!("temp dir is not UTF-8: {}", p.display()).into())
}
