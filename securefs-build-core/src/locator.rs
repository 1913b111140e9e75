//! Locates the vcpkg CMake toolchain file.
//!
//! Roots are tried from most to least specific: explicit override, the
//! `VCPKG_ROOT` environment variable, a `vcpkg` executable on `PATH`, and
//! finally `~/vcpkg`. The first source that yields a root is the only one
//! used; a missing file under that root is an error, not a reason to keep
//! searching. Relative roots are made absolute against the current directory
//! before probing, since cmake runs from the build root.

use crate::error::{BuildError, BuildResult};
use crate::ports::HostEnv;
use crate::settings::BuildConfiguration;
use anyhow::Context;
use camino::{Utf8Path, Utf8PathBuf};
use tracing::debug;

pub const VCPKG_ROOT_ENV: &str = "VCPKG_ROOT";
pub const VCPKG_EXECUTABLE: &str = "vcpkg";
pub const HOME_DEFAULT_DIR: &str = "vcpkg";

/// Toolchain file location relative to a vcpkg root.
pub const TOOLCHAIN_SUBPATH: [&str; 3] = ["scripts", "buildsystems", "vcpkg.cmake"];

const NOT_FOUND_HINT: &str = "Pass --vcpkg_root (or set VCPKG_ROOT) to point at a vcpkg checkout. \
     Install from https://vcpkg.io if necessary.";

/// Where a candidate root came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RootSource {
    Override,
    Environment,
    SearchPath,
    HomeDefault,
}

impl RootSource {
    pub const fn as_str(&self) -> &'static str {
        match self {
            RootSource::Override => "override",
            RootSource::Environment => "environment",
            RootSource::SearchPath => "search-path",
            RootSource::HomeDefault => "home-default",
        }
    }
}

/// An existing toolchain file and the root it was derived from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedToolchain {
    pub root: Utf8PathBuf,
    pub file: Utf8PathBuf,
    pub source: RootSource,
}

type RootProbe = fn(&BuildConfiguration, &dyn HostEnv) -> Option<Utf8PathBuf>;

const PROBES: [(RootSource, RootProbe); 4] = [
    (RootSource::Override, from_override),
    (RootSource::Environment, from_environment),
    (RootSource::SearchPath, from_search_path),
    (RootSource::HomeDefault, from_home),
];

/// Resolve the toolchain file for `config`.
pub fn locate_toolchain(
    config: &BuildConfiguration,
    env: &dyn HostEnv,
) -> BuildResult<ResolvedToolchain> {
    let Some((source, root)) = PROBES
        .iter()
        .find_map(|(source, probe)| probe(config, env).map(|root| (*source, root)))
    else {
        debug!("no vcpkg root candidate from any source");
        return Err(BuildError::ToolchainNotFound {
            searched: Vec::new(),
            hint: NOT_FOUND_HINT.to_string(),
        });
    };

    let root = camino::absolute_utf8(&root)
        .with_context(|| format!("make vcpkg root {root} absolute"))?;
    let file = toolchain_file(&root);
    debug!(source = source.as_str(), root = %root, file = %file, "probing toolchain file");
    if !file.is_file() {
        return Err(BuildError::ToolchainNotFound {
            searched: vec![file],
            hint: NOT_FOUND_HINT.to_string(),
        });
    }

    Ok(ResolvedToolchain { root, file, source })
}

/// `<root>/scripts/buildsystems/vcpkg.cmake`.
pub fn toolchain_file(root: &Utf8Path) -> Utf8PathBuf {
    TOOLCHAIN_SUBPATH
        .iter()
        .fold(root.to_path_buf(), |path, part| path.join(part))
}

fn from_override(config: &BuildConfiguration, _env: &dyn HostEnv) -> Option<Utf8PathBuf> {
    config.toolchain_root_hint().map(Utf8Path::to_path_buf)
}

fn from_environment(_config: &BuildConfiguration, env: &dyn HostEnv) -> Option<Utf8PathBuf> {
    env.var(VCPKG_ROOT_ENV)
        .filter(|v| !v.is_empty())
        .map(Utf8PathBuf::from)
}

/// The parent of the directory holding the `vcpkg` executable.
fn from_search_path(_config: &BuildConfiguration, env: &dyn HostEnv) -> Option<Utf8PathBuf> {
    let exe = env.find_executable(VCPKG_EXECUTABLE)?;
    exe.parent()?.parent().map(Utf8Path::to_path_buf)
}

fn from_home(_config: &BuildConfiguration, env: &dyn HostEnv) -> Option<Utf8PathBuf> {
    env.home_dir().map(|home| home.join(HOME_DEFAULT_DIR))
}
