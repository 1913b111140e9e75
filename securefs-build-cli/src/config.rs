//! Configuration file loading for securefs-build.
//!
//! Discovers and loads `securefs-build.toml` from the source tree (or the
//! path given with `--config`) and merges it with CLI arguments. CLI values
//! take precedence.

use crate::args::Cli;
use anyhow::Context;
use camino::{Utf8Path, Utf8PathBuf};
use fs_err as fs;
use securefs_build_core::BuildOptions;
use serde::Deserialize;
use tracing::debug;

/// The config file name to search for.
pub const CONFIG_FILE_NAME: &str = "securefs-build.toml";

/// Top-level configuration from securefs-build.toml.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct SecurefsBuildConfig {
    /// Root of the vcpkg checkout. Counts as an explicit override.
    pub vcpkg_root: Option<Utf8PathBuf>,

    /// Persistent build directory.
    pub build_root: Option<Utf8PathBuf>,

    /// vcpkg triplet.
    pub triplet: Option<String>,

    /// CMake definitions placed before any given on the command line.
    pub cmake_defines: Vec<String>,

    pub tests: TestsConfig,
}

impl SecurefsBuildConfig {
    /// Anchor relative paths at `dir`.
    fn relative_to(mut self, dir: &Utf8Path) -> Self {
        for path in [&mut self.vcpkg_root, &mut self.build_root].into_iter().flatten() {
            if path.is_relative() {
                *path = dir.join(&*path);
            }
        }
        self
    }
}

/// Tests section of the config.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct TestsConfig {
    pub unit: bool,
    pub integration: bool,
}

/// Discover the config file in `source_dir`.
pub fn discover_config(source_dir: &Utf8Path) -> Option<Utf8PathBuf> {
    let config_path = source_dir.join(CONFIG_FILE_NAME);
    if config_path.is_file() {
        debug!("found config file at {}", config_path);
        Some(config_path)
    } else {
        debug!("no config file found at {}", config_path);
        None
    }
}

/// Load and parse a config file.
///
/// Relative `vcpkg_root` and `build_root` values are taken relative to the
/// directory holding the file.
pub fn load_config(path: &Utf8Path) -> anyhow::Result<SecurefsBuildConfig> {
    let contents =
        fs::read_to_string(path).with_context(|| format!("read config file {}", path))?;
    let config =
        parse_config(&contents).with_context(|| format!("parse config file {}", path))?;
    Ok(match path.parent() {
        Some(dir) => config.relative_to(dir),
        None => config,
    })
}

/// Parse a config file from a string.
pub fn parse_config(contents: &str) -> anyhow::Result<SecurefsBuildConfig> {
    let config: SecurefsBuildConfig = toml::from_str(contents).context("invalid TOML")?;
    Ok(config)
}

/// Load the explicit config if given, else the discovered one, else defaults.
pub fn load_or_default(
    explicit: Option<&Utf8Path>,
    source_dir: &Utf8Path,
) -> anyhow::Result<SecurefsBuildConfig> {
    match explicit.map(Utf8Path::to_path_buf).or_else(|| discover_config(source_dir)) {
        Some(path) => load_config(&path),
        None => Ok(SecurefsBuildConfig::default()),
    }
}

/// Builder for merging a config file with CLI arguments.
pub struct ConfigMerger {
    config: SecurefsBuildConfig,
}

impl ConfigMerger {
    pub fn new(config: SecurefsBuildConfig) -> Self {
        Self { config }
    }

    /// Merge with the CLI arguments.
    ///
    /// Scalars from the CLI replace file values. CLI defines are appended to
    /// the file's. Test toggles can only be switched on.
    pub fn merge_cli(self, cli: &Cli) -> BuildOptions {
        let mut cmake_defines = self.config.cmake_defines;
        cmake_defines.extend(cli.cmake_defines.iter().cloned());

        BuildOptions {
            vcpkg_root: cli.vcpkg_root.clone().or(self.config.vcpkg_root),
            build_root: cli.build_root.clone().or(self.config.build_root),
            enable_test: cli.enable_test,
            enable_unit_test: cli.enable_unit_test || self.config.tests.unit,
            enable_integration_test: cli.enable_integration_test
                || self.config.tests.integration,
            triplet: cli.triplet.clone().or(self.config.triplet),
            cmake_defines,
        }
    }
}
