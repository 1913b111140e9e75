//! Clap-free build settings.
//!
//! [`BuildOptions`] is the raw, user-facing shape (what the CLI and the
//! config file fill in). [`BuildOptions::resolve`] turns it into an immutable
//! [`BuildConfiguration`] with every execution-relevant default applied.

use crate::error::{BuildError, BuildResult};
use camino::{Utf8Path, Utf8PathBuf};

/// Triplet used when none is given on a Windows host.
pub const WINDOWS_DEFAULT_TRIPLET: &str = "x64-windows-static-md";

/// Raw options as supplied by the user.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BuildOptions {
    pub vcpkg_root: Option<Utf8PathBuf>,
    pub build_root: Option<Utf8PathBuf>,
    /// Legacy switch that turns on both test categories.
    pub enable_test: bool,
    pub enable_unit_test: bool,
    pub enable_integration_test: bool,
    /// `None` selects the host default; `Some("")` explicitly selects none.
    pub triplet: Option<String>,
    pub cmake_defines: Vec<String>,
}

/// Fully resolved configuration for one run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BuildConfiguration {
    toolchain_root_hint: Option<Utf8PathBuf>,
    build_root: Option<Utf8PathBuf>,
    enable_unit_test: bool,
    enable_integration_test: bool,
    triplet: Option<String>,
    cmake_defines: Vec<String>,
    source_dir: Utf8PathBuf,
}

impl BuildOptions {
    /// Validate and normalize into a [`BuildConfiguration`].
    ///
    /// `enable_test` is applied after the individual toggles and wins.
    pub fn resolve(self, source_dir: impl Into<Utf8PathBuf>) -> BuildResult<BuildConfiguration> {
        for define in &self.cmake_defines {
            validate_define(define)?;
        }

        let mut enable_unit_test = self.enable_unit_test;
        let mut enable_integration_test = self.enable_integration_test;
        if self.enable_test {
            enable_unit_test = true;
            enable_integration_test = true;
        }

        let triplet = match self.triplet {
            Some(t) => Some(t),
            None => default_triplet().map(str::to_string),
        }
        .filter(|t| !t.is_empty());

        Ok(BuildConfiguration {
            toolchain_root_hint: self.vcpkg_root.filter(|p| !p.as_str().is_empty()),
            build_root: self.build_root.filter(|p| !p.as_str().is_empty()),
            enable_unit_test,
            enable_integration_test,
            triplet,
            cmake_defines: self.cmake_defines,
            source_dir: source_dir.into(),
        })
    }
}

impl BuildConfiguration {
    pub fn toolchain_root_hint(&self) -> Option<&Utf8Path> {
        self.toolchain_root_hint.as_deref()
    }

    pub fn build_root(&self) -> Option<&Utf8Path> {
        self.build_root.as_deref()
    }

    pub fn enable_unit_test(&self) -> bool {
        self.enable_unit_test
    }

    pub fn enable_integration_test(&self) -> bool {
        self.enable_integration_test
    }

    /// Whether the test stage runs at all.
    pub fn runs_tests(&self) -> bool {
        self.enable_unit_test || self.enable_integration_test
    }

    pub fn triplet(&self) -> Option<&str> {
        self.triplet.as_deref()
    }

    pub fn cmake_defines(&self) -> &[String] {
        &self.cmake_defines
    }

    pub fn source_dir(&self) -> &Utf8Path {
        &self.source_dir
    }
}

/// The host-dependent default triplet. Only Windows hosts have one.
pub fn default_triplet() -> Option<&'static str> {
    if cfg!(windows) {
        Some(WINDOWS_DEFAULT_TRIPLET)
    } else {
        None
    }
}

/// A define must look like `KEY=VALUE` (or `KEY:TYPE=VALUE`) with a non-empty key.
fn validate_define(define: &str) -> BuildResult<()> {
    match define.split_once('=') {
        Some((key, _)) if !key.trim().is_empty() => Ok(()),
        _ => Err(BuildError::invalid_argument(format!(
            "cmake define '{define}' must have the form KEY=VALUE"
        ))),
    }
}
