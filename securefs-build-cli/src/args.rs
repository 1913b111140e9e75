//! Command-line arguments.
//!
//! Flag names keep the historical underscore spelling (`--vcpkg_root`);
//! kebab-case aliases are accepted as well.

use camino::Utf8PathBuf;
use clap::Parser;

#[derive(Debug, Clone, Default, Parser)]
#[command(
    name = "securefs-build",
    version,
    about = "Configure, build and optionally test securefs with cmake and vcpkg."
)]
pub struct Cli {
    /// The root of the vcpkg repository (default: $VCPKG_ROOT, vcpkg on PATH, or ~/vcpkg).
    #[arg(long = "vcpkg_root", visible_alias = "vcpkg-root", value_name = "PATH")]
    pub vcpkg_root: Option<Utf8PathBuf>,

    /// The root of the build directory. If unset, a temporary directory is used.
    #[arg(long = "build_root", visible_alias = "build-root", value_name = "PATH")]
    pub build_root: Option<Utf8PathBuf>,

    /// Enable all tests (same as --enable_unit_test --enable_integration_test).
    #[arg(long = "enable_test", visible_alias = "enable-test", default_value_t = false)]
    pub enable_test: bool,

    /// Run unit tests after building to ensure correctness.
    #[arg(
        long = "enable_unit_test",
        visible_alias = "enable-unit-test",
        default_value_t = false
    )]
    pub enable_unit_test: bool,

    /// Run integration tests after building to ensure correctness.
    #[arg(
        long = "enable_integration_test",
        visible_alias = "enable-integration-test",
        default_value_t = false
    )]
    pub enable_integration_test: bool,

    /// Override the default vcpkg triplet (an empty value selects none).
    #[arg(long)]
    pub triplet: Option<String>,

    /// Additional CMake definitions. Example: FOO=BAR
    #[arg(
        long = "cmake_defines",
        visible_alias = "cmake-defines",
        value_name = "KEY=VALUE",
        num_args = 0..
    )]
    pub cmake_defines: Vec<String>,

    /// Configuration file (default: securefs-build.toml in the source tree, if present).
    #[arg(long, value_name = "PATH")]
    pub config: Option<Utf8PathBuf>,
}
