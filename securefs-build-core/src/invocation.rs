//! Pure planning: configuration in, command lines out.

use crate::settings::BuildConfiguration;
use camino::{Utf8Path, Utf8PathBuf};
use std::fmt;

pub const CMAKE: &str = "cmake";
pub const CTEST: &str = "ctest";
pub const BUILD_CONFIG: &str = "Release";

pub const UNIT_TEST_SWITCH: &str = "SECUREFS_ENABLE_UNIT_TEST";
pub const INTEGRATION_TEST_SWITCH: &str = "SECUREFS_ENABLE_INTEGRATION_TEST";

/// Pipeline stage an invocation belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Stage {
    Configure,
    Build,
    Test,
}

impl Stage {
    pub const fn as_str(&self) -> &'static str {
        match self {
            Stage::Configure => "configure",
            Stage::Build => "build",
            Stage::Test => "test",
        }
    }
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One external command: program, arguments and the directory to run it in.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Invocation {
    pub stage: Stage,
    pub program: String,
    pub args: Vec<String>,
    pub cwd: Utf8PathBuf,
}

impl Invocation {
    fn new<I, S>(stage: Stage, program: &str, args: I, cwd: &Utf8Path) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            stage,
            program: program.to_string(),
            args: args.into_iter().map(Into::into).collect(),
            cwd: cwd.to_path_buf(),
        }
    }

    /// The command line as a single printable string.
    pub fn command_line(&self) -> String {
        std::iter::once(self.program.as_str())
            .chain(self.args.iter().map(String::as_str))
            .collect::<Vec<_>>()
            .join(" ")
    }
}

impl fmt::Display for Invocation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.command_line())
    }
}

/// `-D` directives for the configure stage, excluding the trailing source dir.
///
/// Order: build type, toolchain file, triplet, test switches, user defines.
pub fn configure_directives(config: &BuildConfiguration, toolchain_file: &Utf8Path) -> Vec<String> {
    let mut directives = vec![
        format!("-DCMAKE_BUILD_TYPE={BUILD_CONFIG}"),
        format!("-DCMAKE_TOOLCHAIN_FILE={toolchain_file}"),
    ];
    if let Some(triplet) = config.triplet() {
        directives.push(format!("-DVCPKG_TARGET_TRIPLET={triplet}"));
    }
    directives.extend(test_switch_directives(config));
    directives.extend(config.cmake_defines().iter().map(|d| format!("-D{d}")));
    directives
}

/// Switches that compile out the test categories the user did not enable.
pub fn test_switch_directives(config: &BuildConfiguration) -> Vec<String> {
    let mut directives = Vec::new();
    if !config.enable_unit_test() {
        directives.push(format!("-D{UNIT_TEST_SWITCH}=OFF"));
    }
    if !config.enable_integration_test() {
        directives.push(format!("-D{INTEGRATION_TEST_SWITCH}=OFF"));
    }
    directives
}

/// Every invocation of a run, in execution order, all rooted at `workspace`.
pub fn build_invocations(
    config: &BuildConfiguration,
    toolchain_file: &Utf8Path,
    workspace: &Utf8Path,
) -> Vec<Invocation> {
    let mut configure_args = configure_directives(config, toolchain_file);
    configure_args.push(config.source_dir().to_string());

    let mut invocations = vec![
        Invocation::new(Stage::Configure, CMAKE, configure_args, workspace),
        Invocation::new(
            Stage::Build,
            CMAKE,
            ["--build", ".", "--config", BUILD_CONFIG],
            workspace,
        ),
    ];
    if config.runs_tests() {
        invocations.push(Invocation::new(
            Stage::Test,
            CTEST,
            ["-V", "-C", BUILD_CONFIG],
            workspace,
        ));
    }
    invocations
}
