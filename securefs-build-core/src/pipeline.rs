//! The configure/build/test pipeline.
//!
//! All host access goes through the port traits, so the same entry point
//! serves the CLI and the scenario tests.

use crate::error::{BuildError, BuildResult};
use crate::invocation::{Invocation, build_invocations};
use crate::locator::{ResolvedToolchain, locate_toolchain};
use crate::ports::{CommandRunner, HostEnv};
use crate::settings::BuildConfiguration;
use crate::workspace::{ResolvedWorkspace, resolve_workspace};
use camino::{Utf8Path, Utf8PathBuf};
use tracing::{debug, info, warn};

/// Base name of the binary the build produces.
pub const BINARY_NAME: &str = "securefs";

/// Outcome of a successful `run_build`.
#[derive(Debug, Clone)]
pub struct BuildOutcome {
    pub toolchain: ResolvedToolchain,
    pub workspace: ResolvedWorkspace,
    /// Invocations that ran, in order.
    pub executed: Vec<Invocation>,
    /// Where the built binary is expected to be.
    pub binary: Utf8PathBuf,
}

/// Locate the toolchain, prepare the workspace, then run every stage.
///
/// Nothing is launched unless both resolutions succeed. The first stage
/// that exits nonzero stops the run.
pub fn run_build(
    config: &BuildConfiguration,
    env: &dyn HostEnv,
    runner: &dyn CommandRunner,
) -> BuildResult<BuildOutcome> {
    let toolchain = locate_toolchain(config, env)?;
    info!(
        "using vcpkg toolchain {} ({})",
        toolchain.file,
        toolchain.source.as_str()
    );

    let workspace = resolve_workspace(config.build_root())?;
    info!("build root: {}", workspace.path);

    let invocations = build_invocations(config, &toolchain.file, &workspace.path);
    let executed = execute(&invocations, runner).inspect_err(|_| {
        if workspace.ephemeral {
            warn!("generated build root {} is kept for inspection", workspace.path);
        }
    })?;

    Ok(BuildOutcome {
        binary: binary_path(&workspace.path),
        toolchain,
        workspace,
        executed,
    })
}

/// Run `invocations` in order, stopping at the first failure.
pub fn execute(
    invocations: &[Invocation],
    runner: &dyn CommandRunner,
) -> BuildResult<Vec<Invocation>> {
    let mut executed = Vec::with_capacity(invocations.len());
    for invocation in invocations {
        info!(stage = invocation.stage.as_str(), "executing {}", invocation);
        let code = runner.run(invocation)?;
        executed.push(invocation.clone());
        if code != Some(0) {
            return Err(BuildError::ExternalCommandFailed {
                command: invocation.command_line(),
                code,
            });
        }
        debug!(stage = invocation.stage.as_str(), "stage succeeded");
    }
    Ok(executed)
}

/// The binary location inside `workspace`, canonicalized when it exists.
pub fn binary_path(workspace: &Utf8Path) -> Utf8PathBuf {
    let binary = workspace.join(format!("{BINARY_NAME}{}", std::env::consts::EXE_SUFFIX));
    binary.canonicalize_utf8().unwrap_or(binary)
}
