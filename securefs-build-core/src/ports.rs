//! Port traits abstracting host access away from the pipeline.

use crate::invocation::Invocation;
use camino::Utf8PathBuf;

/// Read-only queries against the host environment.
pub trait HostEnv {
    /// Value of an environment variable, if set and valid UTF-8.
    fn var(&self, key: &str) -> Option<String>;

    /// Locate an executable on the search path.
    fn find_executable(&self, name: &str) -> Option<Utf8PathBuf>;

    fn home_dir(&self) -> Option<Utf8PathBuf>;
}

/// Launches external commands.
pub trait CommandRunner {
    /// Run `invocation` to completion in its working directory.
    ///
    /// Returns the exit code, or `None` when the process was terminated
    /// without one. Errors mean the process could not be launched at all.
    fn run(&self, invocation: &Invocation) -> anyhow::Result<Option<i32>>;
}
