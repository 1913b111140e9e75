//! Default host-backed port implementations, plus in-memory doubles.

use crate::invocation::Invocation;
use crate::ports::{CommandRunner, HostEnv};
use anyhow::Context;
use camino::Utf8PathBuf;
use std::cell::RefCell;
use std::collections::HashMap;
use std::process::Command;
use tracing::debug;

/// Reads the real process environment.
#[derive(Debug, Clone, Default)]
pub struct SystemHostEnv;

impl HostEnv for SystemHostEnv {
    fn var(&self, key: &str) -> Option<String> {
        std::env::var(key).ok()
    }

    fn find_executable(&self, name: &str) -> Option<Utf8PathBuf> {
        let found = which::which(name).ok()?;
        match Utf8PathBuf::from_path_buf(found) {
            Ok(path) => Some(path),
            Err(path) => {
                debug!(path = %path.display(), "ignoring non-UTF-8 executable path");
                None
            }
        }
    }

    fn home_dir(&self) -> Option<Utf8PathBuf> {
        dirs::home_dir().and_then(|p| Utf8PathBuf::from_path_buf(p).ok())
    }
}

/// Runs commands with `std::process`, inheriting stdio.
#[derive(Debug, Clone, Default)]
pub struct ProcessRunner;

impl CommandRunner for ProcessRunner {
    fn run(&self, invocation: &Invocation) -> anyhow::Result<Option<i32>> {
        let status = Command::new(&invocation.program)
            .args(&invocation.args)
            .current_dir(&invocation.cwd)
            .status()
            .with_context(|| format!("launch {} in {}", invocation.program, invocation.cwd))?;
        Ok(status.code())
    }
}

/// Fixed environment for embedding and testing.
#[derive(Debug, Clone, Default)]
pub struct FixedHostEnv {
    vars: HashMap<String, String>,
    executables: HashMap<String, Utf8PathBuf>,
    home: Option<Utf8PathBuf>,
}

impl FixedHostEnv {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_var(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.vars.insert(key.into(), value.into());
        self
    }

    pub fn with_executable(mut self, name: impl Into<String>, path: impl Into<Utf8PathBuf>) -> Self {
        self.executables.insert(name.into(), path.into());
        self
    }

    pub fn with_home(mut self, home: impl Into<Utf8PathBuf>) -> Self {
        self.home = Some(home.into());
        self
    }
}

impl HostEnv for FixedHostEnv {
    fn var(&self, key: &str) -> Option<String> {
        self.vars.get(key).cloned()
    }

    fn find_executable(&self, name: &str) -> Option<Utf8PathBuf> {
        self.executables.get(name).cloned()
    }

    fn home_dir(&self) -> Option<Utf8PathBuf> {
        self.home.clone()
    }
}

/// Execution-tracing runner: records every invocation instead of launching it.
///
/// Each call returns the next scripted exit code; once the script runs out,
/// every further call succeeds with code 0.
#[derive(Debug, Default)]
pub struct RecordingRunner {
    codes: RefCell<Vec<Option<i32>>>,
    calls: RefCell<Vec<Invocation>>,
}

impl RecordingRunner {
    /// A runner whose commands all succeed.
    pub fn succeeding() -> Self {
        Self::default()
    }

    /// A runner that answers the first calls with `codes`, in order.
    pub fn with_exit_codes(codes: impl IntoIterator<Item = Option<i32>>) -> Self {
        let mut codes: Vec<_> = codes.into_iter().collect();
        codes.reverse();
        Self {
            codes: RefCell::new(codes),
            calls: RefCell::new(Vec::new()),
        }
    }

    /// Invocations seen so far, in launch order.
    pub fn calls(&self) -> Vec<Invocation> {
        self.calls.borrow().clone()
    }
}

impl CommandRunner for RecordingRunner {
    fn run(&self, invocation: &Invocation) -> anyhow::Result<Option<i32>> {
        self.calls.borrow_mut().push(invocation.clone());
        Ok(self.codes.borrow_mut().pop().unwrap_or(Some(0)))
    }
}
