//! Embeddable core library for securefs-build.
//!
//! Resolves where the vcpkg toolchain file lives, where build artifacts go,
//! and which `cmake`/`ctest` invocations to run, then runs them in order.
//! Nothing here depends on clap, so the pipeline can be linked into other
//! hosts or driven from tests.
//!
//! # Port traits
//!
//! All host interaction that needs to be faked is abstracted in [`ports`]:
//! - [`HostEnv`](ports::HostEnv) — environment variables, `PATH` search, home directory
//! - [`CommandRunner`](ports::CommandRunner) — launch one external command and wait for it
//!
//! The [`adapters`] module provides the real implementations plus in-memory
//! doubles.
//!
//! # Entry points
//!
//! - [`run_build`](pipeline::run_build) — locate, prepare, plan and execute
//! - [`build_invocations`](invocation::build_invocations) — the pure planning step

pub mod adapters;
pub mod error;
pub mod invocation;
pub mod locator;
pub mod pipeline;
pub mod ports;
pub mod settings;
pub mod workspace;

pub use error::{BuildError, BuildResult};
pub use invocation::{Invocation, Stage};
pub use settings::{BuildConfiguration, BuildOptions};
pub use workspace::ResolvedWorkspace;
