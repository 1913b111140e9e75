//! Command-line front end for securefs-build.
//!
//! [`args`] holds the clap surface, [`config`] the optional
//! `securefs-build.toml` file and the merge of both into
//! [`BuildOptions`](securefs_build_core::BuildOptions).

pub mod args;
pub mod config;

use camino::{Utf8Path, Utf8PathBuf};

/// The securefs source tree: the repository root this tool is built from.
pub fn source_dir() -> Utf8PathBuf {
    let manifest_dir = Utf8Path::new(env!("CARGO_MANIFEST_DIR"));
    manifest_dir
        .parent()
        .unwrap_or(manifest_dir)
        .to_path_buf()
}
