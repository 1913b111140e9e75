//! CLI behaviour tests.
//!
//! The pipeline tests put fake `cmake` and `ctest` scripts on `PATH`; each
//! appends its working directory and arguments to a log file, so the order
//! and shape of every launched command can be checked.

#![allow(deprecated)]

use assert_cmd::Command;
use predicates::prelude::*;
use std::fs;
use std::path::{Path, PathBuf};
use tempfile::TempDir;

const TOOL_FAILURE_EXIT: i32 = 125;

fn securefs_build() -> Command {
    let mut cmd = Command::cargo_bin("securefs-build").expect("securefs-build binary");
    cmd.env_remove("VCPKG_ROOT").env_remove("RUST_LOG");
    cmd
}

fn source_dir() -> PathBuf {
    let manifest_dir = Path::new(env!("CARGO_MANIFEST_DIR"));
    manifest_dir.parent().unwrap_or(manifest_dir).to_path_buf()
}

/// Temp layout: `vcpkg/` with a toolchain file, `home/`, `bin/` for fakes.
struct Sandbox {
    temp: TempDir,
}

impl Sandbox {
    fn new() -> Self {
        let temp = tempfile::tempdir().expect("tempdir");
        let toolchain = temp.path().join("vcpkg/scripts/buildsystems");
        fs::create_dir_all(&toolchain).unwrap();
        fs::write(toolchain.join("vcpkg.cmake"), "# toolchain\n").unwrap();
        fs::create_dir_all(temp.path().join("home")).unwrap();
        fs::create_dir_all(temp.path().join("bin")).unwrap();
        Self { temp }
    }

    fn path(&self, rel: &str) -> PathBuf {
        self.temp.path().join(rel)
    }

    fn log(&self) -> PathBuf {
        self.path("calls.log")
    }

    fn logged_calls(&self) -> Vec<String> {
        fs::read_to_string(self.log())
            .map(|s| s.lines().map(str::to_string).collect())
            .unwrap_or_default()
    }

    #[cfg(unix)]
    fn install_fakes(&self) {
        use std::os::unix::fs::PermissionsExt;

        let cmake = r#"#!/bin/sh
echo "cwd=$(pwd) cmake $*" >> "$FAKE_LOG"
if [ "$1" = "--build" ]; then exit "${FAKE_BUILD_EXIT:-0}"; fi
exit "${FAKE_CONFIGURE_EXIT:-0}"
"#;
        let ctest = r#"#!/bin/sh
echo "cwd=$(pwd) ctest $*" >> "$FAKE_LOG"
exit "${FAKE_TEST_EXIT:-0}"
"#;
        for (name, body) in [("cmake", cmake), ("ctest", ctest)] {
            let path = self.path("bin").join(name);
            fs::write(&path, body).unwrap();
            fs::set_permissions(&path, fs::Permissions::from_mode(0o755)).unwrap();
        }
    }

    /// Put an executable `<rel>/bin/vcpkg` next to a toolchain file under
    /// `<rel>`, and return that toolchain file.
    #[cfg(unix)]
    fn install_vcpkg_executable(&self, rel: &str) -> PathBuf {
        use std::os::unix::fs::PermissionsExt;

        let bin = self.path(rel).join("bin");
        fs::create_dir_all(&bin).unwrap();
        let exe = bin.join("vcpkg");
        fs::write(&exe, "#!/bin/sh\nexit 0\n").unwrap();
        fs::set_permissions(&exe, fs::Permissions::from_mode(0o755)).unwrap();
        self.vcpkg_checkout(rel)
    }

    /// The sandbox `bin/` followed by `<rel>`.
    #[cfg(unix)]
    fn search_path_with(&self, rel: &str) -> std::ffi::OsString {
        std::env::join_paths([self.path("bin"), self.path(rel)]).unwrap()
    }

    /// A command whose PATH is only the sandbox `bin/` and whose HOME is
    /// inside the sandbox, so no host toolchain can be picked up.
    fn command(&self) -> Command {
        let mut cmd = securefs_build();
        cmd.env("PATH", self.path("bin"))
            .env("HOME", self.path("home"))
            .env("FAKE_LOG", self.log());
        cmd
    }

    /// Create `<rel>/scripts/buildsystems/vcpkg.cmake` and return the file.
    #[cfg(unix)]
    fn vcpkg_checkout(&self, rel: &str) -> PathBuf {
        let dir = self.path(rel).join("scripts/buildsystems");
        fs::create_dir_all(&dir).unwrap();
        let file = dir.join("vcpkg.cmake");
        fs::write(&file, "# toolchain\n").unwrap();
        file
    }

    #[cfg(unix)]
    fn configure_call(&self) -> String {
        self.logged_calls().into_iter().next().expect("configure call")
    }
}

#[test]
fn help_exits_zero() {
    securefs_build()
        .arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("--vcpkg_root"))
        .stdout(predicate::str::contains("--cmake_defines"));
}

#[test]
fn unknown_flag_is_an_invalid_argument() {
    securefs_build()
        .arg("--no-such-flag")
        .assert()
        .code(TOOL_FAILURE_EXIT);
}

#[test]
fn malformed_define_launches_nothing() {
    let sb = Sandbox::new();
    sb.command()
        .arg("--vcpkg_root")
        .arg(sb.path("vcpkg"))
        .args(["--cmake_defines", "NOT_A_PAIR"])
        .assert()
        .code(TOOL_FAILURE_EXIT)
        .stderr(predicate::str::contains("KEY=VALUE"));
    assert!(sb.logged_calls().is_empty());
}

#[test]
fn missing_toolchain_launches_nothing() {
    let sb = Sandbox::new();
    sb.command()
        .arg("--vcpkg_root")
        .arg(sb.path("home"))
        .assert()
        .code(TOOL_FAILURE_EXIT)
        .stderr(predicate::str::contains("vcpkg toolchain file not found"))
        .stderr(predicate::str::contains("--vcpkg_root"));
    assert!(sb.logged_calls().is_empty());
}

#[test]
fn invalid_config_file_is_rejected() {
    let sb = Sandbox::new();
    let config = sb.path("bad.toml");
    fs::write(&config, "triplet = [").unwrap();
    sb.command()
        .arg("--vcpkg_root")
        .arg(sb.path("vcpkg"))
        .arg("--config")
        .arg(&config)
        .assert()
        .code(TOOL_FAILURE_EXIT)
        .stderr(predicate::str::contains("bad.toml"));
    assert!(sb.logged_calls().is_empty());
}

#[cfg(unix)]
#[test]
fn unit_test_scenario_runs_all_three_stages() {
    let sb = Sandbox::new();
    sb.install_fakes();

    let output = sb
        .command()
        .arg("--enable_unit_test")
        .arg("--triplet=x64-test")
        .arg("--vcpkg_root")
        .arg(sb.path("vcpkg"))
        .args(["--cmake_defines", "FOO=BAR"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Build succeeds"))
        .get_output()
        .clone();

    let calls = sb.logged_calls();
    assert_eq!(calls.len(), 3, "{calls:?}");

    let (cwd, configure) = calls[0].split_once(' ').expect("cwd prefix");
    let workspace = PathBuf::from(cwd.trim_start_matches("cwd="));
    let toolchain = sb.path("vcpkg/scripts/buildsystems/vcpkg.cmake");
    assert_eq!(
        configure,
        format!(
            "cmake -DCMAKE_BUILD_TYPE=Release -DCMAKE_TOOLCHAIN_FILE={} \
             -DVCPKG_TARGET_TRIPLET=x64-test -DSECUREFS_ENABLE_INTEGRATION_TEST=OFF \
             -DFOO=BAR {}",
            toolchain.display(),
            source_dir().display()
        )
    );
    assert!(calls[1].ends_with("cmake --build . --config Release"));
    assert!(calls[2].ends_with("ctest -V -C Release"));
    for call in &calls {
        assert!(call.starts_with(&format!("cwd={} ", workspace.display())));
    }

    let name = workspace.file_name().and_then(|n| n.to_str()).expect("name");
    assert!(name.starts_with("securefs"), "{name}");
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains(name));

    fs::remove_dir_all(&workspace).ok();
}

#[cfg(unix)]
#[test]
fn configure_failure_mirrors_exit_code_and_stops() {
    let sb = Sandbox::new();
    sb.install_fakes();
    let build_root = sb.path("build");

    sb.command()
        .env("FAKE_CONFIGURE_EXIT", "2")
        .arg("--enable_test")
        .arg("--vcpkg_root")
        .arg(sb.path("vcpkg"))
        .arg("--build_root")
        .arg(&build_root)
        .assert()
        .code(2)
        .stderr(predicate::str::contains("exit code 2"));

    let calls = sb.logged_calls();
    assert_eq!(calls.len(), 1, "{calls:?}");
    assert!(calls[0].contains(" cmake -DCMAKE_BUILD_TYPE=Release "));
    assert!(build_root.is_dir());
}

#[cfg(unix)]
#[test]
fn test_stage_skipped_without_tests() {
    let sb = Sandbox::new();
    sb.install_fakes();

    sb.command()
        .arg("--vcpkg_root")
        .arg(sb.path("vcpkg"))
        .arg("--build_root")
        .arg(sb.path("build"))
        .assert()
        .success();

    let calls = sb.logged_calls();
    assert_eq!(calls.len(), 2, "{calls:?}");
    assert!(calls[0].contains("-DSECUREFS_ENABLE_UNIT_TEST=OFF"));
    assert!(calls[0].contains("-DSECUREFS_ENABLE_INTEGRATION_TEST=OFF"));
}

#[cfg(unix)]
#[test]
fn home_default_is_used_without_override() {
    let sb = Sandbox::new();
    sb.install_fakes();
    let home_vcpkg = sb.path("home/vcpkg/scripts/buildsystems");
    fs::create_dir_all(&home_vcpkg).unwrap();
    fs::write(home_vcpkg.join("vcpkg.cmake"), "").unwrap();

    sb.command()
        .arg("--build_root")
        .arg(sb.path("build"))
        .assert()
        .success();

    assert!(sb.configure_call().contains(&format!(
        "-DCMAKE_TOOLCHAIN_FILE={}",
        home_vcpkg.join("vcpkg.cmake").display()
    )));
}

#[cfg(unix)]
#[test]
fn environment_variable_beats_search_path_and_home() {
    let sb = Sandbox::new();
    sb.install_fakes();
    sb.vcpkg_checkout("home/vcpkg");
    let from_env = sb.vcpkg_checkout("env-vcpkg");
    sb.install_vcpkg_executable("tool");

    sb.command()
        .env("PATH", sb.search_path_with("tool/bin"))
        .env("VCPKG_ROOT", sb.path("env-vcpkg"))
        .arg("--build_root")
        .arg(sb.path("build"))
        .assert()
        .success();

    assert!(
        sb.configure_call()
            .contains(&format!("-DCMAKE_TOOLCHAIN_FILE={} ", from_env.display()))
    );
}

#[cfg(unix)]
#[test]
fn vcpkg_on_search_path_beats_home() {
    let sb = Sandbox::new();
    sb.install_fakes();
    sb.vcpkg_checkout("home/vcpkg");
    let from_path = sb.install_vcpkg_executable("tool");

    sb.command()
        .env("PATH", sb.search_path_with("tool/bin"))
        .arg("--build_root")
        .arg(sb.path("build"))
        .assert()
        .success();

    assert!(
        sb.configure_call()
            .contains(&format!("-DCMAKE_TOOLCHAIN_FILE={} ", from_path.display()))
    );
}

#[cfg(unix)]
#[test]
fn relative_vcpkg_root_is_passed_as_absolute() {
    let sb = Sandbox::new();
    sb.install_fakes();
    let toolchain = sb.vcpkg_checkout("rel/vcpkg");

    sb.command()
        .current_dir(sb.path("rel"))
        .args(["--vcpkg_root", "vcpkg"])
        .arg("--build_root")
        .arg(sb.path("build"))
        .assert()
        .success();

    assert!(
        sb.configure_call()
            .contains(&format!("-DCMAKE_TOOLCHAIN_FILE={} ", toolchain.display()))
    );
}

#[cfg(unix)]
#[test]
fn config_file_enables_tests_and_prepends_defines() {
    let sb = Sandbox::new();
    sb.install_fakes();
    let config = sb.path("securefs-build.toml");
    fs::write(
        &config,
        format!(
            "vcpkg_root = \"{}\"\ncmake_defines = [\"FROM_FILE=1\"]\n\n[tests]\nintegration = true\n",
            sb.path("vcpkg").display()
        ),
    )
    .unwrap();

    sb.command()
        .arg("--config")
        .arg(&config)
        .arg("--build_root")
        .arg(sb.path("build"))
        .args(["--cmake_defines", "FROM_CLI=2"])
        .assert()
        .success();

    let calls = sb.logged_calls();
    assert_eq!(calls.len(), 3, "{calls:?}");
    assert!(calls[0].contains("-DSECUREFS_ENABLE_UNIT_TEST=OFF -DFROM_FILE=1 -DFROM_CLI=2 "));
    assert!(!calls[0].contains("SECUREFS_ENABLE_INTEGRATION_TEST"));
}
