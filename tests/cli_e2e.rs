//! End-to-end tests for the `mesongo` binary.
//!
//! Every test points `MESONGO_HOME` at a scratch directory so the user's own
//! configuration and templates are never touched. Tests that need a build
//! substitute `true`/`false` for meson and ninja through `config.toml`.

use assert_cmd::cargo::cargo_bin_cmd;
use assert_fs::prelude::*;
use assert_fs::TempDir;
use predicates::prelude::*;

const DESCRIPTOR: &str = "project('demo', 'cpp')\n\
build_dir_where = 'builddir'\n\
output_dir = 'bin'\n\
output_name = 'demo'\n";

fn project() -> TempDir {
    let temp = TempDir::new().unwrap();
    temp.child("meson.build").write_str(DESCRIPTOR).unwrap();
    temp.child("src/main.cpp").write_str("int main() {}\n").unwrap();
    temp
}

fn home_with_tools(meson: &str, ninja: &str) -> TempDir {
    let home = TempDir::new().unwrap();
    home.child("config.toml")
        .write_str(&format!("[tools]\nmeson = \"{}\"\nninja = \"{}\"\n", meson, ninja))
        .unwrap();
    home
}

/// Exit code 0 for --help, with the group and template sections shown.
#[test]
fn test_help_exits_zero() {
    let home = TempDir::new().unwrap();
    cargo_bin_cmd!("mesongo")
        .env("MESONGO_HOME", home.path())
        .arg("--help")
        .assert()
        .code(0)
        .stdout(predicate::str::contains("-Ae ARGS"))
        .stdout(predicate::str::contains("-T create"));
}

/// A negative search depth is a usage error.
#[test]
fn test_negative_search_depth_exits_one() {
    let home = TempDir::new().unwrap();
    cargo_bin_cmd!("mesongo")
        .env("MESONGO_HOME", home.path())
        .args(["-ms", "-1"])
        .assert()
        .code(1);
}

#[test]
fn test_unknown_flag_exits_one() {
    let home = TempDir::new().unwrap();
    cargo_bin_cmd!("mesongo")
        .env("MESONGO_HOME", home.path())
        .arg("-q")
        .assert()
        .code(1);
}

#[test]
fn test_no_descriptor_within_depth_exits_one() {
    let home = TempDir::new().unwrap();
    let temp = TempDir::new().unwrap();
    cargo_bin_cmd!("mesongo")
        .env("MESONGO_HOME", home.path())
        .current_dir(temp.path())
        .args(["-ms", "0"])
        .assert()
        .code(1)
        .stdout(predicate::str::contains("meson.build could not be found"));
}

#[test]
fn test_missing_descriptor_variable_exits_one() {
    let home = TempDir::new().unwrap();
    let temp = TempDir::new().unwrap();
    temp.child("meson.build")
        .write_str("build_dir_where = 'builddir'\noutput_dir = 'bin'\n")
        .unwrap();
    cargo_bin_cmd!("mesongo")
        .env("MESONGO_HOME", home.path())
        .current_dir(temp.path())
        .arg("-nc")
        .assert()
        .code(1)
        .stdout(predicate::str::contains("output_name not found"));
}

#[test]
fn test_invalid_tool_config_exits_one() {
    let home = TempDir::new().unwrap();
    home.child("config.toml").write_str("[tools]\nmake = \"make\"\n").unwrap();
    let temp = project();
    cargo_bin_cmd!("mesongo")
        .env("MESONGO_HOME", home.path())
        .current_dir(temp.path())
        .arg("-nc")
        .assert()
        .code(1);
}

/// -clear from a subdirectory removes the build directory and the cache.
#[test]
fn test_clear_removes_artifacts() {
    let home = TempDir::new().unwrap();
    let temp = project();
    temp.child("builddir/bin/demo").write_str("").unwrap();
    temp.child(".sources_cache").write_str("src/main.cpp").unwrap();

    cargo_bin_cmd!("mesongo")
        .env("MESONGO_HOME", home.path())
        .current_dir(temp.child("src").path())
        .arg("-clear")
        .assert()
        .code(0);

    temp.child("builddir").assert(predicate::path::missing());
    temp.child(".sources_cache").assert(predicate::path::missing());
    temp.child("src/main.cpp").assert(predicate::path::exists());
    temp.child("meson.build").assert(predicate::path::exists());
}

/// With a configured build and unchanged sources nothing is spawned, so the
/// unresolvable tool names are never used.
#[test]
fn test_unchanged_sources_skip_setup() {
    let home = home_with_tools("mesongo-no-such-meson", "mesongo-no-such-ninja");
    let temp = project();
    temp.child("builddir").create_dir_all().unwrap();
    temp.child(".sources_cache").write_str("src/main.cpp").unwrap();

    cargo_bin_cmd!("mesongo")
        .env("MESONGO_HOME", home.path())
        .current_dir(temp.path())
        .args(["-nc", "-ne"])
        .assert()
        .code(0);

    temp.child(".sources_cache").assert("src/main.cpp");
}

/// A setup tool that cannot be started fails the run with exit code 1.
#[test]
fn test_setup_spawn_failure_exits_one() {
    let home = home_with_tools("mesongo-no-such-meson", "ninja");
    let temp = project();

    cargo_bin_cmd!("mesongo")
        .env("MESONGO_HOME", home.path())
        .current_dir(temp.path())
        .arg("-nc")
        .assert()
        .code(1);

    temp.child(".sources_cache").assert(predicate::path::missing());
}

#[cfg(unix)]
#[test]
fn test_compile_failure_exits_two() {
    let home = home_with_tools("true", "false");
    let temp = project();

    cargo_bin_cmd!("mesongo")
        .env("MESONGO_HOME", home.path())
        .current_dir(temp.path())
        .assert()
        .code(2);

    temp.child(".sources_cache").assert("src/main.cpp");
}

#[cfg(unix)]
#[test]
fn test_program_exit_code_is_propagated() {
    use std::os::unix::fs::PermissionsExt;

    let home = home_with_tools("true", "true");
    let temp = project();
    let program = temp.child("builddir/bin/demo");
    program.write_str("#!/bin/sh\necho \"ran with $1\"\nexit 5\n").unwrap();
    std::fs::set_permissions(program.path(), std::fs::Permissions::from_mode(0o755)).unwrap();

    cargo_bin_cmd!("mesongo")
        .env("MESONGO_HOME", home.path())
        .current_dir(temp.path())
        .args(["-nb", "-Ae", "first"])
        .assert()
        .code(5)
        .stdout(predicate::str::contains("ran with first"));
}

/// Ctrl-C while the program runs ends mesongo with 0, whatever the program
/// later exits with.
#[cfg(unix)]
#[test]
fn test_interrupt_during_execute_exits_zero() {
    use std::os::unix::fs::PermissionsExt;

    let home = home_with_tools("true", "true");
    let temp = project();
    let program = temp.child("builddir/bin/demo");
    program.write_str("#!/bin/sh\nkill -INT $PPID\nsleep 5\nexit 9\n").unwrap();
    std::fs::set_permissions(program.path(), std::fs::Permissions::from_mode(0o755)).unwrap();

    cargo_bin_cmd!("mesongo")
        .env("MESONGO_HOME", home.path())
        .current_dir(temp.path())
        .arg("-nb")
        .assert()
        .code(0);
}

/// A descriptor pointing the build directory above the project is refused
/// before anything is removed.
#[test]
fn test_clear_with_parent_build_dir_is_refused() {
    let home = TempDir::new().unwrap();
    let workspace = TempDir::new().unwrap();
    workspace.child("precious.txt").write_str("keep").unwrap();
    let project = workspace.child("project");
    project
        .child("meson.build")
        .write_str("build_dir_where = '..'\noutput_dir = 'bin'\noutput_name = 'demo'\n")
        .unwrap();

    cargo_bin_cmd!("mesongo")
        .env("MESONGO_HOME", home.path())
        .current_dir(project.path())
        .arg("-clear")
        .assert()
        .code(1)
        .stdout(predicate::str::contains("must stay inside the project"));

    project.child("meson.build").assert(predicate::path::exists());
    workspace.child("precious.txt").assert("keep");
}

#[test]
fn test_template_list_shows_sorted_names() {
    let home = TempDir::new().unwrap();
    home.child("templates/opengl/main.cpp").write_str("").unwrap();
    home.child("templates/console/main.cpp").write_str("").unwrap();
    let cwd = TempDir::new().unwrap();

    cargo_bin_cmd!("mesongo")
        .env("MESONGO_HOME", home.path())
        .env("NO_COLOR", "1")
        .current_dir(cwd.path())
        .args(["-T", "list"])
        .assert()
        .code(0)
        .stdout(predicate::str::is_match(r"(?s)\[0\].*console.*\[1\].*opengl").unwrap());
}

/// Template mode never looks for a project descriptor.
#[test]
fn test_template_get_on_empty_store_exits_one() {
    let home = TempDir::new().unwrap();
    let cwd = TempDir::new().unwrap();

    cargo_bin_cmd!("mesongo")
        .env("MESONGO_HOME", home.path())
        .current_dir(cwd.path())
        .args(["-T", "get"])
        .assert()
        .code(1)
        .stdout(predicate::str::contains("No templates"));
}
