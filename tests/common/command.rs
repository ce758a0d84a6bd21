use crate::common::file::{FileSpec, write_file};
use assert_cmd::Command;
use assert_fs::TempDir;
use rstest::fixture;
use std::path::Path;

#[fixture]
pub fn repository_dir() -> TempDir {
    TempDir::new().expect("failed to create temp dir")
}

/// A repository with a configured identity and three files committed:
/// `1.txt`, `a/2.txt`, `a/b/3.txt`.
#[fixture]
pub fn committed_repository_dir(repository_dir: TempDir) -> TempDir {
    run_rit_command(repository_dir.path(), &["init"])
        .assert()
        .success();
    configure_identity(repository_dir.path());

    write_file(FileSpec::new(
        repository_dir.path().join("1.txt"),
        "one\n".to_string(),
    ));
    write_file(FileSpec::new(
        repository_dir.path().join("a").join("2.txt"),
        "two\n".to_string(),
    ));
    write_file(FileSpec::new(
        repository_dir.path().join("a").join("b").join("3.txt"),
        "three\n".to_string(),
    ));

    run_rit_command(repository_dir.path(), &["add", "-f", "."])
        .assert()
        .success();
    run_rit_command(repository_dir.path(), &["commit", "-m", "Initial commit"])
        .assert()
        .success();

    repository_dir
}

pub fn run_rit_command(dir: &Path, args: &[&str]) -> Command {
    let mut cmd = Command::cargo_bin("rit").expect("failed to find rit binary");
    // point HOME at the sandbox so a developer's ~/.gitconfig and global
    // ignore file cannot leak into assertions
    cmd.current_dir(dir).env("HOME", dir);
    for arg in args {
        cmd.arg(arg);
    }
    cmd
}

/// Append a `[user]` block to the repository config so `commit` and
/// `tag -a` have an identity to record.
pub fn configure_identity(dir: &Path) {
    let config_path = dir.join(".git").join("config");
    let mut config = std::fs::read_to_string(&config_path).expect("missing repository config");
    config.push_str("[user]\n\tname = Test Author\n\temail = author@example.com\n");
    std::fs::write(&config_path, config).expect("failed to write repository config");
}

/// The object ID a name resolves to, captured from `rev-parse`.
pub fn resolve_oid(dir: &Path, name: &str) -> String {
    let output = run_rit_command(dir, &["rev-parse", name])
        .assert()
        .success()
        .get_output()
        .stdout
        .clone();
    String::from_utf8(output).expect("rev-parse output is utf-8").trim().to_string()
}
