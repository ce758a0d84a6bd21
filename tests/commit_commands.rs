use predicates::prelude::predicate;
use rstest::rstest;

mod common;

use common::command::{
    committed_repository_dir, configure_identity, repository_dir, resolve_oid, run_rit_command,
};
use common::file::{FileSpec, write_file};

#[rstest]
fn initial_commit_links_blob_tree_commit_and_branch(repository_dir: assert_fs::TempDir) {
    run_rit_command(repository_dir.path(), &["init"])
        .assert()
        .success();
    configure_identity(repository_dir.path());
    write_file(FileSpec::new(
        repository_dir.path().join("a.txt"),
        "hello\n".to_string(),
    ));

    run_rit_command(repository_dir.path(), &["add", "-f", "a.txt"])
        .assert()
        .success();
    run_rit_command(repository_dir.path(), &["commit", "-m", "x"])
        .assert()
        .success()
        .stdout(predicate::str::contains("(root-commit)"));

    // the blob for a.txt exists
    let blob_oid = "ce013625030ba8dba906f756967f9e9ca394464a";
    assert!(
        repository_dir
            .path()
            .join(".git/objects")
            .join(&blob_oid[..2])
            .join(&blob_oid[2..])
            .is_file()
    );

    // the branch ref holds the commit's oid
    let branch_ref =
        std::fs::read_to_string(repository_dir.path().join(".git/refs/heads/master")).unwrap();
    let commit_oid = branch_ref.trim();
    assert_eq!(commit_oid.len(), 40);
    assert_eq!(resolve_oid(repository_dir.path(), "HEAD"), commit_oid);

    // the commit names a tree whose single leaf is a.txt, and no parent
    let commit_payload = run_rit_command(
        repository_dir.path(),
        &["cat-file", "-t", "commit", "-o", "HEAD"],
    )
    .assert()
    .success()
    .get_output()
    .stdout
    .clone();
    let commit_text = String::from_utf8(commit_payload).unwrap();
    assert!(commit_text.starts_with("tree "));
    assert!(!commit_text.contains("parent "));
    assert!(commit_text.trim_end().ends_with("x"));

    run_rit_command(repository_dir.path(), &["ls-tree", "HEAD"])
        .assert()
        .success()
        .stdout(predicate::str::contains(format!("100644 blob {blob_oid}\ta.txt")));
}

#[rstest]
fn second_commit_records_the_first_as_parent(committed_repository_dir: assert_fs::TempDir) {
    let first = resolve_oid(committed_repository_dir.path(), "HEAD");

    write_file(FileSpec::new(
        committed_repository_dir.path().join("1.txt"),
        "one updated\n".to_string(),
    ));
    run_rit_command(committed_repository_dir.path(), &["add", "-f", "1.txt"])
        .assert()
        .success();
    run_rit_command(committed_repository_dir.path(), &["commit", "-m", "second"])
        .assert()
        .success();

    let commit_payload = run_rit_command(
        committed_repository_dir.path(),
        &["cat-file", "-t", "commit", "-o", "HEAD"],
    )
    .assert()
    .success()
    .get_output()
    .stdout
    .clone();
    let commit_text = String::from_utf8(commit_payload).unwrap();
    assert!(commit_text.contains(&format!("parent {first}")));
}

#[rstest]
fn commit_headers_carry_the_configured_identity(committed_repository_dir: assert_fs::TempDir) {
    let commit_payload = run_rit_command(
        committed_repository_dir.path(),
        &["cat-file", "-t", "commit", "-o", "HEAD"],
    )
    .assert()
    .success()
    .get_output()
    .stdout
    .clone();
    let commit_text = String::from_utf8(commit_payload).unwrap();

    assert!(commit_text.contains("author Test Author <author@example.com>"));
    assert!(commit_text.contains("committer Test Author <author@example.com>"));

    // timestamp renders as `<unix-seconds> <±HHMM>`
    let author_line = commit_text
        .lines()
        .find(|line| line.starts_with("author "))
        .unwrap();
    let offset = author_line.rsplit(' ').next().unwrap();
    assert_eq!(offset.len(), 5);
    assert!(offset.starts_with('+') || offset.starts_with('-'));
}

#[rstest]
fn commit_without_identity_fails(repository_dir: assert_fs::TempDir) {
    run_rit_command(repository_dir.path(), &["init"])
        .assert()
        .success();
    write_file(FileSpec::new(
        repository_dir.path().join("a.txt"),
        "hello\n".to_string(),
    ));
    run_rit_command(repository_dir.path(), &["add", "-f", "a.txt"])
        .assert()
        .success();

    // HOME points at the sandbox, so there is no ~/.gitconfig fallback
    run_rit_command(repository_dir.path(), &["commit", "-m", "x"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("user name and email not configured"));
}

#[rstest]
fn commit_message_is_trimmed_and_terminated_with_one_newline(
    repository_dir: assert_fs::TempDir,
) {
    run_rit_command(repository_dir.path(), &["init"])
        .assert()
        .success();
    configure_identity(repository_dir.path());
    write_file(FileSpec::new(
        repository_dir.path().join("a.txt"),
        "hello\n".to_string(),
    ));
    run_rit_command(repository_dir.path(), &["add", "-f", "a.txt"])
        .assert()
        .success();

    run_rit_command(repository_dir.path(), &["commit", "-m", "  padded message \n\n"])
        .assert()
        .success();

    let commit_payload = run_rit_command(
        repository_dir.path(),
        &["cat-file", "-t", "commit", "-o", "HEAD"],
    )
    .assert()
    .success()
    .get_output()
    .stdout
    .clone();
    let commit_text = String::from_utf8(commit_payload).unwrap();
    assert!(commit_text.ends_with("\n\npadded message\n"));
}

#[rstest]
fn log_emits_graphviz_dot_for_the_ancestry(committed_repository_dir: assert_fs::TempDir) {
    write_file(FileSpec::new(
        committed_repository_dir.path().join("1.txt"),
        "one updated\n".to_string(),
    ));
    run_rit_command(committed_repository_dir.path(), &["add", "-f", "1.txt"])
        .assert()
        .success();
    run_rit_command(committed_repository_dir.path(), &["commit", "-m", "second"])
        .assert()
        .success();

    let head = resolve_oid(committed_repository_dir.path(), "HEAD");

    run_rit_command(committed_repository_dir.path(), &["log"])
        .assert()
        .success()
        .stdout(predicate::str::starts_with("digraph ritlog{"))
        .stdout(predicate::str::contains("node[shape=rect]"))
        .stdout(predicate::str::contains(format!("c_{head}")))
        .stdout(predicate::str::contains("second"))
        .stdout(predicate::str::contains("Initial commit"))
        .stdout(predicate::str::contains(" -> "))
        .stdout(predicate::str::ends_with("}\n"));
}
