use predicates::prelude::predicate;
use rstest::rstest;

mod common;

use common::command::{repository_dir, run_rit_command};
use common::file::{FileSpec, write_file};

fn init_with_files(dir: &std::path::Path, names: &[&str]) {
    run_rit_command(dir, &["init"]).assert().success();
    for name in names {
        write_file(FileSpec::new(dir.join(name), format!("content of {name}\n")));
    }
}

#[rstest]
fn add_stages_a_file_and_ls_files_lists_it(repository_dir: assert_fs::TempDir) {
    init_with_files(repository_dir.path(), &["a.txt"]);

    run_rit_command(repository_dir.path(), &["add", "-f", "a.txt"])
        .assert()
        .success();

    run_rit_command(repository_dir.path(), &["ls-files"])
        .assert()
        .success()
        .stdout("a.txt\n");
}

#[rstest]
fn add_of_a_directory_stages_everything_below_it(repository_dir: assert_fs::TempDir) {
    init_with_files(repository_dir.path(), &["top.txt", "a/1.txt", "a/b/2.txt"]);

    run_rit_command(repository_dir.path(), &["add", "-f", "."])
        .assert()
        .success();

    run_rit_command(repository_dir.path(), &["ls-files"])
        .assert()
        .success()
        .stdout("a/1.txt\na/b/2.txt\ntop.txt\n");
}

#[rstest]
fn index_file_size_accounts_for_entry_padding(repository_dir: assert_fs::TempDir) {
    // name lengths 1, 7, 8, 9 and 15 straddle the 8-byte padding
    // boundaries; each entry is 62 + len + 1 rounded up to 8
    let names = ["a", "bcdefgh", "cdefghij", "defghijkl", "efghijklmnopqrs"];
    init_with_files(repository_dir.path(), &names);

    let mut args = vec!["add", "-f"];
    args.extend(names);
    run_rit_command(repository_dir.path(), &args)
        .assert()
        .success();

    let padded: usize = names
        .iter()
        .map(|name| {
            let unpadded = 62 + name.len() + 1;
            unpadded + (8 - (unpadded % 8)) % 8
        })
        .sum();
    let expected = 12 + padded + 20;

    let index_len = std::fs::metadata(repository_dir.path().join(".git/index"))
        .unwrap()
        .len();
    assert_eq!(index_len as usize, expected);

    // and the entries read back intact, in ascending name order
    run_rit_command(repository_dir.path(), &["ls-files"])
        .assert()
        .success()
        .stdout("a\nbcdefgh\ncdefghij\ndefghijkl\nefghijklmnopqrs\n");
}

#[rstest]
fn re_adding_a_file_keeps_one_entry(repository_dir: assert_fs::TempDir) {
    init_with_files(repository_dir.path(), &["a.txt"]);

    run_rit_command(repository_dir.path(), &["add", "-f", "a.txt"])
        .assert()
        .success();
    write_file(FileSpec::new(
        repository_dir.path().join("a.txt"),
        "changed\n".to_string(),
    ));
    run_rit_command(repository_dir.path(), &["add", "-f", "a.txt"])
        .assert()
        .success();

    run_rit_command(repository_dir.path(), &["ls-files"])
        .assert()
        .success()
        .stdout("a.txt\n");
}

#[rstest]
fn ls_files_verbose_reports_format_and_count(repository_dir: assert_fs::TempDir) {
    init_with_files(repository_dir.path(), &["a.txt"]);
    run_rit_command(repository_dir.path(), &["add", "-f", "a.txt"])
        .assert()
        .success();

    run_rit_command(repository_dir.path(), &["ls-files", "-v"])
        .assert()
        .success()
        .stdout(predicate::str::contains(
            "Index file format v2, containing 1 entries.",
        ))
        .stdout(predicate::str::contains("Mode: 100644"));
}

#[rstest]
fn rm_drops_the_entry_and_unlinks_the_file(repository_dir: assert_fs::TempDir) {
    init_with_files(repository_dir.path(), &["a.txt", "b.txt"]);
    run_rit_command(repository_dir.path(), &["add", "-f", "a.txt", "b.txt"])
        .assert()
        .success();

    run_rit_command(repository_dir.path(), &["rm", "--files", "a.txt"])
        .assert()
        .success();

    run_rit_command(repository_dir.path(), &["ls-files"])
        .assert()
        .success()
        .stdout("b.txt\n");
    assert!(!repository_dir.path().join("a.txt").exists());
}

#[rstest]
fn rm_of_an_already_deleted_file_still_updates_the_index(repository_dir: assert_fs::TempDir) {
    init_with_files(repository_dir.path(), &["a.txt"]);
    run_rit_command(repository_dir.path(), &["add", "-f", "a.txt"])
        .assert()
        .success();
    std::fs::remove_file(repository_dir.path().join("a.txt")).unwrap();

    run_rit_command(repository_dir.path(), &["rm", "--files", "a.txt"])
        .assert()
        .success();

    run_rit_command(repository_dir.path(), &["ls-files"])
        .assert()
        .success()
        .stdout("");
}
