use crate::common::command::{init_repository_dir, run_twig_command, twig_commit};
use crate::common::file::{FileSpec, delete_path, write_file};
use assert_fs::TempDir;
use predicates::prelude::predicate;
use rstest::{fixture, rstest};

/// `other` stays at the initial commit while `master` adds new.txt, rewrites 1.txt and
/// drops a/2.txt.
#[fixture]
fn repository_with_other(init_repository_dir: TempDir) -> TempDir {
    let dir = init_repository_dir.path();

    run_twig_command(dir, &["branch", "other"])
        .assert()
        .success();
    write_file(FileSpec::new(dir.join("new.txt"), "new".to_string()));
    write_file(FileSpec::new(dir.join("1.txt"), "uno".to_string()));
    delete_path(&dir.join("a").join("2.txt"));
    run_twig_command(dir, &["add", "."]).assert().success();
    twig_commit(dir, "Second commit").assert().success();

    init_repository_dir
}

#[rstest]
fn show_name_status_for_added_and_deleted_files_between_commits(
    repository_with_other: TempDir,
) -> Result<(), Box<dyn std::error::Error>> {
    let dir = repository_with_other.path();

    run_twig_command(dir, &["diff", "--name-status", "other", "master"])
        .assert()
        .success()
        .stdout("M\t1.txt\nD\ta/2.txt\nA\tnew.txt\n");

    run_twig_command(dir, &["diff", "--name-status", "master", "other"])
        .assert()
        .success()
        .stdout("M\t1.txt\nA\ta/2.txt\nD\tnew.txt\n");

    Ok(())
}

#[rstest]
#[case::added("A", "A\tnew.txt\n")]
#[case::deleted("D", "D\ta/2.txt\n")]
#[case::added_or_modified("AM", "M\t1.txt\nA\tnew.txt\n")]
fn diff_filter_keeps_selected_statuses(
    repository_with_other: TempDir,
    #[case] filter: &str,
    #[case] expected: &str,
) -> Result<(), Box<dyn std::error::Error>> {
    let filter = format!("--diff-filter={}", filter);

    run_twig_command(
        repository_with_other.path(),
        &["diff", "--name-status", &filter, "other", "master"],
    )
    .assert()
    .success()
    .stdout(expected.to_string());

    Ok(())
}

#[rstest]
fn diff_between_a_commit_and_itself_is_empty(
    repository_with_other: TempDir,
) -> Result<(), Box<dyn std::error::Error>> {
    run_twig_command(
        repository_with_other.path(),
        &["diff", "--name-status", "master", "HEAD"],
    )
    .assert()
    .success()
    .stdout("");

    Ok(())
}

#[rstest]
fn diff_with_an_invalid_filter_fails(
    repository_with_other: TempDir,
) -> Result<(), Box<dyn std::error::Error>> {
    run_twig_command(
        repository_with_other.path(),
        &["diff", "--diff-filter=X", "other", "master"],
    )
    .assert()
    .failure()
    .stderr(predicate::str::contains("invalid diff filter 'X'"));

    Ok(())
}
