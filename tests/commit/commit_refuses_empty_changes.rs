use crate::common::command::{
    init_repository_dir, repository_dir, run_twig_command, twig_commit, with_author,
};
use crate::common::file::{FileSpec, write_file};
use assert_fs::TempDir;
use predicates::prelude::predicate;
use rstest::rstest;

#[rstest]
fn commit_without_changes_fails(
    init_repository_dir: TempDir,
) -> Result<(), Box<dyn std::error::Error>> {
    twig_commit(init_repository_dir.path(), "Nothing new")
        .assert()
        .failure()
        .stderr(predicate::str::contains("nothing to commit"));

    Ok(())
}

#[rstest]
fn commit_on_an_empty_index_fails(
    repository_dir: TempDir,
) -> Result<(), Box<dyn std::error::Error>> {
    let dir = repository_dir.path();
    run_twig_command(dir, &["init"]).assert().success();

    twig_commit(dir, "Empty")
        .assert()
        .failure()
        .stderr(predicate::str::contains("nothing to commit"));

    Ok(())
}

#[rstest]
#[case::missing(None)]
#[case::blank(Some("   "))]
fn commit_without_a_message_fails(
    init_repository_dir: TempDir,
    #[case] message: Option<&str>,
) -> Result<(), Box<dyn std::error::Error>> {
    let dir = init_repository_dir.path();
    write_file(FileSpec::new(dir.join("1.txt"), "uno".to_string()));
    run_twig_command(dir, &["add", "1.txt"]).assert().success();

    let args = match message {
        Some(message) => vec!["commit", "-m", message],
        None => vec!["commit"],
    };
    with_author(run_twig_command(dir, &args))
        .assert()
        .failure()
        .stderr(predicate::str::contains("empty commit message"));

    Ok(())
}
