use crate::common::command::{repository_dir, run_twig_command};
use assert_fs::TempDir;
use predicates::prelude::predicate;
use rstest::rstest;

#[rstest]
#[case::status(&["status"])]
#[case::commit(&["commit", "-m", "message"])]
#[case::branch(&["branch"])]
fn commands_outside_a_repository_fail(
    repository_dir: TempDir,
    #[case] args: &[&str],
) -> Result<(), Box<dyn std::error::Error>> {
    run_twig_command(repository_dir.path(), args)
        .assert()
        .failure()
        .stderr(predicate::str::contains("not a twig repository"));

    Ok(())
}

#[rstest]
fn commands_in_a_subdirectory_find_the_repository(
    repository_dir: TempDir,
) -> Result<(), Box<dyn std::error::Error>> {
    run_twig_command(repository_dir.path(), &["init"])
        .assert()
        .success();
    let nested = repository_dir.path().join("src").join("deep");
    std::fs::create_dir_all(&nested)?;

    run_twig_command(&nested, &["status", "--porcelain"])
        .assert()
        .success();

    Ok(())
}
