use crate::common::command::{repository_dir, run_twig_command};
use crate::common::stdout_of;
use assert_fs::TempDir;
use predicates::prelude::predicate;
use pretty_assertions::assert_eq;
use rstest::rstest;

#[rstest]
fn init_repository_successfully(repository_dir: TempDir) -> Result<(), Box<dyn std::error::Error>> {
    let dir_absolute_path = repository_dir.path().canonicalize()?.display().to_string();
    let target = repository_dir.path().display().to_string();

    let output = run_twig_command(repository_dir.path(), &["init", &target])
        .assert()
        .success()
        .stdout(predicate::str::is_match(
            r"^Initialized empty Git repository in .+\.git\n$",
        )?)
        .stdout(predicate::str::contains(dir_absolute_path));
    assert!(!stdout_of(&output).contains("bare"));

    let git_dir = repository_dir.path().join(".git");
    assert!(git_dir.join("objects").is_dir());
    assert!(git_dir.join("refs").join("heads").is_dir());
    assert_eq!(
        std::fs::read_to_string(git_dir.join("HEAD"))?.trim(),
        "ref: refs/heads/master"
    );

    Ok(())
}

#[rstest]
fn init_creates_missing_directories(repository_dir: TempDir) -> Result<(), Box<dyn std::error::Error>> {
    run_twig_command(repository_dir.path(), &["init", "nested/project"])
        .assert()
        .success();

    assert!(
        repository_dir
            .path()
            .join("nested")
            .join("project")
            .join(".git")
            .join("HEAD")
            .is_file()
    );

    Ok(())
}
