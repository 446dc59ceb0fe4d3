use crate::common::command::{init_repository_dir, run_twig_command};
use crate::common::stdout_of;
use assert_fs::TempDir;
use predicates::prelude::predicate;
use pretty_assertions::assert_eq;
use rstest::rstest;

#[rstest]
fn remove_a_single_file(init_repository_dir: TempDir) -> Result<(), Box<dyn std::error::Error>> {
    let dir = init_repository_dir.path();

    run_twig_command(dir, &["rm", "1.txt"])
        .assert()
        .success()
        .stdout("rm '1.txt'\n");

    assert!(!dir.join("1.txt").exists());
    let status = run_twig_command(dir, &["status", "--porcelain"])
        .assert()
        .success();
    assert_eq!(stdout_of(&status), "D  1.txt\n");

    Ok(())
}

#[rstest]
fn remove_a_directory_needs_the_recursive_flag(
    init_repository_dir: TempDir,
) -> Result<(), Box<dyn std::error::Error>> {
    let dir = init_repository_dir.path();

    run_twig_command(dir, &["rm", "a"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("not removing 'a' recursively without -r"));
    assert!(dir.join("a").join("2.txt").is_file());

    run_twig_command(dir, &["rm", "-r", "a"])
        .assert()
        .success()
        .stdout("rm 'a/2.txt'\nrm 'a/b/3.txt'\n");

    assert!(!dir.join("a").exists());
    let status = run_twig_command(dir, &["status", "--porcelain"])
        .assert()
        .success();
    assert_eq!(stdout_of(&status), "D  a/2.txt\nD  a/b/3.txt\n");

    Ok(())
}

#[rstest]
fn remove_an_untracked_path_fails(
    init_repository_dir: TempDir,
) -> Result<(), Box<dyn std::error::Error>> {
    run_twig_command(init_repository_dir.path(), &["rm", "nope.txt"])
        .assert()
        .failure()
        .stderr(predicate::str::contains(
            "pathspec 'nope.txt' did not match any files",
        ));

    Ok(())
}
