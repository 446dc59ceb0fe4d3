use crate::common::command::{init_repository_dir, read_ref, run_twig_command};
use assert_fs::TempDir;
use predicates::prelude::predicate;
use rstest::rstest;

#[rstest]
fn delete_branch(init_repository_dir: TempDir) -> Result<(), Box<dyn std::error::Error>> {
    let dir = init_repository_dir.path();
    run_twig_command(dir, &["branch", "topic/nested"])
        .assert()
        .success();
    let tip = read_ref(dir, "refs/heads/topic/nested");

    run_twig_command(dir, &["branch", "-d", "topic/nested"])
        .assert()
        .success()
        .stdout(format!("Deleted branch topic/nested (was {}).\n", &tip[..7]));

    let heads = dir.join(".git").join("refs").join("heads");
    assert!(!heads.join("topic").exists());
    assert!(heads.join("master").is_file());

    Ok(())
}

#[rstest]
fn delete_missing_branch_fails(
    init_repository_dir: TempDir,
) -> Result<(), Box<dyn std::error::Error>> {
    run_twig_command(init_repository_dir.path(), &["branch", "-d", "ghost"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("branch 'ghost' not found"));

    Ok(())
}

#[rstest]
fn delete_current_branch_fails(
    init_repository_dir: TempDir,
) -> Result<(), Box<dyn std::error::Error>> {
    let dir = init_repository_dir.path();

    run_twig_command(dir, &["branch", "-d", "master"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("checked out at the current worktree"));
    assert!(dir.join(".git").join("refs").join("heads").join("master").is_file());

    Ok(())
}
