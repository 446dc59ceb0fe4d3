use crate::common::command::{init_repository_dir, read_ref, run_twig_command, twig_commit};
use crate::common::file::{FileSpec, read_file, write_file};
use crate::common::stderr_of;
use assert_fs::TempDir;
use predicates::prelude::predicate;
use pretty_assertions::assert_eq;
use rstest::{fixture, rstest};

/// `feature` rewrites 1.txt and adds new.txt; HEAD is back on `master`.
#[fixture]
fn repository_for_conflicts(init_repository_dir: TempDir) -> TempDir {
    let dir = init_repository_dir.path();

    run_twig_command(dir, &["branch", "feature"])
        .assert()
        .success();
    run_twig_command(dir, &["checkout", "feature"])
        .assert()
        .success();
    write_file(FileSpec::new(dir.join("1.txt"), "feature one".to_string()));
    write_file(FileSpec::new(dir.join("new.txt"), "feature new".to_string()));
    run_twig_command(dir, &["add", "."]).assert().success();
    twig_commit(dir, "Feature work").assert().success();
    run_twig_command(dir, &["checkout", "master"])
        .assert()
        .success();

    init_repository_dir
}

#[rstest]
fn checkout_fails_with_stale_file_in_workspace(
    repository_for_conflicts: TempDir,
) -> Result<(), Box<dyn std::error::Error>> {
    let dir = repository_for_conflicts.path();
    write_file(FileSpec::new(dir.join("1.txt"), "local one".to_string()));
    write_file(FileSpec::new(
        dir.join("a").join("2.txt"),
        "local two".to_string(),
    ));

    let output = run_twig_command(dir, &["checkout", "feature"])
        .assert()
        .failure()
        .stderr(predicate::str::contains(
            "Your local changes to the following files would be overwritten by checkout:",
        ))
        .stderr(predicate::str::contains(
            "Please commit your changes or stash them before you switch branches.",
        ));

    // only the path checkout would touch is listed
    let stderr = stderr_of(&output);
    assert!(stderr.contains("\t1.txt\n"));
    assert!(!stderr.contains("2.txt"));

    assert_eq!(read_file(&dir.join("1.txt")), "local one");
    assert_eq!(read_file(&dir.join("a").join("2.txt")), "local two");
    assert!(!dir.join("new.txt").exists());
    assert_eq!(read_ref(dir, "HEAD"), "ref: refs/heads/master");

    Ok(())
}

#[rstest]
fn checkout_fails_with_staged_changes_to_a_target_file(
    repository_for_conflicts: TempDir,
) -> Result<(), Box<dyn std::error::Error>> {
    let dir = repository_for_conflicts.path();
    write_file(FileSpec::new(dir.join("1.txt"), "staged one".to_string()));
    run_twig_command(dir, &["add", "1.txt"]).assert().success();

    run_twig_command(dir, &["checkout", "feature"])
        .assert()
        .failure()
        .stderr(predicate::str::contains(
            "Your local changes to the following files would be overwritten by checkout:",
        ))
        .stderr(predicate::str::contains("\t1.txt"));
    assert_eq!(read_file(&dir.join("1.txt")), "staged one");

    Ok(())
}

#[rstest]
fn checkout_fails_with_untracked_file_in_the_way(
    repository_for_conflicts: TempDir,
) -> Result<(), Box<dyn std::error::Error>> {
    let dir = repository_for_conflicts.path();
    write_file(FileSpec::new(dir.join("new.txt"), "my own".to_string()));

    run_twig_command(dir, &["checkout", "feature"])
        .assert()
        .failure()
        .stderr(predicate::str::contains(
            "The following untracked working tree files would be overwritten by checkout:",
        ))
        .stderr(predicate::str::contains("\tnew.txt"));
    assert_eq!(read_file(&dir.join("new.txt")), "my own");

    Ok(())
}

#[rstest]
fn checkout_lists_every_kind_of_conflict(
    repository_for_conflicts: TempDir,
) -> Result<(), Box<dyn std::error::Error>> {
    let dir = repository_for_conflicts.path();
    write_file(FileSpec::new(dir.join("1.txt"), "local one".to_string()));
    write_file(FileSpec::new(dir.join("new.txt"), "my own".to_string()));

    let output = run_twig_command(dir, &["checkout", "feature"])
        .assert()
        .failure();

    let stderr = stderr_of(&output);
    let stale = stderr
        .find("Your local changes to the following files would be overwritten by checkout:\n\t1.txt\n")
        .expect("stale file block missing");
    let untracked = stderr
        .find("The following untracked working tree files would be overwritten by checkout:\n\tnew.txt\n")
        .expect("untracked file block missing");
    assert!(stale < untracked);
    assert!(stderr.contains("Aborting"));

    assert_eq!(read_file(&dir.join("1.txt")), "local one");
    assert_eq!(read_file(&dir.join("new.txt")), "my own");
    assert_eq!(read_ref(dir, "HEAD"), "ref: refs/heads/master");

    Ok(())
}

#[rstest]
fn checkout_accepts_an_untracked_file_identical_to_the_target(
    repository_for_conflicts: TempDir,
) -> Result<(), Box<dyn std::error::Error>> {
    let dir = repository_for_conflicts.path();
    write_file(FileSpec::new(dir.join("new.txt"), "feature new".to_string()));

    run_twig_command(dir, &["checkout", "feature"])
        .assert()
        .success();
    assert_eq!(read_file(&dir.join("1.txt")), "feature one");

    Ok(())
}

#[rstest]
fn checkout_fails_when_untracked_files_sit_where_a_file_goes(
    repository_for_conflicts: TempDir,
) -> Result<(), Box<dyn std::error::Error>> {
    let dir = repository_for_conflicts.path();
    write_file(FileSpec::new(
        dir.join("new.txt").join("inner.txt"),
        "nested".to_string(),
    ));

    run_twig_command(dir, &["checkout", "feature"])
        .assert()
        .failure()
        .stderr(predicate::str::contains(
            "Updating the following directories would lose untracked files in them:",
        ))
        .stderr(predicate::str::contains("\tnew.txt"));
    assert_eq!(read_file(&dir.join("new.txt").join("inner.txt")), "nested");

    Ok(())
}
