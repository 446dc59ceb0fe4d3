use crate::common::command::{diverged_repository_dir, init_repository_dir, read_ref, run_twig_command};
use crate::common::file::read_file;
use assert_fs::TempDir;
use predicates::prelude::predicate;
use pretty_assertions::assert_eq;
use rstest::rstest;

#[rstest]
fn merge_abort_restores_the_receiver(
    diverged_repository_dir: TempDir,
) -> Result<(), Box<dyn std::error::Error>> {
    let dir = diverged_repository_dir.path();
    let master = read_ref(dir, "refs/heads/master");
    run_twig_command(dir, &["merge", "topic"])
        .assert()
        .code(1);

    run_twig_command(dir, &["merge", "--abort"])
        .assert()
        .success();

    assert_eq!(read_file(&dir.join("filea")), "fileaaaa\n");
    assert_eq!(read_ref(dir, "refs/heads/master"), master);
    assert!(!dir.join(".git").join("MERGE_HEAD").exists());
    assert!(!dir.join(".git").join("MERGE_MSG").exists());
    run_twig_command(dir, &["status", "--porcelain"])
        .assert()
        .success()
        .stdout("");

    // the same merge can be started again
    run_twig_command(dir, &["merge", "topic"])
        .assert()
        .code(1);

    Ok(())
}

#[rstest]
fn merge_abort_without_a_merge_fails(
    init_repository_dir: TempDir,
) -> Result<(), Box<dyn std::error::Error>> {
    run_twig_command(init_repository_dir.path(), &["merge", "--abort"])
        .assert()
        .failure()
        .stderr(predicate::str::contains(
            "There is no merge to abort (MERGE_HEAD missing).",
        ));

    Ok(())
}
