use crate::common::command::{diverged_repository_dir, repository_dir, run_twig_command};
use crate::common::file::{FileSpec, write_file};
use assert_fs::TempDir;
use predicates::prelude::predicate;
use rstest::rstest;

const NESTED_TREE_OID: &str = "da26bcf0bd9aff8831792e463089a36587ca7aa3";

#[rstest]
fn write_tree_is_stable_across_staging_passes(
    repository_dir: TempDir,
) -> Result<(), Box<dyn std::error::Error>> {
    let dir = repository_dir.path();
    run_twig_command(dir, &["init"]).assert().success();
    write_file(FileSpec::new(dir.join("1").join("filea"), "filea".to_string()));
    write_file(FileSpec::new(dir.join("1").join("fileb"), "fileb".to_string()));

    run_twig_command(dir, &["add", "."]).assert().success();
    run_twig_command(dir, &["write-tree"])
        .assert()
        .success()
        .stdout(format!("{NESTED_TREE_OID}\n"));

    // staging the same content again yields the same tree
    run_twig_command(dir, &["add", "1"]).assert().success();
    run_twig_command(dir, &["write-tree"])
        .assert()
        .success()
        .stdout(format!("{NESTED_TREE_OID}\n"));

    run_twig_command(dir, &["ls-tree", NESTED_TREE_OID])
        .assert()
        .success()
        .stdout(predicate::str::is_match(r"^040000 tree [0-9a-f]{40}\t1\n$")?);

    Ok(())
}

#[rstest]
fn write_tree_refuses_an_unmerged_index(
    diverged_repository_dir: TempDir,
) -> Result<(), Box<dyn std::error::Error>> {
    let dir = diverged_repository_dir.path();
    run_twig_command(dir, &["merge", "topic"])
        .assert()
        .code(1);

    run_twig_command(dir, &["write-tree"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("unmerged entries"));

    Ok(())
}
