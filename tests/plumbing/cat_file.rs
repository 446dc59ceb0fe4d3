use crate::common::command::{init_repository_dir, read_ref, run_twig_command};
use assert_fs::TempDir;
use predicates::prelude::predicate;
use rstest::rstest;

const ONE_OID: &str = "43dd47ea691c90a5fa7827892c70241913351963";

#[rstest]
fn cat_file_prints_a_blob(init_repository_dir: TempDir) -> Result<(), Box<dyn std::error::Error>> {
    run_twig_command(init_repository_dir.path(), &["cat-file", "-p", ONE_OID])
        .assert()
        .success()
        .stdout("one");

    Ok(())
}

#[rstest]
fn cat_file_prints_a_commit(init_repository_dir: TempDir) -> Result<(), Box<dyn std::error::Error>> {
    let dir = init_repository_dir.path();
    let tip = read_ref(dir, "refs/heads/master");

    run_twig_command(dir, &["cat-file", "-p", &tip[..7]])
        .assert()
        .success()
        .stdout(predicate::str::is_match(
            r"^tree [0-9a-f]{40}\nauthor fake_user <fake_email@email.com> 1672574400 \+0000\ncommitter fake_user <fake_email@email.com> 1672574400 \+0000\n\nInitial commit\n$",
        )?);

    Ok(())
}

#[rstest]
fn cat_file_of_a_missing_object_fails(
    init_repository_dir: TempDir,
) -> Result<(), Box<dyn std::error::Error>> {
    run_twig_command(
        init_repository_dir.path(),
        &["cat-file", "-p", "0000000000000000000000000000000000000000"],
    )
    .assert()
    .failure();

    Ok(())
}
