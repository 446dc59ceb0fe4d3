use crate::common::command::{init_repository_dir, read_ref, run_twig_command};
use assert_fs::TempDir;
use pretty_assertions::assert_eq;
use rstest::rstest;

#[rstest]
fn list_branches_marks_the_current_one(
    init_repository_dir: TempDir,
) -> Result<(), Box<dyn std::error::Error>> {
    let dir = init_repository_dir.path();
    run_twig_command(dir, &["branch", "zeta"]).assert().success();
    run_twig_command(dir, &["branch", "alpha"]).assert().success();
    run_twig_command(dir, &["checkout", "zeta"]).assert().success();

    run_twig_command(dir, &["branch"])
        .assert()
        .success()
        .stdout("  alpha\n  master\n* zeta\n");

    Ok(())
}

#[rstest]
fn list_branches_on_a_detached_head(
    init_repository_dir: TempDir,
) -> Result<(), Box<dyn std::error::Error>> {
    let dir = init_repository_dir.path();
    let tip = read_ref(dir, "refs/heads/master");
    run_twig_command(dir, &["checkout", &tip]).assert().success();

    let output = run_twig_command(dir, &["branch"]).assert().success();
    assert_eq!(
        crate::common::stdout_of(&output),
        format!("* (HEAD detached at {})\n  master\n", &tip[..7])
    );

    Ok(())
}
