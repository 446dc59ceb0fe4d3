use crate::common::command::{init_repository_dir, read_ref, run_twig_command, twig_commit};
use crate::common::file::{FileSpec, read_file, write_file};
use assert_fs::TempDir;
use pretty_assertions::assert_eq;
use rstest::rstest;

#[rstest]
fn merge_a_descendant_fast_forwards(
    init_repository_dir: TempDir,
) -> Result<(), Box<dyn std::error::Error>> {
    let dir = init_repository_dir.path();
    let before = read_ref(dir, "refs/heads/master");

    run_twig_command(dir, &["branch", "topic"]).assert().success();
    run_twig_command(dir, &["checkout", "topic"])
        .assert()
        .success();
    write_file(FileSpec::new(dir.join("1.txt"), "uno".to_string()));
    write_file(FileSpec::new(dir.join("c").join("4.txt"), "four".to_string()));
    run_twig_command(dir, &["add", "."]).assert().success();
    twig_commit(dir, "Topic work").assert().success();
    let topic = read_ref(dir, "refs/heads/topic");
    run_twig_command(dir, &["checkout", "master"])
        .assert()
        .success();

    run_twig_command(dir, &["merge", "topic"])
        .assert()
        .success()
        .stdout(format!(
            "Updating {}..{}\nFast-forward\n",
            &before[..7],
            &topic[..7]
        ));

    assert_eq!(read_ref(dir, "refs/heads/master"), topic);
    assert_eq!(read_file(&dir.join("1.txt")), "uno");
    assert_eq!(read_file(&dir.join("c").join("4.txt")), "four");
    assert!(!dir.join(".git").join("MERGE_HEAD").exists());
    run_twig_command(dir, &["status", "--porcelain"])
        .assert()
        .success()
        .stdout("");

    Ok(())
}

#[rstest]
fn merge_an_ancestor_is_already_up_to_date(
    init_repository_dir: TempDir,
) -> Result<(), Box<dyn std::error::Error>> {
    let dir = init_repository_dir.path();
    run_twig_command(dir, &["branch", "old"]).assert().success();
    write_file(FileSpec::new(dir.join("1.txt"), "uno".to_string()));
    run_twig_command(dir, &["add", "1.txt"]).assert().success();
    twig_commit(dir, "Second commit").assert().success();
    let tip = read_ref(dir, "refs/heads/master");

    run_twig_command(dir, &["merge", "old"])
        .assert()
        .success()
        .stdout("Already up-to-date.\n");
    run_twig_command(dir, &["merge", "master"])
        .assert()
        .success()
        .stdout("Already up-to-date.\n");

    assert_eq!(read_ref(dir, "refs/heads/master"), tip);
    assert_eq!(read_file(&dir.join("1.txt")), "uno");

    Ok(())
}
