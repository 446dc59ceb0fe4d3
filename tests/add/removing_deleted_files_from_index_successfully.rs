use crate::common::command::{init_repository_dir, run_twig_command, twig_commit};
use crate::common::file::{FileSpec, delete_path, write_file};
use crate::common::stdout_of;
use assert_fs::TempDir;
use pretty_assertions::assert_eq;
use rstest::rstest;

#[rstest]
fn removing_deleted_files_from_index_successfully(
    init_repository_dir: TempDir,
) -> Result<(), Box<dyn std::error::Error>> {
    let dir = init_repository_dir.path();

    delete_path(&dir.join("a").join("2.txt"));
    write_file(FileSpec::new(dir.join("4.txt"), "four".to_string()));

    run_twig_command(dir, &["add", "."]).assert().success();

    let status = run_twig_command(dir, &["status", "--porcelain"])
        .assert()
        .success();
    assert_eq!(stdout_of(&status), "A  4.txt\nD  a/2.txt\n");

    twig_commit(dir, "Delete a/2.txt and add 4.txt")
        .assert()
        .success();

    let tree = run_twig_command(dir, &["ls-tree", "-r", "HEAD"])
        .assert()
        .success();
    let paths = stdout_of(&tree)
        .lines()
        .filter_map(|line| line.split('\t').nth(1).map(str::to_string))
        .collect::<Vec<_>>();
    assert_eq!(paths, vec!["1.txt", "4.txt", "a/b/3.txt"]);

    Ok(())
}

#[rstest]
fn staging_one_directory_leaves_other_deletions_unstaged(
    init_repository_dir: TempDir,
) -> Result<(), Box<dyn std::error::Error>> {
    let dir = init_repository_dir.path();

    delete_path(&dir.join("1.txt"));
    delete_path(&dir.join("a").join("b").join("3.txt"));

    run_twig_command(dir, &["add", "a"]).assert().success();

    let status = run_twig_command(dir, &["status", "--porcelain"])
        .assert()
        .success();
    assert_eq!(stdout_of(&status), " D 1.txt\nD  a/b/3.txt\n");

    Ok(())
}
