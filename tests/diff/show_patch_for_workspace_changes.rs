use crate::common::command::{init_repository_dir, run_twig_command};
use crate::common::file::{FileSpec, delete_path, write_file};
use crate::common::stdout_of;
use assert_fs::TempDir;
use pretty_assertions::assert_eq;
use rstest::rstest;

#[rstest]
fn show_name_status_for_unstaged_changes(
    init_repository_dir: TempDir,
) -> Result<(), Box<dyn std::error::Error>> {
    let dir = init_repository_dir.path();
    write_file(FileSpec::new(dir.join("1.txt"), "uno".to_string()));
    delete_path(&dir.join("a").join("b").join("3.txt"));
    write_file(FileSpec::new(dir.join("untracked.txt"), "skip".to_string()));

    run_twig_command(dir, &["diff", "--name-status"])
        .assert()
        .success()
        .stdout("M\t1.txt\nD\ta/b/3.txt\n");

    Ok(())
}

#[rstest]
fn show_diff_against_a_commit_includes_staged_files(
    init_repository_dir: TempDir,
) -> Result<(), Box<dyn std::error::Error>> {
    let dir = init_repository_dir.path();
    write_file(FileSpec::new(dir.join("4.txt"), "four".to_string()));
    run_twig_command(dir, &["add", "4.txt"]).assert().success();

    // against the index the staged file is unchanged
    run_twig_command(dir, &["diff", "--name-status"])
        .assert()
        .success()
        .stdout("");
    run_twig_command(dir, &["diff", "--name-status", "HEAD"])
        .assert()
        .success()
        .stdout("A\t4.txt\n");

    Ok(())
}

#[rstest]
fn show_patch_for_a_modified_file(
    init_repository_dir: TempDir,
) -> Result<(), Box<dyn std::error::Error>> {
    let dir = init_repository_dir.path();
    write_file(FileSpec::new(dir.join("1.txt"), "uno\n".to_string()));

    let output = run_twig_command(dir, &["diff"]).assert().success();
    let stdout = stdout_of(&output);
    let lines = stdout.lines().collect::<Vec<_>>();

    assert_eq!(lines[0], "diff --git a/1.txt b/1.txt");
    assert!(lines[1].starts_with("index ") && lines[1].ends_with(" 100644"));
    assert_eq!(lines[2], "--- a/1.txt");
    assert_eq!(lines[3], "+++ b/1.txt");
    assert_eq!(lines[4], "@@ -1,1 +1,1 @@");
    assert!(lines.contains(&"-one"));
    assert!(lines.contains(&"+uno"));
    assert_eq!(lines.len(), 7);

    Ok(())
}

#[rstest]
fn show_patch_for_a_deleted_file(
    init_repository_dir: TempDir,
) -> Result<(), Box<dyn std::error::Error>> {
    let dir = init_repository_dir.path();
    delete_path(&dir.join("1.txt"));

    let output = run_twig_command(dir, &["diff"]).assert().success();
    let stdout = stdout_of(&output);
    let lines = stdout.lines().collect::<Vec<_>>();
    let index_line = format!("index {}..0000000", &lines[2][6..13]);

    assert_eq!(
        lines,
        vec![
            "diff --git a/1.txt b/1.txt",
            "deleted file mode 100644",
            index_line.as_str(),
            "--- a/1.txt",
            "+++ /dev/null",
            "@@ -1,1 +0,0 @@",
            "-one",
        ]
    );

    Ok(())
}
