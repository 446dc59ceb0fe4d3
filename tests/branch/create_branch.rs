use crate::common::command::{init_repository_dir, read_ref, repository_dir, run_twig_command, twig_commit};
use crate::common::file::{FileSpec, write_file};
use assert_fs::TempDir;
use predicates::prelude::predicate;
use pretty_assertions::assert_eq;
use rstest::rstest;

#[rstest]
fn create_branch_from_head(init_repository_dir: TempDir) -> Result<(), Box<dyn std::error::Error>> {
    let dir = init_repository_dir.path();

    run_twig_command(dir, &["branch", "feature/login"])
        .assert()
        .success();

    assert_eq!(
        read_ref(dir, "refs/heads/feature/login"),
        read_ref(dir, "refs/heads/master")
    );

    Ok(())
}

#[rstest]
#[case::parent("master^")]
#[case::ancestor("master~1")]
#[case::alias("@^")]
fn create_branch_from_an_ancestor(
    init_repository_dir: TempDir,
    #[case] start_point: &str,
) -> Result<(), Box<dyn std::error::Error>> {
    let dir = init_repository_dir.path();
    let first = read_ref(dir, "refs/heads/master");
    write_file(FileSpec::new(dir.join("1.txt"), "uno".to_string()));
    run_twig_command(dir, &["add", "1.txt"]).assert().success();
    twig_commit(dir, "Second commit").assert().success();

    run_twig_command(dir, &["branch", "old", start_point])
        .assert()
        .success();

    assert_eq!(read_ref(dir, "refs/heads/old"), first);

    Ok(())
}

#[rstest]
fn create_branch_from_an_abbreviated_id(
    init_repository_dir: TempDir,
) -> Result<(), Box<dyn std::error::Error>> {
    let dir = init_repository_dir.path();
    let tip = read_ref(dir, "refs/heads/master");

    run_twig_command(dir, &["branch", "short", &tip[..8]])
        .assert()
        .success();

    assert_eq!(read_ref(dir, "refs/heads/short"), tip);

    Ok(())
}

#[rstest]
#[case::leading_dot(".hidden")]
#[case::double_dot("a..b")]
#[case::lock_suffix("topic.lock")]
#[case::trailing_slash("topic/")]
#[case::space("with space")]
#[case::reflog_syntax("x@{1}")]
fn create_branch_with_invalid_name(
    init_repository_dir: TempDir,
    #[case] name: &str,
) -> Result<(), Box<dyn std::error::Error>> {
    run_twig_command(init_repository_dir.path(), &["branch", name])
        .assert()
        .failure()
        .stderr(predicate::str::contains("is not a valid reference name"));

    Ok(())
}

#[rstest]
fn create_duplicate_branch_fails(
    init_repository_dir: TempDir,
) -> Result<(), Box<dyn std::error::Error>> {
    let dir = init_repository_dir.path();
    run_twig_command(dir, &["branch", "topic"]).assert().success();

    run_twig_command(dir, &["branch", "topic"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("a branch named 'topic' already exists"));

    Ok(())
}

#[rstest]
fn create_branch_from_a_tree_fails(
    init_repository_dir: TempDir,
) -> Result<(), Box<dyn std::error::Error>> {
    let dir = init_repository_dir.path();
    let body = crate::common::command::cat_object(dir, "HEAD");
    let tree = body
        .lines()
        .find_map(|line| line.strip_prefix("tree "))
        .map(str::to_string)
        .unwrap_or_default();

    run_twig_command(dir, &["branch", "from-tree", &tree])
        .assert()
        .failure()
        .stderr(predicate::str::contains("is a tree, expected commit type"));

    Ok(())
}

#[rstest]
fn create_branch_without_commits_fails(
    repository_dir: TempDir,
) -> Result<(), Box<dyn std::error::Error>> {
    let dir = repository_dir.path();
    run_twig_command(dir, &["init"]).assert().success();

    run_twig_command(dir, &["branch", "topic"])
        .assert()
        .failure();
    assert!(!dir.join(".git").join("refs").join("heads").join("topic").exists());

    Ok(())
}
