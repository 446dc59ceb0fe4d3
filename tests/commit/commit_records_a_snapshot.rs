use crate::common::command::{
    cat_object, init_repository_dir, parents_of, read_ref, repository_dir, run_twig_command,
    twig_commit,
};
use crate::common::file::{FileSpec, write_file};
use crate::common::stdout_of;
use assert_fs::TempDir;
use predicates::prelude::predicate;
use pretty_assertions::assert_eq;
use rstest::rstest;

#[rstest]
fn root_commit_is_reported_and_has_no_parent(
    repository_dir: TempDir,
) -> Result<(), Box<dyn std::error::Error>> {
    let dir = repository_dir.path();
    run_twig_command(dir, &["init"]).assert().success();
    write_file(FileSpec::new(dir.join("1.txt"), "one".to_string()));
    run_twig_command(dir, &["add", "."]).assert().success();

    let output = twig_commit(dir, "Initial commit").assert().success();
    let tip = read_ref(dir, "refs/heads/master");

    assert_eq!(
        stdout_of(&output),
        format!("[master (root-commit) {}] Initial commit\n", &tip[..7])
    );
    assert!(parents_of(dir, "HEAD").is_empty());

    let body = cat_object(dir, "HEAD");
    assert!(body.contains("author fake_user <fake_email@email.com> 1672574400 +0000"));
    assert!(body.ends_with("\nInitial commit\n"));

    Ok(())
}

#[rstest]
fn second_commit_points_at_the_first(
    init_repository_dir: TempDir,
) -> Result<(), Box<dyn std::error::Error>> {
    let dir = init_repository_dir.path();
    let first = read_ref(dir, "refs/heads/master");

    write_file(FileSpec::new(dir.join("1.txt"), "uno".to_string()));
    run_twig_command(dir, &["add", "1.txt"]).assert().success();
    twig_commit(dir, "Second commit")
        .assert()
        .success()
        .stdout(predicate::str::starts_with("[master "))
        .stdout(predicate::str::ends_with("] Second commit\n"));

    assert_eq!(parents_of(dir, "HEAD"), vec![first.clone()]);
    assert_eq!(parents_of(dir, "HEAD^"), Vec::<String>::new());
    assert_eq!(read_ref(dir, "HEAD"), "ref: refs/heads/master");

    Ok(())
}

#[rstest]
fn commit_on_a_detached_head_moves_head_only(
    init_repository_dir: TempDir,
) -> Result<(), Box<dyn std::error::Error>> {
    let dir = init_repository_dir.path();
    let first = read_ref(dir, "refs/heads/master");

    run_twig_command(dir, &["checkout", &first])
        .assert()
        .success();
    write_file(FileSpec::new(dir.join("1.txt"), "detached".to_string()));
    run_twig_command(dir, &["add", "1.txt"]).assert().success();
    twig_commit(dir, "Detached work")
        .assert()
        .success()
        .stdout(predicate::str::starts_with("[detached HEAD "));

    assert_eq!(read_ref(dir, "refs/heads/master"), first);
    assert_eq!(parents_of(dir, "HEAD"), vec![first]);

    Ok(())
}
