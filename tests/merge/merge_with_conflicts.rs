use crate::common::command::{
    cat_object, diverged_repository_dir, init_repository_dir, parents_of, read_ref,
    run_twig_command, twig_commit, with_author,
};
use crate::common::file::{FileSpec, delete_path, read_file, write_file};
use crate::common::stdout_of;
use assert_fs::TempDir;
use predicates::prelude::predicate;
use pretty_assertions::assert_eq;
use rstest::rstest;

#[rstest]
fn merge_reports_a_content_conflict(
    diverged_repository_dir: TempDir,
) -> Result<(), Box<dyn std::error::Error>> {
    let dir = diverged_repository_dir.path();
    let master = read_ref(dir, "refs/heads/master");
    let topic = read_ref(dir, "refs/heads/topic");

    let output = run_twig_command(dir, &["merge", "topic"])
        .assert()
        .code(1);
    assert_eq!(
        stdout_of(&output),
        "Auto-merging filea\n\
         CONFLICT (content): Merge conflict in filea\n\
         Automatic merge failed. Fix conflicts and commit the result.\n"
    );

    assert_eq!(
        read_file(&dir.join("filea")),
        "<<<<<<< master\nfileaaaa\n=======\nfileaaa\n>>>>>>> topic\n"
    );
    // the branch does not move until the merge is concluded
    assert_eq!(read_ref(dir, "refs/heads/master"), master);
    assert_eq!(read_ref(dir, "MERGE_HEAD"), topic);

    run_twig_command(dir, &["status", "--porcelain"])
        .assert()
        .success()
        .stdout("UU filea\n");
    run_twig_command(dir, &["status"])
        .assert()
        .success()
        .stdout(
            "On branch master\n\
             You have unmerged paths.\n\
             \n\
             Unmerged paths:\n\
             \tboth modified:   filea\n",
        );

    Ok(())
}

#[rstest]
fn resolving_the_conflict_and_committing_concludes_the_merge(
    diverged_repository_dir: TempDir,
) -> Result<(), Box<dyn std::error::Error>> {
    let dir = diverged_repository_dir.path();
    let master = read_ref(dir, "refs/heads/master");
    let topic = read_ref(dir, "refs/heads/topic");
    run_twig_command(dir, &["merge", "topic"])
        .assert()
        .code(1);

    write_file(FileSpec::new(dir.join("filea"), "fileaaa\n".to_string()));
    run_twig_command(dir, &["add", "filea"]).assert().success();

    run_twig_command(dir, &["status"])
        .assert()
        .success()
        .stdout(predicate::str::contains(
            "All conflicts fixed but you are still merging.",
        ));

    with_author(run_twig_command(dir, &["commit"]))
        .assert()
        .success()
        .stdout(predicate::str::ends_with(
            "] Merge branch 'topic' into master\n",
        ));

    assert_eq!(parents_of(dir, "HEAD"), vec![master, topic]);
    assert!(!dir.join(".git").join("MERGE_HEAD").exists());
    assert!(!dir.join(".git").join("MERGE_MSG").exists());
    assert!(cat_object(dir, "HEAD").ends_with("\nMerge branch 'topic' into master\n"));
    assert_eq!(read_file(&dir.join("filea")), "fileaaa\n");
    run_twig_command(dir, &["status", "--porcelain"])
        .assert()
        .success()
        .stdout("");

    Ok(())
}

#[rstest]
fn committing_with_unmerged_paths_fails(
    diverged_repository_dir: TempDir,
) -> Result<(), Box<dyn std::error::Error>> {
    let dir = diverged_repository_dir.path();
    let master = read_ref(dir, "refs/heads/master");
    run_twig_command(dir, &["merge", "topic"])
        .assert()
        .code(1);

    twig_commit(dir, "Too early")
        .assert()
        .failure()
        .stderr(predicate::str::contains(
            "committing is not possible because you have unmerged files",
        ))
        .stderr(predicate::str::contains("\tfilea"));

    assert_eq!(read_ref(dir, "refs/heads/master"), master);
    assert!(dir.join(".git").join("MERGE_HEAD").is_file());

    Ok(())
}

#[rstest]
fn merge_reports_a_modify_delete_conflict(
    init_repository_dir: TempDir,
) -> Result<(), Box<dyn std::error::Error>> {
    let dir = init_repository_dir.path();
    run_twig_command(dir, &["branch", "topic"]).assert().success();

    delete_path(&dir.join("1.txt"));
    write_file(FileSpec::new(dir.join("master.txt"), "master".to_string()));
    run_twig_command(dir, &["add", "."]).assert().success();
    twig_commit(dir, "Delete 1.txt").assert().success();

    run_twig_command(dir, &["checkout", "topic"])
        .assert()
        .success();
    write_file(FileSpec::new(dir.join("1.txt"), "topic one".to_string()));
    run_twig_command(dir, &["add", "1.txt"]).assert().success();
    twig_commit(dir, "Edit 1.txt").assert().success();
    run_twig_command(dir, &["checkout", "master"])
        .assert()
        .success();

    run_twig_command(dir, &["merge", "topic"])
        .assert()
        .code(1)
        .stdout(predicate::str::contains(
            "CONFLICT (modify/delete): 1.txt deleted in master and modified in topic. \
             Version topic of 1.txt left in tree.",
        ));

    assert_eq!(read_file(&dir.join("1.txt")), "topic one");
    run_twig_command(dir, &["status"])
        .assert()
        .success()
        .stdout(predicate::str::contains("\tdeleted by us:   1.txt\n"));
    run_twig_command(dir, &["status", "--porcelain"])
        .assert()
        .success()
        .stdout(predicate::str::contains("DU 1.txt\n"));

    Ok(())
}

#[rstest]
fn merge_reports_an_add_add_conflict(
    init_repository_dir: TempDir,
) -> Result<(), Box<dyn std::error::Error>> {
    let dir = init_repository_dir.path();
    run_twig_command(dir, &["branch", "topic"]).assert().success();

    write_file(FileSpec::new(dir.join("new.txt"), "from master\n".to_string()));
    run_twig_command(dir, &["add", "new.txt"]).assert().success();
    twig_commit(dir, "Master adds").assert().success();

    run_twig_command(dir, &["checkout", "topic"])
        .assert()
        .success();
    write_file(FileSpec::new(dir.join("new.txt"), "from topic\n".to_string()));
    run_twig_command(dir, &["add", "new.txt"]).assert().success();
    twig_commit(dir, "Topic adds").assert().success();
    run_twig_command(dir, &["checkout", "master"])
        .assert()
        .success();

    run_twig_command(dir, &["merge", "topic"])
        .assert()
        .code(1)
        .stdout(predicate::str::contains(
            "CONFLICT (add/add): Merge conflict in new.txt",
        ));

    assert_eq!(
        read_file(&dir.join("new.txt")),
        "<<<<<<< master\nfrom master\n=======\nfrom topic\n>>>>>>> topic\n"
    );
    run_twig_command(dir, &["status"])
        .assert()
        .success()
        .stdout(predicate::str::contains("\tboth added:      new.txt\n"));
    run_twig_command(dir, &["status", "--porcelain"])
        .assert()
        .success()
        .stdout(predicate::str::contains("AA new.txt\n"));

    Ok(())
}
