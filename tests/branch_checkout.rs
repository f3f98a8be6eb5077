use predicates::prelude::predicate;

mod common;

#[test]
fn branch_points_at_the_current_head_commit() -> Result<(), Box<dyn std::error::Error>> {
    let dir = common::init_repo();
    common::write_file(&dir, "a.txt", "hello\n");
    let commit_oid = common::commit_all(&dir, "initial");

    common::kit(&dir).args(["branch", "feature"]).assert().success();

    let feature = std::fs::read_to_string(dir.path().join(".git/refs/heads/feature"))?;
    assert_eq!(feature.trim(), commit_oid);

    Ok(())
}

#[test]
fn duplicate_branch_is_rejected() -> Result<(), Box<dyn std::error::Error>> {
    let dir = common::init_repo();
    common::write_file(&dir, "a.txt", "hello\n");
    common::commit_all(&dir, "initial");

    common::kit(&dir).args(["branch", "feature"]).assert().success();

    common::kit(&dir)
        .args(["branch", "feature"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("already exists"));

    Ok(())
}

#[test]
fn branch_without_commits_is_rejected() -> Result<(), Box<dyn std::error::Error>> {
    let dir = common::init_repo();

    common::kit(&dir)
        .args(["branch", "feature"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("no commits yet"));

    Ok(())
}

#[test]
fn invalid_branch_names_are_rejected() -> Result<(), Box<dyn std::error::Error>> {
    let dir = common::init_repo();
    common::write_file(&dir, "a.txt", "hello\n");
    common::commit_all(&dir, "initial");

    for name in [".hidden", "bad..name", "trailing/", "spaced name"] {
        common::kit(&dir).args(["branch", name]).assert().failure();
    }

    Ok(())
}

#[test]
fn checkout_restores_the_branch_snapshot() -> Result<(), Box<dyn std::error::Error>> {
    let dir = common::init_repo();
    common::write_file(&dir, "a.txt", "original content\n");
    common::write_file(&dir, "sub/b.txt", "kept\n");
    common::commit_all(&dir, "initial");

    common::kit(&dir).args(["branch", "feature"]).assert().success();

    common::write_file(&dir, "a.txt", "changed on master\n");
    common::write_file(&dir, "new.txt", "only on master\n");
    common::commit_all(&dir, "diverge");

    common::kit(&dir)
        .args(["checkout", "feature"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Switched to branch 'feature'"));

    let restored = std::fs::read_to_string(dir.path().join("a.txt"))?;
    assert_eq!(restored, "original content\n");
    assert!(!dir.path().join("new.txt").exists());
    assert!(dir.path().join("sub/b.txt").exists());

    let head = std::fs::read_to_string(dir.path().join(".git/HEAD"))?;
    assert_eq!(head.trim(), "ref: refs/heads/feature");

    Ok(())
}

#[test]
fn checkout_rebuilds_the_index_to_match_the_snapshot()
-> Result<(), Box<dyn std::error::Error>> {
    let dir = common::init_repo();
    common::write_file(&dir, "a.txt", "one\n");
    common::commit_all(&dir, "first");

    common::kit(&dir).args(["branch", "feature"]).assert().success();

    common::write_file(&dir, "a.txt", "two\n");
    common::write_file(&dir, "extra.txt", "more\n");
    common::commit_all(&dir, "second");

    common::kit(&dir).args(["checkout", "feature"]).assert().success();

    common::kit(&dir)
        .arg("ls-files")
        .assert()
        .success()
        .stdout(predicate::eq("a.txt\n"));

    common::kit(&dir)
        .arg("status")
        .assert()
        .success()
        .stdout(predicate::str::contains(
            "nothing to commit, working tree clean",
        ));

    Ok(())
}

#[test]
fn checkout_of_an_unknown_branch_fails() -> Result<(), Box<dyn std::error::Error>> {
    let dir = common::init_repo();
    common::write_file(&dir, "a.txt", "hello\n");
    common::commit_all(&dir, "initial");

    common::kit(&dir)
        .args(["checkout", "missing"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("not found"));

    Ok(())
}
