use predicates::prelude::predicate;

mod common;

const HELLO_OID: &str = "3b18e512dba79e4c8300dd08aeb37f8e728b8dad";

#[test]
fn add_stages_a_file_and_ls_files_lists_it() -> Result<(), Box<dyn std::error::Error>> {
    let dir = common::init_repo();
    common::write_file(&dir, "a.txt", "hello world\n");

    common::kit(&dir).args(["add", "a.txt"]).assert().success();

    common::kit(&dir)
        .arg("ls-files")
        .assert()
        .success()
        .stdout(predicate::eq("a.txt\n"));

    common::kit(&dir)
        .args(["ls-files", "-s"])
        .assert()
        .success()
        .stdout(predicate::eq(format!("100644 {HELLO_OID} a.txt\n")));

    Ok(())
}

#[test]
fn adding_the_same_path_twice_leaves_identical_index_bytes()
-> Result<(), Box<dyn std::error::Error>> {
    let dir = common::init_repo();
    let file_name = common::random_file_name();
    common::write_file(&dir, &file_name, &common::random_content());

    common::kit(&dir).args(["add", &file_name]).assert().success();
    let first = std::fs::read(dir.path().join(".git/index"))?;

    common::kit(&dir).args(["add", &file_name]).assert().success();
    let second = std::fs::read(dir.path().join(".git/index"))?;

    assert_eq!(first, second);

    Ok(())
}

#[test]
fn index_entries_are_sorted_by_path() -> Result<(), Box<dyn std::error::Error>> {
    let dir = common::init_repo();
    common::write_file(&dir, "zeta.txt", "z\n");
    common::write_file(&dir, "alpha.txt", "a\n");
    common::write_file(&dir, "sub/mid.txt", "m\n");

    common::kit(&dir)
        .args(["add", "zeta.txt", "alpha.txt", "sub/mid.txt"])
        .assert()
        .success();

    common::kit(&dir)
        .arg("ls-files")
        .assert()
        .success()
        .stdout(predicate::eq("alpha.txt\nsub/mid.txt\nzeta.txt\n"));

    Ok(())
}

#[test]
fn adding_a_directory_stages_its_files() -> Result<(), Box<dyn std::error::Error>> {
    let dir = common::init_repo();
    common::write_file(&dir, "sub/a.txt", "a\n");
    common::write_file(&dir, "sub/deep/b.txt", "b\n");

    common::kit(&dir).args(["add", "sub"]).assert().success();

    common::kit(&dir)
        .arg("ls-files")
        .assert()
        .success()
        .stdout(predicate::eq("sub/a.txt\nsub/deep/b.txt\n"));

    Ok(())
}

#[test]
fn adding_a_missing_path_is_ignored() -> Result<(), Box<dyn std::error::Error>> {
    let dir = common::init_repo();
    common::write_file(&dir, "a.txt", "hello\n");

    common::kit(&dir)
        .args(["add", "a.txt", "no-such-file.txt"])
        .assert()
        .success();

    common::kit(&dir)
        .arg("ls-files")
        .assert()
        .success()
        .stdout(predicate::eq("a.txt\n"));

    Ok(())
}

#[test]
fn reset_unstages_previously_added_paths() -> Result<(), Box<dyn std::error::Error>> {
    let dir = common::init_repo();
    common::write_file(&dir, "a.txt", "a\n");
    common::write_file(&dir, "b.txt", "b\n");
    common::kit(&dir).args(["add", "."]).assert().success();

    common::kit(&dir).args(["reset", "a.txt"]).assert().success();

    common::kit(&dir)
        .arg("ls-files")
        .assert()
        .success()
        .stdout(predicate::eq("b.txt\n"));

    Ok(())
}

#[test]
fn a_corrupted_index_is_rejected() -> Result<(), Box<dyn std::error::Error>> {
    let dir = common::init_repo();
    common::write_file(&dir, "a.txt", "hello\n");
    common::kit(&dir).args(["add", "a.txt"]).assert().success();

    let index_path = dir.path().join(".git/index");
    let mut index = std::fs::read(&index_path)?;
    let last = index.len() - 1;
    index[last] ^= 0xFF;
    std::fs::write(&index_path, index)?;

    common::kit(&dir)
        .arg("ls-files")
        .assert()
        .failure()
        .stderr(predicate::str::contains("checksum"));

    Ok(())
}

#[test]
fn replacing_a_file_with_a_directory_drops_the_stale_entry()
-> Result<(), Box<dyn std::error::Error>> {
    let dir = common::init_repo();
    common::write_file(&dir, "name", "file first\n");
    common::kit(&dir).args(["add", "name"]).assert().success();

    std::fs::remove_file(dir.path().join("name"))?;
    common::write_file(&dir, "name/inner.txt", "now a directory\n");
    common::kit(&dir).args(["add", "name"]).assert().success();

    common::kit(&dir)
        .arg("ls-files")
        .assert()
        .success()
        .stdout(predicate::eq("name/inner.txt\n"));

    Ok(())
}
