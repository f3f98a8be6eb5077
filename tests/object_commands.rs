use predicates::prelude::predicate;

mod common;

const HELLO_OID: &str = "3b18e512dba79e4c8300dd08aeb37f8e728b8dad";

#[test]
fn hash_object_writes_known_content_to_known_address()
-> Result<(), Box<dyn std::error::Error>> {
    let dir = common::init_repo();
    common::write_file(&dir, "a.txt", "hello world\n");

    common::kit(&dir)
        .args(["hash-object", "-w", "a.txt"])
        .assert()
        .success()
        .stdout(predicate::eq(format!("{HELLO_OID}\n")));

    assert!(
        dir.path()
            .join(".git/objects/3b/18e512dba79e4c8300dd08aeb37f8e728b8dad")
            .exists()
    );

    Ok(())
}

#[test]
fn hash_object_without_write_flag_only_hashes() -> Result<(), Box<dyn std::error::Error>> {
    let dir = common::init_repo();
    common::write_file(&dir, "a.txt", "hello world\n");

    common::kit(&dir)
        .args(["hash-object", "a.txt"])
        .assert()
        .success()
        .stdout(predicate::eq(format!("{HELLO_OID}\n")));

    assert!(
        !dir.path()
            .join(".git/objects/3b/18e512dba79e4c8300dd08aeb37f8e728b8dad")
            .exists()
    );

    Ok(())
}

#[test]
fn cat_file_prints_content_type_and_size() -> Result<(), Box<dyn std::error::Error>> {
    let dir = common::init_repo();
    common::write_file(&dir, "a.txt", "hello world\n");
    common::kit(&dir)
        .args(["hash-object", "-w", "a.txt"])
        .assert()
        .success();

    common::kit(&dir)
        .args(["cat-file", "-p", HELLO_OID])
        .assert()
        .success()
        .stdout(predicate::eq("hello world\n"));

    common::kit(&dir)
        .args(["cat-file", "-t", HELLO_OID])
        .assert()
        .success()
        .stdout(predicate::eq("blob\n"));

    common::kit(&dir)
        .args(["cat-file", "-s", HELLO_OID])
        .assert()
        .success()
        .stdout(predicate::eq("12\n"));

    Ok(())
}

#[test]
fn cat_file_fails_for_a_missing_object() -> Result<(), Box<dyn std::error::Error>> {
    let dir = common::init_repo();

    common::kit(&dir)
        .args(["cat-file", "-p", HELLO_OID])
        .assert()
        .failure()
        .stderr(predicate::str::contains("not found"));

    Ok(())
}

#[test]
fn hashing_the_same_content_twice_is_idempotent() -> Result<(), Box<dyn std::error::Error>> {
    let dir = common::init_repo();
    let content = common::random_content();
    common::write_file(&dir, "a.txt", &content);
    common::write_file(&dir, "b.txt", &content);

    let first = common::stdout(common::kit(&dir).args(["hash-object", "-w", "a.txt"]));
    let second = common::stdout(common::kit(&dir).args(["hash-object", "-w", "b.txt"]));

    assert_eq!(first, second);

    Ok(())
}
