#![allow(dead_code)]

use assert_cmd::Command;
use assert_fs::TempDir;
use fake::Fake;
use fake::faker::lorem::en::{Word, Words};

pub const AUTHOR_NAME: &str = "Test Author";
pub const AUTHOR_EMAIL: &str = "author@example.com";

/// A `kit` invocation rooted in the given repository
pub fn kit(dir: &TempDir) -> Command {
    let mut cmd = Command::cargo_bin("kit").expect("failed to find kit binary");
    cmd.current_dir(dir.path())
        .env("GIT_AUTHOR_NAME", AUTHOR_NAME)
        .env("GIT_AUTHOR_EMAIL", AUTHOR_EMAIL);
    cmd
}

/// A fresh temporary directory with `kit init` already run
pub fn init_repo() -> TempDir {
    let dir = TempDir::new().expect("failed to create temp dir");
    kit(&dir).arg("init").assert().success();
    dir
}

/// Run a command and return its trimmed stdout
pub fn stdout(cmd: &mut Command) -> String {
    let output = cmd.assert().success().get_output().stdout.clone();
    String::from_utf8(output)
        .expect("command output was not utf-8")
        .trim_end()
        .to_string()
}

/// A random `<word>.txt` file name
pub fn random_file_name() -> String {
    format!("{}.txt", Word().fake::<String>())
}

/// A few random words of file content
pub fn random_content() -> String {
    let mut content = Words(5..10).fake::<Vec<String>>().join(" ");
    content.push('\n');
    content
}

/// Write a file (creating parent directories) inside the repository
pub fn write_file(dir: &TempDir, path: &str, content: &str) {
    let full_path = dir.path().join(path);
    if let Some(parent) = full_path.parent() {
        std::fs::create_dir_all(parent).expect("failed to create parent directories");
    }
    std::fs::write(full_path, content).expect("failed to write file");
}

/// Stage paths and commit them, returning the commit hash from the branch
/// ref
pub fn commit_all(dir: &TempDir, message: &str) -> String {
    kit(dir).args(["add", "."]).assert().success();
    kit(dir).args(["commit", "-m", message]).assert().success();

    std::fs::read_to_string(dir.path().join(".git/refs/heads/master"))
        .expect("failed to read master ref")
        .trim()
        .to_string()
}
