use crate::areas::repository::Repository;
use anyhow::Context;
use std::fs;
use std::io::Write;

const DEFAULT_HEAD: &str = "ref: refs/heads/master\n";

impl Repository {
    /// Lay down the repository skeleton. Re-running over an existing
    /// repository leaves its state alone.
    pub fn init(&self) -> anyhow::Result<()> {
        fs::create_dir_all(self.database().objects_path())
            .context("failed to create .git/objects directory")?;

        fs::create_dir_all(self.refs().heads_path())
            .context("failed to create .git/refs/heads directory")?;

        let head_path = self.refs().head_path();
        if !head_path.exists() {
            fs::write(head_path, DEFAULT_HEAD).context("failed to write .git/HEAD file")?;
        }

        writeln!(
            self.writer(),
            "Initialized empty Git repository in {}",
            self.path().display()
        )?;

        Ok(())
    }
}
