use crate::areas::repository::Repository;
use crate::artifacts::core::GitError;
use crate::artifacts::objects::commit::{Author, Commit};
use crate::artifacts::objects::object_id::ObjectId;
use std::io::Write;

const DEFAULT_MESSAGE: &str = "Made a commit!";

impl Repository {
    /// Wrap an existing tree in a commit object. The tree must already be
    /// in the database before the commit referencing it is written.
    pub fn commit_tree(
        &self,
        tree_hex: &str,
        parent_hex: Option<&str>,
        message: Option<&str>,
    ) -> anyhow::Result<()> {
        let tree_oid = ObjectId::try_parse(tree_hex.to_string())?;
        if !self.database().exists(&tree_oid) {
            return Err(GitError::NotFound(format!("tree {tree_oid}")).into());
        }

        let parents = match parent_hex {
            Some(parent) => vec![ObjectId::try_parse(parent.to_string())?],
            None => vec![],
        };

        let author = Author::load_from_env()?;
        let message = message.unwrap_or(DEFAULT_MESSAGE).trim().to_string();

        let commit = Commit::new(parents, tree_oid, author, message);
        let commit_oid = self.database().store(commit)?;

        writeln!(self.writer(), "{commit_oid}")?;

        Ok(())
    }
}
