use crate::areas::repository::Repository;
use crate::artifacts::branch::branch_name::BranchName;
use crate::artifacts::core::GitError;
use std::io::Write;

impl Repository {
    /// Switch to a branch: restore its commit into the working tree and
    /// point HEAD at the branch.
    pub fn checkout(&self, name: &str) -> anyhow::Result<()> {
        let branch = BranchName::try_parse(name.to_string())?;

        let commit_oid = self
            .refs()
            .read_branch(&branch)?
            .ok_or_else(|| GitError::NotFound(format!("branch {branch}")))?;

        self.materialize_commit(&commit_oid)?;
        self.refs().set_head_symref(&branch)?;

        writeln!(self.writer(), "Switched to branch '{branch}'")?;

        Ok(())
    }
}
