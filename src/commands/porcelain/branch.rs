use crate::areas::repository::Repository;
use crate::artifacts::branch::branch_name::BranchName;
use crate::artifacts::core::GitError;

impl Repository {
    /// Create a branch at the current HEAD commit
    pub fn branch(&self, name: &str) -> anyhow::Result<()> {
        let branch = BranchName::try_parse(name.to_string())?;

        let head_oid = self
            .refs()
            .read_head()?
            .ok_or_else(|| GitError::NotFound("HEAD commit (no commits yet)".to_string()))?;

        self.refs().create_branch(&branch, &head_oid)
    }
}
