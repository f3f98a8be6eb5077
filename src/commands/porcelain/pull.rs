use crate::areas::remote::{HttpTransport, Remote};
use crate::areas::repository::Repository;
use crate::artifacts::core::GitError;
use crate::artifacts::pack::reader::PackReader;
use std::io::Write;

impl Repository {
    /// Bring the current branch up to the remote's tip: fetch a pack for
    /// the remote branch head, check it out, and move the local branch,
    /// remote-tracking branch, and remote HEAD.
    pub fn pull(&self, url: &str) -> anyhow::Result<()> {
        let transport = HttpTransport::from_env()?;
        let remote = Remote::new(url, &transport);

        let branch = self.refs().current_branch()?.ok_or_else(|| {
            GitError::Conflict("cannot pull into a detached HEAD".to_string())
        })?;

        let remote_refs = remote.discover_refs()?;
        let remote_tip = remote_refs
            .branch(branch.as_ref())
            .ok_or_else(|| GitError::NotFound(format!("branch {branch} on the remote")))?
            .clone();

        if self.refs().read_branch(&branch)?.as_ref() == Some(&remote_tip) {
            writeln!(self.writer(), "Already up to date.")?;
            return Ok(());
        }

        let pack = remote.fetch_pack(std::slice::from_ref(&remote_tip))?;
        let count = PackReader::new(self.database()).read(&pack)?;
        writeln!(self.writer(), "Receiving objects: 100% ({count}/{count}), done.")?;

        self.materialize_commit(&remote_tip)?;

        self.refs().update_branch(&branch, &remote_tip)?;
        self.refs().update_remote_branch(&branch, &remote_tip)?;
        self.refs().set_remote_head_symref(&branch)?;

        writeln!(
            self.writer(),
            "Updated {branch} to {}",
            remote_tip.to_short_oid()
        )?;

        Ok(())
    }
}
