use crate::areas::remote::{HttpTransport, Remote};
use crate::areas::repository::Repository;
use crate::artifacts::core::GitError;
use crate::artifacts::objects::object_id::ObjectId;
use crate::artifacts::pack::writer::PackWriter;
use crate::artifacts::protocol::ZERO_OID;
use std::collections::BTreeSet;
use std::io::Write;

impl Repository {
    /// Upload the current branch to the remote: pack every object
    /// reachable from the local tip that the remote tip cannot reach, and
    /// ask receive-pack to advance the ref.
    pub fn push(&self, url: &str) -> anyhow::Result<()> {
        let transport = HttpTransport::from_env()?;
        let remote = Remote::new(url, &transport);

        let branch = self.refs().current_branch()?.ok_or_else(|| {
            GitError::Conflict("cannot push from a detached HEAD".to_string())
        })?;
        let local_tip = self
            .refs()
            .read_branch(&branch)?
            .ok_or_else(|| GitError::NotFound(format!("branch {branch} (no commits yet)")))?;

        let remote_tip = self.refs().read_remote_branch(&branch)?;

        if remote_tip.as_ref() == Some(&local_tip) {
            writeln!(self.writer(), "Everything up-to-date")?;
            return Ok(());
        }

        let missing = self.missing_on_remote(&local_tip, remote_tip.as_ref())?;
        if missing.is_empty() {
            writeln!(self.writer(), "Everything up-to-date")?;
            return Ok(());
        }

        writeln!(
            self.writer(),
            "Pushing {} objects to {url}",
            missing.len()
        )?;

        let pack = PackWriter::new(self.database())
            .write(&missing.into_iter().collect::<Vec<_>>())?;

        let old_oid = remote_tip
            .as_ref()
            .map(|oid| oid.as_ref().to_string())
            .unwrap_or_else(|| ZERO_OID.to_string());
        remote.push_pack(&old_oid, &local_tip, &branch, pack)?;

        self.refs().update_remote_branch(&branch, &local_tip)?;

        writeln!(self.writer(), "Updated refs/heads/{branch} on {url}")?;

        Ok(())
    }

    /// The full reachable closure of the local tip minus the remote
    /// tip's. An unknown remote tip (never fetched, or not present
    /// locally) contributes nothing to subtract.
    fn missing_on_remote(
        &self,
        local_tip: &ObjectId,
        remote_tip: Option<&ObjectId>,
    ) -> anyhow::Result<BTreeSet<ObjectId>> {
        let local_closure = self.database().reachable_objects(local_tip)?;

        let remote_closure = match remote_tip {
            Some(oid) if self.database().exists(oid) => self.database().reachable_objects(oid)?,
            _ => BTreeSet::new(),
        };

        Ok(local_closure
            .difference(&remote_closure)
            .cloned()
            .collect())
    }
}
