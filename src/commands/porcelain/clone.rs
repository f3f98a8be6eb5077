use crate::areas::remote::{HttpTransport, Remote};
use crate::areas::repository::Repository;
use crate::artifacts::branch::branch_name::BranchName;
use crate::artifacts::core::GitError;
use crate::artifacts::pack::reader::PackReader;
use std::io::Write;

const DEFAULT_BRANCH: &str = "master";

impl Repository {
    /// Populate a freshly initialized repository from a remote: discover
    /// refs, fetch a pack for the advertised HEAD, install the refs, and
    /// check the commit out.
    pub fn clone_from(&self, url: &str) -> anyhow::Result<()> {
        let transport = HttpTransport::from_env_or_anonymous();
        let remote = Remote::new(url, &transport);

        let remote_refs = remote.discover_refs()?;
        let head_oid = remote_refs
            .head()
            .ok_or_else(|| GitError::NotFound("HEAD in the remote's advertised refs".to_string()))?
            .clone();

        let pack = remote.fetch_pack(std::slice::from_ref(&head_oid))?;
        let count = PackReader::new(self.database()).read(&pack)?;
        writeln!(self.writer(), "Receiving objects: 100% ({count}/{count}), done.")?;

        // name the local branch after whichever remote branch HEAD is on
        let branch = remote_refs
            .branch_matching(&head_oid)
            .unwrap_or(DEFAULT_BRANCH);
        let branch = BranchName::try_parse(branch.to_string())?;

        self.refs().update_branch(&branch, &head_oid)?;
        self.refs().update_remote_branch(&branch, &head_oid)?;
        self.refs().set_remote_head_symref(&branch)?;
        self.refs().set_head_symref(&branch)?;

        self.materialize_commit(&head_oid)
    }
}
