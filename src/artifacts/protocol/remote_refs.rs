//! Ref advertisement parsing
//!
//! Ref discovery answers with one pkt-line per ref: a 40-hex hash, a
//! space, and the refname. The first advertised ref may append a
//! NUL-separated capability list, which is recorded but otherwise unused.

use crate::artifacts::core::GitError;
use crate::artifacts::objects::OBJECT_ID_LENGTH;
use crate::artifacts::objects::object_id::ObjectId;
use std::collections::HashMap;

const HEADS_PREFIX: &str = "refs/heads/";

/// The remote's advertised refs, keyed by full refname
#[derive(Debug, Default)]
pub struct RemoteRefs {
    refs: HashMap<String, ObjectId>,
    capabilities: Vec<String>,
}

impl RemoteRefs {
    /// Parse advertisement pkt-lines (the service banner already
    /// stripped).
    pub fn parse(pkt_lines: &[String]) -> anyhow::Result<Self> {
        let mut refs = HashMap::new();
        let mut capabilities = Vec::new();

        for line in pkt_lines {
            if line.len() < OBJECT_ID_LENGTH + 2 {
                return Err(GitError::Corrupt(format!("ref advertisement line {line:?}")).into());
            }

            let (hash, rest) = line.split_at(OBJECT_ID_LENGTH);
            let oid = ObjectId::try_parse(hash.to_string())?;

            let rest = rest
                .strip_prefix(' ')
                .ok_or_else(|| GitError::Corrupt(format!("ref advertisement line {line:?}")))?;

            // the first ref may carry the capability list after a NUL
            let (refname, caps) = match rest.split_once('\0') {
                Some((refname, caps)) => (refname, Some(caps)),
                None => (rest, None),
            };
            if let Some(caps) = caps {
                capabilities.extend(caps.split_whitespace().map(str::to_string));
            }

            refs.insert(refname.to_string(), oid);
        }

        Ok(RemoteRefs { refs, capabilities })
    }

    pub fn head(&self) -> Option<&ObjectId> {
        self.refs.get("HEAD")
    }

    pub fn branch(&self, name: &str) -> Option<&ObjectId> {
        self.refs.get(&format!("{HEADS_PREFIX}{name}"))
    }

    /// The branch whose tip matches `oid`, used to name the local branch
    /// after a clone.
    pub fn branch_matching(&self, oid: &ObjectId) -> Option<&str> {
        let mut branches: Vec<&str> = self
            .refs
            .iter()
            .filter(|(name, tip)| name.starts_with(HEADS_PREFIX) && *tip == oid)
            .map(|(name, _)| name.as_str())
            .collect();
        branches.sort_unstable();

        branches
            .first()
            .and_then(|name| name.strip_prefix(HEADS_PREFIX))
    }

    pub fn capabilities(&self) -> &[String] {
        &self.capabilities
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    const HEAD_OID: &str = "3b18e512dba79e4c8300dd08aeb37f8e728b8dad";
    const OTHER_OID: &str = "ce013625030ba8dba906f756967f9e9ca394464a";

    fn advertisement() -> Vec<String> {
        vec![
            format!("{HEAD_OID} HEAD\0multi_ack thin-pack ofs-delta"),
            format!("{HEAD_OID} refs/heads/master"),
            format!("{OTHER_OID} refs/heads/feature"),
        ]
    }

    #[test]
    fn parses_head_branches_and_capabilities() {
        let refs = RemoteRefs::parse(&advertisement()).unwrap();

        assert_eq!(refs.head().unwrap().as_ref(), HEAD_OID);
        assert_eq!(refs.branch("master").unwrap().as_ref(), HEAD_OID);
        assert_eq!(refs.branch("feature").unwrap().as_ref(), OTHER_OID);
        assert!(refs.branch("missing").is_none());
        assert!(refs.capabilities().contains(&"ofs-delta".to_string()));
    }

    #[test]
    fn finds_branch_matching_head() {
        let refs = RemoteRefs::parse(&advertisement()).unwrap();
        let head = refs.head().unwrap().clone();

        assert_eq!(refs.branch_matching(&head), Some("master"));
    }

    #[test]
    fn rejects_short_and_invalid_lines() {
        assert!(RemoteRefs::parse(&["tooshort".to_string()]).is_err());
        assert!(
            RemoteRefs::parse(&[format!("{} refs/heads/x", "z".repeat(OBJECT_ID_LENGTH))]).is_err()
        );
    }
}
