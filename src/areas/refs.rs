//! Reference management
//!
//! References are human-readable names pointing at commits. A ref file
//! holds either a 40-hex commit hash (direct) or `ref: <path>` (symbolic).
//! `HEAD` is usually symbolic, pointing at `refs/heads/<branch>`; clones
//! also keep remote-tracking refs under `refs/remotes/origin/`.
//!
//! Dereferencing always terminates: a chain ends at a direct ref or at a
//! file that does not exist yet (a branch with no commits). Missing refs
//! are `None`, never an error.

use crate::artifacts::branch::branch_name::{BranchName, SymRefName};
use crate::artifacts::core::GitError;
use crate::artifacts::objects::object_id::ObjectId;
use anyhow::Context;
use derive_new::new;
use file_guard::Lock;
use std::io::Write;
use std::ops::DerefMut;
use std::path::Path;

/// Pattern splitting a symbolic ref from its target path
const SYMREF_REGEX: &str = r"^ref: (.+)$";

/// Where remote-tracking refs for the default remote live
const REMOTE_PREFIX: &str = "refs/remotes/origin";

#[derive(Debug, new)]
pub struct Refs {
    /// Path to the git directory (typically `.git`)
    path: Box<Path>,
}

/// Content of a ref file
#[derive(Debug, Clone)]
enum SymRefOrOid {
    SymRef(SymRefName),
    Oid(ObjectId),
}

impl SymRefOrOid {
    fn read(path: &Path) -> anyhow::Result<Option<SymRefOrOid>> {
        if !path.exists() {
            return Ok(None);
        }

        let content = std::fs::read_to_string(path)?;
        let content = content.trim();

        if content.is_empty() {
            return Ok(None);
        }

        let symref_match = regex::Regex::new(SYMREF_REGEX)?.captures(content);
        match symref_match {
            Some(symref_match) => Ok(Some(SymRefOrOid::SymRef(SymRefName::new(
                symref_match[1].to_string(),
            )))),
            None => Ok(Some(SymRefOrOid::Oid(ObjectId::try_parse(
                content.to_string(),
            )?))),
        }
    }
}

impl Refs {
    /// Follow symbolic refs from `source` (HEAD by default) to the last
    /// named ref in the chain, whether or not its file exists yet.
    pub fn current_ref(&self, source: Option<SymRefName>) -> anyhow::Result<SymRefName> {
        let source = source.unwrap_or_else(SymRefName::head);

        match SymRefOrOid::read(&self.path.join(source.as_ref_path()))? {
            Some(SymRefOrOid::SymRef(sym_ref_name)) => self.current_ref(Some(sym_ref_name)),
            Some(_) | None => Ok(source),
        }
    }

    /// The current branch, or `None` on a detached HEAD
    pub fn current_branch(&self) -> anyhow::Result<Option<BranchName>> {
        let current_ref = self.current_ref(None)?;

        if current_ref.is_head() {
            return Ok(None);
        }

        BranchName::try_parse_sym_ref_name(&current_ref).map(Some)
    }

    fn read_symref(&self, path: &Path) -> anyhow::Result<Option<ObjectId>> {
        match SymRefOrOid::read(path)? {
            Some(SymRefOrOid::SymRef(sym_ref_name)) => {
                self.read_symref(&self.path.join(sym_ref_name.as_ref_path()))
            }
            Some(SymRefOrOid::Oid(oid)) => Ok(Some(oid)),
            None => Ok(None),
        }
    }

    /// The path a write through `start` should land on: the end of the
    /// symbolic chain.
    fn resolve_symref_path(&self, start: &Path) -> anyhow::Result<Box<Path>> {
        match SymRefOrOid::read(start)? {
            Some(SymRefOrOid::SymRef(sym_ref_name)) => {
                self.resolve_symref_path(&self.path.join(sym_ref_name.as_ref_path()))
            }
            Some(SymRefOrOid::Oid(_)) | None => Ok(start.to_path_buf().into_boxed_path()),
        }
    }

    pub fn read_head(&self) -> anyhow::Result<Option<ObjectId>> {
        self.read_symref(&self.head_path())
    }

    /// Move whatever HEAD ultimately points at to a new commit, creating
    /// the branch file on the first commit.
    pub fn update_head(&self, oid: &ObjectId) -> anyhow::Result<()> {
        let target = self.resolve_symref_path(&self.head_path())?;
        self.update_ref_file(target, oid.as_ref())
    }

    /// Point HEAD at a branch
    pub fn set_head_symref(&self, branch: &BranchName) -> anyhow::Result<()> {
        self.update_ref_file(
            self.head_path(),
            &format!("ref: {}", branch.as_sym_ref_name().as_ref_path()),
        )
    }

    /// Point the remote-tracking HEAD at a remote-tracking branch
    pub fn set_remote_head_symref(&self, branch: &BranchName) -> anyhow::Result<()> {
        self.update_ref_file(
            self.remotes_path().join("HEAD").into_boxed_path(),
            &format!("ref: {REMOTE_PREFIX}/{branch}"),
        )
    }

    pub fn read_branch(&self, branch: &BranchName) -> anyhow::Result<Option<ObjectId>> {
        self.read_symref(&self.heads_path().join(branch.as_ref()))
    }

    pub fn update_branch(&self, branch: &BranchName, oid: &ObjectId) -> anyhow::Result<()> {
        self.update_ref_file(
            self.heads_path().join(branch.as_ref()).into_boxed_path(),
            oid.as_ref(),
        )
    }

    pub fn read_remote_branch(&self, branch: &BranchName) -> anyhow::Result<Option<ObjectId>> {
        self.read_symref(&self.remotes_path().join(branch.as_ref()))
    }

    pub fn update_remote_branch(&self, branch: &BranchName, oid: &ObjectId) -> anyhow::Result<()> {
        self.update_ref_file(
            self.remotes_path().join(branch.as_ref()).into_boxed_path(),
            oid.as_ref(),
        )
    }

    /// Create a branch pointing at a commit; an existing branch of the
    /// same name is a conflict.
    pub fn create_branch(&self, branch: &BranchName, source_oid: &ObjectId) -> anyhow::Result<()> {
        let branch_path = self.heads_path().join(branch.as_ref());

        if branch_path.exists() {
            return Err(GitError::Conflict(format!("branch {branch} already exists")).into());
        }

        self.update_ref_file(branch_path.into_boxed_path(), source_oid.as_ref())
    }

    /// Write a ref file whole, creating intermediate directories
    pub fn update_ref_file(&self, path: Box<Path>, raw_ref: &str) -> anyhow::Result<()> {
        std::fs::create_dir_all(path.parent().with_context(|| {
            format!("failed to resolve parent directory for ref file at {path:?}")
        })?)?;

        let mut ref_file = std::fs::OpenOptions::new()
            .write(true)
            .create(true)
            .truncate(true)
            .open(&path)
            .with_context(|| format!("failed to open ref file at {path:?}"))?;
        let mut lock = file_guard::lock(&mut ref_file, Lock::Exclusive, 0, 1)?;
        lock.deref_mut().write_all(raw_ref.as_bytes())?;
        lock.deref_mut().write_all(b"\n")?;

        Ok(())
    }

    pub fn head_path(&self) -> Box<Path> {
        self.path.join("HEAD").into_boxed_path()
    }

    pub fn refs_path(&self) -> Box<Path> {
        self.path.join("refs").into_boxed_path()
    }

    pub fn heads_path(&self) -> Box<Path> {
        self.refs_path().join("heads").into_boxed_path()
    }

    pub fn remotes_path(&self) -> Box<Path> {
        self.path.join(REMOTE_PREFIX).into_boxed_path()
    }
}
