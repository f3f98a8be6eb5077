//! Working directory operations
//!
//! File system access scoped to the repository root: scanning and reading
//! tracked files, stat capture for the index, and the primitives checkout
//! uses to materialize a tree. Hidden entries (anything starting with `.`,
//! the git directory included) are outside version control and are left
//! untouched by every operation here.

use crate::artifacts::index::entry_mode::EntryMode;
use crate::artifacts::index::index_entry::EntryMetadata;
use crate::artifacts::objects::blob::Blob;
use anyhow::Context;
use bytes::Bytes;
use std::io::Write;
use std::path::{Path, PathBuf};
use walkdir::WalkDir;

#[derive(Debug)]
pub struct Workspace {
    path: Box<Path>,
}

impl Workspace {
    pub fn new(path: Box<Path>) -> Self {
        Workspace { path }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn parse_blob(&self, path: &Path) -> anyhow::Result<Blob> {
        Ok(Blob::new(self.read_file(path)?))
    }

    /// All versionable files under `root` (the repository root if `None`),
    /// as paths relative to the repository root. Symlinks are listed, not
    /// followed.
    pub fn list_files(&self, root: Option<&Path>) -> anyhow::Result<Vec<PathBuf>> {
        let root = match root {
            Some(p) if p.is_absolute() => p.to_path_buf(),
            Some(p) => self.path.join(p),
            None => self.path.to_path_buf(),
        };

        if !root.exists() {
            return Err(anyhow::anyhow!("path does not exist: {root:?}"));
        }

        if !root.is_dir() {
            let relative = root
                .strip_prefix(self.path.as_ref())
                .map(PathBuf::from)
                .unwrap_or_default();
            return Ok(if Self::is_hidden(&relative) {
                vec![]
            } else {
                vec![relative]
            });
        }

        Ok(WalkDir::new(&root)
            .into_iter()
            .filter_map(|entry| entry.ok())
            .filter(|entry| entry.file_type().is_file() || entry.file_type().is_symlink())
            .filter_map(|entry| {
                let relative = entry.path().strip_prefix(self.path.as_ref()).ok()?;
                if Self::is_hidden(relative) {
                    None
                } else {
                    Some(relative.to_path_buf())
                }
            })
            .collect())
    }

    fn is_hidden(path: &Path) -> bool {
        path.components().any(|component| {
            matches!(
                component,
                std::path::Component::Normal(name) if name.to_string_lossy().starts_with('.')
            )
        })
    }

    /// File content as bytes; a symlink yields its target path
    pub fn read_file(&self, file_path: &Path) -> anyhow::Result<Bytes> {
        let full_path = self.path.join(file_path);

        let metadata = std::fs::symlink_metadata(&full_path)?;
        if metadata.file_type().is_symlink() {
            let target = std::fs::read_link(&full_path)?;
            return Ok(Bytes::from(target.as_os_str().as_encoded_bytes().to_vec()));
        }

        Ok(Bytes::from(std::fs::read(&full_path)?))
    }

    pub fn stat_file(&self, file_path: &Path) -> anyhow::Result<EntryMetadata> {
        let full_path = self.path.join(file_path);
        let metadata = std::fs::symlink_metadata(&full_path)?;

        (file_path, metadata).try_into()
    }

    /// Remove every non-hidden entry, leaving `.git` and other dotfiles
    /// in place. Checkout clears first, then lays the target tree down.
    pub fn clear(&self) -> anyhow::Result<()> {
        for entry in std::fs::read_dir(self.path.as_ref())? {
            let entry = entry?;
            if entry.file_name().to_string_lossy().starts_with('.') {
                continue;
            }

            let path = entry.path();
            if entry.file_type()?.is_dir() {
                std::fs::remove_dir_all(&path)
            } else {
                std::fs::remove_file(&path)
            }
            .with_context(|| format!("failed to remove {path:?}"))?;
        }

        Ok(())
    }

    pub fn make_directory(&self, dir_path: &Path) -> anyhow::Result<()> {
        std::fs::create_dir_all(self.path.join(dir_path))?;
        Ok(())
    }

    /// Materialize one blob at a path: a symlink becomes a symlink whose
    /// target is the blob content, a file gets its executable bit from the
    /// mode.
    pub fn write_file(&self, file_path: &Path, data: &[u8], mode: EntryMode) -> anyhow::Result<()> {
        let full_path = self.path.join(file_path);
        if let Some(parent) = full_path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        if mode.is_symlink() {
            let target = PathBuf::from(String::from_utf8_lossy(data).to_string());
            std::os::unix::fs::symlink(target, &full_path)
                .with_context(|| format!("failed to create symlink {file_path:?}"))?;
            return Ok(());
        }

        let mut file = std::fs::OpenOptions::new()
            .write(true)
            .create(true)
            .truncate(true)
            .open(&full_path)
            .with_context(|| format!("failed to open file {file_path:?}"))?;
        file.write_all(data)
            .with_context(|| format!("failed to write file {file_path:?}"))?;

        #[cfg(unix)]
        {
            use std::os::unix::fs::PermissionsExt;
            let permissions = std::fs::Permissions::from_mode(mode.as_u32() & 0o777);
            std::fs::set_permissions(&full_path, permissions)
                .with_context(|| format!("failed to set permissions on {file_path:?}"))?;
        }

        Ok(())
    }
}
