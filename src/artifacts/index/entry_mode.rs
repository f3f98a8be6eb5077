//! Entry modes
//!
//! The four modes git records in trees and index entries: regular file,
//! executable file, symlink, and directory. The canonical tree encoding
//! writes the directory mode as `40000` with no leading zero; displays pad
//! to six digits (`040000`).

use crate::artifacts::core::GitError;

#[derive(Debug, Clone, Copy, Eq, Ord, Default, PartialEq, PartialOrd)]
pub enum FileMode {
    #[default]
    Regular,
    Executable,
    Symlink,
}

#[derive(Debug, Clone, Copy, Eq, Ord, Default, PartialEq, PartialOrd)]
pub enum EntryMode {
    File(FileMode),
    #[default]
    Directory,
}

impl EntryMode {
    /// Canonical form written into tree payloads (no leading zero)
    pub fn as_str(&self) -> &str {
        match self {
            EntryMode::File(FileMode::Regular) => "100644",
            EntryMode::File(FileMode::Executable) => "100755",
            EntryMode::File(FileMode::Symlink) => "120000",
            EntryMode::Directory => "40000",
        }
    }

    /// Six-digit form used by `ls-tree` and `ls-files -s`
    pub fn as_display_str(&self) -> &str {
        match self {
            EntryMode::Directory => "040000",
            _ => self.as_str(),
        }
    }

    pub fn as_u32(&self) -> u32 {
        match self {
            EntryMode::File(FileMode::Regular) => 0o100644,
            EntryMode::File(FileMode::Executable) => 0o100755,
            EntryMode::File(FileMode::Symlink) => 0o120000,
            EntryMode::Directory => 0o40000,
        }
    }

    pub fn is_tree(&self) -> bool {
        matches!(self, EntryMode::Directory)
    }

    pub fn is_symlink(&self) -> bool {
        matches!(self, EntryMode::File(FileMode::Symlink))
    }

    pub fn from_octal_str(mode: &str) -> anyhow::Result<Self> {
        match mode {
            "100644" => Ok(EntryMode::File(FileMode::Regular)),
            "100755" => Ok(EntryMode::File(FileMode::Executable)),
            "120000" => Ok(EntryMode::File(FileMode::Symlink)),
            "40000" | "040000" => Ok(EntryMode::Directory),
            other => Err(GitError::Corrupt(format!("tree entry mode {other:?}")).into()),
        }
    }
}

impl TryFrom<u32> for EntryMode {
    type Error = anyhow::Error;

    fn try_from(mode: u32) -> anyhow::Result<Self> {
        match mode {
            0o100644 => Ok(EntryMode::File(FileMode::Regular)),
            0o100755 => Ok(EntryMode::File(FileMode::Executable)),
            0o120000 => Ok(EntryMode::File(FileMode::Symlink)),
            0o40000 => Ok(EntryMode::Directory),
            other => Err(GitError::Corrupt(format!("entry mode {other:o}")).into()),
        }
    }
}

impl From<FileMode> for EntryMode {
    fn from(mode: FileMode) -> Self {
        EntryMode::File(mode)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use rstest::rstest;

    #[rstest]
    #[case(EntryMode::File(FileMode::Regular), "100644", 0o100644)]
    #[case(EntryMode::File(FileMode::Executable), "100755", 0o100755)]
    #[case(EntryMode::File(FileMode::Symlink), "120000", 0o120000)]
    #[case(EntryMode::Directory, "40000", 0o40000)]
    fn canonical_forms(#[case] mode: EntryMode, #[case] text: &str, #[case] bits: u32) {
        assert_eq!(mode.as_str(), text);
        assert_eq!(mode.as_u32(), bits);
        assert_eq!(EntryMode::from_octal_str(text).unwrap(), mode);
        assert_eq!(EntryMode::try_from(bits).unwrap(), mode);
    }

    #[test]
    fn directory_display_form_is_padded() {
        assert_eq!(EntryMode::Directory.as_display_str(), "040000");
        assert_eq!(EntryMode::File(FileMode::Regular).as_display_str(), "100644");
    }

    #[test]
    fn unknown_modes_are_corrupt() {
        assert!(EntryMode::from_octal_str("100600").is_err());
        assert!(EntryMode::try_from(0o160000).is_err());
    }
}
