//! Checksummed index I/O
//!
//! Wraps a locked index file handle and feeds every byte that passes
//! through it into a running SHA-1, so the trailing checksum can be
//! written after the last entry and verified after the last read. A
//! half-written index fails verification and is rejected.

use crate::artifacts::core::GitError;
use crate::artifacts::index::CHECKSUM_SIZE;
use bytes::Bytes;
use file_guard::FileGuard;
use sha1::{Digest, Sha1};
use std::io::{Read, Write};
use std::ops::DerefMut;

#[derive(Debug)]
pub struct Checksum<'f> {
    file: FileGuard<&'f mut std::fs::File>,
    digest: Sha1,
}

impl<'f> Checksum<'f> {
    pub(crate) fn new(file: FileGuard<&'f mut std::fs::File>) -> Self {
        Checksum {
            file,
            digest: Sha1::new(),
        }
    }

    pub(crate) fn read(&mut self, size: usize) -> anyhow::Result<Bytes> {
        let mut buffer = vec![0; size];
        self.file
            .deref_mut()
            .read_exact(&mut buffer)
            .map_err(|_| GitError::Corrupt("index: unexpected end of file".to_string()))?;

        self.digest.update(&buffer);
        Ok(Bytes::from(buffer))
    }

    pub(crate) fn write(&mut self, data: &[u8]) -> anyhow::Result<()> {
        self.file.deref_mut().write_all(data)?;
        self.digest.update(data);
        Ok(())
    }

    /// Append the SHA-1 of everything written so far; called last so a
    /// torn write never carries a valid checksum.
    pub(crate) fn write_checksum(&mut self) -> anyhow::Result<()> {
        let checksum = self.digest.clone().finalize();
        self.file.deref_mut().write_all(checksum.as_slice())?;

        Ok(())
    }

    /// Compare the trailing 20 bytes against the SHA-1 of everything read
    /// so far.
    pub(crate) fn verify(&mut self) -> anyhow::Result<()> {
        let mut expected = [0u8; CHECKSUM_SIZE];
        self.file
            .deref_mut()
            .read_exact(&mut expected)
            .map_err(|_| GitError::Corrupt("index: missing checksum".to_string()))?;

        let actual = self.digest.clone().finalize();

        if expected != actual.as_slice() {
            return Err(GitError::Corrupt("index: checksum mismatch".to_string()).into());
        }

        // anything after the checksum is garbage
        let mut trailing = [0u8; 1];
        if self.file.deref_mut().read(&mut trailing)? != 0 {
            return Err(GitError::Corrupt("index: trailing data after checksum".to_string()).into());
        }

        Ok(())
    }
}
