use crate::areas::repository::Repository;
use crate::artifacts::index::index_entry::IndexEntry;
use std::path::Path;

impl Repository {
    /// Stage files: hash and store each one as a blob, then record it in
    /// the index with its current stat. `.` stages the whole working
    /// tree; paths that are missing or unreadable are skipped.
    pub fn add(&self, paths: &[String]) -> anyhow::Result<()> {
        let mut index = self.index();
        index.rehydrate()?;

        for path in paths {
            let root = if path == "." {
                None
            } else {
                Some(Path::new(path))
            };

            let files = match self.workspace().list_files(root) {
                Ok(files) => files,
                // a vanished path is not an error, it is just not staged
                Err(_) => continue,
            };

            for file in files {
                let Ok(blob) = self.workspace().parse_blob(&file) else {
                    continue;
                };

                let blob_oid = self.database().store(blob)?;
                let stat = self.workspace().stat_file(&file)?;

                index.add(IndexEntry::new(file, blob_oid, stat));
            }
        }

        index.write_updates()
    }
}
