use crate::areas::repository::Repository;
use std::path::Path;

impl Repository {
    /// Unstage paths by dropping their index entries. A directory path
    /// drops everything underneath it.
    pub fn reset(&self, paths: &[String]) -> anyhow::Result<()> {
        let mut index = self.index();
        index.rehydrate()?;

        for path in paths {
            for tracked in index.entries_under_path(Path::new(path)) {
                index.remove(&tracked);
            }
        }

        index.write_updates()
    }
}
