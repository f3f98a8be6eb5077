use crate::areas::repository::Repository;
use std::io::Write;

impl Repository {
    pub fn ls_files(&self, stage: bool) -> anyhow::Result<()> {
        let mut index = self.index();
        index.rehydrate()?;

        for entry in index.entries() {
            if stage {
                writeln!(
                    self.writer(),
                    "{} {} {}",
                    entry.metadata.mode.as_display_str(),
                    entry.oid,
                    entry.name.display()
                )?;
            } else {
                writeln!(self.writer(), "{}", entry.name.display())?;
            }
        }

        Ok(())
    }
}
