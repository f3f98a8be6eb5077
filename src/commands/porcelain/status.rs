use crate::areas::repository::Repository;

impl Repository {
    /// Classify every path across working tree, index, and HEAD, and
    /// print the report.
    pub fn status(&self) -> anyhow::Result<()> {
        let mut index = self.index();
        index.rehydrate()?;

        let report = self.status_view().collect(&index)?;
        report.render(&mut **self.writer())
    }
}
