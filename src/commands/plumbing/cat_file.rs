use crate::areas::repository::Repository;
use crate::artifacts::objects::object::{Object, ObjectBox};
use crate::artifacts::objects::object_id::ObjectId;
use std::io::Write;

/// Which facet of the object to print
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CatFileMode {
    Type,
    Size,
    Pretty,
}

impl Repository {
    pub fn cat_file(&self, oid_hex: &str, mode: CatFileMode) -> anyhow::Result<()> {
        let object_id = ObjectId::try_parse(oid_hex.to_string())?;

        match mode {
            CatFileMode::Type => {
                let (object_type, _) = self.database().read_raw(&object_id)?;
                writeln!(self.writer(), "{object_type}")?;
            }
            CatFileMode::Size => {
                let (_, payload) = self.database().read_raw(&object_id)?;
                writeln!(self.writer(), "{}", payload.len())?;
            }
            CatFileMode::Pretty => match self.database().parse_object(&object_id)? {
                // blob content verbatim, not line-oriented
                ObjectBox::Blob(blob) => self.writer().write_all(blob.content())?,
                ObjectBox::Tree(tree) => writeln!(self.writer(), "{}", tree.display())?,
                ObjectBox::Commit(commit) => writeln!(self.writer(), "{}", commit.display())?,
            },
        }

        Ok(())
    }
}
