use crate::areas::repository::Repository;
use crate::artifacts::objects::object::Object;
use crate::artifacts::objects::object_id::ObjectId;
use std::io::Write;

impl Repository {
    pub fn ls_tree(&self, oid_hex: &str, name_only: bool) -> anyhow::Result<()> {
        let object_id = ObjectId::try_parse(oid_hex.to_string())?;
        let tree = self.database().parse_object_as_tree(&object_id)?;

        if name_only {
            for (name, _) in tree.entries() {
                writeln!(self.writer(), "{name}")?;
            }
        } else {
            writeln!(self.writer(), "{}", tree.display())?;
        }

        Ok(())
    }
}
