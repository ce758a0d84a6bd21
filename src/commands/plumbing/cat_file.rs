use crate::areas::repository::Repository;
use crate::artifacts::objects::object_type::ObjectType;
use crate::artifacts::revision;
use std::io::Write;

impl Repository {
    /// Write an object's serialised payload to the output, dereferencing
    /// the name toward the requested kind.
    pub fn cat_file(&self, kind: &str, name: &str) -> anyhow::Result<()> {
        let expected = ObjectType::try_from(kind)?;
        let oid = revision::find_object(self, name, Some(expected), true)?;

        let object = self.database().load(&oid)?;
        let payload = object.as_object().serialize()?;

        self.writer().write_all(&payload)?;
        Ok(())
    }
}
