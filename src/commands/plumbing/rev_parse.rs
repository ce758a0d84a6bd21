use crate::areas::repository::Repository;
use crate::artifacts::objects::object_type::ObjectType;
use crate::artifacts::revision;
use std::io::Write;

impl Repository {
    /// Print the object ID a name resolves to, optionally dereferencing
    /// toward an expected kind.
    pub fn rev_parse(&self, name: &str, kind: Option<&str>) -> anyhow::Result<()> {
        let expected = kind.map(ObjectType::try_from).transpose()?;
        let oid = revision::find_object(self, name, expected, true)?;

        writeln!(self.writer(), "{oid}")?;
        Ok(())
    }
}
