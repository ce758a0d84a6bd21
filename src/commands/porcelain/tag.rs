use crate::areas::repository::Repository;
use crate::artifacts::objects::tag::Tag;
use crate::artifacts::revision;

const TAG_MESSAGE: &str = "A tag generated by rit\n";

impl Repository {
    /// Without a name, list existing tags. With one, create a tag ref at
    /// `object`: lightweight by default, or an annotated tag object
    /// with `annotated`.
    pub fn tag(&self, name: Option<&str>, object: &str, annotated: bool) -> anyhow::Result<()> {
        let Some(name) = name else {
            let listing = self.refs().list(Some("refs/tags"))?;
            return self.print_ref_node(&listing, "tags", false);
        };

        let target = revision::find_object(self, object, None, true)?;

        if annotated {
            let target_type = self.database().object_type_of(&target)?;
            let (identity_name, email) = self.identity()?;
            let now = chrono::Local::now().fixed_offset();
            let tagger_line = format!(
                "{} <{}> {} {}",
                identity_name,
                email,
                now.timestamp(),
                now.format("%z")
            );

            let tag = Tag::annotate(
                &target,
                target_type,
                name,
                tagger_line,
                TAG_MESSAGE.to_string(),
            );
            let tag_oid = self.database().store(&tag)?;
            self.refs().create(&format!("refs/tags/{name}"), &tag_oid)
        } else {
            self.refs().create(&format!("refs/tags/{name}"), &target)
        }
    }
}
