use crate::areas::database::Database;
use crate::areas::repository::Repository;
use crate::artifacts::index::index_entry::IndexEntry;
use crate::artifacts::objects::object_type::ObjectType;
use std::path::Path;

impl Repository {
    /// Hash the given files as blobs, persist them, and upsert their
    /// index entries. Directories are expanded to the files below them.
    pub fn add(&self, paths: &[String]) -> anyhow::Result<()> {
        let mut index = self.index()?;

        for path in paths {
            for relative in self.workspace().list_files(Some(Path::new(path)))? {
                let content = self.workspace().read_file(&relative)?;
                let oid = Database::hash(
                    content.as_ref(),
                    ObjectType::Blob,
                    Some(self.database()),
                )?;

                let stat = self.workspace().stat_file(&relative)?;
                index.add(IndexEntry::new(relative, oid, stat));
            }
        }

        index.write_updates()
    }
}
