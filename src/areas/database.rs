//! Loose-object database
//!
//! Content-addressable storage for the four object kinds. An object is
//! framed as `<kind> <size>\0<payload>`, hashed with SHA-1, zlib
//! compressed, and stored at `objects/<first-2-hex>/<remaining-38>`.
//! Because the filename is the content hash, an existing file never needs
//! rewriting.

use crate::artifacts::objects::blob::Blob;
use crate::artifacts::objects::commit::Commit;
use crate::artifacts::objects::object::{Object, ObjectBox, Unpackable};
use crate::artifacts::objects::object_id::ObjectId;
use crate::artifacts::objects::object_type::ObjectType;
use crate::artifacts::objects::tag::Tag;
use crate::artifacts::objects::tree::Tree;
use crate::errors::GitError;
use anyhow::Context;
use bytes::Bytes;
use std::io::{Read, Write};
use std::path::Path;

#[derive(Debug)]
pub struct Database {
    /// Path to the objects directory
    path: Box<Path>,
}

impl Database {
    pub fn new(path: Box<Path>) -> Self {
        Database { path }
    }

    pub fn objects_path(&self) -> &Path {
        &self.path
    }

    /// Read an object and dispatch it to the right deserializer.
    pub fn load(&self, object_id: &ObjectId) -> anyhow::Result<ObjectBox> {
        let (object_type, payload) = self.load_raw(object_id)?;

        Ok(match object_type {
            ObjectType::Blob => ObjectBox::Blob(Box::new(Blob::deserialize(payload.as_ref())?)),
            ObjectType::Tree => ObjectBox::Tree(Box::new(Tree::deserialize(payload.as_ref())?)),
            ObjectType::Commit => {
                ObjectBox::Commit(Box::new(Commit::deserialize(payload.as_ref())?))
            }
            ObjectType::Tag => ObjectBox::Tag(Box::new(Tag::deserialize(payload.as_ref())?)),
        })
    }

    /// Read an object's kind and raw payload.
    ///
    /// Validates the frame: a space after the kind, a NUL after the
    /// declared size, and the size matching the payload length.
    pub fn load_raw(&self, object_id: &ObjectId) -> anyhow::Result<(ObjectType, Bytes)> {
        let object_path = self.path.join(object_id.to_path());
        let compressed = std::fs::read(&object_path)
            .with_context(|| format!("unable to read object file {}", object_path.display()))?;

        let raw = Self::decompress(&compressed)?;

        let space = raw
            .iter()
            .position(|&b| b == b' ')
            .ok_or_else(|| GitError::Malformed(format!("object {object_id}: missing space")))?;
        let nul = raw
            .iter()
            .position(|&b| b == 0)
            .ok_or_else(|| GitError::Malformed(format!("object {object_id}: missing NUL")))?;

        let kind = std::str::from_utf8(&raw[..space])
            .map_err(|_| GitError::Malformed(format!("object {object_id}: non-utf8 kind")))?;
        let object_type = ObjectType::try_from(kind)?;

        let declared_size: usize = std::str::from_utf8(&raw[space + 1..nul])
            .ok()
            .and_then(|s| s.parse().ok())
            .ok_or_else(|| GitError::Malformed(format!("object {object_id}: bad size field")))?;

        let payload = raw.slice(nul + 1..);
        if declared_size != payload.len() {
            return Err(GitError::Malformed(format!("object {object_id}: bad length")).into());
        }

        Ok((object_type, payload))
    }

    /// Load an object, requiring it to be a commit.
    pub fn load_commit(&self, object_id: &ObjectId) -> anyhow::Result<Commit> {
        match self.load(object_id)? {
            ObjectBox::Commit(commit) => Ok(*commit),
            other => Err(anyhow::anyhow!(
                "object {} is a {}, not a commit",
                object_id,
                other.object_type()
            )),
        }
    }

    /// Load an object, requiring it to be a tree.
    pub fn load_tree(&self, object_id: &ObjectId) -> anyhow::Result<Tree> {
        match self.load(object_id)? {
            ObjectBox::Tree(tree) => Ok(*tree),
            other => Err(anyhow::anyhow!(
                "object {} is a {}, not a tree",
                object_id,
                other.object_type()
            )),
        }
    }

    /// The kind of a stored object, without deserializing its payload.
    pub fn object_type_of(&self, object_id: &ObjectId) -> anyhow::Result<ObjectType> {
        let (object_type, _) = self.load_raw(object_id)?;
        Ok(object_type)
    }

    /// Persist an object, returning its ID.
    ///
    /// Content addressing makes this idempotent: if the file already
    /// exists its content is already correct, so the write is skipped.
    pub fn store(&self, object: &dyn Object) -> anyhow::Result<ObjectId> {
        let payload = object.serialize()?;
        let oid = object.object_id()?;

        let object_path = self.path.join(oid.to_path());
        if object_path.exists() {
            return Ok(oid);
        }

        let object_dir = object_path
            .parent()
            .with_context(|| format!("invalid object path {}", object_path.display()))?;
        std::fs::create_dir_all(object_dir)
            .with_context(|| format!("unable to create object directory {}", object_dir.display()))?;

        let mut framed = Vec::with_capacity(payload.len() + 32);
        framed.write_all(
            format!("{} {}\0", object.object_type().as_str(), payload.len()).as_bytes(),
        )?;
        framed.write_all(&payload)?;
        let compressed = Self::compress(&framed)?;

        let mut temp = tempfile::NamedTempFile::new_in(object_dir)
            .context("unable to create temporary object file")?;
        temp.write_all(&compressed)?;
        temp.persist(&object_path)
            .with_context(|| format!("unable to persist object file {}", object_path.display()))?;

        Ok(oid)
    }

    /// Hash a stream as an object of the given kind.
    ///
    /// Blobs are taken as-is; the structured kinds go through their codec
    /// so the stored form is canonical. With `database` absent only the
    /// ID is computed, nothing is persisted.
    pub fn hash(
        mut reader: impl Read,
        object_type: ObjectType,
        database: Option<&Database>,
    ) -> anyhow::Result<ObjectId> {
        let mut data = Vec::new();
        reader.read_to_end(&mut data)?;

        let object: Box<dyn Object> = match object_type {
            ObjectType::Blob => Box::new(Blob::new(Bytes::from(data))),
            ObjectType::Tree => Box::new(Tree::deserialize(data.as_slice())?),
            ObjectType::Commit => Box::new(Commit::deserialize(data.as_slice())?),
            ObjectType::Tag => Box::new(Tag::deserialize(data.as_slice())?),
        };

        match database {
            Some(database) => database.store(object.as_ref()),
            None => object.object_id(),
        }
    }

    /// All stored object IDs starting with `prefix` (lowercase hex).
    ///
    /// A prefix of at least two characters pins the fan-out directory, so
    /// only one directory is listed.
    pub fn find_by_prefix(&self, prefix: &str) -> anyhow::Result<Vec<ObjectId>> {
        let mut matches = Vec::new();
        if prefix.len() < 2 {
            return Ok(matches);
        }

        let dir_name = &prefix[..2];
        let file_prefix = &prefix[2..];
        let dir_path = self.path.join(dir_name);

        if dir_path.is_dir() {
            for entry in std::fs::read_dir(&dir_path)? {
                let entry = entry?;
                let file_name = entry.file_name();
                let file_name = file_name.to_string_lossy();

                if file_name.starts_with(file_prefix)
                    && let Ok(oid) = ObjectId::try_parse(format!("{dir_name}{file_name}"))
                {
                    matches.push(oid);
                }
            }
        }

        matches.sort();
        Ok(matches)
    }

    fn compress(data: &[u8]) -> anyhow::Result<Bytes> {
        let mut encoder =
            flate2::write::ZlibEncoder::new(Vec::new(), flate2::Compression::default());
        encoder
            .write_all(data)
            .context("unable to compress object content")?;

        encoder
            .finish()
            .map(Bytes::from)
            .context("unable to finish compressing object content")
    }

    fn decompress(data: &[u8]) -> anyhow::Result<Bytes> {
        let mut decoder = flate2::read::ZlibDecoder::new(data);
        let mut decompressed = Vec::new();
        decoder
            .read_to_end(&mut decompressed)
            .context("unable to decompress object content")?;

        Ok(Bytes::from(decompressed))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::artifacts::objects::object::Object;
    use pretty_assertions::assert_eq;
    use rstest::{fixture, rstest};

    #[fixture]
    fn database() -> (assert_fs::TempDir, Database) {
        let dir = assert_fs::TempDir::new().unwrap();
        let database = Database::new(dir.path().join("objects").into_boxed_path());
        std::fs::create_dir_all(database.objects_path()).unwrap();
        (dir, database)
    }

    #[rstest]
    fn store_then_load_round_trips_a_blob(database: (assert_fs::TempDir, Database)) {
        let (_guard, database) = database;
        let blob = Blob::new(Bytes::from_static(b"hello\n"));

        let oid = database.store(&blob).unwrap();
        assert_eq!(oid.as_ref(), "ce013625030ba8dba906f756967f9e9ca394464a");

        let ObjectBox::Blob(loaded) = database.load(&oid).unwrap() else {
            panic!("expected a blob back");
        };
        assert_eq!(loaded.content(), b"hello\n");
    }

    #[rstest]
    fn storing_twice_is_a_no_op(database: (assert_fs::TempDir, Database)) {
        let (_guard, database) = database;
        let blob = Blob::new(Bytes::from_static(b"hello\n"));

        let first = database.store(&blob).unwrap();
        let second = database.store(&blob).unwrap();
        assert_eq!(first, second);
    }

    #[rstest]
    fn hash_without_database_computes_but_does_not_persist(
        database: (assert_fs::TempDir, Database),
    ) {
        let (_guard, database) = database;

        let oid = Database::hash(&b"hello\n"[..], ObjectType::Blob, None).unwrap();
        assert_eq!(oid.as_ref(), "ce013625030ba8dba906f756967f9e9ca394464a");
        assert!(database.load_raw(&oid).is_err());
    }

    #[rstest]
    fn find_by_prefix_lists_the_fan_out_directory(database: (assert_fs::TempDir, Database)) {
        let (_guard, database) = database;
        let oid = database.store(&Blob::new(Bytes::from_static(b"hello\n"))).unwrap();

        let matches = database.find_by_prefix("ce01").unwrap();
        assert_eq!(matches, vec![oid]);

        assert!(database.find_by_prefix("ab12").unwrap().is_empty());
    }

    #[rstest]
    fn a_size_mismatch_is_malformed(database: (assert_fs::TempDir, Database)) {
        let (_guard, database) = database;
        let oid = database.store(&Blob::new(Bytes::from_static(b"hello\n"))).unwrap();

        // rewrite the object with a lying size field
        let object_path = database.objects_path().join(oid.to_path());
        let forged = Database::compress(b"blob 99\0hello\n").unwrap();
        std::fs::write(&object_path, &forged).unwrap();

        let err = database.load_raw(&oid).unwrap_err();
        assert!(matches!(
            err.downcast_ref::<GitError>(),
            Some(GitError::Malformed(_))
        ));
    }

    #[rstest]
    fn an_unknown_kind_in_the_header_is_rejected(database: (assert_fs::TempDir, Database)) {
        let (_guard, database) = database;
        let oid = database.store(&Blob::new(Bytes::from_static(b"hello\n"))).unwrap();

        let object_path = database.objects_path().join(oid.to_path());
        let forged = Database::compress(b"blobby 6\0hello\n").unwrap();
        std::fs::write(&object_path, &forged).unwrap();

        let err = database.load_raw(&oid).unwrap_err();
        assert!(matches!(
            err.downcast_ref::<GitError>(),
            Some(GitError::UnknownKind(_))
        ));
    }

    #[rstest]
    fn structured_kinds_are_canonicalised_by_hash(database: (assert_fs::TempDir, Database)) {
        let (_guard, database) = database;

        // headers arrive out of canonical order; hashing a commit runs
        // them through the codec first
        let scrambled = "committer c <c@d> 2 +0000\n\
                         tree 4b825dc642cb6eb9a060e54bf8d69288fbee4904\n\
                         author a <a@b> 1 +0000\n\nm\n";
        let oid = Database::hash(
            scrambled.as_bytes(),
            ObjectType::Commit,
            Some(&database),
        )
        .unwrap();

        let (_, payload) = database.load_raw(&oid).unwrap();
        assert!(payload.starts_with(b"tree "));
    }
}
