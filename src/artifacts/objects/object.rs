//! Core object traits
//!
//! - `Packable`: serialization to an object's canonical payload bytes
//! - `Unpackable`: deserialization from payload bytes
//! - `Object`: common operations (kind, ID computation, display)
//!
//! ## Framing
//!
//! `serialize()` yields the payload only. The database frames it as
//! `<kind> <size>\0<payload>`, hashes that, and zlib-compresses it into
//! `objects/`. Keeping the frame out of the codecs lets `cat-file` print
//! payloads verbatim and keeps hashing in one place.

use crate::artifacts::objects::blob::Blob;
use crate::artifacts::objects::commit::Commit;
use crate::artifacts::objects::object_id::ObjectId;
use crate::artifacts::objects::object_type::ObjectType;
use crate::artifacts::objects::tag::Tag;
use crate::artifacts::objects::tree::Tree;
use anyhow::Result;
use bytes::Bytes;
use sha1::{Digest, Sha1};
use std::io::BufRead;
use std::path::PathBuf;

/// Serialize an object to its canonical payload bytes.
pub trait Packable {
    fn serialize(&self) -> Result<Bytes>;
}

/// Deserialize an object from its payload bytes (header already consumed).
pub trait Unpackable {
    fn deserialize(reader: impl BufRead) -> Result<Self>
    where
        Self: Sized;
}

/// Common operations over the four object kinds.
pub trait Object: Packable {
    fn object_type(&self) -> ObjectType;

    /// Human-readable representation, as printed by the plumbing commands.
    fn display(&self) -> String;

    /// Compute the object ID: SHA-1 over `<kind> <size>\0<payload>`.
    fn object_id(&self) -> Result<ObjectId> {
        let payload = self.serialize()?;

        let mut hasher = Sha1::new();
        hasher.update(format!("{} {}\0", self.object_type().as_str(), payload.len()).as_bytes());
        hasher.update(&payload);

        let oid = hasher.finalize();
        ObjectId::try_parse(format!("{oid:x}"))
    }

    /// Fan-out path where this object would be stored.
    fn object_path(&self) -> Result<PathBuf> {
        Ok(self.object_id()?.to_path())
    }
}

/// Type-erased object container for when the kind is only known at runtime.
pub enum ObjectBox {
    Blob(Box<Blob>),
    Tree(Box<Tree>),
    Commit(Box<Commit>),
    Tag(Box<Tag>),
}

impl ObjectBox {
    pub fn object_type(&self) -> ObjectType {
        match self {
            ObjectBox::Blob(_) => ObjectType::Blob,
            ObjectBox::Tree(_) => ObjectType::Tree,
            ObjectBox::Commit(_) => ObjectType::Commit,
            ObjectBox::Tag(_) => ObjectType::Tag,
        }
    }

    pub fn as_object(&self) -> &dyn Object {
        match self {
            ObjectBox::Blob(blob) => blob.as_ref(),
            ObjectBox::Tree(tree) => tree.as_ref(),
            ObjectBox::Commit(commit) => commit.as_ref(),
            ObjectBox::Tag(tag) => tag.as_ref(),
        }
    }
}
