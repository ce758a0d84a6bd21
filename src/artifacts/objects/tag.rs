//! Annotated tag object
//!
//! Same KVLM shape as a commit, with the tag canonical header order:
//! `object`, `type`, `tag`, `tagger`, `gpgsig`. Lightweight tags are not
//! objects at all, just refs; this type only covers `tag -a`.

use crate::artifacts::objects::kvlm::{Kvlm, TAG_HEADER_ORDER};
use crate::artifacts::objects::object::{Object, Packable, Unpackable};
use crate::artifacts::objects::object_id::ObjectId;
use crate::artifacts::objects::object_type::ObjectType;
use crate::errors::GitError;
use bytes::Bytes;
use std::io::BufRead;

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Tag {
    kvlm: Kvlm,
}

impl Tag {
    pub fn annotate(
        target: &ObjectId,
        target_type: ObjectType,
        name: &str,
        tagger_line: String,
        message: String,
    ) -> Self {
        let mut kvlm = Kvlm::default();
        kvlm.push("object", target.to_string());
        kvlm.push("type", target_type.as_str().to_string());
        kvlm.push("tag", name.to_string());
        kvlm.push("tagger", tagger_line);
        kvlm.set_message(message);

        Tag { kvlm }
    }

    pub fn kvlm(&self) -> &Kvlm {
        &self.kvlm
    }

    /// The `object` header: what this tag points at.
    pub fn target_oid(&self) -> anyhow::Result<ObjectId> {
        let target = self
            .kvlm
            .first("object")
            .ok_or_else(|| GitError::Malformed("tag without object header".into()))?;
        ObjectId::try_parse(target.to_string())
    }

    pub fn tag_name(&self) -> Option<&str> {
        self.kvlm.first("tag")
    }
}

impl Packable for Tag {
    fn serialize(&self) -> anyhow::Result<Bytes> {
        Ok(self.kvlm.serialize(TAG_HEADER_ORDER))
    }
}

impl Unpackable for Tag {
    fn deserialize(mut reader: impl BufRead) -> anyhow::Result<Self> {
        let mut raw = Vec::new();
        reader.read_to_end(&mut raw)?;
        Ok(Tag {
            kvlm: Kvlm::parse(&raw)?,
        })
    }
}

impl Object for Tag {
    fn object_type(&self) -> ObjectType {
        ObjectType::Tag
    }

    fn display(&self) -> String {
        String::from_utf8_lossy(&self.kvlm.serialize(TAG_HEADER_ORDER)).into_owned()
    }
}
