//! Commit object
//!
//! A commit is a KVLM: a `tree` header, zero or more `parent` headers
//! (several parents mean a merge), `author`/`committer` identity lines,
//! and the commit message. Serialization emits the commit canonical
//! header order.

use crate::artifacts::objects::kvlm::{COMMIT_HEADER_ORDER, Kvlm};
use crate::artifacts::objects::object::{Object, Packable, Unpackable};
use crate::artifacts::objects::object_id::ObjectId;
use crate::artifacts::objects::object_type::ObjectType;
use crate::errors::GitError;
use bytes::Bytes;
use std::io::BufRead;

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Commit {
    kvlm: Kvlm,
}

impl Commit {
    /// Assemble a commit from its parts.
    ///
    /// The same identity line serves as author and committer, as the
    /// commit command produces both from one configuration.
    pub fn new(
        tree: &ObjectId,
        parents: &[ObjectId],
        identity_line: String,
        message: String,
    ) -> Self {
        let mut kvlm = Kvlm::default();
        kvlm.push("tree", tree.to_string());
        for parent in parents {
            kvlm.push("parent", parent.to_string());
        }
        kvlm.push("author", identity_line.clone());
        kvlm.push("committer", identity_line);
        kvlm.set_message(message);

        Commit { kvlm }
    }

    pub fn kvlm(&self) -> &Kvlm {
        &self.kvlm
    }

    /// The `tree` header. Mandatory: its absence is a malformed commit.
    pub fn tree_oid(&self) -> anyhow::Result<ObjectId> {
        let tree = self
            .kvlm
            .first("tree")
            .ok_or_else(|| GitError::Malformed("commit without tree header".into()))?;
        ObjectId::try_parse(tree.to_string())
    }

    pub fn parents(&self) -> anyhow::Result<Vec<ObjectId>> {
        self.kvlm
            .get("parent")
            .unwrap_or_default()
            .iter()
            .map(|parent| ObjectId::try_parse(parent.trim().to_string()))
            .collect()
    }

    pub fn message(&self) -> &str {
        self.kvlm.message()
    }

    /// First line of the message, for one-line displays.
    pub fn short_message(&self) -> &str {
        self.kvlm.message().lines().next().unwrap_or("")
    }
}

impl Packable for Commit {
    fn serialize(&self) -> anyhow::Result<Bytes> {
        Ok(self.kvlm.serialize(COMMIT_HEADER_ORDER))
    }
}

impl Unpackable for Commit {
    fn deserialize(mut reader: impl BufRead) -> anyhow::Result<Self> {
        let mut raw = Vec::new();
        reader.read_to_end(&mut raw)?;
        Ok(Commit {
            kvlm: Kvlm::parse(&raw)?,
        })
    }
}

impl Object for Commit {
    fn object_type(&self) -> ObjectType {
        ObjectType::Commit
    }

    fn display(&self) -> String {
        String::from_utf8_lossy(&self.kvlm.serialize(COMMIT_HEADER_ORDER)).into_owned()
    }
}
