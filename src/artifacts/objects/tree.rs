//! Tree object
//!
//! A tree is one directory level of a snapshot: an ordered run of
//! `<mode> SP <name> NUL <20-byte oid>` records pointing at blobs,
//! subtrees, or (for gitlinks) commits. Canonical order sorts by name
//! with a `/` appended to subtree names, so `foo` the directory sorts
//! after `foo.c` the file, matching the reference system.

use crate::artifacts::objects::object::{Object, Packable, Unpackable};
use crate::artifacts::objects::object_id::ObjectId;
use crate::artifacts::objects::object_type::ObjectType;
use anyhow::Context;
use bytes::Bytes;
use derive_new::new;
use std::io::{BufRead, Write};

/// Mode string of a subtree record.
pub const TREE_MODE: &str = "040000";

/// Mode string of a gitlink (submodule commit) record.
pub const GITLINK_MODE: &str = "160000";

/// One record in a tree: mode, name, target.
#[derive(Debug, Clone, PartialEq, Eq, new)]
pub struct TreeLeaf {
    /// Variable-length ASCII octal mode (`100644`, `040000`, ...)
    pub mode: String,
    pub name: String,
    pub oid: ObjectId,
}

impl TreeLeaf {
    pub fn is_subtree(&self) -> bool {
        self.mode == TREE_MODE
    }

    /// Sort key: subtree names compare with a trailing slash.
    fn sort_key(&self) -> String {
        if self.is_subtree() {
            format!("{}/", self.name)
        } else {
            self.name.clone()
        }
    }

    /// Object kind a leaf mode points at, for `ls-tree` output.
    pub fn target_type(&self) -> anyhow::Result<ObjectType> {
        match self.mode.as_str() {
            TREE_MODE => Ok(ObjectType::Tree),
            "100644" | "100755" => Ok(ObjectType::Blob),
            "120000" => Ok(ObjectType::Blob), // symlink target path stored as a blob
            GITLINK_MODE => Ok(ObjectType::Commit),
            other => Err(anyhow::anyhow!("weird tree leaf mode {}", other)),
        }
    }
}

/// One directory level of a snapshot.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Tree {
    leaves: Vec<TreeLeaf>,
}

impl Tree {
    pub fn new(leaves: Vec<TreeLeaf>) -> Self {
        Tree { leaves }
    }

    pub fn leaves(&self) -> &[TreeLeaf] {
        &self.leaves
    }

    pub fn push(&mut self, leaf: TreeLeaf) {
        self.leaves.push(leaf);
    }
}

impl Packable for Tree {
    fn serialize(&self) -> anyhow::Result<Bytes> {
        let mut leaves = self.leaves.clone();
        leaves.sort_by(|a, b| a.sort_key().cmp(&b.sort_key()));

        let mut out = Vec::new();
        for leaf in &leaves {
            out.write_all(leaf.mode.as_bytes())?;
            out.push(b' ');
            out.write_all(leaf.name.as_bytes())?;
            out.push(0);
            leaf.oid.write_raw_to(&mut out)?;
        }

        Ok(Bytes::from(out))
    }
}

impl Unpackable for Tree {
    fn deserialize(mut reader: impl BufRead) -> anyhow::Result<Self> {
        let mut leaves = Vec::new();

        let mut mode_bytes = Vec::new();
        let mut name_bytes = Vec::new();

        loop {
            mode_bytes.clear();
            let n = reader.read_until(b' ', &mut mode_bytes)?;
            if n == 0 {
                break; // clean EOF: no more records
            }
            if mode_bytes.last() != Some(&b' ') {
                return Err(anyhow::anyhow!("unexpected EOF in tree leaf mode"));
            }
            mode_bytes.pop();
            let mode = std::str::from_utf8(&mode_bytes)
                .context("non-utf8 tree leaf mode")?
                .to_owned();

            name_bytes.clear();
            let n = reader.read_until(b'\0', &mut name_bytes)?;
            if n == 0 || name_bytes.last() != Some(&0) {
                return Err(anyhow::anyhow!("unexpected EOF in tree leaf name"));
            }
            name_bytes.pop();
            let name = std::str::from_utf8(&name_bytes)
                .context("non-utf8 tree leaf name")?
                .to_owned();

            let oid = ObjectId::read_raw_from(&mut reader)
                .context("unexpected EOF in tree leaf object id")?;

            leaves.push(TreeLeaf::new(mode, name, oid));
        }

        Ok(Tree { leaves })
    }
}

impl Object for Tree {
    fn object_type(&self) -> ObjectType {
        ObjectType::Tree
    }

    fn display(&self) -> String {
        self.leaves
            .iter()
            .map(|leaf| {
                format!(
                    "{} {} {}\t{}",
                    leaf.mode,
                    leaf.target_type()
                        .map(|t| t.as_str())
                        .unwrap_or("unknown"),
                    leaf.oid,
                    leaf.name
                )
            })
            .collect::<Vec<_>>()
            .join("\n")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use rstest::{fixture, rstest};

    #[fixture]
    fn oid() -> ObjectId {
        ObjectId::try_parse("ce013625030ba8dba906f756967f9e9ca394464a".to_string()).unwrap()
    }

    #[rstest]
    fn serializes_records_back_to_back(oid: ObjectId) {
        let tree = Tree::new(vec![TreeLeaf::new(
            "100644".to_string(),
            "a.txt".to_string(),
            oid.clone(),
        )]);

        let raw = tree.serialize().unwrap();

        let mut expected = b"100644 a.txt\0".to_vec();
        oid.write_raw_to(&mut expected).unwrap();
        assert_eq!(raw, Bytes::from(expected));
    }

    #[rstest]
    fn round_trips_structurally(oid: ObjectId) {
        let tree = Tree::new(vec![
            TreeLeaf::new("100644".to_string(), "a.txt".to_string(), oid.clone()),
            TreeLeaf::new(TREE_MODE.to_string(), "sub".to_string(), oid.clone()),
        ]);

        let raw = tree.serialize().unwrap();
        let back = Tree::deserialize(raw.as_ref()).unwrap();

        assert_eq!(back.leaves(), tree.leaves());
    }

    #[rstest]
    fn serialization_is_deterministic_across_insertion_orders(oid: ObjectId) {
        let forward = Tree::new(vec![
            TreeLeaf::new("100644".to_string(), "a".to_string(), oid.clone()),
            TreeLeaf::new("100644".to_string(), "b".to_string(), oid.clone()),
            TreeLeaf::new(TREE_MODE.to_string(), "c".to_string(), oid.clone()),
        ]);
        let backward = Tree::new(vec![
            TreeLeaf::new(TREE_MODE.to_string(), "c".to_string(), oid.clone()),
            TreeLeaf::new("100644".to_string(), "b".to_string(), oid.clone()),
            TreeLeaf::new("100644".to_string(), "a".to_string(), oid.clone()),
        ]);

        assert_eq!(forward.serialize().unwrap(), backward.serialize().unwrap());
    }

    #[rstest]
    fn subtrees_sort_with_trailing_slash(oid: ObjectId) {
        // "foo" the directory sorts after "foo.c" the file
        let tree = Tree::new(vec![
            TreeLeaf::new(TREE_MODE.to_string(), "foo".to_string(), oid.clone()),
            TreeLeaf::new("100644".to_string(), "foo.c".to_string(), oid.clone()),
        ]);

        let raw = tree.serialize().unwrap();
        let back = Tree::deserialize(raw.as_ref()).unwrap();

        assert_eq!(back.leaves()[0].name, "foo.c");
        assert_eq!(back.leaves()[1].name, "foo");
    }

    #[test]
    fn empty_tree_has_empty_payload_and_known_oid() {
        let tree = Tree::default();
        assert!(tree.serialize().unwrap().is_empty());
        assert_eq!(
            tree.object_id().unwrap().as_ref(),
            "4b825dc642cb6eb9a060e54bf8d69288fbee4904"
        );
    }

    #[rstest]
    fn truncated_record_is_an_error(oid: ObjectId) {
        let tree = Tree::new(vec![TreeLeaf::new(
            "100644".to_string(),
            "a.txt".to_string(),
            oid,
        )]);
        let raw = tree.serialize().unwrap();

        // chop off half the object id
        let truncated = &raw[..raw.len() - 10];
        assert!(Tree::deserialize(truncated).is_err());
    }
}
