//! Tree construction from the flat index
//!
//! A commit needs the nested tree DAG, but the index is a flat list of
//! paths. Entries are grouped by parent directory and the directories
//! are materialised deepest-first, so every subtree's ID exists before
//! the tree that references it. Publication order holds: all trees are
//! stored before the caller writes the commit that names the root.

use crate::areas::database::Database;
use crate::artifacts::index::index_entry::IndexEntry;
use crate::artifacts::objects::object_id::ObjectId;
use crate::artifacts::objects::tree::{TREE_MODE, Tree, TreeLeaf};
use anyhow::Context;
use std::collections::BTreeMap;
use std::path::Path;

/// Build and persist the tree hierarchy for `entries`, returning the
/// root tree's ID. An empty index produces the empty tree.
pub fn build_tree(database: &Database, entries: &[IndexEntry]) -> anyhow::Result<ObjectId> {
    // group leaves by their parent directory, root keyed by ""
    let mut dir_leaves: BTreeMap<String, Vec<TreeLeaf>> = BTreeMap::new();
    dir_leaves.entry(String::new()).or_default();

    for entry in entries {
        let leaf = TreeLeaf::new(
            entry.metadata.mode.as_tree_mode(),
            entry.basename()?.to_string(),
            entry.oid.clone(),
        );
        dir_leaves.entry(entry.parent_dir()).or_default().push(leaf);

        // make sure intermediate directories exist even when they hold
        // no direct file entries
        let mut dir = entry.parent_dir();
        while !dir.is_empty() {
            dir_leaves.entry(dir.clone()).or_default();
            dir = parent_of(&dir);
        }
    }

    // deepest directories first, so subtree ids exist before their parents
    let mut dirs: Vec<String> = dir_leaves.keys().cloned().collect();
    dirs.sort_by_key(|dir| std::cmp::Reverse(dir.len()));

    let mut built: BTreeMap<String, ObjectId> = BTreeMap::new();

    for dir in dirs {
        let mut tree = Tree::new(dir_leaves.remove(&dir).unwrap_or_default());

        for (subdir, oid) in &built {
            if parent_of(subdir) == dir && !subdir.is_empty() {
                let name = Path::new(subdir)
                    .file_name()
                    .and_then(|n| n.to_str())
                    .context("invalid directory name in index")?;
                tree.push(TreeLeaf::new(
                    TREE_MODE.to_string(),
                    name.to_string(),
                    oid.clone(),
                ));
            }
        }

        let oid = database.store(&tree)?;
        built.insert(dir, oid);
    }

    built
        .remove("")
        .context("tree builder produced no root tree")
}

fn parent_of(dir: &str) -> String {
    Path::new(dir)
        .parent()
        .map(|p| p.to_string_lossy().into_owned())
        .unwrap_or_default()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::artifacts::index::index_entry::EntryMetadata;
    use crate::artifacts::objects::object::Object;
    use crate::artifacts::objects::tree::Tree;
    use pretty_assertions::assert_eq;
    use rstest::{fixture, rstest};
    use std::path::PathBuf;

    #[fixture]
    fn database() -> (assert_fs::TempDir, Database) {
        let dir = assert_fs::TempDir::new().unwrap();
        let database = Database::new(dir.path().join("objects").into_boxed_path());
        std::fs::create_dir_all(database.objects_path()).unwrap();
        (dir, database)
    }

    fn entry(name: &str) -> IndexEntry {
        let oid =
            ObjectId::try_parse("ce013625030ba8dba906f756967f9e9ca394464a".to_string()).unwrap();
        IndexEntry::new(PathBuf::from(name), oid, EntryMetadata::default())
    }

    #[rstest]
    fn empty_index_builds_the_empty_tree(database: (assert_fs::TempDir, Database)) {
        let (_guard, database) = database;

        let root = build_tree(&database, &[]).unwrap();

        assert_eq!(root.as_ref(), "4b825dc642cb6eb9a060e54bf8d69288fbee4904");
        assert!(database.load_tree(&root).unwrap().leaves().is_empty());
    }

    #[rstest]
    fn single_file_yields_single_leaf_root(database: (assert_fs::TempDir, Database)) {
        let (_guard, database) = database;

        let root = build_tree(&database, &[entry("a.txt")]).unwrap();
        let tree = database.load_tree(&root).unwrap();

        assert_eq!(tree.leaves().len(), 1);
        assert_eq!(tree.leaves()[0].name, "a.txt");
        assert_eq!(tree.leaves()[0].mode, "100644");
    }

    #[rstest]
    fn nested_paths_produce_nested_trees(database: (assert_fs::TempDir, Database)) {
        let (_guard, database) = database;

        let root = build_tree(
            &database,
            &[entry("1.txt"), entry("a/2.txt"), entry("a/b/3.txt")],
        )
        .unwrap();

        let root_tree = database.load_tree(&root).unwrap();
        let names: Vec<_> = root_tree.leaves().iter().map(|l| l.name.as_str()).collect();
        assert_eq!(names, vec!["1.txt", "a"]);

        let a_leaf = &root_tree.leaves()[1];
        assert_eq!(a_leaf.mode, TREE_MODE);

        let a_tree = database.load_tree(&a_leaf.oid).unwrap();
        let names: Vec<_> = a_tree.leaves().iter().map(|l| l.name.as_str()).collect();
        assert_eq!(names, vec!["2.txt", "b"]);

        let b_tree = database.load_tree(&a_tree.leaves()[1].oid).unwrap();
        assert_eq!(b_tree.leaves()[0].name, "3.txt");
    }

    #[rstest]
    fn root_oid_matches_hand_built_tree(database: (assert_fs::TempDir, Database)) {
        let (_guard, database) = database;

        let root = build_tree(&database, &[entry("a.txt")]).unwrap();

        let by_hand = Tree::new(vec![TreeLeaf::new(
            "100644".to_string(),
            "a.txt".to_string(),
            entry("a.txt").oid,
        )]);
        assert_eq!(root, by_hand.object_id().unwrap());
    }
}
