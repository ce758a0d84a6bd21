//! Name resolution
//!
//! Maps a user-supplied name (`HEAD`, a branch, a tag, a full or
//! abbreviated hash) to exactly one object ID, optionally following
//! tags and commits toward a desired kind. All candidate sources are
//! unioned before deciding: zero candidates is `NotFound`, more than one
//! distinct candidate is `Ambiguous`.

use crate::areas::repository::Repository;
use crate::artifacts::objects::object::ObjectBox;
use crate::artifacts::objects::object_id::ObjectId;
use crate::artifacts::objects::object_type::ObjectType;
use crate::errors::GitError;
use anyhow::Context;

const HASH_REGEX: &str = r"^[0-9a-fA-F]{4,40}$";

/// Resolve `name` to a single object ID.
///
/// With an `expected` kind, the candidate is dereferenced toward it:
/// an annotated tag jumps to its `object`, a commit jumps to its `tree`
/// when a tree is wanted. `follow = false` demands an exact kind match.
pub fn find_object(
    repository: &Repository,
    name: &str,
    expected: Option<ObjectType>,
    follow: bool,
) -> anyhow::Result<ObjectId> {
    let candidates = resolve_candidates(repository, name)?;

    let mut oid = match candidates.len() {
        0 => return Err(GitError::NotFound(name.to_string()).into()),
        1 => candidates.into_iter().next().expect("len checked"),
        _ => {
            return Err(GitError::Ambiguous {
                name: name.to_string(),
                candidates: candidates.iter().map(ObjectId::to_string).collect(),
            }
            .into());
        }
    };

    let Some(expected) = expected else {
        return Ok(oid);
    };

    loop {
        let object = repository.database().load(&oid)?;
        if object.object_type() == expected {
            return Ok(oid);
        }

        if !follow {
            return Err(GitError::NotFound(name.to_string()).into());
        }

        // tag->object chains are finite by construction; the
        // commit->tree jump can happen at most once
        oid = match object {
            ObjectBox::Tag(tag) => tag.target_oid()?,
            ObjectBox::Commit(commit) if expected == ObjectType::Tree => commit.tree_oid()?,
            _ => return Err(GitError::NotFound(name.to_string()).into()),
        };
    }
}

/// Flatten the tree a name resolves to into `path -> blob id`.
///
/// Subtrees are recursed with their directory prepended; non-tree leaves
/// (blobs, gitlinks) land in the map as-is.
pub fn tree_to_map(
    repository: &Repository,
    name: &str,
) -> anyhow::Result<std::collections::BTreeMap<String, ObjectId>> {
    let tree_oid = find_object(repository, name, Some(ObjectType::Tree), true)?;
    let mut map = std::collections::BTreeMap::new();
    flatten_tree(repository, &tree_oid, "", &mut map)?;
    Ok(map)
}

fn flatten_tree(
    repository: &Repository,
    tree_oid: &ObjectId,
    prefix: &str,
    map: &mut std::collections::BTreeMap<String, ObjectId>,
) -> anyhow::Result<()> {
    let tree = repository.database().load_tree(tree_oid)?;

    for leaf in tree.leaves() {
        let full_path = if prefix.is_empty() {
            leaf.name.clone()
        } else {
            format!("{prefix}/{}", leaf.name)
        };

        if leaf.is_subtree() {
            flatten_tree(repository, &leaf.oid, &full_path, map)?;
        } else {
            map.insert(full_path, leaf.oid.clone());
        }
    }

    Ok(())
}

/// Union every way `name` could designate an object.
fn resolve_candidates(
    repository: &Repository,
    name: &str,
) -> anyhow::Result<Vec<ObjectId>> {
    if name.is_empty() {
        return Ok(Vec::new());
    }

    if name == "HEAD" {
        return Ok(repository
            .refs()
            .resolve("HEAD")?
            .into_iter()
            .collect());
    }

    let mut candidates = Vec::new();

    let hash_re = regex::Regex::new(HASH_REGEX).context("invalid hash regex")?;
    if hash_re.is_match(name) {
        let prefix = name.to_ascii_lowercase();
        candidates.extend(repository.database().find_by_prefix(&prefix)?);
    }

    for namespace in ["refs/tags/", "refs/heads/"] {
        if let Some(oid) = repository.refs().resolve(&format!("{namespace}{name}"))? {
            candidates.push(oid);
        }
    }

    let mut unique = Vec::new();
    for candidate in candidates {
        if !unique.contains(&candidate) {
            unique.push(candidate);
        }
    }

    Ok(unique)
}
