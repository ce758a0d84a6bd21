//! Reference store
//!
//! References are text files under the metadata directory holding either
//! a direct object ID (`<40-hex>\n`) or a symbolic pointer
//! (`ref: <path>\n`). `HEAD` is always a reference. Symbolic chains are
//! followed with a visited set, since hand-edited refs can cycle.

use crate::artifacts::objects::object_id::ObjectId;
use crate::errors::GitError;
use anyhow::Context;
use derive_new::new;
use std::collections::{BTreeMap, HashSet};
use std::io::Write;
use std::ops::DerefMut;
use std::path::Path;

/// Name of the HEAD reference
pub const HEAD_REF_NAME: &str = "HEAD";

const SYMREF_PREFIX: &str = "ref: ";
const BRANCH_REF_PREFIX: &str = "ref: refs/heads/";

/// A node in the reference namespace: either a resolved ref or a
/// directory of further refs.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RefNode {
    Direct(ObjectId),
    Group(BTreeMap<String, RefNode>),
}

#[derive(Debug, new)]
pub struct Refs {
    /// Path to the metadata directory
    path: Box<Path>,
}

impl Refs {
    /// Follow `name` to an object ID.
    ///
    /// A missing ref file resolves to `None`: a fresh `HEAD` points at a
    /// branch file that does not exist until the first commit.
    pub fn resolve(&self, name: &str) -> anyhow::Result<Option<ObjectId>> {
        let mut visited = HashSet::new();
        self.resolve_inner(name, &mut visited)
    }

    fn resolve_inner(
        &self,
        name: &str,
        visited: &mut HashSet<String>,
    ) -> anyhow::Result<Option<ObjectId>> {
        if !visited.insert(name.to_string()) {
            return Err(GitError::CircularRef(name.to_string()).into());
        }

        let ref_path = self.path.join(name);
        if !ref_path.is_file() {
            return Ok(None);
        }

        let content = std::fs::read_to_string(&ref_path)
            .with_context(|| format!("failed to read ref file at {}", ref_path.display()))?;
        let content = content.trim();

        if content.is_empty() {
            return Ok(None);
        }

        if let Some(target) = content.strip_prefix(SYMREF_PREFIX) {
            self.resolve_inner(target.trim(), visited)
        } else {
            Ok(Some(ObjectId::try_parse(content.to_string())?))
        }
    }

    /// Enumerate the reference namespace under `subpath` (default
    /// `refs`), sorted for deterministic output. Refs that resolve to
    /// nothing (dangling symrefs) are omitted.
    pub fn list(&self, subpath: Option<&str>) -> anyhow::Result<RefNode> {
        let subpath = subpath.unwrap_or("refs");
        self.list_dir(&self.path.join(subpath))
    }

    fn list_dir(&self, dir: &Path) -> anyhow::Result<RefNode> {
        let mut group = BTreeMap::new();

        let mut entries: Vec<_> = std::fs::read_dir(dir)
            .with_context(|| format!("failed to list refs under {}", dir.display()))?
            .collect::<Result<_, _>>()?;
        entries.sort_by_key(|entry| entry.file_name());

        for entry in entries {
            let name = entry.file_name().to_string_lossy().into_owned();
            let path = entry.path();

            if path.is_dir() {
                group.insert(name, self.list_dir(&path)?);
            } else {
                let relative = path
                    .strip_prefix(self.path.as_ref())
                    .context("ref file outside the metadata directory")?;
                if let Some(oid) = self.resolve(&relative.to_string_lossy())? {
                    group.insert(name, RefNode::Direct(oid));
                }
            }
        }

        Ok(RefNode::Group(group))
    }

    /// Write `<oid>\n` to `gitdir/<name>`, creating parent directories.
    pub fn create(&self, name: &str, oid: &ObjectId) -> anyhow::Result<()> {
        self.write_ref_file(name, format!("{oid}\n"))
    }

    /// Point `HEAD` (or the branch it designates) at a new commit.
    pub fn update_head(&self, oid: &ObjectId) -> anyhow::Result<()> {
        let (branch, detached) = self.active_branch()?;
        if detached {
            self.create(HEAD_REF_NAME, oid)
        } else {
            self.create(&format!("refs/heads/{branch}"), oid)
        }
    }

    /// Read `HEAD`: `(branch-name, false)` when on a branch,
    /// `(content, true)` when detached.
    pub fn active_branch(&self) -> anyhow::Result<(String, bool)> {
        let head_path = self.path.join(HEAD_REF_NAME);
        let content = std::fs::read_to_string(&head_path)
            .with_context(|| format!("failed to read {}", head_path.display()))?;
        let content = content.trim();

        match content.strip_prefix(BRANCH_REF_PREFIX) {
            Some(branch) => Ok((branch.to_string(), false)),
            None => Ok((content.to_string(), true)),
        }
    }

    fn write_ref_file(&self, name: &str, content: String) -> anyhow::Result<()> {
        let ref_path = self.path.join(name);

        std::fs::create_dir_all(ref_path.parent().with_context(|| {
            format!("no parent directory for ref file {}", ref_path.display())
        })?)?;

        let mut ref_file = std::fs::OpenOptions::new()
            .write(true)
            .create(true)
            .truncate(true)
            .open(&ref_path)
            .with_context(|| format!("failed to open ref file at {}", ref_path.display()))?;
        let mut lock = file_guard::lock(&mut ref_file, file_guard::Lock::Exclusive, 0, 1)?;
        lock.deref_mut().write_all(content.as_bytes())?;

        Ok(())
    }
}
