//! Working-tree access
//!
//! File listing, raw reads, and stat capture for the directory the
//! repository tracks. Everything under the metadata directory is
//! invisible here.

use crate::areas::repository::GIT_DIR;
use crate::artifacts::index::index_entry::EntryMetadata;
use anyhow::Context;
use bytes::Bytes;
use std::path::{Path, PathBuf};
use walkdir::WalkDir;

#[derive(Debug)]
pub struct Workspace {
    path: Box<Path>,
}

impl Workspace {
    pub fn new(path: Box<Path>) -> Self {
        Workspace { path }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// All files under `start` (default: the whole worktree), as paths
    /// relative to the worktree root, metadata directory excluded.
    pub fn list_files(&self, start: Option<&Path>) -> anyhow::Result<Vec<PathBuf>> {
        let start = match start {
            Some(p) if p.is_absolute() => p.to_path_buf(),
            Some(p) => self.path.join(p),
            None => self.path.to_path_buf(),
        };

        if start.is_file() {
            return Ok(vec![self.relativize(&start)?]);
        }
        if !start.is_dir() {
            anyhow::bail!("pathspec {} did not match any files", start.display());
        }

        let mut files = Vec::new();
        for entry in WalkDir::new(&start)
            .sort_by_file_name()
            .into_iter()
            .filter_entry(|e| e.file_name() != std::ffi::OsStr::new(GIT_DIR))
        {
            let entry = entry?;
            if entry.file_type().is_file() {
                files.push(self.relativize(entry.path())?);
            }
        }

        Ok(files)
    }

    pub fn file_exists(&self, relative: &Path) -> bool {
        self.path.join(relative).is_file()
    }

    /// Raw bytes of a tracked file.
    pub fn read_file(&self, relative: &Path) -> anyhow::Result<Bytes> {
        let full = self.path.join(relative);
        let content = std::fs::read(&full)
            .with_context(|| format!("unable to read {}", full.display()))?;
        Ok(Bytes::from(content))
    }

    /// Stat a file into the metadata an index entry records.
    pub fn stat_file(&self, relative: &Path) -> anyhow::Result<EntryMetadata> {
        let full = self.path.join(relative);
        let metadata = std::fs::metadata(&full)
            .with_context(|| format!("unable to stat {}", full.display()))?;

        (full.as_path(), metadata).try_into()
    }

    fn relativize(&self, path: &Path) -> anyhow::Result<PathBuf> {
        path.strip_prefix(self.path.as_ref())
            .map(Path::to_path_buf)
            .with_context(|| format!("{} is outside the worktree", path.display()))
    }
}
