//! File modes recorded in index entries
//!
//! Four modes can appear in an index: regular files, executables,
//! symlinks, and gitlinks (submodule commits). `add` only ever produces
//! the first two; the others survive a read-modify-write of an index
//! written by the reference system.

use crate::errors::GitError;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord)]
pub enum EntryMode {
    #[default]
    Regular,
    Executable,
    Symlink,
    Gitlink,
}

impl EntryMode {
    pub fn as_u32(&self) -> u32 {
        match self {
            EntryMode::Regular => 0o100644,
            EntryMode::Executable => 0o100755,
            EntryMode::Symlink => 0o120000,
            EntryMode::Gitlink => 0o160000,
        }
    }

    /// The octal string this mode carries inside a tree record.
    pub fn as_tree_mode(&self) -> String {
        format!("{:o}", self.as_u32())
    }
}

impl TryFrom<u32> for EntryMode {
    type Error = anyhow::Error;

    fn try_from(mode: u32) -> anyhow::Result<Self> {
        match mode {
            0o100644 => Ok(EntryMode::Regular),
            0o100755 => Ok(EntryMode::Executable),
            0o120000 => Ok(EntryMode::Symlink),
            0o160000 => Ok(EntryMode::Gitlink),
            other => Err(GitError::Malformed(format!("index entry mode {other:o}")).into()),
        }
    }
}
