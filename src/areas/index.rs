//! Staging area store
//!
//! Holds the in-memory index and its on-disk persistence. Entries stay
//! sorted and unique by path. Reads take a shared advisory lock and
//! verify the SHA-1 trailer; writes go to a temporary file that is
//! renamed over `index`, so a crashed writer leaves the old index intact.

use crate::artifacts::index::checksum::Checksum;
use crate::artifacts::index::index_entry::{ENTRY_BLOCK, ENTRY_MIN_SIZE, IndexEntry};
use crate::artifacts::index::index_header::IndexHeader;
use crate::artifacts::index::{HEADER_SIZE, SIGNATURE, VERSION};
use anyhow::{Context, anyhow};
use std::collections::BTreeMap;
use std::path::Path;

#[derive(Debug, Clone)]
pub struct Index {
    /// Path to the index file
    path: Box<Path>,
    /// Tracked entries, keyed and sorted by path bytes
    entries: BTreeMap<String, IndexEntry>,
    header: IndexHeader,
    /// Set when the in-memory state has diverged from disk
    changed: bool,
}

impl Index {
    pub fn new(path: Box<Path>) -> Self {
        Index {
            path,
            entries: BTreeMap::new(),
            header: IndexHeader::empty(),
            changed: false,
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn clear(&mut self) {
        self.entries.clear();
        self.header = IndexHeader::empty();
        self.changed = false;
    }

    /// Load the index from disk.
    ///
    /// A missing or empty file is a legal empty index. The trailer is
    /// verified; a mismatch is a hard error.
    pub fn rehydrate(&mut self) -> anyhow::Result<()> {
        self.clear();

        if !self.path.exists() {
            return Ok(());
        }

        let mut index_file = std::fs::OpenOptions::new().read(true).open(&self.path)?;
        if index_file.metadata()?.len() == 0 {
            return Ok(());
        }

        let mut lock = file_guard::lock(&mut index_file, file_guard::Lock::Shared, 0, 1)?;

        let mut reader = Checksum::new(&mut **lock);
        let entries_count = self.parse_header(&mut reader)?;
        self.parse_entries(entries_count, &mut reader)?;

        reader.verify()
    }

    fn parse_header(
        &mut self,
        reader: &mut Checksum<&mut std::fs::File>,
    ) -> anyhow::Result<u32> {
        let header_bytes = reader.read(HEADER_SIZE)?;
        let header = IndexHeader::deserialize(&header_bytes)?;

        if header.marker != SIGNATURE {
            return Err(anyhow!("invalid index file signature"));
        }
        if header.version != VERSION {
            return Err(anyhow!("unsupported index file version: {}", header.version));
        }

        let count = header.entries_count;
        self.header = header;
        Ok(count)
    }

    /// Read `count` entries, extending each by 8-byte blocks until its
    /// padding NUL shows up.
    fn parse_entries(
        &mut self,
        entries_count: u32,
        reader: &mut Checksum<&mut std::fs::File>,
    ) -> anyhow::Result<()> {
        for _ in 0..entries_count {
            let mut entry_bytes = reader.read(ENTRY_MIN_SIZE)?.to_vec();

            while entry_bytes[entry_bytes.len() - 1] != 0 {
                entry_bytes.extend_from_slice(&reader.read(ENTRY_BLOCK)?);
            }

            let entry = IndexEntry::deserialize(&entry_bytes)?;
            self.entries.insert(entry.key(), entry);
        }

        Ok(())
    }

    /// Upsert an entry; replaces any previous entry at the same path.
    pub fn add(&mut self, entry: IndexEntry) {
        self.entries.insert(entry.key(), entry);
        self.header.entries_count = self.entries.len() as u32;
        self.changed = true;
    }

    /// Drop the entry at `path`, if present.
    pub fn remove(&mut self, path: &str) -> Option<IndexEntry> {
        let removed = self.entries.remove(path);
        if removed.is_some() {
            self.header.entries_count = self.entries.len() as u32;
            self.changed = true;
        }
        removed
    }

    pub fn entry_by_path(&self, path: &str) -> Option<&IndexEntry> {
        self.entries.get(path)
    }

    pub fn is_tracked(&self, path: &str) -> bool {
        self.entries.contains_key(path)
    }

    /// Entries in ascending path order.
    pub fn entries(&self) -> impl Iterator<Item = &IndexEntry> {
        self.entries.values()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn version(&self) -> u32 {
        self.header.version
    }

    /// Persist the index: header, sorted entries, SHA-1 trailer, all
    /// written to a tempfile and renamed into place.
    pub fn write_updates(&mut self) -> anyhow::Result<()> {
        let index_dir = self
            .path
            .parent()
            .with_context(|| format!("invalid index path {}", self.path.display()))?;
        let mut temp = tempfile::NamedTempFile::new_in(index_dir)
            .context("unable to create temporary index file")?;

        {
            let mut writer = Checksum::new(temp.as_file_mut());

            self.header = IndexHeader::new(
                String::from(SIGNATURE),
                VERSION,
                self.entries.len() as u32,
            );
            writer.write(&self.header.serialize()?)?;

            for entry in self.entries.values() {
                writer.write(&entry.serialize()?)?;
            }

            writer.write_checksum()?;
        }

        temp.persist(&self.path)
            .with_context(|| format!("unable to persist index file {}", self.path.display()))?;
        self.changed = false;

        Ok(())
    }
}
