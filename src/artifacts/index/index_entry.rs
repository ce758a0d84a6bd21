//! Index entry codec
//!
//! Each entry is a 62-byte fixed block (stat metadata, object id, flags),
//! the NUL-terminated path, and zero padding to the next 8-byte boundary.
//! The flags word encodes the name length in its low 12 bits (clamped to
//! 0xFFF); the top 4 bits (assume-valid, extended, two stage bits) are
//! carried through verbatim.

use crate::artifacts::index::entry_mode::EntryMode;
use crate::artifacts::objects::object_id::ObjectId;
use byteorder::{ByteOrder, WriteBytesExt};
use bytes::Bytes;
use derive_new::new;
use is_executable::IsExecutable;
use std::fs::Metadata;
use std::io::Write;
use std::os::unix::prelude::MetadataExt;
use std::path::{Path, PathBuf};

/// Fixed-size prefix of an entry, before the name.
pub const ENTRY_FIXED_SIZE: usize = 62;

/// Entries are padded to multiples of this block size.
pub const ENTRY_BLOCK: usize = 8;

/// Smallest possible on-disk entry (one-character name, padded).
pub const ENTRY_MIN_SIZE: usize = 64;

/// Low-12-bit cap on the name length stored in flags.
pub const MAX_NAME_FLAG: usize = 0xFFF;

/// A tracked file: path, content hash, and stat metadata.
#[derive(Debug, Clone, Default, PartialEq, Eq, new)]
pub struct IndexEntry {
    /// Path relative to the repository root
    pub name: PathBuf,
    /// Hash of the staged content
    pub oid: ObjectId,
    pub metadata: EntryMetadata,
}

impl IndexEntry {
    /// Index key: the path as stored on disk, compared bytewise.
    pub fn key(&self) -> String {
        self.name.to_string_lossy().into_owned()
    }

    pub fn basename(&self) -> anyhow::Result<&str> {
        self.name
            .file_name()
            .and_then(|name| name.to_str())
            .ok_or_else(|| anyhow::anyhow!("invalid entry name"))
    }

    /// The directory holding this entry, `""` for the root.
    pub fn parent_dir(&self) -> String {
        self.name
            .parent()
            .map(|p| p.to_string_lossy().into_owned())
            .unwrap_or_default()
    }

    /// On-disk length of this entry including padding.
    pub fn padded_len(&self) -> usize {
        let unpadded = ENTRY_FIXED_SIZE + self.key().len() + 1;
        unpadded + (ENTRY_BLOCK - (unpadded % ENTRY_BLOCK)) % ENTRY_BLOCK
    }

    pub fn serialize(&self) -> anyhow::Result<Bytes> {
        let name = self.key();

        let mut bytes = Vec::with_capacity(self.padded_len());
        bytes.write_u32::<byteorder::NetworkEndian>(self.metadata.ctime)?;
        bytes.write_u32::<byteorder::NetworkEndian>(self.metadata.ctime_nsec)?;
        bytes.write_u32::<byteorder::NetworkEndian>(self.metadata.mtime)?;
        bytes.write_u32::<byteorder::NetworkEndian>(self.metadata.mtime_nsec)?;
        bytes.write_u32::<byteorder::NetworkEndian>(self.metadata.dev)?;
        bytes.write_u32::<byteorder::NetworkEndian>(self.metadata.ino)?;
        bytes.write_u32::<byteorder::NetworkEndian>(self.metadata.mode.as_u32())?;
        bytes.write_u32::<byteorder::NetworkEndian>(self.metadata.uid)?;
        bytes.write_u32::<byteorder::NetworkEndian>(self.metadata.gid)?;
        bytes.write_u32::<byteorder::NetworkEndian>(self.metadata.size)?;
        self.oid.write_raw_to(&mut bytes)?;

        // low 12 bits: clamped name length; top 4 bits: preserved verbatim
        let flags = (self.metadata.flags & 0xF000) | name.len().min(MAX_NAME_FLAG) as u16;
        bytes.write_u16::<byteorder::NetworkEndian>(flags)?;

        bytes.write_all(name.as_bytes())?;
        bytes.push(0);
        while bytes.len() % ENTRY_BLOCK != 0 {
            bytes.push(0);
        }

        Ok(Bytes::from(bytes))
    }

    /// Decode one entry from its padded on-disk block.
    pub fn deserialize(bytes: &[u8]) -> anyhow::Result<Self> {
        if bytes.len() < ENTRY_MIN_SIZE {
            return Err(anyhow::anyhow!("invalid index entry size"));
        }

        let ctime = byteorder::NetworkEndian::read_u32(&bytes[0..4]);
        let ctime_nsec = byteorder::NetworkEndian::read_u32(&bytes[4..8]);
        let mtime = byteorder::NetworkEndian::read_u32(&bytes[8..12]);
        let mtime_nsec = byteorder::NetworkEndian::read_u32(&bytes[12..16]);
        let dev = byteorder::NetworkEndian::read_u32(&bytes[16..20]);
        let ino = byteorder::NetworkEndian::read_u32(&bytes[20..24]);
        let mode = EntryMode::try_from(byteorder::NetworkEndian::read_u32(&bytes[24..28]))?;
        let uid = byteorder::NetworkEndian::read_u32(&bytes[28..32]);
        let gid = byteorder::NetworkEndian::read_u32(&bytes[32..36]);
        let size = byteorder::NetworkEndian::read_u32(&bytes[36..40]);
        let oid = ObjectId::read_raw_from(&mut &bytes[40..60])?;
        let flags = byteorder::NetworkEndian::read_u16(&bytes[60..62]);

        let name_end = bytes[ENTRY_FIXED_SIZE..]
            .iter()
            .position(|&b| b == 0)
            .ok_or_else(|| anyhow::anyhow!("missing NUL terminator in entry name"))?;
        let name_bytes = &bytes[ENTRY_FIXED_SIZE..ENTRY_FIXED_SIZE + name_end];
        let name = PathBuf::from(
            std::str::from_utf8(name_bytes)
                .map_err(|_| anyhow::anyhow!("invalid utf-8 in entry name"))?,
        );

        Ok(IndexEntry {
            name,
            oid,
            metadata: EntryMetadata {
                ctime,
                ctime_nsec,
                mtime,
                mtime_nsec,
                dev,
                ino,
                mode,
                uid,
                gid,
                size,
                flags,
            },
        })
    }
}

impl PartialOrd for IndexEntry {
    fn partial_cmp(&self, other: &Self) -> Option<std::cmp::Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for IndexEntry {
    fn cmp(&self, other: &Self) -> std::cmp::Ordering {
        self.key().cmp(&other.key())
    }
}

/// Stat metadata captured when a file is staged.
///
/// Lets change detection compare timestamps before falling back to a
/// content hash. Values are truncated to 32 bits, as the on-disk format
/// stores them.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct EntryMetadata {
    pub ctime: u32,
    pub ctime_nsec: u32,
    pub mtime: u32,
    pub mtime_nsec: u32,
    pub dev: u32,
    pub ino: u32,
    pub mode: EntryMode,
    pub uid: u32,
    pub gid: u32,
    pub size: u32,
    /// assume-valid / extended / stage bits; low 12 bits rewritten on write
    pub flags: u16,
}

impl TryFrom<(&Path, Metadata)> for EntryMetadata {
    type Error = anyhow::Error;

    fn try_from((file_path, metadata): (&Path, Metadata)) -> Result<Self, Self::Error> {
        let mode = if file_path.is_executable() {
            EntryMode::Executable
        } else {
            EntryMode::Regular
        };

        Ok(Self {
            ctime: metadata.ctime() as u32,
            ctime_nsec: metadata.ctime_nsec() as u32,
            mtime: metadata.mtime() as u32,
            mtime_nsec: metadata.mtime_nsec() as u32,
            dev: metadata.dev() as u32,
            ino: metadata.ino() as u32,
            mode,
            uid: metadata.uid(),
            gid: metadata.gid(),
            size: metadata.size() as u32,
            flags: 0,
        })
    }
}
