//! Index file format (version 2)
//!
//! The index (staging area) records what the next commit will contain.
//!
//! ## File layout
//!
//! ```text
//! Header (12 bytes):
//!   - Signature: "DIRC"
//!   - Version: 2
//!   - Entry count
//!
//! Entries (variable length, ascending by name):
//!   - 62 fixed bytes, NUL-terminated name, zero padding to 8 bytes
//!
//! Trailer (20 bytes):
//!   - SHA-1 of everything before it
//! ```

pub mod checksum;
pub mod entry_mode;
pub mod index_entry;
pub mod index_header;

/// Size of the SHA-1 trailer in bytes
pub const CHECKSUM_SIZE: usize = 20;

/// Size of the index header in bytes
pub const HEADER_SIZE: usize = 12;

/// Magic signature identifying index files
pub const SIGNATURE: &str = "DIRC";

/// The only supported index format version
pub const VERSION: u32 = 2;
