//! Digesting reader/writer for the index file
//!
//! Wraps the underlying file so every byte that passes through also feeds
//! a running SHA-1. On read, `verify` compares the digest against the
//! 20-byte trailer; on write, `write_checksum` appends it.

use crate::artifacts::index::CHECKSUM_SIZE;
use anyhow::anyhow;
use bytes::Bytes;
use sha1::{Digest, Sha1};
use std::io::{Read, Write};

#[derive(Debug)]
pub struct Checksum<F> {
    inner: F,
    digest: Sha1,
}

impl<F> Checksum<F> {
    pub fn new(inner: F) -> Self {
        Checksum {
            inner,
            digest: Sha1::new(),
        }
    }
}

impl<F: Read> Checksum<F> {
    pub fn read(&mut self, size: usize) -> anyhow::Result<Bytes> {
        let mut buffer = vec![0; size];
        self.inner
            .read_exact(&mut buffer)
            .map_err(|_| anyhow!("unexpected end-of-file while reading index"))?;

        self.digest.update(&buffer);
        Ok(Bytes::from(buffer))
    }

    /// Read the trailer and compare it against the running digest.
    pub fn verify(&mut self) -> anyhow::Result<()> {
        let mut expected = [0u8; CHECKSUM_SIZE];
        self.inner.read_exact(&mut expected)?;

        let actual = self.digest.clone().finalize();

        if expected != actual.as_slice() {
            return Err(anyhow!("index checksum does not match value stored on disk"));
        }

        Ok(())
    }
}

impl<F: Write> Checksum<F> {
    pub fn write(&mut self, data: &[u8]) -> anyhow::Result<()> {
        self.inner.write_all(data)?;
        self.digest.update(data);
        Ok(())
    }

    pub fn write_checksum(&mut self) -> anyhow::Result<()> {
        let checksum = self.digest.clone().finalize();
        self.inner
            .write_all(checksum.as_slice())
            .map_err(|_| anyhow!("failed to write index checksum"))?;

        Ok(())
    }
}
