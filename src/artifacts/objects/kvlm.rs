//! Key-value list with message (KVLM)
//!
//! The shared wire format of commits and tags: a block of header lines,
//! one empty line, then a free-form message. A header line is either
//! `<key> <value>` or a continuation starting with a single space, which
//! extends the previous key's last value. A key may repeat (`parent` in
//! merge commits); values keep their occurrence order.
//!
//! Serialization is driven by a canonical key-order slice, so commits and
//! tags each get their own header order. Keys outside the slice are
//! dropped on output.

use crate::errors::GitError;
use anyhow::Context;
use bytes::Bytes;
use std::collections::BTreeMap;
use std::io::Write;

/// Canonical header order for commit objects.
pub const COMMIT_HEADER_ORDER: &[&str] = &["tree", "parent", "author", "committer", "gpgsig"];

/// Canonical header order for annotated tag objects.
pub const TAG_HEADER_ORDER: &[&str] = &["object", "type", "tag", "tagger", "gpgsig"];

/// Parsed key-value headers plus the trailing message.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Kvlm {
    headers: BTreeMap<String, Vec<String>>,
    message: String,
}

impl Kvlm {
    /// Parse the payload of a commit or tag.
    ///
    /// Headers end at the first empty line; everything after it is the
    /// message, verbatim. A continuation line is appended to the previous
    /// key's last value without its leading space. A continuation before
    /// any key is malformed, as is a header line without a space.
    pub fn parse(raw: &[u8]) -> anyhow::Result<Self> {
        let raw = std::str::from_utf8(raw).context("kvlm payload is not valid utf-8")?;

        // the header block ends at the first empty line; a payload that
        // opens with one has no headers at all
        let (header_block, message) = if let Some(rest) = raw.strip_prefix('\n') {
            ("", rest)
        } else if let Some(end) = raw.find("\n\n") {
            (&raw[..end], &raw[end + 2..])
        } else {
            (raw, "")
        };

        let mut headers: BTreeMap<String, Vec<String>> = BTreeMap::new();
        let mut last_key: Option<String> = None;

        for line in header_block.split('\n') {
            if line.is_empty() {
                continue;
            }

            if let Some(continuation) = line.strip_prefix(' ') {
                let key = last_key
                    .as_ref()
                    .ok_or_else(|| GitError::Malformed("kvlm: continuation with no key".into()))?;
                let values = headers.get_mut(key).expect("last_key is always inserted");
                values
                    .last_mut()
                    .expect("keys never have empty value lists")
                    .push_str(continuation);
            } else {
                let (key, value) = line
                    .split_once(' ')
                    .ok_or_else(|| GitError::Malformed("kvlm: header without space".into()))?;
                headers
                    .entry(key.to_string())
                    .or_default()
                    .push(value.to_string());
                last_key = Some(key.to_string());
            }
        }

        Ok(Kvlm {
            headers,
            message: message.to_string(),
        })
    }

    /// Serialize headers in the given canonical order, then the message.
    ///
    /// Multi-line values emit continuation lines (` <line>`). Keys absent
    /// from `order` are dropped.
    pub fn serialize(&self, order: &[&str]) -> Bytes {
        let mut out = Vec::new();

        for key in order {
            let Some(values) = self.headers.get(*key) else {
                continue;
            };
            for value in values {
                let mut lines = value.split('\n');
                // a value is never an empty list, but it may be an empty string
                let first = lines.next().unwrap_or("");
                let _ = writeln!(out, "{key} {first}");
                for line in lines {
                    let _ = writeln!(out, " {line}");
                }
            }
        }

        let _ = writeln!(out);
        let _ = write!(out, "{}", self.message);

        Bytes::from(out)
    }

    /// All values recorded for a key, in occurrence order.
    pub fn get(&self, key: &str) -> Option<&[String]> {
        self.headers.get(key).map(|values| values.as_slice())
    }

    /// The first value recorded for a key.
    pub fn first(&self, key: &str) -> Option<&str> {
        self.headers
            .get(key)
            .and_then(|values| values.first())
            .map(|value| value.as_str())
    }

    /// Append a value under a key, preserving occurrence order.
    pub fn push(&mut self, key: &str, value: String) {
        self.headers.entry(key.to_string()).or_default().push(value);
    }

    pub fn message(&self) -> &str {
        &self.message
    }

    pub fn set_message(&mut self, message: String) {
        self.message = message;
    }
}
