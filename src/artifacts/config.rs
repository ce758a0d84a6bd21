//! INI-style configuration reader
//!
//! Covers exactly what the repository consults: `[section]` headers,
//! `key = value` lines, `#`/`;` comments. Keys used:
//! `core.repositoryformatversion`, `user.name`, `user.email`.

use anyhow::Context;
use std::collections::BTreeMap;
use std::path::Path;

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Config {
    sections: BTreeMap<String, BTreeMap<String, String>>,
}

impl Config {
    /// Parse config text. Unrecognised lines are skipped rather than
    /// rejected; the reference system's config carries much more than
    /// this core consults.
    pub fn parse(text: &str) -> Self {
        let mut sections: BTreeMap<String, BTreeMap<String, String>> = BTreeMap::new();
        let mut current: Option<String> = None;

        for line in text.lines() {
            let line = line.trim();
            if line.is_empty() || line.starts_with('#') || line.starts_with(';') {
                continue;
            }

            if line.starts_with('[') && line.ends_with(']') {
                let section = line[1..line.len() - 1].trim().to_string();
                sections.entry(section.clone()).or_default();
                current = Some(section);
                continue;
            }

            if let Some(section) = &current
                && let Some((key, value)) = line.split_once('=')
            {
                sections
                    .entry(section.clone())
                    .or_default()
                    .insert(key.trim().to_string(), value.trim().to_string());
            }
        }

        Config { sections }
    }

    /// Load a config file; `Ok(None)` when it does not exist.
    pub fn load(path: &Path) -> anyhow::Result<Option<Self>> {
        if !path.is_file() {
            return Ok(None);
        }
        let text = std::fs::read_to_string(path)
            .with_context(|| format!("unable to read config {}", path.display()))?;
        Ok(Some(Self::parse(&text)))
    }

    pub fn get(&self, section: &str, key: &str) -> Option<&str> {
        self.sections
            .get(section)
            .and_then(|kv| kv.get(key))
            .map(|v| v.as_str())
    }

    pub fn set(&mut self, section: &str, key: &str, value: &str) {
        self.sections
            .entry(section.to_string())
            .or_default()
            .insert(key.to_string(), value.to_string());
    }

    /// The config written into a freshly created repository.
    pub fn repository_default() -> Self {
        let mut config = Config::default();
        config.set("core", "repositoryformatversion", "0");
        config.set("core", "filemode", "false");
        config.set("core", "bare", "false");
        config
    }

    pub fn serialize(&self) -> String {
        let mut out = String::new();
        for (section, kv) in &self.sections {
            out.push_str(&format!("[{section}]\n"));
            for (key, value) in kv {
                out.push_str(&format!("\t{key} = {value}\n"));
            }
        }
        out
    }
}
