//! Exclusion rules
//!
//! Collects ignore patterns from three places: the repository's
//! `info/exclude`, the user's global ignore file, and every `.gitignore`
//! staged in the index (scoped to its directory). Matching uses shell
//! globs; full gitignore semantics (`**`, directory anchoring) are out
//! of scope here.

use crate::areas::repository::Repository;
use crate::artifacts::objects::object::ObjectBox;
use anyhow::Context;
use std::collections::BTreeMap;
use std::path::Path;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IgnoreRule {
    pub pattern: String,
    pub negate: bool,
}

#[derive(Debug, Clone, Default)]
pub struct Ignore {
    /// Rules applying anywhere: info/exclude and the global ignore file
    absolute: Vec<IgnoreRule>,
    /// Rules from staged .gitignore files, keyed by their directory
    scoped: BTreeMap<String, Vec<IgnoreRule>>,
}

/// Parse one ignore file: comments and blanks skipped, `!` negates,
/// a leading `\` escapes a literal `!` or `#`.
pub fn parse_rules(text: &str) -> Vec<IgnoreRule> {
    let mut rules = Vec::new();

    for line in text.lines() {
        let line = line.trim();
        if line.is_empty() || line.starts_with('#') {
            continue;
        }

        let (line, negate) = match line.strip_prefix('!') {
            Some(rest) => (rest, true),
            None => (line, false),
        };
        let line = line.strip_prefix('\\').unwrap_or(line);

        rules.push(IgnoreRule {
            pattern: line.to_string(),
            negate,
        });
    }

    rules
}

impl Ignore {
    /// Gather every rule source visible to the repository.
    pub fn read(repository: &Repository) -> anyhow::Result<Self> {
        let mut ignore = Ignore::default();

        let exclude_path = repository.git_path(&["info", "exclude"]);
        if let Ok(text) = std::fs::read_to_string(&exclude_path) {
            ignore.absolute.extend(parse_rules(&text));
        }

        if let Ok(home) = std::env::var("HOME") {
            let global_path = Path::new(&home).join(".config/git/ignore");
            if let Ok(text) = std::fs::read_to_string(&global_path) {
                ignore.absolute.extend(parse_rules(&text));
            }
        }

        let index = repository.index()?;
        for entry in index.entries() {
            if entry.name.file_name() == Some(std::ffi::OsStr::new(".gitignore")) {
                let ObjectBox::Blob(blob) = repository.database().load(&entry.oid)? else {
                    anyhow::bail!(".gitignore entry {} is not a blob", entry.oid);
                };
                let text = std::str::from_utf8(blob.content())
                    .context(".gitignore blob is not valid utf-8")?;
                ignore
                    .scoped
                    .insert(entry.parent_dir(), parse_rules(text));
            }
        }

        Ok(ignore)
    }

    /// Whether `path` (worktree-relative) is excluded.
    ///
    /// Absolute rules are consulted first, then scoped rules from the
    /// root down to the path's directory; the last match wins, so deeper
    /// and later rules override earlier ones.
    pub fn check(&self, path: &str) -> bool {
        let mut ignored = false;

        for rule in &self.absolute {
            if glob_match(&rule.pattern, path) {
                ignored = !rule.negate;
            }
        }

        let components: Vec<&str> = path.split('/').collect();
        let mut dir = String::new();
        for i in 0..components.len() {
            if let Some(rules) = self.scoped.get(&dir) {
                for rule in rules {
                    let full_pattern = if dir.is_empty() {
                        rule.pattern.clone()
                    } else {
                        format!("{dir}/{}", rule.pattern)
                    };
                    if glob_match(&full_pattern, path) {
                        ignored = !rule.negate;
                    }
                }
            }
            if i < components.len() - 1 {
                if !dir.is_empty() {
                    dir.push('/');
                }
                dir.push_str(components[i]);
            }
        }

        ignored
    }
}

fn glob_match(pattern: &str, path: &str) -> bool {
    glob::Pattern::new(pattern)
        .map(|p| p.matches(path))
        .unwrap_or(false)
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn parses_comments_blanks_negation_and_escapes() {
        let rules = parse_rules("# build artifacts\n\n*.o\n!keep.o\n\\#literal\n");

        assert_eq!(
            rules,
            vec![
                IgnoreRule {
                    pattern: "*.o".to_string(),
                    negate: false
                },
                IgnoreRule {
                    pattern: "keep.o".to_string(),
                    negate: true
                },
                IgnoreRule {
                    pattern: "#literal".to_string(),
                    negate: false
                },
            ]
        );
    }

    #[test]
    fn later_negation_wins() {
        let ignore = Ignore {
            absolute: parse_rules("*.o\n!keep.o\n"),
            scoped: BTreeMap::new(),
        };

        assert!(ignore.check("main.o"));
        assert!(!ignore.check("keep.o"));
        assert!(!ignore.check("main.c"));
    }

    #[test]
    fn scoped_rules_apply_under_their_directory() {
        let mut scoped = BTreeMap::new();
        scoped.insert("sub".to_string(), parse_rules("*.tmp\n"));
        let ignore = Ignore {
            absolute: Vec::new(),
            scoped,
        };

        assert!(ignore.check("sub/x.tmp"));
        assert!(!ignore.check("x.tmp"));
    }

    #[test]
    fn scoped_rules_override_absolute_ones() {
        let mut scoped = BTreeMap::new();
        scoped.insert(String::new(), parse_rules("!special.log\n"));
        let ignore = Ignore {
            absolute: parse_rules("*.log\n"),
            scoped,
        };

        assert!(ignore.check("other.log"));
        assert!(!ignore.check("special.log"));
    }
}
