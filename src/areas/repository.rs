//! Repository context
//!
//! Locates the repository root, owns the paths below it, and wires the
//! stores together. Command output goes through an injected writer so
//! tests can capture it.

use crate::areas::database::Database;
use crate::areas::index::Index;
use crate::areas::refs::Refs;
use crate::areas::workspace::Workspace;
use crate::artifacts::config::Config;
use crate::errors::GitError;
use anyhow::Context;
use std::cell::{RefCell, RefMut};
use std::path::{Path, PathBuf};

/// Name of the metadata directory under the worktree.
pub const GIT_DIR: &str = ".git";

const DEFAULT_DESCRIPTION: &str =
    "Unnamed repository; edit this file 'description' to name the repository.\n";

pub struct Repository {
    worktree: Box<Path>,
    gitdir: Box<Path>,
    config: Config,
    writer: RefCell<Box<dyn std::io::Write>>,
    database: Database,
    refs: Refs,
    workspace: Workspace,
}

impl std::fmt::Debug for Repository {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Repository")
            .field("worktree", &self.worktree)
            .field("gitdir", &self.gitdir)
            .field("config", &self.config)
            .field("database", &self.database)
            .field("refs", &self.refs)
            .field("workspace", &self.workspace)
            .finish()
    }
}

impl Repository {
    /// Open the repository whose worktree is exactly `worktree`.
    ///
    /// The metadata directory must already exist; the config file is
    /// loaded and its format version checked.
    pub fn open(worktree: &Path, writer: Box<dyn std::io::Write>) -> anyhow::Result<Self> {
        let worktree = worktree
            .canonicalize()
            .with_context(|| format!("cannot resolve {}", worktree.display()))?;
        let gitdir = worktree.join(GIT_DIR);

        if !gitdir.is_dir() {
            return Err(GitError::NotARepository(worktree).into());
        }

        let config = Config::load(&gitdir.join("config"))?.unwrap_or_default();
        if let Some(version) = config.get("core", "repositoryformatversion")
            && version != "0"
        {
            return Err(GitError::UnsupportedFormatVersion(version.to_string()).into());
        }

        let database = Database::new(gitdir.join("objects").into_boxed_path());
        let refs = Refs::new(gitdir.clone().into_boxed_path());
        let workspace = Workspace::new(worktree.clone().into_boxed_path());

        Ok(Repository {
            worktree: worktree.into_boxed_path(),
            gitdir: gitdir.into_boxed_path(),
            config,
            writer: RefCell::new(writer),
            database,
            refs,
            workspace,
        })
    }

    /// Ascend from `start` to the first ancestor containing a metadata
    /// directory. Reaching the filesystem root is `NotARepository`.
    pub fn discover(start: &Path, writer: Box<dyn std::io::Write>) -> anyhow::Result<Self> {
        let start = start
            .canonicalize()
            .with_context(|| format!("cannot resolve {}", start.display()))?;

        let mut current = start.as_path();
        loop {
            if current.join(GIT_DIR).is_dir() {
                return Self::open(current, writer);
            }
            match current.parent() {
                Some(parent) => current = parent,
                None => return Err(GitError::NotARepository(start).into()),
            }
        }
    }

    /// Materialise the on-disk skeleton at `path` and open it.
    ///
    /// The target may not exist yet; an existing, non-empty metadata
    /// directory is rejected.
    pub fn create(path: &Path, writer: Box<dyn std::io::Write>) -> anyhow::Result<Self> {
        let gitdir = path.join(GIT_DIR);

        if gitdir.exists() && gitdir.read_dir()?.next().is_some() {
            return Err(GitError::NotEmpty(path.to_path_buf()).into());
        }
        std::fs::create_dir_all(path)
            .with_context(|| format!("unable to create worktree {}", path.display()))?;

        for dir in ["objects", "refs/tags", "refs/heads", "branches"] {
            std::fs::create_dir_all(gitdir.join(dir))
                .with_context(|| format!("unable to create {}/{}", GIT_DIR, dir))?;
        }

        std::fs::write(gitdir.join("description"), DEFAULT_DESCRIPTION)?;
        std::fs::write(gitdir.join("HEAD"), "ref: refs/heads/master\n")?;
        std::fs::write(gitdir.join("config"), Config::repository_default().serialize())?;

        Self::open(path, writer)
    }

    pub fn worktree(&self) -> &Path {
        &self.worktree
    }

    pub fn gitdir(&self) -> &Path {
        &self.gitdir
    }

    /// Compose a path under the metadata directory.
    pub fn git_path(&self, parts: &[&str]) -> PathBuf {
        parts
            .iter()
            .fold(self.gitdir.to_path_buf(), |path, part| path.join(part))
    }

    /// Like `git_path`, creating intermediate directories when asked.
    pub fn git_file(&self, mkdir: bool, parts: &[&str]) -> anyhow::Result<PathBuf> {
        let path = self.git_path(parts);
        if mkdir && let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)
                .with_context(|| format!("unable to create {}", parent.display()))?;
        }
        Ok(path)
    }

    pub fn writer(&self) -> RefMut<'_, Box<dyn std::io::Write>> {
        self.writer.borrow_mut()
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    pub fn database(&self) -> &Database {
        &self.database
    }

    pub fn refs(&self) -> &Refs {
        &self.refs
    }

    pub fn workspace(&self) -> &Workspace {
        &self.workspace
    }

    /// Load the staging area from disk. A missing index file reads as
    /// empty.
    pub fn index(&self) -> anyhow::Result<Index> {
        let mut index = Index::new(self.git_path(&["index"]).into_boxed_path());
        index.rehydrate()?;
        Ok(index)
    }

    /// The committer identity: `user.name`/`user.email` from the repo
    /// config, falling back to `~/.gitconfig`.
    pub fn identity(&self) -> anyhow::Result<(String, String)> {
        if let (Some(name), Some(email)) =
            (self.config.get("user", "name"), self.config.get("user", "email"))
        {
            return Ok((name.to_string(), email.to_string()));
        }

        if let Ok(home) = std::env::var("HOME")
            && let Some(global) = Config::load(&Path::new(&home).join(".gitconfig"))?
            && let (Some(name), Some(email)) =
                (global.get("user", "name"), global.get("user", "email"))
        {
            return Ok((name.to_string(), email.to_string()));
        }

        Err(GitError::NoIdentity.into())
    }
}
