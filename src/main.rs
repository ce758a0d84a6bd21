#![allow(dead_code)]

use anyhow::Result;
use clap::{Parser, Subcommand};
use std::path::PathBuf;

mod areas;
mod artifacts;
mod commands;
mod errors;

use areas::repository::Repository;

#[derive(Parser)]
#[command(
    name = "rit",
    version = "0.1.0",
    about = "A content-addressed version control engine",
    long_about = "rit implements the object database, staging index, and reference \
    layer of the predominant distributed version control system, byte-compatible \
    with its on-disk formats."
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    #[command(name = "init", about = "Initialize a new, empty repository")]
    Init {
        #[arg(short, long, default_value = ".", help = "Where to create the repository")]
        path: PathBuf,
    },
    #[command(name = "cat-file", about = "Provide content of repository objects")]
    CatFile {
        #[arg(short = 't', long = "type", help = "The expected object type")]
        kind: String,
        #[arg(short, long, help = "The object to display")]
        object: String,
    },
    #[command(
        name = "hash-object",
        about = "Compute an object ID and optionally create a blob from a file"
    )]
    HashObject {
        #[arg(short, long, help = "Actually write the object into the database")]
        write: bool,
        #[arg(short = 't', long = "type", default_value = "blob", help = "The object type")]
        kind: String,
        #[arg(index = 1, help = "Read the object from this file")]
        file: PathBuf,
    },
    #[command(name = "log", about = "Display the history of a commit as Graphviz DOT")]
    Log {
        #[arg(short, long, default_value = "HEAD", help = "Commit to start at")]
        commit: String,
    },
    #[command(name = "ls-tree", about = "Pretty-print a tree object")]
    LsTree {
        #[arg(short, long, help = "Recurse into sub-trees")]
        recursive: bool,
        #[arg(index = 1, help = "A tree-ish object")]
        tree: String,
    },
    #[command(name = "checkout", about = "Materialise a commit inside an empty directory")]
    Checkout {
        #[arg(index = 1, help = "The commit or tree to check out")]
        commit: String,
        #[arg(index = 2, help = "The empty directory to check out into")]
        dir: PathBuf,
    },
    #[command(name = "show-ref", about = "List references")]
    ShowRef,
    #[command(name = "tag", about = "List or create tags")]
    Tag {
        #[arg(short, long, help = "Create an annotated tag object")]
        annotated: bool,
        #[arg(short, long, help = "The new tag's name")]
        name: Option<String>,
        #[arg(short, long, default_value = "HEAD", help = "The object the tag points to")]
        object: String,
    },
    #[command(name = "rev-parse", about = "Resolve a name to an object ID")]
    RevParse {
        #[arg(short = 't', long = "type", help = "The expected object type")]
        kind: Option<String>,
        #[arg(index = 1, help = "The name to resolve")]
        name: String,
    },
    #[command(name = "ls-files", about = "List all staged files")]
    LsFiles {
        #[arg(short, long, help = "Show entry metadata as well")]
        verbose: bool,
    },
    #[command(name = "status", about = "Show the working tree status")]
    Status,
    #[command(name = "check-ignore", about = "Check paths against ignore rules")]
    CheckIgnore {
        #[arg(long, num_args = 1.., help = "Paths to check")]
        paths: Vec<String>,
    },
    #[command(name = "rm", about = "Remove files from the index and the working tree")]
    Rm {
        #[arg(long, num_args = 1.., help = "Files to remove")]
        files: Vec<String>,
    },
    #[command(name = "add", about = "Add files to the index")]
    Add {
        #[arg(short, long, num_args = 1.., help = "Files to add")]
        files: Vec<String>,
    },
    #[command(name = "commit", about = "Record the staged tree as a new commit")]
    Commit {
        #[arg(short, long, help = "The commit message")]
        message: String,
    },
}

fn discover_repository() -> Result<Repository> {
    Repository::discover(&std::env::current_dir()?, Box::new(std::io::stdout()))
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    match &cli.command {
        Commands::Init { path } => {
            commands::porcelain::init::init(path, Box::new(std::io::stdout()))?;
        }
        Commands::CatFile { kind, object } => {
            discover_repository()?.cat_file(kind, object)?;
        }
        Commands::HashObject { write, kind, file } => {
            commands::plumbing::hash_object::hash_object(
                *write,
                kind,
                file,
                &mut std::io::stdout(),
            )?;
        }
        Commands::Log { commit } => {
            discover_repository()?.log(commit)?;
        }
        Commands::LsTree { recursive, tree } => {
            discover_repository()?.ls_tree(tree, *recursive)?;
        }
        Commands::Checkout { commit, dir } => {
            discover_repository()?.checkout(commit, dir)?;
        }
        Commands::ShowRef => {
            discover_repository()?.show_ref()?;
        }
        Commands::Tag {
            annotated,
            name,
            object,
        } => {
            discover_repository()?.tag(name.as_deref(), object, *annotated)?;
        }
        Commands::RevParse { kind, name } => {
            discover_repository()?.rev_parse(name, kind.as_deref())?;
        }
        Commands::LsFiles { verbose } => {
            discover_repository()?.ls_files(*verbose)?;
        }
        Commands::Status => {
            discover_repository()?.status()?;
        }
        Commands::CheckIgnore { paths } => {
            discover_repository()?.check_ignore(paths)?;
        }
        Commands::Rm { files } => {
            discover_repository()?.rm(files)?;
        }
        Commands::Add { files } => {
            discover_repository()?.add(files)?;
        }
        Commands::Commit { message } => {
            discover_repository()?.commit(message)?;
        }
    }

    Ok(())
}
