#![allow(dead_code)]

use crate::areas::repository::Repository;
use crate::commands::plumbing::cat_file::CatFileMode;
use anyhow::Result;
use clap::{ArgGroup, Parser, Subcommand};
use std::io::Write;
use std::path::PathBuf;

mod areas;
mod artifacts;
mod commands;

#[derive(Parser)]
#[command(
    name = "kit",
    version = "0.1.0",
    about = "A simple git implementation with smart-HTTP remotes",
    long_about = "A reimplementation of git's content-addressed object store, staging \
    index, packfile codec, and smart-HTTP protocol, enough to init, stage, commit, \
    and synchronize a repository with a compatible remote."
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    #[command(about = "Initialize a new repository")]
    Init {
        #[arg(index = 1, help = "The path to the repository")]
        path: Option<String>,
    },
    #[command(
        about = "Print the type, size, or content of an object",
        group(ArgGroup::new("mode").required(true))
    )]
    CatFile {
        #[arg(short = 't', group = "mode", help = "Show the object's type")]
        show_type: bool,
        #[arg(short = 's', group = "mode", help = "Show the object's size")]
        show_size: bool,
        #[arg(short = 'p', group = "mode", help = "Pretty-print the object's content")]
        pretty: bool,
        #[arg(index = 1, help = "The object hash")]
        object: String,
    },
    #[command(about = "Hash a file and optionally write it to the object database")]
    HashObject {
        #[arg(short, long, help = "Write the object to the object database")]
        write: bool,
        #[arg(index = 1, help = "The file to hash")]
        file: String,
    },
    #[command(about = "List the contents of a tree object")]
    LsTree {
        #[arg(long, help = "List only entry names")]
        name_only: bool,
        #[arg(index = 1, help = "The tree hash")]
        tree: String,
    },
    #[command(about = "Write the index as a tree object")]
    WriteTree,
    #[command(about = "Write the working tree as a tree object")]
    WriteWorkingTree,
    #[command(about = "Create a commit object from an existing tree")]
    CommitTree {
        #[arg(index = 1, help = "The tree hash")]
        tree: String,
        #[arg(short, long, help = "The parent commit hash")]
        parent: Option<String>,
        #[arg(short, long, help = "The commit message")]
        message: Option<String>,
    },
    #[command(about = "List the paths tracked by the index")]
    LsFiles {
        #[arg(short, help = "Show mode bits and object hash for each entry")]
        stage: bool,
    },
    #[command(about = "Add files or directories to the index")]
    Add {
        #[arg(index = 1, required = true, help = "The files or directories to stage, or '.'")]
        paths: Vec<String>,
    },
    #[command(about = "Remove files from the index")]
    Reset {
        #[arg(index = 1, required = true, help = "The files to unstage")]
        paths: Vec<String>,
    },
    #[command(about = "Show the working tree status")]
    Status,
    #[command(about = "Create a new commit from the index")]
    Commit {
        #[arg(short, long, help = "The commit message")]
        message: String,
    },
    #[command(about = "Clone a remote repository")]
    Clone {
        #[arg(index = 1, help = "The remote repository URL")]
        url: String,
        #[arg(index = 2, help = "The directory to clone into")]
        directory: Option<String>,
    },
    #[command(about = "Push the current branch to a remote")]
    Push {
        #[arg(index = 1, help = "The remote repository URL")]
        url: String,
    },
    #[command(about = "Pull the current branch from a remote")]
    Pull {
        #[arg(index = 1, help = "The remote repository URL")]
        url: String,
    },
    #[command(about = "Switch to a branch")]
    Checkout {
        #[arg(index = 1, help = "The branch to switch to")]
        branch: String,
    },
    #[command(about = "Create a new branch at the current HEAD")]
    Branch {
        #[arg(index = 1, help = "The branch name")]
        name: String,
    },
}

fn repository_at_cwd() -> Result<Repository> {
    Repository::new(std::env::current_dir()?, Box::new(std::io::stdout()))
}

/// Clone target directory: explicit, or the repository name from the URL
fn clone_directory(url: &str, directory: Option<String>) -> String {
    directory.unwrap_or_else(|| {
        url.trim_end_matches('/')
            .rsplit('/')
            .next()
            .unwrap_or("repository")
            .trim_end_matches(".git")
            .to_string()
    })
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    match &cli.command {
        Commands::Init { path } => {
            let path = match path {
                Some(path) => PathBuf::from(path),
                None => std::env::current_dir()?,
            };
            Repository::new(path, Box::new(std::io::stdout()))?.init()?
        }
        Commands::CatFile {
            show_type,
            show_size,
            pretty: _,
            object,
        } => {
            let mode = if *show_type {
                CatFileMode::Type
            } else if *show_size {
                CatFileMode::Size
            } else {
                CatFileMode::Pretty
            };
            repository_at_cwd()?.cat_file(object, mode)?
        }
        Commands::HashObject { write, file } => repository_at_cwd()?.hash_object(file, *write)?,
        Commands::LsTree { name_only, tree } => repository_at_cwd()?.ls_tree(tree, *name_only)?,
        Commands::WriteTree => repository_at_cwd()?.write_tree()?,
        Commands::WriteWorkingTree => repository_at_cwd()?.write_working_tree()?,
        Commands::CommitTree {
            tree,
            parent,
            message,
        } => repository_at_cwd()?.commit_tree(tree, parent.as_deref(), message.as_deref())?,
        Commands::LsFiles { stage } => repository_at_cwd()?.ls_files(*stage)?,
        Commands::Add { paths } => repository_at_cwd()?.add(paths)?,
        Commands::Reset { paths } => repository_at_cwd()?.reset(paths)?,
        Commands::Status => repository_at_cwd()?.status()?,
        Commands::Commit { message } => repository_at_cwd()?.commit(message)?,
        Commands::Clone { url, directory } => {
            let directory = clone_directory(url, directory.clone());
            let target = PathBuf::from(&directory);
            if target.exists() {
                anyhow::bail!("destination path '{directory}' already exists");
            }

            let repository = Repository::new(target, Box::new(std::io::stdout()))?;
            writeln!(repository.writer(), "Cloning into '{directory}'...")?;
            repository.init()?;
            repository.clone_from(url)?
        }
        Commands::Push { url } => repository_at_cwd()?.push(url)?,
        Commands::Pull { url } => repository_at_cwd()?.pull(url)?,
        Commands::Checkout { branch } => repository_at_cwd()?.checkout(branch)?,
        Commands::Branch { name } => repository_at_cwd()?.branch(name)?,
    }

    Ok(())
}
