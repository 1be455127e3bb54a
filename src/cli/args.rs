//! cli::args
//!
//! Command-line argument definitions using clap derive.
//!
//! # Global Flags
//!
//! These flags are available on all commands:
//! - `--help` / `-h`: Show help
//! - `--version`: Show version
//! - `--cwd <path>`: Run as if in that directory
//! - `--debug`: Enable debug logging
//! - `--quiet` / `-q`: Minimal output

use clap::{Parser, Subcommand};
use std::path::PathBuf;

/// ply - keep a numbered patch series applied on top of an upstream tree
#[derive(Parser, Debug)]
#[command(name = "ply")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Run as if ply was started in this directory
    #[arg(long, global = true)]
    pub cwd: Option<PathBuf>,

    /// Enable debug logging
    #[arg(long, global = true)]
    pub debug: bool,

    /// Minimal output
    #[arg(short, long, global = true)]
    pub quiet: bool,

    #[command(subcommand)]
    pub command: Command,
}

impl Cli {
    /// Parse command-line arguments.
    pub fn parse_args() -> Self {
        Parser::parse()
    }
}

/// Available commands.
#[derive(Subcommand, Debug)]
pub enum Command {
    /// Link this working tree to a patch repository
    #[command(
        name = "link",
        long_about = "Link this working tree to a patch repository.\n\n\
            Records the absolute, symlink-expanded path of the patch repository in \
            .PATCH_REPO at the root of the working tree. Every other command finds \
            the patch repository through this pointer, from any subdirectory.\n\n\
            The path must exist. It is not checked to be a git repository.\n\n\
            --no-three-way is recorded in .ply/config.toml for this working tree. \
            Without three-way merge a patch that does not apply leaves no markers \
            to fix, so it fails instead of pausing.",
        after_help = "\
WORKFLOW EXAMPLES:
    # Link a checkout of the upstream project to its patches
    cd ~/src/upstream
    ply link ~/src/upstream-patches"
    )]
    Link {
        /// Path to the patch repository
        path: PathBuf,

        /// Apply patches without three-way merge in this working tree
        #[arg(long)]
        no_three_way: bool,
    },

    /// Create a branch for a new patch on top of the whole series
    #[command(
        name = "new",
        long_about = "Create a branch for a new patch on top of the whole series.\n\n\
            The branch is named after the next free ordinal and a slug of NAME \
            (for example 0004-fix-build). The patch head is reset to 0 and every \
            patch in the series is applied onto the new branch. Commit your change \
            there and run 'ply save'.",
        after_help = "\
WORKFLOW EXAMPLES:
    # Start a new patch
    ply new \"Fix build on musl\"
    # ... edit, git commit ...
    ply save"
    )]
    New {
        /// Short description of the patch
        name: String,
    },

    /// Apply the whole series onto a branch
    #[command(
        name = "apply",
        long_about = "Apply the whole patch series onto a branch.\n\n\
            Checks out BRANCH (creating it with --create, or creating or resetting \
            it with --reset), resets the patch head to 0 and applies every patch in \
            ordinal order. On a conflict, fix the markers, stage the result and run \
            'ply resolve'.",
        after_help = "\
WORKFLOW EXAMPLES:
    # Rebuild the patched tree on top of a fresh upstream tag
    git checkout v2.4.0
    ply apply --create patched-2.4.0

    # Rebuild an existing patched branch from scratch
    ply apply --reset patched"
    )]
    Apply {
        /// Branch to apply the series onto
        branch: String,

        /// Create the branch
        #[arg(short = 'b', long, conflicts_with = "reset")]
        create: bool,

        /// Create the branch, resetting it if it already exists
        #[arg(short = 'B', long)]
        reset: bool,
    },

    /// Continue after fixing a conflicting patch
    #[command(
        name = "resolve",
        long_about = "Continue after fixing a conflicting patch.\n\n\
            Completes the paused patch application, regenerates the patch file for \
            the conflicting ordinal in the patch repository from the resolved commit, \
            and continues applying the rest of the series.",
        after_help = "\
WORKFLOW EXAMPLES:
    # After 'ply apply' stopped on a conflict
    vim src/conflicted.c
    git add src/conflicted.c
    ply resolve

    # Stage every tracked change first
    ply resolve --all"
    )]
    Resolve {
        /// Stage all changes in the working tree before continuing
        #[arg(short, long)]
        all: bool,
    },

    /// Export the current commit as the patch for this branch
    #[command(
        name = "save",
        long_about = "Export the current commit as the patch for this branch.\n\n\
            The ordinal is taken from the current branch name (as created by \
            'ply new'). The last commit is written to the patch repository under \
            that ordinal, replacing any earlier version, and committed there.",
        after_help = "\
WORKFLOW EXAMPLES:
    # Save the commit you just made
    ply save

    # Fold working tree changes into the last commit, then save
    ply save --amend --all"
    )]
    Save {
        /// Amend the last commit, keeping its message, before saving
        #[arg(long)]
        amend: bool,

        /// With --amend, stage all modified tracked files
        #[arg(short, long, requires = "amend")]
        all: bool,
    },

    /// Show the link, patch head and series state
    #[command(name = "status")]
    Status {
        /// Machine-readable JSON output
        #[arg(long)]
        json: bool,
    },

    /// Generate shell completion scripts
    #[command(
        name = "completion",
        after_help = "\
INSTALLATION:
    # Bash
    ply completion bash >> ~/.bashrc

    # Zsh
    ply completion zsh > ~/.zfunc/_ply

    # Fish
    ply completion fish > ~/.config/fish/completions/ply.fish

    # PowerShell
    ply completion powershell >> $PROFILE"
    )]
    Completion {
        /// Shell to generate completions for
        #[arg(value_enum)]
        shell: Shell,
    },
}

/// Supported shells for completion
#[derive(clap::ValueEnum, Debug, Clone, Copy)]
#[allow(clippy::enum_variant_names)]
pub enum Shell {
    Bash,
    Zsh,
    Fish,
    PowerShell,
}
