//! completion command - Print a shell completion script for ply

use std::io::{self, Write};

use super::Outcome;
use crate::cli::args::{Cli, Shell};
use anyhow::Result;
use clap::CommandFactory;

/// Print the completion script for `shell` to stdout.
pub fn completion(shell: Shell) -> Result<Outcome> {
    let stdout = io::stdout();
    write_completion(shell, &mut stdout.lock())?;
    Ok(Outcome::Complete)
}

fn write_completion(shell: Shell, out: &mut dyn Write) -> io::Result<()> {
    let mut cmd = Cli::command();
    let bin = cmd.get_name().to_string();
    clap_complete::generate(clap_complete::Shell::from(shell), &mut cmd, bin, out);
    out.flush()
}

impl From<Shell> for clap_complete::Shell {
    fn from(shell: Shell) -> Self {
        match shell {
            Shell::Bash => clap_complete::Shell::Bash,
            Shell::Zsh => clap_complete::Shell::Zsh,
            Shell::Fish => clap_complete::Shell::Fish,
            Shell::PowerShell => clap_complete::Shell::PowerShell,
        }
    }
}
