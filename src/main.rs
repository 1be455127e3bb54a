//! ply binary entry point.
//!
//! Exit codes:
//! - `0` success
//! - `1` fatal error (version control or filesystem)
//! - `2` configuration or usage error
//! - `3` a patch conflicted and needs `ply resolve`

use std::process::ExitCode;

use tracing_subscriber::EnvFilter;

use ply::cli::{self, Cli, Outcome};
use ply::core::config::ConfigError;
use ply::core::ops::LockError;
use ply::core::types::TypeError;
use ply::core::{ErrorKind, PlyError};
use ply::git::GitError;
use ply::ui::output;

const EXIT_FATAL: u8 = 1;
const EXIT_USAGE: u8 = 2;
const EXIT_CONFLICT: u8 = 3;

fn main() -> ExitCode {
    let cli = Cli::parse_args();

    let default_level = if cli.debug { "debug" } else { "warn" };
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .without_time()
        .init();

    match cli::run(cli) {
        Ok(Outcome::Complete) => ExitCode::SUCCESS,
        Ok(Outcome::NeedsResolution { .. }) => ExitCode::from(EXIT_CONFLICT),
        Err(e) => {
            output::error(format!("{:#}", e));
            ExitCode::from(exit_code_for(&e))
        }
    }
}

/// Pick an exit code from the first classified error in the chain.
fn exit_code_for(err: &anyhow::Error) -> u8 {
    for cause in err.chain() {
        if let Some(e) = cause.downcast_ref::<PlyError>() {
            return match e.kind() {
                ErrorKind::Configuration | ErrorKind::Usage => EXIT_USAGE,
                ErrorKind::Fatal => EXIT_FATAL,
            };
        }
        if let Some(GitError::IncompatibleOptions(_) | GitError::ApplyInProgress) =
            cause.downcast_ref::<GitError>()
        {
            return EXIT_USAGE;
        }
        if let Some(LockError::AlreadyLocked) = cause.downcast_ref::<LockError>() {
            return EXIT_USAGE;
        }
        if cause.downcast_ref::<ConfigError>().is_some() || cause.downcast_ref::<TypeError>().is_some()
        {
            return EXIT_USAGE;
        }
    }
    EXIT_FATAL
}
