//! Map validated CLI arguments to the server action.

use crate::cli::actions::{server::Args, Action};
use crate::cli::commands::{database, session, ARG_PORT, ARG_VIEWS_DIR};
use anyhow::Result;
use std::path::PathBuf;

/// Map validated CLI matches to a server action.
///
/// # Errors
/// Returns an error if required arguments are missing or empty.
pub fn handler(matches: &clap::ArgMatches) -> Result<Action> {
    let port = matches.get_one::<u16>(ARG_PORT).copied().unwrap_or(3000);
    let views_dir = matches
        .get_one::<String>(ARG_VIEWS_DIR)
        .map_or_else(|| PathBuf::from("views"), PathBuf::from);

    let database = database::Options::parse(matches)?;
    let session = session::Options::parse(matches)?;

    Ok(Action::Server(Args {
        port,
        views_dir,
        database,
        session,
    }))
}
