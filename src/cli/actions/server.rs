use crate::{
    cli::{
        commands::{database, session},
        globals::GlobalArgs,
    },
    server,
};
use anyhow::{anyhow, Result};
use secrecy::ExposeSecret;
use std::{path::PathBuf, time::Duration};
use tracing::debug;
use url::Url;

#[derive(Debug)]
pub struct Args {
    pub port: u16,
    pub views_dir: PathBuf,
    pub database: database::Options,
    pub session: session::Options,
}

/// Execute the server action.
/// # Errors
/// Returns an error if the DSN cannot be built, the database is unreachable, or the server fails to start.
pub async fn execute(args: Args) -> Result<()> {
    let mut globals = GlobalArgs::new(args.session.secret);
    globals.set_db_password(args.database.password.clone());
    globals.set_jwt_secret(args.session.jwt_secret);

    debug!("Global args: {:?}", globals);

    let dsn = build_dsn(&args.database, &globals)?;

    let config = server::Config {
        port: args.port,
        dsn,
        max_connections: args.database.max_connections,
        views_dir: args.views_dir,
        session_ttl: Duration::from_secs(args.session.ttl_seconds),
        session_store: args.session.store,
        session_cookie_secure: args.session.cookie_secure,
    };

    server::new(config, &globals).await
}

/// Assemble the Postgres connection string from its parts.
fn build_dsn(db: &database::Options, globals: &GlobalArgs) -> Result<String> {
    let mut dsn = Url::parse(&format!("postgres://{}:{}", db.host, db.port))?;

    dsn.set_path(&format!("/{}", db.name));

    dsn.set_username(&db.user)
        .map_err(|()| anyhow!("Error setting username"))?;

    let password = globals.db_password.expose_secret();
    if !password.is_empty() {
        dsn.set_password(Some(password))
            .map_err(|()| anyhow!("Error setting password"))?;
    }

    Ok(dsn.to_string())
}
