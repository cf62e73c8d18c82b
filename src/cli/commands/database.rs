use anyhow::{anyhow, Result};
use clap::{Arg, ArgMatches, Command};
use secrecy::SecretString;

pub const ARG_DB_HOST: &str = "db-host";
pub const ARG_DB_PORT: &str = "db-port";
pub const ARG_DB_USER: &str = "db-user";
pub const ARG_DB_PASSWORD: &str = "db-password";
pub const ARG_DB_NAME: &str = "db-name";
pub const ARG_DB_MAX_CONNECTIONS: &str = "db-max-connections";

pub fn with_args(command: Command) -> Command {
    command
        .arg(
            Arg::new(ARG_DB_HOST)
                .long(ARG_DB_HOST)
                .help("Database host")
                .env("DATABASE_HOST")
                .default_value("localhost"),
        )
        .arg(
            Arg::new(ARG_DB_PORT)
                .long(ARG_DB_PORT)
                .help("Database port")
                .env("DATABASE_PORT")
                .default_value("5432")
                .value_parser(clap::value_parser!(u16)),
        )
        .arg(
            Arg::new(ARG_DB_USER)
                .long(ARG_DB_USER)
                .help("Database user")
                .env("DATABASE_USER")
                .required(true),
        )
        .arg(
            Arg::new(ARG_DB_PASSWORD)
                .long(ARG_DB_PASSWORD)
                .help("Database password")
                .env("DATABASE_PASSWORD")
                .hide_env_values(true),
        )
        .arg(
            Arg::new(ARG_DB_NAME)
                .long(ARG_DB_NAME)
                .help("Database name")
                .env("DATABASE_NAME")
                .required(true),
        )
        .arg(
            Arg::new(ARG_DB_MAX_CONNECTIONS)
                .long(ARG_DB_MAX_CONNECTIONS)
                .help("Maximum number of pooled database connections")
                .env("DATABASE_MAX_CONNECTIONS")
                .default_value("5")
                .value_parser(clap::value_parser!(u32)),
        )
}

#[derive(Debug)]
pub struct Options {
    pub host: String,
    pub port: u16,
    pub user: String,
    pub password: SecretString,
    pub name: String,
    pub max_connections: u32,
}

impl Options {
    /// Parse database arguments from matches.
    ///
    /// # Errors
    /// Returns an error if required arguments are missing.
    pub fn parse(matches: &ArgMatches) -> Result<Self> {
        let read_required = |id: &str| -> Result<String> {
            matches
                .get_one::<String>(id)
                .cloned()
                .filter(|v| !v.trim().is_empty())
                .ok_or_else(|| anyhow!("missing required argument: --{id}"))
        };

        Ok(Self {
            host: read_required(ARG_DB_HOST)?,
            port: matches.get_one::<u16>(ARG_DB_PORT).copied().unwrap_or(5432),
            user: read_required(ARG_DB_USER)?,
            password: SecretString::from(
                matches
                    .get_one::<String>(ARG_DB_PASSWORD)
                    .cloned()
                    .unwrap_or_default(),
            ),
            name: read_required(ARG_DB_NAME)?,
            max_connections: matches
                .get_one::<u32>(ARG_DB_MAX_CONNECTIONS)
                .copied()
                .unwrap_or(5),
        })
    }
}
