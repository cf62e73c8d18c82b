use anyhow::{anyhow, Result};
use clap::{builder::PossibleValuesParser, Arg, ArgAction, ArgMatches, Command};
use secrecy::SecretString;

pub const ARG_SESSION_SECRET: &str = "session-secret";
pub const ARG_SESSION_TTL_SECONDS: &str = "session-ttl-seconds";
pub const ARG_SESSION_STORE: &str = "session-store";
pub const ARG_SESSION_COOKIE_SECURE: &str = "session-cookie-secure";
pub const ARG_JWT_SECRET: &str = "jwt-secret";

/// Largest accepted session lifetime: `i32::MAX` seconds, about 68 years.
/// Postgres intervals and `Instant` arithmetic both hold it comfortably.
pub const MAX_SESSION_TTL_SECONDS: u64 = 2_147_483_647;

pub fn with_args(command: Command) -> Command {
    command
        .arg(
            Arg::new(ARG_SESSION_SECRET)
                .long(ARG_SESSION_SECRET)
                .help("Secret used to sign session identifiers")
                .env("SESSION_SECRET")
                .hide_env_values(true)
                .required(true),
        )
        .arg(
            Arg::new(ARG_SESSION_TTL_SECONDS)
                .long(ARG_SESSION_TTL_SECONDS)
                .help("Session lifetime in seconds, counted from sign in")
                .env("GATEHOUSE_SESSION_TTL_SECONDS")
                .default_value("3600")
                .value_parser(clap::value_parser!(u64).range(1..=MAX_SESSION_TTL_SECONDS)),
        )
        .arg(
            Arg::new(ARG_SESSION_STORE)
                .long(ARG_SESSION_STORE)
                .help("Where sessions are kept")
                .env("GATEHOUSE_SESSION_STORE")
                .default_value("postgres")
                .value_parser(PossibleValuesParser::new(["postgres", "memory"])),
        )
        .arg(
            Arg::new(ARG_SESSION_COOKIE_SECURE)
                .long(ARG_SESSION_COOKIE_SECURE)
                .help("Mark the session cookie Secure (HTTPS only)")
                .env("GATEHOUSE_SESSION_COOKIE_SECURE")
                .action(ArgAction::SetTrue),
        )
        .arg(
            Arg::new(ARG_JWT_SECRET)
                .long(ARG_JWT_SECRET)
                .help("Token signing secret")
                .env("JWT_SECRET")
                .hide_env_values(true),
        )
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StoreKind {
    Postgres,
    Memory,
}

#[derive(Debug)]
pub struct Options {
    pub secret: SecretString,
    pub ttl_seconds: u64,
    pub store: StoreKind,
    pub cookie_secure: bool,
    pub jwt_secret: Option<SecretString>,
}

impl Options {
    /// Parse session arguments from matches.
    ///
    /// # Errors
    /// Returns an error if the session secret is missing or empty.
    pub fn parse(matches: &ArgMatches) -> Result<Self> {
        let secret = matches
            .get_one::<String>(ARG_SESSION_SECRET)
            .cloned()
            .filter(|v| !v.is_empty())
            .ok_or_else(|| anyhow!("missing required argument: --{ARG_SESSION_SECRET}"))?;

        let store = match matches.get_one::<String>(ARG_SESSION_STORE).map(String::as_str) {
            Some("memory") => StoreKind::Memory,
            _ => StoreKind::Postgres,
        };

        Ok(Self {
            secret: SecretString::from(secret),
            ttl_seconds: matches
                .get_one::<u64>(ARG_SESSION_TTL_SECONDS)
                .copied()
                .unwrap_or(3600),
            store,
            cookie_secure: matches.get_flag(ARG_SESSION_COOKIE_SECURE),
            jwt_secret: matches
                .get_one::<String>(ARG_JWT_SECRET)
                .cloned()
                .map(SecretString::from),
        })
    }
}
