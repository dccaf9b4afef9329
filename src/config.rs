//! Server configuration read from the command line and environment variables.

use std::{
    env,
    fmt::Display,
    net::{IpAddr, Ipv4Addr},
};

use clap::{Parser, ValueEnum};

/// The minimum length of the admin token.
pub const MIN_ADMIN_TOKEN_LENGTH: usize = 16;

/// The environment variable that selects the runtime mode.
pub const APP_ENV_VAR: &str = "APP_ENV";

/// The mode the server runs in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum AppEnv {
    /// Local development, verbose logging.
    Development,
    /// Automated tests, quiet logging.
    Test,
    /// Deployed server.
    Production,
}

impl AppEnv {
    /// The log level used when `RUST_LOG` is not set.
    pub fn default_log_filter(&self) -> &'static str {
        match self {
            AppEnv::Development => "debug",
            AppEnv::Test => "warn",
            AppEnv::Production => "info",
        }
    }
}

impl Display for AppEnv {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            AppEnv::Development => "development",
            AppEnv::Test => "test",
            AppEnv::Production => "production",
        };

        f.write_str(name)
    }
}

/// The REST API server for the session ledger.
///
/// Every option can also be set with the environment variable shown in its
/// help text.
#[derive(Parser, Debug, Clone)]
#[command(version, about, long_about = None)]
pub struct Config {
    /// File path to the application SQLite database, or ":memory:".
    #[arg(long, env = "DATABASE_URL", value_parser = non_empty_string)]
    pub database_url: String,

    /// The mode the server runs in.
    #[arg(long, env = "APP_ENV", value_enum, default_value_t = AppEnv::Production)]
    pub app_env: AppEnv,

    /// The IP address to listen on.
    #[arg(long, env = "HOST", default_value_t = IpAddr::V4(Ipv4Addr::LOCALHOST))]
    pub host: IpAddr,

    /// The port to serve the API from.
    #[arg(short, long, env = "PORT", default_value_t = 3333)]
    pub port: u16,

    /// Bearer token for the maintenance routes. The routes are disabled when
    /// this is not set.
    #[arg(long, env = "ADMIN_TOKEN", hide_env_values = true, value_parser = admin_token)]
    pub admin_token: Option<String>,
}

/// Errors that stop the server from starting.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// The dotenv file exists but could not be parsed.
    #[error("could not load dotenv file {0}: {1}")]
    Dotenv(&'static str, dotenv::Error),

    /// A required option is missing or an option has an invalid value.
    #[error(transparent)]
    InvalidOption(#[from] clap::Error),
}

impl Config {
    /// Load the dotenv file for the current mode, then parse the
    /// configuration from the command line and environment variables.
    ///
    /// # Errors
    /// Returns a [ConfigError] if the dotenv file cannot be parsed, or if an
    /// option is missing or invalid.
    pub fn load() -> Result<Self, ConfigError> {
        load_dotenv().map_err(|error| ConfigError::Dotenv(dotenv_file_name(), error))?;

        Ok(Self::try_parse()?)
    }
}

fn non_empty_string(value: &str) -> Result<String, String> {
    if value.trim().is_empty() {
        Err("must not be empty".to_owned())
    } else {
        Ok(value.to_owned())
    }
}

fn admin_token(value: &str) -> Result<String, String> {
    if value.len() < MIN_ADMIN_TOKEN_LENGTH {
        Err(format!(
            "must be at least {MIN_ADMIN_TOKEN_LENGTH} characters long"
        ))
    } else {
        Ok(value.to_owned())
    }
}

/// The dotenv file to load for the mode set in the process environment.
///
/// `.env.test` is used when `APP_ENV` is "test", `.env` otherwise.
pub fn dotenv_file_name() -> &'static str {
    match env::var(APP_ENV_VAR) {
        Ok(app_env) if app_env == "test" => ".env.test",
        _ => ".env",
    }
}

/// Load variables from the dotenv file for the current mode into the process
/// environment. Variables that are already set are not overwritten.
///
/// A missing dotenv file is not an error.
///
/// # Errors
/// Returns an error if the file exists but cannot be parsed.
pub fn load_dotenv() -> Result<(), dotenv::Error> {
    match dotenv::from_filename(dotenv_file_name()) {
        Ok(_) => Ok(()),
        Err(dotenv::Error::Io(_)) => Ok(()),
        Err(error) => Err(error),
    }
}
