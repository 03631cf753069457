use std::{env, fmt::Display, str::FromStr, time::Duration};

use log::*;

use crate::{cli::Arguments, errors::ServerError};

const DEFAULT_RUN_ADDRESS: &str = "127.0.0.1:8080";
const DEFAULT_POLL_INTERVAL_MS: u64 = 1_000;
const DEFAULT_BATCH_SIZE: usize = 10;
const DEFAULT_REQUEST_TIMEOUT_MS: u64 = 5_000;
const DEFAULT_DB_MAX_CONNECTIONS: u32 = 25;

#[derive(Clone, Debug)]
pub struct ServerConfig {
    /// The address the HTTP server binds to, as `host:port`.
    pub run_address: String,
    /// The SQLite database URL, e.g. `sqlite://data/gophermart.db`.
    pub database_url: String,
    pub db_max_connections: u32,
    pub accrual: AccrualConfig,
}

/// Configuration for the accrual worker and its client.
#[derive(Clone, Debug)]
pub struct AccrualConfig {
    /// Base URL of the accrual service, e.g. `http://localhost:8081`.
    pub address: String,
    /// Time between two reconciliation cycles.
    pub poll_interval: Duration,
    /// Maximum number of orders claimed per cycle.
    pub batch_size: usize,
    /// Timeout for a single request to the accrual service.
    pub request_timeout: Duration,
}

impl AccrualConfig {
    pub fn new(address: &str) -> Self {
        Self {
            address: address.to_string(),
            poll_interval: Duration::from_millis(DEFAULT_POLL_INTERVAL_MS),
            batch_size: DEFAULT_BATCH_SIZE,
            request_timeout: Duration::from_millis(DEFAULT_REQUEST_TIMEOUT_MS),
        }
    }
}

impl ServerConfig {
    pub fn new(run_address: &str, database_url: &str, accrual_address: &str) -> Self {
        Self {
            run_address: run_address.to_string(),
            database_url: database_url.to_string(),
            db_max_connections: DEFAULT_DB_MAX_CONNECTIONS,
            accrual: AccrualConfig::new(accrual_address),
        }
    }

    /// Builds the configuration from the command line and the environment.
    ///
    /// The run address, database and accrual service address come from the command line flag if one was given, and
    /// from the environment otherwise. The storage and accrual service addresses have no defaults, and missing either
    /// one is an error. The remaining settings are only read from the environment.
    pub fn load(args: &Arguments) -> Result<Self, ServerError> {
        let run_address = match flag_or_var(args.run_address.as_deref(), "RUN_ADDRESS") {
            Some(address) => address,
            None => {
                info!("🪛️ RUN_ADDRESS is not set. Using the default, {DEFAULT_RUN_ADDRESS}.");
                DEFAULT_RUN_ADDRESS.to_string()
            },
        };
        let database_url = required_setting(args.database_uri.as_deref(), "DATABASE_URI", "-d")?;
        let accrual_address = required_setting(args.accrual_address.as_deref(), "ACCRUAL_SYSTEM_ADDRESS", "-r")?;
        let poll_interval = Duration::from_millis(parse_var("GM_ACCRUAL_POLL_INTERVAL_MS", DEFAULT_POLL_INTERVAL_MS));
        let batch_size = parse_var("GM_ACCRUAL_BATCH_SIZE", DEFAULT_BATCH_SIZE);
        let request_timeout =
            Duration::from_millis(parse_var("GM_ACCRUAL_REQUEST_TIMEOUT_MS", DEFAULT_REQUEST_TIMEOUT_MS));
        let db_max_connections = parse_var("GM_DB_MAX_CONNECTIONS", DEFAULT_DB_MAX_CONNECTIONS);
        Ok(Self {
            run_address,
            database_url,
            db_max_connections,
            accrual: AccrualConfig { address: accrual_address, poll_interval, batch_size, request_timeout },
        })
    }
}

/// The flag value if it was given and is not blank, otherwise the non-blank value of the environment variable.
fn flag_or_var(flag: Option<&str>, name: &str) -> Option<String> {
    let from_flag = flag.map(str::trim).filter(|s| !s.is_empty()).map(String::from);
    from_flag.or_else(|| env::var(name).ok().map(|s| s.trim().to_string()).filter(|s| !s.is_empty()))
}

fn required_setting(flag: Option<&str>, name: &str, flag_name: &str) -> Result<String, ServerError> {
    match flag.map(str::trim) {
        Some(s) if !s.is_empty() => Ok(s.to_string()),
        Some(_) => Err(ServerError::ConfigurationError(format!("The {flag_name} flag is empty"))),
        None => required_var(name),
    }
}

fn required_var(name: &str) -> Result<String, ServerError> {
    match env::var(name) {
        Ok(s) if !s.trim().is_empty() => Ok(s.trim().to_string()),
        Ok(_) => Err(ServerError::ConfigurationError(format!("{name} is empty"))),
        Err(e) => Err(ServerError::ConfigurationError(format!("{e} [{name}]"))),
    }
}

/// Reads an optional numeric variable. Unset, unparseable and zero values fall back to the default.
fn parse_var<T>(name: &str, default: T) -> T
where
    T: FromStr + Display + Default + PartialEq,
    T::Err: Display,
{
    match env::var(name) {
        Err(_) => {
            debug!("🪛️ {name} is not set. Using the default value of {default}.");
            default
        },
        Ok(s) => match s.trim().parse::<T>() {
            Ok(v) if v == T::default() => {
                warn!("🪛️ {name} cannot be zero. Using the default value of {default}.");
                default
            },
            Ok(v) => v,
            Err(e) => {
                warn!("🪛️ Invalid value for {name}: '{s}'. {e} Using the default value of {default}.");
                default
            },
        },
    }
}
