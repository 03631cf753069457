use std::{env, env::VarError};

use clap::Parser;

const HELP: &str = include_str!("./cli-help.txt");

/// Command line flags. Each flag overrides the environment variable of the same setting.
#[derive(Parser, Debug, Clone, Default)]
#[command(name = "gophermart", version, about = "Gophermart loyalty server", after_help = HELP)]
pub struct Arguments {
    /// Address to listen on, as host:port. Overrides RUN_ADDRESS
    #[arg(short = 'a', long = "address")]
    pub run_address: Option<String>,
    /// SQLite database URL. Overrides DATABASE_URI
    #[arg(short = 'd', long = "database")]
    pub database_uri: Option<String>,
    /// Base URL of the accrual service. Overrides ACCRUAL_SYSTEM_ADDRESS
    #[arg(short = 'r', long = "accrual")]
    pub accrual_address: Option<String>,
    /// Print the configuration environment variables and exit
    #[arg(long = "show-env")]
    pub show_env: bool,
}

/// Parses the command line. Returns `None` if the process should exit without starting the server.
pub fn handle_command_line_args() -> Option<Arguments> {
    let args = Arguments::parse();
    if args.show_env {
        display_envs();
        return None;
    }
    Some(args)
}

fn display_envs() {
    const DISPLAY_ENVS: [&str; 8] = [
        "RUST_LOG",
        "RUN_ADDRESS",
        "DATABASE_URI",
        "ACCRUAL_SYSTEM_ADDRESS",
        "GM_ACCRUAL_POLL_INTERVAL_MS",
        "GM_ACCRUAL_BATCH_SIZE",
        "GM_ACCRUAL_REQUEST_TIMEOUT_MS",
        "GM_DB_MAX_CONNECTIONS",
    ];

    println!("Current environment values:");
    DISPLAY_ENVS.iter().for_each(|&name| {
        let val = match env::var(name) {
            Ok(s) => s,
            Err(VarError::NotPresent) => "Not set".into(),
            Err(VarError::NotUnicode(s)) => format!("Invalid value: {}", s.to_string_lossy()),
        };
        println!("  {name:<35} {val:<15}");
    })
}
