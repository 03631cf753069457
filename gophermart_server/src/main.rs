use dotenvy::dotenv;
use gophermart_server::{cli::handle_command_line_args, config::ServerConfig, server::run_server};
use log::*;

#[actix_web::main]
async fn main() {
    dotenv().ok();
    env_logger::init();
    let Some(args) = handle_command_line_args() else {
        return;
    };
    let config = match ServerConfig::load(&args) {
        Ok(c) => c,
        Err(e) => {
            error!("🪛️ {e}");
            eprintln!("{e}\nRun with --help for a list of the configuration flags and variables.");
            std::process::exit(1);
        },
    };

    info!("🚀️ Starting server on {}", config.run_address);
    match run_server(config).await {
        Ok(_) => println!("Bye!"),
        Err(e) => {
            eprintln!("{e}");
            std::process::exit(1);
        },
    }
}
