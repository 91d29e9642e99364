use std::sync::Arc;

use langproxy::config::{load_config, print_schema};
use langproxy::startup::run;
use langproxy::utils::logger::init_logging;

#[tokio::main]
async fn main() {
    if std::env::args().any(|arg| arg == "--print-schema") {
        if let Err(e) = print_schema() {
            eprintln!("Error printing schema: {}", e);
            std::process::exit(1);
        }
        return;
    }

    let config = match load_config() {
        Ok(config) => config,
        Err(e) => {
            eprintln!("{}", e);
            std::process::exit(1);
        }
    };

    if let Err(e) = init_logging(&config.logging) {
        eprintln!("{}", e);
        std::process::exit(1);
    }

    if let Err(e) = run(Arc::new(config)).await {
        tracing::error!("Server terminated: {}", e);
        std::process::exit(1);
    }
}
