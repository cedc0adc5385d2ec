pub mod app;
pub mod commands;
pub mod error;
pub mod infra;

use clap::Parser;
use commands::{execute, Cli, Printer};
use std::io;
use std::process::ExitCode;

fn init_logging() {
    let env = env_logger::Env::default().default_filter_or("warn");
    // Ignore a second init, e.g. when a test already installed a logger.
    let _ = env_logger::Builder::from_env(env)
        .format_timestamp(None)
        .try_init();
}

/// Parse arguments, run the selected command once, and map the result to an exit code.
pub fn run() -> ExitCode {
    init_logging();
    let cli = Cli::parse();
    let config = cli.db_config();
    let json = cli.json;

    let stdout = io::stdout();
    let mut printer = Printer::new(stdout.lock(), json);
    let result = execute(&config, cli.command, &mut printer).and_then(|()| {
        printer.finish()?;
        Ok(())
    });

    match result {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            log::error!("command failed: {}", e);
            if json {
                let dto = serde_json::to_string(&e).unwrap_or_else(|_| e.to_string());
                eprintln!("{dto}");
            } else {
                eprintln!("error[{}]: {}", e.code(), e);
            }
            ExitCode::FAILURE
        }
    }
}
