// src/main.rs — depkeeper entry point

use std::sync::Arc;

use clap::Parser;

use depkeeper::cli::Cli;
use depkeeper::config::ConfigSources;
use depkeeper::core::orchestrator::Orchestrator;
use depkeeper::core::worker::CommandWorker;
use depkeeper::infra::logger;

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    let sink = match logger::init(&cli.log_level) {
        Ok(sink) => sink,
        Err(err) => {
            eprintln!("error: {err}");
            std::process::exit(1);
        }
    };

    let sources = ConfigSources::from_process(&cli);
    let orchestrator = Orchestrator::new(Arc::new(CommandWorker), sink);
    let code = orchestrator.run(sources).await;
    std::process::exit(code);
}
