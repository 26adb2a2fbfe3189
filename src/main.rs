use clap::Parser;
use std::process::ExitCode;
use std::sync::Arc;
use std::time::Duration;

use autoneg::config::{Cli, Config, Settings};
use autoneg::logger;
use autoneg::server;

fn main() -> ExitCode {
    let cli = Cli::parse();

    let cfg = match Config::load(&cli) {
        Ok(cfg) => cfg,
        Err(e) => {
            eprintln!("Error: {e}");
            return ExitCode::FAILURE;
        }
    };

    let startup = cfg.to_settings().and_then(|(settings, warnings)| {
        Ok((settings, warnings, cfg.log_level()?, cfg.socket_addr()?))
    });
    let (settings, warnings, level, addr) = match startup {
        Ok(startup) => startup,
        Err(e) => {
            eprintln!("Error: {e}");
            return ExitCode::FAILURE;
        }
    };

    if let Err(e) = logger::init(level, &cfg.logging) {
        eprintln!("Error: failed to open log file: {e}");
        return ExitCode::FAILURE;
    }
    for warning in &warnings {
        logger::log_warning(&warning.to_string());
    }

    // Build the tokio runtime with the configured worker count
    let mut runtime_builder = tokio::runtime::Builder::new_multi_thread();
    runtime_builder.enable_all();
    if let Some(workers) = cfg.server.workers {
        runtime_builder.worker_threads(workers);
    }

    let runtime = match runtime_builder.build() {
        Ok(runtime) => runtime,
        Err(e) => {
            logger::log_critical(&format!("Failed to start runtime: {e}"));
            return ExitCode::FAILURE;
        }
    };

    let timeout = Duration::from_secs(cfg.server.connection_timeout);
    runtime.block_on(async_main(addr, Arc::new(settings), cfg.server.workers, timeout))
}

async fn async_main(
    addr: std::net::SocketAddr,
    settings: Arc<Settings>,
    workers: Option<usize>,
    timeout: Duration,
) -> ExitCode {
    let listener = match server::create_reusable_listener(addr) {
        Ok(listener) => listener,
        Err(e) => {
            logger::log_critical(&format!("Failed to bind {addr}: {e}"));
            return ExitCode::FAILURE;
        }
    };

    logger::log_server_start(&addr, &settings, workers);
    server::run(listener, settings, timeout).await;
    ExitCode::SUCCESS
}
