use std::sync::atomic::AtomicUsize;
use std::sync::Arc;

mod api;
mod config;
mod handler;
mod http;
mod logger;
mod routing;
mod server;

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cfg = config::Config::load()?;
    logger::init(&cfg)?;

    // Multi-threaded runtime; `server.workers` overrides the CPU-count default
    let mut runtime_builder = tokio::runtime::Builder::new_multi_thread();
    runtime_builder.enable_all();

    if let Some(workers) = cfg.server.workers {
        runtime_builder.worker_threads(workers);
        logger::log_debug(&format!("Using {workers} worker threads"));
    } else {
        logger::log_debug("Using default worker threads (CPU cores)");
    }

    let runtime = runtime_builder.build()?;

    runtime.block_on(async_main(cfg))
}

async fn async_main(cfg: config::Config) -> Result<(), Box<dyn std::error::Error>> {
    let addr = cfg.get_socket_addr()?;
    let listener = server::create_listener(addr)?;

    let state = Arc::new(config::AppState::new(&cfg));
    server::signal::start_signal_handler(Arc::clone(&state.shutdown))?;

    logger::log_server_start(&addr, &cfg);

    server::start_server_loop(listener, state, Arc::new(AtomicUsize::new(0))).await?;
    Ok(())
}
