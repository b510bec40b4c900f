use std::sync::Arc;

mod captcha;
mod config;
mod handlers;
mod http;
mod logger;
mod notify;
mod router;
mod save;
mod server;

use config::AppState;
use router::Router;

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cfg = config::Config::load()?;

    let mut runtime_builder = tokio::runtime::Builder::new_multi_thread();
    runtime_builder.enable_all();
    if let Some(workers) = cfg.server.workers {
        runtime_builder.worker_threads(workers);
    }
    let runtime = runtime_builder.build()?;

    runtime.block_on(async_main(cfg))
}

async fn async_main(cfg: config::Config) -> Result<(), Box<dyn std::error::Error>> {
    let addr = cfg.get_socket_addr()?;
    let listener = server::create_reusable_listener(addr)?;
    logger::log_server_start(&addr, &cfg);

    let router = Arc::new(handlers::register_routes(build_router(&cfg)));
    let state = Arc::new(AppState::new(cfg));

    server::run(listener, state, router).await
}

/// Configure the dispatch engine before any route registration.
fn build_router(cfg: &config::Config) -> Router<AppState> {
    let mut router = Router::new().debug(cfg.http.debug);
    if cfg.cors.enabled {
        router = router.cors(cfg.cors.to_cors_config());
    }
    router
}
