use tower_http::trace::TraceLayer;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use prep_srs::{config, handlers, profiling, state::AppState};

#[tokio::main]
async fn main() {
  tracing_subscriber::registry()
    .with(
      tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| "prep_srs=debug,tower_http=debug".into()),
    )
    .with(tracing_subscriber::fmt::layer())
    .init();

  // Initialize profiling (no-op if feature disabled)
  profiling::init();

  let config = config::load();
  let bind_addr = config.server.bind_addr();

  let app = handlers::router(AppState::new(config.scheduler)).layer(TraceLayer::new_for_http());

  let listener = tokio::net::TcpListener::bind(&bind_addr)
    .await
    .unwrap_or_else(|e| panic!("Failed to bind to {}: {}", bind_addr, e));

  tracing::info!("Scheduler listening on http://{}", bind_addr);

  let server = axum::serve(listener, app).with_graceful_shutdown(shutdown_signal());
  if let Err(e) = server.await {
    tracing::error!("Server error: {}", e);
  }

  profiling::shutdown();
}

async fn shutdown_signal() {
  if let Err(e) = tokio::signal::ctrl_c().await {
    tracing::warn!("Failed to listen for shutdown signal: {}", e);
  }
  tracing::info!("Shutting down");
}
