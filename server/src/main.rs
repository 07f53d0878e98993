use dotenvy::dotenv;
use tokio::net::TcpListener;
use tracing_subscriber::EnvFilter;

use helper_server::config::Config;
use helper_server::routes::create_routes;
use helper_server::state::{AppState, StartupError};

const DEFAULT_LOG_FILTER: &str = "helper_server=info,tower_http=info";

#[tokio::main]
async fn main() -> Result<(), StartupError> {
    dotenv().ok();
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(DEFAULT_LOG_FILTER)),
        )
        .init();

    let config = Config::from_env()?;
    let state = AppState::from_config(&config).await?;
    tracing::info!("Application state ready");

    let app = create_routes(state, &config.http);

    let listener = TcpListener::bind(config.bind_addr).await?;
    tracing::info!("🚀 Server running at http://{}", config.bind_addr);

    axum::serve(listener, app).await?;
    Ok(())
}
