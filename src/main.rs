mod config;
mod exec;
mod rooms;
mod routes;
mod state;
mod ws;

use tokio::net::TcpListener;

use config::{generate_config_template, Config};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Load config with layered precedence: defaults < TOML < env < CLI
    let config = Config::load()?;

    // Handle --generate-config: print template and exit
    if config.generate_config {
        print!("{}", generate_config_template());
        return Ok(());
    }

    // Initialize tracing/logging
    if config.json_logs {
        tracing_subscriber::fmt()
            .json()
            .with_env_filter(
                tracing_subscriber::EnvFilter::try_from_default_env()
                    .unwrap_or_else(|_| "syncpad_server=info".parse().unwrap()),
            )
            .init();
    } else {
        tracing_subscriber::fmt()
            .pretty()
            .with_env_filter(
                tracing_subscriber::EnvFilter::try_from_default_env()
                    .unwrap_or_else(|_| "syncpad_server=info".parse().unwrap()),
            )
            .init();
    }

    tracing::info!("syncpad server v{} starting", env!("CARGO_PKG_VERSION"));

    if config.judge_api_key.is_empty() {
        tracing::warn!(
            "No judge API key configured (SYNCPAD_JUDGE_API_KEY); /run will fail upstream"
        );
    }

    // Outbound judge client. The timeout bounds the whole wait-for-verdict
    // call so a hung judge cannot pin a client request forever.
    let http = reqwest::Client::builder()
        .timeout(std::time::Duration::from_secs(config.exec_timeout_secs))
        .build()?;

    // Build application state
    let app_state = state::AppState {
        connections: ws::new_connection_registry(),
        rooms: rooms::new_shared_rooms(),
        http,
        judge_url: config.judge_url.clone(),
        judge_api_key: config.judge_api_key.clone(),
        allowed_origins: config.allowed_origins.clone(),
    };

    // Build router
    let app = routes::build_router(app_state);

    // Bind and serve
    let addr = format!("{}:{}", config.bind_address, config.port);
    let listener = TcpListener::bind(&addr).await?;
    tracing::info!("Listening on {}", addr);

    axum::serve(listener, app).await?;

    Ok(())
}
