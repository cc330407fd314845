use claims_viewer::{AppState, ViewerConfig, build_router, telemetry::init_tracing};
use tokio::net::TcpListener;
use tracing::{error, info, warn};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    init_tracing();

    let config = match ViewerConfig::from_env() {
        Ok(config) => config,
        Err(e) => {
            error!(error = %e, "invalid configuration");
            std::process::exit(1);
        }
    };

    let page = config.build_page()?;

    // A failed initial load is shown on the page, with a retry button
    match page.init().await {
        Ok(selection) => info!(
            claims = selection.claim_numbers().count(),
            "initial claim load complete"
        ),
        Err(e) => warn!(error = %e, "initial claim load failed"),
    }

    let app = build_router(AppState { page });

    let listener = TcpListener::bind(("0.0.0.0", config.port)).await?;
    let addr = listener.local_addr()?;

    info!("Claims viewer running on http://{}", addr);
    info!("Claims backend: {}", config.api_url);

    axum::serve(listener, app).await?;

    Ok(())
}
