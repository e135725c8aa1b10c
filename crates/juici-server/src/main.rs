use juici::service::MockResponseService;
use juici_server::{configuration::Settings, routes, state::AppState};
use tracing::info;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| "info".into()))
        .init();

    let settings = Settings::new()?;

    let service = MockResponseService::new(settings.mock.to_mock_settings());
    let state = AppState::new(service, settings.mock.upload_limit_bytes);
    let app = routes::configure(state);

    let listener = tokio::net::TcpListener::bind(settings.server.socket_addr()?).await?;
    info!("listening on {}", listener.local_addr()?);

    axum::serve(listener, app).await?;
    Ok(())
}
