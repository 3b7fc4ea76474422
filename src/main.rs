use std::sync::Arc;

use classroom::{config, routes, state, ClassroomService};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "classroom=info,tower_http=info".into()),
        )
        .init();

    let config = config::Config::from_env()?;
    let config = Arc::new(config);

    let service = ClassroomService::from_config(&config).await?;

    let state = Arc::new(state::AppState {
        service: Arc::new(service),
    });

    let app = routes::router(state);

    let addr = config.bind_addr();
    tracing::info!("classroom listening on http://{}", addr);

    let listener = tokio::net::TcpListener::bind(&addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
