use std::sync::Arc;

use schedule_forms::config::AppConfig;
use schedule_forms::routes::router;
use schedule_forms::schedule_api::{CalendarPolicy, HttpTransport};
use schedule_forms::state::AppState;
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let config = AppConfig::new_from_env()?;

    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::new(
            std::env::var("RUST_LOG")
                .unwrap_or_else(|_| "schedule_forms=debug,tower_http=info".to_string()),
        ))
        .with(tracing_subscriber::fmt::layer())
        .init();

    match config.api.calendar {
        CalendarPolicy::Fixed(id) => info!("using fixed schedule calendar {}", id),
        CalendarPolicy::CallerSupplied => info!("schedule calendar is chosen per request"),
    }

    let transport = HttpTransport::new(config.api.base_url.clone(), config.http_timeout)?;
    let addr = config.bind_addr;
    let state = AppState::new(config, Arc::new(transport));

    let app = router(state);

    info!("listening on http://{}", addr);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
