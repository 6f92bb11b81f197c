use std::sync::Arc;

use crate::config::AppConfig;
use crate::state::AppState;

pub async fn handle(config: Arc<AppConfig>) -> anyhow::Result<()> {
    tracing::info!("Starting SKYRIDERS site API in {:?} mode", config.environment);
    let state = AppState::from_config(config).await?;
    crate::app::serve(state).await
}
