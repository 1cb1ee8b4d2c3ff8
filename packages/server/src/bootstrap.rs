//! Rebuilds the in-memory state from the database at startup.

use std::sync::Arc;

use dashmap::DashMap;
use jury_core::{ComparisonMatrix, SharedClock};
use sea_orm::DatabaseConnection;
use tracing::info;

use crate::config::AppConfig;
use crate::logger::EventLogger;
use crate::state::AppState;
use crate::store::{Store, StoreResult};

/// Load options, the event log, the clock and the comparison matrix.
///
/// A missing options row is created with defaults.
pub async fn build_state(db: DatabaseConnection, config: AppConfig) -> StoreResult<AppState> {
    let store = Store::new(&db);
    let options = store.ensure_options().await?;
    let logger = EventLogger::load(db.clone()).await?;
    let clock = SharedClock::new(options.clock);

    let projects = store.find_projects().await?;
    let judges = store.find_judges().await?;
    let matrix = ComparisonMatrix::new();
    matrix.load(&projects, &judges);
    info!(
        projects = projects.len(),
        judges = judges.len(),
        clock_running = options.clock.running,
        "State restored"
    );

    logger.system("Server started").await;
    Ok(AppState {
        db,
        config,
        matrix: Arc::new(matrix),
        clock: Arc::new(clock),
        logger: Arc::new(logger),
        break_skips: Arc::new(DashMap::new()),
    })
}
