use std::collections::HashSet;
use std::sync::Arc;

use dashmap::DashMap;
use jury_core::{ComparisonMatrix, JudgeId, ProjectId, SharedClock};
use sea_orm::DatabaseConnection;

use crate::config::AppConfig;
use crate::logger::EventLogger;

#[derive(Clone)]
pub struct AppState {
    pub db: DatabaseConnection,
    pub config: AppConfig,
    pub matrix: Arc<ComparisonMatrix>,
    pub clock: Arc<SharedClock>,
    pub logger: Arc<EventLogger>,
    /// Projects each judge left with a `break` skip since their last completion.
    pub break_skips: Arc<DashMap<JudgeId, HashSet<ProjectId>>>,
}

impl AppState {
    /// Snapshot of the judge's break-skipped projects.
    pub fn recent_breaks(&self, judge_id: JudgeId) -> HashSet<ProjectId> {
        self.break_skips
            .get(&judge_id)
            .map(|set| set.clone())
            .unwrap_or_default()
    }
}
