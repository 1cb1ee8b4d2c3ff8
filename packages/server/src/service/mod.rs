//! Transactional operations behind the HTTP handlers.

pub mod catalog;
pub mod event;
pub mod judging;

use jury_core::{Judge, JudgeId, ProjectId};
use sea_orm::ConnectionTrait;

use crate::error::AppError;
use crate::state::AppState;
use crate::store::Store;

/// Load and row-lock a judge for the rest of the transaction.
pub(crate) async fn lock_judge<C: ConnectionTrait>(
    store: &Store<'_, C>,
    judge_id: JudgeId,
) -> Result<Judge, AppError> {
    store
        .find_judge_for_update(judge_id)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("Judge {judge_id} not found")))
}

/// Report a judge whose `current` points at a project that no longer exists.
pub(crate) async fn invariant(state: &AppState, judge: &Judge, project_id: ProjectId) -> AppError {
    let msg = format!(
        "judge {} is assigned project {} which does not exist",
        judge.id, project_id
    );
    state.logger.system(&msg).await;
    AppError::Invariant(msg)
}
