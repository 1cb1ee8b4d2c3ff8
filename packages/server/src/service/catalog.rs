//! Admin management of projects and judges.

use chrono::Utc;
use jury_core::{Judge, JudgeId, Project, ProjectId};
use sea_orm::{ConnectionTrait, TransactionTrait};
use tracing::{info, instrument};

use super::lock_judge;
use crate::error::AppError;
use crate::state::AppState;
use crate::store::{NewJudge, NewProject, Store};
use crate::utils::code::generate_code;

/// Attempts at drawing an unused judge code before giving up.
const CODE_ATTEMPTS: usize = 100;

fn validate_project(draft: &NewProject) -> Result<(), AppError> {
    if draft.name.trim().is_empty() {
        return Err(AppError::Validation("Project name is required".into()));
    }
    Ok(())
}

fn validate_judge(draft: &NewJudge) -> Result<(), AppError> {
    if draft.name.trim().is_empty() {
        return Err(AppError::Validation("Judge name is required".into()));
    }
    Ok(())
}

async fn unused_code<C: ConnectionTrait>(store: &Store<'_, C>) -> Result<String, AppError> {
    for _ in 0..CODE_ATTEMPTS {
        let code = generate_code(&mut rand::rng());
        if !store.code_in_use(&code).await? {
            return Ok(code);
        }
    }
    Err(AppError::Internal("could not allocate a unique judge code".into()))
}

// ---- projects -----------------------------------------------------------

/// Insert projects in one transaction, giving each the next free table.
#[instrument(skip(state, drafts), fields(count = drafts.len()))]
pub async fn add_projects(
    state: &AppState,
    drafts: Vec<NewProject>,
) -> Result<Vec<Project>, AppError> {
    for draft in &drafts {
        validate_project(draft)?;
    }

    let txn = state.db.begin().await?;
    let store = Store::new(&txn);
    let mut options = store.options_for_update().await?;
    let mut created = Vec::with_capacity(drafts.len());
    for draft in drafts {
        let (group, location) = options.assign_table();
        created.push(store.insert_project(draft, group, location).await?);
    }
    store.save_options(&options).await?;
    txn.commit().await?;

    for p in &created {
        state.matrix.add(p.id);
    }
    match created.as_slice() {
        [p] => {
            state
                .logger
                .admin(format!("Added project {} at table {}", p.name, p.location))
                .await
        }
        many => state.logger.admin(format!("Added {} projects", many.len())).await,
    }
    Ok(created)
}

pub async fn add_project(state: &AppState, draft: NewProject) -> Result<Project, AppError> {
    add_projects(state, vec![draft])
        .await?
        .pop()
        .ok_or_else(|| AppError::Internal("project insert returned nothing".into()))
}

/// Remove a project, releasing any judge currently assigned to it.
#[instrument(skip(state))]
pub async fn delete_project(state: &AppState, id: ProjectId) -> Result<(), AppError> {
    let txn = state.db.begin().await?;
    let store = Store::new(&txn);
    // Holders are locked before the project row, the order judging requests
    // use. Re-reading them under the project lock picks up assignments that
    // committed while this transaction waited for it.
    store.find_judges_holding_for_update(id).await?;
    if store.find_project_for_update(id).await?.is_none() {
        return Err(AppError::Internal(format!("Project {id} not found")));
    }
    for mut judge in store.find_judges_holding_for_update(id).await? {
        judge.current = None;
        store.update_judge(&judge).await?;
    }
    store.delete_project(id).await?;
    txn.commit().await?;

    state.matrix.remove(id);
    state.logger.admin(format!("Deleted project {id}")).await;
    Ok(())
}

/// Hide or show a project. Hiding releases judges currently assigned to it.
#[instrument(skip(state))]
pub async fn set_project_active(
    state: &AppState,
    id: ProjectId,
    active: bool,
) -> Result<Project, AppError> {
    let txn = state.db.begin().await?;
    let store = Store::new(&txn);
    // Same lock order as `delete_project`.
    if !active {
        store.find_judges_holding_for_update(id).await?;
    }
    let mut project = store
        .find_project_for_update(id)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("Project {id} not found")))?;
    let holders = if active {
        Vec::new()
    } else {
        store.find_judges_holding_for_update(id).await?
    };

    let now = Utc::now();
    for mut judge in holders {
        judge.current = None;
        judge.last_activity = now;
        if judge.track.is_empty() {
            project.seen = (project.seen - 1).max(0);
        } else {
            let n = project.track_seen.entry(judge.track.clone()).or_default();
            *n = (*n - 1).max(0);
        }
        store.update_judge(&judge).await?;
    }
    project.active = active;
    project.last_activity = now;
    store.update_project(&project).await?;
    txn.commit().await?;

    let verb = if active { "Unhid" } else { "Hid" };
    state
        .logger
        .admin(format!("{verb} project {}", project.name))
        .await;
    Ok(project)
}

#[instrument(skip(state))]
pub async fn set_project_prioritized(
    state: &AppState,
    id: ProjectId,
    prioritized: bool,
) -> Result<Project, AppError> {
    let txn = state.db.begin().await?;
    let store = Store::new(&txn);
    let mut project = store
        .find_project_for_update(id)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("Project {id} not found")))?;
    project.prioritized = prioritized;
    store.update_project(&project).await?;
    txn.commit().await?;

    let verb = if prioritized { "Prioritized" } else { "Unprioritized" };
    state
        .logger
        .admin(format!("{verb} project {}", project.name))
        .await;
    Ok(project)
}

// ---- judges -------------------------------------------------------------

/// Insert judges in one transaction, each with a fresh login code.
#[instrument(skip(state, drafts), fields(count = drafts.len()))]
pub async fn add_judges(state: &AppState, drafts: Vec<NewJudge>) -> Result<Vec<Judge>, AppError> {
    for draft in &drafts {
        validate_judge(draft)?;
    }

    let txn = state.db.begin().await?;
    let store = Store::new(&txn);
    let options = store.ensure_options().await?;
    let mut created = Vec::with_capacity(drafts.len());
    for draft in drafts {
        options.validate_group(draft.group)?;
        let code = unused_code(&store).await?;
        created.push(store.insert_judge(draft, code).await?);
    }
    txn.commit().await?;

    match created.as_slice() {
        [j] => state.logger.admin(format!("Added judge {}", j.name)).await,
        many => state.logger.admin(format!("Added {} judges", many.len())).await,
    }
    Ok(created)
}

pub async fn add_judge(state: &AppState, draft: NewJudge) -> Result<Judge, AppError> {
    add_judges(state, vec![draft])
        .await?
        .pop()
        .ok_or_else(|| AppError::Internal("judge insert returned nothing".into()))
}

/// Remove a judge, releasing their assignment and withdrawing their pairs
/// from the comparison matrix.
#[instrument(skip(state))]
pub async fn delete_judge(state: &AppState, id: JudgeId) -> Result<(), AppError> {
    let txn = state.db.begin().await?;
    let store = Store::new(&txn);
    let judge = store
        .find_judge_for_update(id)
        .await?
        .ok_or_else(|| AppError::Internal(format!("Judge {id} not found")))?;
    if let Some(current) = judge.current {
        store
            .adjust_seen(current, &judge.track, -1, Utc::now())
            .await?;
    }
    store.delete_judge(id).await?;
    txn.commit().await?;

    state.matrix.forget(&judge.seen_ids());
    state.break_skips.remove(&id);
    info!(judge_id = id, "Judge deleted");
    state.logger.admin(format!("Deleted judge {}", judge.name)).await;
    Ok(())
}

/// Hide or show a judge. Hiding releases their current assignment.
#[instrument(skip(state))]
pub async fn set_judge_active(
    state: &AppState,
    id: JudgeId,
    active: bool,
) -> Result<Judge, AppError> {
    let txn = state.db.begin().await?;
    let store = Store::new(&txn);
    let mut judge = lock_judge(&store, id).await?;
    judge.active = active;
    if !active && let Some(current) = judge.current.take() {
        store
            .adjust_seen(current, &judge.track, -1, Utc::now())
            .await?;
    }
    store.update_judge(&judge).await?;
    txn.commit().await?;

    let verb = if active { "Unhid" } else { "Hid" };
    state
        .logger
        .admin(format!("{verb} judge {}", judge.name))
        .await;
    Ok(judge)
}
