//! A judge's walk through the projects: assignment, skips, completion and
//! ranking.
//!
//! Each operation locks the judge row for its whole transaction, so two
//! requests from the same judge never interleave. The comparison matrix and
//! the break-skip table are only touched after a successful commit.

use std::collections::HashSet;

use chrono::{DateTime, Utc};
use jury_core::ranking::{judge_copeland, validate_ranking};
use jury_core::selection::{SelectionInput, select_next};
use jury_core::{
    ComparisonMatrix, CoreError, Judge, JudgeId, JudgedProject, Options, Project, ProjectId,
    SkipReason,
};
use sea_orm::{ConnectionTrait, TransactionTrait};
use tracing::{debug, instrument};

use super::{invariant, lock_judge};
use crate::error::AppError;
use crate::state::AppState;
use crate::store::{Store, StoreResult};
use crate::utils::jwt;

/// Run the selection pipeline for `judge` against committed-or-own state.
pub async fn pick_next<C: ConnectionTrait>(
    store: &Store<'_, C>,
    judge: &Judge,
    options: &Options,
    matrix: &ComparisonMatrix,
    recently_skipped: &HashSet<ProjectId>,
) -> StoreResult<Option<Project>> {
    let active = store.find_active_projects().await?;
    let flags = store.find_flags_by_judge(judge.id).await?;
    let busy = store.find_busy_projects(judge.id).await?;

    let input = SelectionInput {
        judge,
        active: &active,
        flags: &flags,
        busy: &busy,
        recently_skipped,
        options,
    };
    let picked = select_next(&input, matrix, &mut rand::rng()).cloned();
    debug!(
        judge_id = judge.id,
        candidates = active.len(),
        busy = busy.len(),
        picked = ?picked.as_ref().map(|p| p.id),
        "Selection finished"
    );
    Ok(picked)
}

/// Selection rounds per request. A round is lost when its pick is hidden or
/// deleted between the candidate read and the row lock.
const ASSIGN_ATTEMPTS: usize = 3;

/// Point `judge.current` at `project_id` and count the view, unless the project
/// was hidden or deleted since it was picked. The judge row is written by the
/// caller.
async fn assign<C: ConnectionTrait>(
    store: &Store<'_, C>,
    judge: &mut Judge,
    project_id: ProjectId,
    now: DateTime<Utc>,
) -> StoreResult<Option<Project>> {
    match store.find_project_for_update(project_id).await? {
        Some(p) if p.active => {}
        _ => return Ok(None),
    }
    let Some(project) = store.adjust_seen(project_id, &judge.track, 1, now).await? else {
        return Ok(None);
    };
    judge.current = Some(project_id);
    judge.last_activity = now;
    Ok(Some(project))
}

/// Select and assign a project to `judge`. `None` means nothing is left.
async fn assign_next<C: ConnectionTrait>(
    store: &Store<'_, C>,
    judge: &mut Judge,
    options: &Options,
    matrix: &ComparisonMatrix,
    recently_skipped: &HashSet<ProjectId>,
    now: DateTime<Utc>,
) -> StoreResult<Option<Project>> {
    for _ in 0..ASSIGN_ATTEMPTS {
        let Some(next) = pick_next(store, judge, options, matrix, recently_skipped).await? else {
            return Ok(None);
        };
        if let Some(project) = assign(store, judge, next.id, now).await? {
            return Ok(Some(project));
        }
        debug!(judge_id = judge.id, project_id = next.id, "Pick no longer available");
    }
    Ok(None)
}

/// Give the judge their next project, or return the one they already hold.
///
/// `None` means every eligible project has been exhausted.
#[instrument(skip(state))]
pub async fn pick_initial(state: &AppState, judge_id: JudgeId) -> Result<Option<Project>, AppError> {
    let txn = state.db.begin().await?;
    let store = Store::new(&txn);
    let mut judge = lock_judge(&store, judge_id).await?;

    if let Some(current) = judge.current {
        let Some(project) = store.find_project(current).await? else {
            return Err(invariant(state, &judge, current).await);
        };
        txn.commit().await?;
        return Ok(Some(project));
    }
    if !judge.active {
        return Err(AppError::Validation("Judge is not active".into()));
    }

    let options = store.ensure_options().await?;
    let recent = state.recent_breaks(judge.id);
    let assigned =
        assign_next(&store, &mut judge, &options, &state.matrix, &recent, Utc::now()).await?;
    let Some(project) = assigned else {
        txn.commit().await?;
        state.logger.judge(&judge, "has no projects left").await;
        return Ok(None);
    };
    store.update_judge(&judge).await?;
    txn.commit().await?;

    state
        .logger
        .judge(
            &judge,
            format!("was assigned {} (table {})", project.name, project.location),
        )
        .await;
    Ok(Some(project))
}

/// Leave the current project for `reason`, optionally picking a replacement
/// in the same transaction.
#[instrument(skip(state))]
pub async fn skip(
    state: &AppState,
    judge_id: JudgeId,
    reason: SkipReason,
    get_new: bool,
) -> Result<Option<Project>, AppError> {
    let txn = state.db.begin().await?;
    let store = Store::new(&txn);
    let mut judge = lock_judge(&store, judge_id).await?;
    let current = judge.current.ok_or(CoreError::NoCurrentProject)?;
    let now = Utc::now();

    if reason.records_flag() {
        store.insert_flag(judge.id, current, reason, now).await?;
    }
    judge.current = None;
    judge.last_activity = now;
    let Some(skipped) = store.adjust_seen(current, &judge.track, -1, now).await? else {
        return Err(invariant(state, &judge, current).await);
    };

    let mut next = None;
    if get_new && judge.active {
        let options = store.ensure_options().await?;
        // The project just left is only offered again if nothing else remains.
        let mut recent = state.recent_breaks(judge.id);
        recent.insert(current);
        next = assign_next(&store, &mut judge, &options, &state.matrix, &recent, now).await?;
    }
    store.update_judge(&judge).await?;
    txn.commit().await?;

    if reason == SkipReason::Break {
        state.break_skips.entry(judge.id).or_default().insert(current);
    }
    state
        .logger
        .judge(&judge, format!("skipped {} ({})", skipped.name, reason))
        .await;
    if let Some(p) = &next {
        state
            .logger
            .judge(&judge, format!("was assigned {} (table {})", p.name, p.location))
            .await;
    }
    Ok(next)
}

/// Complete the current project: snapshot it into the judge's history, clear
/// `current`, and record the new pairs in the comparison matrix.
#[instrument(skip(state, notes))]
pub async fn vote(
    state: &AppState,
    judge_id: JudgeId,
    starred: bool,
    notes: String,
) -> Result<Judge, AppError> {
    let txn = state.db.begin().await?;
    let store = Store::new(&txn);
    let mut judge = lock_judge(&store, judge_id).await?;
    let current = judge.current.ok_or(CoreError::NoCurrentProject)?;
    if judge.has_seen(current) {
        return Err(CoreError::AlreadyJudged(current).into());
    }
    let Some(mut project) = store.find_project_for_update(current).await? else {
        return Err(invariant(state, &judge, current).await);
    };

    let now = Utc::now();
    let seen_prev = judge.seen_ids();
    judge
        .seen_projects
        .push(JudgedProject::snapshot(&project, starred, notes));
    judge.current = None;
    judge.last_activity = now;
    judge.rankings_agg = judge_copeland(&judge.rankings, &judge.unranked());

    let options = store.ensure_options().await?;
    judge.group = options.group_after_completion(judge.group, judge.seen_projects.len());

    if starred && judge.is_track_judge() {
        *project.track_stars.entry(judge.track.clone()).or_default() += 1;
    }
    project.last_activity = now;
    store.update_project(&project).await?;
    store.update_judge(&judge).await?;
    txn.commit().await?;

    state.matrix.record(&seen_prev, current);
    state.break_skips.remove(&judge.id);
    state
        .logger
        .judge(
            &judge,
            format!(
                "finished {}{}",
                project.name,
                if starred { " (starred)" } else { "" }
            ),
        )
        .await;
    Ok(judge)
}

/// Replace the judge's ranking and recompute their Copeland scores.
#[instrument(skip(state))]
pub async fn rank(
    state: &AppState,
    judge_id: JudgeId,
    ranking: Vec<ProjectId>,
) -> Result<Judge, AppError> {
    let txn = state.db.begin().await?;
    let store = Store::new(&txn);
    let mut judge = lock_judge(&store, judge_id).await?;
    validate_ranking(&judge, &ranking)?;

    judge.rankings = ranking;
    judge.rankings_agg = judge_copeland(&judge.rankings, &judge.unranked());
    judge.last_activity = Utc::now();
    store.update_judge(&judge).await?;
    txn.commit().await?;

    state
        .logger
        .judge(&judge, format!("updated rankings {:?}", judge.rankings))
        .await;
    Ok(judge)
}

/// Change the star on a project the judge has already completed.
#[instrument(skip(state))]
pub async fn set_star(
    state: &AppState,
    judge_id: JudgeId,
    project_id: ProjectId,
    starred: bool,
) -> Result<(), AppError> {
    let txn = state.db.begin().await?;
    let store = Store::new(&txn);
    let mut judge = lock_judge(&store, judge_id).await?;
    let track = judge.track.clone();
    let entry = judge
        .seen_project_mut(project_id)
        .ok_or(CoreError::RankingNotSeen(project_id))?;
    if entry.starred == starred {
        return Ok(());
    }
    entry.starred = starred;

    if !track.is_empty()
        && let Some(mut project) = store.find_project_for_update(project_id).await?
    {
        let n = project.track_stars.entry(track).or_default();
        *n = (*n + if starred { 1 } else { -1 }).max(0);
        store.update_project(&project).await?;
    }
    store.update_judge(&judge).await?;
    txn.commit().await?;
    Ok(())
}

#[instrument(skip(state, notes))]
pub async fn set_notes(
    state: &AppState,
    judge_id: JudgeId,
    project_id: ProjectId,
    notes: String,
) -> Result<(), AppError> {
    let txn = state.db.begin().await?;
    let store = Store::new(&txn);
    let mut judge = lock_judge(&store, judge_id).await?;
    judge
        .seen_project_mut(project_id)
        .ok_or(CoreError::RankingNotSeen(project_id))?
        .notes = notes;
    store.update_judge(&judge).await?;
    txn.commit().await?;
    Ok(())
}

/// Exchange a login code for a fresh bearer token.
#[instrument(skip(state, code))]
pub async fn login(state: &AppState, code: &str) -> Result<(Judge, String), AppError> {
    let txn = state.db.begin().await?;
    let store = Store::new(&txn);
    let found = store
        .find_judge_by_code(code.trim())
        .await?
        .ok_or(AppError::InvalidCredentials)?;
    let mut judge = lock_judge(&store, found.id).await?;

    let token = jwt::sign(judge.id, &judge.name, &state.config.auth.token_secret)
        .map_err(|e| AppError::Internal(e.to_string()))?;
    judge.token = token.clone();
    judge.last_activity = Utc::now();
    store.update_judge(&judge).await?;
    txn.commit().await?;

    state.logger.judge(&judge, "logged in").await;
    Ok((judge, token))
}

/// Mark the welcome screen as read. Repeated calls have no further effect.
#[instrument(skip(state))]
pub async fn set_read_welcome(state: &AppState, judge_id: JudgeId) -> Result<(), AppError> {
    let txn = state.db.begin().await?;
    let store = Store::new(&txn);
    let mut judge = lock_judge(&store, judge_id).await?;
    if !judge.read_welcome {
        judge.read_welcome = true;
        store.update_judge(&judge).await?;
    }
    txn.commit().await?;
    Ok(())
}
