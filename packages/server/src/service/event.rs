//! Event-wide administration: the clock, options, scoring and full reset.

use std::collections::HashSet;

use chrono::Utc;
use jury_core::ranking::{Ballot, RankedProject, aggregate_scores, borda, copeland};
use jury_core::{Clock, ClockState, Options, ProjectId};
use sea_orm::TransactionTrait;
use serde::Serialize;
use tracing::{info, instrument};

use crate::error::AppError;
use crate::models::admin::OptionsUpdate;
use crate::state::AppState;
use crate::store::Store;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ClockAction {
    Pause,
    Resume,
    Reset,
}

/// The clock after applying `action` at `now` to the persisted `state`.
fn next_clock(state: ClockState, action: ClockAction, now: i64) -> ClockState {
    let mut clock = Clock::from_state(state);
    match action {
        ClockAction::Pause => clock.pause_at(now),
        ClockAction::Resume => clock.resume_at(now),
        ClockAction::Reset => clock.reset(),
    }
    clock.state()
}

/// Apply `action` to the clock and persist the result in the options row.
///
/// Works from the locked options row so concurrent actions serialize. The
/// in-memory clock only changes after the new state is committed.
#[instrument(skip(state))]
pub async fn update_clock(state: &AppState, action: ClockAction) -> Result<ClockState, AppError> {
    let txn = state.db.begin().await?;
    let store = Store::new(&txn);
    let mut options = store.options_for_update().await?;

    options.clock = next_clock(options.clock, action, Utc::now().timestamp_millis());
    store.save_options(&options).await?;
    txn.commit().await?;

    state.clock.restore(options.clock);
    let verb = match action {
        ClockAction::Pause => "Paused",
        ClockAction::Resume => "Resumed",
        ClockAction::Reset => "Reset",
    };
    state.logger.admin(format!("{verb} the clock")).await;
    Ok(options.clock)
}

fn apply_update(options: &mut Options, update: OptionsUpdate) -> Result<(), AppError> {
    if let Some(min_views) = update.min_views {
        if min_views < 0 {
            return Err(AppError::Validation("min_views must be >= 0".into()));
        }
        options.min_views = min_views;
    }
    if let Some(num_groups) = update.num_groups {
        if num_groups < 1 {
            return Err(AppError::Validation("num_groups must be >= 1".into()));
        }
        options.num_groups = num_groups;
    }
    if let Some(group_sizes) = update.group_sizes {
        if group_sizes.iter().any(|&s| s < 1) {
            return Err(AppError::Validation("group sizes must be >= 1".into()));
        }
        options.group_sizes = group_sizes;
    }
    if let Some(categories) = update.categories {
        options.categories = categories;
    }
    if let Some(tracks) = update.tracks {
        options.tracks = tracks;
    }
    if let Some(judge_tracks) = update.judge_tracks {
        options.judge_tracks = judge_tracks;
    }
    if let Some(multi_group) = update.multi_group {
        options.multi_group = multi_group;
    }
    if let Some(clock_sync) = update.clock_sync {
        options.clock_sync = clock_sync;
    }
    if let Some(main_group) = update.main_group {
        if main_group.auto_switch_count < 0 {
            return Err(AppError::Validation("auto_switch_count must be >= 0".into()));
        }
        options.main_group = main_group;
    }
    options.normalize_groups();
    Ok(())
}

#[instrument(skip(state, update))]
pub async fn update_options(state: &AppState, update: OptionsUpdate) -> Result<Options, AppError> {
    let txn = state.db.begin().await?;
    let store = Store::new(&txn);
    let mut options = store.options_for_update().await?;
    apply_update(&mut options, update)?;
    store.save_options(&options).await?;
    txn.commit().await?;

    state.logger.admin("Updated options").await;
    Ok(options)
}

/// A project's aggregated result, joined with its display fields.
#[derive(Debug, Clone, Serialize, utoipa::ToSchema)]
pub struct ScoredProject {
    pub project_id: i32,
    pub name: String,
    pub location: i32,
    pub score: i64,
    pub stars: i64,
    pub track_stars: std::collections::BTreeMap<String, i64>,
}

/// Global Copeland scores and star tallies, best first, ties by id.
pub async fn scores(state: &AppState) -> Result<Vec<ScoredProject>, AppError> {
    let store = Store::new(&state.db);
    let projects = store.find_projects().await?;
    let judges = store.find_judges().await?;
    let mut aggregate = aggregate_scores(&judges);

    let mut out: Vec<ScoredProject> = projects
        .into_iter()
        .map(|p| {
            let s = aggregate.remove(&p.id).unwrap_or_default();
            ScoredProject {
                project_id: p.id,
                name: p.name,
                location: p.location,
                score: s.score,
                stars: s.stars,
                track_stars: s.track_stars,
            }
        })
        .collect();
    out.sort_by(|a, b| b.score.cmp(&a.score).then(a.project_id.cmp(&b.project_id)));
    Ok(out)
}

#[derive(Debug, Clone, Serialize, utoipa::ToSchema)]
pub struct Orderings {
    pub borda: Vec<RankedProject>,
    pub copeland: Vec<RankedProject>,
}

/// Borda and pairwise Copeland orderings over general judges' ballots,
/// restricted to projects that still exist.
pub async fn orderings(state: &AppState) -> Result<Orderings, AppError> {
    let store = Store::new(&state.db);
    let live: HashSet<ProjectId> = store.find_projects().await?.iter().map(|p| p.id).collect();
    let judges = store.find_judges().await?;
    let ballots: Vec<Ballot> = judges
        .iter()
        .filter(|j| !j.is_track_judge())
        .map(|j| Ballot::from_judge(j).restricted_to(&live))
        .collect();
    Ok(Orderings {
        borda: borda(&ballots),
        copeland: copeland(&ballots),
    })
}

/// Wipe every project, judge, flag and log entry and restore default options.
#[instrument(skip(state))]
pub async fn reset(state: &AppState) -> Result<(), AppError> {
    let txn = state.db.begin().await?;
    Store::new(&txn).reset_all().await?;
    txn.commit().await?;

    state.matrix.clear();
    state.clock.restore(ClockState::default());
    state.break_skips.clear();
    state.logger.clear().await;
    info!("Event data reset");
    state.logger.system("Reset all event data").await;
    Ok(())
}
