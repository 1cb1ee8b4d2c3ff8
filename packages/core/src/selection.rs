//! Layered candidate filter that decides which project a judge sees next.
//!
//! Hard filters remove projects the judge must never see again. Soft filters
//! (busy, priority, recent breaks) narrow the pool only while it stays
//! non-empty. Among the remaining projects the least-seen ones win; below
//! `min_views` a uniform random pick spreads views, above it the comparison
//! matrix picks the project with the least overlap with what the judge has
//! already seen.

use std::collections::HashSet;

use rand::Rng;
use rand::seq::SliceRandom;
use tracing::debug;

use crate::matrix::ComparisonMatrix;
use crate::options::Options;
use crate::types::{Flag, Judge, Project, ProjectId};

/// Everything the selection step needs, already fetched from the store.
pub struct SelectionInput<'a> {
    pub judge: &'a Judge,
    /// All active projects.
    pub active: &'a [Project],
    /// Flags this judge has filed.
    pub flags: &'a [Flag],
    /// Projects that are some other judge's `current`.
    pub busy: &'a HashSet<ProjectId>,
    /// Projects this judge recently left for a break.
    pub recently_skipped: &'a HashSet<ProjectId>,
    pub options: &'a Options,
}

/// Keep the subset matching `pred` unless it is empty.
fn soft_filter<'a>(
    pool: Vec<&'a Project>,
    pred: impl Fn(&Project) -> bool,
) -> Vec<&'a Project> {
    let narrowed: Vec<&Project> = pool.iter().copied().filter(|p| pred(p)).collect();
    if narrowed.is_empty() { pool } else { narrowed }
}

/// Projects the judge is still allowed to see: active, unseen, not hard-flagged,
/// within their track and group scope.
pub fn eligible_projects<'a>(input: &SelectionInput<'a>) -> Vec<&'a Project> {
    let judge = input.judge;
    let mut done: HashSet<ProjectId> = judge.seen_ids().into_iter().collect();
    done.extend(
        input
            .flags
            .iter()
            .filter(|f| f.is_hard())
            .map(|f| f.project_id),
    );

    let scoped_to_track = input.options.judge_tracks && judge.is_track_judge();
    let unseen: Vec<&Project> = input
        .active
        .iter()
        .filter(|p| p.active && !done.contains(&p.id))
        .filter(|p| !scoped_to_track || p.in_track(&judge.track))
        .collect();

    if input.options.multi_group {
        // Another group's tables only when this group has nothing left.
        soft_filter(unseen, |p| p.group == judge.group)
    } else {
        unseen
    }
}

/// Pick the next project for `input.judge`, or `None` if nothing is left.
pub fn select_next<'a, R: Rng + ?Sized>(
    input: &SelectionInput<'a>,
    matrix: &ComparisonMatrix,
    rng: &mut R,
) -> Option<&'a Project> {
    let candidates = eligible_projects(input);
    if candidates.is_empty() {
        debug!(judge_id = input.judge.id, "No eligible projects left");
        return None;
    }

    let candidates = soft_filter(candidates, |p| !input.busy.contains(&p.id));
    let candidates = soft_filter(candidates, |p| p.prioritized);
    let candidates = soft_filter(candidates, |p| !input.recently_skipped.contains(&p.id));

    let track = input.judge.track.as_str();
    let min_seen = candidates.iter().map(|p| p.seen_for(track)).min()?;
    let mut fewest: Vec<&Project> = candidates
        .into_iter()
        .filter(|p| p.seen_for(track) == min_seen)
        .collect();

    if fewest.len() == 1 {
        return fewest.pop();
    }

    fewest.shuffle(rng);
    if min_seen < input.options.min_views {
        return fewest.into_iter().next();
    }

    let ids: Vec<ProjectId> = fewest.iter().map(|p| p.id).collect();
    let picked = matrix.find_least_compared(&ids, &input.judge.seen_ids())?;
    fewest.into_iter().find(|p| p.id == picked)
}
