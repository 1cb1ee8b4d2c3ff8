//! Rank aggregation over per-judge preference lists.

use std::collections::{BTreeMap, HashSet};

use serde::Serialize;

use crate::error::CoreError;
use crate::types::{Judge, ProjectId};

/// One judge's ordered preferences plus the seen projects they left unranked.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Ballot {
    pub ranked: Vec<ProjectId>,
    pub unranked: Vec<ProjectId>,
}

impl Ballot {
    pub fn from_judge(judge: &Judge) -> Self {
        Self {
            ranked: judge.rankings.clone(),
            unranked: judge.unranked(),
        }
    }

    /// Drop every project not in `live`, keeping the relative order.
    pub fn restricted_to(mut self, live: &HashSet<ProjectId>) -> Self {
        self.ranked.retain(|id| live.contains(id));
        self.unranked.retain(|id| live.contains(id));
        self
    }
}

/// A project and its aggregate score.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, utoipa::ToSchema)]
pub struct RankedProject {
    pub project_id: ProjectId,
    pub score: i64,
}

/// Aggregated results for a single project across all judges.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, utoipa::ToSchema)]
pub struct ProjectScore {
    /// Sum of general judges' per-judge Copeland scores.
    pub score: i64,
    /// Stars from general judges.
    pub stars: i64,
    /// Stars from track judges, keyed by track.
    pub track_stars: BTreeMap<String, i64>,
}

/// Check that `ranking` lists distinct projects the judge has seen.
pub fn validate_ranking(judge: &Judge, ranking: &[ProjectId]) -> Result<(), CoreError> {
    let mut dedup = HashSet::new();
    for &id in ranking {
        if !dedup.insert(id) {
            return Err(CoreError::DuplicateRanking(id));
        }
        if !judge.has_seen(id) {
            return Err(CoreError::RankingNotSeen(id));
        }
    }
    Ok(())
}

/// Per-judge Copeland scores.
///
/// The i-th of `rc` ranked projects beats every later ranked project and every
/// unranked one, and loses to every earlier one, giving `rc + uc - 1 - 2i`.
/// Unranked projects lose to all ranked ones and tie among themselves: `-rc`.
pub fn judge_copeland(ranked: &[ProjectId], unranked: &[ProjectId]) -> BTreeMap<ProjectId, i64> {
    let rc = ranked.len() as i64;
    let uc = unranked.len() as i64;

    let mut scores = BTreeMap::new();
    for (i, &id) in ranked.iter().enumerate() {
        scores.insert(id, rc + uc - 1 - 2 * i as i64);
    }
    for &id in unranked {
        scores.insert(id, -rc);
    }
    scores
}

fn into_ordering(totals: BTreeMap<ProjectId, i64>) -> Vec<RankedProject> {
    let mut out: Vec<RankedProject> = totals
        .into_iter()
        .map(|(project_id, score)| RankedProject { project_id, score })
        .collect();
    // BTreeMap iteration is already id-ascending, and the sort is stable.
    out.sort_by(|a, b| b.score.cmp(&a.score));
    out
}

/// Borda count: position `i` of an `n`-long ranking earns `n - i` points.
pub fn borda(ballots: &[Ballot]) -> Vec<RankedProject> {
    let mut totals: BTreeMap<ProjectId, i64> = BTreeMap::new();
    for ballot in ballots {
        let n = ballot.ranked.len() as i64;
        for (i, &id) in ballot.ranked.iter().enumerate() {
            *totals.entry(id).or_default() += n - i as i64;
        }
    }
    into_ordering(totals)
}

/// Pairwise Copeland: every ranked project beats each later ranked project and
/// every unranked project; each comparison adds one to the winner and removes
/// one from the loser.
pub fn copeland(ballots: &[Ballot]) -> Vec<RankedProject> {
    let mut totals: BTreeMap<ProjectId, i64> = BTreeMap::new();
    for ballot in ballots {
        for &id in ballot.unranked.iter() {
            totals.entry(id).or_default();
        }
        for (i, &winner) in ballot.ranked.iter().enumerate() {
            let losers = ballot.ranked[i + 1..].iter().chain(ballot.unranked.iter());
            for &loser in losers {
                *totals.entry(winner).or_default() += 1;
                *totals.entry(loser).or_default() -= 1;
            }
            totals.entry(winner).or_default();
        }
    }
    into_ordering(totals)
}

/// Global scores: Copeland sums and stars from general judges, star tallies per
/// track from track judges.
pub fn aggregate_scores(judges: &[Judge]) -> BTreeMap<ProjectId, ProjectScore> {
    let mut out: BTreeMap<ProjectId, ProjectScore> = BTreeMap::new();
    for judge in judges {
        for seen in &judge.seen_projects {
            let entry = out.entry(seen.project_id).or_default();
            if !seen.starred {
                continue;
            }
            if judge.is_track_judge() {
                *entry.track_stars.entry(judge.track.clone()).or_default() += 1;
            } else {
                entry.stars += 1;
            }
        }
        if judge.is_track_judge() {
            continue;
        }
        for (&id, &score) in &judge.rankings_agg {
            out.entry(id).or_default().score += score;
        }
    }
    out
}
