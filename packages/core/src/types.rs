use std::collections::{BTreeMap, HashSet};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::skip_reason::SkipReason;

pub type ProjectId = i32;
pub type JudgeId = i32;

/// A hackathon submission located at a physical table.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize, utoipa::ToSchema)]
pub struct Project {
    pub id: ProjectId,
    pub name: String,
    /// Table number, unique within the project's group.
    pub location: i32,
    pub group: i32,
    pub description: String,
    pub url: String,
    pub try_link: String,
    pub video_link: String,
    /// Tracks (challenges) the project opted into.
    pub challenge_list: Vec<String>,
    /// Inactive projects are never offered to judges.
    pub active: bool,
    pub prioritized: bool,
    /// Assignments by general judges that were not skipped.
    pub seen: i32,
    /// Per-track equivalent of `seen`, for track judges.
    pub track_seen: BTreeMap<String, i32>,
    pub track_stars: BTreeMap<String, i32>,
    #[serde(with = "chrono::serde::ts_milliseconds")]
    #[schema(value_type = i64)]
    pub last_activity: DateTime<Utc>,
}

impl Project {
    /// How many times this project has been assigned, from the point of view of `track`.
    ///
    /// An empty track means a general judge.
    pub fn seen_for(&self, track: &str) -> i32 {
        if track.is_empty() {
            self.seen
        } else {
            self.track_seen.get(track).copied().unwrap_or(0)
        }
    }

    pub fn in_track(&self, track: &str) -> bool {
        self.challenge_list.iter().any(|c| c == track)
    }
}

/// Snapshot of a project at the moment a judge completed it.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize, utoipa::ToSchema)]
pub struct JudgedProject {
    pub project_id: ProjectId,
    pub name: String,
    pub location: i32,
    pub description: String,
    pub starred: bool,
    pub notes: String,
}

impl JudgedProject {
    pub fn snapshot(project: &Project, starred: bool, notes: impl Into<String>) -> Self {
        Self {
            project_id: project.id,
            name: project.name.clone(),
            location: project.location,
            description: project.description.clone(),
            starred,
            notes: notes.into(),
        }
    }
}

/// A human evaluator.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize, utoipa::ToSchema)]
pub struct Judge {
    pub id: JudgeId,
    pub name: String,
    pub email: String,
    pub notes: String,
    /// 6-digit login code.
    pub code: String,
    /// Bearer token issued at login; empty until the judge logs in.
    pub token: String,
    pub active: bool,
    pub read_welcome: bool,
    /// Empty for a general judge.
    pub track: String,
    pub group: i32,
    /// Project the judge is currently assigned to.
    pub current: Option<ProjectId>,
    /// Completed projects, in completion order.
    pub seen_projects: Vec<JudgedProject>,
    /// Ordered preference over a subset of `seen_projects`.
    pub rankings: Vec<ProjectId>,
    /// Per-judge Copeland scores derived from `rankings`.
    pub rankings_agg: BTreeMap<ProjectId, i64>,
    #[serde(with = "chrono::serde::ts_milliseconds")]
    #[schema(value_type = i64)]
    pub last_activity: DateTime<Utc>,
}

impl Judge {
    pub fn is_track_judge(&self) -> bool {
        !self.track.is_empty()
    }

    pub fn seen_ids(&self) -> Vec<ProjectId> {
        self.seen_projects.iter().map(|p| p.project_id).collect()
    }

    pub fn has_seen(&self, project_id: ProjectId) -> bool {
        self.seen_projects.iter().any(|p| p.project_id == project_id)
    }

    pub fn seen_project_mut(&mut self, project_id: ProjectId) -> Option<&mut JudgedProject> {
        self.seen_projects
            .iter_mut()
            .find(|p| p.project_id == project_id)
    }

    /// Seen projects that are not in `rankings`, in completion order.
    pub fn unranked(&self) -> Vec<ProjectId> {
        let ranked: HashSet<ProjectId> = self.rankings.iter().copied().collect();
        self.seen_projects
            .iter()
            .map(|p| p.project_id)
            .filter(|id| !ranked.contains(id))
            .collect()
    }
}

/// Durable record of a judge skipping or reporting a project.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize, utoipa::ToSchema)]
pub struct Flag {
    pub id: i32,
    pub project_id: ProjectId,
    pub judge_id: JudgeId,
    pub reason: SkipReason,
    #[serde(with = "chrono::serde::ts_milliseconds")]
    #[schema(value_type = i64)]
    pub time: DateTime<Utc>,
}

impl Flag {
    pub fn is_hard(&self) -> bool {
        self.reason.is_hard()
    }
}
