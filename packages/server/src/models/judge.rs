use std::collections::BTreeMap;

use jury_core::{Judge, JudgedProject, Project, SkipReason};
use serde::{Deserialize, Serialize};

use crate::error::AppError;
use crate::models::shared::required_text;
use crate::store::NewJudge;

/// Request body for judge login.
#[derive(Deserialize, utoipa::ToSchema)]
pub struct JudgeLoginRequest {
    /// Six-digit login code handed out by the organizers.
    #[schema(example = "042917")]
    pub code: String,
}

#[derive(Serialize, utoipa::ToSchema)]
pub struct JudgeLoginResponse {
    pub ok: u8,
    /// Bearer token for subsequent judge requests.
    pub token: String,
}

#[derive(Serialize, utoipa::ToSchema)]
pub struct WelcomeResponse {
    pub ok: u8,
    pub read_welcome: bool,
}

/// Request body for adding a single judge.
#[derive(Deserialize, utoipa::ToSchema)]
pub struct NewJudgeRequest {
    #[schema(example = "Ada Lovelace")]
    pub name: String,
    #[serde(default)]
    #[schema(example = "ada@example.com")]
    pub email: String,
    #[serde(default)]
    pub notes: String,
    /// Track the judge is scoped to; empty for a general judge.
    #[serde(default)]
    pub track: String,
    #[serde(default)]
    pub group: i32,
}

impl NewJudgeRequest {
    pub fn validate(self) -> Result<NewJudge, AppError> {
        if self.group < 0 {
            return Err(AppError::Validation("Group must be >= 0".into()));
        }
        Ok(NewJudge {
            name: required_text(&self.name, "Name", 256)?,
            email: self.email.trim().to_string(),
            notes: self.notes,
            track: self.track.trim().to_string(),
            group: self.group,
        })
    }
}

/// A judge as seen by admins and by the judge themselves. The bearer token is never exposed.
#[derive(Serialize, utoipa::ToSchema)]
pub struct JudgeResponse {
    pub id: i32,
    pub name: String,
    pub email: String,
    pub notes: String,
    pub code: String,
    pub active: bool,
    pub read_welcome: bool,
    pub track: String,
    pub group: i32,
    pub current: Option<i32>,
    pub seen: usize,
    pub seen_projects: Vec<JudgedProject>,
    pub rankings: Vec<i32>,
    pub rankings_agg: BTreeMap<i32, i64>,
    /// Milliseconds since the Unix epoch.
    pub last_activity: i64,
}

impl From<Judge> for JudgeResponse {
    fn from(j: Judge) -> Self {
        Self {
            seen: j.seen_projects.len(),
            id: j.id,
            name: j.name,
            email: j.email,
            notes: j.notes,
            code: j.code,
            active: j.active,
            read_welcome: j.read_welcome,
            track: j.track,
            group: j.group,
            current: j.current,
            seen_projects: j.seen_projects,
            rankings: j.rankings,
            rankings_agg: j.rankings_agg,
            last_activity: j.last_activity.timestamp_millis(),
        }
    }
}

/// The project a judge should walk to next.
#[derive(Serialize, utoipa::ToSchema)]
pub struct AssignmentResponse {
    pub ok: u8,
    /// True when every eligible project has been judged or flagged.
    pub no_more: bool,
    pub project: Option<Project>,
}

impl From<Option<Project>> for AssignmentResponse {
    fn from(project: Option<Project>) -> Self {
        Self {
            ok: 1,
            no_more: project.is_none(),
            project,
        }
    }
}

#[derive(Deserialize, utoipa::ToSchema)]
pub struct SkipRequest {
    pub reason: SkipReason,
    /// Assign a replacement project in the same step.
    #[serde(default)]
    pub get_new: bool,
}

#[derive(Deserialize, utoipa::ToSchema)]
pub struct FinishRequest {
    #[serde(default)]
    pub starred: bool,
    #[serde(default)]
    pub notes: String,
}

#[derive(Deserialize, utoipa::ToSchema)]
pub struct RankRequest {
    /// Project ids, best first. Must be distinct projects the judge has seen.
    #[schema(example = json!([12, 4, 9]))]
    pub ranking: Vec<i32>,
}

#[derive(Deserialize, utoipa::ToSchema)]
pub struct StarRequest {
    pub starred: bool,
}

#[derive(Deserialize, utoipa::ToSchema)]
pub struct NotesRequest {
    pub notes: String,
}

#[derive(Serialize, utoipa::ToSchema)]
pub struct JudgeStatsResponse {
    pub num: u64,
    pub num_active: u64,
    /// Mean number of completed projects per active judge.
    pub avg_seen: f64,
}
