use jury_core::{Flag, MainGroupOptions};
use serde::{Deserialize, Serialize};

#[derive(Deserialize, utoipa::ToSchema)]
pub struct AdminLoginRequest {
    pub password: String,
}

#[derive(Serialize, utoipa::ToSchema)]
pub struct ClockResponse {
    pub ok: u8,
    pub running: bool,
    /// Elapsed judging time in milliseconds.
    pub time: i64,
}

/// A flag joined with the names an admin needs to act on it.
#[derive(Serialize, utoipa::ToSchema)]
pub struct FlagResponse {
    pub id: i32,
    pub judge_id: i32,
    pub judge_name: String,
    pub project_id: i32,
    pub project_name: String,
    pub project_location: i32,
    pub reason: String,
    /// Milliseconds since the Unix epoch.
    pub time: i64,
}

impl FlagResponse {
    pub fn new(flag: Flag, judge_name: String, project_name: String, project_location: i32) -> Self {
        Self {
            id: flag.id,
            judge_id: flag.judge_id,
            judge_name,
            project_id: flag.project_id,
            project_name,
            project_location,
            reason: flag.reason.to_string(),
            time: flag.time.timestamp_millis(),
        }
    }
}

/// Partial update of event options. Absent fields are left unchanged.
#[derive(Debug, Default, Deserialize, utoipa::ToSchema)]
pub struct OptionsUpdate {
    pub min_views: Option<i32>,
    pub categories: Option<Vec<String>>,
    pub tracks: Option<Vec<String>>,
    pub judge_tracks: Option<bool>,
    pub multi_group: Option<bool>,
    pub num_groups: Option<i32>,
    pub group_sizes: Option<Vec<i32>>,
    pub main_group: Option<MainGroupOptions>,
    pub clock_sync: Option<bool>,
}

#[derive(Serialize, utoipa::ToSchema)]
pub struct LogResponse {
    pub ok: u8,
    pub entries: Vec<String>,
}
