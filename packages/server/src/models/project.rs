use jury_core::Project;
use serde::{Deserialize, Serialize};

use crate::error::AppError;
use crate::models::shared::required_text;
use crate::store::NewProject;

/// Request body for adding a single project.
#[derive(Deserialize, utoipa::ToSchema)]
pub struct NewProjectRequest {
    #[schema(example = "Lens")]
    pub name: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    #[schema(example = "https://devpost.com/software/lens")]
    pub url: String,
    #[serde(default)]
    pub try_link: String,
    #[serde(default)]
    pub video_link: String,
    #[serde(default)]
    pub challenge_list: Vec<String>,
}

impl NewProjectRequest {
    pub fn validate(self) -> Result<NewProject, AppError> {
        Ok(NewProject {
            name: required_text(&self.name, "Name", 256)?,
            description: self.description,
            url: self.url.trim().to_string(),
            try_link: self.try_link.trim().to_string(),
            video_link: self.video_link.trim().to_string(),
            challenge_list: self
                .challenge_list
                .into_iter()
                .map(|c| c.trim().to_string())
                .filter(|c| !c.is_empty())
                .collect(),
        })
    }
}

#[derive(Serialize, utoipa::ToSchema)]
pub struct ProjectStatsResponse {
    pub num: u64,
    pub num_active: u64,
    /// Mean `seen` over active projects.
    pub avg_seen: f64,
}

/// What the public project listing shows.
#[derive(Serialize, utoipa::ToSchema)]
pub struct PublicProject {
    pub name: String,
    pub location: i32,
    pub group: i32,
    pub description: String,
    pub url: String,
    pub try_link: String,
    pub video_link: String,
    pub challenge_list: Vec<String>,
}

impl From<Project> for PublicProject {
    fn from(p: Project) -> Self {
        Self {
            name: p.name,
            location: p.location,
            group: p.group,
            description: p.description,
            url: p.url,
            try_link: p.try_link,
            video_link: p.video_link,
            challenge_list: p.challenge_list,
        }
    }
}

#[derive(Serialize, utoipa::ToSchema)]
pub struct ImportResponse {
    pub ok: u8,
    /// Number of records created.
    pub added: usize,
}
