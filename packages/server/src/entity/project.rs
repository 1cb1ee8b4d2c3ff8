use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

#[sea_orm::model]
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "project")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i32,

    pub name: String,
    /// Table number within `group`.
    pub location: i32,
    pub group: i32,
    #[sea_orm(column_type = "Text")]
    pub description: String,
    pub url: String,
    pub try_link: String,
    pub video_link: String,

    /// Opted-in tracks, stored as a JSON array of strings.
    #[sea_orm(column_type = "JsonBinary")]
    pub challenge_list: serde_json::Value,

    pub active: bool,
    pub prioritized: bool,
    pub seen: i32,

    /// Per-track seen counts, stored as a JSON object of track -> count.
    #[sea_orm(column_type = "JsonBinary")]
    pub track_seen: serde_json::Value,
    /// Per-track star counts, stored as a JSON object of track -> count.
    #[sea_orm(column_type = "JsonBinary")]
    pub track_stars: serde_json::Value,

    pub last_activity: DateTimeUtc,
    pub created_at: DateTimeUtc,
}

impl ActiveModelBehavior for ActiveModel {}
