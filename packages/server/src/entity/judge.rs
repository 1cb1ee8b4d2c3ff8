use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

#[sea_orm::model]
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "judge")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i32,

    pub name: String,
    pub email: String,
    #[sea_orm(column_type = "Text")]
    pub notes: String,

    /// Six-digit login code.
    #[sea_orm(unique)]
    pub code: String,
    /// Bearer token issued at the last login. Empty until then.
    #[sea_orm(column_type = "Text")]
    pub token: String,

    pub active: bool,
    pub read_welcome: bool,
    /// Empty for general judges.
    pub track: String,
    pub group: i32,

    /// Project currently assigned to this judge.
    pub current: Option<i32>,

    /// Completed projects as a JSON array of snapshots, in completion order.
    #[sea_orm(column_type = "JsonBinary")]
    pub seen_projects: serde_json::Value,
    /// Ranked project ids as a JSON array.
    #[sea_orm(column_type = "JsonBinary")]
    pub rankings: serde_json::Value,
    /// Per-judge Copeland scores as a JSON object of project id -> score.
    #[sea_orm(column_type = "JsonBinary")]
    pub rankings_agg: serde_json::Value,

    pub last_activity: DateTimeUtc,
    pub created_at: DateTimeUtc,
}

impl ActiveModelBehavior for ActiveModel {}
