use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// Event-wide settings. The table holds a single row.
#[sea_orm::model]
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "options")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i32,

    pub curr_table_num: i32,
    #[sea_orm(column_type = "JsonBinary")]
    pub group_table_nums: serde_json::Value,
    /// Persisted clock state: `{start_time, pause_time, running}`.
    #[sea_orm(column_type = "JsonBinary")]
    pub clock: serde_json::Value,
    pub clock_sync: bool,
    pub min_views: i32,
    #[sea_orm(column_type = "JsonBinary")]
    pub categories: serde_json::Value,
    #[sea_orm(column_type = "JsonBinary")]
    pub tracks: serde_json::Value,
    pub judge_tracks: bool,
    pub multi_group: bool,
    pub num_groups: i32,
    #[sea_orm(column_type = "JsonBinary")]
    pub group_sizes: serde_json::Value,
    #[sea_orm(column_type = "JsonBinary")]
    pub main_group: serde_json::Value,
}

impl ActiveModelBehavior for ActiveModel {}
