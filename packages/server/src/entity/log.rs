use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// One chunk of the persisted event log.
#[sea_orm::model]
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "log")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i32,

    /// Formatted entries as a JSON array of strings, oldest first.
    #[sea_orm(column_type = "JsonBinary")]
    pub entries: serde_json::Value,
    pub count: i32,
    pub created_at: DateTimeUtc,
}

impl ActiveModelBehavior for ActiveModel {}
