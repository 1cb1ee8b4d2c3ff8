use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

#[sea_orm::model]
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "flag")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i32,

    #[sea_orm(indexed)]
    pub judge_id: i32,
    pub project_id: i32,
    /// One of: busy, absent, cannot-demo, too-complex, offensive
    pub reason: String,
    pub time: DateTimeUtc,
}

impl ActiveModelBehavior for ActiveModel {}
