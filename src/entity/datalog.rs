use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// One uploaded log line. `date` is stored as `YYYY-MM-DD HH:MM:SS` text,
/// which is what the SQLite date functions in the batch queries expect.
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "datalog")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i32,
    pub date: Option<String>,
    pub source: Option<String>,
    pub value: Option<String>,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}
