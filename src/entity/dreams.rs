use sea_orm::entity::prelude::*;

#[sea_orm::model]
#[derive(Clone, Debug, PartialEq, DeriveEntityModel)]
#[sea_orm(table_name = "dreams")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i64,
    pub dream_text: String,
    pub interpretation: String,
    pub emotion: Option<String>,
    pub confidence: Option<f64>,
}

impl ActiveModelBehavior for ActiveModel {}
