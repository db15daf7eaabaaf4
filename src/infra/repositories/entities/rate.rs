//! Rate database entity for SeaORM.

use sea_orm::entity::prelude::*;

use crate::domain::Rate;

#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel)]
#[sea_orm(table_name = "rates")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i32,
    #[sea_orm(unique)]
    pub pair: String,
    pub rate: Decimal,
    pub manual_rate: Option<Decimal>,
    pub use_manual: bool,
    pub spread: Decimal,
    pub created_at: DateTimeUtc,
    pub updated_at: DateTimeUtc,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}

impl From<Model> for Rate {
    fn from(model: Model) -> Self {
        Rate {
            id: model.id,
            pair: model.pair,
            rate: model.rate,
            manual_rate: model.manual_rate,
            use_manual: model.use_manual,
            spread: model.spread,
            created_at: model.created_at,
            updated_at: model.updated_at,
        }
    }
}
