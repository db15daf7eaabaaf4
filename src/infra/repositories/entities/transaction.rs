//! Transaction database entity for SeaORM.

use sea_orm::entity::prelude::*;

use crate::domain::{Transaction, TransactionStatus};

#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel)]
#[sea_orm(table_name = "transactions")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i32,
    #[sea_orm(unique)]
    pub transaction_id: Option<String>,
    pub user_id: i32,
    pub vendor_id: Option<i32>,
    #[sea_orm(column_name = "type")]
    pub kind: String,
    pub amount_sent: Decimal,
    pub amount_received: Decimal,
    pub exchange_rate: Decimal,
    pub recipient_details: Json,
    pub status: String,
    pub proof_of_payment_url: Option<String>,
    pub proof_uploaded_at: Option<DateTimeUtc>,
    pub created_at: DateTimeUtc,
    pub updated_at: DateTimeUtc,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::user::Entity",
        from = "Column::UserId",
        to = "super::user::Column::Id"
    )]
    Sender,
    #[sea_orm(
        belongs_to = "super::user::Entity",
        from = "Column::VendorId",
        to = "super::user::Column::Id"
    )]
    Vendor,
}

impl Related<super::user::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Sender.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}

/// Convert database model to domain entity
impl From<Model> for Transaction {
    fn from(model: Model) -> Self {
        Transaction {
            id: model.id,
            transaction_id: model.transaction_id,
            user_id: model.user_id,
            vendor_id: model.vendor_id,
            kind: model.kind,
            amount_sent: model.amount_sent,
            amount_received: model.amount_received,
            exchange_rate: model.exchange_rate,
            recipient_details: model.recipient_details,
            status: TransactionStatus::from(model.status.as_str()),
            proof_of_payment_url: model.proof_of_payment_url,
            proof_uploaded_at: model.proof_uploaded_at,
            created_at: model.created_at,
            updated_at: model.updated_at,
        }
    }
}
