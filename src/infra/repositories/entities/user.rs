//! User database entity for SeaORM.

use sea_orm::entity::prelude::*;

use crate::domain::{Balances, KycStatus, User, UserRole};

#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel)]
#[sea_orm(table_name = "users")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i32,
    #[sea_orm(unique)]
    pub email: String,
    pub password_hash: String,
    pub role: String,
    pub kyc_status: String,
    pub kyc_document: Option<String>,
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub phone: Option<String>,
    pub country: Option<String>,
    /// `{ "USD": "120.50", ... }`
    pub balances: Json,
    pub is_email_verified: bool,
    pub email_verification_token: Option<String>,
    pub email_verification_expires: Option<DateTimeUtc>,
    pub reset_password_token: Option<String>,
    pub reset_password_expires: Option<DateTimeUtc>,
    pub push_token: Option<String>,
    pub online: bool,
    pub created_at: DateTimeUtc,
    pub updated_at: DateTimeUtc,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(has_many = "super::transaction::Entity")]
    SentTransactions,
}

impl Related<super::transaction::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::SentTransactions.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}

/// Convert database model to domain entity
impl From<Model> for User {
    fn from(model: Model) -> Self {
        let balances: Balances = serde_json::from_value(model.balances).unwrap_or_else(|e| {
            tracing::warn!(user_id = model.id, "Unreadable balances column: {}", e);
            Balances::new()
        });

        User {
            id: model.id,
            email: model.email,
            password_hash: model.password_hash,
            role: UserRole::from(model.role.as_str()),
            kyc_status: KycStatus::parse(&model.kyc_status).unwrap_or(KycStatus::Unverified),
            kyc_document: model.kyc_document,
            first_name: model.first_name,
            last_name: model.last_name,
            phone: model.phone,
            country: model.country,
            balances,
            is_email_verified: model.is_email_verified,
            email_verification_token: model.email_verification_token,
            email_verification_expires: model.email_verification_expires,
            reset_password_token: model.reset_password_token,
            reset_password_expires: model.reset_password_expires,
            push_token: model.push_token,
            online: model.online,
            created_at: model.created_at,
            updated_at: model.updated_at,
        }
    }
}
