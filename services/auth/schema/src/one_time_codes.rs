use sea_orm::entity::prelude::*;

/// Six-digit verification code sent by email.
/// Expires 10 minutes after issue; `consumed` flips exactly once.
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel)]
#[sea_orm(table_name = "one_time_codes")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,
    pub email: String,
    pub code: String,
    /// `login`, `register` or `reset`.
    pub purpose: String,
    pub expires_at: chrono::DateTime<chrono::Utc>,
    pub consumed: bool,
    pub created_at: chrono::DateTime<chrono::Utc>,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}
