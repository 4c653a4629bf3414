use sea_orm::entity::prelude::*;

/// Install code binding a device installation to a user identity.
/// Expires 30 days after creation; redeemable up to `max_uses` times, with a
/// 7-day grace window past the last redemption.
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel)]
#[sea_orm(table_name = "install_codes")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub code: Uuid,
    pub user_id: Uuid,
    pub email: String,
    pub metadata: Json,
    pub use_count: i32,
    pub max_uses: i32,
    pub used_at: Option<chrono::DateTime<chrono::Utc>>,
    pub last_used_at: Option<chrono::DateTime<chrono::Utc>>,
    /// Append-only log of redemption attempts (user agent, address, timestamp).
    pub devices_info: Json,
    pub expires_at: chrono::DateTime<chrono::Utc>,
    pub created_at: chrono::DateTime<chrono::Utc>,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}
