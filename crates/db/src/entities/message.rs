//! Direct message entity.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "message")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: String,

    #[sea_orm(column_type = "Text")]
    pub content: String,

    #[sea_orm(indexed)]
    pub sender_id: String,

    #[sea_orm(indexed)]
    pub receiver_id: String,

    pub timestamp: DateTimeWithTimeZone,

    /// Flips to true once, when the receiver opens the conversation
    #[sea_orm(default_value = false)]
    pub read: bool,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::user_profile::Entity",
        from = "Column::SenderId",
        to = "super::user_profile::Column::UserId"
    )]
    Sender,

    #[sea_orm(
        belongs_to = "super::user_profile::Entity",
        from = "Column::ReceiverId",
        to = "super::user_profile::Column::UserId"
    )]
    Receiver,
}

impl ActiveModelBehavior for ActiveModel {}
