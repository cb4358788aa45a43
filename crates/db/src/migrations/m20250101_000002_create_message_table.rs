//! Create `message` table migration.

use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(Message::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(Message::Id)
                            .string_len(32)
                            .not_null()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(Message::Content).text().not_null())
                    .col(ColumnDef::new(Message::SenderId).string_len(128).not_null())
                    .col(
                        ColumnDef::new(Message::ReceiverId)
                            .string_len(128)
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(Message::Timestamp)
                            .timestamp_with_time_zone()
                            .not_null()
                            .default(Expr::current_timestamp()),
                    )
                    .col(
                        ColumnDef::new(Message::Read)
                            .boolean()
                            .not_null()
                            .default(false),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_message_sender")
                            .from(Message::Table, Message::SenderId)
                            .to(UserProfile::Table, UserProfile::UserId)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_message_receiver")
                            .from(Message::Table, Message::ReceiverId)
                            .to(UserProfile::Table, UserProfile::UserId)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        // Composite index for conversation lookup in either direction
        manager
            .create_index(
                Index::create()
                    .name("idx_message_conversation")
                    .table(Message::Table)
                    .col(Message::SenderId)
                    .col(Message::ReceiverId)
                    .col(Message::Timestamp)
                    .to_owned(),
            )
            .await?;

        // Index for unread counts and read-marking
        manager
            .create_index(
                Index::create()
                    .name("idx_message_receiver_read")
                    .table(Message::Table)
                    .col(Message::ReceiverId)
                    .col(Message::Read)
                    .to_owned(),
            )
            .await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(Message::Table).to_owned())
            .await
    }
}

#[derive(Iden)]
enum Message {
    Table,
    Id,
    Content,
    SenderId,
    ReceiverId,
    Timestamp,
    Read,
}

#[derive(Iden)]
enum UserProfile {
    Table,
    UserId,
}
