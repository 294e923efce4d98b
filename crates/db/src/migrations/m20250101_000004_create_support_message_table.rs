//! Create `support_message` table migration.

use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(SupportMessage::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(SupportMessage::Id)
                            .string_len(32)
                            .not_null()
                            .primary_key(),
                    )
                    .col(
                        ColumnDef::new(SupportMessage::TicketId)
                            .string_len(32)
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(SupportMessage::AuthorUserId)
                            .string_len(32)
                            .not_null(),
                    )
                    .col(ColumnDef::new(SupportMessage::Kind).string_len(16).not_null())
                    .col(ColumnDef::new(SupportMessage::Body).text().not_null())
                    .col(
                        ColumnDef::new(SupportMessage::CreatedAt)
                            .timestamp_with_time_zone()
                            .not_null()
                            .default(Expr::current_timestamp()),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_support_message_ticket")
                            .from(SupportMessage::Table, SupportMessage::TicketId)
                            .to(SupportTicket::Table, SupportTicket::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_support_message_author")
                            .from(SupportMessage::Table, SupportMessage::AuthorUserId)
                            .to(User::Table, User::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        // Composite index for thread lookup in order
        manager
            .create_index(
                Index::create()
                    .name("idx_support_message_thread")
                    .table(SupportMessage::Table)
                    .col(SupportMessage::TicketId)
                    .col(SupportMessage::CreatedAt)
                    .to_owned(),
            )
            .await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(SupportMessage::Table).to_owned())
            .await
    }
}

#[derive(Iden)]
enum SupportMessage {
    Table,
    Id,
    TicketId,
    AuthorUserId,
    Kind,
    Body,
    CreatedAt,
}

#[derive(Iden)]
enum SupportTicket {
    Table,
    Id,
}

#[derive(Iden)]
enum User {
    Table,
    Id,
}
