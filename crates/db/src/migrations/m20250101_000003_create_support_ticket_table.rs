//! Create `support_ticket` table migration.

use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(SupportTicket::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(SupportTicket::Id)
                            .string_len(32)
                            .not_null()
                            .primary_key(),
                    )
                    .col(
                        ColumnDef::new(SupportTicket::SenderUserId)
                            .string_len(32)
                            .not_null(),
                    )
                    .col(ColumnDef::new(SupportTicket::Subject).string_len(256).not_null())
                    .col(
                        ColumnDef::new(SupportTicket::Status)
                            .string_len(16)
                            .not_null()
                            .default("open"),
                    )
                    .col(ColumnDef::new(SupportTicket::HandledByAdminId).string_len(32))
                    .col(
                        ColumnDef::new(SupportTicket::CreatedAt)
                            .timestamp_with_time_zone()
                            .not_null()
                            .default(Expr::current_timestamp()),
                    )
                    .col(ColumnDef::new(SupportTicket::UpdatedAt).timestamp_with_time_zone())
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_support_ticket_sender")
                            .from(SupportTicket::Table, SupportTicket::SenderUserId)
                            .to(User::Table, User::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_support_ticket_handled_by")
                            .from(SupportTicket::Table, SupportTicket::HandledByAdminId)
                            .to(User::Table, User::Id)
                            .on_delete(ForeignKeyAction::SetNull),
                    )
                    .to_owned(),
            )
            .await?;

        // Index: sender_user_id
        manager
            .create_index(
                Index::create()
                    .name("idx_support_ticket_sender_user_id")
                    .table(SupportTicket::Table)
                    .col(SupportTicket::SenderUserId)
                    .to_owned(),
            )
            .await?;

        // Composite index for the inbox status filter
        manager
            .create_index(
                Index::create()
                    .name("idx_support_ticket_status_created_at")
                    .table(SupportTicket::Table)
                    .col(SupportTicket::Status)
                    .col(SupportTicket::CreatedAt)
                    .to_owned(),
            )
            .await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(SupportTicket::Table).to_owned())
            .await
    }
}

#[derive(Iden)]
enum SupportTicket {
    Table,
    Id,
    SenderUserId,
    Subject,
    Status,
    HandledByAdminId,
    CreatedAt,
    UpdatedAt,
}

#[derive(Iden)]
enum User {
    Table,
    Id,
}
