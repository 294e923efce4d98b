//! Create event table migration.

use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(Event::Table)
                    .if_not_exists()
                    .col(ColumnDef::new(Event::Id).string_len(32).not_null().primary_key())
                    .col(ColumnDef::new(Event::Name).string_len(256).not_null())
                    .col(ColumnDef::new(Event::Description).text())
                    .col(ColumnDef::new(Event::Date).date().not_null())
                    .col(ColumnDef::new(Event::StartTime).time().not_null())
                    .col(ColumnDef::new(Event::EndTime).time())
                    .col(ColumnDef::new(Event::VenueName).string_len(256).not_null())
                    .col(ColumnDef::new(Event::VenueAddress).string_len(512).not_null())
                    .col(ColumnDef::new(Event::City).string_len(128).not_null())
                    .col(ColumnDef::new(Event::OrganizerUserId).string_len(32).not_null())
                    .col(ColumnDef::new(Event::SubmittedByPromoterId).string_len(32))
                    .col(
                        ColumnDef::new(Event::TicketButtonLabel)
                            .string_len(128)
                            .not_null()
                            .default("Purchase tickets"),
                    )
                    .col(ColumnDef::new(Event::TicketUrl).string_len(1024))
                    .col(
                        ColumnDef::new(Event::IsPublished)
                            .boolean()
                            .not_null()
                            .default(false),
                    )
                    .col(
                        ColumnDef::new(Event::Status)
                            .string_len(20)
                            .not_null()
                            .default("draft"),
                    )
                    .col(
                        ColumnDef::new(Event::IsFeatured)
                            .boolean()
                            .not_null()
                            .default(false),
                    )
                    .col(ColumnDef::new(Event::FeaturedRank).integer())
                    .col(
                        ColumnDef::new(Event::CreatedAt)
                            .timestamp_with_time_zone()
                            .not_null()
                            .default(Expr::current_timestamp()),
                    )
                    .col(ColumnDef::new(Event::UpdatedAt).timestamp_with_time_zone())
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_event_organizer")
                            .from(Event::Table, Event::OrganizerUserId)
                            .to(User::Table, User::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_event_submitted_by")
                            .from(Event::Table, Event::SubmittedByPromoterId)
                            .to(User::Table, User::Id)
                            .on_delete(ForeignKeyAction::SetNull),
                    )
                    .to_owned(),
            )
            .await?;

        // Index: organizer_user_id
        manager
            .create_index(
                Index::create()
                    .name("idx_event_organizer_user_id")
                    .table(Event::Table)
                    .col(Event::OrganizerUserId)
                    .to_owned(),
            )
            .await?;

        // Index: submitted_by_promoter_id for the promoter dashboard
        manager
            .create_index(
                Index::create()
                    .name("idx_event_submitted_by_promoter_id")
                    .table(Event::Table)
                    .col(Event::SubmittedByPromoterId)
                    .to_owned(),
            )
            .await?;

        // Composite index for the featured landing query
        manager
            .create_index(
                Index::create()
                    .name("idx_event_featured")
                    .table(Event::Table)
                    .col(Event::IsPublished)
                    .col(Event::IsFeatured)
                    .col(Event::FeaturedRank)
                    .to_owned(),
            )
            .await?;

        // Composite index for the public listing
        manager
            .create_index(
                Index::create()
                    .name("idx_event_published_date")
                    .table(Event::Table)
                    .col(Event::IsPublished)
                    .col(Event::Date)
                    .to_owned(),
            )
            .await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(Event::Table).to_owned())
            .await
    }
}

#[derive(Iden)]
enum Event {
    Table,
    Id,
    Name,
    Description,
    Date,
    StartTime,
    EndTime,
    VenueName,
    VenueAddress,
    City,
    OrganizerUserId,
    SubmittedByPromoterId,
    TicketButtonLabel,
    TicketUrl,
    IsPublished,
    Status,
    IsFeatured,
    FeaturedRank,
    CreatedAt,
    UpdatedAt,
}

#[derive(Iden)]
enum User {
    Table,
    Id,
}
