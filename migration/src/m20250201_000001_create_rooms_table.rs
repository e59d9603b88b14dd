use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(Rooms::Table)
                    .if_not_exists()
                    .col(ColumnDef::new(Rooms::Id).string().not_null().primary_key())
                    .col(
                        ColumnDef::new(Rooms::Code)
                            .string()
                            .not_null()
                            .unique_key(),
                    )
                    .col(ColumnDef::new(Rooms::Status).string().not_null())
                    .col(ColumnDef::new(Rooms::Player1Id).string().not_null())
                    .col(ColumnDef::new(Rooms::Player1Name).string().not_null())
                    .col(ColumnDef::new(Rooms::Player2Id).string())
                    .col(ColumnDef::new(Rooms::Player2Name).string())
                    .col(
                        ColumnDef::new(Rooms::Player1Score)
                            .integer()
                            .not_null()
                            .default(0),
                    )
                    .col(
                        ColumnDef::new(Rooms::Player2Score)
                            .integer()
                            .not_null()
                            .default(0),
                    )
                    .col(
                        ColumnDef::new(Rooms::CurrentWordIndex)
                            .integer()
                            .not_null()
                            .default(0),
                    )
                    .col(ColumnDef::new(Rooms::WordsOrder).text().not_null())
                    .col(ColumnDef::new(Rooms::WordStartedAt).timestamp_with_time_zone())
                    .col(
                        ColumnDef::new(Rooms::CreatedAt)
                            .timestamp_with_time_zone()
                            .not_null()
                            .default(Expr::current_timestamp()),
                    )
                    .col(ColumnDef::new(Rooms::StartedAt).timestamp_with_time_zone())
                    .col(ColumnDef::new(Rooms::FinishedAt).timestamp_with_time_zone())
                    .to_owned(),
            )
            .await?;

        // Lookups are by shareable code, not id
        manager
            .create_index(
                Index::create()
                    .name("idx_rooms_code")
                    .table(Rooms::Table)
                    .col(Rooms::Code)
                    .unique()
                    .to_owned(),
            )
            .await?;

        // The cleanup task scans by status and age
        manager
            .create_index(
                Index::create()
                    .name("idx_rooms_status")
                    .table(Rooms::Table)
                    .col(Rooms::Status)
                    .to_owned(),
            )
            .await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(Rooms::Table).to_owned())
            .await
    }
}

#[derive(DeriveIden)]
enum Rooms {
    Table,
    Id,
    Code,
    Status,
    Player1Id,
    Player1Name,
    Player2Id,
    Player2Name,
    Player1Score,
    Player2Score,
    CurrentWordIndex,
    WordsOrder,
    WordStartedAt,
    CreatedAt,
    StartedAt,
    FinishedAt,
}
