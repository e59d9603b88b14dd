use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(Attempts::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(Attempts::Id)
                            .string()
                            .not_null()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(Attempts::RoomId).string().not_null())
                    .col(ColumnDef::new(Attempts::PlayerId).string().not_null())
                    .col(ColumnDef::new(Attempts::WordIndex).integer().not_null())
                    .col(ColumnDef::new(Attempts::Guess).string().not_null())
                    .col(ColumnDef::new(Attempts::IsCorrect).boolean().not_null())
                    .col(
                        ColumnDef::new(Attempts::SubmittedAt)
                            .timestamp_with_time_zone()
                            .not_null()
                            .default(Expr::current_timestamp()),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_attempts_room_id")
                            .from(Attempts::Table, Attempts::RoomId)
                            .to(Rooms::Table, Rooms::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        // Attempts are fetched per room, usually filtered by word index
        manager
            .create_index(
                Index::create()
                    .name("idx_attempts_room_word")
                    .table(Attempts::Table)
                    .col(Attempts::RoomId)
                    .col(Attempts::WordIndex)
                    .to_owned(),
            )
            .await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(Attempts::Table).to_owned())
            .await
    }
}

#[derive(DeriveIden)]
enum Attempts {
    Table,
    Id,
    RoomId,
    PlayerId,
    WordIndex,
    Guess,
    IsCorrect,
    SubmittedAt,
}

#[derive(DeriveIden)]
enum Rooms {
    Table,
    Id,
}
