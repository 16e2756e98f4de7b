use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(PendingVerifications::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(PendingVerifications::SessionId)
                            .string()
                            .not_null()
                            .primary_key(),
                    )
                    .col(
                        ColumnDef::new(PendingVerifications::Email)
                            .string()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(PendingVerifications::Action)
                            .string()
                            .not_null(),
                    )
                    .col(ColumnDef::new(PendingVerifications::PasswordHash).string())
                    .col(ColumnDef::new(PendingVerifications::FirstName).string())
                    .col(ColumnDef::new(PendingVerifications::LastName).string())
                    .col(
                        ColumnDef::new(PendingVerifications::ExpiresAt)
                            .timestamp_with_time_zone()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(PendingVerifications::CreatedAt)
                            .timestamp_with_time_zone()
                            .not_null(),
                    )
                    .to_owned(),
            )
            .await
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(PendingVerifications::Table).to_owned())
            .await
    }
}

#[derive(Iden)]
enum PendingVerifications {
    Table,
    SessionId,
    Email,
    Action,
    PasswordHash,
    FirstName,
    LastName,
    ExpiresAt,
    CreatedAt,
}
