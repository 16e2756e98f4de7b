use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(LoginLogs::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(LoginLogs::Id)
                            .uuid()
                            .not_null()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(LoginLogs::UserId).uuid().not_null())
                    .col(ColumnDef::new(LoginLogs::Email).string())
                    .col(
                        ColumnDef::new(LoginLogs::LoginTime)
                            .timestamp_with_time_zone()
                            .not_null(),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .from(LoginLogs::Table, LoginLogs::UserId)
                            .to(Users::Table, Users::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .table(LoginLogs::Table)
                    .col(LoginLogs::UserId)
                    .name("idx_login_logs_user_id")
                    .to_owned(),
            )
            .await
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(LoginLogs::Table).to_owned())
            .await
    }
}

#[derive(Iden)]
enum LoginLogs {
    Table,
    Id,
    UserId,
    Email,
    LoginTime,
}

#[derive(Iden)]
enum Users {
    Table,
    Id,
}
