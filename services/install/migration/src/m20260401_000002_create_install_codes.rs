use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(InstallCodes::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(InstallCodes::Code)
                            .uuid()
                            .not_null()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(InstallCodes::UserId).uuid().not_null())
                    .col(ColumnDef::new(InstallCodes::Email).string().not_null())
                    .col(
                        ColumnDef::new(InstallCodes::Metadata)
                            .json_binary()
                            .not_null()
                            .default(Expr::cust("'{}'::jsonb")),
                    )
                    .col(
                        ColumnDef::new(InstallCodes::UseCount)
                            .integer()
                            .not_null()
                            .default(0),
                    )
                    .col(
                        ColumnDef::new(InstallCodes::MaxUses)
                            .integer()
                            .not_null()
                            .default(10),
                    )
                    .col(ColumnDef::new(InstallCodes::UsedAt).timestamp_with_time_zone())
                    .col(ColumnDef::new(InstallCodes::LastUsedAt).timestamp_with_time_zone())
                    .col(
                        ColumnDef::new(InstallCodes::DevicesInfo)
                            .json_binary()
                            .not_null()
                            .default(Expr::cust("'[]'::jsonb")),
                    )
                    .col(
                        ColumnDef::new(InstallCodes::ExpiresAt)
                            .timestamp_with_time_zone()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(InstallCodes::CreatedAt)
                            .timestamp_with_time_zone()
                            .not_null(),
                    )
                    .to_owned(),
            )
            .await?;

        // Reuse lookup scans the latest code per identity + email.
        manager
            .create_index(
                Index::create()
                    .table(InstallCodes::Table)
                    .col(InstallCodes::UserId)
                    .col(InstallCodes::Email)
                    .col(InstallCodes::CreatedAt)
                    .name("idx_install_codes_user_email_created")
                    .to_owned(),
            )
            .await
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(InstallCodes::Table).to_owned())
            .await
    }
}

#[derive(Iden)]
enum InstallCodes {
    Table,
    Code,
    UserId,
    Email,
    Metadata,
    UseCount,
    MaxUses,
    UsedAt,
    LastUsedAt,
    DevicesInfo,
    ExpiresAt,
    CreatedAt,
}
