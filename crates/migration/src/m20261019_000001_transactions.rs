use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[derive(Iden)]
pub(crate) enum Transactions {
    Table,
    Id,
    FromUserId,
    ToUserId,
    Kind,
    MonetaryAmountMinor,
    HumanValueAmountMinor,
    Description,
    Status,
    RiskLevel,
    CreatedAt,
    UpdatedAt,
}

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(Transactions::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(Transactions::Id)
                            .string()
                            .not_null()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(Transactions::FromUserId).string().not_null())
                    .col(ColumnDef::new(Transactions::ToUserId).string().not_null())
                    .col(ColumnDef::new(Transactions::Kind).string().not_null())
                    .col(
                        ColumnDef::new(Transactions::MonetaryAmountMinor)
                            .big_integer()
                            .not_null()
                            .default(0),
                    )
                    .col(
                        ColumnDef::new(Transactions::HumanValueAmountMinor)
                            .big_integer()
                            .not_null()
                            .default(0),
                    )
                    .col(ColumnDef::new(Transactions::Description).string().not_null())
                    .col(
                        ColumnDef::new(Transactions::Status)
                            .string()
                            .not_null()
                            .default("PENDING"),
                    )
                    .col(
                        ColumnDef::new(Transactions::RiskLevel)
                            .string()
                            .not_null()
                            .default("NORMAL"),
                    )
                    .col(ColumnDef::new(Transactions::CreatedAt).timestamp().not_null())
                    .col(ColumnDef::new(Transactions::UpdatedAt).timestamp().not_null())
                    .to_owned(),
            )
            .await?;

        // Rolling-window aggregates scan one side of a user's history at a time.
        manager
            .create_index(
                Index::create()
                    .name("idx-transactions-from_user_id-created_at")
                    .table(Transactions::Table)
                    .col(Transactions::FromUserId)
                    .col(Transactions::CreatedAt)
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx-transactions-to_user_id-created_at")
                    .table(Transactions::Table)
                    .col(Transactions::ToUserId)
                    .col(Transactions::CreatedAt)
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx-transactions-created_at")
                    .table(Transactions::Table)
                    .col(Transactions::CreatedAt)
                    .to_owned(),
            )
            .await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(Transactions::Table).to_owned())
            .await
    }
}
