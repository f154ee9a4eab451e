use sea_orm_migration::prelude::*;

use crate::m20261019_000001_transactions::Transactions;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[derive(Iden)]
enum TransactionReviews {
    Table,
    Id,
    TransactionId,
    ReviewerId,
    PreviousRiskLevel,
    RiskLevel,
    PreviousStatus,
    Status,
    Reason,
    CreatedAt,
}

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(TransactionReviews::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(TransactionReviews::Id)
                            .string()
                            .not_null()
                            .primary_key(),
                    )
                    .col(
                        ColumnDef::new(TransactionReviews::TransactionId)
                            .string()
                            .not_null(),
                    )
                    .col(ColumnDef::new(TransactionReviews::ReviewerId).string())
                    .col(
                        ColumnDef::new(TransactionReviews::PreviousRiskLevel)
                            .string()
                            .not_null(),
                    )
                    .col(ColumnDef::new(TransactionReviews::RiskLevel).string().not_null())
                    .col(
                        ColumnDef::new(TransactionReviews::PreviousStatus)
                            .string()
                            .not_null(),
                    )
                    .col(ColumnDef::new(TransactionReviews::Status).string().not_null())
                    .col(ColumnDef::new(TransactionReviews::Reason).string())
                    .col(
                        ColumnDef::new(TransactionReviews::CreatedAt)
                            .timestamp()
                            .not_null(),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk-transaction_reviews-transaction_id")
                            .from(TransactionReviews::Table, TransactionReviews::TransactionId)
                            .to(Transactions::Table, Transactions::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx-transaction_reviews-transaction_id-created_at")
                    .table(TransactionReviews::Table)
                    .col(TransactionReviews::TransactionId)
                    .col(TransactionReviews::CreatedAt)
                    .to_owned(),
            )
            .await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(TransactionReviews::Table).to_owned())
            .await
    }
}
