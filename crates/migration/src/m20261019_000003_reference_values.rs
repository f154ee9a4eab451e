use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[derive(Iden)]
enum ReferenceValues {
    Table,
    Id,
    Label,
    DefaultValueMinor,
    Description,
    CreatedAt,
    UpdatedAt,
}

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(ReferenceValues::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(ReferenceValues::Id)
                            .string()
                            .not_null()
                            .primary_key(),
                    )
                    .col(
                        ColumnDef::new(ReferenceValues::Label)
                            .string()
                            .not_null()
                            .unique_key(),
                    )
                    .col(
                        ColumnDef::new(ReferenceValues::DefaultValueMinor)
                            .big_integer()
                            .not_null(),
                    )
                    .col(ColumnDef::new(ReferenceValues::Description).string())
                    .col(ColumnDef::new(ReferenceValues::CreatedAt).timestamp().not_null())
                    .col(ColumnDef::new(ReferenceValues::UpdatedAt).timestamp().not_null())
                    .to_owned(),
            )
            .await
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(ReferenceValues::Table).to_owned())
            .await
    }
}
