use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        // Pre-existing rows get unit_price = 0; the startup normalizer later
        // reconciles any approved row still carrying a zero price.
        manager
            .alter_table(
                Table::alter()
                    .table(PurchaseRequests::Table)
                    .add_column(
                        ColumnDef::new(PurchaseRequests::UnitPrice)
                            .decimal_len(10, 2)
                            .not_null()
                            .default(0),
                    )
                    .to_owned(),
            )
            .await
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .alter_table(
                Table::alter()
                    .table(PurchaseRequests::Table)
                    .drop_column(PurchaseRequests::UnitPrice)
                    .to_owned(),
            )
            .await
    }
}

#[derive(Iden)]
enum PurchaseRequests {
    Table,
    UnitPrice,
}
