use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(PurchaseRequests::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(PurchaseRequests::Id)
                            .big_integer()
                            .primary_key()
                            .auto_increment()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(PurchaseRequests::CookId)
                            .big_integer()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(PurchaseRequests::ProductName)
                            .string()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(PurchaseRequests::Qty)
                            .decimal_len(12, 3)
                            .not_null()
                            .default(0),
                    )
                    .col(ColumnDef::new(PurchaseRequests::Reason).string().not_null())
                    .col(
                        ColumnDef::new(PurchaseRequests::Status)
                            .string()
                            .not_null()
                            .default("pending")
                            .check(
                                Expr::col(PurchaseRequests::Status)
                                    .is_in(["pending", "approved", "rejected"]),
                            ),
                    )
                    .col(
                        ColumnDef::new(PurchaseRequests::ReviewedBy)
                            .big_integer()
                            .null(),
                    )
                    .col(
                        ColumnDef::new(PurchaseRequests::CreatedAt)
                            .timestamp()
                            .null(),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_purchase_requests_cook_id")
                            .from(PurchaseRequests::Table, PurchaseRequests::CookId)
                            .to(Users::Table, Users::Id),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_purchase_requests_reviewed_by")
                            .from(PurchaseRequests::Table, PurchaseRequests::ReviewedBy)
                            .to(Users::Table, Users::Id),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .if_not_exists()
                    .name("idx_purchase_requests_status")
                    .table(PurchaseRequests::Table)
                    .col(PurchaseRequests::Status)
                    .to_owned(),
            )
            .await
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(PurchaseRequests::Table).to_owned())
            .await
    }
}

#[derive(Iden)]
enum PurchaseRequests {
    Table,
    Id,
    CookId,
    ProductName,
    Qty,
    Reason,
    Status,
    ReviewedBy,
    CreatedAt,
}

#[derive(Iden)]
enum Users {
    Table,
    Id,
}
