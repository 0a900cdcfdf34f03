use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(MenuItems::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(MenuItems::Id)
                            .big_integer()
                            .primary_key()
                            .auto_increment()
                            .not_null(),
                    )
                    .col(ColumnDef::new(MenuItems::Date).date().not_null())
                    .col(ColumnDef::new(MenuItems::MealType).string().not_null())
                    .col(ColumnDef::new(MenuItems::Title).string().not_null())
                    .col(
                        ColumnDef::new(MenuItems::Price)
                            .decimal_len(10, 2)
                            .not_null()
                            .default(0),
                    )
                    .col(
                        ColumnDef::new(MenuItems::AvailableQty)
                            .integer()
                            .not_null()
                            .check(Expr::col(MenuItems::AvailableQty).gte(0)),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .if_not_exists()
                    .name("idx_menu_items_date")
                    .table(MenuItems::Table)
                    .col(MenuItems::Date)
                    .to_owned(),
            )
            .await
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(MenuItems::Table).to_owned())
            .await
    }
}

#[derive(Iden)]
enum MenuItems {
    Table,
    Id,
    Date,
    MealType,
    Title,
    Price,
    AvailableQty,
}
