use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(MealIssues::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(MealIssues::Id)
                            .big_integer()
                            .primary_key()
                            .auto_increment()
                            .not_null(),
                    )
                    .col(ColumnDef::new(MealIssues::CookId).big_integer().not_null())
                    .col(
                        ColumnDef::new(MealIssues::MenuItemId)
                            .big_integer()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(MealIssues::IssuedQty)
                            .integer()
                            .not_null()
                            .check(Expr::col(MealIssues::IssuedQty).gt(0)),
                    )
                    .col(
                        ColumnDef::new(MealIssues::IssueNote)
                            .string()
                            .not_null()
                            .default(""),
                    )
                    .col(ColumnDef::new(MealIssues::IssuedAt).timestamp().null())
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_meal_issues_cook_id")
                            .from(MealIssues::Table, MealIssues::CookId)
                            .to(Users::Table, Users::Id),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_meal_issues_menu_item_id")
                            .from(MealIssues::Table, MealIssues::MenuItemId)
                            .to(MenuItems::Table, MenuItems::Id),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .if_not_exists()
                    .name("idx_meal_issues_issued_at")
                    .table(MealIssues::Table)
                    .col(MealIssues::IssuedAt)
                    .to_owned(),
            )
            .await
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(MealIssues::Table).to_owned())
            .await
    }
}

#[derive(Iden)]
enum MealIssues {
    Table,
    Id,
    CookId,
    MenuItemId,
    IssuedQty,
    IssueNote,
    IssuedAt,
}

#[derive(Iden)]
enum Users {
    Table,
    Id,
}

#[derive(Iden)]
enum MenuItems {
    Table,
    Id,
}
