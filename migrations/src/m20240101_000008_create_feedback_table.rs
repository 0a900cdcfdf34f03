use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(Feedback::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(Feedback::Id)
                            .big_integer()
                            .primary_key()
                            .auto_increment()
                            .not_null(),
                    )
                    .col(ColumnDef::new(Feedback::UserId).big_integer().not_null())
                    .col(
                        ColumnDef::new(Feedback::MenuItemId)
                            .big_integer()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(Feedback::Rating)
                            .integer()
                            .not_null()
                            .check(Expr::col(Feedback::Rating).between(1, 5)),
                    )
                    .col(ColumnDef::new(Feedback::Comment).string().not_null())
                    .col(ColumnDef::new(Feedback::CreatedAt).timestamp().null())
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_feedback_user_id")
                            .from(Feedback::Table, Feedback::UserId)
                            .to(Users::Table, Users::Id),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_feedback_menu_item_id")
                            .from(Feedback::Table, Feedback::MenuItemId)
                            .to(MenuItems::Table, MenuItems::Id),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .if_not_exists()
                    .name("idx_feedback_menu_item_id")
                    .table(Feedback::Table)
                    .col(Feedback::MenuItemId)
                    .to_owned(),
            )
            .await
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(Feedback::Table).to_owned())
            .await
    }
}

#[derive(Iden)]
enum Feedback {
    Table,
    Id,
    UserId,
    MenuItemId,
    Rating,
    Comment,
    CreatedAt,
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
