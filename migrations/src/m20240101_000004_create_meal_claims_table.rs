use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(MealClaims::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(MealClaims::Id)
                            .big_integer()
                            .primary_key()
                            .auto_increment()
                            .not_null(),
                    )
                    .col(ColumnDef::new(MealClaims::UserId).big_integer().not_null())
                    .col(
                        ColumnDef::new(MealClaims::MenuItemId)
                            .big_integer()
                            .not_null(),
                    )
                    .col(ColumnDef::new(MealClaims::ClaimedAt).timestamp().null())
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_meal_claims_user_id")
                            .from(MealClaims::Table, MealClaims::UserId)
                            .to(Users::Table, Users::Id),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_meal_claims_menu_item_id")
                            .from(MealClaims::Table, MealClaims::MenuItemId)
                            .to(MenuItems::Table, MenuItems::Id),
                    )
                    .to_owned(),
            )
            .await?;

        // One claim per user per dish, enforced at the storage level.
        manager
            .create_index(
                Index::create()
                    .if_not_exists()
                    .name("uq_meal_claims_user_menu_item")
                    .table(MealClaims::Table)
                    .col(MealClaims::UserId)
                    .col(MealClaims::MenuItemId)
                    .unique()
                    .to_owned(),
            )
            .await
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(MealClaims::Table).to_owned())
            .await
    }
}

#[derive(Iden)]
enum MealClaims {
    Table,
    Id,
    UserId,
    MenuItemId,
    ClaimedAt,
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
