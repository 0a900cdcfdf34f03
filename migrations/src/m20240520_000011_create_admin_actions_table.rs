use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(AdminActions::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(AdminActions::Id)
                            .big_integer()
                            .primary_key()
                            .auto_increment()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(AdminActions::AdminId)
                            .big_integer()
                            .not_null(),
                    )
                    .col(ColumnDef::new(AdminActions::ActionType).string().not_null())
                    .col(ColumnDef::new(AdminActions::TargetType).string().not_null())
                    .col(
                        ColumnDef::new(AdminActions::TargetId)
                            .big_integer()
                            .not_null(),
                    )
                    .col(ColumnDef::new(AdminActions::Details).json().not_null())
                    .col(ColumnDef::new(AdminActions::CreatedAt).timestamp().null())
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_admin_actions_admin_id")
                            .from(AdminActions::Table, AdminActions::AdminId)
                            .to(Users::Table, Users::Id),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .if_not_exists()
                    .name("idx_admin_actions_created_at")
                    .table(AdminActions::Table)
                    .col(AdminActions::CreatedAt)
                    .to_owned(),
            )
            .await
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(AdminActions::Table).to_owned())
            .await
    }
}

#[derive(Iden)]
enum AdminActions {
    Table,
    Id,
    AdminId,
    ActionType,
    TargetType,
    TargetId,
    Details,
    CreatedAt,
}

#[derive(Iden)]
enum Users {
    Table,
    Id,
}
