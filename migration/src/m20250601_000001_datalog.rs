use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        // ========== DATALOG ==========
        // The logger may already have created this table in an existing
        // database file, so every statement is IF NOT EXISTS.
        manager
            .create_table(
                Table::create()
                    .table(Datalog::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(Datalog::Id)
                            .integer()
                            .not_null()
                            .primary_key()
                            .auto_increment(),
                    )
                    .col(
                        ColumnDef::new(Datalog::Date)
                            .date_time()
                            .default(Expr::current_timestamp()),
                    )
                    .col(ColumnDef::new(Datalog::Source).text().default(""))
                    .col(ColumnDef::new(Datalog::Value).text())
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .if_not_exists()
                    .name("idx_date")
                    .table(Datalog::Table)
                    .col(Datalog::Date)
                    .to_owned(),
            )
            .await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_index(Index::drop().name("idx_date").table(Datalog::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(Datalog::Table).to_owned())
            .await
    }
}

#[derive(DeriveIden)]
enum Datalog {
    Table,
    Id,
    Date,
    Source,
    Value,
}
