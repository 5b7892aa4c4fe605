use sea_orm_migration::prelude::*;

pub struct Migrator;

#[async_trait::async_trait]
impl MigratorTrait for Migrator {
    fn migrations() -> Vec<Box<dyn MigrationTrait>> {
        vec![Box::new(m20250101_000001_create_items_table::Migration)]
    }
}

mod m20250101_000001_create_items_table {

    use sea_orm_migration::prelude::*;
    use sea_orm_migration::sea_orm::DatabaseBackend;

    pub struct Migration;

    impl MigrationName for Migration {
        fn name(&self) -> &str {
            "m20250101_000001_create_items_table"
        }
    }

    #[async_trait::async_trait]
    impl MigrationTrait for Migration {
        async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
            // SQLite gives NUMERIC columns integer storage for whole values,
            // which sea-orm cannot decode back into a decimal. REAL keeps every
            // price a float there.
            let mut price = ColumnDef::new(Items::Price);
            match manager.get_database_backend() {
                DatabaseBackend::Sqlite => price.double(),
                _ => price.decimal_len(12, 2),
            };
            price.null();

            manager
                .create_table(
                    Table::create()
                        .table(Items::Table)
                        .if_not_exists()
                        .col(ColumnDef::new(Items::Id).string().primary_key().not_null())
                        .col(ColumnDef::new(Items::Name).string().not_null())
                        .col(ColumnDef::new(Items::Quantity).integer().not_null())
                        .col(
                            ColumnDef::new(Items::Category)
                                .string()
                                .not_null()
                                .default("Uncategorized"),
                        )
                        .col(ColumnDef::new(Items::Description).text().null())
                        .col(&mut price)
                        .col(
                            ColumnDef::new(Items::CreatedAt)
                                .timestamp_with_time_zone()
                                .not_null(),
                        )
                        .to_owned(),
                )
                .await?;

            manager
                .create_index(
                    Index::create()
                        .name("idx_items_name")
                        .table(Items::Table)
                        .col(Items::Name)
                        .if_not_exists()
                        .to_owned(),
                )
                .await
        }

        async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
            manager
                .drop_table(Table::drop().table(Items::Table).to_owned())
                .await
        }
    }

    #[derive(DeriveIden)]
    enum Items {
        Table,
        Id,
        Name,
        Quantity,
        Category,
        Description,
        Price,
        CreatedAt,
    }
}
