use sea_orm_migration::prelude::*;

pub struct Migrator;

#[async_trait::async_trait]
impl MigratorTrait for Migrator {
    fn migrations() -> Vec<Box<dyn MigrationTrait>> {
        vec![
            Box::new(m20250601_000001_create_inventory_items_table::Migration),
            Box::new(m20250601_000002_create_sale_records_table::Migration),
        ]
    }
}

// Migration implementations

mod m20250601_000001_create_inventory_items_table {
    use sea_orm_migration::prelude::*;

    pub struct Migration;

    impl MigrationName for Migration {
        fn name(&self) -> &str {
            "m20250601_000001_create_inventory_items_table"
        }
    }

    #[async_trait::async_trait]
    impl MigrationTrait for Migration {
        async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
            manager
                .create_table(
                    Table::create()
                        .table(InventoryItems::Table)
                        .if_not_exists()
                        .col(
                            ColumnDef::new(InventoryItems::Id)
                                .uuid()
                                .primary_key()
                                .not_null(),
                        )
                        .col(ColumnDef::new(InventoryItems::OwnerId).uuid().not_null())
                        .col(ColumnDef::new(InventoryItems::ItemName).string().not_null())
                        .col(
                            ColumnDef::new(InventoryItems::ItemNameKey)
                                .string()
                                .not_null(),
                        )
                        .col(
                            ColumnDef::new(InventoryItems::Quantity)
                                .decimal()
                                .not_null(),
                        )
                        .col(ColumnDef::new(InventoryItems::Price).decimal().not_null())
                        .col(
                            ColumnDef::new(InventoryItems::StockUnit)
                                .string()
                                .not_null(),
                        )
                        .col(
                            ColumnDef::new(InventoryItems::StockUnitKey)
                                .string()
                                .not_null(),
                        )
                        .col(
                            ColumnDef::new(InventoryItems::SellingUnit)
                                .string()
                                .not_null(),
                        )
                        .col(
                            ColumnDef::new(InventoryItems::ConversionFactor)
                                .decimal()
                                .not_null(),
                        )
                        .col(
                            ColumnDef::new(InventoryItems::DefaultSellingPricePerUnit)
                                .decimal()
                                .not_null(),
                        )
                        .col(ColumnDef::new(InventoryItems::Supplier).string().null())
                        .col(
                            ColumnDef::new(InventoryItems::CreatedAt)
                                .timestamp_with_time_zone()
                                .not_null(),
                        )
                        .col(
                            ColumnDef::new(InventoryItems::UpdatedAt)
                                .timestamp_with_time_zone()
                                .not_null(),
                        )
                        .to_owned(),
                )
                .await?;

            // Composite uniqueness: one row per (owner, item name, stock unit),
            // compared case-insensitively through the *_key columns. The store
            // enforces this so a concurrent create/create race surfaces as a
            // constraint violation instead of a duplicate item.
            manager
                .create_index(
                    Index::create()
                        .if_not_exists()
                        .name("idx_inventory_items_owner_name_unit")
                        .table(InventoryItems::Table)
                        .col(InventoryItems::OwnerId)
                        .col(InventoryItems::ItemNameKey)
                        .col(InventoryItems::StockUnitKey)
                        .unique()
                        .to_owned(),
                )
                .await?;

            manager
                .create_index(
                    Index::create()
                        .if_not_exists()
                        .name("idx_inventory_items_owner_updated")
                        .table(InventoryItems::Table)
                        .col(InventoryItems::OwnerId)
                        .col(InventoryItems::UpdatedAt)
                        .to_owned(),
                )
                .await
        }

        async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
            manager
                .drop_table(Table::drop().table(InventoryItems::Table).to_owned())
                .await
        }
    }

    #[derive(DeriveIden)]
    enum InventoryItems {
        Table,
        Id,
        OwnerId,
        ItemName,
        ItemNameKey,
        Quantity,
        Price,
        StockUnit,
        StockUnitKey,
        SellingUnit,
        ConversionFactor,
        DefaultSellingPricePerUnit,
        Supplier,
        CreatedAt,
        UpdatedAt,
    }
}

mod m20250601_000002_create_sale_records_table {
    use sea_orm_migration::prelude::*;

    pub struct Migration;

    impl MigrationName for Migration {
        fn name(&self) -> &str {
            "m20250601_000002_create_sale_records_table"
        }
    }

    #[async_trait::async_trait]
    impl MigrationTrait for Migration {
        async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
            // item_id intentionally carries no foreign key: sale records are
            // historical snapshots and must survive item deletion.
            manager
                .create_table(
                    Table::create()
                        .table(SaleRecords::Table)
                        .if_not_exists()
                        .col(
                            ColumnDef::new(SaleRecords::Id)
                                .uuid()
                                .primary_key()
                                .not_null(),
                        )
                        .col(ColumnDef::new(SaleRecords::OwnerId).uuid().not_null())
                        .col(ColumnDef::new(SaleRecords::ItemId).uuid().not_null())
                        .col(ColumnDef::new(SaleRecords::ItemName).string().not_null())
                        .col(
                            ColumnDef::new(SaleRecords::QuantitySold)
                                .decimal()
                                .not_null(),
                        )
                        .col(
                            ColumnDef::new(SaleRecords::SellingPrice)
                                .decimal()
                                .not_null(),
                        )
                        .col(
                            ColumnDef::new(SaleRecords::CostPriceAtTimeOfSale)
                                .decimal()
                                .not_null(),
                        )
                        .col(ColumnDef::new(SaleRecords::Profit).decimal().not_null())
                        .col(ColumnDef::new(SaleRecords::UnitSold).string().not_null())
                        .col(
                            ColumnDef::new(SaleRecords::SaleDate)
                                .timestamp_with_time_zone()
                                .not_null(),
                        )
                        .col(
                            ColumnDef::new(SaleRecords::CreatedAt)
                                .timestamp_with_time_zone()
                                .not_null(),
                        )
                        .col(
                            ColumnDef::new(SaleRecords::UpdatedAt)
                                .timestamp_with_time_zone()
                                .not_null(),
                        )
                        .to_owned(),
                )
                .await?;

            manager
                .create_index(
                    Index::create()
                        .if_not_exists()
                        .name("idx_sale_records_owner_sale_date")
                        .table(SaleRecords::Table)
                        .col(SaleRecords::OwnerId)
                        .col(SaleRecords::SaleDate)
                        .to_owned(),
                )
                .await
        }

        async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
            manager
                .drop_table(Table::drop().table(SaleRecords::Table).to_owned())
                .await
        }
    }

    #[derive(DeriveIden)]
    enum SaleRecords {
        Table,
        Id,
        OwnerId,
        ItemId,
        ItemName,
        QuantitySold,
        SellingPrice,
        CostPriceAtTimeOfSale,
        Profit,
        UnitSold,
        SaleDate,
        CreatedAt,
        UpdatedAt,
    }
}
