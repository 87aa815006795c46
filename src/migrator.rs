use sea_orm_migration::prelude::*;

pub struct Migrator;

#[async_trait::async_trait]
impl MigratorTrait for Migrator {
    fn migrations() -> Vec<Box<dyn MigrationTrait>> {
        vec![
            Box::new(m20250101_000001_create_stores_table::Migration),
            Box::new(m20250101_000002_create_departments_table::Migration),
            Box::new(m20250101_000003_create_inventory_table::Migration),
            Box::new(m20250101_000004_create_transfers_table::Migration),
            Box::new(m20250101_000005_create_transfer_items_table::Migration),
            Box::new(m20250101_000006_create_inventory_changes_table::Migration),
            Box::new(m20250101_000007_create_sync_log_table::Migration),
        ]
    }
}

// Migration implementations

mod m20250101_000001_create_stores_table {

    use sea_orm_migration::prelude::*;

    pub struct Migration;

    impl MigrationName for Migration {
        fn name(&self) -> &str {
            "m20250101_000001_create_stores_table"
        }
    }

    #[async_trait::async_trait]
    impl MigrationTrait for Migration {
        async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
            manager
                .create_table(
                    Table::create()
                        .table(Stores::Table)
                        .if_not_exists()
                        .col(
                            ColumnDef::new(Stores::Id)
                                .integer()
                                .not_null()
                                .auto_increment()
                                .primary_key(),
                        )
                        .col(
                            ColumnDef::new(Stores::StoreId)
                                .string()
                                .not_null()
                                .unique_key(),
                        )
                        .col(ColumnDef::new(Stores::StoreName).string().not_null())
                        .col(ColumnDef::new(Stores::Address).string().null())
                        .col(ColumnDef::new(Stores::Phone).string().null())
                        .col(ColumnDef::new(Stores::ManagerEmail).string().null())
                        .col(
                            ColumnDef::new(Stores::IsActive)
                                .boolean()
                                .not_null()
                                .default(true),
                        )
                        .col(ColumnDef::new(Stores::CreatedAt).timestamp().not_null())
                        .to_owned(),
                )
                .await
        }

        async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
            manager
                .drop_table(Table::drop().table(Stores::Table).to_owned())
                .await
        }
    }

    #[derive(DeriveIden)]
    enum Stores {
        Table,
        Id,
        StoreId,
        StoreName,
        Address,
        Phone,
        ManagerEmail,
        IsActive,
        CreatedAt,
    }
}

mod m20250101_000002_create_departments_table {

    use sea_orm_migration::prelude::*;

    pub struct Migration;

    impl MigrationName for Migration {
        fn name(&self) -> &str {
            "m20250101_000002_create_departments_table"
        }
    }

    #[async_trait::async_trait]
    impl MigrationTrait for Migration {
        async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
            manager
                .create_table(
                    Table::create()
                        .table(Departments::Table)
                        .if_not_exists()
                        .col(
                            ColumnDef::new(Departments::Id)
                                .integer()
                                .not_null()
                                .auto_increment()
                                .primary_key(),
                        )
                        .col(ColumnDef::new(Departments::DeptId).string().not_null())
                        .col(ColumnDef::new(Departments::DeptName).string().not_null())
                        .col(ColumnDef::new(Departments::StoreId).string().null())
                        .to_owned(),
                )
                .await
        }

        async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
            manager
                .drop_table(Table::drop().table(Departments::Table).to_owned())
                .await
        }
    }

    #[derive(DeriveIden)]
    enum Departments {
        Table,
        Id,
        DeptId,
        DeptName,
        StoreId,
    }
}

mod m20250101_000003_create_inventory_table {

    use sea_orm_migration::prelude::*;

    pub struct Migration;

    impl MigrationName for Migration {
        fn name(&self) -> &str {
            "m20250101_000003_create_inventory_table"
        }
    }

    #[async_trait::async_trait]
    impl MigrationTrait for Migration {
        async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
            manager
                .create_table(
                    Table::create()
                        .table(Inventory::Table)
                        .if_not_exists()
                        .col(ColumnDef::new(Inventory::Id).uuid().primary_key().not_null())
                        .col(ColumnDef::new(Inventory::ItemNum).string().not_null())
                        .col(ColumnDef::new(Inventory::ItemName).string().not_null())
                        .col(ColumnDef::new(Inventory::StoreId).string().not_null())
                        .col(
                            ColumnDef::new(Inventory::DeptId)
                                .string()
                                .not_null()
                                .default("NONE"),
                        )
                        .col(
                            ColumnDef::new(Inventory::ItemType)
                                .integer()
                                .not_null()
                                .default(0),
                        )
                        .col(
                            ColumnDef::new(Inventory::InStock)
                                .decimal()
                                .not_null()
                                .default(0),
                        )
                        .col(
                            ColumnDef::new(Inventory::Cost)
                                .decimal()
                                .not_null()
                                .default(0),
                        )
                        .col(
                            ColumnDef::new(Inventory::Price)
                                .decimal()
                                .not_null()
                                .default(0),
                        )
                        .col(
                            ColumnDef::new(Inventory::RetailPrice)
                                .decimal()
                                .not_null()
                                .default(0),
                        )
                        .col(ColumnDef::new(Inventory::LastSyncedAt).timestamp().null())
                        .col(ColumnDef::new(Inventory::CreatedAt).timestamp().not_null())
                        .col(ColumnDef::new(Inventory::UpdatedAt).timestamp().not_null())
                        .to_owned(),
                )
                .await?;

            // One active record per (store, item)
            manager
                .create_index(
                    Index::create()
                        .if_not_exists()
                        .name("idx_inventory_store_item")
                        .table(Inventory::Table)
                        .col(Inventory::StoreId)
                        .col(Inventory::ItemNum)
                        .unique()
                        .to_owned(),
                )
                .await?;

            manager
                .create_index(
                    Index::create()
                        .if_not_exists()
                        .name("idx_inventory_item_name")
                        .table(Inventory::Table)
                        .col(Inventory::ItemName)
                        .to_owned(),
                )
                .await
        }

        async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
            manager
                .drop_table(Table::drop().table(Inventory::Table).to_owned())
                .await
        }
    }

    #[derive(DeriveIden)]
    enum Inventory {
        Table,
        Id,
        ItemNum,
        ItemName,
        StoreId,
        DeptId,
        ItemType,
        InStock,
        Cost,
        Price,
        RetailPrice,
        LastSyncedAt,
        CreatedAt,
        UpdatedAt,
    }
}

mod m20250101_000004_create_transfers_table {

    use sea_orm_migration::prelude::*;

    pub struct Migration;

    impl MigrationName for Migration {
        fn name(&self) -> &str {
            "m20250101_000004_create_transfers_table"
        }
    }

    #[async_trait::async_trait]
    impl MigrationTrait for Migration {
        async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
            manager
                .create_table(
                    Table::create()
                        .table(Transfers::Table)
                        .if_not_exists()
                        .col(ColumnDef::new(Transfers::Id).uuid().primary_key().not_null())
                        .col(
                            ColumnDef::new(Transfers::TransferNumber)
                                .string()
                                .not_null()
                                .unique_key(),
                        )
                        .col(ColumnDef::new(Transfers::FromStoreId).string().not_null())
                        .col(ColumnDef::new(Transfers::ToStoreId).string().not_null())
                        .col(ColumnDef::new(Transfers::Status).string().not_null())
                        .col(ColumnDef::new(Transfers::Notes).string().null())
                        .col(ColumnDef::new(Transfers::CreatedBy).string().not_null())
                        .col(ColumnDef::new(Transfers::CreatedAt).timestamp().not_null())
                        .col(ColumnDef::new(Transfers::ApprovedAt).timestamp().null())
                        .col(ColumnDef::new(Transfers::ShippedAt).timestamp().null())
                        .col(ColumnDef::new(Transfers::CompletedAt).timestamp().null())
                        .to_owned(),
                )
                .await?;

            manager
                .create_index(
                    Index::create()
                        .if_not_exists()
                        .name("idx_transfers_status")
                        .table(Transfers::Table)
                        .col(Transfers::Status)
                        .to_owned(),
                )
                .await?;

            manager
                .create_index(
                    Index::create()
                        .if_not_exists()
                        .name("idx_transfers_created_at")
                        .table(Transfers::Table)
                        .col(Transfers::CreatedAt)
                        .to_owned(),
                )
                .await
        }

        async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
            manager
                .drop_table(Table::drop().table(Transfers::Table).to_owned())
                .await
        }
    }

    #[derive(DeriveIden)]
    enum Transfers {
        Table,
        Id,
        TransferNumber,
        FromStoreId,
        ToStoreId,
        Status,
        Notes,
        CreatedBy,
        CreatedAt,
        ApprovedAt,
        ShippedAt,
        CompletedAt,
    }
}

mod m20250101_000005_create_transfer_items_table {

    use sea_orm_migration::prelude::*;

    pub struct Migration;

    impl MigrationName for Migration {
        fn name(&self) -> &str {
            "m20250101_000005_create_transfer_items_table"
        }
    }

    #[async_trait::async_trait]
    impl MigrationTrait for Migration {
        async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
            manager
                .create_table(
                    Table::create()
                        .table(TransferItems::Table)
                        .if_not_exists()
                        .col(
                            ColumnDef::new(TransferItems::Id)
                                .uuid()
                                .primary_key()
                                .not_null(),
                        )
                        .col(ColumnDef::new(TransferItems::TransferId).uuid().not_null())
                        .col(
                            ColumnDef::new(TransferItems::LineNumber)
                                .integer()
                                .not_null(),
                        )
                        .col(ColumnDef::new(TransferItems::ItemNum).string().not_null())
                        .col(ColumnDef::new(TransferItems::ItemName).string().not_null())
                        .col(ColumnDef::new(TransferItems::Quantity).decimal().not_null())
                        .to_owned(),
                )
                .await?;

            manager
                .create_index(
                    Index::create()
                        .if_not_exists()
                        .name("idx_transfer_items_transfer_id")
                        .table(TransferItems::Table)
                        .col(TransferItems::TransferId)
                        .to_owned(),
                )
                .await
        }

        async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
            manager
                .drop_table(Table::drop().table(TransferItems::Table).to_owned())
                .await
        }
    }

    #[derive(DeriveIden)]
    enum TransferItems {
        Table,
        Id,
        TransferId,
        LineNumber,
        ItemNum,
        ItemName,
        Quantity,
    }
}

mod m20250101_000006_create_inventory_changes_table {

    use sea_orm_migration::prelude::*;

    pub struct Migration;

    impl MigrationName for Migration {
        fn name(&self) -> &str {
            "m20250101_000006_create_inventory_changes_table"
        }
    }

    #[async_trait::async_trait]
    impl MigrationTrait for Migration {
        async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
            manager
                .create_table(
                    Table::create()
                        .table(InventoryChanges::Table)
                        .if_not_exists()
                        .col(
                            ColumnDef::new(InventoryChanges::Id)
                                .uuid()
                                .primary_key()
                                .not_null(),
                        )
                        .col(ColumnDef::new(InventoryChanges::ItemNum).string().not_null())
                        .col(
                            ColumnDef::new(InventoryChanges::ItemName)
                                .string()
                                .not_null(),
                        )
                        .col(ColumnDef::new(InventoryChanges::StoreId).string().not_null())
                        .col(
                            ColumnDef::new(InventoryChanges::ChangeType)
                                .string()
                                .not_null(),
                        )
                        .col(
                            ColumnDef::new(InventoryChanges::QuantityChange)
                                .decimal()
                                .not_null(),
                        )
                        .col(
                            ColumnDef::new(InventoryChanges::OldStock)
                                .decimal()
                                .not_null(),
                        )
                        .col(
                            ColumnDef::new(InventoryChanges::NewStock)
                                .decimal()
                                .not_null(),
                        )
                        .col(ColumnDef::new(InventoryChanges::TransferId).uuid().null())
                        .col(ColumnDef::new(InventoryChanges::Notes).string().null())
                        .col(
                            ColumnDef::new(InventoryChanges::CreatedAt)
                                .timestamp()
                                .not_null(),
                        )
                        .to_owned(),
                )
                .await?;

            manager
                .create_index(
                    Index::create()
                        .if_not_exists()
                        .name("idx_inventory_changes_store_id")
                        .table(InventoryChanges::Table)
                        .col(InventoryChanges::StoreId)
                        .to_owned(),
                )
                .await?;

            manager
                .create_index(
                    Index::create()
                        .if_not_exists()
                        .name("idx_inventory_changes_created_at")
                        .table(InventoryChanges::Table)
                        .col(InventoryChanges::CreatedAt)
                        .to_owned(),
                )
                .await
        }

        async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
            manager
                .drop_table(Table::drop().table(InventoryChanges::Table).to_owned())
                .await
        }
    }

    #[derive(DeriveIden)]
    enum InventoryChanges {
        Table,
        Id,
        ItemNum,
        ItemName,
        StoreId,
        ChangeType,
        QuantityChange,
        OldStock,
        NewStock,
        TransferId,
        Notes,
        CreatedAt,
    }
}

mod m20250101_000007_create_sync_log_table {

    use sea_orm_migration::prelude::*;

    pub struct Migration;

    impl MigrationName for Migration {
        fn name(&self) -> &str {
            "m20250101_000007_create_sync_log_table"
        }
    }

    #[async_trait::async_trait]
    impl MigrationTrait for Migration {
        async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
            manager
                .create_table(
                    Table::create()
                        .table(SyncLog::Table)
                        .if_not_exists()
                        .col(
                            ColumnDef::new(SyncLog::Id)
                                .integer()
                                .not_null()
                                .auto_increment()
                                .primary_key(),
                        )
                        .col(ColumnDef::new(SyncLog::StoreId).string().not_null())
                        .col(ColumnDef::new(SyncLog::SyncType).string().not_null())
                        .col(ColumnDef::new(SyncLog::Status).string().not_null())
                        .col(ColumnDef::new(SyncLog::StartedAt).timestamp().not_null())
                        .col(ColumnDef::new(SyncLog::CompletedAt).timestamp().null())
                        .col(ColumnDef::new(SyncLog::ErrorMessage).string().null())
                        .to_owned(),
                )
                .await?;

            manager
                .create_index(
                    Index::create()
                        .if_not_exists()
                        .name("idx_sync_log_store_id")
                        .table(SyncLog::Table)
                        .col(SyncLog::StoreId)
                        .to_owned(),
                )
                .await
        }

        async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
            manager
                .drop_table(Table::drop().table(SyncLog::Table).to_owned())
                .await
        }
    }

    #[derive(DeriveIden)]
    enum SyncLog {
        Table,
        Id,
        StoreId,
        SyncType,
        Status,
        StartedAt,
        CompletedAt,
        ErrorMessage,
    }
}
