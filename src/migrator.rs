// The sea-orm `MigrationTrait` signatures elide the `SchemaManager<'_>` lifetime
// in a path, which `#![deny(rust_2018_idioms)]` flags; the trait's lifetime is
// late-bound so an explicit `<'_>` does not type-check (E0195). Allow the lint
// here to match the trait's required signature.
#![allow(elided_lifetimes_in_paths)]

use sea_orm_migration::prelude::*;

pub struct Migrator;

#[async_trait::async_trait]
impl MigratorTrait for Migrator {
    fn migrations() -> Vec<Box<dyn MigrationTrait>> {
        vec![
            Box::new(m20250101_000001_create_parties_table::Migration),
            Box::new(m20250101_000002_create_products_table::Migration),
            Box::new(m20250101_000003_create_stock_movements_table::Migration),
            Box::new(m20250101_000004_create_orders_tables::Migration),
            Box::new(m20250101_000005_create_finance_tables::Migration),
            Box::new(m20250101_000006_create_payment_schedule_tables::Migration),
        ]
    }
}

// Migration implementations

mod m20250101_000001_create_parties_table {
    use sea_orm_migration::prelude::*;

    pub struct Migration;

    impl MigrationName for Migration {
        fn name(&self) -> &str {
            "m20250101_000001_create_parties_table"
        }
    }

    #[async_trait::async_trait]
    impl MigrationTrait for Migration {
        async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
            manager
                .create_table(
                    Table::create()
                        .table(Parties::Table)
                        .if_not_exists()
                        .col(ColumnDef::new(Parties::Id).uuid().primary_key().not_null())
                        .col(ColumnDef::new(Parties::Name).string().not_null())
                        .col(ColumnDef::new(Parties::Kind).string_len(16).not_null())
                        .col(ColumnDef::new(Parties::Email).string().null())
                        .col(ColumnDef::new(Parties::Phone).string().null())
                        .col(ColumnDef::new(Parties::Address).string().null())
                        .col(
                            ColumnDef::new(Parties::IsActive)
                                .boolean()
                                .not_null()
                                .default(true),
                        )
                        .col(ColumnDef::new(Parties::CreatedAt).timestamp().not_null())
                        .col(ColumnDef::new(Parties::UpdatedAt).timestamp().null())
                        .to_owned(),
                )
                .await?;

            manager
                .create_index(
                    Index::create()
                        .name("idx_parties_kind")
                        .table(Parties::Table)
                        .col(Parties::Kind)
                        .to_owned(),
                )
                .await
        }

        async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
            manager
                .drop_table(Table::drop().table(Parties::Table).to_owned())
                .await
        }
    }

    #[derive(Iden)]
    pub enum Parties {
        Table,
        Id,
        Name,
        Kind,
        Email,
        Phone,
        Address,
        IsActive,
        CreatedAt,
        UpdatedAt,
    }
}

mod m20250101_000002_create_products_table {
    use sea_orm_migration::prelude::*;

    pub struct Migration;

    impl MigrationName for Migration {
        fn name(&self) -> &str {
            "m20250101_000002_create_products_table"
        }
    }

    #[async_trait::async_trait]
    impl MigrationTrait for Migration {
        async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
            manager
                .create_table(
                    Table::create()
                        .table(Products::Table)
                        .if_not_exists()
                        .col(ColumnDef::new(Products::Id).uuid().primary_key().not_null())
                        .col(ColumnDef::new(Products::Sku).string().not_null().unique_key())
                        .col(ColumnDef::new(Products::Name).string().not_null())
                        .col(ColumnDef::new(Products::Unit).string().not_null())
                        .col(
                            ColumnDef::new(Products::UnitPrice)
                                .decimal()
                                .not_null()
                                .default(0),
                        )
                        .col(
                            ColumnDef::new(Products::MinimumStock)
                                .decimal()
                                .not_null()
                                .default(0),
                        )
                        .col(
                            ColumnDef::new(Products::ReorderQuantity)
                                .decimal()
                                .not_null()
                                .default(0),
                        )
                        .col(
                            ColumnDef::new(Products::TrackStock)
                                .boolean()
                                .not_null()
                                .default(true),
                        )
                        .col(
                            ColumnDef::new(Products::IsActive)
                                .boolean()
                                .not_null()
                                .default(true),
                        )
                        .col(
                            ColumnDef::new(Products::StockOnHand)
                                .decimal()
                                .not_null()
                                .default(0),
                        )
                        .col(ColumnDef::new(Products::CreatedAt).timestamp().not_null())
                        .col(ColumnDef::new(Products::UpdatedAt).timestamp().null())
                        .to_owned(),
                )
                .await
        }

        async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
            manager
                .drop_table(Table::drop().table(Products::Table).to_owned())
                .await
        }
    }

    #[derive(Iden)]
    pub enum Products {
        Table,
        Id,
        Sku,
        Name,
        Unit,
        UnitPrice,
        MinimumStock,
        ReorderQuantity,
        TrackStock,
        IsActive,
        StockOnHand,
        CreatedAt,
        UpdatedAt,
    }
}

mod m20250101_000003_create_stock_movements_table {
    use sea_orm_migration::prelude::*;

    use super::m20250101_000002_create_products_table::Products;

    pub struct Migration;

    impl MigrationName for Migration {
        fn name(&self) -> &str {
            "m20250101_000003_create_stock_movements_table"
        }
    }

    #[async_trait::async_trait]
    impl MigrationTrait for Migration {
        async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
            manager
                .create_table(
                    Table::create()
                        .table(StockMovements::Table)
                        .if_not_exists()
                        .col(
                            ColumnDef::new(StockMovements::Id)
                                .big_integer()
                                .not_null()
                                .auto_increment()
                                .primary_key(),
                        )
                        .col(ColumnDef::new(StockMovements::ProductId).uuid().not_null())
                        .col(
                            ColumnDef::new(StockMovements::MovementType)
                                .string_len(32)
                                .not_null(),
                        )
                        .col(ColumnDef::new(StockMovements::Quantity).decimal().not_null())
                        .col(
                            ColumnDef::new(StockMovements::QuantityBefore)
                                .decimal()
                                .not_null(),
                        )
                        .col(
                            ColumnDef::new(StockMovements::QuantityAfter)
                                .decimal()
                                .not_null(),
                        )
                        .col(ColumnDef::new(StockMovements::UnitPrice).decimal().null())
                        .col(ColumnDef::new(StockMovements::OrderId).uuid().null())
                        .col(ColumnDef::new(StockMovements::Location).string().null())
                        .col(ColumnDef::new(StockMovements::Remarks).string().null())
                        .col(ColumnDef::new(StockMovements::CreatedBy).uuid().not_null())
                        .col(ColumnDef::new(StockMovements::ApprovedBy).uuid().null())
                        .col(
                            ColumnDef::new(StockMovements::CreatedAt)
                                .timestamp()
                                .not_null(),
                        )
                        .foreign_key(
                            ForeignKey::create()
                                .name("fk_stock_movements_product")
                                .from(StockMovements::Table, StockMovements::ProductId)
                                .to(Products::Table, Products::Id)
                                .on_delete(ForeignKeyAction::Restrict),
                        )
                        .to_owned(),
                )
                .await?;

            manager
                .create_index(
                    Index::create()
                        .name("idx_stock_movements_product")
                        .table(StockMovements::Table)
                        .col(StockMovements::ProductId)
                        .col(StockMovements::Id)
                        .to_owned(),
                )
                .await?;

            manager
                .create_index(
                    Index::create()
                        .name("idx_stock_movements_order")
                        .table(StockMovements::Table)
                        .col(StockMovements::OrderId)
                        .to_owned(),
                )
                .await
        }

        async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
            manager
                .drop_table(Table::drop().table(StockMovements::Table).to_owned())
                .await
        }
    }

    #[derive(Iden)]
    pub enum StockMovements {
        Table,
        Id,
        ProductId,
        MovementType,
        Quantity,
        QuantityBefore,
        QuantityAfter,
        UnitPrice,
        OrderId,
        Location,
        Remarks,
        CreatedBy,
        ApprovedBy,
        CreatedAt,
    }
}

mod m20250101_000004_create_orders_tables {
    use sea_orm_migration::prelude::*;

    use super::m20250101_000001_create_parties_table::Parties;
    use super::m20250101_000002_create_products_table::Products;

    pub struct Migration;

    impl MigrationName for Migration {
        fn name(&self) -> &str {
            "m20250101_000004_create_orders_tables"
        }
    }

    #[async_trait::async_trait]
    impl MigrationTrait for Migration {
        async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
            manager
                .create_table(
                    Table::create()
                        .table(Orders::Table)
                        .if_not_exists()
                        .col(ColumnDef::new(Orders::Id).uuid().primary_key().not_null())
                        .col(
                            ColumnDef::new(Orders::ReferenceNumber)
                                .string()
                                .not_null()
                                .unique_key(),
                        )
                        .col(ColumnDef::new(Orders::OrderType).string_len(16).not_null())
                        .col(ColumnDef::new(Orders::PartyId).uuid().not_null())
                        .col(ColumnDef::new(Orders::Status).string_len(16).not_null())
                        .col(ColumnDef::new(Orders::OrderDate).timestamp().not_null())
                        .col(ColumnDef::new(Orders::ExpectedDate).timestamp().null())
                        .col(ColumnDef::new(Orders::Subtotal).decimal().not_null().default(0))
                        .col(
                            ColumnDef::new(Orders::DiscountPercent)
                                .decimal()
                                .not_null()
                                .default(0),
                        )
                        .col(
                            ColumnDef::new(Orders::DiscountAmount)
                                .decimal()
                                .not_null()
                                .default(0),
                        )
                        .col(
                            ColumnDef::new(Orders::TaxPercent)
                                .decimal()
                                .not_null()
                                .default(0),
                        )
                        .col(
                            ColumnDef::new(Orders::TaxAmount)
                                .decimal()
                                .not_null()
                                .default(0),
                        )
                        .col(
                            ColumnDef::new(Orders::TotalAmount)
                                .decimal()
                                .not_null()
                                .default(0),
                        )
                        .col(ColumnDef::new(Orders::Notes).string().null())
                        .col(ColumnDef::new(Orders::QuoteId).uuid().null())
                        .col(ColumnDef::new(Orders::ConvertedOrderId).uuid().null())
                        .col(ColumnDef::new(Orders::CreatedBy).uuid().not_null())
                        .col(ColumnDef::new(Orders::CreatedAt).timestamp().not_null())
                        .col(ColumnDef::new(Orders::UpdatedAt).timestamp().null())
                        .col(ColumnDef::new(Orders::Version).integer().not_null().default(1))
                        .foreign_key(
                            ForeignKey::create()
                                .name("fk_orders_party")
                                .from(Orders::Table, Orders::PartyId)
                                .to(Parties::Table, Parties::Id)
                                .on_delete(ForeignKeyAction::Restrict),
                        )
                        .to_owned(),
                )
                .await?;

            manager
                .create_index(
                    Index::create()
                        .name("idx_orders_type_status")
                        .table(Orders::Table)
                        .col(Orders::OrderType)
                        .col(Orders::Status)
                        .to_owned(),
                )
                .await?;

            manager
                .create_table(
                    Table::create()
                        .table(OrderLines::Table)
                        .if_not_exists()
                        .col(ColumnDef::new(OrderLines::Id).uuid().primary_key().not_null())
                        .col(ColumnDef::new(OrderLines::OrderId).uuid().not_null())
                        .col(ColumnDef::new(OrderLines::LineNumber).integer().not_null())
                        .col(ColumnDef::new(OrderLines::ProductId).uuid().not_null())
                        .col(ColumnDef::new(OrderLines::Description).string().null())
                        .col(ColumnDef::new(OrderLines::Quantity).decimal().not_null())
                        .col(ColumnDef::new(OrderLines::UnitPrice).decimal().not_null())
                        .col(
                            ColumnDef::new(OrderLines::DiscountPercent)
                                .decimal()
                                .not_null()
                                .default(0),
                        )
                        .col(
                            ColumnDef::new(OrderLines::TaxPercent)
                                .decimal()
                                .not_null()
                                .default(0),
                        )
                        .col(ColumnDef::new(OrderLines::LineTotal).decimal().not_null())
                        .foreign_key(
                            ForeignKey::create()
                                .name("fk_order_lines_order")
                                .from(OrderLines::Table, OrderLines::OrderId)
                                .to(Orders::Table, Orders::Id)
                                .on_delete(ForeignKeyAction::Cascade),
                        )
                        .foreign_key(
                            ForeignKey::create()
                                .name("fk_order_lines_product")
                                .from(OrderLines::Table, OrderLines::ProductId)
                                .to(Products::Table, Products::Id)
                                .on_delete(ForeignKeyAction::Restrict),
                        )
                        .to_owned(),
                )
                .await?;

            manager
                .create_index(
                    Index::create()
                        .name("idx_order_lines_order")
                        .table(OrderLines::Table)
                        .col(OrderLines::OrderId)
                        .col(OrderLines::LineNumber)
                        .to_owned(),
                )
                .await
        }

        async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
            manager
                .drop_table(Table::drop().table(OrderLines::Table).to_owned())
                .await?;
            manager
                .drop_table(Table::drop().table(Orders::Table).to_owned())
                .await
        }
    }

    #[derive(Iden)]
    pub enum Orders {
        Table,
        Id,
        ReferenceNumber,
        OrderType,
        PartyId,
        Status,
        OrderDate,
        ExpectedDate,
        Subtotal,
        DiscountPercent,
        DiscountAmount,
        TaxPercent,
        TaxAmount,
        TotalAmount,
        Notes,
        QuoteId,
        ConvertedOrderId,
        CreatedBy,
        CreatedAt,
        UpdatedAt,
        Version,
    }

    #[derive(Iden)]
    pub enum OrderLines {
        Table,
        Id,
        OrderId,
        LineNumber,
        ProductId,
        Description,
        Quantity,
        UnitPrice,
        DiscountPercent,
        TaxPercent,
        LineTotal,
    }
}

mod m20250101_000005_create_finance_tables {
    use sea_orm_migration::prelude::*;

    use super::m20250101_000001_create_parties_table::Parties;

    pub struct Migration;

    impl MigrationName for Migration {
        fn name(&self) -> &str {
            "m20250101_000005_create_finance_tables"
        }
    }

    #[async_trait::async_trait]
    impl MigrationTrait for Migration {
        async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
            manager
                .create_table(
                    Table::create()
                        .table(Vouchers::Table)
                        .if_not_exists()
                        .col(ColumnDef::new(Vouchers::Id).uuid().primary_key().not_null())
                        .col(ColumnDef::new(Vouchers::Kind).string_len(16).not_null())
                        .col(ColumnDef::new(Vouchers::PartyId).uuid().not_null())
                        .col(ColumnDef::new(Vouchers::Amount).decimal().not_null())
                        .col(ColumnDef::new(Vouchers::Status).string_len(16).not_null())
                        .col(ColumnDef::new(Vouchers::IssuedDate).timestamp().not_null())
                        .col(ColumnDef::new(Vouchers::SettledDate).timestamp().null())
                        .col(ColumnDef::new(Vouchers::SettledAmount).decimal().null())
                        .col(ColumnDef::new(Vouchers::SettlementMethod).string().null())
                        .col(ColumnDef::new(Vouchers::Notes).string().null())
                        .col(ColumnDef::new(Vouchers::CreatedBy).uuid().not_null())
                        .col(ColumnDef::new(Vouchers::CreatedAt).timestamp().not_null())
                        .col(ColumnDef::new(Vouchers::UpdatedAt).timestamp().null())
                        .foreign_key(
                            ForeignKey::create()
                                .name("fk_vouchers_party")
                                .from(Vouchers::Table, Vouchers::PartyId)
                                .to(Parties::Table, Parties::Id)
                                .on_delete(ForeignKeyAction::Restrict),
                        )
                        .to_owned(),
                )
                .await?;

            manager
                .create_index(
                    Index::create()
                        .name("idx_vouchers_status")
                        .table(Vouchers::Table)
                        .col(Vouchers::Status)
                        .to_owned(),
                )
                .await?;

            manager
                .create_table(
                    Table::create()
                        .table(FinancialTransactions::Table)
                        .if_not_exists()
                        .col(
                            ColumnDef::new(FinancialTransactions::Id)
                                .uuid()
                                .primary_key()
                                .not_null(),
                        )
                        .col(
                            ColumnDef::new(FinancialTransactions::Kind)
                                .string_len(16)
                                .not_null(),
                        )
                        .col(ColumnDef::new(FinancialTransactions::Category).string().not_null())
                        .col(ColumnDef::new(FinancialTransactions::Subcategory).string().null())
                        .col(ColumnDef::new(FinancialTransactions::Amount).decimal().not_null())
                        .col(
                            ColumnDef::new(FinancialTransactions::TransactionDate)
                                .timestamp()
                                .not_null(),
                        )
                        .col(ColumnDef::new(FinancialTransactions::PartyId).uuid().null())
                        .col(ColumnDef::new(FinancialTransactions::VoucherId).uuid().null())
                        .col(ColumnDef::new(FinancialTransactions::OrderId).uuid().null())
                        .col(
                            ColumnDef::new(FinancialTransactions::PaymentMethod)
                                .string()
                                .null(),
                        )
                        .col(ColumnDef::new(FinancialTransactions::Remarks).string().null())
                        .col(ColumnDef::new(FinancialTransactions::Tags).string().null())
                        .col(ColumnDef::new(FinancialTransactions::CreatedBy).uuid().not_null())
                        .col(
                            ColumnDef::new(FinancialTransactions::CreatedAt)
                                .timestamp()
                                .not_null(),
                        )
                        .foreign_key(
                            ForeignKey::create()
                                .name("fk_financial_transactions_voucher")
                                .from(FinancialTransactions::Table, FinancialTransactions::VoucherId)
                                .to(Vouchers::Table, Vouchers::Id)
                                .on_delete(ForeignKeyAction::Restrict),
                        )
                        .to_owned(),
                )
                .await?;

            manager
                .create_index(
                    Index::create()
                        .name("idx_financial_transactions_date")
                        .table(FinancialTransactions::Table)
                        .col(FinancialTransactions::TransactionDate)
                        .to_owned(),
                )
                .await
        }

        async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
            manager
                .drop_table(
                    Table::drop()
                        .table(FinancialTransactions::Table)
                        .to_owned(),
                )
                .await?;
            manager
                .drop_table(Table::drop().table(Vouchers::Table).to_owned())
                .await
        }
    }

    #[derive(Iden)]
    pub enum Vouchers {
        Table,
        Id,
        Kind,
        PartyId,
        Amount,
        Status,
        IssuedDate,
        SettledDate,
        SettledAmount,
        SettlementMethod,
        Notes,
        CreatedBy,
        CreatedAt,
        UpdatedAt,
    }

    #[derive(Iden)]
    pub enum FinancialTransactions {
        Table,
        Id,
        Kind,
        Category,
        Subcategory,
        Amount,
        TransactionDate,
        PartyId,
        VoucherId,
        OrderId,
        PaymentMethod,
        Remarks,
        Tags,
        CreatedBy,
        CreatedAt,
    }
}

mod m20250101_000006_create_payment_schedule_tables {
    use sea_orm_migration::prelude::*;

    use super::m20250101_000004_create_orders_tables::Orders;

    pub struct Migration;

    impl MigrationName for Migration {
        fn name(&self) -> &str {
            "m20250101_000006_create_payment_schedule_tables"
        }
    }

    #[async_trait::async_trait]
    impl MigrationTrait for Migration {
        async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
            manager
                .create_table(
                    Table::create()
                        .table(PaymentScheduleModels::Table)
                        .if_not_exists()
                        .col(
                            ColumnDef::new(PaymentScheduleModels::Id)
                                .uuid()
                                .primary_key()
                                .not_null(),
                        )
                        .col(
                            ColumnDef::new(PaymentScheduleModels::Name)
                                .string()
                                .not_null()
                                .unique_key(),
                        )
                        .col(
                            ColumnDef::new(PaymentScheduleModels::Description)
                                .string()
                                .null(),
                        )
                        .col(
                            ColumnDef::new(PaymentScheduleModels::IsActive)
                                .boolean()
                                .not_null()
                                .default(true),
                        )
                        .col(
                            ColumnDef::new(PaymentScheduleModels::CreatedBy)
                                .uuid()
                                .not_null(),
                        )
                        .col(
                            ColumnDef::new(PaymentScheduleModels::CreatedAt)
                                .timestamp()
                                .not_null(),
                        )
                        .to_owned(),
                )
                .await?;

            manager
                .create_table(
                    Table::create()
                        .table(PaymentScheduleTerms::Table)
                        .if_not_exists()
                        .col(
                            ColumnDef::new(PaymentScheduleTerms::Id)
                                .uuid()
                                .primary_key()
                                .not_null(),
                        )
                        .col(ColumnDef::new(PaymentScheduleTerms::ModelId).uuid().not_null())
                        .col(
                            ColumnDef::new(PaymentScheduleTerms::SortOrder)
                                .integer()
                                .not_null(),
                        )
                        .col(
                            ColumnDef::new(PaymentScheduleTerms::DayOffset)
                                .integer()
                                .not_null(),
                        )
                        .col(
                            ColumnDef::new(PaymentScheduleTerms::Percentage)
                                .decimal()
                                .not_null(),
                        )
                        .col(
                            ColumnDef::new(PaymentScheduleTerms::Description)
                                .string()
                                .null(),
                        )
                        .foreign_key(
                            ForeignKey::create()
                                .name("fk_payment_schedule_terms_model")
                                .from(PaymentScheduleTerms::Table, PaymentScheduleTerms::ModelId)
                                .to(PaymentScheduleModels::Table, PaymentScheduleModels::Id)
                                .on_delete(ForeignKeyAction::Cascade),
                        )
                        .to_owned(),
                )
                .await?;

            manager
                .create_index(
                    Index::create()
                        .name("idx_payment_schedule_terms_model_order")
                        .table(PaymentScheduleTerms::Table)
                        .col(PaymentScheduleTerms::ModelId)
                        .col(PaymentScheduleTerms::SortOrder)
                        .unique()
                        .to_owned(),
                )
                .await?;

            manager
                .create_table(
                    Table::create()
                        .table(PaymentSchedules::Table)
                        .if_not_exists()
                        .col(
                            ColumnDef::new(PaymentSchedules::Id)
                                .uuid()
                                .primary_key()
                                .not_null(),
                        )
                        .col(ColumnDef::new(PaymentSchedules::OrderId).uuid().not_null())
                        .col(ColumnDef::new(PaymentSchedules::ModelId).uuid().not_null())
                        .col(ColumnDef::new(PaymentSchedules::DueDate).date().not_null())
                        .col(ColumnDef::new(PaymentSchedules::Amount).decimal().not_null())
                        .col(
                            ColumnDef::new(PaymentSchedules::Percentage)
                                .decimal()
                                .not_null(),
                        )
                        .col(ColumnDef::new(PaymentSchedules::Description).string().null())
                        .col(ColumnDef::new(PaymentSchedules::Status).string_len(16).not_null())
                        .col(ColumnDef::new(PaymentSchedules::CreatedBy).uuid().not_null())
                        .col(
                            ColumnDef::new(PaymentSchedules::CreatedAt)
                                .timestamp()
                                .not_null(),
                        )
                        .col(ColumnDef::new(PaymentSchedules::UpdatedAt).timestamp().null())
                        .foreign_key(
                            ForeignKey::create()
                                .name("fk_payment_schedules_order")
                                .from(PaymentSchedules::Table, PaymentSchedules::OrderId)
                                .to(Orders::Table, Orders::Id)
                                .on_delete(ForeignKeyAction::Restrict),
                        )
                        .foreign_key(
                            ForeignKey::create()
                                .name("fk_payment_schedules_model")
                                .from(PaymentSchedules::Table, PaymentSchedules::ModelId)
                                .to(PaymentScheduleModels::Table, PaymentScheduleModels::Id)
                                .on_delete(ForeignKeyAction::Restrict),
                        )
                        .to_owned(),
                )
                .await?;

            manager
                .create_index(
                    Index::create()
                        .name("idx_payment_schedules_order")
                        .table(PaymentSchedules::Table)
                        .col(PaymentSchedules::OrderId)
                        .to_owned(),
                )
                .await
        }

        async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
            manager
                .drop_table(Table::drop().table(PaymentSchedules::Table).to_owned())
                .await?;
            manager
                .drop_table(Table::drop().table(PaymentScheduleTerms::Table).to_owned())
                .await?;
            manager
                .drop_table(
                    Table::drop()
                        .table(PaymentScheduleModels::Table)
                        .to_owned(),
                )
                .await
        }
    }

    #[derive(Iden)]
    pub enum PaymentScheduleModels {
        Table,
        Id,
        Name,
        Description,
        IsActive,
        CreatedBy,
        CreatedAt,
    }

    #[derive(Iden)]
    pub enum PaymentScheduleTerms {
        Table,
        Id,
        ModelId,
        SortOrder,
        DayOffset,
        Percentage,
        Description,
    }

    #[derive(Iden)]
    pub enum PaymentSchedules {
        Table,
        Id,
        OrderId,
        ModelId,
        DueDate,
        Amount,
        Percentage,
        Description,
        Status,
        CreatedBy,
        CreatedAt,
        UpdatedAt,
    }
}
