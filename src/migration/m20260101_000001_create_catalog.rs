use sea_orm_migration::{
    MigrationTrait, SchemaManager,
    prelude::{
        ColumnDef, DbErr, DeriveIden, DeriveMigrationName, ForeignKey, ForeignKeyAction, Index,
        Table,
    },
};

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(Products::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(Products::Id)
                            .integer()
                            .not_null()
                            .auto_increment()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(Products::Sku).string_len(64).not_null().unique_key())
                    .col(ColumnDef::new(Products::Name).string_len(255).not_null())
                    .col(ColumnDef::new(Products::Category).string_len(16).not_null())
                    .col(ColumnDef::new(Products::Price).decimal_len(10, 2).not_null())
                    .col(ColumnDef::new(Products::Stock).integer().not_null())
                    .col(ColumnDef::new(Products::LowStockThreshold).integer().not_null())
                    .col(ColumnDef::new(Products::Weight).decimal_len(10, 3).not_null())
                    .col(ColumnDef::new(Products::Origin).string_len(255).not_null())
                    .col(ColumnDef::new(Products::Description).text().null())
                    .col(ColumnDef::new(Products::ImageUrl).text().not_null())
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                Table::create()
                    .table(Orders::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(Orders::Id)
                            .integer()
                            .not_null()
                            .auto_increment()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(Orders::OrderId).string_len(16).not_null().unique_key())
                    .col(ColumnDef::new(Orders::CustomerFirstName).string_len(255).not_null())
                    .col(ColumnDef::new(Orders::CustomerLastName).string_len(255).not_null())
                    .col(ColumnDef::new(Orders::CustomerEmail).string_len(255).not_null())
                    .col(ColumnDef::new(Orders::CustomerPhone).string_len(64).not_null())
                    .col(ColumnDef::new(Orders::CustomerAddress).string_len(255).not_null())
                    .col(ColumnDef::new(Orders::CustomerCity).string_len(255).not_null())
                    .col(ColumnDef::new(Orders::CustomerState).string_len(64).not_null())
                    .col(ColumnDef::new(Orders::CustomerZipCode).string_len(32).not_null())
                    .col(ColumnDef::new(Orders::Subtotal).decimal_len(10, 2).not_null())
                    .col(ColumnDef::new(Orders::ShippingCost).decimal_len(10, 2).not_null())
                    .col(ColumnDef::new(Orders::Tax).decimal_len(10, 2).not_null())
                    .col(ColumnDef::new(Orders::Total).decimal_len(10, 2).not_null())
                    .col(ColumnDef::new(Orders::OrderDate).timestamp_with_time_zone().not_null())
                    .col(ColumnDef::new(Orders::Status).string_len(16).not_null())
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                Table::create()
                    .table(OrderItems::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(OrderItems::Id)
                            .integer()
                            .not_null()
                            .auto_increment()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(OrderItems::OrderId).integer().not_null())
                    .col(ColumnDef::new(OrderItems::ProductId).integer().not_null())
                    .col(ColumnDef::new(OrderItems::ProductName).string_len(255).not_null())
                    .col(ColumnDef::new(OrderItems::ProductSku).string_len(64).not_null())
                    .col(ColumnDef::new(OrderItems::Quantity).integer().not_null())
                    .col(ColumnDef::new(OrderItems::Price).decimal_len(10, 2).not_null())
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_order_items_order")
                            .from(OrderItems::Table, OrderItems::OrderId)
                            .to(Orders::Table, Orders::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .if_not_exists()
                    .name("idx_order_items_order_id")
                    .table(OrderItems::Table)
                    .col(OrderItems::OrderId)
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                Table::create()
                    .table(AdminUsers::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(AdminUsers::Id)
                            .integer()
                            .not_null()
                            .auto_increment()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(AdminUsers::Username).string_len(128).not_null().unique_key())
                    .col(ColumnDef::new(AdminUsers::PasswordHash).string_len(255).not_null())
                    .col(ColumnDef::new(AdminUsers::CreatedAt).timestamp_with_time_zone().not_null())
                    .to_owned(),
            )
            .await
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(AdminUsers::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(OrderItems::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(Orders::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(Products::Table).to_owned())
            .await
    }
}

#[derive(DeriveIden)]
enum Products {
    Table,
    Id,
    Sku,
    Name,
    Category,
    Price,
    Stock,
    LowStockThreshold,
    Weight,
    Origin,
    Description,
    ImageUrl,
}

#[derive(DeriveIden)]
enum Orders {
    Table,
    Id,
    OrderId,
    CustomerFirstName,
    CustomerLastName,
    CustomerEmail,
    CustomerPhone,
    CustomerAddress,
    CustomerCity,
    CustomerState,
    CustomerZipCode,
    Subtotal,
    ShippingCost,
    Tax,
    Total,
    OrderDate,
    Status,
}

#[derive(DeriveIden)]
enum OrderItems {
    Table,
    Id,
    OrderId,
    ProductId,
    ProductName,
    ProductSku,
    Quantity,
    Price,
}

#[derive(DeriveIden)]
enum AdminUsers {
    Table,
    Id,
    Username,
    PasswordHash,
    CreatedAt,
}
