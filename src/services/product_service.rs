use std::str::FromStr;

use sea_orm::{
    ActiveModelTrait, ColumnTrait, Condition, EntityTrait, QueryFilter, QueryOrder, Set,
};
use sea_orm::ActiveValue::NotSet;
use sea_orm::sea_query::Expr;

use crate::{
    db::is_unique_violation,
    dto::products::{ProductInput, ProductRecord},
    entity::products::{ActiveModel, Column, Entity as Products, Model as ProductModel},
    error::{AppError, AppResult},
    images,
    models::{Category, Product},
    routes::params::{ProductQuery, StockFilter},
    state::AppState,
};

pub async fn list_products(state: &AppState, query: ProductQuery) -> AppResult<Vec<Product>> {
    let mut condition = Condition::all();

    if let Some(category) = query.category {
        condition = condition.add(Column::Category.eq(category.as_str()));
    }

    match query.stock {
        Some(StockFilter::Low) => {
            condition = condition
                .add(Column::Stock.gt(0))
                .add(Expr::col(Column::Stock).lte(Expr::col(Column::LowStockThreshold)));
        }
        Some(StockFilter::Out) => {
            condition = condition.add(Column::Stock.eq(0));
        }
        None => {}
    }

    Products::find()
        .filter(condition)
        .order_by_asc(Column::Id)
        .all(&state.orm)
        .await?
        .into_iter()
        .map(product_from_entity)
        .collect()
}

/// Looks a product up by numeric id, or by SKU when `key` is not a number.
pub async fn get_product(state: &AppState, key: &str) -> AppResult<Product> {
    let finder = match key.parse::<i32>() {
        Ok(id) => Products::find_by_id(id),
        Err(_) => Products::find().filter(Column::Sku.eq(key)),
    };
    let model = finder
        .one(&state.orm)
        .await?
        .ok_or_else(|| not_found(key))?;
    product_from_entity(model)
}

pub async fn create_product(state: &AppState, payload: ProductInput) -> AppResult<Product> {
    let record = ingest(payload).await?;
    ensure_sku_free(state, &record.sku, None).await?;

    let mut active = ActiveModel {
        id: NotSet,
        ..Default::default()
    };
    apply(&mut active, record);
    let product = active.insert(&state.orm).await.map_err(sku_conflict)?;

    tracing::info!(product_id = product.id, sku = %product.sku, "product created");
    product_from_entity(product)
}

pub async fn update_product(
    state: &AppState,
    id: i32,
    payload: ProductInput,
) -> AppResult<Product> {
    let existing = Products::find_by_id(id)
        .one(&state.orm)
        .await?
        .ok_or_else(|| not_found(&id.to_string()))?;

    let record = ingest(payload).await?;
    if record.sku != existing.sku {
        ensure_sku_free(state, &record.sku, Some(id)).await?;
    }

    let mut active: ActiveModel = existing.into();
    apply(&mut active, record);
    let product = active.update(&state.orm).await.map_err(sku_conflict)?;

    tracing::info!(product_id = product.id, sku = %product.sku, "product updated");
    product_from_entity(product)
}

/// Removes the product row. Placed orders keep their item snapshots.
pub async fn delete_product(state: &AppState, id: i32) -> AppResult<()> {
    let result = Products::delete_by_id(id).exec(&state.orm).await?;
    if result.rows_affected == 0 {
        return Err(not_found(&id.to_string()));
    }
    tracing::info!(product_id = id, "product deleted");
    Ok(())
}

pub fn product_from_entity(model: ProductModel) -> AppResult<Product> {
    let category = Category::from_str(&model.category).map_err(|err| {
        AppError::Internal(anyhow::anyhow!("product {} is corrupt: {err}", model.id))
    })?;
    Ok(Product {
        id: model.id,
        sku: model.sku,
        name: model.name,
        category,
        price: model.price,
        stock: model.stock,
        low_stock_threshold: model.low_stock_threshold,
        weight: model.weight,
        origin: model.origin,
        description: model.description,
        image_url: model.image_url,
        in_stock: model.stock > 0,
    })
}

async fn ingest(payload: ProductInput) -> AppResult<ProductRecord> {
    let mut record = payload.into_record()?;
    let (image_url, image) = images::ingest(record.image_url).await?;
    tracing::debug!(sku = %record.sku, image = image_kind(&image), "image accepted");
    record.image_url = image_url;
    Ok(record)
}

fn image_kind(image: &images::ImageRef) -> &'static str {
    match image {
        images::ImageRef::External(_) => "external",
        images::ImageRef::Relative(_) => "relative",
        images::ImageRef::Inline { .. } => "inline",
    }
}

async fn ensure_sku_free(state: &AppState, sku: &str, except: Option<i32>) -> AppResult<()> {
    let mut finder = Products::find().filter(Column::Sku.eq(sku));
    if let Some(id) = except {
        finder = finder.filter(Column::Id.ne(id));
    }
    if finder.one(&state.orm).await?.is_some() {
        return Err(duplicate_sku(sku));
    }
    Ok(())
}

fn apply(active: &mut ActiveModel, record: ProductRecord) {
    active.sku = Set(record.sku);
    active.name = Set(record.name);
    active.category = Set(record.category.as_str().to_string());
    active.price = Set(record.price);
    active.stock = Set(record.stock);
    active.low_stock_threshold = Set(record.low_stock_threshold);
    active.weight = Set(record.weight);
    active.origin = Set(record.origin);
    active.description = Set(record.description);
    active.image_url = Set(record.image_url);
}

fn sku_conflict(err: sea_orm::DbErr) -> AppError {
    if is_unique_violation(&err) {
        AppError::Conflict("A product with this SKU already exists".into())
    } else {
        AppError::Orm(err)
    }
}

fn duplicate_sku(sku: &str) -> AppError {
    AppError::Conflict(format!("A product with SKU {sku} already exists"))
}

fn not_found(key: &str) -> AppError {
    AppError::NotFound(format!("Product not found: {key}"))
}
