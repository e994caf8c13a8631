use std::collections::{BTreeMap, HashMap};

use chrono::Utc;
use rand::{Rng, distr::Alphanumeric};
use sea_orm::{
    ActiveModelTrait, ColumnTrait, ConnectionTrait, DatabaseTransaction, EntityTrait,
    PaginatorTrait, QueryFilter, QueryOrder, Set, TransactionTrait,
};
use sea_orm::ActiveValue::NotSet;
use sea_orm::sea_query::Expr;

use crate::{
    db::with_retry,
    dto::orders::{CreateOrderRequest, QuoteRequest, UpdateOrderStatusRequest, validate_customer},
    entity::{
        order_items::{
            ActiveModel as OrderItemActive, Column as OrderItemCol, Entity as OrderItems,
            Model as OrderItemModel,
        },
        orders::{ActiveModel as OrderActive, Column as OrderCol, Entity as Orders, Model as OrderModel},
        products::{Column as ProdCol, Entity as Products, Model as ProductModel},
    },
    error::{AppError, AppResult},
    models::{Customer, Order, OrderItem, OrderStatus},
    pricing::{MAX_ORDER_TOTAL, PricedLine, Quote},
    state::AppState,
};

const ORDER_ID_LEN: usize = 10;
const ORDER_ID_ATTEMPTS: usize = 5;
/// Order ids bound per item query; stays well under the bind-parameter limit.
const ITEM_BATCH: usize = 1000;

/// Places an order: prices every line from the current catalog, takes the
/// stock and stores the order with its items, all in one transaction.
pub async fn create_order(state: &AppState, payload: CreateOrderRequest) -> AppResult<Order> {
    let customer = validate_customer(&payload.customer)?;
    let lines = payload.lines()?;

    let customer = &customer;
    let lines = &lines;
    let order = with_retry(move || place_order(state, customer, lines)).await?;

    tracing::info!(
        order_id = %order.order_id,
        items = order.order_items.len(),
        total = %order.total,
        "order created"
    );
    Ok(order)
}

async fn place_order(
    state: &AppState,
    customer: &Customer,
    lines: &BTreeMap<i32, i32>,
) -> AppResult<Order> {
    let txn = state.orm.begin().await?;

    // Stock is taken before anything is read so the transaction holds the
    // write lock from its first statement. Lines go in ascending id order so
    // concurrent checkouts cannot deadlock on each other.
    let mut short = Vec::new();
    for (&product_id, &quantity) in lines {
        let result = Products::update_many()
            .col_expr(ProdCol::Stock, Expr::col(ProdCol::Stock).sub(quantity))
            .filter(ProdCol::Id.eq(product_id))
            .filter(ProdCol::Stock.gte(quantity))
            .exec(&txn)
            .await?;
        if result.rows_affected != 1 {
            short.push((product_id, quantity));
        }
    }

    let mut found: HashMap<i32, ProductModel> = Products::find()
        .filter(ProdCol::Id.is_in(lines.keys().copied()))
        .all(&txn)
        .await?
        .into_iter()
        .map(|product| (product.id, product))
        .collect();

    let missing: Vec<i32> = lines
        .keys()
        .filter(|id| !found.contains_key(id))
        .copied()
        .collect();
    if !missing.is_empty() {
        return Err(missing_products(&missing));
    }
    if let Some((product, quantity)) = short
        .iter()
        .find_map(|(id, quantity)| found.get(id).map(|product| (product, *quantity)))
    {
        return Err(insufficient_stock(product, quantity));
    }

    let products: Vec<(ProductModel, i32)> = lines
        .iter()
        .filter_map(|(id, &quantity)| found.remove(id).map(|product| (product, quantity)))
        .collect();

    let priced: Vec<PricedLine> = products
        .iter()
        .map(|(product, quantity)| PricedLine {
            unit_price: product.price,
            quantity: *quantity,
            weight: product.weight,
        })
        .collect();
    let quote = state.pricing.quote(&priced, Some(&customer.state));
    if quote.total > MAX_ORDER_TOTAL {
        return Err(AppError::Validation(format!(
            "Order total {} exceeds the maximum of {MAX_ORDER_TOTAL}",
            quote.total
        )));
    }

    let order_id = unused_order_id(&txn).await?;
    let order = OrderActive {
        id: NotSet,
        order_id: Set(order_id),
        customer_first_name: Set(customer.first_name.clone()),
        customer_last_name: Set(customer.last_name.clone()),
        customer_email: Set(customer.email.clone()),
        customer_phone: Set(customer.phone.clone()),
        customer_address: Set(customer.address.clone()),
        customer_city: Set(customer.city.clone()),
        customer_state: Set(customer.state.clone()),
        customer_zip_code: Set(customer.zip_code.clone()),
        subtotal: Set(quote.subtotal),
        shipping_cost: Set(quote.shipping_cost),
        tax: Set(quote.tax),
        total: Set(quote.total),
        order_date: Set(Utc::now()),
        status: Set(OrderStatus::Received.as_str().to_string()),
    }
    .insert(&txn)
    .await?;

    let mut items = Vec::with_capacity(products.len());
    for (product, quantity) in &products {
        let item = OrderItemActive {
            id: NotSet,
            order_id: Set(order.id),
            product_id: Set(product.id),
            product_name: Set(product.name.clone()),
            product_sku: Set(product.sku.clone()),
            quantity: Set(*quantity),
            price: Set(product.price),
        }
        .insert(&txn)
        .await?;
        items.push(item);
    }

    txn.commit().await?;
    Ok(order_from_entity(order, items))
}

pub async fn list_orders(state: &AppState) -> AppResult<Vec<Order>> {
    let orders = Orders::find()
        .order_by_desc(OrderCol::OrderDate)
        .order_by_desc(OrderCol::Id)
        .all(&state.orm)
        .await?;
    if orders.is_empty() {
        return Ok(Vec::new());
    }

    let ids: Vec<i32> = orders.iter().map(|order| order.id).collect();
    let mut items_by_order: HashMap<i32, Vec<OrderItemModel>> = HashMap::new();
    for batch in ids.chunks(ITEM_BATCH) {
        for item in OrderItems::find()
            .filter(OrderItemCol::OrderId.is_in(batch.iter().copied()))
            .order_by_asc(OrderItemCol::Id)
            .all(&state.orm)
            .await?
        {
            items_by_order.entry(item.order_id).or_default().push(item);
        }
    }

    Ok(orders
        .into_iter()
        .map(|order| {
            let items = items_by_order.remove(&order.id).unwrap_or_default();
            order_from_entity(order, items)
        })
        .collect())
}

pub async fn get_order(state: &AppState, id: i32) -> AppResult<Order> {
    let order = Orders::find_by_id(id)
        .one(&state.orm)
        .await?
        .ok_or_else(|| not_found(&id.to_string()))?;
    with_items(&state.orm, order).await
}

/// Confirmation lookup by the public order token.
pub async fn get_order_by_order_id(state: &AppState, order_id: &str) -> AppResult<Order> {
    let order = Orders::find()
        .filter(OrderCol::OrderId.eq(order_id))
        .one(&state.orm)
        .await?
        .ok_or_else(|| not_found(order_id))?;
    with_items(&state.orm, order).await
}

pub async fn update_status(
    state: &AppState,
    id: i32,
    payload: UpdateOrderStatusRequest,
) -> AppResult<Order> {
    let status: OrderStatus = payload
        .status
        .trim()
        .parse()
        .map_err(AppError::Validation)?;

    let order = Orders::find_by_id(id)
        .one(&state.orm)
        .await?
        .ok_or_else(|| not_found(&id.to_string()))?;
    let previous = OrderStatus::from_stored(&order.status);

    let mut active: OrderActive = order.into();
    active.status = Set(status.as_str().to_string());
    let order = active.update(&state.orm).await?;

    tracing::info!(
        order_id = %order.order_id,
        from = %previous,
        to = %status,
        "order status updated"
    );
    with_items(&state.orm, order).await
}

/// Hard delete. Stock taken by the order is not given back.
pub async fn delete_order(state: &AppState, id: i32) -> AppResult<()> {
    let txn = state.orm.begin().await?;
    let order = Orders::find_by_id(id)
        .one(&txn)
        .await?
        .ok_or_else(|| not_found(&id.to_string()))?;

    OrderItems::delete_many()
        .filter(OrderItemCol::OrderId.eq(order.id))
        .exec(&txn)
        .await?;
    Orders::delete_by_id(order.id).exec(&txn).await?;
    txn.commit().await?;

    tracing::info!(order_id = %order.order_id, "order deleted");
    Ok(())
}

/// Prices a prospective cart with the same rules checkout uses, without
/// touching stock or persisting anything.
pub async fn quote(state: &AppState, payload: QuoteRequest) -> AppResult<Quote> {
    let lines = payload.lines()?;
    let ids: Vec<i32> = lines.keys().copied().collect();
    let products: HashMap<i32, ProductModel> = Products::find()
        .filter(ProdCol::Id.is_in(ids))
        .all(&state.orm)
        .await?
        .into_iter()
        .map(|product| (product.id, product))
        .collect();

    let missing: Vec<i32> = lines
        .keys()
        .filter(|id| !products.contains_key(id))
        .copied()
        .collect();
    if !missing.is_empty() {
        return Err(missing_products(&missing));
    }

    let priced: Vec<PricedLine> = lines
        .iter()
        .filter_map(|(id, &quantity)| {
            products.get(id).map(|product| PricedLine {
                unit_price: product.price,
                quantity,
                weight: product.weight,
            })
        })
        .collect();
    let state_code = payload.state.as_deref().map(str::trim).filter(|s| !s.is_empty());
    Ok(state.pricing.quote(&priced, state_code))
}

pub fn generate_order_id() -> String {
    rand::rng()
        .sample_iter(&Alphanumeric)
        .take(ORDER_ID_LEN)
        .map(char::from)
        .collect()
}

async fn unused_order_id(txn: &DatabaseTransaction) -> AppResult<String> {
    for _ in 0..ORDER_ID_ATTEMPTS {
        let candidate = generate_order_id();
        let taken = Orders::find()
            .filter(OrderCol::OrderId.eq(candidate.as_str()))
            .count(txn)
            .await?;
        if taken == 0 {
            return Ok(candidate);
        }
        tracing::warn!("order id collision, drawing again");
    }
    Err(AppError::Internal(anyhow::anyhow!(
        "could not allocate a unique order id"
    )))
}

async fn with_items<C: ConnectionTrait>(conn: &C, order: OrderModel) -> AppResult<Order> {
    let items = OrderItems::find()
        .filter(OrderItemCol::OrderId.eq(order.id))
        .order_by_asc(OrderItemCol::Id)
        .all(conn)
        .await?;
    Ok(order_from_entity(order, items))
}

pub fn order_from_entity(model: OrderModel, items: Vec<OrderItemModel>) -> Order {
    Order {
        id: model.id,
        order_id: model.order_id,
        customer: Customer {
            first_name: model.customer_first_name,
            last_name: model.customer_last_name,
            email: model.customer_email,
            phone: model.customer_phone,
            address: model.customer_address,
            city: model.customer_city,
            state: model.customer_state,
            zip_code: model.customer_zip_code,
        },
        order_items: items.into_iter().map(order_item_from_entity).collect(),
        subtotal: model.subtotal,
        shipping_cost: model.shipping_cost,
        tax: model.tax,
        total: model.total,
        order_date: model.order_date,
        status: OrderStatus::from_stored(&model.status),
    }
}

fn order_item_from_entity(model: OrderItemModel) -> OrderItem {
    OrderItem {
        id: model.id,
        product_id: model.product_id,
        name: model.product_name,
        sku: model.product_sku,
        quantity: model.quantity,
        price: model.price,
    }
}

fn missing_products(ids: &[i32]) -> AppError {
    let ids: Vec<String> = ids.iter().map(i32::to_string).collect();
    AppError::Validation(format!("Product not found: {}", ids.join(", ")))
}

fn insufficient_stock(product: &ProductModel, requested: i32) -> AppError {
    AppError::Conflict(format!(
        "Insufficient stock for {} (available {}, requested {requested})",
        product.name, product.stock
    ))
}

fn not_found(key: &str) -> AppError {
    AppError::NotFound(format!("Order not found: {key}"))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn order_ids_are_short_alphanumeric_tokens() {
        let id = generate_order_id();
        assert_eq!(id.len(), ORDER_ID_LEN);
        assert!(id.chars().all(|c| c.is_ascii_alphanumeric()));
        assert_ne!(generate_order_id(), id);
    }
}
