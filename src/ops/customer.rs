//! Customer Operations
//!
//! Browsing and ordering. Everything here is scoped to the session's own
//! identity and location; the only write is order placement, which is
//! guarded by a conditional insert so the stock check and the insert are
//! one statement.

use tracing::info;

use crate::error::{BazaarError, Result};
use crate::lookup::{
    fetch_product_price, fetch_product_units, fetch_store_location, product_exists, store_exists,
};
use crate::output::TableView;
use crate::query::{QueryBuilder, SqlValue, Statement};
use crate::session::distance;
use crate::validate::{is_no_filter, non_empty, parse_units};

use super::{prompt_id, OpContext, OpOutcome};

/// Stores closer than this many distance units are "nearby" and orderable
pub const ORDER_RADIUS: f64 = 30.0;

/// Stores within [`ORDER_RADIUS`] units of the session's coordinates.
pub fn view_nearby_stores(ctx: &mut OpContext<'_>) -> Result<OpOutcome> {
    let lat = ctx.session.latitude;
    let long = ctx.session.longitude;

    // squared-distance form keeps the predicate expressible in plain SQL
    let stmt = QueryBuilder::select(&["storeID", "latitude", "longitude", "dateEstablished"])
        .from("Store")
        .filter(
            "((latitude - ?) * (latitude - ?) + (longitude - ?) * (longitude - ?)) < ?",
            [
                SqlValue::Real(lat),
                SqlValue::Real(lat),
                SqlValue::Real(long),
                SqlValue::Real(long),
                SqlValue::Real(ORDER_RADIUS * ORDER_RADIUS),
            ],
        )
        .order_by("storeID")
        .build();

    Ok(OpOutcome::Table(TableView::from(ctx.backend.query(&stmt)?)))
}

/// Product catalog of one store.
pub fn view_store_products(ctx: &mut OpContext<'_>) -> Result<OpOutcome> {
    let (store_raw, _) = prompt_id(ctx.prompt, "store ID")?;
    if !store_exists(ctx.backend, &store_raw) {
        return Err(BazaarError::not_found(format!("store {}", store_raw.trim())));
    }

    let stmt = QueryBuilder::select(&["productName", "numberOfUnits", "pricePerUnit"])
        .from("Product")
        .filter("storeID = ?", [SqlValue::from(store_raw.trim())])
        .order_by("productName")
        .build();

    Ok(OpOutcome::Table(TableView::from(ctx.backend.query(&stmt)?)))
}

/// Place an order at a nearby store.
///
/// The stock check and the insert run as one conditional statement, so a
/// concurrent order cannot slip between them.
pub fn place_order(ctx: &mut OpContext<'_>) -> Result<OpOutcome> {
    let (store_raw, store_id) = prompt_id(ctx.prompt, "store ID")?;
    if !store_exists(ctx.backend, &store_raw) {
        return Err(BazaarError::not_found(format!("store {store_id}")));
    }

    let (store_lat, store_long) = fetch_store_location(ctx.backend, store_id)?;
    let dist = distance(ctx.session.latitude, ctx.session.longitude, store_lat, store_long);
    if dist > ORDER_RADIUS {
        return Ok(OpOutcome::Message(format!(
            "Store {store_id} is {dist:.1} units away; orders are limited to stores within {ORDER_RADIUS} units."
        )));
    }

    let product_raw = ctx.prompt.line("product name")?;
    let product = non_empty(&product_raw, "product name")?.to_string();
    if !product_exists(ctx.backend, &store_raw, &product) {
        return Err(BazaarError::not_found(format!("product '{product}' at store {store_id}")));
    }

    let units_raw = ctx.prompt.line("number of units")?;
    let units = parse_units(&units_raw, "number of units")?;
    if units == 0 {
        return Err(BazaarError::invalid_input("number of units must be positive"));
    }

    // advisory check for a friendly message; the insert below re-checks
    // atomically
    let available = fetch_product_units(ctx.backend, store_id, &product)?;
    if available < units {
        return Ok(OpOutcome::Message(format!(
            "Not enough stock of '{product}' at store {store_id}: {available} unit(s) available."
        )));
    }

    let price = fetch_product_price(ctx.backend, store_id, &product)?;
    let total = price * units as f64;
    let answer = ctx.prompt.line(&format!("This costs ${total:.2}. Confirm? (y/n)"))?;
    if !matches!(answer.trim(), "y" | "Y" | "yes" | "Yes") {
        return Ok(OpOutcome::Message("Order cancelled.".to_string()));
    }

    let affected = ctx.backend.execute(&Statement::new(
        "INSERT INTO Orders (customerID, storeID, productName, unitsOrdered, orderTime) \
         SELECT ?, ?, ?, ?, CURRENT_TIMESTAMP \
         WHERE EXISTS (SELECT 1 FROM Product \
                       WHERE storeID = ? AND TRIM(productName) = TRIM(?) \
                         AND numberOfUnits >= ?)",
        vec![
            SqlValue::Int(ctx.session.user_id),
            SqlValue::Int(store_id),
            SqlValue::from(product.as_str()),
            SqlValue::Int(units),
            SqlValue::Int(store_id),
            SqlValue::from(product.as_str()),
            SqlValue::Int(units),
        ],
    ))?;

    if affected == 0 {
        return Ok(OpOutcome::Message(format!(
            "Not enough stock of '{product}' at store {store_id}."
        )));
    }

    info!(user_id = ctx.session.user_id, store_id, product = %product, units, "order placed");
    Ok(OpOutcome::Message(format!(
        "Ordered {units} unit(s) of '{product}' from store {store_id} for ${total:.2}."
    )))
}

/// The session's five most recent orders.
pub fn view_recent_orders(ctx: &mut OpContext<'_>) -> Result<OpOutcome> {
    let stmt = QueryBuilder::select(&[
        "orderNumber",
        "storeID",
        "productName",
        "unitsOrdered",
        "orderTime",
    ])
    .from("Orders")
    .filter("customerID = ?", [SqlValue::Int(ctx.session.user_id)])
    .order_by("orderTime DESC")
    .limit(Some(5))
    .build();

    Ok(OpOutcome::Table(TableView::from(ctx.backend.query(&stmt)?)))
}

/// The session's most ordered products, optionally scoped to one store.
pub fn view_favorite_products(ctx: &mut OpContext<'_>) -> Result<OpOutcome> {
    let store_raw = ctx.prompt.line("store ID, or '-' for all stores")?;

    let mut builder = QueryBuilder::select(&["productName", "SUM(unitsOrdered) AS total_units"])
        .from("Orders")
        .filter("customerID = ?", [SqlValue::Int(ctx.session.user_id)])
        .group_by("productName");

    if !is_no_filter(&store_raw) {
        if !store_exists(ctx.backend, &store_raw) {
            return Err(BazaarError::not_found(format!("store {}", store_raw.trim())));
        }
        builder = builder
            .filter("storeID = ?", [SqlValue::from(store_raw.trim())])
            .add_dimension("storeID");
    }

    let stmt = builder.order_by("total_units DESC").limit(Some(10)).build();
    Ok(OpOutcome::Table(TableView::from(ctx.backend.query(&stmt)?)))
}

/// Store details with the managing user's name, optionally one store.
pub fn view_store_information(ctx: &mut OpContext<'_>) -> Result<OpOutcome> {
    let store_raw = ctx.prompt.line("store ID, or '-' for all stores")?;

    let mut builder = QueryBuilder::select(&[
        "Store.storeID",
        "Store.latitude",
        "Store.longitude",
        "Store.dateEstablished",
        "Users.name AS manager",
    ])
    .from("Store JOIN Users ON Store.managerID = Users.userID")
    .order_by("Store.storeID");

    if !is_no_filter(&store_raw) {
        if !store_exists(ctx.backend, &store_raw) {
            return Err(BazaarError::not_found(format!("store {}", store_raw.trim())));
        }
        builder = builder.filter("Store.storeID = ?", [SqlValue::from(store_raw.trim())]);
    }

    Ok(OpOutcome::Table(TableView::from(ctx.backend.query(&builder.build())?)))
}
