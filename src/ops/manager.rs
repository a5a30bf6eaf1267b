//! Manager Operations
//!
//! Reports and writes scoped to the stores the session user manages.
//! Every store-scoped operation re-verifies ownership through
//! [`require_store_manager`] before running; the manager role alone
//! grants nothing.

use tracing::info;

use crate::authz::require_store_manager;
use crate::error::{BazaarError, Result};
use crate::lookup::{product_exists, store_exists, warehouse_exists};
use crate::output::TableView;
use crate::query::{QueryBuilder, SqlValue, Statement, UpdateBuilder};
use crate::validate::{is_no_filter, non_empty, parse_amount, parse_limit, parse_units};

use super::{prompt_id, OpContext, OpOutcome};

/// Verify a prompted store ID exists and belongs to the session user.
fn owned_store(ctx: &mut OpContext<'_>) -> Result<(String, i64)> {
    let (store_raw, store_id) = prompt_id(ctx.prompt, "store ID")?;
    if !store_exists(ctx.backend, &store_raw) {
        return Err(BazaarError::not_found(format!("store {store_id}")));
    }
    require_store_manager(ctx.backend, ctx.session, store_id)?;
    Ok((store_raw, store_id))
}

/// Prompt for an optional row cap.
fn prompt_limit(ctx: &mut OpContext<'_>) -> Result<Option<i64>> {
    let raw = ctx.prompt.line("row limit, or '-' for all rows")?;
    parse_limit(&raw)
}

/// Product counts, order counts, and income for every store the
/// session user manages.
pub fn managed_store_report(ctx: &mut OpContext<'_>) -> Result<OpOutcome> {
    let stmt = QueryBuilder::select(&[
        "Store.storeID",
        "Store.dateEstablished",
        "(SELECT COUNT(*) FROM Product WHERE Product.storeID = Store.storeID) \
         AS number_of_products",
        "COUNT(Orders.orderNumber) AS number_of_orders",
        "COALESCE(SUM(Orders.unitsOrdered * Product.pricePerUnit), 0) AS income",
    ])
    .from(
        "Store \
         LEFT JOIN Orders ON Store.storeID = Orders.storeID \
         LEFT JOIN Product ON Orders.storeID = Product.storeID \
                          AND Orders.productName = Product.productName",
    )
    .filter("Store.managerID = ?", [SqlValue::Int(ctx.session.user_id)])
    .group_by("Store.storeID")
    .group_by("Store.dateEstablished")
    .order_by("number_of_orders DESC")
    .build();

    Ok(OpOutcome::Table(TableView::from(ctx.backend.query(&stmt)?)))
}

/// Update a product's stock and price at an owned store.
///
/// Either attribute may be skipped with `-`; skipping both is a no-op and
/// writes no audit row.
pub fn update_product(ctx: &mut OpContext<'_>) -> Result<OpOutcome> {
    let (store_raw, store_id) = owned_store(ctx)?;

    let product_raw = ctx.prompt.line("product name")?;
    let product = non_empty(&product_raw, "product name")?.to_string();
    if !product_exists(ctx.backend, &store_raw, &product) {
        return Err(BazaarError::not_found(format!("product '{product}' at store {store_id}")));
    }

    let units_raw = ctx.prompt.line("new number of units, or '-' to keep")?;
    let price_raw = ctx.prompt.line("new price per unit, or '-' to keep")?;

    let mut update = UpdateBuilder::table("Product");
    if !is_no_filter(&units_raw) {
        let units = parse_units(&units_raw, "number of units")?;
        update = update.set("numberOfUnits", SqlValue::Int(units));
    }
    if !is_no_filter(&price_raw) {
        let price = parse_amount(&price_raw, "price per unit")?;
        update = update.set("pricePerUnit", SqlValue::Real(price));
    }

    if update.is_empty() {
        return Ok(OpOutcome::Message("No changes.".to_string()));
    }

    let stmt = update
        .filter("storeID = ?", [SqlValue::Int(store_id)])
        .filter("TRIM(productName) = TRIM(?)", [SqlValue::from(product.as_str())])
        .build();
    ctx.backend.execute(&stmt)?;

    // audit trail row for every applied change
    ctx.backend.execute(&Statement::new(
        "INSERT INTO ProductUpdates (managerID, storeID, productName, updatedOn) \
         VALUES (?, ?, ?, CURRENT_TIMESTAMP)",
        vec![
            SqlValue::Int(ctx.session.user_id),
            SqlValue::Int(store_id),
            SqlValue::from(product.as_str()),
        ],
    ))?;

    info!(manager_id = ctx.session.user_id, store_id, product = %product, "product updated");
    Ok(OpOutcome::Message(format!("Updated '{product}' at store {store_id}.")))
}

/// The session manager's five most recent product updates.
pub fn recent_product_updates(ctx: &mut OpContext<'_>) -> Result<OpOutcome> {
    let stmt = QueryBuilder::select(&["updateNumber", "storeID", "productName", "updatedOn"])
        .from("ProductUpdates")
        .filter("managerID = ?", [SqlValue::Int(ctx.session.user_id)])
        .order_by("updatedOn DESC")
        .limit(Some(5))
        .build();

    Ok(OpOutcome::Table(TableView::from(ctx.backend.query(&stmt)?)))
}

/// The five most ordered products at an owned store.
pub fn popular_products(ctx: &mut OpContext<'_>) -> Result<OpOutcome> {
    let (_, store_id) = owned_store(ctx)?;

    let stmt = QueryBuilder::select(&["productName", "COUNT(*) AS times_ordered"])
        .from("Orders")
        .filter("storeID = ?", [SqlValue::Int(store_id)])
        .group_by("productName")
        .order_by("times_ordered DESC")
        .limit(Some(5))
        .build();

    Ok(OpOutcome::Table(TableView::from(ctx.backend.query(&stmt)?)))
}

/// The five customers with the most orders at an owned store.
pub fn popular_customers(ctx: &mut OpContext<'_>) -> Result<OpOutcome> {
    let (_, store_id) = owned_store(ctx)?;

    let stmt = QueryBuilder::select(&[
        "Users.userID",
        "Users.name",
        "COUNT(Orders.orderNumber) AS orders_placed",
    ])
    .from("Users JOIN Orders ON Users.userID = Orders.customerID")
    .filter("Orders.storeID = ?", [SqlValue::Int(store_id)])
    .group_by("Users.userID")
    .group_by("Users.name")
    .order_by("orders_placed DESC")
    .limit(Some(5))
    .build();

    Ok(OpOutcome::Table(TableView::from(ctx.backend.query(&stmt)?)))
}

/// Request product units from a warehouse for an owned store.
///
/// The request is a record only; store inventory changes when the update
/// operation applies the delivery, not here.
pub fn place_supply_request(ctx: &mut OpContext<'_>) -> Result<OpOutcome> {
    let (store_raw, store_id) = owned_store(ctx)?;

    let (warehouse_raw, warehouse_id) = prompt_id(ctx.prompt, "warehouse ID")?;
    if !warehouse_exists(ctx.backend, &warehouse_raw) {
        return Err(BazaarError::not_found(format!("warehouse {warehouse_id}")));
    }

    let product_raw = ctx.prompt.line("product name")?;
    let product = non_empty(&product_raw, "product name")?.to_string();
    if !product_exists(ctx.backend, &store_raw, &product) {
        return Err(BazaarError::not_found(format!("product '{product}' at store {store_id}")));
    }

    let units_raw = ctx.prompt.line("units to request")?;
    let units = parse_units(&units_raw, "units to request")?;
    if units == 0 {
        return Err(BazaarError::invalid_input("units to request must be positive"));
    }

    ctx.backend.execute(&Statement::new(
        "INSERT INTO ProductSupplyRequests \
         (managerID, warehouseID, storeID, productName, unitsRequested) \
         VALUES (?, ?, ?, ?, ?)",
        vec![
            SqlValue::Int(ctx.session.user_id),
            SqlValue::Int(warehouse_id),
            SqlValue::Int(store_id),
            SqlValue::from(product.as_str()),
            SqlValue::Int(units),
        ],
    ))?;

    info!(
        manager_id = ctx.session.user_id,
        store_id, warehouse_id, product = %product, units, "supply request placed"
    );
    Ok(OpOutcome::Message(format!(
        "Requested {units} unit(s) of '{product}' from warehouse {warehouse_id} for store {store_id}."
    )))
}

/// The session manager's supply requests, optionally scoped to one store.
pub fn view_supply_requests(ctx: &mut OpContext<'_>) -> Result<OpOutcome> {
    let store_raw = ctx.prompt.line("store ID, or '-' for all your stores")?;

    let mut builder = QueryBuilder::select(&[
        "requestNumber",
        "storeID",
        "warehouseID",
        "productName",
        "unitsRequested",
    ])
    .from("ProductSupplyRequests")
    .filter("managerID = ?", [SqlValue::Int(ctx.session.user_id)])
    .order_by("requestNumber DESC");

    if !is_no_filter(&store_raw) {
        if !store_exists(ctx.backend, &store_raw) {
            return Err(BazaarError::not_found(format!("store {}", store_raw.trim())));
        }
        builder = builder.filter("storeID = ?", [SqlValue::from(store_raw.trim())]);
    }

    let limit = prompt_limit(ctx)?;
    let stmt = builder.limit(limit).build();
    Ok(OpOutcome::Table(TableView::from(ctx.backend.query(&stmt)?)))
}

/// Orders placed at the session manager's stores.
///
/// With `-` the report spans every owned store; a specific store must be
/// owned by the session user.
pub fn store_orders(ctx: &mut OpContext<'_>) -> Result<OpOutcome> {
    let store_raw = ctx.prompt.line("store ID, or '-' for all your stores")?;

    let mut builder = QueryBuilder::select(&[
        "orderNumber",
        "customerID",
        "storeID",
        "productName",
        "unitsOrdered",
        "orderTime",
    ])
    .from("Orders")
    .order_by("orderTime DESC");

    if is_no_filter(&store_raw) {
        builder = builder.filter(
            "storeID IN (SELECT storeID FROM Store WHERE managerID = ?)",
            [SqlValue::Int(ctx.session.user_id)],
        );
    } else {
        if !store_exists(ctx.backend, &store_raw) {
            return Err(BazaarError::not_found(format!("store {}", store_raw.trim())));
        }
        let store_id: i64 = store_raw
            .trim()
            .parse()
            .map_err(|_| BazaarError::invalid_input("store ID out of range"))?;
        require_store_manager(ctx.backend, ctx.session, store_id)?;
        builder = builder.filter("storeID = ?", [SqlValue::Int(store_id)]);
    }

    Ok(OpOutcome::Table(TableView::from(ctx.backend.query(&builder.build())?)))
}

/// Customers of an owned store with their order counts.
pub fn store_customers(ctx: &mut OpContext<'_>) -> Result<OpOutcome> {
    let (_, store_id) = owned_store(ctx)?;
    let limit = prompt_limit(ctx)?;

    let stmt = QueryBuilder::select(&[
        "Users.userID",
        "Users.name",
        "COUNT(Orders.orderNumber) AS orders_placed",
    ])
    .from("Users JOIN Orders ON Users.userID = Orders.customerID")
    .filter("Orders.storeID = ?", [SqlValue::Int(store_id)])
    .group_by("Users.userID")
    .group_by("Users.name")
    .order_by("orders_placed DESC")
    .limit(limit)
    .build();

    Ok(OpOutcome::Table(TableView::from(ctx.backend.query(&stmt)?)))
}

/// Customers of an owned store ranked by total spend.
pub fn top_spenders(ctx: &mut OpContext<'_>) -> Result<OpOutcome> {
    let (_, store_id) = owned_store(ctx)?;
    let limit = prompt_limit(ctx)?;

    let stmt = QueryBuilder::select(&[
        "Users.userID",
        "Users.name",
        "SUM(Orders.unitsOrdered * Product.pricePerUnit) AS total_spent",
    ])
    .from(
        "Users \
         JOIN Orders ON Users.userID = Orders.customerID \
         JOIN Product ON Orders.storeID = Product.storeID \
                     AND Orders.productName = Product.productName",
    )
    .filter("Orders.storeID = ?", [SqlValue::Int(store_id)])
    .group_by("Users.userID")
    .group_by("Users.name")
    .order_by("total_spent DESC")
    .limit(limit)
    .build();

    Ok(OpOutcome::Table(TableView::from(ctx.backend.query(&stmt)?)))
}
