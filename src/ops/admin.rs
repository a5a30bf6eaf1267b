//! Admin Operations
//!
//! Full-schema browsing and editing. Admin writes skip the ownership
//! checks managers are subject to, but every prompted value still goes
//! through the same validation layer before it reaches a statement.

use tracing::info;

use crate::authz::Role;
use crate::error::{BazaarError, Result};
use crate::lookup::{product_exists, store_exists, username_exists, warehouse_exists};
use crate::output::TableView;
use crate::query::{QueryBuilder, SqlValue, Statement, UpdateBuilder};
use crate::session::{self, DeleteAccountOutcome};
use crate::validate::{is_no_filter, non_empty, parse_amount, parse_coordinate, parse_limit, parse_units};

use super::{prompt_id, prompt_range_bounds, OpContext, OpOutcome};

fn user_exists(ctx: &OpContext<'_>, user_id: i64) -> Result<bool> {
    let row = ctx.backend.query_one(&Statement::new(
        "SELECT userID FROM Users WHERE userID = ?",
        vec![SqlValue::Int(user_id)],
    ))?;
    Ok(row.is_some())
}

/// Users within an optional userID range.
pub fn view_users(ctx: &mut OpContext<'_>) -> Result<OpOutcome> {
    let (first, last) = prompt_range_bounds(ctx.prompt, "userID")?;

    let stmt = QueryBuilder::select(&["userID", "name", "type", "latitude", "longitude"])
        .from("Users")
        .range_filter("userID", first.map(SqlValue::Int), last.map(SqlValue::Int))
        .order_by("userID")
        .build();

    Ok(OpOutcome::Table(TableView::from(ctx.backend.query(&stmt)?)))
}

/// Edit any attribute of any user.
///
/// Each attribute is prompted once; `-` keeps the current value. A new
/// name must not collide with an existing account.
pub fn edit_user(ctx: &mut OpContext<'_>) -> Result<OpOutcome> {
    let (_, user_id) = prompt_id(ctx.prompt, "user ID")?;
    if !user_exists(ctx, user_id)? {
        return Err(BazaarError::not_found(format!("user {user_id}")));
    }

    let name_raw = ctx.prompt.line("new name, or '-' to keep")?;
    let password_raw = ctx.prompt.line("new password, or '-' to keep")?;
    let type_raw = ctx.prompt.line("new type (customer/manager/admin), or '-' to keep")?;
    let latitude_raw = ctx.prompt.line("new latitude, or '-' to keep")?;
    let longitude_raw = ctx.prompt.line("new longitude, or '-' to keep")?;

    let mut update = UpdateBuilder::table("Users");
    if !is_no_filter(&name_raw) {
        let name = non_empty(&name_raw, "name")?;
        if username_exists(ctx.backend, name) {
            return Err(BazaarError::invalid_input(format!("name '{name}' is already taken")));
        }
        update = update.set("name", SqlValue::from(name));
    }
    if !is_no_filter(&password_raw) {
        let password = non_empty(&password_raw, "password")?;
        update = update.set("password", SqlValue::from(password));
    }
    if !is_no_filter(&type_raw) {
        let role = Role::parse(&type_raw).ok_or_else(|| {
            BazaarError::invalid_input("type must be customer, manager, or admin")
        })?;
        update = update.set("type", SqlValue::from(role.as_str()));
    }
    if !is_no_filter(&latitude_raw) {
        let latitude = parse_coordinate(&latitude_raw, "latitude")?;
        update = update.set("latitude", SqlValue::Real(latitude));
    }
    if !is_no_filter(&longitude_raw) {
        let longitude = parse_coordinate(&longitude_raw, "longitude")?;
        update = update.set("longitude", SqlValue::Real(longitude));
    }

    if update.is_empty() {
        return Ok(OpOutcome::Message("No changes.".to_string()));
    }

    let stmt = update.filter("userID = ?", [SqlValue::Int(user_id)]).build();
    ctx.backend.execute(&stmt)?;

    info!(admin_id = ctx.session.user_id, user_id, "user edited");
    Ok(OpOutcome::Message(format!("Updated user {user_id}.")))
}

/// Products across every store, with optional store scope, ordering, and
/// row cap.
pub fn view_all_products(ctx: &mut OpContext<'_>) -> Result<OpOutcome> {
    let store_raw = ctx.prompt.line("store ID, or '-' for all stores")?;

    let mut builder = QueryBuilder::select(&[
        "storeID",
        "productName",
        "numberOfUnits",
        "pricePerUnit",
    ])
    .from("Product");

    if !is_no_filter(&store_raw) {
        if !store_exists(ctx.backend, &store_raw) {
            return Err(BazaarError::not_found(format!("store {}", store_raw.trim())));
        }
        builder = builder.filter("storeID = ?", [SqlValue::from(store_raw.trim())]);
    }

    let ordering_raw = ctx.prompt.line(
        "ordering: 0 none, 1 units asc, 2 units desc, 3 price asc, 4 price desc",
    )?;
    builder = match ordering_raw.trim() {
        "0" => builder,
        "1" => builder.order_by("numberOfUnits ASC"),
        "2" => builder.order_by("numberOfUnits DESC"),
        "3" => builder.order_by("pricePerUnit ASC"),
        "4" => builder.order_by("pricePerUnit DESC"),
        other => {
            return Err(BazaarError::invalid_input(format!(
                "ordering must be 0 through 4, got '{other}'"
            )))
        }
    };

    let limit_raw = ctx.prompt.line("row limit, or '-' for all rows")?;
    let stmt = builder.limit(parse_limit(&limit_raw)?).build();
    Ok(OpOutcome::Table(TableView::from(ctx.backend.query(&stmt)?)))
}

/// Edit product stock and price, optionally scoped to one store or one
/// product name.
pub fn edit_products(ctx: &mut OpContext<'_>) -> Result<OpOutcome> {
    let store_raw = ctx.prompt.line("store ID, or '-' for all stores")?;
    let product_raw = ctx.prompt.line("product name, or '-' for all products")?;

    let mut update = UpdateBuilder::table("Product");

    if !is_no_filter(&store_raw) {
        if !store_exists(ctx.backend, &store_raw) {
            return Err(BazaarError::not_found(format!("store {}", store_raw.trim())));
        }
        // product existence is only checkable within one store
        if !is_no_filter(&product_raw) {
            let product = non_empty(&product_raw, "product name")?;
            if !product_exists(ctx.backend, &store_raw, product) {
                return Err(BazaarError::not_found(format!(
                    "product '{product}' at store {}",
                    store_raw.trim()
                )));
            }
        }
        update = update.filter("storeID = ?", [SqlValue::from(store_raw.trim())]);
    }
    if !is_no_filter(&product_raw) {
        let product = non_empty(&product_raw, "product name")?;
        update = update.filter("TRIM(productName) = TRIM(?)", [SqlValue::from(product)]);
    }

    let units_raw = ctx.prompt.line("new number of units, or '-' to keep")?;
    let price_raw = ctx.prompt.line("new price per unit, or '-' to keep")?;

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

    let affected = ctx.backend.execute(&update.build())?;
    info!(admin_id = ctx.session.user_id, affected, "products edited");
    Ok(OpOutcome::Message(format!("Updated {affected} product row(s).")))
}

/// Browse any relation with a range filter over its key attribute.
pub fn view_everything(ctx: &mut OpContext<'_>) -> Result<OpOutcome> {
    let relation_raw = ctx.prompt.line(
        "relation: 1 Users, 2 Store, 3 Product, 4 Orders, \
         5 Warehouse, 6 ProductSupplyRequests, 7 ProductUpdates",
    )?;

    let (table, attribute) = match relation_raw.trim() {
        "1" => ("Users", "userID"),
        "2" => ("Store", "storeID"),
        "3" => {
            // Product has a compound key; pick a numeric attribute to range over
            let attr_raw =
                ctx.prompt.line("Product attribute: 1 storeID, 2 numberOfUnits, 3 pricePerUnit")?;
            let attribute = match attr_raw.trim() {
                "1" => "storeID",
                "2" => "numberOfUnits",
                "3" => "pricePerUnit",
                other => {
                    return Err(BazaarError::invalid_input(format!(
                        "attribute must be 1 through 3, got '{other}'"
                    )))
                }
            };
            ("Product", attribute)
        }
        "4" => ("Orders", "orderNumber"),
        "5" => ("Warehouse", "WarehouseID"),
        "6" => ("ProductSupplyRequests", "requestNumber"),
        "7" => ("ProductUpdates", "updateNumber"),
        other => {
            return Err(BazaarError::invalid_input(format!(
                "relation must be 1 through 7, got '{other}'"
            )))
        }
    };

    let (first, last) = prompt_range_bounds(ctx.prompt, attribute)?;
    let stmt = QueryBuilder::select(&["*"])
        .from(table)
        .range_filter(attribute, first.map(SqlValue::Int), last.map(SqlValue::Int))
        .order_by(attribute)
        .build();

    Ok(OpOutcome::Table(TableView::from(ctx.backend.query(&stmt)?)))
}

/// Delete a store; its products go with it.
pub fn delete_store(ctx: &mut OpContext<'_>) -> Result<OpOutcome> {
    let (store_raw, store_id) = prompt_id(ctx.prompt, "store ID")?;
    if !store_exists(ctx.backend, &store_raw) {
        return Err(BazaarError::not_found(format!("store {store_id}")));
    }

    ctx.backend.execute(&Statement::new(
        "DELETE FROM Store WHERE storeID = ?",
        vec![SqlValue::Int(store_id)],
    ))?;

    info!(admin_id = ctx.session.user_id, store_id, "store deleted");
    Ok(OpOutcome::Message(format!("Deleted store {store_id} and its products.")))
}

/// Delete a warehouse.
pub fn delete_warehouse(ctx: &mut OpContext<'_>) -> Result<OpOutcome> {
    let (warehouse_raw, warehouse_id) = prompt_id(ctx.prompt, "warehouse ID")?;
    if !warehouse_exists(ctx.backend, &warehouse_raw) {
        return Err(BazaarError::not_found(format!("warehouse {warehouse_id}")));
    }

    ctx.backend.execute(&Statement::new(
        "DELETE FROM Warehouse WHERE WarehouseID = ?",
        vec![SqlValue::Int(warehouse_id)],
    ))?;

    info!(admin_id = ctx.session.user_id, warehouse_id, "warehouse deleted");
    Ok(OpOutcome::Message(format!("Deleted warehouse {warehouse_id}.")))
}

/// Delete the session's own account after password re-entry.
pub fn delete_account(ctx: &mut OpContext<'_>) -> Result<OpOutcome> {
    let password = ctx.prompt.line("re-enter your password to confirm")?;
    match session::delete_account(ctx.backend, ctx.session, &password)? {
        DeleteAccountOutcome::Deleted => Ok(OpOutcome::AccountDeleted),
        DeleteAccountOutcome::WrongPassword => {
            Ok(OpOutcome::Message("Incorrect password; account not deleted.".to_string()))
        }
        DeleteAccountOutcome::Forbidden => {
            Err(BazaarError::denied("managers cannot delete their account"))
        }
    }
}
