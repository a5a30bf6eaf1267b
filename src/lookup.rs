//! Reference Lookups
//!
//! Existence checks and single-value fetches against the marketplace schema.
//!
//! # Existence checks
//! Each check first applies the structural validation rule for its key
//! (numeric identifiers must be well-formed integers before any lookup is
//! attempted), then issues exactly one parameterized lookup scoped to the
//! candidate key, and returns true iff a returned value equals the candidate
//! after trimming incidental whitespace introduced by fixed-width column
//! serialization.
//!
//! On any backend failure an existence check returns `false`: an unreachable
//! database denies access rather than granting it (fail-closed).
//!
//! # Value fetches
//! The `fetch_*` helpers are reads performed past the gate (store
//! coordinates, stock, price, manager). They return `Result` because a
//! missing referent there is a real error, not a verdict.

use tracing::debug;

use crate::backend::Backend;
use crate::error::{BazaarError, Result};
use crate::query::{SqlValue, Statement};
use crate::validate::valid_number;

/// Parse a digit string that already passed `valid_number(_, true)`
fn parse_id(raw: &str) -> Option<i64> {
    raw.parse().ok()
}

/// Whether a store with this identifier exists
#[must_use]
pub fn store_exists(backend: &dyn Backend, store_id: &str) -> bool {
    let store_id = store_id.trim();
    if !valid_number(store_id, true) {
        return false;
    }
    let Some(id) = parse_id(store_id) else { return false };

    let stmt = Statement::new(
        "SELECT storeID FROM Store WHERE storeID = ?",
        vec![SqlValue::Int(id)],
    );
    match backend.query(&stmt) {
        Ok(result) => result.rows.iter().any(|row| row.first().is_some_and(|v| v.trim() == store_id)),
        Err(e) => {
            debug!(error = %e, "store existence check failed closed");
            false
        }
    }
}

/// Whether a warehouse with this identifier exists
#[must_use]
pub fn warehouse_exists(backend: &dyn Backend, warehouse_id: &str) -> bool {
    let warehouse_id = warehouse_id.trim();
    if !valid_number(warehouse_id, true) {
        return false;
    }
    let Some(id) = parse_id(warehouse_id) else { return false };

    let stmt = Statement::new(
        "SELECT WarehouseID FROM Warehouse WHERE WarehouseID = ?",
        vec![SqlValue::Int(id)],
    );
    match backend.query(&stmt) {
        Ok(result) => result
            .rows
            .iter()
            .any(|row| row.first().is_some_and(|v| v.trim() == warehouse_id)),
        Err(e) => {
            debug!(error = %e, "warehouse existence check failed closed");
            false
        }
    }
}

/// Whether a product exists in a store, by (storeID, productName) compound key
#[must_use]
pub fn product_exists(backend: &dyn Backend, store_id: &str, product_name: &str) -> bool {
    let store_id = store_id.trim();
    if !valid_number(store_id, true) {
        return false;
    }
    let Some(id) = parse_id(store_id) else { return false };

    let stmt = Statement::new(
        "SELECT productName FROM Product WHERE storeID = ? AND TRIM(productName) = TRIM(?)",
        vec![SqlValue::Int(id), SqlValue::from(product_name)],
    );
    match backend.query(&stmt) {
        Ok(result) => result
            .rows
            .iter()
            .any(|row| row.first().is_some_and(|v| v.trim() == product_name.trim())),
        Err(e) => {
            debug!(error = %e, "product existence check failed closed");
            false
        }
    }
}

/// Whether a user with this name exists
#[must_use]
pub fn username_exists(backend: &dyn Backend, username: &str) -> bool {
    let stmt = Statement::new(
        "SELECT name FROM Users WHERE TRIM(name) = TRIM(?)",
        vec![SqlValue::from(username)],
    );
    match backend.query(&stmt) {
        Ok(result) => result
            .rows
            .iter()
            .any(|row| row.first().is_some_and(|v| v.trim() == username.trim())),
        Err(e) => {
            debug!(error = %e, "username existence check failed closed");
            false
        }
    }
}

/// Whether this (name, password) pair matches a stored credential
#[must_use]
pub fn credentials_valid(backend: &dyn Backend, username: &str, password: &str) -> bool {
    let stmt = Statement::new(
        "SELECT password FROM Users WHERE TRIM(name) = TRIM(?) AND TRIM(password) = TRIM(?)",
        vec![SqlValue::from(username), SqlValue::from(password)],
    );
    match backend.query(&stmt) {
        Ok(result) => result
            .rows
            .iter()
            .any(|row| row.first().is_some_and(|v| v.trim() == password.trim())),
        Err(e) => {
            debug!(error = %e, "credential check failed closed");
            false
        }
    }
}

/// Fetch a store's managing user. Fetched fresh per call, never cached:
/// a manager may operate on multiple stores and ownership may change.
pub fn fetch_store_manager(backend: &dyn Backend, store_id: i64) -> Result<i64> {
    let value = backend
        .query_one(&Statement::new(
            "SELECT managerID FROM Store WHERE storeID = ?",
            vec![SqlValue::Int(store_id)],
        ))?
        .ok_or_else(|| BazaarError::not_found(format!("store {store_id}")))?;
    value
        .trim()
        .parse()
        .map_err(|_| BazaarError::backend(format!("malformed managerID for store {store_id}")))
}

/// Fetch a store's coordinates
pub fn fetch_store_location(backend: &dyn Backend, store_id: i64) -> Result<(f64, f64)> {
    let result = backend.query(&Statement::new(
        "SELECT latitude, longitude FROM Store WHERE storeID = ?",
        vec![SqlValue::Int(store_id)],
    ))?;
    let row = result
        .rows
        .first()
        .ok_or_else(|| BazaarError::not_found(format!("store {store_id}")))?;
    let latitude = row
        .first()
        .and_then(|v| v.trim().parse().ok())
        .ok_or_else(|| BazaarError::backend(format!("malformed latitude for store {store_id}")))?;
    let longitude = row
        .get(1)
        .and_then(|v| v.trim().parse().ok())
        .ok_or_else(|| BazaarError::backend(format!("malformed longitude for store {store_id}")))?;
    Ok((latitude, longitude))
}

/// Fetch a product's units in stock
pub fn fetch_product_units(backend: &dyn Backend, store_id: i64, product_name: &str) -> Result<i64> {
    let value = backend
        .query_one(&Statement::new(
            "SELECT numberOfUnits FROM Product WHERE storeID = ? AND TRIM(productName) = TRIM(?)",
            vec![SqlValue::Int(store_id), SqlValue::from(product_name)],
        ))?
        .ok_or_else(|| {
            BazaarError::not_found(format!("product {product_name} in store {store_id}"))
        })?;
    value.trim().parse().map_err(|_| {
        BazaarError::backend(format!("malformed numberOfUnits for {product_name}"))
    })
}

/// Fetch a product's price per unit
pub fn fetch_product_price(backend: &dyn Backend, store_id: i64, product_name: &str) -> Result<f64> {
    let value = backend
        .query_one(&Statement::new(
            "SELECT pricePerUnit FROM Product WHERE storeID = ? AND TRIM(productName) = TRIM(?)",
            vec![SqlValue::Int(store_id), SqlValue::from(product_name)],
        ))?
        .ok_or_else(|| {
            BazaarError::not_found(format!("product {product_name} in store {store_id}"))
        })?;
    value.trim().parse().map_err(|_| {
        BazaarError::backend(format!("malformed pricePerUnit for {product_name}"))
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::backend::sqlite::SqliteBackend;
    use crate::backend::QueryRows;

    fn fixture() -> SqliteBackend {
        let backend = SqliteBackend::open_in_memory().expect("open in-memory database");
        backend.ensure_schema().expect("apply schema");
        backend
            .execute_batch(
                "INSERT INTO Users (userID, name, password, latitude, longitude, type)
                 VALUES (1, 'meg', 'pw', 10, 10, 'manager');
                 INSERT INTO Store (storeID, latitude, longitude, managerID)
                 VALUES (5, 10, 10, 1);
                 INSERT INTO Product (storeID, productName, numberOfUnits, pricePerUnit)
                 VALUES (5, 'Widget', 5, 2.5);
                 INSERT INTO Warehouse (WarehouseID, area, latitude, longitude)
                 VALUES (7, 100, 0, 0);",
            )
            .expect("seed");
        backend
    }

    #[test]
    fn test_store_exists() {
        let backend = fixture();
        assert!(store_exists(&backend, "5"));
        assert!(!store_exists(&backend, "6"));
    }

    #[test]
    fn test_malformed_id_rejected_before_lookup() {
        let backend = fixture();
        assert!(!store_exists(&backend, "5.0"));
        assert!(!store_exists(&backend, "-5"));
        assert!(!store_exists(&backend, "five"));
        assert!(!store_exists(&backend, ""));
        assert!(!warehouse_exists(&backend, "7.5"));
    }

    #[test]
    fn test_trim_and_compare() {
        // fixed-width storage pads string columns; the candidate still matches
        let backend = fixture();
        backend
            .execute_batch(
                "INSERT INTO Users (userID, name, password, latitude, longitude)
                 VALUES (2, 'bob   ', 'hunter2  ', 0, 0);",
            )
            .expect("seed padded user");

        assert!(username_exists(&backend, "bob"));
        assert!(credentials_valid(&backend, "bob", "hunter2"));
        assert!(!credentials_valid(&backend, "bob", "wrong"));
    }

    #[test]
    fn test_product_compound_key() {
        let backend = fixture();
        assert!(product_exists(&backend, "5", "Widget"));
        assert!(!product_exists(&backend, "5", "Gadget"));
        // right product, wrong store
        assert!(!product_exists(&backend, "6", "Widget"));
    }

    #[test]
    fn test_warehouse_exists() {
        let backend = fixture();
        assert!(warehouse_exists(&backend, "7"));
        assert!(!warehouse_exists(&backend, "8"));
    }

    #[test]
    fn test_fetches() {
        let backend = fixture();
        assert_eq!(fetch_store_manager(&backend, 5).unwrap(), 1);
        assert_eq!(fetch_store_location(&backend, 5).unwrap(), (10.0, 10.0));
        assert_eq!(fetch_product_units(&backend, 5, "Widget").unwrap(), 5);
        assert_eq!(fetch_product_price(&backend, 5, "Widget").unwrap(), 2.5);
        assert!(matches!(
            fetch_store_manager(&backend, 99),
            Err(BazaarError::NotFound(_))
        ));
    }

    /// Backend that always fails, for fail-closed checks
    struct DownBackend;

    impl Backend for DownBackend {
        fn query(&self, _stmt: &Statement) -> crate::error::Result<QueryRows> {
            Err(BazaarError::backend("unreachable"))
        }
        fn execute(&self, _stmt: &Statement) -> crate::error::Result<u64> {
            Err(BazaarError::backend("unreachable"))
        }
    }

    #[test]
    fn test_fail_closed_on_backend_failure() {
        let backend = DownBackend;
        assert!(!store_exists(&backend, "5"));
        assert!(!warehouse_exists(&backend, "7"));
        assert!(!product_exists(&backend, "5", "Widget"));
        assert!(!username_exists(&backend, "meg"));
        assert!(!credentials_valid(&backend, "meg", "pw"));
    }
}
