//! Query Assembly
//!
//! This module builds the final statement text for every report and mutation
//! from a fixed template plus zero or more optional clauses. Values are never
//! spliced into the SQL text: each clause carries `?` placeholders and the
//! builder tracks the bound parameter list alongside, so the execution
//! boundary receives a `Statement` it can prepare and bind directly.
//!
//! # Clause ordering
//! Optional clauses are emitted in the canonical order the query language
//! requires (filters, then groupings, then orderings, then the limit)
//! regardless of the order callers add them.
//!
//! # Trust boundary
//! The assembler trusts its inputs. Callers run [`crate::validate`] and
//! [`crate::lookup`] checks first; a clause whose raw input was the "-"
//! sentinel is simply never added, not replaced by a no-op predicate.
//! Column and attribute names come from fixed `&'static str` tables in the
//! operation handlers, never from operator input.

use std::fmt;

/// A value bound to a `?` placeholder
#[derive(Debug, Clone, PartialEq)]
pub enum SqlValue {
    Int(i64),
    Real(f64),
    Text(String),
}

impl fmt::Display for SqlValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Int(i) => write!(f, "{i}"),
            Self::Real(r) => write!(f, "{r}"),
            Self::Text(t) => write!(f, "{t}"),
        }
    }
}

impl From<i64> for SqlValue {
    fn from(v: i64) -> Self {
        Self::Int(v)
    }
}

impl From<f64> for SqlValue {
    fn from(v: f64) -> Self {
        Self::Real(v)
    }
}

impl From<&str> for SqlValue {
    fn from(v: &str) -> Self {
        Self::Text(v.to_string())
    }
}

impl From<String> for SqlValue {
    fn from(v: String) -> Self {
        Self::Text(v)
    }
}

/// A complete parameterized statement: template plus bound values
#[derive(Debug, Clone, PartialEq)]
pub struct Statement {
    pub sql: String,
    pub params: Vec<SqlValue>,
}

impl Statement {
    /// Create a statement from a fixed template and its parameters
    pub fn new(sql: impl Into<String>, params: Vec<SqlValue>) -> Self {
        Self { sql: sql.into(), params }
    }
}

/// Incremental builder for SELECT statements with optional clauses
#[derive(Debug, Clone)]
pub struct QueryBuilder {
    projection: Vec<String>,
    source: String,
    filters: Vec<String>,
    filter_params: Vec<SqlValue>,
    group_by: Vec<String>,
    order_by: Vec<String>,
    limit: Option<i64>,
}

impl QueryBuilder {
    /// Start a query with a fixed projection
    #[must_use]
    pub fn select(columns: &[&str]) -> Self {
        Self {
            projection: columns.iter().map(|c| (*c).to_string()).collect(),
            source: String::new(),
            filters: Vec::new(),
            filter_params: Vec::new(),
            group_by: Vec::new(),
            order_by: Vec::new(),
            limit: None,
        }
    }

    /// Set the FROM clause (table or fixed join expression)
    #[must_use]
    pub fn from(mut self, source: &str) -> Self {
        self.source = source.to_string();
        self
    }

    /// Add a filter predicate with its bound parameters.
    ///
    /// The predicate text contains one `?` per parameter, in order.
    #[must_use]
    pub fn filter(mut self, predicate: &str, params: impl IntoIterator<Item = SqlValue>) -> Self {
        self.filters.push(predicate.to_string());
        self.filter_params.extend(params);
        self
    }

    /// Add an inclusive range filter over `attribute`.
    ///
    /// Either bound may be absent; the four combinations yield the four
    /// predicate shapes: none, `>= first`, `<= last`, or both.
    #[must_use]
    pub fn range_filter(
        mut self,
        attribute: &str,
        first: Option<SqlValue>,
        last: Option<SqlValue>,
    ) -> Self {
        if let Some(first) = first {
            self = self.filter(&format!("{attribute} >= ?"), [first]);
        }
        if let Some(last) = last {
            self = self.filter(&format!("{attribute} <= ?"), [last]);
        }
        self
    }

    /// Add a grouping column (projection untouched)
    #[must_use]
    pub fn group_by(mut self, column: &str) -> Self {
        self.group_by.push(column.to_string());
        self
    }

    /// Add a groupable dimension: the column joins the projection and the
    /// grouping list atomically, keeping the grouping aligned with the
    /// non-aggregated projection columns.
    #[must_use]
    pub fn add_dimension(mut self, column: &str) -> Self {
        self.projection.push(column.to_string());
        self.group_by.push(column.to_string());
        self
    }

    /// Add an ordering expression
    #[must_use]
    pub fn order_by(mut self, expr: &str) -> Self {
        self.order_by.push(expr.to_string());
        self
    }

    /// Cap the number of rows; `None` means unlimited and emits no clause
    #[must_use]
    pub fn limit(mut self, n: Option<i64>) -> Self {
        self.limit = n;
        self
    }

    /// Emit the final statement in canonical clause order
    #[must_use]
    pub fn build(self) -> Statement {
        let mut sql = format!("SELECT {} FROM {}", self.projection.join(", "), self.source);
        let mut params = self.filter_params;

        if !self.filters.is_empty() {
            sql.push_str(" WHERE ");
            sql.push_str(&self.filters.join(" AND "));
        }
        if !self.group_by.is_empty() {
            sql.push_str(" GROUP BY ");
            sql.push_str(&self.group_by.join(", "));
        }
        if !self.order_by.is_empty() {
            sql.push_str(" ORDER BY ");
            sql.push_str(&self.order_by.join(", "));
        }
        if let Some(n) = self.limit {
            sql.push_str(" LIMIT ?");
            params.push(SqlValue::Int(n));
        }

        Statement { sql, params }
    }
}

/// Incremental builder for UPDATE statements whose SET list depends on
/// which optional inputs were supplied
#[derive(Debug, Clone)]
pub struct UpdateBuilder {
    table: String,
    assignments: Vec<String>,
    assignment_params: Vec<SqlValue>,
    filters: Vec<String>,
    filter_params: Vec<SqlValue>,
}

impl UpdateBuilder {
    #[must_use]
    pub fn table(table: &str) -> Self {
        Self {
            table: table.to_string(),
            assignments: Vec::new(),
            assignment_params: Vec::new(),
            filters: Vec::new(),
            filter_params: Vec::new(),
        }
    }

    /// Assign a new value to a column
    #[must_use]
    pub fn set(mut self, column: &str, value: SqlValue) -> Self {
        self.assignments.push(format!("{column} = ?"));
        self.assignment_params.push(value);
        self
    }

    /// Scope the update with a filter predicate
    #[must_use]
    pub fn filter(mut self, predicate: &str, params: impl IntoIterator<Item = SqlValue>) -> Self {
        self.filters.push(predicate.to_string());
        self.filter_params.extend(params);
        self
    }

    /// Whether any assignment was added; an empty update is a caller-level
    /// "no changes" outcome, not a statement
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.assignments.is_empty()
    }

    #[must_use]
    pub fn build(self) -> Statement {
        let mut sql = format!("UPDATE {} SET {}", self.table, self.assignments.join(", "));
        let mut params = self.assignment_params;

        if !self.filters.is_empty() {
            sql.push_str(" WHERE ");
            sql.push_str(&self.filters.join(" AND "));
        }
        params.extend(self.filter_params);

        Statement { sql, params }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_bare_query() {
        let stmt = QueryBuilder::select(&["storeID", "latitude"]).from("Store").build();
        assert_eq!(stmt.sql, "SELECT storeID, latitude FROM Store");
        assert!(stmt.params.is_empty());
    }

    #[test]
    fn test_filters_joined_with_and() {
        let stmt = QueryBuilder::select(&["productName"])
            .from("Product")
            .filter("storeID = ?", [SqlValue::Int(5)])
            .filter("numberOfUnits > ?", [SqlValue::Int(0)])
            .build();
        assert_eq!(
            stmt.sql,
            "SELECT productName FROM Product WHERE storeID = ? AND numberOfUnits > ?"
        );
        assert_eq!(stmt.params, vec![SqlValue::Int(5), SqlValue::Int(0)]);
    }

    #[test]
    fn test_range_filter_no_bounds() {
        let stmt = QueryBuilder::select(&["*"]).from("Users").range_filter("userID", None, None).build();
        assert_eq!(stmt.sql, "SELECT * FROM Users");
        assert!(stmt.params.is_empty());
    }

    #[test]
    fn test_range_filter_lower_bound_only() {
        let stmt = QueryBuilder::select(&["*"])
            .from("Users")
            .range_filter("userID", Some(SqlValue::Int(5)), None)
            .build();
        assert_eq!(stmt.sql, "SELECT * FROM Users WHERE userID >= ?");
        assert_eq!(stmt.params, vec![SqlValue::Int(5)]);
    }

    #[test]
    fn test_range_filter_upper_bound_only() {
        let stmt = QueryBuilder::select(&["*"])
            .from("Users")
            .range_filter("userID", None, Some(SqlValue::Int(9)))
            .build();
        assert_eq!(stmt.sql, "SELECT * FROM Users WHERE userID <= ?");
        assert_eq!(stmt.params, vec![SqlValue::Int(9)]);
    }

    #[test]
    fn test_range_filter_both_bounds() {
        let stmt = QueryBuilder::select(&["*"])
            .from("Users")
            .range_filter("userID", Some(SqlValue::Int(5)), Some(SqlValue::Int(9)))
            .build();
        assert_eq!(stmt.sql, "SELECT * FROM Users WHERE userID >= ? AND userID <= ?");
        assert_eq!(stmt.params, vec![SqlValue::Int(5), SqlValue::Int(9)]);
    }

    #[test]
    fn test_canonical_clause_order() {
        // added out of order on purpose; emission order is fixed
        let stmt = QueryBuilder::select(&["productName", "SUM(unitsOrdered) AS total_units"])
            .from("Orders")
            .limit(Some(10))
            .order_by("total_units DESC")
            .group_by("productName")
            .filter("customerID = ?", [SqlValue::Int(1)])
            .build();
        assert_eq!(
            stmt.sql,
            "SELECT productName, SUM(unitsOrdered) AS total_units FROM Orders \
             WHERE customerID = ? GROUP BY productName ORDER BY total_units DESC LIMIT ?"
        );
        assert_eq!(stmt.params, vec![SqlValue::Int(1), SqlValue::Int(10)]);
    }

    #[test]
    fn test_add_dimension_keeps_projection_and_grouping_aligned() {
        let stmt = QueryBuilder::select(&["productName", "SUM(unitsOrdered) AS total_units"])
            .from("Orders")
            .group_by("productName")
            .add_dimension("storeID")
            .build();
        assert_eq!(
            stmt.sql,
            "SELECT productName, SUM(unitsOrdered) AS total_units, storeID FROM Orders \
             GROUP BY productName, storeID"
        );
    }

    #[test]
    fn test_no_limit_emits_no_clause() {
        let stmt = QueryBuilder::select(&["*"]).from("Orders").limit(None).build();
        assert_eq!(stmt.sql, "SELECT * FROM Orders");
    }

    #[test]
    fn test_limit_binds_as_parameter() {
        let stmt = QueryBuilder::select(&["*"]).from("Orders").limit(Some(5)).build();
        assert_eq!(stmt.sql, "SELECT * FROM Orders LIMIT ?");
        assert_eq!(stmt.params, vec![SqlValue::Int(5)]);
    }

    #[test]
    fn test_update_single_assignment() {
        let stmt = UpdateBuilder::table("Product")
            .set("pricePerUnit", SqlValue::Real(9.99))
            .filter("storeID = ?", [SqlValue::Int(3)])
            .filter("productName = ?", [SqlValue::from("Widget")])
            .build();
        assert_eq!(
            stmt.sql,
            "UPDATE Product SET pricePerUnit = ? WHERE storeID = ? AND productName = ?"
        );
        assert_eq!(stmt.params.len(), 3);
    }

    #[test]
    fn test_update_multiple_assignments() {
        let stmt = UpdateBuilder::table("Product")
            .set("numberOfUnits", SqlValue::Int(50))
            .set("pricePerUnit", SqlValue::Real(2.5))
            .filter("storeID = ?", [SqlValue::Int(3)])
            .build();
        assert_eq!(
            stmt.sql,
            "UPDATE Product SET numberOfUnits = ?, pricePerUnit = ? WHERE storeID = ?"
        );
        assert_eq!(
            stmt.params,
            vec![SqlValue::Int(50), SqlValue::Real(2.5), SqlValue::Int(3)]
        );
    }

    #[test]
    fn test_update_unscoped_when_no_filters() {
        let stmt = UpdateBuilder::table("Product").set("numberOfUnits", SqlValue::Int(0)).build();
        assert_eq!(stmt.sql, "UPDATE Product SET numberOfUnits = ?");
    }

    #[test]
    fn test_update_emptiness() {
        let builder = UpdateBuilder::table("Users");
        assert!(builder.is_empty());
        let builder = builder.set("name", SqlValue::from("bob"));
        assert!(!builder.is_empty());
    }
}
