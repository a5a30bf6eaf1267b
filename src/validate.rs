//! Input Validation
//!
//! Pure functions that check raw operator input against a semantic type
//! before it reaches the query assembler. No I/O, no hidden state: each
//! function is a total function of its arguments.
//!
//! Validation and assembly are strictly separated. The assembler in
//! [`crate::query`] trusts its inputs; callers are responsible for running
//! these checks (plus the existence checks in [`crate::lookup`]) first.

use crate::error::{BazaarError, Result};

/// Operator input meaning "no filter / keep unchanged / unlimited"
pub const NO_FILTER: &str = "-";

/// Check whether raw input is the "no filter" sentinel
#[must_use]
pub fn is_no_filter(raw: &str) -> bool {
    raw.trim() == NO_FILTER
}

/// Check whether a raw string is a well-formed non-negative number.
///
/// A string is valid iff every character is a digit or a decimal point,
/// at most one decimal point is present, and the string is not made of
/// dots alone (so `"."` is rejected). When `integer_only` is true no
/// decimal point is accepted at all. Sign characters are never accepted;
/// negative numbers are unsupported input at this layer.
///
/// This performs no range checking. Range rules (coordinate bounds,
/// positive limits) are layered on top by the `parse_*` helpers.
#[must_use]
pub fn valid_number(raw: &str, integer_only: bool) -> bool {
    if raw.is_empty() {
        return false;
    }

    let mut dot_count = 0usize;
    for c in raw.chars() {
        match c {
            '0'..='9' => {}
            '.' => dot_count += 1,
            _ => return false,
        }
    }

    if integer_only {
        return dot_count == 0;
    }

    dot_count <= 1 && dot_count != raw.chars().count()
}

/// Parse a geographic coordinate, enforcing the domain bounds `[0, 100]`.
///
/// Bound enforcement happens here, before any insert is attempted.
pub fn parse_coordinate(raw: &str, label: &str) -> Result<f64> {
    let raw = raw.trim();
    if !valid_number(raw, false) {
        return Err(BazaarError::invalid_input(format!("invalid {label}: {raw}")));
    }
    let value: f64 = raw
        .parse()
        .map_err(|_| BazaarError::invalid_input(format!("invalid {label}: {raw}")))?;
    if !(0.0..=100.0).contains(&value) {
        return Err(BazaarError::invalid_input(format!(
            "{label} must be between 0.0 and 100.0"
        )));
    }
    Ok(value)
}

/// Parse a non-negative integer count (units, identifiers).
///
/// `valid_number` already rejects sign characters, so the value is
/// non-negative by construction; parse failure only remains for inputs
/// too large for `i64`.
pub fn parse_units(raw: &str, label: &str) -> Result<i64> {
    let raw = raw.trim();
    if !valid_number(raw, true) {
        return Err(BazaarError::invalid_input(format!("invalid {label}: {raw}")));
    }
    raw.parse()
        .map_err(|_| BazaarError::invalid_input(format!("{label} out of range: {raw}")))
}

/// Parse a non-negative decimal amount (prices).
pub fn parse_amount(raw: &str, label: &str) -> Result<f64> {
    let raw = raw.trim();
    if !valid_number(raw, false) {
        return Err(BazaarError::invalid_input(format!("invalid {label}: {raw}")));
    }
    raw.parse()
        .map_err(|_| BazaarError::invalid_input(format!("{label} out of range: {raw}")))
}

/// Parse an optional result limit: `"-"` means unlimited.
///
/// Only a positive integer yields a limit; zero is rejected rather than
/// producing an empty report.
pub fn parse_limit(raw: &str) -> Result<Option<i64>> {
    if is_no_filter(raw) {
        return Ok(None);
    }
    let n = parse_units(raw, "result limit")?;
    if n == 0 {
        return Err(BazaarError::invalid_input("result limit must be positive"));
    }
    Ok(Some(n))
}

/// Reject empty or all-whitespace input (names, passwords)
pub fn non_empty<'a>(raw: &'a str, label: &str) -> Result<&'a str> {
    if raw.trim().is_empty() {
        return Err(BazaarError::invalid_input(format!("{label} must not be empty")));
    }
    Ok(raw)
}
