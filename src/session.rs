//! Session and Authentication Boundary
//!
//! A [`Session`] holds the authenticated identity, role, and the operator's
//! geographic coordinates for the duration of one login. It is an explicit
//! value passed into every operation call, created by [`login`] and dropped
//! on logout or account deletion; there is no shared static state, so a
//! multi-session embedding needs no locking discipline.
//!
//! Login either fully populates every session field from a single row fetch
//! or produces no session at all; a half-updated session cannot exist.
//!
//! The auth boundary reports expected outcomes (name taken, wrong password,
//! role-forbidden) as enum values rather than errors; only backend faults
//! surface as `Err`.

use tracing::info;

use crate::authz::Role;
use crate::backend::Backend;
use crate::error::{BazaarError, Result};
use crate::lookup::{credentials_valid, username_exists};
use crate::query::{SqlValue, Statement};
use crate::validate::{non_empty, parse_coordinate};

/// Authenticated session state
#[derive(Debug, Clone)]
pub struct Session {
    pub user_id: i64,
    pub username: String,
    pub role: Role,
    pub latitude: f64,
    pub longitude: f64,
}

/// Outcome of an account creation attempt
#[derive(Debug, PartialEq, Eq)]
pub enum CreateAccountOutcome {
    Created,
    UsernameTaken,
    InvalidInput(String),
}

/// Outcome of a login attempt
#[derive(Debug)]
pub enum LoginOutcome {
    LoggedIn(Session),
    InvalidUsername,
    WrongPassword,
}

/// Outcome of an account deletion attempt
#[derive(Debug, PartialEq, Eq)]
pub enum DeleteAccountOutcome {
    Deleted,
    WrongPassword,
    /// Managers may not delete their account (stores would lose their
    /// managing user)
    Forbidden,
}

/// Euclidean distance between two coordinate pairs
#[must_use]
pub fn distance(lat1: f64, long1: f64, lat2: f64, long2: f64) -> f64 {
    let dlat = lat1 - lat2;
    let dlong = long1 - long2;
    (dlat * dlat + dlong * dlong).sqrt()
}

/// Create a new customer account.
///
/// Coordinate bounds are enforced before any insert is attempted. New
/// accounts always start as customers; role changes are an admin operation.
pub fn create_account(
    backend: &dyn Backend,
    name: &str,
    password: &str,
    latitude_raw: &str,
    longitude_raw: &str,
) -> Result<CreateAccountOutcome> {
    if let Err(e) = non_empty(name, "name").and_then(|_| non_empty(password, "password")) {
        return Ok(CreateAccountOutcome::InvalidInput(e.message()));
    }
    let latitude = match parse_coordinate(latitude_raw, "latitude") {
        Ok(v) => v,
        Err(e) => return Ok(CreateAccountOutcome::InvalidInput(e.message())),
    };
    let longitude = match parse_coordinate(longitude_raw, "longitude") {
        Ok(v) => v,
        Err(e) => return Ok(CreateAccountOutcome::InvalidInput(e.message())),
    };

    if username_exists(backend, name) {
        return Ok(CreateAccountOutcome::UsernameTaken);
    }

    backend.execute(&Statement::new(
        "INSERT INTO Users (name, password, latitude, longitude, type) \
         VALUES (?, ?, ?, ?, ?)",
        vec![
            SqlValue::from(name),
            SqlValue::from(password),
            SqlValue::Real(latitude),
            SqlValue::Real(longitude),
            SqlValue::from(Role::Customer.as_str()),
        ],
    ))?;

    info!(name, "account created");
    Ok(CreateAccountOutcome::Created)
}

/// Authenticate and build a session.
///
/// The two failure modes are reported separately so the shell can prompt
/// accordingly; the session itself comes from one row fetch.
pub fn login(backend: &dyn Backend, name: &str, password: &str) -> Result<LoginOutcome> {
    if !username_exists(backend, name) {
        return Ok(LoginOutcome::InvalidUsername);
    }
    if !credentials_valid(backend, name, password) {
        return Ok(LoginOutcome::WrongPassword);
    }

    let result = backend.query(&Statement::new(
        "SELECT userID, name, type, latitude, longitude FROM Users \
         WHERE TRIM(name) = TRIM(?) AND TRIM(password) = TRIM(?)",
        vec![SqlValue::from(name), SqlValue::from(password)],
    ))?;
    let row = result
        .rows
        .first()
        .ok_or_else(|| BazaarError::backend("credential row vanished during login"))?;

    let field = |idx: usize| -> Result<&String> {
        row.get(idx)
            .ok_or_else(|| BazaarError::backend("incomplete user row during login"))
    };

    let user_id: i64 = field(0)?
        .trim()
        .parse()
        .map_err(|_| BazaarError::backend("malformed userID during login"))?;
    let username = field(1)?.trim().to_string();
    let role = Role::parse(field(2)?)
        .ok_or_else(|| BazaarError::backend("unknown user type during login"))?;
    let latitude: f64 = field(3)?
        .trim()
        .parse()
        .map_err(|_| BazaarError::backend("malformed latitude during login"))?;
    let longitude: f64 = field(4)?
        .trim()
        .parse()
        .map_err(|_| BazaarError::backend("malformed longitude during login"))?;

    info!(user_id, %role, "login");
    Ok(LoginOutcome::LoggedIn(Session { user_id, username, role, latitude, longitude }))
}

/// Delete the session's own account after password re-entry.
///
/// Managers always receive `Forbidden`, regardless of password
/// correctness; the role check runs first.
pub fn delete_account(
    backend: &dyn Backend,
    session: &Session,
    password: &str,
) -> Result<DeleteAccountOutcome> {
    if session.role == Role::Manager {
        return Ok(DeleteAccountOutcome::Forbidden);
    }
    if !credentials_valid(backend, &session.username, password) {
        return Ok(DeleteAccountOutcome::WrongPassword);
    }

    backend.execute(&Statement::new(
        "DELETE FROM Users WHERE userID = ?",
        vec![SqlValue::Int(session.user_id)],
    ))?;

    info!(user_id = session.user_id, "account deleted");
    Ok(DeleteAccountOutcome::Deleted)
}
