//! Bazaar - Role-Gated Marketplace Client
//!
//! Bazaar is a menu-driven client for a retail marketplace database:
//! users, stores, products, orders, warehouses, supply requests, and a
//! product-update audit log. The core is a dynamic query layer that
//! assembles parameterized SQL from validated operator input, plus an
//! authorization layer that gates every operation by role and, for
//! managers, by fresh store ownership.
//!
//! # Core Principles
//! - Every operator-supplied value is bound as a statement parameter,
//!   never spliced into SQL text
//! - Validation happens before any statement is built; malformed input
//!   produces no reads or writes
//! - Authorization fails closed: an unverifiable fact is a denial
//! - Sessions are explicit values, created at login and passed into
//!   every operation
//!
//! # Module Organization
//! - [`error`] - Error types and handling
//! - [`validate`] - Input validation and the `-` skip sentinel
//! - [`query`] - Parameterized statement builders
//! - [`backend`] - Storage trait and the SQLite implementation
//! - [`lookup`] - Existence checks and single-fact fetches
//! - [`authz`] - Roles, role gates, and ownership checks
//! - [`session`] - Accounts, login, and session state
//! - [`ops`] - The operation catalog and its implementations
//! - [`prompt`] - Operator input abstraction
//! - [`output`] - Result table rendering
//! - [`config`] - Database profile management
//! - [`menu`] - The interactive shell

pub mod authz;
pub mod backend;
pub mod config;
pub mod error;
pub mod lookup;
pub mod menu;
pub mod ops;
pub mod output;
pub mod prompt;
pub mod query;
pub mod session;
pub mod validate;

// Re-export commonly used types for convenience
pub use authz::{check_role, require_store_manager, Role, RoleGate};
pub use backend::{Backend, QueryRows};
pub use error::{BazaarError, Result};
pub use ops::{OpContext, OpOutcome, Operation};
pub use output::TableView;
pub use prompt::{ConsolePrompt, Prompt, ScriptedPrompt};
pub use query::{QueryBuilder, SqlValue, Statement, UpdateBuilder};
pub use session::{
    CreateAccountOutcome, DeleteAccountOutcome, LoginOutcome, Session,
};
