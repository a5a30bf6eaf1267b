//! Operation Catalog and Dispatch
//!
//! Every menu entry is a variant of [`Operation`]. Each variant carries its
//! menu code, label, and role gate as data, so the shell renders menus and
//! enforces authorization from one table instead of per-role code paths.
//!
//! [`Operation::run`] checks the role gate before touching any argument
//! prompt or backend call; a denied operation performs no reads.

pub mod admin;
pub mod customer;
pub mod manager;

use tracing::debug;

use crate::authz::{check_role, RoleGate};
use crate::backend::Backend;
use crate::error::{BazaarError, Result};
use crate::output::TableView;
use crate::prompt::Prompt;
use crate::session::Session;
use crate::validate::{is_no_filter, valid_number};

/// Everything an operation needs, passed explicitly
pub struct OpContext<'a> {
    pub backend: &'a dyn Backend,
    pub session: &'a Session,
    pub prompt: &'a mut dyn Prompt,
}

/// What an operation produced
#[derive(Debug)]
pub enum OpOutcome {
    /// A result table to render
    Table(TableView),
    /// A one-line status message
    Message(String),
    /// The session's account no longer exists; the shell must log out
    AccountDeleted,
}

/// One menu operation
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Operation {
    ViewNearbyStores,
    ViewStoreProducts,
    PlaceOrder,
    ViewRecentOrders,
    ViewFavoriteProducts,
    ViewStoreInformation,
    ManagedStoreReport,
    UpdateProduct,
    RecentProductUpdates,
    PopularProducts,
    PopularCustomers,
    PlaceSupplyRequest,
    ViewSupplyRequests,
    StoreOrders,
    StoreCustomers,
    TopSpenders,
    ViewUsers,
    EditUser,
    ViewAllProducts,
    EditProducts,
    ViewEverything,
    DeleteStore,
    DeleteWarehouse,
    DeleteAccount,
}

impl Operation {
    /// Every operation, in menu order
    pub const ALL: [Operation; 24] = [
        Operation::ViewNearbyStores,
        Operation::ViewStoreProducts,
        Operation::PlaceOrder,
        Operation::ViewRecentOrders,
        Operation::ViewFavoriteProducts,
        Operation::ViewStoreInformation,
        Operation::ManagedStoreReport,
        Operation::UpdateProduct,
        Operation::RecentProductUpdates,
        Operation::PopularProducts,
        Operation::PopularCustomers,
        Operation::PlaceSupplyRequest,
        Operation::ViewSupplyRequests,
        Operation::StoreOrders,
        Operation::StoreCustomers,
        Operation::TopSpenders,
        Operation::ViewUsers,
        Operation::EditUser,
        Operation::ViewAllProducts,
        Operation::EditProducts,
        Operation::ViewEverything,
        Operation::DeleteStore,
        Operation::DeleteWarehouse,
        Operation::DeleteAccount,
    ];

    /// Menu code the operator types to select this operation
    #[must_use]
    pub fn code(&self) -> u32 {
        match self {
            Operation::ViewNearbyStores => 1,
            Operation::ViewStoreProducts => 2,
            Operation::PlaceOrder => 3,
            Operation::ViewRecentOrders => 4,
            Operation::ViewFavoriteProducts => 5,
            Operation::ViewStoreInformation => 6,
            Operation::ManagedStoreReport => 7,
            Operation::UpdateProduct => 8,
            Operation::RecentProductUpdates => 9,
            Operation::PopularProducts => 10,
            Operation::PopularCustomers => 11,
            Operation::PlaceSupplyRequest => 12,
            Operation::ViewSupplyRequests => 13,
            Operation::StoreOrders => 14,
            Operation::StoreCustomers => 15,
            Operation::TopSpenders => 16,
            Operation::ViewUsers => 17,
            Operation::EditUser => 18,
            Operation::ViewAllProducts => 19,
            Operation::EditProducts => 20,
            Operation::ViewEverything => 21,
            Operation::DeleteStore => 22,
            Operation::DeleteWarehouse => 23,
            Operation::DeleteAccount => 99,
        }
    }

    /// Menu label
    #[must_use]
    pub fn label(&self) -> &'static str {
        match self {
            Operation::ViewNearbyStores => "View stores within 30 units",
            Operation::ViewStoreProducts => "View a store's products",
            Operation::PlaceOrder => "Place an order",
            Operation::ViewRecentOrders => "View your 5 most recent orders",
            Operation::ViewFavoriteProducts => "View your favorite products",
            Operation::ViewStoreInformation => "View store information",
            Operation::ManagedStoreReport => "View your managed stores",
            Operation::UpdateProduct => "Update product information",
            Operation::RecentProductUpdates => "View your 5 most recent product updates",
            Operation::PopularProducts => "View a store's 5 most popular products",
            Operation::PopularCustomers => "View a store's 5 most frequent customers",
            Operation::PlaceSupplyRequest => "Place a supply request",
            Operation::ViewSupplyRequests => "View supply requests",
            Operation::StoreOrders => "View orders for your stores",
            Operation::StoreCustomers => "View a store's customers",
            Operation::TopSpenders => "View a store's top spenders",
            Operation::ViewUsers => "View users",
            Operation::EditUser => "Edit a user",
            Operation::ViewAllProducts => "View all products",
            Operation::EditProducts => "Edit products",
            Operation::ViewEverything => "Browse any table",
            Operation::DeleteStore => "Delete a store",
            Operation::DeleteWarehouse => "Delete a warehouse",
            Operation::DeleteAccount => "Delete your account",
        }
    }

    /// Which roles may run this operation
    #[must_use]
    pub fn gate(&self) -> RoleGate {
        match self {
            Operation::ViewNearbyStores
            | Operation::ViewStoreProducts
            | Operation::PlaceOrder
            | Operation::ViewRecentOrders
            | Operation::ViewFavoriteProducts
            | Operation::ViewStoreInformation => RoleGate::AnyUser,
            Operation::ManagedStoreReport
            | Operation::UpdateProduct
            | Operation::RecentProductUpdates
            | Operation::PopularProducts
            | Operation::PopularCustomers
            | Operation::PlaceSupplyRequest
            | Operation::ViewSupplyRequests
            | Operation::StoreOrders
            | Operation::StoreCustomers
            | Operation::TopSpenders => RoleGate::ManagerOnly,
            Operation::ViewUsers
            | Operation::EditUser
            | Operation::ViewAllProducts
            | Operation::EditProducts
            | Operation::ViewEverything
            | Operation::DeleteStore
            | Operation::DeleteWarehouse => RoleGate::AdminOnly,
            Operation::DeleteAccount => RoleGate::NotManager,
        }
    }

    /// Look up an operation by its menu code
    #[must_use]
    pub fn from_code(code: u32) -> Option<Self> {
        Operation::ALL.iter().copied().find(|op| op.code() == code)
    }

    /// Run the operation: gate check first, then dispatch.
    pub fn run(&self, ctx: &mut OpContext<'_>) -> Result<OpOutcome> {
        check_role(ctx.session.role, self.gate())?;
        debug!(operation = ?self, user_id = ctx.session.user_id, "dispatch");

        match self {
            Operation::ViewNearbyStores => customer::view_nearby_stores(ctx),
            Operation::ViewStoreProducts => customer::view_store_products(ctx),
            Operation::PlaceOrder => customer::place_order(ctx),
            Operation::ViewRecentOrders => customer::view_recent_orders(ctx),
            Operation::ViewFavoriteProducts => customer::view_favorite_products(ctx),
            Operation::ViewStoreInformation => customer::view_store_information(ctx),
            Operation::ManagedStoreReport => manager::managed_store_report(ctx),
            Operation::UpdateProduct => manager::update_product(ctx),
            Operation::RecentProductUpdates => manager::recent_product_updates(ctx),
            Operation::PopularProducts => manager::popular_products(ctx),
            Operation::PopularCustomers => manager::popular_customers(ctx),
            Operation::PlaceSupplyRequest => manager::place_supply_request(ctx),
            Operation::ViewSupplyRequests => manager::view_supply_requests(ctx),
            Operation::StoreOrders => manager::store_orders(ctx),
            Operation::StoreCustomers => manager::store_customers(ctx),
            Operation::TopSpenders => manager::top_spenders(ctx),
            Operation::ViewUsers => admin::view_users(ctx),
            Operation::EditUser => admin::edit_user(ctx),
            Operation::ViewAllProducts => admin::view_all_products(ctx),
            Operation::EditProducts => admin::edit_products(ctx),
            Operation::ViewEverything => admin::view_everything(ctx),
            Operation::DeleteStore => admin::delete_store(ctx),
            Operation::DeleteWarehouse => admin::delete_warehouse(ctx),
            Operation::DeleteAccount => admin::delete_account(ctx),
        }
    }
}

/// Prompt for an inclusive integer range over `attribute`.
///
/// `-` skips either bound; anything else must be a well formed integer.
pub(crate) fn prompt_range_bounds(
    prompt: &mut dyn Prompt,
    attribute: &str,
) -> Result<(Option<i64>, Option<i64>)> {
    let parse_bound = |raw: String, which: &str| -> Result<Option<i64>> {
        let raw = raw.trim();
        if is_no_filter(raw) {
            return Ok(None);
        }
        if !valid_number(raw, true) {
            return Err(BazaarError::invalid_input(format!(
                "{which} {attribute} must be an integer or '-'"
            )));
        }
        raw.parse()
            .map(Some)
            .map_err(|_| BazaarError::invalid_input(format!("{which} {attribute} out of range")))
    };

    let first = parse_bound(
        prompt.line(&format!("smallest {attribute} to include, or '-' for no lower bound"))?,
        "smallest",
    )?;
    let last = parse_bound(
        prompt.line(&format!("largest {attribute} to include, or '-' for no upper bound"))?,
        "largest",
    )?;
    Ok((first, last))
}

/// Prompt for an integer ID and parse it, with the attribute name in
/// the error message.
pub(crate) fn prompt_id(prompt: &mut dyn Prompt, label: &str) -> Result<(String, i64)> {
    let raw = prompt.line(label)?.trim().to_string();
    if !valid_number(&raw, true) {
        return Err(BazaarError::invalid_input(format!("{label} must be an integer")));
    }
    let id = raw
        .parse()
        .map_err(|_| BazaarError::invalid_input(format!("{label} out of range")))?;
    Ok((raw, id))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::prompt::ScriptedPrompt;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_codes_are_unique() {
        let mut codes: Vec<u32> = Operation::ALL.iter().map(Operation::code).collect();
        codes.sort_unstable();
        codes.dedup();
        assert_eq!(codes.len(), Operation::ALL.len());
    }

    #[test]
    fn test_from_code_round_trip() {
        for op in Operation::ALL {
            assert_eq!(Operation::from_code(op.code()), Some(op));
        }
        assert_eq!(Operation::from_code(42), None);
    }

    #[test]
    fn test_prompt_range_bounds_shapes() {
        let mut prompt = ScriptedPrompt::new(["-", "-"]);
        assert_eq!(prompt_range_bounds(&mut prompt, "userID").unwrap(), (None, None));

        let mut prompt = ScriptedPrompt::new(["10", "-"]);
        assert_eq!(prompt_range_bounds(&mut prompt, "userID").unwrap(), (Some(10), None));

        let mut prompt = ScriptedPrompt::new(["-", "20"]);
        assert_eq!(prompt_range_bounds(&mut prompt, "userID").unwrap(), (None, Some(20)));

        let mut prompt = ScriptedPrompt::new(["10", "20"]);
        assert_eq!(prompt_range_bounds(&mut prompt, "userID").unwrap(), (Some(10), Some(20)));
    }

    #[test]
    fn test_prompt_range_bounds_rejects_malformed() {
        let mut prompt = ScriptedPrompt::new(["abc", "20"]);
        let err = prompt_range_bounds(&mut prompt, "userID").unwrap_err();
        assert_eq!(err.error_code(), "INVALID_INPUT");

        // a lone dot is not a number
        let mut prompt = ScriptedPrompt::new([".", "-"]);
        assert!(prompt_range_bounds(&mut prompt, "userID").is_err());
    }

    #[test]
    fn test_prompt_id_rejects_decimal() {
        let mut prompt = ScriptedPrompt::new(["3.5"]);
        assert!(prompt_id(&mut prompt, "store ID").is_err());

        let mut prompt = ScriptedPrompt::new([" 7 "]);
        let (raw, id) = prompt_id(&mut prompt, "store ID").unwrap();
        assert_eq!(raw, "7");
        assert_eq!(id, 7);
    }
}
