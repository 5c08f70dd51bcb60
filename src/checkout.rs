//! Turns the cart into a transaction-creation request.
//!
//! The request carries the order total twice (`total_amount` and `total`);
//! the transactions endpoint requires both.

use chrono::NaiveDateTime;
use serde::Serialize;
use tracing::{info, warn};

use crate::api::{self, ApiTransport};
use crate::cart::{format_money, Cart};
use crate::entities::EntityKind;
use crate::error::{PosError, PosResult};
use crate::notify::Notice;
use crate::session::Session;
use crate::shop::{SelectedBranch, ShopSession};

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TransactionLine {
    pub product_id: i64,
    pub quantity: u32,
    pub price: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CheckoutPayload {
    pub branch_id: i64,
    pub employee_id: Option<i64>,
    pub customer_id: Option<i64>,
    pub total_amount: f64,
    pub total: f64,
    #[serde(rename = "dateOfTransaction")]
    pub date_of_transaction: String,
    #[serde(rename = "timeOfTransaction")]
    pub time_of_transaction: String,
    pub details: Vec<TransactionLine>,
}

/// Build the request body. Fails locally on an empty cart or when no
/// branch has been picked.
pub fn build_payload(
    cart: &Cart,
    branch: Option<&SelectedBranch>,
    session: &Session,
    now: NaiveDateTime,
) -> PosResult<CheckoutPayload> {
    if cart.is_empty() {
        return Err(PosError::validation("Cart is empty"));
    }
    let branch = branch.ok_or_else(|| PosError::validation("Please select a branch first"))?;

    let (employee_id, customer_id) = if session.is_customer() {
        (None, Some(session.id()))
    } else {
        (Some(session.id()), None)
    };
    let total = cart.total();

    Ok(CheckoutPayload {
        branch_id: branch.id,
        employee_id,
        customer_id,
        total_amount: total,
        total,
        date_of_transaction: now.format("%Y-%m-%d").to_string(),
        time_of_transaction: now.format("%H:%M:%S").to_string(),
        details: cart
            .items()
            .iter()
            .map(|i| TransactionLine {
                product_id: i.id,
                quantity: i.quantity,
                price: i.unit_price,
            })
            .collect(),
    })
}

/// Submit the cart. On success the shop session is reset (cart emptied,
/// cart panel closed, back to branch selection). On any failure the cart is
/// left exactly as it was and nothing is retried.
pub async fn submit_checkout<A: ApiTransport>(
    api: &A,
    shop: &mut ShopSession,
    session: &Session,
    now: NaiveDateTime,
) -> PosResult<Notice> {
    let payload = build_payload(shop.cart(), shop.selected_branch(), session, now)?;
    let body = serde_json::to_value(&payload)?;
    let path = api::collection_path(EntityKind::Transactions.resource());

    match api::post_json(api, &path, body, "Checkout failed").await {
        Ok(_) => {
            info!(
                branch_id = payload.branch_id,
                lines = payload.details.len(),
                total = payload.total,
                "checkout accepted"
            );
            shop.complete_checkout();
            Ok(Notice::success(format!(
                "Checkout successful! Your order of {} is placed.",
                format_money(payload.total)
            )))
        }
        Err(e) => {
            warn!(branch_id = payload.branch_id, error = %e, "checkout rejected");
            Err(e)
        }
    }
}

/// User-facing notice for a failed checkout.
pub fn checkout_error_notice(err: &PosError) -> Notice {
    match err {
        PosError::Network(_) => Notice::error("Network error during checkout"),
        PosError::Api { .. } => Notice::error("Checkout failed"),
        other => Notice::from_error(other, "Checkout failed"),
    }
}
