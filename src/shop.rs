//! Cashier/shopper session: branch picker, product list and cart.
//!
//! [`ShopSession`] owns all mutable shop state (cart, selected branch, which
//! view is active and whether the cart panel is open). It is driven from a
//! single UI loop, so nothing here is shared or locked.

use tracing::{debug, info};

use crate::api::{self, ApiTransport};
use crate::cart::Cart;
use crate::entities::{Branch, EntityKind, Product};
use crate::error::PosResult;
use crate::notify::Notice;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SelectedBranch {
    pub id: i64,
    pub name: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum View {
    BranchSelection,
    ProductSelection,
}

#[derive(Debug)]
pub struct ShopSession {
    cart: Cart,
    selected_branch: Option<SelectedBranch>,
    view: View,
    cart_open: bool,
}

impl Default for ShopSession {
    fn default() -> Self {
        Self::new()
    }
}

impl ShopSession {
    pub fn new() -> Self {
        Self {
            cart: Cart::new(),
            selected_branch: None,
            view: View::BranchSelection,
            cart_open: false,
        }
    }

    pub fn cart(&self) -> &Cart {
        &self.cart
    }

    pub fn selected_branch(&self) -> Option<&SelectedBranch> {
        self.selected_branch.as_ref()
    }

    pub fn view(&self) -> View {
        self.view
    }

    pub fn is_cart_open(&self) -> bool {
        self.cart_open
    }

    /// Replace the active branch and switch to its product list.
    pub fn select_branch(&mut self, branch: &Branch) -> Notice {
        let selected = SelectedBranch {
            id: branch.id,
            name: branch.display_name(),
        };
        info!(branch_id = selected.id, "branch selected");
        let notice = Notice::info(format!("Shopping at {}", selected.name));
        self.selected_branch = Some(selected);
        self.view = View::ProductSelection;
        notice
    }

    /// Back to the branch picker. The cart and selection are kept.
    pub fn show_branches(&mut self) {
        self.view = View::BranchSelection;
    }

    pub fn add_to_cart(&mut self, product: &Product) -> Notice {
        let name = product.display_name();
        self.cart.add_item(product.id, &name, product.price());
        debug!(
            product_id = product.id,
            count = self.cart.count(),
            "added to cart"
        );
        Notice::info(format!("{name} added to cart"))
    }

    pub fn open_cart(&mut self) {
        self.cart_open = true;
    }

    pub fn close_cart(&mut self) {
        self.cart_open = false;
    }

    /// Reset after the backend accepted the order.
    pub(crate) fn complete_checkout(&mut self) {
        self.cart.remove_all();
        self.cart_open = false;
        self.view = View::BranchSelection;
    }
}

pub async fn load_branches<A: ApiTransport>(api: &A) -> PosResult<Vec<Branch>> {
    api::get_json(api, &api::collection_path(EntityKind::Branches.resource())).await
}

/// Products offered at `branch`. The branch id is passed as a query
/// parameter; servers that do not filter by branch return everything.
pub async fn load_products<A: ApiTransport>(
    api: &A,
    branch: Option<&SelectedBranch>,
) -> PosResult<Vec<Product>> {
    let mut path = api::collection_path(EntityKind::Products.resource());
    if let Some(b) = branch {
        path.push_str(&format!("?branch_id={}", b.id));
    }
    api::get_json(api, &path).await
}

pub fn render_branches(branches: &[Branch]) -> String {
    if branches.is_empty() {
        return "No branches available.".to_string();
    }
    branches
        .iter()
        .map(|b| {
            format!(
                "[{}] {} - {}",
                b.id,
                b.display_name(),
                crate::render::title_case(b.location.as_deref())
            )
        })
        .collect::<Vec<_>>()
        .join("\n")
}

pub fn render_products(products: &[Product]) -> String {
    if products.is_empty() {
        return "No products available.".to_string();
    }
    products
        .iter()
        .map(|p| {
            format!(
                "[{}] {}  {}  (Stock: {})",
                p.id,
                p.display_name(),
                crate::cart::format_money(p.price()),
                p.stock.map_or_else(|| "-".to_string(), |s| s.to_string())
            )
        })
        .collect::<Vec<_>>()
        .join("\n")
}
