//! Line-oriented shop console: pick a branch, browse its products, build a
//! cart and check out.

use std::str::FromStr;

use chrono::NaiveDateTime;

use crate::api::ApiTransport;
use crate::cart::render_cart;
use crate::checkout::{checkout_error_notice, submit_checkout};
use crate::entities::{Branch, Product};
use crate::error::{PosError, PosResult};
use crate::notify::Notice;
use crate::session::Session;
use crate::shop::{self, ShopSession, View};

pub const HELP: &str = "\
Commands:
  branches        list store branches
  branch <id>     shop at a branch
  products        list products at the selected branch
  add <id>        add one unit of a product to the cart
  cart            show the cart
  close           hide the cart
  checkout        place the order
  back            return to branch selection
  help            show this help
  quit            leave the shop";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ShopCommand {
    Branches,
    Branch(i64),
    Products,
    Add(i64),
    Cart,
    Close,
    Checkout,
    Back,
    Help,
    Quit,
}

fn parse_id(arg: Option<&str>, usage: &str) -> PosResult<i64> {
    arg.and_then(|a| a.parse().ok())
        .ok_or_else(|| PosError::validation(format!("Usage: {usage}")))
}

impl FromStr for ShopCommand {
    type Err = PosError;

    fn from_str(line: &str) -> Result<Self, Self::Err> {
        let mut words = line.split_whitespace();
        let cmd = words.next().unwrap_or("").to_ascii_lowercase();
        let arg = words.next();
        Ok(match cmd.as_str() {
            "branches" => Self::Branches,
            "branch" => Self::Branch(parse_id(arg, "branch <id>")?),
            "products" => Self::Products,
            "add" => Self::Add(parse_id(arg, "add <id>")?),
            "cart" => Self::Cart,
            "close" => Self::Close,
            "checkout" => Self::Checkout,
            "back" => Self::Back,
            "help" | "?" => Self::Help,
            "quit" | "exit" | "q" => Self::Quit,
            other => {
                return Err(PosError::validation(format!(
                    "Unknown command `{other}`, type `help`"
                )))
            }
        })
    }
}

/// Shop state plus the last branch and product lists shown, so ids typed
/// by the user can be resolved without another request.
#[derive(Debug, Default)]
pub struct ShopConsole {
    shop: ShopSession,
    branches: Vec<Branch>,
    products: Vec<Product>,
}

impl ShopConsole {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn shop(&self) -> &ShopSession {
        &self.shop
    }

    pub fn prompt(&self) -> String {
        match (self.shop.view(), self.shop.selected_branch()) {
            (View::ProductSelection, Some(b)) => {
                format!("shop [{}] ({} in cart)> ", b.name, self.shop.cart().count())
            }
            _ => "shop> ".to_string(),
        }
    }

    async fn refresh_branches<A: ApiTransport>(&mut self, api: &A) -> Result<String, Notice> {
        let branches = shop::load_branches(api)
            .await
            .map_err(|e| Notice::from_error(&e, "Failed to load branches"))?;
        self.branches = branches;
        Ok(shop::render_branches(&self.branches))
    }

    async fn refresh_products<A: ApiTransport>(&mut self, api: &A) -> Result<String, Notice> {
        let products = shop::load_products(api, self.shop.selected_branch())
            .await
            .map_err(|e| Notice::from_error(&e, "Failed to load products"))?;
        self.products = products;
        Ok(shop::render_products(&self.products))
    }

    /// Run one command and return what to print. `Quit` is left to the
    /// caller's loop.
    pub async fn execute<A: ApiTransport>(
        &mut self,
        api: &A,
        session: &Session,
        cmd: ShopCommand,
        now: NaiveDateTime,
    ) -> String {
        let result = match cmd {
            ShopCommand::Branches => {
                self.shop.show_branches();
                self.refresh_branches(api).await
            }
            ShopCommand::Branch(id) => self.choose_branch(api, id).await,
            ShopCommand::Products => {
                if self.shop.selected_branch().is_none() {
                    Err(Notice::error("Please select a branch first"))
                } else {
                    self.refresh_products(api).await
                }
            }
            ShopCommand::Add(id) => match self.products.iter().find(|p| p.id == id) {
                Some(product) => Ok(self.shop.add_to_cart(product).to_string()),
                None => Err(Notice::error(format!(
                    "No product with id {id}, run `products` first"
                ))),
            },
            ShopCommand::Cart => {
                self.shop.open_cart();
                Ok(render_cart(self.shop.cart()))
            }
            ShopCommand::Close => {
                self.shop.close_cart();
                Ok(Notice::info("Cart closed").to_string())
            }
            ShopCommand::Checkout => match submit_checkout(api, &mut self.shop, session, now).await
            {
                Ok(notice) => {
                    self.products.clear();
                    Ok(notice.to_string())
                }
                Err(e) => Err(checkout_error_notice(&e)),
            },
            ShopCommand::Back => {
                self.shop.show_branches();
                Ok(shop::render_branches(&self.branches))
            }
            ShopCommand::Help => Ok(HELP.to_string()),
            ShopCommand::Quit => Ok(String::new()),
        };
        result.unwrap_or_else(|notice| notice.to_string())
    }

    async fn choose_branch<A: ApiTransport>(&mut self, api: &A, id: i64) -> Result<String, Notice> {
        if !self.branches.iter().any(|b| b.id == id) {
            self.refresh_branches(api).await?;
        }
        let branch = self
            .branches
            .iter()
            .find(|b| b.id == id)
            .ok_or_else(|| Notice::error(format!("No branch with id {id}")))?;
        let notice = self.shop.select_branch(branch);
        let products = self.refresh_products(api).await?;
        Ok(format!("{notice}\n{products}"))
    }
}
