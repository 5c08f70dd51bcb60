//! SuperVibe POS client library.
//!
//! Talks to the store's REST API under `/api/v1/`: a shopper/cashier flow
//! (branch picker, product list, cart and checkout) and back-office tables
//! with create and delete. The `supervibe` binary is a thin CLI over the
//! [`commands`] handlers.

pub mod admin;
pub mod api;
pub mod auth;
pub mod cart;
pub mod checkout;
pub mod commands;
pub mod config;
pub mod entities;
pub mod error;
pub mod logging;
pub mod notify;
pub mod render;
pub mod schema;
pub mod session;
pub mod shop;
pub mod storage;

pub use api::{ApiTransport, HttpTransport};
pub use cart::Cart;
pub use config::Config;
pub use entities::EntityKind;
pub use error::{PosError, PosResult};
pub use notify::Notice;
pub use session::Session;
pub use shop::ShopSession;
