//! Handlers behind the `supervibe` subcommands.
//!
//! Handlers take an [`ApiTransport`](crate::api::ApiTransport) and return
//! the text to print, so the binary stays a thin argument parser.

pub mod admin;
pub mod auth;
pub mod shop;

use crate::api::HttpTransport;
use crate::config::Config;
use crate::error::PosResult;
use crate::session::Session;
use crate::storage;

/// Load the stored session and build a transport that sends its token.
pub fn connect(config: &Config) -> PosResult<(Session, HttpTransport)> {
    let session = storage::load_session()?;
    let api = HttpTransport::new(config, Some(&session))?;
    Ok((session, api))
}
