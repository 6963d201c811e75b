//! Application services.

mod account_service;

pub use account_service::{AccountManager, AccountService};
