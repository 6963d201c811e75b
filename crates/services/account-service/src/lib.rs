//! Account Service Library
//!
//! This crate wires the credential service into account workflows
//! (registration, password change, login check). Storage and transport are
//! left to the caller.

pub mod service;

use std::sync::Arc;

use tracing::info;

use common::{AppError, AppResult, CredentialConfig};
use domain::CredentialService;

use crate::service::AccountManager;

/// Build the credential service from configuration.
pub fn credential_service(config: &CredentialConfig) -> AppResult<CredentialService> {
    let service = CredentialService::new(config.hashing_options())
        .map_err(|e| AppError::config(e.to_string()))?;

    info!(
        algorithm = %config.algorithm,
        bcrypt_cost = config.bcrypt_cost,
        "Credential service configured"
    );
    Ok(service)
}

/// Build the account service from configuration.
pub fn account_manager(config: &CredentialConfig) -> AppResult<AccountManager> {
    let credentials = credential_service(config)?;
    Ok(AccountManager::new(Arc::new(credentials)))
}
