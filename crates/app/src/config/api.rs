//! API Config

use std::time::Duration;

use bazaar::prices::{PriceError, currency};
use clap::Args;
use rusty_money::iso::Currency;
use thiserror::Error;

use crate::{
    api::ApiConfig,
    session::{LoginId, Session},
};

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ConfigError {
    #[error("this command needs --login-id and --api-token")]
    MissingSession,
}

/// Backend connection and session settings.
#[derive(Debug, Args)]
pub struct ApiArgs {
    /// Marketplace backend base URL
    #[arg(long, env = "BAZAAR_API_URL")]
    pub api_url: String,

    /// Bearer token of the logged-in user
    #[arg(long, env = "BAZAAR_API_TOKEN", hide_env_values = true)]
    pub api_token: Option<String>,

    /// Login id of the logged-in user
    #[arg(long, env = "BAZAAR_LOGIN_ID")]
    pub login_id: Option<i64>,

    /// Per-request timeout in seconds
    #[arg(long, env = "BAZAAR_TIMEOUT_SECS", default_value_t = 15)]
    pub timeout_secs: u64,

    /// Number of items requested per page
    #[arg(long, env = "BAZAAR_PAGE_SIZE", default_value_t = 20)]
    pub page_size: u32,

    /// ISO code of the currency the cart is priced in
    #[arg(long, env = "BAZAAR_CURRENCY", default_value = "RUB")]
    pub currency: String,
}

impl ApiArgs {
    #[must_use]
    pub fn api_config(&self) -> ApiConfig {
        ApiConfig {
            base_url: self.api_url.clone(),
            timeout: Duration::from_secs(self.timeout_secs),
        }
    }

    /// The configured session.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::MissingSession`] unless both a login id and a
    /// token are set.
    pub fn session(&self) -> Result<Session, ConfigError> {
        match (self.login_id, &self.api_token) {
            (Some(login_id), Some(token)) if !token.trim().is_empty() => {
                Ok(Session::new(LoginId::new(login_id), token.as_str()))
            }
            _ => Err(ConfigError::MissingSession),
        }
    }

    /// The configured cart currency.
    ///
    /// # Errors
    ///
    /// Returns [`PriceError::UnknownCurrency`] for unsupported codes.
    pub fn currency(&self) -> Result<&'static Currency, PriceError> {
        currency(&self.currency)
    }
}
