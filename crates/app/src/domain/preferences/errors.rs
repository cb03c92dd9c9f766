//! Preferences service errors.

use bazaar::tabs::TabOrderError;
use thiserror::Error;

use crate::errors::DomainError;

#[derive(Debug, Error)]
pub enum PreferencesError {
    #[error(transparent)]
    TabOrder(#[from] TabOrderError),

    #[error("storage error")]
    Sql(#[from] sqlx::Error),
}

impl From<PreferencesError> for DomainError {
    fn from(error: PreferencesError) -> Self {
        match error {
            PreferencesError::TabOrder(source) => source.into(),
            PreferencesError::Sql(source) => source.into(),
        }
    }
}
