//! Sessions
//!
//! Every request that acts on behalf of a user takes a [`Session`] by
//! reference. There is no ambient "current user".

use std::fmt::{Debug, Formatter, Result as FmtResult};

use bazaar::ids::Id;
use zeroize::Zeroizing;

/// Login Id
pub type LoginId = Id<Session>;

/// An authenticated user session.
#[derive(Clone)]
pub struct Session {
    login_id: LoginId,
    token: Zeroizing<String>,
}

impl Session {
    /// Create a session for a login with its bearer token.
    #[must_use]
    pub fn new(login_id: LoginId, token: impl Into<String>) -> Self {
        Self {
            login_id,
            token: Zeroizing::new(token.into()),
        }
    }

    /// A session for public endpoints that need no login.
    #[must_use]
    pub fn anonymous() -> Self {
        Self::new(LoginId::new(0), String::new())
    }

    /// Whether this session carries credentials.
    #[must_use]
    pub fn is_authenticated(&self) -> bool {
        !self.token.is_empty()
    }

    /// The logged-in user.
    #[must_use]
    pub fn login_id(&self) -> LoginId {
        self.login_id
    }

    /// Bearer token for the `Authorization` header.
    #[must_use]
    pub fn bearer(&self) -> &str {
        &self.token
    }
}

impl Debug for Session {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        f.debug_struct("Session")
            .field("login_id", &self.login_id)
            .field("token", &"<redacted>")
            .finish()
    }
}
