//! What the user sees when a request fails.
//!
//! Every failed call is turned into a `Notice`. Authorization failures also
//! end the local session and send the user back to the login page, except
//! for the login call itself, whose form reports its own error.

use tracing::warn;

use super::ApiError;
use crate::auth::SessionStore;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Notice {
    /// Message for the notification area; `None` when the caller handles it
    pub message: Option<String>,
    /// Session was ended; navigate to the login page
    pub redirect_to_login: bool,
}

impl Notice {
    fn show(message: impl Into<String>) -> Self {
        Self {
            message: Some(message.into()),
            redirect_to_login: false,
        }
    }

    fn logout(message: impl Into<String>) -> Self {
        Self {
            message: Some(message.into()),
            redirect_to_login: true,
        }
    }

    fn silent() -> Self {
        Self {
            message: None,
            redirect_to_login: false,
        }
    }
}

impl ApiError {
    /// Classify a failure. `login_call` marks the credential exchange.
    pub fn notice(&self, login_call: bool) -> Notice {
        match self {
            ApiError::Unauthorized { .. } if login_call => Notice::silent(),
            ApiError::Unauthorized { .. } => Notice::logout("Session expired, please log in again"),
            ApiError::Forbidden { .. } => Notice::logout("Access revoked, please log in again"),
            ApiError::NotFound => Notice::show("The requested resource does not exist"),
            ApiError::ServerError(_) => Notice::show("Server error"),
            ApiError::Timeout => Notice::show("Request timed out"),
            ApiError::Network(_) => Notice::show("Network error"),
            _ if login_call => Notice::silent(),
            ApiError::Status { detail: Some(detail), .. } => Notice::show(detail.clone()),
            ApiError::Status { detail: None, .. } | ApiError::InvalidResponse(_) => {
                Notice::show("Request failed")
            }
        }
    }

    /// Apply the failure policy: end the session when required and return
    /// the notice to display.
    pub fn apply(&self, session: &mut SessionStore, login_call: bool) -> Notice {
        let notice = self.notice(login_call);
        warn!(
            error = %self,
            status = ?self.status(),
            logout = notice.redirect_to_login,
            "Request failed"
        );
        if notice.redirect_to_login {
            session.logout();
        }
        notice
    }
}
