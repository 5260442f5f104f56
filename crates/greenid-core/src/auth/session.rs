use std::time::Duration;

use tracing::{debug, info, warn};

use super::identity::{Identity, PermissionSet};
use super::storage::{SessionStorage, LAST_ACTIVITY_KEY, PERMISSIONS_KEY, TOKEN_KEY, USER_KEY};
use super::timer::InactivityTimer;

/// Authentication state derived from the token.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionState {
    Anonymous,
    Authenticated,
}

/// Single source of truth for who is logged in and what they may do.
///
/// Owned by the application root and passed by reference to the guard,
/// the activity registration and the request failure policy.
pub struct SessionStore {
    storage: Box<dyn SessionStorage>,
    token: String,
    identity: Option<Identity>,
    permissions: PermissionSet,
    timer: InactivityTimer,
}

impl SessionStore {
    /// Restore the session from persisted storage.
    ///
    /// Missing or unreadable values fall back to the logged-out defaults.
    /// A restored token does not arm the timer; the first navigation or
    /// activity does.
    pub fn load(storage: Box<dyn SessionStorage>, timeout: Duration) -> Self {
        let token = read_key(storage.as_ref(), TOKEN_KEY).unwrap_or_default();

        let identity = read_key(storage.as_ref(), USER_KEY).and_then(|raw| {
            serde_json::from_str::<Option<Identity>>(&raw)
                .map_err(|e| warn!(error = %e, "Failed to parse stored identity"))
                .ok()
                .flatten()
        });

        let permissions = read_key(storage.as_ref(), PERMISSIONS_KEY)
            .and_then(|raw| {
                serde_json::from_str::<PermissionSet>(&raw)
                    .map_err(|e| warn!(error = %e, "Failed to parse stored permissions"))
                    .ok()
            })
            .unwrap_or_default();

        debug!(
            authenticated = !token.is_empty(),
            has_identity = identity.is_some(),
            permissions = permissions.len(),
            "Session loaded"
        );

        Self {
            storage,
            token,
            identity,
            permissions,
            timer: InactivityTimer::new(timeout),
        }
    }

    // ===== Queries =====

    pub fn token(&self) -> &str {
        &self.token
    }

    pub fn identity(&self) -> Option<&Identity> {
        self.identity.as_ref()
    }

    pub fn permissions(&self) -> &PermissionSet {
        &self.permissions
    }

    pub fn is_authenticated(&self) -> bool {
        !self.token.is_empty()
    }

    pub fn state(&self) -> SessionState {
        if self.is_authenticated() {
            SessionState::Authenticated
        } else {
            SessionState::Anonymous
        }
    }

    pub fn is_superuser(&self) -> bool {
        self.identity.as_ref().map(|i| i.is_superuser).unwrap_or(false)
    }

    pub fn has_permission(&self, name: &str) -> bool {
        self.permissions.contains(name)
    }

    /// Whether an expiry is armed.
    pub fn timer_pending(&self) -> bool {
        self.timer.is_pending()
    }

    /// Remaining inactivity window, for display.
    pub fn time_until_expiry(&self) -> Option<chrono::Duration> {
        self.timer
            .remaining()
            .and_then(|remaining| chrono::Duration::from_std(remaining).ok())
    }

    /// Minutes left before automatic logout (for display)
    pub fn minutes_until_expiry(&self) -> Option<i64> {
        self.time_until_expiry().map(|d| d.num_minutes().max(0))
    }

    // ===== Mutations =====

    /// Store a new bearer token and start the inactivity window.
    ///
    /// Needs no async runtime; the window is a deadline on the tokio clock.
    pub fn set_token(&mut self, token: impl Into<String>) {
        self.token = token.into();
        self.persist(TOKEN_KEY, self.token.clone());
        self.reset_inactivity_timer();
        info!(authenticated = self.is_authenticated(), "Token updated");
    }

    pub fn set_identity(&mut self, identity: Option<Identity>) {
        match serde_json::to_string(&identity) {
            Ok(raw) => self.persist(USER_KEY, raw),
            Err(e) => warn!(error = %e, "Failed to serialize identity"),
        }
        self.identity = identity;
    }

    pub fn set_permissions(&mut self, permissions: PermissionSet) {
        match serde_json::to_string(&permissions) {
            Ok(raw) => self.persist(PERMISSIONS_KEY, raw),
            Err(e) => warn!(error = %e, "Failed to serialize permissions"),
        }
        self.permissions = permissions;
    }

    pub fn reset_inactivity_timer(&mut self) {
        self.timer.reset();
    }

    pub fn clear_inactivity_timer(&mut self) {
        self.timer.clear();
    }

    /// Drop all credentials locally. Calling the logout endpoint is the
    /// caller's business.
    pub fn logout(&mut self) {
        self.token.clear();
        self.identity = None;
        self.permissions.clear();

        for key in [TOKEN_KEY, USER_KEY, PERMISSIONS_KEY, LAST_ACTIVITY_KEY] {
            if let Err(e) = self.storage.remove(key) {
                warn!(key, error = %e, "Failed to remove persisted session value");
            }
        }

        self.clear_inactivity_timer();
        info!("Logged out");
    }

    /// Apply a fired inactivity timeout. Returns true if this logged the
    /// session out.
    pub fn check_inactivity(&mut self) -> bool {
        if self.timer.take_expired() {
            info!("Session expired after inactivity");
            self.logout();
            true
        } else {
            false
        }
    }

    /// Wait for the inactivity timeout and log out when it fires.
    pub async fn expire_on_inactivity(&mut self) {
        self.timer.expired().await;
        info!("Session expired after inactivity");
        self.logout();
    }

    /// End of the store's lifetime: nothing may fire afterwards.
    pub fn dispose(&mut self) {
        self.timer.clear();
    }

    fn persist(&mut self, key: &str, value: String) {
        if let Err(e) = self.storage.set(key, &value) {
            warn!(key, error = %e, "Failed to persist session value");
        }
    }
}

fn read_key(storage: &dyn SessionStorage, key: &str) -> Option<String> {
    match storage.get(key) {
        Ok(value) => value,
        Err(e) => {
            warn!(key, error = %e, "Failed to read persisted session value");
            None
        }
    }
}
