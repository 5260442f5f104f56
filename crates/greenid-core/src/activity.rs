//! User activity that keeps a session alive.
//!
//! The frontend maps its raw input events onto `Activity` and hands them to
//! an `ActivityRegistration`. The registration is owned by the application
//! root; disposing (or dropping) it stops activity from resetting the timer.

use tracing::trace;

use crate::auth::SessionStore;

/// Qualifying user input events.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Activity {
    MouseDown,
    MouseMove,
    KeyPress,
    Scroll,
    TouchStart,
    Click,
}

impl Activity {
    /// Every kind that counts as user activity.
    pub const ALL: [Activity; 6] = [
        Activity::MouseDown,
        Activity::MouseMove,
        Activity::KeyPress,
        Activity::Scroll,
        Activity::TouchStart,
        Activity::Click,
    ];
}

/// A live set of activity listeners. Acts as its own disposer.
#[derive(Debug)]
pub struct ActivityRegistration {
    kinds: Vec<Activity>,
    active: bool,
}

impl ActivityRegistration {
    pub fn register(kinds: &[Activity]) -> Self {
        Self {
            kinds: kinds.to_vec(),
            active: true,
        }
    }

    /// Listen for every qualifying kind.
    pub fn register_all() -> Self {
        Self::register(&Activity::ALL)
    }

    pub fn is_active(&self) -> bool {
        self.active
    }

    pub fn listens_to(&self, activity: Activity) -> bool {
        self.active && self.kinds.contains(&activity)
    }

    /// Report an input event. Resets the inactivity timer when the
    /// registration is live, the kind is registered and someone is logged
    /// in. Returns whether the timer was reset.
    pub fn notify(&self, activity: Activity, session: &mut SessionStore) -> bool {
        if !self.listens_to(activity) || !session.is_authenticated() {
            return false;
        }
        trace!(?activity, "User activity");
        session.reset_inactivity_timer();
        true
    }

    pub fn dispose(&mut self) {
        self.active = false;
        self.kinds.clear();
    }
}

impl Drop for ActivityRegistration {
    fn drop(&mut self) {
        self.dispose();
    }
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use super::*;
    use crate::auth::MemoryStorage;

    fn session() -> SessionStore {
        SessionStore::load(Box::new(MemoryStorage::new()), Duration::from_secs(60))
    }

    #[tokio::test]
    async fn test_activity_ignored_when_anonymous() {
        let mut session = session();
        let registration = ActivityRegistration::register_all();

        assert!(!registration.notify(Activity::KeyPress, &mut session));
        assert!(!session.timer_pending());
    }

    #[tokio::test]
    async fn test_activity_rearms_cleared_timer() {
        let mut session = session();
        session.set_token("jwt");
        session.clear_inactivity_timer();

        let registration = ActivityRegistration::register_all();
        assert!(registration.notify(Activity::Scroll, &mut session));
        assert!(session.timer_pending());
    }

    #[tokio::test]
    async fn test_unregistered_kind_and_disposed_registration() {
        let mut session = session();
        session.set_token("jwt");
        session.clear_inactivity_timer();

        let mut registration = ActivityRegistration::register(&[Activity::Click]);
        assert!(!registration.notify(Activity::MouseMove, &mut session));

        registration.dispose();
        assert!(!registration.is_active());
        assert!(!registration.notify(Activity::Click, &mut session));
        assert!(!session.timer_pending());
    }
}
