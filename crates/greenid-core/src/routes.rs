//! Route table and navigation guard of the admin shell.
//!
//! Every navigation goes through `guard`, which decides between proceeding,
//! redirecting to the login page, or reporting an unknown path. Proceeding
//! while logged in counts as activity and re-arms the inactivity timer.

use tracing::debug;

use crate::auth::SessionStore;
use crate::tabs::RouteDescriptor;

pub const LOGIN_PATH: &str = "/login";
pub const ROOT_PATH: &str = "/";

/// A page of the admin shell.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Route {
    /// Path pattern; `:name` segments match any single segment
    pub path: &'static str,
    pub name: &'static str,
    pub title: &'static str,
    /// Permission required unless the user is a superuser
    pub permission: Option<&'static str>,
    /// Reachable, but not listed in the menu
    pub hidden: bool,
    pub requires_auth: bool,
}

const fn page(
    path: &'static str,
    name: &'static str,
    title: &'static str,
    permission: Option<&'static str>,
) -> Route {
    Route {
        path,
        name,
        title,
        permission,
        hidden: false,
        requires_auth: true,
    }
}

const fn hidden_page(path: &'static str, name: &'static str, title: &'static str) -> Route {
    Route {
        path,
        name,
        title,
        permission: None,
        hidden: true,
        requires_auth: true,
    }
}

// ============================================================================
// Route table
// ============================================================================

/// Pages in menu order. Group nodes of the navigation tree are only
/// redirects (see `REDIRECTS`).
pub const ROUTES: &[Route] = &[
    Route {
        path: LOGIN_PATH,
        name: "Login",
        title: "Login",
        permission: None,
        hidden: true,
        requires_auth: false,
    },
    page("/dashboard", "Dashboard", "Dashboard", Some("dashboard")),
    hidden_page("/task-detail/:id", "TaskDetail", "Task Detail"),
    // Green identification
    page("/green-identify/pending", "TaskPending", "Pending Tasks", Some("green-identify-pending")),
    page("/green-identify/completed", "TaskCompleted", "Completed Tasks", Some("green-identify-completed")),
    page("/green-identify/archived", "TaskArchived", "Archived Tasks", Some("green-identify-archived")),
    page("/green-identify/query", "TaskQuery", "Task Query", Some("green-identify-query")),
    page("/green-identify/online-report", "OnlineReport", "Online Report", Some("green-identify-query")),
    // System management
    page("/system/user", "SystemUser", "Users", Some("system-user")),
    page("/system/role", "SystemRole", "Roles", Some("system-role")),
    page("/system/org", "SystemOrg", "Organizations", Some("system-org")),
    page("/system/log/operation", "LogOperation", "Operation Log", Some("system-log-operation")),
    page("/system/log/login", "LogLogin", "Login Log", Some("system-log-login")),
    page("/system/log/exception", "LogException", "Exception Log", Some("system-log-exception")),
    // Workflow
    hidden_page("/workflow/designer", "WorkflowDesigner", "Process Designer"),
    page("/workflow/management", "WorkflowManagement", "Processes", Some("workflow-management")),
    page("/workflow/instances", "WorkflowInstances", "Process Instances", Some("workflow-instances")),
    page("/workflow/variables", "WorkflowVariables", "Process Variables", Some("workflow-variables")),
];

/// Group paths and where they land.
const REDIRECTS: &[(&str, &str)] = &[
    (ROOT_PATH, "/dashboard"),
    ("/green-identify", "/green-identify/pending"),
    ("/system", "/system/user"),
    ("/system/log", "/system/log/operation"),
    ("/workflow", "/workflow/management"),
];

/// Redirects are followed at most this many times per resolution
const MAX_REDIRECTS: usize = 8;

fn matches(pattern: &str, path: &str) -> bool {
    let mut pattern_segments = pattern.split('/');
    let mut path_segments = path.split('/');
    loop {
        match (pattern_segments.next(), path_segments.next()) {
            (None, None) => return true,
            (Some(p), Some(s)) if p.starts_with(':') && !s.is_empty() => continue,
            (Some(p), Some(s)) if p == s => continue,
            _ => return false,
        }
    }
}

fn normalize(path: &str) -> &str {
    let trimmed = path.split(['?', '#']).next().unwrap_or(path);
    match trimmed.trim_end_matches('/') {
        "" => ROOT_PATH,
        p => p,
    }
}

/// Find the page for a concrete path, following group redirects.
/// Returns the final path together with the route.
pub fn resolve(path: &str) -> Option<(String, &'static Route)> {
    let mut current = normalize(path).to_string();
    for _ in 0..MAX_REDIRECTS {
        if let Some((_, target)) = REDIRECTS.iter().find(|(from, _)| *from == current) {
            current = (*target).to_string();
            continue;
        }
        return ROUTES
            .iter()
            .find(|route| matches(route.path, &current))
            .map(|route| (current, route));
    }
    None
}

pub fn find_by_name(name: &str) -> Option<&'static Route> {
    ROUTES.iter().find(|route| route.name == name)
}

/// Outcome of a navigation attempt.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Navigation {
    /// Show the page at `path`
    Proceed { path: String, route: &'static Route },
    /// Navigate to `path` instead (run it through the guard again)
    Redirect(String),
    NotFound(String),
}

impl Navigation {
    /// Tab descriptor for a proceeding navigation.
    pub fn descriptor(&self) -> Option<RouteDescriptor> {
        match self {
            Navigation::Proceed { path, route } => Some(
                RouteDescriptor::new(path.clone())
                    .name(route.name)
                    .meta_title(route.title),
            ),
            _ => None,
        }
    }
}

/// Decide whether the current session may open `path`.
pub fn guard(path: &str, session: &mut SessionStore) -> Navigation {
    let Some((resolved, route)) = resolve(path) else {
        debug!(path, "No route for path");
        return Navigation::NotFound(path.to_string());
    };

    let authenticated = session.is_authenticated();

    if route.requires_auth && !authenticated {
        debug!(path = %resolved, "Not logged in, redirecting to login");
        return Navigation::Redirect(LOGIN_PATH.to_string());
    }

    if route.path == LOGIN_PATH && authenticated {
        return Navigation::Redirect(ROOT_PATH.to_string());
    }

    if route.requires_auth && !session.is_superuser() {
        if let Some(permission) = route.permission {
            if !session.has_permission(permission) {
                debug!(path = %resolved, permission, "Missing permission, redirecting to login");
                return Navigation::Redirect(LOGIN_PATH.to_string());
            }
        }
    }

    if authenticated {
        session.reset_inactivity_timer();
    }

    Navigation::Proceed {
        path: resolved,
        route,
    }
}

/// Run the guard, following redirects, to the page that ends up shown.
pub fn navigate(path: &str, session: &mut SessionStore) -> Navigation {
    let mut target = path.to_string();
    for _ in 0..MAX_REDIRECTS {
        match guard(&target, session) {
            Navigation::Redirect(next) if next != target => target = next,
            outcome => return outcome,
        }
    }
    Navigation::NotFound(path.to_string())
}

/// Whether the session may open a route.
pub fn can_access(route: &Route, session: &SessionStore) -> bool {
    if !route.requires_auth {
        return true;
    }
    if !session.is_authenticated() {
        return false;
    }
    session.is_superuser()
        || route
            .permission
            .map(|permission| session.has_permission(permission))
            .unwrap_or(true)
}

/// Menu entries the session may open, in table order.
pub fn menu(session: &SessionStore) -> Vec<&'static Route> {
    ROUTES
        .iter()
        .filter(|route| !route.hidden && can_access(route, session))
        .collect()
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use super::*;
    use crate::auth::{Identity, MemoryStorage, PermissionSet};

    fn anonymous() -> SessionStore {
        SessionStore::load(Box::new(MemoryStorage::new()), Duration::from_secs(60))
    }

    fn logged_in(superuser: bool, permissions: &[&str]) -> SessionStore {
        let mut session = anonymous();
        session.set_token("jwt");
        let identity: Identity = serde_json::from_value(serde_json::json!({
            "id": 3,
            "username": "reviewer",
            "is_superuser": superuser,
        }))
        .unwrap();
        session.set_identity(Some(identity));
        session.set_permissions(permissions.iter().map(|s| s.to_string()).collect::<PermissionSet>());
        session.clear_inactivity_timer();
        session
    }

    #[test]
    fn test_resolve_follows_group_redirects() {
        let (path, route) = resolve("/").unwrap();
        assert_eq!(path, "/dashboard");
        assert_eq!(route.name, "Dashboard");

        let (path, route) = resolve("/system/log/").unwrap();
        assert_eq!(path, "/system/log/operation");
        assert_eq!(route.name, "LogOperation");
    }

    #[test]
    fn test_resolve_matches_params_and_ignores_query() {
        let (path, route) = resolve("/task-detail/42?mode=view").unwrap();
        assert_eq!(path, "/task-detail/42");
        assert_eq!(route.name, "TaskDetail");

        assert!(resolve("/task-detail/").is_none());
        assert!(resolve("/nowhere").is_none());
    }

    #[test]
    fn test_anonymous_is_sent_to_login() {
        let mut session = anonymous();
        assert_eq!(
            guard("/dashboard", &mut session),
            Navigation::Redirect(LOGIN_PATH.to_string())
        );
        assert!(matches!(
            guard(LOGIN_PATH, &mut session),
            Navigation::Proceed { .. }
        ));
        assert!(!session.timer_pending());
    }

    #[tokio::test]
    async fn test_authenticated_login_page_redirects_home() {
        let mut session = logged_in(false, &["dashboard"]);
        assert_eq!(
            guard(LOGIN_PATH, &mut session),
            Navigation::Redirect(ROOT_PATH.to_string())
        );
        match navigate(LOGIN_PATH, &mut session) {
            Navigation::Proceed { path, .. } => assert_eq!(path, "/dashboard"),
            other => panic!("unexpected navigation: {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_missing_permission_redirects_to_login() {
        let mut session = logged_in(false, &["dashboard"]);
        assert_eq!(
            guard("/system/user", &mut session),
            Navigation::Redirect(LOGIN_PATH.to_string())
        );
        assert!(!session.timer_pending());
    }

    #[tokio::test]
    async fn test_superuser_skips_permission_check() {
        let mut session = logged_in(true, &[]);
        assert!(matches!(
            guard("/system/user", &mut session),
            Navigation::Proceed { .. }
        ));
    }

    #[tokio::test]
    async fn test_proceed_rearms_timer() {
        let mut session = logged_in(false, &["dashboard"]);
        assert!(!session.timer_pending());

        let outcome = guard("/task-detail/7", &mut session);
        assert!(session.timer_pending());

        let descriptor = outcome.descriptor().unwrap();
        assert_eq!(descriptor.path, "/task-detail/7");
        assert_eq!(descriptor.meta_title.as_deref(), Some("Task Detail"));
    }

    #[test]
    fn test_unknown_path_is_not_found() {
        let mut session = anonymous();
        assert_eq!(
            guard("/nowhere", &mut session),
            Navigation::NotFound("/nowhere".to_string())
        );
    }

    #[tokio::test]
    async fn test_menu_lists_permitted_visible_pages() {
        let session = logged_in(false, &["dashboard", "green-identify-query", "workflow-management"]);
        let names: Vec<&str> = menu(&session).iter().map(|r| r.name).collect();
        assert_eq!(
            names,
            vec!["Dashboard", "TaskQuery", "OnlineReport", "WorkflowManagement"]
        );

        let admin = logged_in(true, &[]);
        let visible = ROUTES.iter().filter(|r| !r.hidden).count();
        assert_eq!(menu(&admin).len(), visible);

        assert!(menu(&anonymous()).is_empty());
    }

    #[test]
    fn test_find_by_name() {
        assert_eq!(find_by_name("SystemOrg").unwrap().path, "/system/org");
        assert!(find_by_name("Nope").is_none());
    }
}
