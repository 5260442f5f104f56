//! Application state management for the greenid shell.
//!
//! This module contains the `App` struct that owns the session store, the
//! tab registry, the activity registration and the API client, plus the UI
//! state of the login form, menu, list pages and status bar.

use std::collections::HashMap;

use anyhow::Result;
use tokio::sync::mpsc;
use tracing::{debug, info, warn};

use greenid_core::api::{ApiClient, ApiError};
use greenid_core::auth::SessionStorage;
use greenid_core::models::Announcement;
use greenid_core::routes::{self, Navigation, Route, LOGIN_PATH, ROOT_PATH};
use greenid_core::{
    Activity, ActivityRegistration, Config, ListTable, ListView, SessionStore, TabRegistry,
};

// ============================================================================
// Constants
// ============================================================================

/// Buffer size for the background task message channel.
const CHANNEL_BUFFER_SIZE: usize = 8;

/// Maximum length for username input.
const MAX_USERNAME_LENGTH: usize = 50;

/// Maximum length for password input.
/// 128 chars accommodates password managers and passphrases.
const MAX_PASSWORD_LENGTH: usize = 128;

/// Env var prefilling the login form username
const USERNAME_ENV: &str = "GREENID_USERNAME";

/// Env var prefilling the login form password
const PASSWORD_ENV: &str = "GREENID_PASSWORD";

/// Overall application state
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AppState {
    Normal,
    ShowingHelp,
    LoggingIn,
    ConfirmingQuit,
    Quitting,
}

/// Login form focus state
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum LoginFocus {
    Username,
    Password,
    Button,
}

/// Which pane receives arrow keys
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Focus {
    Menu,
    Content,
}

/// Contents of a list page
#[derive(Debug, Clone, PartialEq)]
pub enum ListPage {
    Loading,
    Loaded(ListTable),
    Failed(String),
}

/// Results sent back from background requests.
enum BackgroundResult {
    Announcements(Result<Vec<Announcement>, ApiError>),
    List(ListView, Result<ListTable, ApiError>),
}

pub struct App {
    // Core services
    pub config: Config,
    pub session: SessionStore,
    pub api: ApiClient,
    pub tabs: TabRegistry,
    activity: ActivityRegistration,

    // UI State
    pub state: AppState,
    pub focus: Focus,
    pub menu_selection: usize,
    /// Scroll offset of the dashboard, selected row of a list page
    pub content_scroll: usize,

    // List pages, fetched on first open
    pub lists: HashMap<ListView, ListPage>,

    // Login form state
    pub login_username: String,
    pub login_password: String,
    pub login_focus: LoginFocus,
    pub login_error: Option<String>,

    // Dashboard data
    pub announcements: Vec<Announcement>,
    pub ticker_offset: usize,

    // Background task channel
    background_rx: mpsc::Receiver<BackgroundResult>,
    background_tx: mpsc::Sender<BackgroundResult>,

    // Status message
    pub status_message: Option<String>,
}

impl App {
    /// Build the application around an already opened session storage.
    pub fn new(config: Config, storage: Box<dyn SessionStorage>) -> Result<Self> {
        let session = SessionStore::load(storage, config.inactivity_timeout());
        debug!(authenticated = session.is_authenticated(), "Session restored");

        let mut api = ApiClient::new(config.api_base_url.clone())?;
        api.set_token(session.token());

        let (background_tx, background_rx) = mpsc::channel(CHANNEL_BUFFER_SIZE);

        let login_username = std::env::var(USERNAME_ENV)
            .ok()
            .or_else(|| config.last_username.clone())
            .unwrap_or_default();
        let login_password = std::env::var(PASSWORD_ENV).unwrap_or_default();

        Ok(Self {
            config,
            session,
            api,
            tabs: TabRegistry::new(),
            activity: ActivityRegistration::register_all(),

            state: AppState::Normal,
            focus: Focus::Menu,
            menu_selection: 0,
            content_scroll: 0,

            lists: HashMap::new(),

            login_username,
            login_password,
            login_focus: LoginFocus::Username,
            login_error: None,

            announcements: Vec::new(),
            ticker_offset: 0,

            background_rx,
            background_tx,

            status_message: None,
        })
    }

    /// First navigation after startup.
    pub fn start(&mut self) {
        self.open(ROOT_PATH);
        if self.session.is_authenticated() {
            self.refresh_announcements_background();
        }
    }

    // =========================================================================
    // Authentication
    // =========================================================================

    pub fn is_authenticated(&self) -> bool {
        self.session.is_authenticated()
    }

    /// Show the login form
    pub fn start_login(&mut self) {
        self.state = AppState::LoggingIn;
        self.login_focus = if self.login_username.is_empty() {
            LoginFocus::Username
        } else {
            LoginFocus::Password
        };
    }

    /// Attempt login with the credentials from the login form
    pub async fn attempt_login(&mut self) -> Result<()> {
        let username = self.login_username.trim().to_string();
        let password = self.login_password.clone();

        if username.is_empty() || password.is_empty() {
            self.login_error = Some("Username and password required".to_string());
            return Err(anyhow::anyhow!("Username and password required"));
        }

        self.login_error = None;

        match self.api.login(&username, &password, None).await {
            Ok(response) => {
                let permissions = response.user.permission_set();
                self.session.set_token(response.access_token);
                self.session.set_identity(Some(response.user));
                self.session.set_permissions(permissions);
                self.api.set_token(self.session.token());

                self.config.last_username = Some(username);
                if let Err(e) = self.config.save() {
                    warn!(error = %e, "Failed to save config");
                }

                self.login_password.clear();
                self.state = AppState::Normal;
                self.tabs = TabRegistry::new();
                self.menu_selection = 0;
                self.open(ROOT_PATH);
                self.refresh_announcements_background();
                info!("Login successful");
                Ok(())
            }
            Err(e) => {
                let notice = e.apply(&mut self.session, true);
                self.login_error = Some(Self::login_error_message(&e, notice.message));
                Err(e.into())
            }
        }
    }

    fn login_error_message(err: &ApiError, notice: Option<String>) -> String {
        match err {
            ApiError::Unauthorized { detail } => detail
                .clone()
                .unwrap_or_else(|| "Invalid username or password".to_string()),
            ApiError::Status {
                detail: Some(detail),
                ..
            } => detail.clone(),
            _ => notice.unwrap_or_else(|| format!("Login failed: {}", err)),
        }
    }

    /// Log out: tell the backend (best effort), then drop local state.
    pub async fn logout(&mut self) {
        if self.session.is_authenticated() {
            if let Err(e) = self.api.logout().await {
                warn!(error = %e, "Logout request failed");
            }
        }
        self.session.logout();
        self.end_session(None);
    }

    /// Local cleanup once the session store has been logged out.
    fn end_session(&mut self, reason: Option<String>) {
        self.api.clear_token();
        self.tabs = TabRegistry::new();
        self.menu_selection = 0;
        self.announcements.clear();
        self.lists.clear();
        self.login_error = reason;
        self.start_login();
    }

    /// Route a failed request through the failure policy.
    pub fn handle_failure(&mut self, err: &ApiError) {
        let notice = err.apply(&mut self.session, false);
        if notice.redirect_to_login {
            self.end_session(notice.message);
        } else {
            self.status_message = notice.message;
        }
    }

    // =========================================================================
    // Activity and expiry
    // =========================================================================

    pub fn record_activity(&mut self, activity: Activity) {
        self.activity.notify(activity, &mut self.session);
    }

    /// Periodic work from the event loop: inactivity expiry and background
    /// results.
    pub fn tick(&mut self) {
        if self.session.check_inactivity() {
            self.end_session(Some("Logged out after inactivity".to_string()));
        }

        while let Ok(result) = self.background_rx.try_recv() {
            self.process_background_result(result);
        }
    }

    /// Stop timers and listeners before exit.
    pub fn shutdown(&mut self) {
        self.activity.dispose();
        self.session.dispose();
    }

    // =========================================================================
    // Navigation
    // =========================================================================

    /// Menu entries for the current session.
    pub fn menu(&self) -> Vec<&'static Route> {
        routes::menu(&self.session)
    }

    /// Navigate to `path` through the guard and open its tab.
    pub fn open(&mut self, path: &str) {
        match routes::navigate(path, &mut self.session) {
            Navigation::Proceed { route, .. } if route.path == LOGIN_PATH => self.start_login(),
            navigation @ Navigation::Proceed { .. } => {
                if let Some(descriptor) = navigation.descriptor() {
                    self.tabs.add_tab(&descriptor);
                    self.content_scroll = 0;
                }
                if let Navigation::Proceed { route, .. } = navigation {
                    self.ensure_list_loaded(route);
                }
            }
            Navigation::Redirect(target) => {
                debug!(path, target = %target, "Unresolved redirect");
            }
            Navigation::NotFound(missing) => {
                self.status_message = Some(format!("No page at {}", missing));
            }
        }
    }

    pub fn open_selected_menu_item(&mut self) {
        let selected = self.menu().get(self.menu_selection).map(|route| route.path);
        if let Some(path) = selected {
            self.open(path);
        }
    }

    pub fn move_menu_selection(&mut self, delta: isize) {
        let len = self.menu().len();
        if len == 0 {
            return;
        }
        let next = (self.menu_selection as isize + delta).clamp(0, len as isize - 1);
        self.menu_selection = next as usize;
    }

    /// Switch tabs and re-run the guard for the newly active page.
    pub fn cycle_tab(&mut self, offset: isize) {
        self.tabs.cycle(offset);
        self.revisit_active();
    }

    pub fn close_active_tab(&mut self) {
        let active = self.tabs.active_tab().to_string();
        self.tabs.remove_tab(&active);
        self.revisit_active();
    }

    pub fn close_other_tabs(&mut self) {
        let active = self.tabs.active_tab().to_string();
        self.tabs.close_other_tabs(&active);
    }

    pub fn close_all_tabs(&mut self) {
        self.tabs.close_all_tabs();
        self.revisit_active();
    }

    pub fn close_left_tabs(&mut self) {
        let active = self.tabs.active_tab().to_string();
        self.tabs.close_left_tabs(&active);
    }

    pub fn close_right_tabs(&mut self) {
        let active = self.tabs.active_tab().to_string();
        self.tabs.close_right_tabs(&active);
    }

    /// Selecting a tab is a navigation too.
    fn revisit_active(&mut self) {
        let path = self
            .tabs
            .active()
            .map(|tab| tab.path.clone())
            .unwrap_or_else(|| self.tabs.active_tab().to_string());
        self.open(&path);
    }

    // =========================================================================
    // List pages
    // =========================================================================

    /// List shown by the active tab, if it is a list page.
    pub fn active_view(&self) -> Option<ListView> {
        let tab = self.tabs.active()?;
        let (_, route) = routes::resolve(&tab.original_path)?;
        ListView::for_route(route)
    }

    fn ensure_list_loaded(&mut self, route: &Route) {
        let Some(view) = ListView::for_route(route) else {
            return;
        };
        match self.lists.get(&view) {
            Some(ListPage::Loading) | Some(ListPage::Loaded(_)) => {}
            Some(ListPage::Failed(_)) | None => self.load_list_background(view),
        }
    }

    pub fn load_list_background(&mut self, view: ListView) {
        let api = self.api.clone();
        let tx = self.background_tx.clone();
        tokio::spawn(async move {
            let result = api.fetch_list(view).await;
            // Receiver dropped means the app is shutting down
            let _ = tx.send(BackgroundResult::List(view, result)).await;
        });
        self.lists.insert(view, ListPage::Loading);
    }

    /// Reload whatever the active tab shows.
    pub fn refresh_active(&mut self) {
        match self.active_view() {
            Some(view) => {
                self.content_scroll = 0;
                self.load_list_background(view);
            }
            None => self.refresh_announcements_background(),
        }
    }

    /// Rows in the active list page, if loaded.
    pub fn active_row_count(&self) -> Option<usize> {
        match self.lists.get(&self.active_view()?) {
            Some(ListPage::Loaded(table)) => Some(table.len()),
            _ => None,
        }
    }

    /// Move the content cursor: a row on list pages, a line elsewhere.
    pub fn scroll_content(&mut self, delta: isize) {
        let next = self.content_scroll.saturating_add_signed(delta);
        self.content_scroll = match self.active_row_count() {
            Some(0) => 0,
            Some(rows) => next.min(rows - 1),
            None => next,
        };
    }

    // =========================================================================
    // Dashboard data
    // =========================================================================

    pub fn refresh_announcements_background(&mut self) {
        let api = self.api.clone();
        let tx = self.background_tx.clone();
        tokio::spawn(async move {
            let result = api.fetch_active_announcements().await;
            // Receiver dropped means the app is shutting down
            let _ = tx.send(BackgroundResult::Announcements(result)).await;
        });
        self.status_message = Some("Loading announcements...".to_string());
    }

    fn process_background_result(&mut self, result: BackgroundResult) {
        match result {
            BackgroundResult::Announcements(Ok(announcements)) => {
                debug!(count = announcements.len(), "Announcements loaded");
                self.announcements = announcements;
                self.ticker_offset = 0;
                self.status_message = None;
            }
            BackgroundResult::Announcements(Err(e)) => {
                // A response that arrives after logout is irrelevant
                if self.session.is_authenticated() {
                    self.handle_failure(&e);
                }
            }
            BackgroundResult::List(view, Ok(table)) => {
                if self.session.is_authenticated() {
                    debug!(?view, rows = table.len(), "List loaded");
                    self.lists.insert(view, ListPage::Loaded(table));
                }
            }
            BackgroundResult::List(view, Err(e)) => {
                if self.session.is_authenticated() {
                    warn!(?view, error = %e, "List request failed");
                    self.lists.insert(view, ListPage::Failed(e.to_string()));
                    self.handle_failure(&e);
                }
            }
        }
    }

    /// Advance the announcement ticker by one item.
    pub fn advance_ticker(&mut self) {
        if !self.announcements.is_empty() {
            self.ticker_offset = (self.ticker_offset + 1) % self.announcements.len();
        }
    }

    pub fn current_headline(&self) -> Option<String> {
        self.announcements
            .get(self.ticker_offset)
            .map(|announcement| announcement.headline())
    }
}

// =========================================================================
// Login input validation
// =========================================================================

fn is_valid_input_char(c: char) -> bool {
    !c.is_control()
}

pub fn can_add_username_char(current_len: usize, c: char) -> bool {
    current_len < MAX_USERNAME_LENGTH && is_valid_input_char(c)
}

pub fn can_add_password_char(current_len: usize, c: char) -> bool {
    current_len < MAX_PASSWORD_LENGTH && is_valid_input_char(c)
}

#[cfg(test)]
mod tests {
    use greenid_core::auth::{MemoryStorage, PermissionSet};
    use greenid_core::tabs::HOME_PATH;
    use greenid_core::Identity;

    use super::*;

    fn app() -> App {
        let config = Config {
            api_base_url: "http://127.0.0.1:9/api".to_string(),
            ..Default::default()
        };
        App::new(config, Box::new(MemoryStorage::new())).unwrap()
    }

    fn logged_in(permissions: &[&str]) -> App {
        let mut app = app();
        app.session.set_token("jwt");
        let identity: Identity =
            serde_json::from_value(serde_json::json!({"id": 1, "username": "clerk"})).unwrap();
        app.session.set_identity(Some(identity));
        app.session.set_permissions(
            permissions.iter().map(|s| s.to_string()).collect::<PermissionSet>(),
        );
        app.api.set_token(app.session.token());
        app
    }

    fn tab_paths(app: &App) -> Vec<String> {
        app.tabs.tabs().iter().map(|t| t.path.clone()).collect()
    }

    #[test]
    fn test_anonymous_start_shows_login() {
        let mut app = app();
        app.open(ROOT_PATH);
        assert_eq!(app.state, AppState::LoggingIn);
        assert!(app.menu().is_empty());
    }

    #[tokio::test]
    async fn test_menu_navigation_opens_tabs() {
        let mut app = logged_in(&["dashboard", "system-user", "system-role"]);
        app.open(ROOT_PATH);
        assert_eq!(app.tabs.active_tab(), HOME_PATH);

        app.move_menu_selection(2);
        app.open_selected_menu_item();
        assert_eq!(tab_paths(&app), vec![HOME_PATH, "/system/role"]);
        assert_eq!(app.tabs.active_tab(), "/system/role");

        app.move_menu_selection(10);
        assert_eq!(app.menu_selection, 2);
    }

    #[tokio::test]
    async fn test_tab_shortcuts_use_active_tab() {
        let mut app = logged_in(&["dashboard", "system-user", "system-role", "system-org"]);
        for path in ["/system/user", "/system/role", "/system/org"] {
            app.open(path);
        }
        app.tabs.set_active_tab("/system/role");

        app.close_right_tabs();
        assert_eq!(tab_paths(&app), vec![HOME_PATH, "/system/user", "/system/role"]);

        app.close_active_tab();
        assert_eq!(app.tabs.active_tab(), "/system/user");

        app.close_all_tabs();
        assert_eq!(tab_paths(&app), vec![HOME_PATH]);
        assert_eq!(app.tabs.active_tab(), HOME_PATH);
    }

    #[tokio::test]
    async fn test_forbidden_failure_returns_to_login() {
        let mut app = logged_in(&["dashboard"]);
        app.open("/system/user");
        app.open(ROOT_PATH);
        app.state = AppState::Normal;

        app.handle_failure(&ApiError::Forbidden { detail: None });
        assert_eq!(app.state, AppState::LoggingIn);
        assert!(!app.is_authenticated());
        assert_eq!(tab_paths(&app), vec![HOME_PATH]);
        assert!(app.login_error.is_some());
    }

    #[tokio::test]
    async fn test_not_found_failure_only_notifies() {
        let mut app = logged_in(&["dashboard"]);
        app.handle_failure(&ApiError::NotFound);
        assert!(app.is_authenticated());
        assert_eq!(
            app.status_message.as_deref(),
            Some("The requested resource does not exist")
        );
    }

    #[tokio::test]
    async fn test_empty_credentials_rejected_locally() {
        let mut app = app();
        app.login_username.clear();
        app.login_password.clear();
        assert!(app.attempt_login().await.is_err());
        assert_eq!(app.login_error.as_deref(), Some("Username and password required"));
    }

    #[tokio::test]
    async fn test_logout_resets_shell() {
        let mut app = logged_in(&["dashboard"]);
        app.open(ROOT_PATH);
        app.logout().await;

        assert!(!app.is_authenticated());
        assert_eq!(app.state, AppState::LoggingIn);
        assert!(!app.session.timer_pending());
    }

    #[tokio::test(start_paused = true)]
    async fn test_tick_returns_to_login_after_inactivity() {
        let mut app = logged_in(&["dashboard"]);
        app.open(ROOT_PATH);
        app.state = AppState::Normal;

        tokio::time::sleep(app.config.inactivity_timeout() + std::time::Duration::from_secs(1)).await;
        app.tick();

        assert_eq!(app.state, AppState::LoggingIn);
        assert_eq!(app.login_error.as_deref(), Some("Logged out after inactivity"));
    }

    #[tokio::test]
    async fn test_activity_rearms_timer_only_when_logged_in() {
        let mut app = logged_in(&["dashboard"]);
        app.session.clear_inactivity_timer();
        app.record_activity(Activity::KeyPress);
        assert!(app.session.timer_pending());

        app.shutdown();
        app.record_activity(Activity::KeyPress);
        assert!(!app.session.timer_pending());
    }

    #[tokio::test]
    async fn test_opening_list_page_starts_fetch() {
        let mut app = logged_in(&["dashboard", "system-role"]);
        app.open("/system/role");
        assert_eq!(app.active_view(), Some(ListView::Roles));
        assert_eq!(app.lists.get(&ListView::Roles), Some(&ListPage::Loading));

        app.open(ROOT_PATH);
        assert_eq!(app.active_view(), None);
        assert!(app.lists.get(&ListView::Users).is_none());
    }

    #[tokio::test]
    async fn test_loaded_list_bounds_row_cursor() {
        let mut app = logged_in(&["dashboard", "system-org"]);
        app.open("/system/org");
        let orgs: Vec<greenid_core::models::Organization> = serde_json::from_value(
            serde_json::json!([{"id": 1, "name": "HQ", "code": "001"}, {"id": 2, "name": "East", "code": "002"}]),
        )
        .unwrap();
        let table = ListTable::from_rows(ListView::Organizations, &orgs, 2);
        app.process_background_result(BackgroundResult::List(ListView::Organizations, Ok(table)));

        assert_eq!(app.active_row_count(), Some(2));
        app.scroll_content(5);
        assert_eq!(app.content_scroll, 1);
        app.scroll_content(-3);
        assert_eq!(app.content_scroll, 0);
    }

    #[tokio::test]
    async fn test_list_failure_goes_through_failure_policy() {
        let mut app = logged_in(&["dashboard", "system-log-login", "system-user"]);
        app.open("/system/log/login");
        app.process_background_result(BackgroundResult::List(
            ListView::LoginLogs,
            Err(ApiError::ServerError("boom".to_string())),
        ));
        assert!(matches!(app.lists.get(&ListView::LoginLogs), Some(ListPage::Failed(_))));
        assert!(app.is_authenticated());
        assert!(app.status_message.is_some());

        app.state = AppState::Normal;
        app.process_background_result(BackgroundResult::List(
            ListView::Users,
            Err(ApiError::Forbidden { detail: None }),
        ));
        assert_eq!(app.state, AppState::LoggingIn);
        assert!(!app.is_authenticated());
        assert!(app.lists.is_empty());
    }

    #[tokio::test]
    async fn test_list_result_after_logout_is_dropped() {
        let mut app = logged_in(&["dashboard", "system-role"]);
        app.open("/system/role");
        app.logout().await;

        let table = ListTable::from_rows::<greenid_core::models::Role>(ListView::Roles, &[], 0);
        app.process_background_result(BackgroundResult::List(ListView::Roles, Ok(table)));
        assert!(app.lists.is_empty());
    }

    #[test]
    fn test_can_add_username_char() {
        assert!(can_add_username_char(0, 'a'));
        assert!(!can_add_username_char(MAX_USERNAME_LENGTH, 'a'));
        assert!(!can_add_username_char(0, '\n'));
    }

    #[test]
    fn test_can_add_password_char() {
        assert!(can_add_password_char(MAX_PASSWORD_LENGTH - 1, '#'));
        assert!(!can_add_password_char(MAX_PASSWORD_LENGTH, '#'));
    }
}
