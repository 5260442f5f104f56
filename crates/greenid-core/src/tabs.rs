//! Open page tabs of the admin shell.
//!
//! The registry keeps tabs in the order they were opened and one active
//! selection. Tabs are keyed by their path including the serialized query,
//! so the same page opened with different parameters gets its own tab.

use reqwest::Url;
use serde::{Deserialize, Serialize};
use tracing::debug;

/// Path of the home tab, which "close all" keeps.
pub const HOME_PATH: &str = "/dashboard";

/// Route name of the home tab
const HOME_NAME: &str = "Dashboard";

/// Title of the home tab
const HOME_TITLE: &str = "Dashboard";

/// Title used when neither the caller nor the route supplies one
pub const UNKNOWN_TITLE: &str = "Unknown";

/// Throwaway base used only to reuse `Url`'s form encoder for query keys
const QUERY_ENCODE_BASE: &str = "http://tabs.invalid/";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "ts", derive(ts_rs::TS), ts(export))]
#[serde(rename_all = "camelCase")]
pub struct Tab {
    pub name: String,
    pub title: String,
    /// Unique key: route path plus serialized query, if any
    pub path: String,
    /// Route path without the query
    pub original_path: String,
}

impl Tab {
    fn home() -> Self {
        Self {
            name: HOME_NAME.to_string(),
            title: HOME_TITLE.to_string(),
            path: HOME_PATH.to_string(),
            original_path: HOME_PATH.to_string(),
        }
    }
}

/// What a navigation hands to `add_tab`.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RouteDescriptor {
    pub path: String,
    pub name: Option<String>,
    /// Explicit title override
    pub title: Option<String>,
    /// Title from the route table
    pub meta_title: Option<String>,
    /// Query parameters in the order they were given
    pub query: Vec<(String, String)>,
}

impl RouteDescriptor {
    pub fn new(path: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            ..Default::default()
        }
    }

    pub fn name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    pub fn title(mut self, title: impl Into<String>) -> Self {
        self.title = Some(title.into());
        self
    }

    pub fn meta_title(mut self, title: impl Into<String>) -> Self {
        self.meta_title = Some(title.into());
        self
    }

    pub fn query(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.query.push((key.into(), value.into()));
        self
    }

    /// Tab key: the path, with `?` and the form-encoded query appended when
    /// there is one. Keys keep their insertion order.
    pub fn tab_key(&self) -> String {
        if self.query.is_empty() {
            return self.path.clone();
        }
        match encode_query(&self.query) {
            Some(query) => format!("{}?{}", self.path, query),
            None => self.path.clone(),
        }
    }

    fn resolved_title(&self) -> String {
        self.title
            .as_deref()
            .or(self.meta_title.as_deref())
            .unwrap_or(UNKNOWN_TITLE)
            .to_string()
    }
}

fn encode_query(query: &[(String, String)]) -> Option<String> {
    let url = Url::parse_with_params(QUERY_ENCODE_BASE, query).ok()?;
    url.query().map(str::to_string)
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TabRegistry {
    tabs: Vec<Tab>,
    active_tab: String,
}

impl Default for TabRegistry {
    fn default() -> Self {
        Self::new()
    }
}

impl TabRegistry {
    /// Registry holding only the home tab, which is active.
    pub fn new() -> Self {
        Self {
            tabs: vec![Tab::home()],
            active_tab: HOME_PATH.to_string(),
        }
    }

    pub fn tabs(&self) -> &[Tab] {
        &self.tabs
    }

    pub fn active_tab(&self) -> &str {
        &self.active_tab
    }

    /// The active tab entry, if the active key is in the registry.
    pub fn active(&self) -> Option<&Tab> {
        self.tabs.iter().find(|tab| tab.path == self.active_tab)
    }

    pub fn position(&self, path: &str) -> Option<usize> {
        self.tabs.iter().position(|tab| tab.path == path)
    }

    pub fn len(&self) -> usize {
        self.tabs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tabs.is_empty()
    }

    /// Open (or re-select) the tab for a navigation. Returns the tab key.
    pub fn add_tab(&mut self, route: &RouteDescriptor) -> String {
        let key = route.tab_key();
        let exists = self
            .tabs
            .iter()
            .any(|tab| tab.path == key || tab.path == route.path);

        if !exists {
            debug!(path = %key, "Opening tab");
            self.tabs.push(Tab {
                name: route.name.clone().unwrap_or_else(|| route.path.clone()),
                title: route.resolved_title(),
                path: key.clone(),
                original_path: route.path.clone(),
            });
        }

        self.active_tab = key.clone();
        key
    }

    /// Close one tab. Closing the active tab selects its left neighbour, or
    /// the new first tab; closing the last tab falls back to the home path.
    pub fn remove_tab(&mut self, path: &str) {
        let Some(index) = self.position(path) else {
            return;
        };
        self.tabs.remove(index);

        if self.active_tab == path {
            self.active_tab = match self.tabs.get(index.saturating_sub(1)) {
                Some(tab) => tab.path.clone(),
                None => HOME_PATH.to_string(),
            };
        }
    }

    pub fn close_other_tabs(&mut self, path: &str) {
        if let Some(index) = self.position(path) {
            let tab = self.tabs.swap_remove(index);
            self.tabs = vec![tab];
            self.active_tab = path.to_string();
        }
    }

    /// Keep only the home tab (if open) and select the home path.
    pub fn close_all_tabs(&mut self) {
        self.tabs.retain(|tab| tab.path == HOME_PATH);
        self.tabs.truncate(1);
        self.active_tab = HOME_PATH.to_string();
    }

    pub fn close_left_tabs(&mut self, path: &str) {
        if let Some(index) = self.position(path) {
            if index > 0 {
                self.tabs.drain(..index);
            }
        }
    }

    pub fn close_right_tabs(&mut self, path: &str) {
        if let Some(index) = self.position(path) {
            self.tabs.truncate(index + 1);
        }
    }

    /// Select a tab. No existence check.
    pub fn set_active_tab(&mut self, path: impl Into<String>) {
        self.active_tab = path.into();
    }

    /// Select the tab `offset` positions away from the active one, wrapping.
    pub fn cycle(&mut self, offset: isize) {
        if self.tabs.is_empty() {
            return;
        }
        let len = self.tabs.len() as isize;
        let current = self.position(&self.active_tab).unwrap_or(0) as isize;
        let next = (current + offset).rem_euclid(len) as usize;
        self.active_tab = self.tabs[next].path.clone();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    /// [Home, A, B, C] with B active
    fn four_tabs() -> TabRegistry {
        let mut registry = TabRegistry::new();
        for path in ["/a", "/b", "/c"] {
            registry.add_tab(&RouteDescriptor::new(path).meta_title(path));
        }
        registry.set_active_tab("/b");
        registry
    }

    fn paths(registry: &TabRegistry) -> Vec<&str> {
        registry.tabs().iter().map(|t| t.path.as_str()).collect()
    }

    #[test]
    fn test_new_registry_has_home() {
        let registry = TabRegistry::new();
        assert_eq!(paths(&registry), vec![HOME_PATH]);
        assert_eq!(registry.active_tab(), HOME_PATH);
        assert_eq!(registry.active().unwrap().name, "Dashboard");
    }

    #[test]
    fn test_add_tab_title_resolution() {
        let mut registry = TabRegistry::new();
        registry.add_tab(&RouteDescriptor::new("/x").title("Explicit").meta_title("Meta"));
        registry.add_tab(&RouteDescriptor::new("/y").meta_title("Meta"));
        registry.add_tab(&RouteDescriptor::new("/z"));

        let titles: Vec<&str> = registry.tabs().iter().map(|t| t.title.as_str()).collect();
        assert_eq!(titles, vec!["Dashboard", "Explicit", "Meta", UNKNOWN_TITLE]);
        assert_eq!(registry.tabs()[3].name, "/z");
    }

    #[test]
    fn test_add_tab_twice_only_reselects() {
        let mut registry = TabRegistry::new();
        let route = RouteDescriptor::new("/system/user").name("SystemUser");
        registry.add_tab(&route);
        registry.set_active_tab(HOME_PATH);
        registry.add_tab(&route);

        assert_eq!(registry.len(), 2);
        assert_eq!(registry.active_tab(), "/system/user");
    }

    #[test]
    fn test_query_key_keeps_insertion_order_and_form_encoding() {
        let route = RouteDescriptor::new("/task-detail/5")
            .query("mode", "view")
            .query("from", "pending list")
            .query("a", "1&2");
        assert_eq!(
            route.tab_key(),
            "/task-detail/5?mode=view&from=pending+list&a=1%262"
        );
    }

    #[test]
    fn test_query_tab_is_deduplicated_by_bare_path() {
        let mut registry = TabRegistry::new();
        registry.add_tab(&RouteDescriptor::new("/workflow/designer"));
        let key = registry.add_tab(&RouteDescriptor::new("/workflow/designer").query("id", "3"));

        // The bare path tab already exists, so no new tab; selection still
        // moves to the composite key.
        assert_eq!(registry.len(), 2);
        assert_eq!(key, "/workflow/designer?id=3");
        assert_eq!(registry.active_tab(), key);
    }

    #[test]
    fn test_query_tab_records_original_path() {
        let mut registry = TabRegistry::new();
        registry.add_tab(&RouteDescriptor::new("/task-detail/9").query("mode", "edit"));
        let tab = &registry.tabs()[1];
        assert_eq!(tab.path, "/task-detail/9?mode=edit");
        assert_eq!(tab.original_path, "/task-detail/9");
    }

    #[test]
    fn test_remove_active_selects_left_neighbour() {
        let mut registry = four_tabs();
        registry.remove_tab("/b");
        assert_eq!(paths(&registry), vec![HOME_PATH, "/a", "/c"]);
        assert_eq!(registry.active_tab(), "/a");
    }

    #[test]
    fn test_remove_leftmost_active_selects_new_first() {
        let mut registry = four_tabs();
        registry.set_active_tab(HOME_PATH);
        registry.remove_tab(HOME_PATH);
        assert_eq!(registry.active_tab(), "/a");
    }

    #[test]
    fn test_remove_inactive_keeps_selection() {
        let mut registry = four_tabs();
        registry.remove_tab("/c");
        registry.remove_tab("/missing");
        assert_eq!(paths(&registry), vec![HOME_PATH, "/a", "/b"]);
        assert_eq!(registry.active_tab(), "/b");
    }

    #[test]
    fn test_remove_last_tab_falls_back_to_home_path() {
        let mut registry = TabRegistry::new();
        registry.remove_tab(HOME_PATH);
        assert!(registry.is_empty());
        assert_eq!(registry.active_tab(), HOME_PATH);
    }

    #[test]
    fn test_close_other_tabs() {
        let mut registry = four_tabs();
        registry.close_other_tabs("/c");
        assert_eq!(paths(&registry), vec!["/c"]);
        assert_eq!(registry.active_tab(), "/c");

        registry.close_other_tabs("/missing");
        assert_eq!(paths(&registry), vec!["/c"]);
    }

    #[test]
    fn test_close_all_keeps_home() {
        let mut registry = four_tabs();
        registry.close_all_tabs();
        assert_eq!(paths(&registry), vec![HOME_PATH]);
        assert_eq!(registry.active_tab(), HOME_PATH);
    }

    #[test]
    fn test_close_all_without_home_empties() {
        let mut registry = four_tabs();
        registry.close_other_tabs("/a");
        registry.close_all_tabs();
        assert!(registry.is_empty());
        assert_eq!(registry.active_tab(), HOME_PATH);
    }

    #[test]
    fn test_close_left_and_right() {
        let mut left = four_tabs();
        left.close_left_tabs("/b");
        assert_eq!(paths(&left), vec!["/b", "/c"]);

        let mut right = four_tabs();
        right.close_right_tabs("/b");
        assert_eq!(paths(&right), vec![HOME_PATH, "/a", "/b"]);
    }

    #[test]
    fn test_close_left_of_first_and_missing_are_noops() {
        let mut registry = four_tabs();
        registry.close_left_tabs(HOME_PATH);
        registry.close_left_tabs("/missing");
        registry.close_right_tabs("/missing");
        assert_eq!(registry.len(), 4);
    }

    #[test]
    fn test_cycle_wraps() {
        let mut registry = four_tabs();
        registry.cycle(1);
        assert_eq!(registry.active_tab(), "/c");
        registry.cycle(1);
        assert_eq!(registry.active_tab(), HOME_PATH);
        registry.cycle(-1);
        assert_eq!(registry.active_tab(), "/c");
    }
}
