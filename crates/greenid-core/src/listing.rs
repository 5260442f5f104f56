//! Read-only list pages.
//!
//! Every menu page other than the dashboard shows one backend list as a
//! table. `ListView` ties a route to its endpoint and row type; the API
//! client turns the response into a `ListTable` of display strings.

use crate::routes::Route;

/// Rows requested per list. The largest page size every list endpoint
/// accepts.
pub const LIST_PAGE_SIZE: u32 = 100;

/// A record that can be shown as a table row.
pub trait TableRow {
    /// Column headers, in the order `cells` returns them
    const COLUMNS: &'static [&'static str];

    fn cells(&self) -> Vec<String>;
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ListView {
    PendingTasks,
    CompletedTasks,
    ArchivedTasks,
    TaskQuery,
    OnlineReport,
    Users,
    Roles,
    Organizations,
    OperationLogs,
    LoginLogs,
    ExceptionLogs,
    ProcessDefinitions,
    ProcessInstances,
    WorkflowVariables,
}

impl ListView {
    pub const ALL: [ListView; 14] = [
        ListView::PendingTasks,
        ListView::CompletedTasks,
        ListView::ArchivedTasks,
        ListView::TaskQuery,
        ListView::OnlineReport,
        ListView::Users,
        ListView::Roles,
        ListView::Organizations,
        ListView::OperationLogs,
        ListView::LoginLogs,
        ListView::ExceptionLogs,
        ListView::ProcessDefinitions,
        ListView::ProcessInstances,
        ListView::WorkflowVariables,
    ];

    /// Name of the route showing this list.
    pub fn route_name(self) -> &'static str {
        match self {
            ListView::PendingTasks => "TaskPending",
            ListView::CompletedTasks => "TaskCompleted",
            ListView::ArchivedTasks => "TaskArchived",
            ListView::TaskQuery => "TaskQuery",
            ListView::OnlineReport => "OnlineReport",
            ListView::Users => "SystemUser",
            ListView::Roles => "SystemRole",
            ListView::Organizations => "SystemOrg",
            ListView::OperationLogs => "LogOperation",
            ListView::LoginLogs => "LogLogin",
            ListView::ExceptionLogs => "LogException",
            ListView::ProcessDefinitions => "WorkflowManagement",
            ListView::ProcessInstances => "WorkflowInstances",
            ListView::WorkflowVariables => "WorkflowVariables",
        }
    }

    /// Backend path relative to the API base URL.
    pub fn endpoint(self) -> &'static str {
        match self {
            ListView::PendingTasks => "/tasks/pending",
            ListView::CompletedTasks => "/tasks/completed",
            ListView::ArchivedTasks => "/tasks/archived",
            ListView::TaskQuery => "/tasks/search",
            ListView::OnlineReport => "/tasks/online-report",
            ListView::Users => "/system/users",
            ListView::Roles => "/system/roles",
            ListView::Organizations => "/system/organizations",
            ListView::OperationLogs => "/logs/operations",
            ListView::LoginLogs => "/logs/logins",
            ListView::ExceptionLogs => "/logs/exceptions",
            ListView::ProcessDefinitions => "/workflow/definitions",
            ListView::ProcessInstances => "/workflow/instances",
            ListView::WorkflowVariables => "/workflow-variables",
        }
    }

    pub fn for_route(route: &Route) -> Option<Self> {
        Self::ALL
            .into_iter()
            .find(|view| view.route_name() == route.name)
    }
}

/// A fetched list, ready to render.
#[derive(Debug, Clone, PartialEq)]
pub struct ListTable {
    pub view: ListView,
    pub columns: &'static [&'static str],
    pub rows: Vec<Vec<String>>,
    /// Records on the server, which may exceed the rows fetched
    pub total: u64,
}

impl ListTable {
    pub fn from_rows<T: TableRow>(view: ListView, rows: &[T], total: u64) -> Self {
        Self {
            view,
            columns: T::COLUMNS,
            rows: rows.iter().map(TableRow::cells).collect(),
            total,
        }
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Whether the server holds more rows than were fetched.
    pub fn is_truncated(&self) -> bool {
        self.total > self.rows.len() as u64
    }
}
