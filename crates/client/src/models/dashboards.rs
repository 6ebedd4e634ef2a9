//! Dashboard models for the Humio GraphQL API.
//!
//! The `Raw*` types mirror the `searchDomain { dashboards { ... } }` response;
//! the public types are the normalized projections returned to callers.

use serde::{Deserialize, Serialize};

/// Dashboard summary.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DashboardInfo {
    pub id: String,
    pub name: String,
    pub description: Option<String>,
}

/// Result of listing dashboards.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DashboardListResult {
    pub cluster: String,
    pub repo: String,
    pub dashboards: Vec<DashboardInfo>,
    pub total: usize,
}

/// A query-backed widget from a dashboard.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WidgetQuery {
    pub widget_id: String,
    pub widget_title: String,
    pub query_string: String,
    pub start: String,
    pub end: String,
}

/// Result of extracting the queries of one dashboard.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DashboardQueriesResult {
    pub cluster: String,
    pub repo: String,
    pub dashboard_name: String,
    pub dashboard_id: String,
    pub queries: Vec<WidgetQuery>,
    pub total: usize,
}

#[derive(Debug, Default, Deserialize)]
pub(crate) struct SearchDomainData {
    #[serde(rename = "searchDomain", default)]
    pub search_domain: Option<RawSearchDomain>,
}

impl SearchDomainData {
    pub(crate) fn into_dashboards(self) -> Vec<RawDashboard> {
        self.search_domain
            .and_then(|d| d.dashboards)
            .unwrap_or_default()
    }
}

#[derive(Debug, Default, Deserialize)]
pub(crate) struct RawSearchDomain {
    #[serde(default)]
    pub dashboards: Option<Vec<RawDashboard>>,
}

#[derive(Debug, Default, Deserialize)]
pub(crate) struct RawDashboard {
    #[serde(default)]
    pub id: Option<String>,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub widgets: Option<Vec<RawWidget>>,
}

impl RawDashboard {
    pub(crate) fn name(&self) -> &str {
        self.name.as_deref().unwrap_or_default()
    }
}

/// A widget; non-query widgets arrive as empty objects because only the
/// `QueryBasedWidget` fragment fields are requested.
#[derive(Debug, Default, Deserialize)]
pub(crate) struct RawWidget {
    #[serde(default)]
    pub id: Option<String>,
    #[serde(default)]
    pub title: Option<String>,
    #[serde(rename = "queryString", default)]
    pub query_string: Option<String>,
    #[serde(default)]
    pub start: Option<String>,
    #[serde(default)]
    pub end: Option<String>,
}

impl From<RawDashboard> for DashboardInfo {
    fn from(raw: RawDashboard) -> Self {
        Self {
            id: raw.id.unwrap_or_default(),
            name: raw.name.unwrap_or_default(),
            description: raw.description,
        }
    }
}

impl RawWidget {
    /// Project a widget into a [`WidgetQuery`], or `None` if it has no query.
    pub(crate) fn into_query(self) -> Option<WidgetQuery> {
        let query_string = self.query_string.filter(|q| !q.is_empty())?;
        Some(WidgetQuery {
            widget_id: self.id.unwrap_or_default(),
            widget_title: self.title.unwrap_or_default(),
            query_string,
            start: self.start.unwrap_or_default(),
            end: self.end.unwrap_or_default(),
        })
    }
}
