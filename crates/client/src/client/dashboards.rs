//! Dashboard methods for [`HumioClient`].
//!
//! Both methods are a single GraphQL round-trip followed by field projection.

use secrecy::ExposeSecret;
use serde_json::json;
use tracing::debug;

use crate::client::HumioClient;
use crate::endpoints;
use crate::error::{ClientError, Result};
use crate::models::dashboards::SearchDomainData;
use crate::models::{DashboardInfo, DashboardListResult, DashboardQueriesResult, WidgetQuery};

const LIST_DASHBOARDS_QUERY: &str = r#"
query ListDashboards($repo: String!) {
  searchDomain(name: $repo) {
    dashboards {
      id
      name
      description
    }
  }
}
"#;

const DASHBOARD_WIDGETS_QUERY: &str = r#"
query GetDashboard($repo: String!) {
  searchDomain(name: $repo) {
    dashboards {
      id
      name
      description
      widgets {
        ... on QueryBasedWidget {
          id
          title
          queryString
          start
          end
          isLive
          widgetType
        }
      }
    }
  }
}
"#;

impl HumioClient {
    async fn search_domain_dashboards(&self, query: &str, repo: &str) -> Result<SearchDomainData> {
        endpoints::execute_graphql(
            &self.http,
            &self.base_url,
            self.token.expose_secret(),
            query,
            Some(json!({ "repo": repo })),
            self.settings.request_timeout,
        )
        .await
    }

    /// List dashboards in a repository or view.
    ///
    /// A non-empty `search_filter` keeps dashboards whose name contains it,
    /// ignoring case.
    pub async fn list_dashboards(
        &self,
        repo: &str,
        search_filter: Option<&str>,
    ) -> Result<DashboardListResult> {
        debug!(repo, "Listing dashboards");

        let data = self
            .search_domain_dashboards(LIST_DASHBOARDS_QUERY, repo)
            .await?;
        let mut dashboards: Vec<DashboardInfo> = data
            .into_dashboards()
            .into_iter()
            .map(DashboardInfo::from)
            .collect();

        if let Some(filter) = search_filter.filter(|f| !f.is_empty()) {
            let filter = filter.to_lowercase();
            dashboards.retain(|d| d.name.to_lowercase().contains(&filter));
        }

        Ok(DashboardListResult {
            cluster: self.cluster_name.clone(),
            repo: repo.to_string(),
            total: dashboards.len(),
            dashboards,
        })
    }

    /// Get the widget queries of a dashboard, matched by name ignoring case.
    ///
    /// Widgets without a query string are skipped.
    ///
    /// # Errors
    ///
    /// Returns [`ClientError::NotFound`] listing the available dashboard names
    /// when no dashboard matches.
    pub async fn get_dashboard_queries(
        &self,
        repo: &str,
        dashboard_name: &str,
    ) -> Result<DashboardQueriesResult> {
        debug!(repo, dashboard_name, "Fetching dashboard queries");

        let data = self
            .search_domain_dashboards(DASHBOARD_WIDGETS_QUERY, repo)
            .await?;
        let mut dashboards = data.into_dashboards();

        let wanted = dashboard_name.to_lowercase();
        let Some(position) = dashboards
            .iter()
            .position(|d| d.name().to_lowercase() == wanted)
        else {
            return Err(ClientError::NotFound {
                name: dashboard_name.to_string(),
                repo: repo.to_string(),
                available: dashboards.iter().map(|d| d.name().to_string()).collect(),
            });
        };

        let target = dashboards.swap_remove(position);

        let queries: Vec<WidgetQuery> = target
            .widgets
            .unwrap_or_default()
            .into_iter()
            .filter_map(|w| w.into_query())
            .collect();

        Ok(DashboardQueriesResult {
            cluster: self.cluster_name.clone(),
            repo: repo.to_string(),
            dashboard_name: target.name.unwrap_or_else(|| dashboard_name.to_string()),
            dashboard_id: target.id.unwrap_or_default(),
            total: queries.len(),
            queries,
        })
    }
}
