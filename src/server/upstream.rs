use serde::{Deserialize, Serialize};
use url::Url;

use super::error::ApiError;
use crate::types::UserId;

/// Pro-dashboard payload from the service API.
///
/// Custom domain entries are passed through untyped; this service gates them,
/// the mailbox service owns their shape.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct DashboardData {
    pub custom_domains: Vec<serde_json::Value>,
    pub muted_senders: Vec<String>,
}

/// Client for the upstream service API.
pub struct UpstreamClient {
    base: Url,
    http: reqwest::Client,
}

impl UpstreamClient {
    #[must_use]
    pub fn new(base: Url) -> Self {
        Self {
            base,
            http: reqwest::Client::new(),
        }
    }

    /// Use a custom HTTP client (for connection pool reuse or testing).
    #[must_use]
    pub fn with_http_client(mut self, client: reqwest::Client) -> Self {
        self.http = client;
        self
    }

    fn dashboard_data_url(&self, user_id: &UserId) -> String {
        format!(
            "{}/user/{}/dashboard-data",
            self.base.as_str().trim_end_matches('/'),
            user_id
        )
    }

    /// Fetch custom domains + muted senders for a pro user.
    ///
    /// # Errors
    ///
    /// Returns [`ApiError::Upstream`] on network failure or a non-success
    /// status. Callers rendering the dashboard view swallow this into an
    /// empty payload; the raw endpoint surfaces it as 502.
    pub async fn fetch_dashboard_data(
        &self,
        user_id: &UserId,
    ) -> Result<DashboardData, ApiError> {
        let response = self
            .http
            .get(self.dashboard_data_url(user_id))
            .send()
            .await
            .map_err(|e| ApiError::Upstream(e.to_string()))?;

        if !response.status().is_success() {
            return Err(ApiError::Upstream(format!(
                "dashboard-data returned status {}",
                response.status().as_u16()
            )));
        }

        response
            .json::<DashboardData>()
            .await
            .map_err(|e| ApiError::Upstream(e.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn dashboard_data_defaults_to_empty() {
        let data = DashboardData::default();
        assert!(data.custom_domains.is_empty());
        assert!(data.muted_senders.is_empty());
    }

    #[test]
    fn dashboard_data_deserializes_camel_case() {
        let json = r#"{
            "customDomains": [{"domain": "mail.example.com", "verified": true}],
            "mutedSenders": ["spam@example.com"]
        }"#;
        let data: DashboardData = serde_json::from_str(json).unwrap();
        assert_eq!(data.custom_domains.len(), 1);
        assert_eq!(data.muted_senders, vec!["spam@example.com"]);
    }

    #[test]
    fn dashboard_data_tolerates_missing_fields() {
        let data: DashboardData = serde_json::from_str("{}").unwrap();
        assert_eq!(data, DashboardData::default());
    }

    #[test]
    fn url_building_handles_trailing_slash() {
        let with_slash = UpstreamClient::new("http://api.internal:4000/".parse().unwrap());
        let without = UpstreamClient::new("http://api.internal:4000".parse().unwrap());
        let user = UserId::from("190000000000000001");

        let expected = "http://api.internal:4000/user/190000000000000001/dashboard-data";
        assert_eq!(with_slash.dashboard_data_url(&user), expected);
        assert_eq!(without.dashboard_data_url(&user), expected);
    }
}
