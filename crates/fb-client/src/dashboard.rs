use fb_api_types::{DashboardMetrics, FunnelPerformance, LeadCountByStage, LeadCreationOverTime};
use fb_core::error::ApiError;
use reqwest::Method;

use crate::client::FunnelClient;

impl FunnelClient {
    pub async fn dashboard_metrics(&self) -> Result<DashboardMetrics, ApiError> {
        let req = self.request(Method::GET, "/api/dashboard/metrics");
        self.json("dashboard.metrics", req).await
    }

    /// Lead counts per stage, across all funnels or for one.
    pub async fn lead_counts_by_stage(&self, funnel_id: Option<&str>) -> Result<Vec<LeadCountByStage>, ApiError> {
        let mut req = self.request(Method::GET, "/api/dashboard/lead-counts-by-stage");
        if let Some(id) = funnel_id {
            req = req.query(&[("funnelId", id)]);
        }
        self.json("dashboard.lead_counts", req).await
    }

    pub async fn funnel_performance(&self) -> Result<Vec<FunnelPerformance>, ApiError> {
        let req = self.request(Method::GET, "/api/dashboard/funnel-performance");
        self.json("dashboard.funnel_performance", req).await
    }

    pub async fn lead_creation_over_time(&self, days: Option<u32>) -> Result<Vec<LeadCreationOverTime>, ApiError> {
        let req = with_days(self.request(Method::GET, "/api/dashboard/lead-creation-over-time"), days);
        self.json("dashboard.lead_creation", req).await
    }

    pub async fn funnel_lead_creation_over_time(
        &self,
        funnel_id: &str,
        days: Option<u32>,
    ) -> Result<Vec<LeadCreationOverTime>, ApiError> {
        let path = format!("/api/dashboard/funnels/{funnel_id}/lead-creation-over-time");
        let req = with_days(self.request(Method::GET, &path), days);
        self.json("dashboard.funnel_lead_creation", req).await
    }
}

// A zero window means "backend default", same as leaving it out.
fn with_days(req: reqwest::RequestBuilder, days: Option<u32>) -> reqwest::RequestBuilder {
    match days.filter(|d| *d > 0) {
        Some(d) => req.query(&[("days", d)]),
        None => req,
    }
}
