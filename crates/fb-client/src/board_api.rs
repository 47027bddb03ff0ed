use async_trait::async_trait;
use fb_api_types::{AccessLevel, Funnel, Lead, Stage, StageOrder};
use fb_core::board::BoardApi;
use fb_core::error::ApiError;

use crate::client::FunnelClient;

#[async_trait]
impl BoardApi for FunnelClient {
    async fn get_funnel(&self, funnel_id: &str) -> Result<Funnel, ApiError> {
        FunnelClient::get_funnel(self, funnel_id).await
    }

    async fn list_stages(&self, funnel_id: &str) -> Result<Vec<Stage>, ApiError> {
        FunnelClient::list_stages(self, funnel_id).await
    }

    async fn list_leads(&self, funnel_id: &str) -> Result<Vec<Lead>, ApiError> {
        FunnelClient::list_leads(self, funnel_id).await
    }

    async fn current_permission(&self, funnel_id: &str) -> Option<AccessLevel> {
        FunnelClient::current_permission(self, funnel_id).await
    }

    async fn reorder_stages(&self, funnel_id: &str, stages: &[StageOrder]) -> Result<(), ApiError> {
        FunnelClient::reorder_stages(self, funnel_id, stages).await
    }

    async fn move_lead(&self, lead_id: &str, stage_id: &str, funnel_id: &str) -> Result<(), ApiError> {
        FunnelClient::move_lead(self, lead_id, stage_id, funnel_id).await
    }
}
