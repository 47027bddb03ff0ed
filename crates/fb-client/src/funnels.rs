//! Funnel, stage and lead endpoints.

use fb_api_types::{
    CreateFunnelRequest, CreateLeadRequest, Funnel, Lead, MoveLeadRequest, NewStage, ReorderStagesRequest, Stage,
    StageOrder, UpdateFunnelRequest, UpdateLeadRequest, UpdateStageRequest,
};
use fb_core::error::ApiError;
use reqwest::Method;

use crate::client::FunnelClient;

impl FunnelClient {
    // -- funnels ------------------------------------------------------------

    pub async fn list_funnels(&self) -> Result<Vec<Funnel>, ApiError> {
        self.json("funnels.list", self.request(Method::GET, "/api/funnels"))
            .await
    }

    pub async fn get_funnel(&self, id: &str) -> Result<Funnel, ApiError> {
        self.json("funnels.get", self.request(Method::GET, &format!("/api/funnels/{id}")))
            .await
    }

    pub async fn create_funnel(&self, request: &CreateFunnelRequest) -> Result<Funnel, ApiError> {
        let req = self.request(Method::POST, "/api/funnels").json(request);
        self.json("funnels.create", req).await
    }

    pub async fn update_funnel(&self, id: &str, request: &UpdateFunnelRequest) -> Result<Funnel, ApiError> {
        let req = self
            .request(Method::PUT, &format!("/api/funnels/{id}"))
            .json(request);
        self.json("funnels.update", req).await
    }

    pub async fn delete_funnel(&self, id: &str) -> Result<(), ApiError> {
        self.empty("funnels.delete", self.request(Method::DELETE, &format!("/api/funnels/{id}")))
            .await
    }

    // -- stages -------------------------------------------------------------

    pub async fn list_stages(&self, funnel_id: &str) -> Result<Vec<Stage>, ApiError> {
        let req = self.request(Method::GET, &format!("/api/stages/funnel/{funnel_id}"));
        self.json("stages.list", req).await
    }

    pub async fn create_stage(&self, funnel_id: &str, stage: &NewStage) -> Result<Stage, ApiError> {
        let req = self
            .request(Method::POST, &format!("/api/stages/funnel/{funnel_id}"))
            .json(stage);
        self.json("stages.create", req).await
    }

    pub async fn update_stage(&self, id: &str, funnel_id: &str, request: &UpdateStageRequest) -> Result<Stage, ApiError> {
        let req = self
            .request(Method::PUT, &format!("/api/stages/{id}/funnel/{funnel_id}"))
            .json(request);
        self.json("stages.update", req).await
    }

    pub async fn delete_stage(&self, id: &str, funnel_id: &str) -> Result<(), ApiError> {
        let req = self.request(Method::DELETE, &format!("/api/stages/{id}/funnel/{funnel_id}"));
        self.empty("stages.delete", req).await
    }

    /// Persist the full `(id, order)` list for a funnel in one call.
    pub async fn reorder_stages(&self, funnel_id: &str, stages: &[StageOrder]) -> Result<(), ApiError> {
        let req = self
            .request(Method::PUT, &format!("/api/stages/reorder/funnel/{funnel_id}"))
            .json(&ReorderStagesRequest {
                stages: stages.to_vec(),
            });
        self.empty("stages.reorder", req).await
    }

    // -- leads --------------------------------------------------------------

    pub async fn list_leads(&self, funnel_id: &str) -> Result<Vec<Lead>, ApiError> {
        let req = self.request(Method::GET, &format!("/api/leads/funnel/{funnel_id}"));
        self.json("leads.list", req).await
    }

    pub async fn get_lead(&self, id: &str, funnel_id: &str) -> Result<Lead, ApiError> {
        let req = self.request(Method::GET, &format!("/api/leads/{id}/funnel/{funnel_id}"));
        self.json("leads.get", req).await
    }

    pub async fn create_lead(&self, funnel_id: &str, request: &CreateLeadRequest) -> Result<Lead, ApiError> {
        let req = self
            .request(Method::POST, &format!("/api/leads/funnel/{funnel_id}"))
            .json(request);
        self.json("leads.create", req).await
    }

    pub async fn update_lead(&self, id: &str, funnel_id: &str, request: &UpdateLeadRequest) -> Result<Lead, ApiError> {
        let req = self
            .request(Method::PUT, &format!("/api/leads/{id}/funnel/{funnel_id}"))
            .json(request);
        self.json("leads.update", req).await
    }

    pub async fn delete_lead(&self, id: &str, funnel_id: &str) -> Result<(), ApiError> {
        let req = self.request(Method::DELETE, &format!("/api/leads/{id}/funnel/{funnel_id}"));
        self.empty("leads.delete", req).await
    }

    pub async fn move_lead(&self, id: &str, stage_id: &str, funnel_id: &str) -> Result<(), ApiError> {
        let req = self
            .request(Method::PUT, &format!("/api/leads/{id}/move/funnel/{funnel_id}"))
            .json(&MoveLeadRequest {
                stage_id: stage_id.to_string(),
            });
        self.empty("leads.move", req).await
    }
}
