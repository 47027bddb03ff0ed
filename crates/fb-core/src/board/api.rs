use async_trait::async_trait;
use fb_api_types::{AccessLevel, Funnel, Lead, Stage, StageOrder};

use crate::error::ApiError;

/// The backend calls the board needs. Implemented by the HTTP client and by
/// in-memory fakes in tests.
#[async_trait]
pub trait BoardApi: Send + Sync {
    async fn get_funnel(&self, funnel_id: &str) -> Result<Funnel, ApiError>;

    async fn list_stages(&self, funnel_id: &str) -> Result<Vec<Stage>, ApiError>;

    async fn list_leads(&self, funnel_id: &str) -> Result<Vec<Lead>, ApiError>;

    /// The caller's access level, or `None` when it cannot be determined.
    async fn current_permission(&self, funnel_id: &str) -> Option<AccessLevel>;

    /// Persist the full `(id, order)` list for a funnel.
    async fn reorder_stages(&self, funnel_id: &str, stages: &[StageOrder]) -> Result<(), ApiError>;

    async fn move_lead(&self, lead_id: &str, stage_id: &str, funnel_id: &str) -> Result<(), ApiError>;
}
