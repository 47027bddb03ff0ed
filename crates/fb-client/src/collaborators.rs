use fb_api_types::{
    AccessLevel, AddCollaboratorRequest, Collaborator, CreateCollaboratorRequest, CreatedCollaborator, Permission,
    PermissionResponse, UpdatePermissionRequest,
};
use fb_core::error::ApiError;
use reqwest::Method;
use tracing::debug;

use crate::client::FunnelClient;

impl FunnelClient {
    pub async fn list_collaborators(&self, funnel_id: &str) -> Result<Vec<Collaborator>, ApiError> {
        let req = self.request(Method::GET, &format!("/api/funnels/{funnel_id}/collaborators"));
        self.json("collaborators.list", req).await
    }

    /// Grant an existing user access to a funnel.
    pub async fn add_collaborator(
        &self,
        funnel_id: &str,
        email: &str,
        permission: Permission,
    ) -> Result<Collaborator, ApiError> {
        let req = self
            .request(Method::POST, &format!("/api/funnels/{funnel_id}/collaborators"))
            .json(&AddCollaboratorRequest {
                email: email.to_string(),
                permission,
            });
        self.json("collaborators.add", req).await
    }

    /// Create a collaborator account and grant it access in one call.
    pub async fn create_and_add_collaborator(
        &self,
        funnel_id: &str,
        request: &CreateCollaboratorRequest,
    ) -> Result<CreatedCollaborator, ApiError> {
        let req = self
            .request(
                Method::POST,
                &format!("/api/funnels/{funnel_id}/collaborators/create-and-add"),
            )
            .json(request);
        self.json("collaborators.create_and_add", req).await
    }

    pub async fn update_collaborator_permission(
        &self,
        funnel_id: &str,
        collaborator_id: &str,
        permission: Permission,
    ) -> Result<(), ApiError> {
        let req = self
            .request(
                Method::PUT,
                &format!("/api/funnels/{funnel_id}/collaborators/{collaborator_id}"),
            )
            .json(&UpdatePermissionRequest { permission });
        self.empty("collaborators.update", req).await
    }

    pub async fn remove_collaborator(&self, funnel_id: &str, collaborator_id: &str) -> Result<(), ApiError> {
        let req = self.request(
            Method::DELETE,
            &format!("/api/funnels/{funnel_id}/collaborators/{collaborator_id}"),
        );
        self.empty("collaborators.remove", req).await
    }

    /// The caller's access level on a funnel, or `None` on any failure.
    pub async fn current_permission(&self, funnel_id: &str) -> Option<AccessLevel> {
        let req = self.request(Method::GET, &format!("/api/funnels/{funnel_id}/permission"));
        match self.json::<PermissionResponse>("collaborators.permission", req).await {
            Ok(resp) => Some(resp.permission),
            Err(e) => {
                debug!(funnel_id, error = %e, "permission lookup failed");
                None
            }
        }
    }
}
