//! Wire types for the funnelboard REST backend.
//!
//! Every struct here mirrors the JSON the backend sends or accepts. Field
//! names are camelCase on the wire; lenient `#[serde(default)]` is used on
//! response-only fields so partial payloads from older backends still parse.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

// ── Auth ──

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RegisterRequest {
    pub email: String,
    pub password: String,
    pub name: String,
    pub tenant_name: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AuthResponse {
    pub token: String,
    pub user: User,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum UserRole {
    Admin,
    User,
    Collaborator,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct User {
    pub id: String,
    pub email: String,
    #[serde(default)]
    pub name: Option<String>,
    pub role: UserRole,
    pub tenant: Tenant,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Tenant {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub domain: String,
}

// ── Funnels, stages, fields, leads ──

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Funnel {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub stages: Vec<Stage>,
    #[serde(default)]
    pub lead_fields: Vec<LeadField>,
    #[serde(default)]
    pub leads: Vec<Lead>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Stage {
    pub id: String,
    pub name: String,
    pub order: i32,
    #[serde(default)]
    pub color: String,
}

/// The value types a lead field can declare. Values are always stored as
/// text regardless of the declared type.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum FieldType {
    Text,
    Email,
    Phone,
    Number,
    Date,
    Currency,
    Textarea,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LeadField {
    pub id: String,
    pub name: String,
    #[serde(rename = "type")]
    pub field_type: FieldType,
    #[serde(default)]
    pub required: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Lead {
    pub id: String,
    pub stage_id: String,
    #[serde(default)]
    pub data: Vec<LeadData>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LeadData {
    pub field_id: String,
    pub value: String,
}

// ── Funnel / stage / lead requests ──

/// A stage definition without an id, used when creating funnels and stages.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewStage {
    pub name: String,
    pub order: i32,
    pub color: String,
}

/// A lead field definition without an id.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewLeadField {
    pub name: String,
    #[serde(rename = "type")]
    pub field_type: FieldType,
    pub required: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateFunnelRequest {
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    pub lead_fields: Vec<NewLeadField>,
    pub stages: Vec<NewStage>,
}

/// Partial funnel update; absent fields are left untouched by the backend.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateFunnelRequest {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub lead_fields: Option<Vec<NewLeadField>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub stages: Option<Vec<NewStage>>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct UpdateStageRequest {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub order: Option<i32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub color: Option<String>,
}

/// One `(id, order)` entry of a bulk stage reorder.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StageOrder {
    pub id: String,
    pub order: i32,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReorderStagesRequest {
    pub stages: Vec<StageOrder>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MoveLeadRequest {
    pub stage_id: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateLeadRequest {
    pub stage_id: String,
    pub lead_data: Vec<LeadData>,
}

/// Partial lead update. `lead_data` maps field id to the new text value.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateLeadRequest {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub stage_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub lead_data: Option<std::collections::BTreeMap<String, String>>,
}

// ── Dashboard ──

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DashboardMetrics {
    #[serde(default)]
    pub total_leads: u64,
    #[serde(default)]
    pub total_funnels: u64,
    #[serde(default)]
    pub conversion_rate: f64,
    #[serde(default)]
    pub active_leads: u64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LeadCountByStage {
    pub stage_id: String,
    pub stage_name: String,
    #[serde(default)]
    pub color: String,
    pub lead_count: u64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FunnelPerformance {
    pub funnel_id: String,
    pub funnel_name: String,
    #[serde(default)]
    pub stages: Vec<LeadCountByStage>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LeadCreationOverTime {
    pub date: String,
    pub count: u64,
}

// ── Collaboration ──

/// Permission level a collaborator row can hold.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Permission {
    View,
    Edit,
    Delete,
}

/// The caller's effective access to a funnel. `Owner` is implicit for the
/// funnel creator and never appears on a collaborator row.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum AccessLevel {
    Owner,
    View,
    Edit,
    Delete,
}

impl AccessLevel {
    /// Stage and lead mutations (drags, creation, deletion).
    pub fn can_edit_board(self) -> bool {
        matches!(self, Self::Owner | Self::Edit | Self::Delete)
    }

    /// Adding, removing and re-permissioning collaborators.
    pub fn can_manage_collaborators(self) -> bool {
        matches!(self, Self::Owner | Self::Delete)
    }
}

impl From<Permission> for AccessLevel {
    fn from(p: Permission) -> Self {
        match p {
            Permission::View => Self::View,
            Permission::Edit => Self::Edit,
            Permission::Delete => Self::Delete,
        }
    }
}

impl std::str::FromStr for Permission {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_uppercase().as_str() {
            "VIEW" => Ok(Self::View),
            "EDIT" => Ok(Self::Edit),
            "DELETE" => Ok(Self::Delete),
            other => Err(format!("unknown permission '{other}' (expected VIEW, EDIT or DELETE)")),
        }
    }
}

impl std::fmt::Display for Permission {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(match self {
            Self::View => "VIEW",
            Self::Edit => "EDIT",
            Self::Delete => "DELETE",
        })
    }
}

impl std::fmt::Display for AccessLevel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(match self {
            Self::Owner => "OWNER",
            Self::View => "VIEW",
            Self::Edit => "EDIT",
            Self::Delete => "DELETE",
        })
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CollaboratorUser {
    pub id: String,
    pub email: String,
    #[serde(default)]
    pub name: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Collaborator {
    pub id: String,
    pub user_id: String,
    pub funnel_id: String,
    pub permission: Permission,
    pub user: CollaboratorUser,
    #[serde(default)]
    pub created_at: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AddCollaboratorRequest {
    pub email: String,
    pub permission: Permission,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateCollaboratorRequest {
    pub email: String,
    pub password: String,
    pub name: String,
    pub permission: Permission,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreatedCollaborator {
    pub collaborator: User,
    pub funnel_user: Collaborator,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UpdatePermissionRequest {
    pub permission: Permission,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PermissionResponse {
    pub permission: AccessLevel,
}
