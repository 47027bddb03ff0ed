//! Starting layout for newly created funnels.

use fb_api_types::{CreateFunnelRequest, FieldType, NewLeadField, NewStage};

const DEFAULT_STAGES: &[(&str, &str)] = &[
    ("Prospect", "#3B82F6"),
    ("Lead", "#F59E0B"),
    ("Qualified", "#10B981"),
    ("Proposal", "#8B5CF6"),
    ("Negotiation", "#F97316"),
    ("Closed Won", "#059669"),
    ("Closed Lost", "#DC2626"),
];

const DEFAULT_FIELDS: &[(&str, FieldType, bool)] = &[
    ("Name", FieldType::Text, true),
    ("Email", FieldType::Email, true),
    ("Phone", FieldType::Phone, false),
    ("Company", FieldType::Text, false),
    ("Value", FieldType::Currency, false),
];

pub fn default_stages() -> Vec<NewStage> {
    DEFAULT_STAGES
        .iter()
        .enumerate()
        .map(|(i, (name, color))| NewStage {
            name: name.to_string(),
            order: i as i32 + 1,
            color: color.to_string(),
        })
        .collect()
}

pub fn default_lead_fields() -> Vec<NewLeadField> {
    DEFAULT_FIELDS
        .iter()
        .map(|(name, field_type, required)| NewLeadField {
            name: name.to_string(),
            field_type: *field_type,
            required: *required,
        })
        .collect()
}

/// A create request with the standard sales pipeline and contact fields.
pub fn default_funnel(name: impl Into<String>, description: Option<String>) -> CreateFunnelRequest {
    CreateFunnelRequest {
        name: name.into(),
        description,
        lead_fields: default_lead_fields(),
        stages: default_stages(),
    }
}
