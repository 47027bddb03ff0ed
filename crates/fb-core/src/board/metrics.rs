//! Funnel metrics derived from stages and leads.
//!
//! Pure functions; nothing here touches the network or mutates state.

use fb_api_types::{Lead, LeadCountByStage, LeadField, Stage};
use serde::Serialize;

use super::view::{lead_card, FieldValue};

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FunnelMetrics {
    pub total_leads: usize,
    /// Leads not yet in the terminal stage.
    pub active_leads: usize,
    /// Share of leads in the terminal stage, in `[0, 1]`.
    pub conversion_rate: f64,
    pub stages_count: usize,
}

/// The stage with the highest `order`. Ties go to the one listed last.
pub fn terminal_stage(stages: &[Stage]) -> Option<&Stage> {
    stages.iter().max_by_key(|s| s.order)
}

pub fn funnel_metrics(stages: &[Stage], leads: &[Lead]) -> FunnelMetrics {
    let total = leads.len();
    let converted = match terminal_stage(stages) {
        Some(terminal) => leads.iter().filter(|l| l.stage_id == terminal.id).count(),
        None => 0,
    };
    let conversion_rate = if total == 0 {
        0.0
    } else {
        converted as f64 / total as f64
    };
    FunnelMetrics {
        total_leads: total,
        active_leads: total - converted,
        conversion_rate,
        stages_count: stages.len(),
    }
}

/// One bucket per stage in `order`, including stages with no leads.
pub fn stage_lead_counts(stages: &[Stage], leads: &[Lead]) -> Vec<LeadCountByStage> {
    let mut sorted: Vec<&Stage> = stages.iter().collect();
    sorted.sort_by_key(|s| s.order);
    sorted
        .into_iter()
        .map(|s| LeadCountByStage {
            stage_id: s.id.clone(),
            stage_name: s.name.clone(),
            color: s.color.clone(),
            lead_count: leads.iter().filter(|l| l.stage_id == s.id).count() as u64,
        })
        .collect()
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct StageFlow {
    pub stage_id: String,
    pub stage_name: String,
    pub lead_count: u64,
    /// Percentage of all leads. The first stage always reports 100.
    pub percent_of_total: f64,
}

pub fn stage_flow(stages: &[Stage], leads: &[Lead]) -> Vec<StageFlow> {
    let total = leads.len();
    stage_lead_counts(stages, leads)
        .into_iter()
        .enumerate()
        .map(|(index, c)| {
            let percent_of_total = if index == 0 {
                100.0
            } else if total > 0 {
                c.lead_count as f64 / total as f64 * 100.0
            } else {
                0.0
            };
            StageFlow {
                stage_id: c.stage_id,
                stage_name: c.stage_name,
                lead_count: c.lead_count,
                percent_of_total,
            }
        })
        .collect()
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RecentLead {
    pub lead_id: String,
    /// `None` when the lead points at a stage that no longer exists.
    pub stage_name: Option<String>,
    pub fields: Vec<FieldValue>,
}

/// The first `limit` leads in client-state order with stage and field names
/// resolved.
pub fn recent_leads(stages: &[Stage], fields: &[LeadField], leads: &[Lead], limit: usize) -> Vec<RecentLead> {
    leads
        .iter()
        .take(limit)
        .map(|lead| RecentLead {
            lead_id: lead.id.clone(),
            stage_name: stages
                .iter()
                .find(|s| s.id == lead.stage_id)
                .map(|s| s.name.clone()),
            fields: lead_card(lead, fields).fields,
        })
        .collect()
}
