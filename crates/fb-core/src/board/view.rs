//! Display view of a board: stage columns holding resolved lead cards.
//!
//! Everything here is a pure function of stages, leads and field metadata.
//! [`ViewCache`] memoizes the result against the board's revision counters.

use fb_api_types::{FieldType, Lead, LeadField, Stage};
use serde::Serialize;

use super::state::BoardState;

/// A single `(field name, value)` pair on a card.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FieldValue {
    pub name: String,
    pub value: String,
}

/// A lead resolved against its funnel's field definitions.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LeadCard {
    pub id: String,
    pub stage_id: String,
    pub name: String,
    pub company: Option<String>,
    pub email: Option<String>,
    pub phone: Option<String>,
    /// Parsed from the first CURRENCY field; 0 when absent or unparseable.
    pub value: f64,
    pub fields: Vec<FieldValue>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct StageColumn {
    pub stage: Stage,
    pub cards: Vec<LeadCard>,
}

impl StageColumn {
    /// Sum of card values in this column.
    pub fn total_value(&self) -> f64 {
        self.cards.iter().map(|c| c.value).sum()
    }
}

fn field_named<'a>(fields: &'a [LeadField], name: &str) -> Option<&'a LeadField> {
    fields.iter().find(|f| f.name.eq_ignore_ascii_case(name))
}

fn value_of<'a>(lead: &'a Lead, field: Option<&LeadField>) -> Option<&'a str> {
    let field = field?;
    lead.data
        .iter()
        .find(|d| d.field_id == field.id)
        .map(|d| d.value.as_str())
}

fn non_empty(value: Option<&str>) -> Option<String> {
    value.filter(|v| !v.trim().is_empty()).map(str::to_string)
}

/// Resolve a lead into a card.
pub fn lead_card(lead: &Lead, fields: &[LeadField]) -> LeadCard {
    let name = non_empty(value_of(lead, field_named(fields, "name"))).unwrap_or_else(|| "Unknown".to_string());
    let currency = fields.iter().find(|f| f.field_type == FieldType::Currency);
    let value = value_of(lead, currency)
        .and_then(|v| v.trim().parse::<f64>().ok())
        .filter(|v| v.is_finite())
        .unwrap_or(0.0);

    let fields_out = lead
        .data
        .iter()
        .map(|d| FieldValue {
            name: fields
                .iter()
                .find(|f| f.id == d.field_id)
                .map(|f| f.name.clone())
                .unwrap_or_else(|| d.field_id.clone()),
            value: d.value.clone(),
        })
        .collect();

    LeadCard {
        id: lead.id.clone(),
        stage_id: lead.stage_id.clone(),
        name,
        company: non_empty(value_of(lead, field_named(fields, "company"))),
        email: non_empty(value_of(lead, field_named(fields, "email"))),
        phone: non_empty(value_of(lead, field_named(fields, "phone"))),
        value,
        fields: fields_out,
    }
}

/// Group leads into stage columns. Columns follow stage `order`; cards keep
/// client-state order. Leads pointing at unknown stages are left out.
pub fn leads_by_stage(stages: &[Stage], leads: &[Lead], fields: &[LeadField]) -> Vec<StageColumn> {
    let mut sorted: Vec<&Stage> = stages.iter().collect();
    sorted.sort_by_key(|s| s.order);
    sorted
        .into_iter()
        .map(|stage| StageColumn {
            stage: stage.clone(),
            cards: leads
                .iter()
                .filter(|l| l.stage_id == stage.id)
                .map(|l| lead_card(l, fields))
                .collect(),
        })
        .collect()
}

/// Memoized [`leads_by_stage`] keyed on `(funnel id, stages rev, leads rev)`.
#[derive(Debug, Default)]
pub struct ViewCache {
    key: Option<(String, u64, u64)>,
    columns: Vec<StageColumn>,
}

impl ViewCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// Columns for `board`, rebuilt only when its revision moved.
    pub fn columns(&mut self, board: &BoardState) -> &[StageColumn] {
        let (stages_rev, leads_rev) = board.revision();
        let key = (board.funnel_id().to_string(), stages_rev, leads_rev);
        if self.key.as_ref() != Some(&key) {
            self.columns = leads_by_stage(board.stages(), board.leads(), board.lead_fields());
            self.key = Some(key);
        }
        &self.columns
    }

    pub fn invalidate(&mut self) {
        self.key = None;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use fb_api_types::LeadData;

    fn field(id: &str, name: &str, t: FieldType) -> LeadField {
        LeadField {
            id: id.into(),
            name: name.into(),
            field_type: t,
            required: false,
        }
    }

    fn fields() -> Vec<LeadField> {
        vec![
            field("f-name", "Name", FieldType::Text),
            field("f-mail", "EMAIL", FieldType::Email),
            field("f-co", "company", FieldType::Text),
            field("f-val", "Deal value", FieldType::Currency),
        ]
    }

    fn lead(id: &str, stage: &str, data: &[(&str, &str)]) -> Lead {
        Lead {
            id: id.into(),
            stage_id: stage.into(),
            data: data
                .iter()
                .map(|(f, v)| LeadData {
                    field_id: f.to_string(),
                    value: v.to_string(),
                })
                .collect(),
        }
    }

    #[test]
    fn card_resolves_fields_case_insensitively() {
        let l = lead(
            "l1",
            "s1",
            &[("f-name", "Ada"), ("f-mail", "ada@example.com"), ("f-co", "Engines"), ("f-val", "1250.50")],
        );
        let card = lead_card(&l, &fields());
        assert_eq!(card.name, "Ada");
        assert_eq!(card.email.as_deref(), Some("ada@example.com"));
        assert_eq!(card.company.as_deref(), Some("Engines"));
        assert_eq!(card.phone, None);
        assert_eq!(card.value, 1250.5);
        assert_eq!(card.fields[1].name, "EMAIL");
    }

    #[test]
    fn card_defaults() {
        let l = lead("l1", "s1", &[("f-val", "lots"), ("orphan", "x")]);
        let card = lead_card(&l, &fields());
        assert_eq!(card.name, "Unknown");
        assert_eq!(card.value, 0.0);
        assert_eq!(card.fields[1].name, "orphan");
    }

    #[test]
    fn columns_follow_stage_order_and_include_empty_stages() {
        let stages = vec![
            Stage { id: "b".into(), name: "B".into(), order: 2, color: String::new() },
            Stage { id: "a".into(), name: "A".into(), order: 1, color: String::new() },
        ];
        let leads = vec![lead("l1", "a", &[]), lead("l2", "a", &[]), lead("l3", "gone", &[])];
        let cols = leads_by_stage(&stages, &leads, &[]);
        assert_eq!(cols.len(), 2);
        assert_eq!(cols[0].stage.id, "a");
        assert_eq!(cols[0].cards.iter().map(|c| c.id.as_str()).collect::<Vec<_>>(), ["l1", "l2"]);
        assert!(cols[1].cards.is_empty());
    }

    #[test]
    fn cache_rebuilds_on_revision_change() {
        let stages = vec![Stage { id: "a".into(), name: "A".into(), order: 1, color: String::new() }];
        let mut board = BoardState::new("f", stages, vec![lead("l1", "a", &[])]);
        let mut cache = ViewCache::new();
        assert_eq!(cache.columns(&board)[0].cards.len(), 1);

        board.set_leads(vec![]);
        assert!(cache.columns(&board)[0].cards.is_empty());
    }
}
