use fb_api_types::{AccessLevel, Lead, LeadField, Stage, StageOrder};

/// In-memory copy of one funnel's board: the source of truth for the
/// session. Stage position comes from `Stage::order`, lead placement from
/// `Lead::stage_id`; anything grouped or sorted for display is derived.
///
/// `stages` is always kept sorted by `order`. Revision counters bump on
/// every mutation so derived views can tell when they are stale.
#[derive(Debug, Clone)]
pub struct BoardState {
    funnel_id: String,
    stages: Vec<Stage>,
    leads: Vec<Lead>,
    lead_fields: Vec<LeadField>,
    access: Option<AccessLevel>,
    stages_rev: u64,
    leads_rev: u64,
}

impl BoardState {
    pub fn new(funnel_id: impl Into<String>, mut stages: Vec<Stage>, leads: Vec<Lead>) -> Self {
        stages.sort_by_key(|s| s.order);
        Self {
            funnel_id: funnel_id.into(),
            stages,
            leads,
            lead_fields: Vec::new(),
            access: None,
            stages_rev: 0,
            leads_rev: 0,
        }
    }

    pub fn with_lead_fields(mut self, fields: Vec<LeadField>) -> Self {
        self.lead_fields = fields;
        self
    }

    pub fn with_access(mut self, access: Option<AccessLevel>) -> Self {
        self.access = access;
        self
    }

    // -- Accessors -----------------------------------------------------------

    pub fn funnel_id(&self) -> &str {
        &self.funnel_id
    }

    /// Stages in canonical left-to-right order.
    pub fn stages(&self) -> &[Stage] {
        &self.stages
    }

    /// Leads in client-state order.
    pub fn leads(&self) -> &[Lead] {
        &self.leads
    }

    pub fn lead_fields(&self) -> &[LeadField] {
        &self.lead_fields
    }

    pub fn access(&self) -> Option<AccessLevel> {
        self.access
    }

    /// Whether the session may drag stages and leads. Unknown access counts
    /// as read-only.
    pub fn can_edit(&self) -> bool {
        self.access.is_some_and(AccessLevel::can_edit_board)
    }

    /// `(stages revision, leads revision)`.
    pub fn revision(&self) -> (u64, u64) {
        (self.stages_rev, self.leads_rev)
    }

    pub fn stage(&self, id: &str) -> Option<&Stage> {
        self.stages.iter().find(|s| s.id == id)
    }

    pub fn stage_index(&self, id: &str) -> Option<usize> {
        self.stages.iter().position(|s| s.id == id)
    }

    pub fn lead(&self, id: &str) -> Option<&Lead> {
        self.leads.iter().find(|l| l.id == id)
    }

    pub fn is_stage(&self, id: &str) -> bool {
        self.stage(id).is_some()
    }

    pub fn is_lead(&self, id: &str) -> bool {
        self.lead(id).is_some()
    }

    /// Leads currently assigned to `stage_id`, in client-state order.
    pub fn leads_in_stage<'a>(&'a self, stage_id: &'a str) -> impl Iterator<Item = &'a Lead> + 'a {
        self.leads.iter().filter(move |l| l.stage_id == stage_id)
    }

    /// Position of a lead within its stage's sublist.
    pub fn index_in_stage(&self, lead_id: &str) -> Option<usize> {
        let stage_id = &self.lead(lead_id)?.stage_id;
        self.leads_in_stage(stage_id).position(|l| l.id == lead_id)
    }

    /// The full `(id, order)` list for the funnel.
    pub fn stage_orders(&self) -> Vec<StageOrder> {
        self.stages
            .iter()
            .map(|s| StageOrder {
                id: s.id.clone(),
                order: s.order,
            })
            .collect()
    }

    // -- Mutations -----------------------------------------------------------

    /// Replace every stage. The list is re-sorted by `order`.
    pub fn set_stages(&mut self, mut stages: Vec<Stage>) {
        stages.sort_by_key(|s| s.order);
        self.stages = stages;
        self.stages_rev += 1;
    }

    /// Apply `orders` to the stages that still exist, then re-sort. Stages
    /// missing from `orders` keep their current value.
    pub fn apply_stage_orders(&mut self, orders: &[StageOrder]) {
        for stage in &mut self.stages {
            if let Some(o) = orders.iter().find(|o| o.id == stage.id) {
                stage.order = o.order;
            }
        }
        self.stages.sort_by_key(|s| s.order);
        self.stages_rev += 1;
    }

    pub fn set_leads(&mut self, leads: Vec<Lead>) {
        self.leads = leads;
        self.leads_rev += 1;
    }

    pub fn set_lead_fields(&mut self, fields: Vec<LeadField>) {
        self.lead_fields = fields;
        self.leads_rev += 1;
    }

    pub fn set_access(&mut self, access: Option<AccessLevel>) {
        self.access = access;
    }

    /// Point a lead at another stage. Returns the previous stage id, or
    /// `None` when the lead does not exist.
    pub fn set_lead_stage(&mut self, lead_id: &str, stage_id: &str) -> Option<String> {
        let lead = self.leads.iter_mut().find(|l| l.id == lead_id)?;
        let previous = std::mem::replace(&mut lead.stage_id, stage_id.to_string());
        self.leads_rev += 1;
        Some(previous)
    }

    /// Remove every lead of `stage_id` and append `reordered` at the end of
    /// the global list.
    pub fn replace_stage_leads(&mut self, stage_id: &str, reordered: Vec<Lead>) {
        self.leads.retain(|l| l.stage_id != stage_id);
        self.leads.extend(reordered);
        self.leads_rev += 1;
    }
}
