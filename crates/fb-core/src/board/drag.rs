//! Classify a finished drag into a board intent.
//!
//! Stage ids and lead ids share one id space on the board and never
//! collide, so the active id alone decides whether a stage or a lead is
//! being dragged. Anything that cannot be resolved is an [`DragIntent::Ignore`],
//! never an error.

use super::state::BoardState;

/// A drag-end event: what was dragged and what it was dropped on.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DragEnd {
    pub active_id: String,
    /// `None` when the item was dropped outside every drop target.
    pub over_id: Option<String>,
}

impl DragEnd {
    pub fn new(active_id: impl Into<String>, over_id: impl Into<String>) -> Self {
        Self {
            active_id: active_id.into(),
            over_id: Some(over_id.into()),
        }
    }

    pub fn outside(active_id: impl Into<String>) -> Self {
        Self {
            active_id: active_id.into(),
            over_id: None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IgnoreReason {
    /// Dropped outside any target.
    NoTarget,
    /// The dragged id is neither a stage nor a lead.
    UnknownActive,
    /// The drop target does not resolve to a valid stage or lead for this drag.
    UnknownTarget,
    /// Dropped back where it started.
    SamePosition,
    /// The session may not edit this board.
    ReadOnly,
}

impl std::fmt::Display for IgnoreReason {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(match self {
            Self::NoTarget => "dropped outside any target",
            Self::UnknownActive => "dragged item is not on the board",
            Self::UnknownTarget => "drop target is not valid for this item",
            Self::SamePosition => "item is already in that position",
            Self::ReadOnly => "board is read-only for this session",
        })
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DragIntent {
    /// Move the stage at `from` to `to` within the stage sequence.
    ReorderStages { stage_id: String, from: usize, to: usize },
    /// Move a lead to the slot of `over_lead_id` inside the same stage.
    ReorderLeads {
        stage_id: String,
        lead_id: String,
        over_lead_id: String,
        from: usize,
        to: usize,
    },
    /// Reassign a lead to another stage.
    MoveLead {
        lead_id: String,
        from_stage: String,
        to_stage: String,
    },
    Ignore(IgnoreReason),
}

impl DragIntent {
    pub fn label(&self) -> &'static str {
        match self {
            Self::ReorderStages { .. } => "reorder_stages",
            Self::ReorderLeads { .. } => "reorder_leads",
            Self::MoveLead { .. } => "move_lead",
            Self::Ignore(_) => "ignore",
        }
    }
}

/// Turn a drag-end event into an intent against the current board.
pub fn classify(board: &BoardState, event: &DragEnd) -> DragIntent {
    let active = event.active_id.as_str();

    if !board.is_stage(active) && !board.is_lead(active) {
        return DragIntent::Ignore(IgnoreReason::UnknownActive);
    }
    if !board.can_edit() {
        return DragIntent::Ignore(IgnoreReason::ReadOnly);
    }
    let Some(over) = event.over_id.as_deref() else {
        return DragIntent::Ignore(IgnoreReason::NoTarget);
    };

    if board.is_stage(active) {
        classify_stage_drag(board, active, over)
    } else {
        classify_lead_drag(board, active, over)
    }
}

fn classify_stage_drag(board: &BoardState, active: &str, over: &str) -> DragIntent {
    let (Some(from), Some(to)) = (board.stage_index(active), board.stage_index(over)) else {
        return DragIntent::Ignore(IgnoreReason::UnknownTarget);
    };
    if from == to {
        return DragIntent::Ignore(IgnoreReason::SamePosition);
    }
    DragIntent::ReorderStages {
        stage_id: active.to_string(),
        from,
        to,
    }
}

fn classify_lead_drag(board: &BoardState, active: &str, over: &str) -> DragIntent {
    let Some(source) = board
        .lead(active)
        .and_then(|l| board.stage(&l.stage_id))
        .map(|s| s.id.clone())
    else {
        return DragIntent::Ignore(IgnoreReason::UnknownActive);
    };

    // The target is either a stage column or a lead sitting in one.
    let over_lead = board.lead(over);
    let target = if board.is_stage(over) {
        Some(over.to_string())
    } else {
        over_lead
            .and_then(|l| board.stage(&l.stage_id))
            .map(|s| s.id.clone())
    };
    let Some(target) = target else {
        return DragIntent::Ignore(IgnoreReason::UnknownTarget);
    };

    if source != target {
        return DragIntent::MoveLead {
            lead_id: active.to_string(),
            from_stage: source,
            to_stage: target,
        };
    }

    // Same stage: only a drop onto another lead reorders.
    let Some(over_lead) = over_lead else {
        return DragIntent::Ignore(IgnoreReason::SamePosition);
    };
    match (board.index_in_stage(active), board.index_in_stage(&over_lead.id)) {
        (Some(from), Some(to)) if from != to => DragIntent::ReorderLeads {
            stage_id: source,
            lead_id: active.to_string(),
            over_lead_id: over_lead.id.clone(),
            from,
            to,
        },
        _ => DragIntent::Ignore(IgnoreReason::SamePosition),
    }
}
