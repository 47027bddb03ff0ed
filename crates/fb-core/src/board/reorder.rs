//! Array-move and renumbering for stage and lead reorders.

use fb_api_types::{Lead, Stage, StageOrder};

/// Move the element at `from` to `to`, shifting everything in between one
/// slot toward the vacated position. Returns `false` (and leaves `items`
/// untouched) when either index is out of range.
pub fn move_item<T>(items: &mut Vec<T>, from: usize, to: usize) -> bool {
    if from >= items.len() || to >= items.len() {
        return false;
    }
    if from != to {
        let item = items.remove(from);
        items.insert(to, item);
    }
    true
}

/// Assign each stage its 1-based position as `order`.
pub fn renumber(stages: &mut [Stage]) {
    for (index, stage) in stages.iter_mut().enumerate() {
        stage.order = index as i32 + 1;
    }
}

/// The result of moving one stage: the renumbered sequence and the bulk
/// `(id, order)` payload for the backend.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StageReorderPlan {
    pub stage_id: String,
    pub from: usize,
    pub to: usize,
    pub stages: Vec<Stage>,
    pub orders: Vec<StageOrder>,
}

/// Plan moving the stage at `from` to `to`. `None` when the indices are
/// equal or out of range.
pub fn plan_stage_reorder(stages: &[Stage], from: usize, to: usize) -> Option<StageReorderPlan> {
    if from == to {
        return None;
    }
    let mut reordered = stages.to_vec();
    if !move_item(&mut reordered, from, to) {
        return None;
    }
    renumber(&mut reordered);
    let orders = reordered
        .iter()
        .map(|s| StageOrder {
            id: s.id.clone(),
            order: s.order,
        })
        .collect();
    Some(StageReorderPlan {
        stage_id: reordered[to].id.clone(),
        from,
        to,
        stages: reordered,
        orders,
    })
}

/// Reorder the leads of one stage and return the new global lead list:
/// every other lead in its current order, followed by the reordered
/// sublist. `None` when the indices are equal or out of range.
pub fn plan_lead_reorder(leads: &[Lead], stage_id: &str, from: usize, to: usize) -> Option<Vec<Lead>> {
    if from == to {
        return None;
    }
    let mut sublist: Vec<Lead> = leads.iter().filter(|l| l.stage_id == stage_id).cloned().collect();
    if !move_item(&mut sublist, from, to) {
        return None;
    }
    let mut out: Vec<Lead> = leads.iter().filter(|l| l.stage_id != stage_id).cloned().collect();
    out.extend(sublist);
    Some(out)
}
