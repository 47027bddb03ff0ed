//! Board mutations as explicit commands.
//!
//! A command is applied to local state, committed to the backend, and then
//! either confirmed or rolled back. The controller drives the sequence; the
//! commands only describe what each phase does to the board.

use std::collections::BTreeSet;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use fb_api_types::StageOrder;
use tokio::sync::watch;

use super::api::BoardApi;
use super::reorder::{move_item, StageReorderPlan};
use super::state::BoardState;
use crate::error::ApiError;

#[async_trait]
pub trait BoardCommand: Send + Sync {
    /// Short machine name used in logs.
    fn name(&self) -> &'static str;

    /// Title of the notice shown when the command fails.
    fn failure_title(&self) -> String;

    /// Optimistic local change, before any network call.
    fn apply(&self, _board: &mut BoardState) {}

    /// The network call. Commands with no backend side return `Ok(())`.
    async fn commit(&self, api: &dyn BoardApi) -> Result<(), ApiError>;

    /// Local change made only once the backend accepted the command.
    fn confirm(&self, _board: &mut BoardState) {}

    /// Undo of `apply` after the backend rejected the command.
    fn rollback(&self, _board: &mut BoardState) {}
}

// ---------------------------------------------------------------------------
// Stage reorder
// ---------------------------------------------------------------------------

/// Bulk stage reorder. Nothing changes locally until the backend accepts the
/// new order.
pub struct ReorderStages {
    funnel_id: String,
    plan: StageReorderPlan,
}

impl ReorderStages {
    pub fn new(funnel_id: impl Into<String>, plan: StageReorderPlan) -> Self {
        Self {
            funnel_id: funnel_id.into(),
            plan,
        }
    }

    pub fn orders(&self) -> &[StageOrder] {
        &self.plan.orders
    }
}

#[async_trait]
impl BoardCommand for ReorderStages {
    fn name(&self) -> &'static str {
        "reorder_stages"
    }

    fn failure_title(&self) -> String {
        "Could not reorder stages".to_string()
    }

    async fn commit(&self, api: &dyn BoardApi) -> Result<(), ApiError> {
        api.reorder_stages(&self.funnel_id, &self.plan.orders).await
    }

    fn confirm(&self, board: &mut BoardState) {
        board.apply_stage_orders(&self.plan.orders);
    }
}

// ---------------------------------------------------------------------------
// Lead reorder within a stage
// ---------------------------------------------------------------------------

/// Intra-stage lead reorder. Local and ephemeral: there is no backend call
/// and the order does not survive a reload.
pub struct ReorderLeads {
    pub stage_id: String,
    pub lead_id: String,
    pub over_lead_id: String,
}

#[async_trait]
impl BoardCommand for ReorderLeads {
    fn name(&self) -> &'static str {
        "reorder_leads"
    }

    fn failure_title(&self) -> String {
        "Could not reorder leads".to_string()
    }

    fn apply(&self, board: &mut BoardState) {
        // Indices are resolved against the latest state, not the snapshot
        // the drag was classified on.
        let mut sublist: Vec<_> = board.leads_in_stage(&self.stage_id).cloned().collect();
        let from = sublist.iter().position(|l| l.id == self.lead_id);
        let to = sublist.iter().position(|l| l.id == self.over_lead_id);
        if let (Some(from), Some(to)) = (from, to) {
            if from != to && move_item(&mut sublist, from, to) {
                board.replace_stage_leads(&self.stage_id, sublist);
            }
        }
    }

    async fn commit(&self, _api: &dyn BoardApi) -> Result<(), ApiError> {
        Ok(())
    }
}

// ---------------------------------------------------------------------------
// Lead move across stages
// ---------------------------------------------------------------------------

/// Per-lead bookkeeping. Move requests for one lead are sent strictly in
/// ticket order, and the book remembers the last stage the backend accepted.
pub struct MoveLane {
    served: watch::Sender<u64>,
    book: Mutex<LaneBook>,
}

#[derive(Default)]
struct LaneBook {
    issued: u64,
    in_flight: usize,
    confirmed: String,
    finished: BTreeSet<u64>,
}

impl Default for MoveLane {
    fn default() -> Self {
        Self {
            served: watch::channel(0).0,
            book: Mutex::new(LaneBook::default()),
        }
    }
}

impl MoveLane {
    /// Register a new move and return its ticket. With nothing in flight the
    /// local stage is what the server holds.
    fn issue(&self, current_stage: &str) -> u64 {
        let mut book = self.book.lock().expect("MoveLane lock poisoned");
        if book.in_flight == 0 {
            book.confirmed = current_stage.to_string();
        }
        book.in_flight += 1;
        book.issued += 1;
        book.issued
    }

    /// Wait until every earlier ticket has finished. The returned guard
    /// finishes `ticket` when dropped, even if the caller is cancelled.
    async fn turn(self: &Arc<Self>, ticket: u64) -> Turn {
        let turn = Turn {
            lane: Arc::clone(self),
            ticket,
        };
        let mut rx = self.served.subscribe();
        // The sender lives as long as `self`, so this cannot fail.
        let _ = rx.wait_for(|served| served + 1 >= ticket).await;
        turn
    }

    fn confirm(&self, stage: &str) {
        let mut book = self.book.lock().expect("MoveLane lock poisoned");
        book.confirmed = stage.to_string();
    }

    fn finish(&self, ticket: u64) {
        let mut book = self.book.lock().expect("MoveLane lock poisoned");
        book.in_flight = book.in_flight.saturating_sub(1);
        book.finished.insert(ticket);
        let mut served = *self.served.borrow();
        while book.finished.remove(&(served + 1)) {
            served += 1;
        }
        self.served.send_replace(served);
    }

    /// Where a failed move should revert to, or `None` when a newer move
    /// for the same lead owns the local state.
    fn revert_target(&self, ticket: u64) -> Option<String> {
        let book = self.book.lock().expect("MoveLane lock poisoned");
        (book.issued == ticket).then(|| book.confirmed.clone())
    }

    /// Moves issued but not yet settled.
    pub fn in_flight(&self) -> usize {
        self.book.lock().expect("MoveLane lock poisoned").in_flight
    }
}

/// Holds a lane ticket open. Dropping it lets the next move for the lead
/// go out, so it must outlive the local confirm or rollback.
struct Turn {
    lane: Arc<MoveLane>,
    ticket: u64,
}

impl Drop for Turn {
    fn drop(&mut self) {
        self.lane.finish(self.ticket);
    }
}

/// Optimistic lead move: the lead shows in its new stage immediately and
/// returns to the last confirmed stage if the backend refuses.
pub struct MoveLead {
    funnel_id: String,
    lead_id: String,
    from_stage: String,
    to_stage: String,
    lane: Arc<MoveLane>,
    ticket: AtomicU64,
    turn: Mutex<Option<Turn>>,
}

impl MoveLead {
    pub fn new(
        funnel_id: impl Into<String>,
        lead_id: impl Into<String>,
        from_stage: impl Into<String>,
        to_stage: impl Into<String>,
        lane: Arc<MoveLane>,
    ) -> Self {
        Self {
            funnel_id: funnel_id.into(),
            lead_id: lead_id.into(),
            from_stage: from_stage.into(),
            to_stage: to_stage.into(),
            lane,
            ticket: AtomicU64::new(0),
            turn: Mutex::new(None),
        }
    }

    /// Finish this move's ticket. Called with the board write lock held, so
    /// a move issued next sees the settled stage.
    fn settle(&self) {
        self.turn.lock().expect("MoveLead lock poisoned").take();
    }
}

#[async_trait]
impl BoardCommand for MoveLead {
    fn name(&self) -> &'static str {
        "move_lead"
    }

    fn failure_title(&self) -> String {
        "Could not move lead".to_string()
    }

    fn apply(&self, board: &mut BoardState) {
        let current = board
            .lead(&self.lead_id)
            .map(|l| l.stage_id.clone())
            .unwrap_or_else(|| self.from_stage.clone());
        let ticket = self.lane.issue(&current);
        self.ticket.store(ticket, Ordering::SeqCst);
        board.set_lead_stage(&self.lead_id, &self.to_stage);
    }

    async fn commit(&self, api: &dyn BoardApi) -> Result<(), ApiError> {
        let turn = self.lane.turn(self.ticket.load(Ordering::SeqCst)).await;
        *self.turn.lock().expect("MoveLead lock poisoned") = Some(turn);
        let result = api
            .move_lead(&self.lead_id, &self.to_stage, &self.funnel_id)
            .await;
        if result.is_ok() {
            self.lane.confirm(&self.to_stage);
        }
        result
    }

    fn confirm(&self, _board: &mut BoardState) {
        self.settle();
    }

    fn rollback(&self, board: &mut BoardState) {
        let ticket = self.ticket.load(Ordering::SeqCst);
        match self.lane.revert_target(ticket) {
            Some(stage) => {
                board.set_lead_stage(&self.lead_id, &stage);
            }
            None => tracing::debug!(
                lead_id = %self.lead_id,
                ticket,
                "newer move pending, leaving lead in place"
            ),
        }
        self.settle();
    }
}
