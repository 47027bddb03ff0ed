//! Drives drag gestures against one funnel's board.
//!
//! The controller owns the board state and a handle to the backend. Each
//! drag is classified against the latest state, turned into a
//! [`BoardCommand`], and executed through a single path: apply, commit,
//! then confirm or roll back and publish a notice. The state lock is never
//! held across a network call.

use std::sync::Arc;

use dashmap::DashMap;
use tokio::sync::RwLock;
use tracing::{debug, info, warn};

use super::api::BoardApi;
use super::command::{BoardCommand, MoveLane, MoveLead, ReorderLeads, ReorderStages};
use super::drag::{classify, DragEnd, DragIntent, IgnoreReason};
use super::notice::NoticeBoard;
use super::reorder::plan_stage_reorder;
use super::state::BoardState;
use crate::error::ApiError;

/// What became of a drag gesture.
#[derive(Debug, Clone, PartialEq)]
pub enum DragOutcome {
    /// Nothing changed and no request was sent.
    Ignored(IgnoreReason),
    /// The intent took effect (for lead reorders, locally only).
    Committed(DragIntent),
    /// The backend refused; any optimistic change was rolled back and a
    /// notice was published.
    Failed { intent: DragIntent, error: ApiError },
}

impl DragOutcome {
    pub fn is_committed(&self) -> bool {
        matches!(self, Self::Committed(_))
    }
}

pub struct BoardController {
    api: Arc<dyn BoardApi>,
    state: Arc<RwLock<BoardState>>,
    notices: NoticeBoard,
    lanes: DashMap<String, Arc<MoveLane>>,
}

impl BoardController {
    pub fn new(api: Arc<dyn BoardApi>, board: BoardState, notices: NoticeBoard) -> Self {
        Self {
            api,
            state: Arc::new(RwLock::new(board)),
            notices,
            lanes: DashMap::new(),
        }
    }

    /// Fetch funnel, stages, leads and the session's access level, and build
    /// a controller over them.
    pub async fn load(api: Arc<dyn BoardApi>, funnel_id: &str, notices: NoticeBoard) -> Result<Self, ApiError> {
        let board = fetch_board(api.as_ref(), funnel_id).await?;
        info!(
            funnel_id,
            stages = board.stages().len(),
            leads = board.leads().len(),
            access = ?board.access(),
            "board loaded"
        );
        Ok(Self::new(api, board, notices))
    }

    /// Replace local state with a fresh copy from the backend. Failures are
    /// published as a notice and leave the current state in place.
    pub async fn reload(&self) -> Result<(), ApiError> {
        let funnel_id = self.state.read().await.funnel_id().to_string();
        match fetch_board(self.api.as_ref(), &funnel_id).await {
            Ok(fresh) => {
                let mut board = self.state.write().await;
                board.set_stages(fresh.stages().to_vec());
                board.set_leads(fresh.leads().to_vec());
                board.set_lead_fields(fresh.lead_fields().to_vec());
                board.set_access(fresh.access());
                Ok(())
            }
            Err(e) => {
                self.notices.error("Could not reload board", &e);
                warn!(funnel_id = %funnel_id, error = %e, "board reload failed");
                Err(e)
            }
        }
    }

    /// A copy of the current board.
    pub async fn snapshot(&self) -> BoardState {
        self.state.read().await.clone()
    }

    /// Shared handle to the board state, for read-only observers.
    pub fn state(&self) -> Arc<RwLock<BoardState>> {
        Arc::clone(&self.state)
    }

    pub fn notices(&self) -> &NoticeBoard {
        &self.notices
    }

    /// Moves for `lead_id` that have been issued but not yet settled.
    pub fn moves_in_flight(&self, lead_id: &str) -> usize {
        self.lanes.get(lead_id).map(|l| l.in_flight()).unwrap_or(0)
    }

    /// Handle a finished drag gesture.
    pub async fn handle_drag_end(&self, event: DragEnd) -> DragOutcome {
        let (intent, funnel_id, stage_plan) = {
            let board = self.state.read().await;
            let intent = classify(&board, &event);
            let plan = match &intent {
                DragIntent::ReorderStages { from, to, .. } => plan_stage_reorder(board.stages(), *from, *to),
                _ => None,
            };
            (intent, board.funnel_id().to_string(), plan)
        };

        let command: Box<dyn BoardCommand> = match &intent {
            DragIntent::Ignore(reason) => {
                debug!(active_id = %event.active_id, over_id = ?event.over_id, %reason, "drag ignored");
                return DragOutcome::Ignored(*reason);
            }
            DragIntent::ReorderStages { .. } => match stage_plan {
                Some(plan) => Box::new(ReorderStages::new(funnel_id, plan)),
                None => return DragOutcome::Ignored(IgnoreReason::SamePosition),
            },
            DragIntent::ReorderLeads {
                stage_id,
                lead_id,
                over_lead_id,
                ..
            } => Box::new(ReorderLeads {
                stage_id: stage_id.clone(),
                lead_id: lead_id.clone(),
                over_lead_id: over_lead_id.clone(),
            }),
            DragIntent::MoveLead {
                lead_id,
                from_stage,
                to_stage,
            } => Box::new(MoveLead::new(
                funnel_id,
                lead_id.clone(),
                from_stage.clone(),
                to_stage.clone(),
                self.lane(lead_id),
            )),
        };

        let result = self.execute(command.as_ref()).await;
        drop(command);
        if let DragIntent::MoveLead { lead_id, .. } = &intent {
            self.release_lane(lead_id);
        }

        match result {
            Ok(()) => DragOutcome::Committed(intent),
            Err(error) => DragOutcome::Failed { intent, error },
        }
    }

    /// Move a stage to `to_index` by dropping it on whatever stage sits
    /// there now.
    pub async fn move_stage(&self, stage_id: &str, to_index: usize) -> DragOutcome {
        let over = {
            let board = self.state.read().await;
            board.stages().get(to_index).map(|s| s.id.clone())
        };
        match over {
            Some(over) => self.handle_drag_end(DragEnd::new(stage_id, over)).await,
            None => self.handle_drag_end(DragEnd::outside(stage_id)).await,
        }
    }

    /// Move a lead by dropping it on a stage column.
    pub async fn move_lead(&self, lead_id: &str, stage_id: &str) -> DragOutcome {
        self.handle_drag_end(DragEnd::new(lead_id, stage_id)).await
    }

    /// Run one command through apply, commit, and confirm or rollback.
    pub async fn execute(&self, command: &dyn BoardCommand) -> Result<(), ApiError> {
        {
            let mut board = self.state.write().await;
            command.apply(&mut board);
        }

        let result = command.commit(self.api.as_ref()).await;

        {
            let mut board = self.state.write().await;
            match &result {
                Ok(()) => command.confirm(&mut board),
                Err(_) => command.rollback(&mut board),
            }
        }

        match &result {
            Ok(()) => debug!(command = command.name(), "board command committed"),
            Err(e) => {
                self.notices.error(command.failure_title(), e);
                warn!(command = command.name(), status = ?e.status(), error = %e, "board command failed");
            }
        }
        result
    }

    /// Leads with a move lane currently allocated.
    pub fn tracked_lanes(&self) -> usize {
        self.lanes.len()
    }

    fn lane(&self, lead_id: &str) -> Arc<MoveLane> {
        Arc::clone(self.lanes.entry(lead_id.to_string()).or_default().value())
    }

    /// Drop the lane for `lead_id` once no command holds it. Clones happen
    /// under the same shard lock, so a lane in use is never removed.
    fn release_lane(&self, lead_id: &str) {
        self.lanes
            .remove_if(lead_id, |_, lane| Arc::strong_count(lane) == 1 && lane.in_flight() == 0);
    }
}

async fn fetch_board(api: &dyn BoardApi, funnel_id: &str) -> Result<BoardState, ApiError> {
    let (funnel, stages, leads) = tokio::try_join!(
        api.get_funnel(funnel_id),
        api.list_stages(funnel_id),
        api.list_leads(funnel_id),
    )?;
    let access = api.current_permission(funnel_id).await;
    Ok(BoardState::new(funnel.id, stages, leads)
        .with_lead_fields(funnel.lead_fields)
        .with_access(access))
}
