//! Integration tests for the board controller against an in-memory backend.
//!
//! `FakeApi` records every request, can be scripted to reject moves or
//! reorders, and can hold move requests until the test releases them so
//! overlapping drags can be observed mid-flight.

use std::collections::VecDeque;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;
use fb_api_types::{AccessLevel, Funnel, Lead, Stage, StageOrder};
use fb_core::board::{
    BoardApi, BoardController, DragEnd, DragIntent, DragOutcome, IgnoreReason, NoticeBoard, Severity,
};
use fb_core::error::ApiError;
use tokio::sync::Semaphore;

// ===========================================================================
// Fake backend
// ===========================================================================

#[derive(Debug, Clone, PartialEq)]
enum Call {
    Reorder(Vec<StageOrder>),
    Move { lead_id: String, stage_id: String },
}

struct FakeApi {
    stages: Mutex<Vec<Stage>>,
    leads: Mutex<Vec<Lead>>,
    access: Option<AccessLevel>,
    calls: Mutex<Vec<Call>>,
    move_results: Mutex<VecDeque<Result<(), ApiError>>>,
    fail_reorder: AtomicBool,
    fail_reads: AtomicBool,
    move_gate: Option<Semaphore>,
}

impl FakeApi {
    fn new(access: Option<AccessLevel>) -> Self {
        Self {
            stages: Mutex::new(vec![
                stage("prospect", "Prospect", 1),
                stage("qualified", "Qualified", 2),
                stage("closed", "Closed", 3),
            ]),
            leads: Mutex::new(vec![
                lead("l1", "prospect"),
                lead("l2", "prospect"),
                lead("l3", "qualified"),
            ]),
            access,
            calls: Mutex::new(Vec::new()),
            move_results: Mutex::new(VecDeque::new()),
            fail_reorder: AtomicBool::new(false),
            fail_reads: AtomicBool::new(false),
            move_gate: None,
        }
    }

    /// Hold every move request until [`FakeApi::release`] hands out permits.
    fn gated(mut self) -> Self {
        self.move_gate = Some(Semaphore::new(0));
        self
    }

    fn release(&self, n: usize) {
        if let Some(gate) = &self.move_gate {
            gate.add_permits(n);
        }
    }

    fn script_moves(&self, results: impl IntoIterator<Item = Result<(), ApiError>>) {
        self.move_results.lock().unwrap().extend(results);
    }

    fn calls(&self) -> Vec<Call> {
        self.calls.lock().unwrap().clone()
    }

    fn server_stage_of(&self, lead_id: &str) -> String {
        self.leads
            .lock()
            .unwrap()
            .iter()
            .find(|l| l.id == lead_id)
            .map(|l| l.stage_id.clone())
            .unwrap()
    }
}

#[async_trait]
impl BoardApi for FakeApi {
    async fn get_funnel(&self, funnel_id: &str) -> Result<Funnel, ApiError> {
        if self.fail_reads.load(Ordering::SeqCst) {
            return Err(ApiError::Transport("connection refused".into()));
        }
        Ok(Funnel {
            id: funnel_id.to_string(),
            name: "Sales".into(),
            description: None,
            stages: self.stages.lock().unwrap().clone(),
            lead_fields: vec![],
            leads: vec![],
        })
    }

    async fn list_stages(&self, _funnel_id: &str) -> Result<Vec<Stage>, ApiError> {
        Ok(self.stages.lock().unwrap().clone())
    }

    async fn list_leads(&self, _funnel_id: &str) -> Result<Vec<Lead>, ApiError> {
        Ok(self.leads.lock().unwrap().clone())
    }

    async fn current_permission(&self, _funnel_id: &str) -> Option<AccessLevel> {
        self.access
    }

    async fn reorder_stages(&self, _funnel_id: &str, stages: &[StageOrder]) -> Result<(), ApiError> {
        self.calls.lock().unwrap().push(Call::Reorder(stages.to_vec()));
        if self.fail_reorder.load(Ordering::SeqCst) {
            return Err(ApiError::rejected(500, ""));
        }
        let mut server = self.stages.lock().unwrap();
        for s in server.iter_mut() {
            if let Some(o) = stages.iter().find(|o| o.id == s.id) {
                s.order = o.order;
            }
        }
        Ok(())
    }

    async fn move_lead(&self, lead_id: &str, stage_id: &str, _funnel_id: &str) -> Result<(), ApiError> {
        if let Some(gate) = &self.move_gate {
            gate.acquire().await.unwrap().forget();
        }
        self.calls.lock().unwrap().push(Call::Move {
            lead_id: lead_id.to_string(),
            stage_id: stage_id.to_string(),
        });
        let result = self.move_results.lock().unwrap().pop_front().unwrap_or(Ok(()));
        if result.is_ok() {
            let mut leads = self.leads.lock().unwrap();
            if let Some(l) = leads.iter_mut().find(|l| l.id == lead_id) {
                l.stage_id = stage_id.to_string();
            }
        }
        result
    }
}

fn stage(id: &str, name: &str, order: i32) -> Stage {
    Stage {
        id: id.into(),
        name: name.into(),
        order,
        color: "#3B82F6".into(),
    }
}

fn lead(id: &str, stage_id: &str) -> Lead {
    Lead {
        id: id.into(),
        stage_id: stage_id.into(),
        data: vec![],
    }
}

async fn controller(api: Arc<FakeApi>) -> Arc<BoardController> {
    let ctl = BoardController::load(api, "f1", NoticeBoard::default())
        .await
        .expect("board loads");
    Arc::new(ctl)
}

async fn local_stage_of(ctl: &BoardController, lead_id: &str) -> String {
    ctl.snapshot().await.lead(lead_id).unwrap().stage_id.clone()
}

async fn wait_for_in_flight(ctl: &BoardController, lead_id: &str, n: usize) {
    for _ in 0..400 {
        if ctl.moves_in_flight(lead_id) == n {
            return;
        }
        tokio::time::sleep(Duration::from_millis(5)).await;
    }
    panic!("never reached {n} moves in flight for {lead_id}");
}

// ===========================================================================
// Loading
// ===========================================================================

#[tokio::test]
async fn load_sorts_stages_and_records_access() {
    let api = Arc::new(FakeApi::new(Some(AccessLevel::Edit)));
    api.stages.lock().unwrap().reverse();
    let ctl = controller(api).await;
    let board = ctl.snapshot().await;
    let ids: Vec<_> = board.stages().iter().map(|s| s.id.as_str()).collect();
    assert_eq!(ids, ["prospect", "qualified", "closed"]);
    assert_eq!(board.access(), Some(AccessLevel::Edit));
    assert_eq!(board.leads().len(), 3);
}

#[tokio::test]
async fn load_fails_when_backend_is_down() {
    let api = Arc::new(FakeApi::new(Some(AccessLevel::Owner)));
    api.fail_reads.store(true, Ordering::SeqCst);
    let err = BoardController::load(api, "f1", NoticeBoard::default()).await.err();
    assert!(matches!(err, Some(ApiError::Transport(_))));
}

#[tokio::test]
async fn reload_failure_publishes_notice_and_keeps_state() {
    let api = Arc::new(FakeApi::new(Some(AccessLevel::Owner)));
    let ctl = controller(api.clone()).await;
    api.fail_reads.store(true, Ordering::SeqCst);

    assert!(ctl.reload().await.is_err());
    assert_eq!(ctl.snapshot().await.leads().len(), 3);
    assert_eq!(ctl.notices().active().len(), 1);
}

#[tokio::test]
async fn reload_picks_up_server_changes() {
    let api = Arc::new(FakeApi::new(Some(AccessLevel::Owner)));
    let ctl = controller(api.clone()).await;
    api.leads.lock().unwrap().push(lead("l4", "closed"));

    ctl.reload().await.unwrap();
    assert_eq!(local_stage_of(&ctl, "l4").await, "closed");
}

// ===========================================================================
// Lead moves
// ===========================================================================

#[tokio::test]
async fn move_success_lands_in_destination() {
    let api = Arc::new(FakeApi::new(Some(AccessLevel::Owner)));
    let ctl = controller(api.clone()).await;

    let outcome = ctl.handle_drag_end(DragEnd::new("l1", "closed")).await;
    assert!(outcome.is_committed());
    assert_eq!(local_stage_of(&ctl, "l1").await, "closed");
    assert_eq!(api.server_stage_of("l1"), "closed");
    assert!(ctl.notices().active().is_empty());
}

#[tokio::test]
async fn move_onto_lead_targets_that_leads_stage() {
    let api = Arc::new(FakeApi::new(Some(AccessLevel::Edit)));
    let ctl = controller(api.clone()).await;

    ctl.handle_drag_end(DragEnd::new("l1", "l3")).await;
    assert_eq!(
        api.calls(),
        [Call::Move {
            lead_id: "l1".into(),
            stage_id: "qualified".into()
        }]
    );
}

#[tokio::test]
async fn move_rejected_with_500_rolls_back() {
    let api = Arc::new(FakeApi::new(Some(AccessLevel::Owner)));
    api.script_moves([Err(ApiError::rejected(500, "Internal Server Error"))]);
    let ctl = controller(api.clone()).await;

    let outcome = ctl.move_lead("l1", "qualified").await;
    match outcome {
        DragOutcome::Failed { intent, error } => {
            assert_eq!(intent.label(), "move_lead");
            assert_eq!(error.status(), Some(500));
        }
        other => panic!("expected failure, got {other:?}"),
    }
    assert_eq!(local_stage_of(&ctl, "l1").await, "prospect");

    let notices = ctl.notices().active();
    assert_eq!(notices.len(), 1);
    assert_eq!(notices[0].severity, Severity::Error);
    assert_eq!(notices[0].message, "Internal Server Error");
}

#[tokio::test]
async fn every_move_either_lands_or_fully_reverts() {
    let targets = ["prospect", "qualified", "closed"];
    for lead_id in ["l1", "l2", "l3"] {
        for to in targets {
            for fail in [false, true] {
                let api = Arc::new(FakeApi::new(Some(AccessLevel::Owner)));
                if fail {
                    api.script_moves([Err(ApiError::rejected(500, ""))]);
                }
                let ctl = controller(api.clone()).await;
                let before = local_stage_of(&ctl, lead_id).await;

                ctl.move_lead(lead_id, to).await;

                let after = local_stage_of(&ctl, lead_id).await;
                if before == to || fail {
                    assert_eq!(after, before, "{lead_id} -> {to} fail={fail}");
                } else {
                    assert_eq!(after, to, "{lead_id} -> {to}");
                }
            }
        }
    }
}

#[tokio::test]
async fn unauthorized_move_reverts_with_session_message() {
    let api = Arc::new(FakeApi::new(Some(AccessLevel::Owner)));
    api.script_moves([Err(ApiError::Unauthorized)]);
    let ctl = controller(api).await;

    ctl.move_lead("l2", "closed").await;
    assert_eq!(local_stage_of(&ctl, "l2").await, "prospect");
    assert_eq!(
        ctl.notices().active()[0].message,
        "Session expired. Please login again."
    );
}

#[tokio::test]
async fn optimistic_stage_is_visible_while_request_is_pending() {
    let api = Arc::new(FakeApi::new(Some(AccessLevel::Owner)).gated());
    let ctl = controller(api.clone()).await;

    let task = {
        let ctl = ctl.clone();
        tokio::spawn(async move { ctl.move_lead("l1", "closed").await })
    };
    wait_for_in_flight(&ctl, "l1", 1).await;
    assert_eq!(local_stage_of(&ctl, "l1").await, "closed");
    assert_eq!(api.server_stage_of("l1"), "prospect");

    api.release(1);
    assert!(task.await.unwrap().is_committed());
    assert_eq!(ctl.moves_in_flight("l1"), 0);
}

#[tokio::test]
async fn overlapping_moves_are_sent_in_issue_order() {
    let api = Arc::new(FakeApi::new(Some(AccessLevel::Owner)).gated());
    api.script_moves([Err(ApiError::rejected(500, "")), Ok(())]);
    let ctl = controller(api.clone()).await;

    let first = {
        let ctl = ctl.clone();
        tokio::spawn(async move { ctl.move_lead("l1", "qualified").await })
    };
    wait_for_in_flight(&ctl, "l1", 1).await;
    let second = {
        let ctl = ctl.clone();
        tokio::spawn(async move { ctl.move_lead("l1", "closed").await })
    };
    wait_for_in_flight(&ctl, "l1", 2).await;
    assert_eq!(local_stage_of(&ctl, "l1").await, "closed");

    api.release(2);
    assert!(matches!(first.await.unwrap(), DragOutcome::Failed { .. }));
    assert!(second.await.unwrap().is_committed());

    assert_eq!(
        api.calls(),
        [
            Call::Move {
                lead_id: "l1".into(),
                stage_id: "qualified".into()
            },
            Call::Move {
                lead_id: "l1".into(),
                stage_id: "closed".into()
            },
        ]
    );
    // The stale failure must not drag the lead back over the newer move.
    assert_eq!(local_stage_of(&ctl, "l1").await, "closed");
    assert_eq!(api.server_stage_of("l1"), "closed");
    assert_eq!(ctl.notices().active().len(), 1);
}

#[tokio::test]
async fn failed_latest_move_reverts_to_last_confirmed_stage() {
    let api = Arc::new(FakeApi::new(Some(AccessLevel::Owner)).gated());
    api.script_moves([Ok(()), Err(ApiError::rejected(409, "stage locked"))]);
    let ctl = controller(api.clone()).await;

    let first = {
        let ctl = ctl.clone();
        tokio::spawn(async move { ctl.move_lead("l1", "qualified").await })
    };
    wait_for_in_flight(&ctl, "l1", 1).await;
    let second = {
        let ctl = ctl.clone();
        tokio::spawn(async move { ctl.move_lead("l1", "closed").await })
    };
    wait_for_in_flight(&ctl, "l1", 2).await;

    api.release(2);
    first.await.unwrap();
    second.await.unwrap();

    assert_eq!(api.server_stage_of("l1"), "qualified");
    assert_eq!(local_stage_of(&ctl, "l1").await, "qualified");
}

#[tokio::test]
async fn move_queued_behind_a_pending_rollback_reverts_to_server_stage() {
    let api = Arc::new(FakeApi::new(Some(AccessLevel::Owner)).gated());
    api.script_moves([
        Err(ApiError::rejected(500, "")),
        Err(ApiError::rejected(500, "")),
    ]);
    let ctl = controller(api.clone()).await;

    let first = {
        let ctl = ctl.clone();
        tokio::spawn(async move { ctl.move_lead("l1", "qualified").await })
    };
    wait_for_in_flight(&ctl, "l1", 1).await;

    // Hold a reader so the second drag classifies and then waits for the
    // write lock ahead of the first move's rollback.
    let state = ctl.state();
    let reader = state.read().await;
    let second = {
        let ctl = ctl.clone();
        tokio::spawn(async move { ctl.move_lead("l1", "closed").await })
    };
    tokio::time::sleep(Duration::from_millis(30)).await;

    api.release(2);
    for _ in 0..400 {
        if !api.calls().is_empty() {
            break;
        }
        tokio::time::sleep(Duration::from_millis(5)).await;
    }
    tokio::time::sleep(Duration::from_millis(30)).await;
    drop(reader);

    assert!(matches!(first.await.unwrap(), DragOutcome::Failed { .. }));
    assert!(matches!(second.await.unwrap(), DragOutcome::Failed { .. }));

    assert_eq!(api.server_stage_of("l1"), "prospect");
    assert_eq!(local_stage_of(&ctl, "l1").await, "prospect");
    assert_eq!(ctl.moves_in_flight("l1"), 0);
}

#[tokio::test]
async fn settled_moves_release_their_lanes() {
    let api = Arc::new(FakeApi::new(Some(AccessLevel::Owner)).gated());
    api.script_moves([Ok(()), Err(ApiError::rejected(500, ""))]);
    let ctl = controller(api.clone()).await;

    let pending = {
        let ctl = ctl.clone();
        tokio::spawn(async move { ctl.move_lead("l1", "closed").await })
    };
    wait_for_in_flight(&ctl, "l1", 1).await;
    assert_eq!(ctl.tracked_lanes(), 1);

    api.release(2);
    assert!(pending.await.unwrap().is_committed());
    assert!(matches!(
        ctl.move_lead("l2", "qualified").await,
        DragOutcome::Failed { .. }
    ));
    assert_eq!(ctl.tracked_lanes(), 0);

    // A fresh lane starts from the settled local stage.
    api.release(1);
    assert!(ctl.move_lead("l1", "qualified").await.is_committed());
    assert_eq!(local_stage_of(&ctl, "l1").await, "qualified");
    assert_eq!(ctl.tracked_lanes(), 0);
}

// ===========================================================================
// Stage reorders
// ===========================================================================

#[tokio::test]
async fn stage_reorder_sends_full_renumbered_list_then_applies() {
    let api = Arc::new(FakeApi::new(Some(AccessLevel::Owner)));
    let ctl = controller(api.clone()).await;

    let outcome = ctl.handle_drag_end(DragEnd::new("prospect", "closed")).await;
    assert_eq!(
        outcome,
        DragOutcome::Committed(DragIntent::ReorderStages {
            stage_id: "prospect".into(),
            from: 0,
            to: 2
        })
    );

    let expected = vec![
        StageOrder { id: "qualified".into(), order: 1 },
        StageOrder { id: "closed".into(), order: 2 },
        StageOrder { id: "prospect".into(), order: 3 },
    ];
    assert_eq!(api.calls(), [Call::Reorder(expected)]);

    let board = ctl.snapshot().await;
    let ids: Vec<_> = board.stages().iter().map(|s| (s.id.as_str(), s.order)).collect();
    assert_eq!(ids, [("qualified", 1), ("closed", 2), ("prospect", 3)]);
}

#[tokio::test]
async fn stage_reorder_failure_keeps_order_and_publishes_one_notice() {
    let api = Arc::new(FakeApi::new(Some(AccessLevel::Owner)));
    api.fail_reorder.store(true, Ordering::SeqCst);
    let ctl = controller(api).await;
    let before = ctl.snapshot().await.stages().to_vec();

    let outcome = ctl.move_stage("closed", 0).await;
    assert!(matches!(outcome, DragOutcome::Failed { .. }));
    assert_eq!(ctl.snapshot().await.stages(), before.as_slice());

    let notices = ctl.notices().active();
    assert_eq!(notices.len(), 1);
    assert_eq!(notices[0].title, "Could not reorder stages");
    assert_eq!(notices[0].message, "HTTP error! status: 500");
}

#[tokio::test]
async fn move_stage_past_the_end_is_ignored() {
    let api = Arc::new(FakeApi::new(Some(AccessLevel::Owner)));
    let ctl = controller(api.clone()).await;
    assert_eq!(
        ctl.move_stage("prospect", 9).await,
        DragOutcome::Ignored(IgnoreReason::NoTarget)
    );
    assert!(api.calls().is_empty());
}

// ===========================================================================
// Lead reorder, no-ops, permissions
// ===========================================================================

#[tokio::test]
async fn lead_reorder_is_local_only() {
    let api = Arc::new(FakeApi::new(Some(AccessLevel::Owner)));
    let ctl = controller(api.clone()).await;

    let outcome = ctl.handle_drag_end(DragEnd::new("l2", "l1")).await;
    assert!(outcome.is_committed());
    assert!(api.calls().is_empty());

    let board = ctl.snapshot().await;
    let order: Vec<_> = board.leads_in_stage("prospect").map(|l| l.id.as_str()).collect();
    assert_eq!(order, ["l2", "l1"]);

    // A reload restores server order.
    ctl.reload().await.unwrap();
    let board = ctl.snapshot().await;
    let order: Vec<_> = board.leads_in_stage("prospect").map(|l| l.id.as_str()).collect();
    assert_eq!(order, ["l1", "l2"]);
}

#[tokio::test]
async fn no_op_drags_change_nothing_and_send_nothing() {
    let api = Arc::new(FakeApi::new(Some(AccessLevel::Owner)));
    let ctl = controller(api.clone()).await;
    let before = ctl.snapshot().await;

    let cases = [
        (DragEnd::outside("l1"), IgnoreReason::NoTarget),
        (DragEnd::new("ghost", "closed"), IgnoreReason::UnknownActive),
        (DragEnd::new("l1", "nowhere"), IgnoreReason::UnknownTarget),
        (DragEnd::new("l1", "prospect"), IgnoreReason::SamePosition),
        (DragEnd::new("closed", "closed"), IgnoreReason::SamePosition),
    ];
    for (event, reason) in cases {
        assert_eq!(ctl.handle_drag_end(event).await, DragOutcome::Ignored(reason));
    }

    let after = ctl.snapshot().await;
    assert_eq!(after.leads(), before.leads());
    assert_eq!(after.stages(), before.stages());
    assert!(api.calls().is_empty());
    assert!(ctl.notices().all().is_empty());
}

#[tokio::test]
async fn read_only_sessions_send_no_requests() {
    for access in [Some(AccessLevel::View), None] {
        let api = Arc::new(FakeApi::new(access));
        let ctl = controller(api.clone()).await;

        for event in [
            DragEnd::new("l1", "closed"),
            DragEnd::new("prospect", "closed"),
            DragEnd::new("l2", "l1"),
        ] {
            assert_eq!(
                ctl.handle_drag_end(event).await,
                DragOutcome::Ignored(IgnoreReason::ReadOnly)
            );
        }
        assert!(api.calls().is_empty());
    }
}
