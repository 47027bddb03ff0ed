//! One funnel's board: state, drag classification, reorder/move commands,
//! the controller that runs them, and derived views and metrics.

pub mod api;
pub mod command;
pub mod controller;
pub mod drag;
pub mod metrics;
pub mod notice;
pub mod reorder;
pub mod state;
pub mod view;

pub use api::BoardApi;
pub use command::{BoardCommand, MoveLane, MoveLead, ReorderLeads, ReorderStages};
pub use controller::{BoardController, DragOutcome};
pub use drag::{classify, DragEnd, DragIntent, IgnoreReason};
pub use metrics::{funnel_metrics, recent_leads, stage_flow, stage_lead_counts, terminal_stage, FunnelMetrics};
pub use notice::{Notice, NoticeBoard, Severity};
pub use state::BoardState;
pub use view::{leads_by_stage, LeadCard, StageColumn, ViewCache};
