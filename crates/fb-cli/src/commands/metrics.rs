use fb_api_types::{DashboardMetrics, FunnelPerformance, LeadCountByStage};
use fb_core::board::metrics::{
    funnel_metrics, recent_leads, stage_flow, stage_lead_counts, FunnelMetrics, RecentLead, StageFlow,
};
use fb_core::board::{BoardController, NoticeBoard};
use serde::Serialize;

use super::{fit, friendly_error, Context};

#[derive(Serialize)]
struct FunnelReport {
    metrics: FunnelMetrics,
    stages: Vec<LeadCountByStage>,
    flow: Vec<StageFlow>,
    recent: Vec<RecentLead>,
}

#[derive(Serialize)]
struct DashboardReport {
    metrics: DashboardMetrics,
    funnels: Vec<FunnelPerformance>,
}

/// Metrics for one funnel when `funnel_id` is given, otherwise the
/// tenant-wide dashboard.
pub async fn show(ctx: &Context, funnel_id: Option<&str>) -> anyhow::Result<()> {
    match funnel_id {
        Some(id) => funnel(ctx, id).await,
        None => dashboard(ctx).await,
    }
}

async fn funnel(ctx: &Context, funnel_id: &str) -> anyhow::Result<()> {
    let notices = NoticeBoard::new(ctx.config.board.notice_history);
    let controller = BoardController::load(ctx.client.clone(), funnel_id, notices)
        .await
        .map_err(friendly_error)?;
    let board = controller.snapshot().await;
    let (stages, leads) = (board.stages(), board.leads());

    let report = FunnelReport {
        metrics: funnel_metrics(stages, leads),
        stages: stage_lead_counts(stages, leads),
        flow: stage_flow(stages, leads),
        recent: recent_leads(stages, board.lead_fields(), leads, ctx.config.board.recent_leads),
    };
    if ctx.emit_json(&report)? {
        return Ok(());
    }

    let m = &report.metrics;
    println!("Total leads:     {}", m.total_leads);
    println!("Active leads:    {}", m.active_leads);
    println!("Conversion rate: {:.1}%", m.conversion_rate * 100.0);
    println!("Stages:          {}", m.stages_count);

    println!();
    println!("{}  {:>6}  {:>7}", fit("STAGE", 24), "LEADS", "FLOW");
    for f in &report.flow {
        println!("{}  {:>6}  {:>6.1}%", fit(&f.stage_name, 24), f.lead_count, f.percent_of_total);
    }

    if !report.recent.is_empty() {
        println!();
        println!("Recent leads:");
        for r in &report.recent {
            let summary: Vec<String> = r.fields.iter().map(|f| format!("{}={}", f.name, f.value)).collect();
            println!(
                "  {}  {}  {}",
                fit(&r.lead_id, 24),
                fit(r.stage_name.as_deref().unwrap_or("-"), 16),
                summary.join(", ")
            );
        }
    }
    Ok(())
}

async fn dashboard(ctx: &Context) -> anyhow::Result<()> {
    let (metrics, funnels) = tokio::try_join!(ctx.client.dashboard_metrics(), ctx.client.funnel_performance())
        .map_err(friendly_error)?;
    let report = DashboardReport { metrics, funnels };
    if ctx.emit_json(&report)? {
        return Ok(());
    }

    let m = &report.metrics;
    println!("Funnels:         {}", m.total_funnels);
    println!("Total leads:     {}", m.total_leads);
    println!("Active leads:    {}", m.active_leads);
    println!("Conversion rate: {:.1}%", m.conversion_rate);
    for f in &report.funnels {
        println!();
        println!("{}", f.funnel_name);
        for s in &f.stages {
            println!("  {}  {:>6}", fit(&s.stage_name, 24), s.lead_count);
        }
    }
    Ok(())
}
