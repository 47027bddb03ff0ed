use fb_api_types::{NewStage, UpdateStageRequest};
use fb_core::board::{BoardController, DragOutcome, NoticeBoard};

use super::{fit, friendly_error, Context};

const DEFAULT_COLOR: &str = "#6B7280";

pub async fn list(ctx: &Context, funnel_id: &str) -> anyhow::Result<()> {
    let mut stages = ctx.client.list_stages(funnel_id).await.map_err(friendly_error)?;
    stages.sort_by_key(|s| s.order);
    if ctx.emit_json(&stages)? {
        return Ok(());
    }
    for s in &stages {
        println!("{:>3}  {}  {}  {}", s.order, fit(&s.name, 24), fit(&s.id, 24), s.color);
    }
    Ok(())
}

/// Append a stage. Without `order` it goes after the current last stage.
pub async fn add(
    ctx: &Context,
    funnel_id: &str,
    name: &str,
    color: Option<String>,
    order: Option<i32>,
) -> anyhow::Result<()> {
    let order = match order {
        Some(o) => o,
        None => {
            let stages = ctx.client.list_stages(funnel_id).await.map_err(friendly_error)?;
            stages.iter().map(|s| s.order).max().unwrap_or(0) + 1
        }
    };
    let stage = NewStage {
        name: name.to_string(),
        order,
        color: color.unwrap_or_else(|| DEFAULT_COLOR.to_string()),
    };
    let created = ctx.client.create_stage(funnel_id, &stage).await.map_err(friendly_error)?;
    println!("Stage created: {} ({}) at position {}", created.name, created.id, created.order);
    Ok(())
}

pub async fn update(
    ctx: &Context,
    funnel_id: &str,
    stage_id: &str,
    name: Option<String>,
    color: Option<String>,
) -> anyhow::Result<()> {
    if name.is_none() && color.is_none() {
        anyhow::bail!("nothing to update: pass --name and/or --color");
    }
    let request = UpdateStageRequest {
        name,
        color,
        order: None,
    };
    let stage = ctx
        .client
        .update_stage(stage_id, funnel_id, &request)
        .await
        .map_err(friendly_error)?;
    println!("Stage updated: {} ({})", stage.name, stage.id);
    Ok(())
}

pub async fn remove(ctx: &Context, funnel_id: &str, stage_id: &str) -> anyhow::Result<()> {
    ctx.client
        .delete_stage(stage_id, funnel_id)
        .await
        .map_err(friendly_error)?;
    println!("Stage removed: {stage_id}");
    Ok(())
}

/// Move a stage to a 1-based `position`, renumbering every stage.
pub async fn reorder(ctx: &Context, funnel_id: &str, stage_id: &str, position: usize) -> anyhow::Result<()> {
    if position == 0 {
        anyhow::bail!("positions start at 1");
    }
    let notices = NoticeBoard::new(ctx.config.board.notice_history);
    let controller = BoardController::load(ctx.client.clone(), funnel_id, notices)
        .await
        .map_err(friendly_error)?;

    match controller.move_stage(stage_id, position - 1).await {
        DragOutcome::Committed(_) => {
            let board = controller.snapshot().await;
            println!("Stages reordered:");
            for s in board.stages() {
                println!("  {:>2}. {}", s.order, s.name);
            }
            Ok(())
        }
        DragOutcome::Ignored(reason) => {
            println!("Nothing to do: {reason}");
            Ok(())
        }
        DragOutcome::Failed { error, .. } => Err(friendly_error(error)),
    }
}
