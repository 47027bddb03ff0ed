use anyhow::Context as _;
use fb_api_types::{CreateLeadRequest, LeadData, LeadField, Stage};
use fb_core::board::view::lead_card;
use fb_core::board::{BoardController, DragOutcome, NoticeBoard};

use super::{fit, friendly_error, Context};

pub async fn list(ctx: &Context, funnel_id: &str) -> anyhow::Result<()> {
    let (funnel, leads) = tokio::try_join!(ctx.client.get_funnel(funnel_id), ctx.client.list_leads(funnel_id))
        .map_err(friendly_error)?;
    let cards: Vec<_> = leads.iter().map(|l| lead_card(l, &funnel.lead_fields)).collect();
    if ctx.emit_json(&cards)? {
        return Ok(());
    }
    if cards.is_empty() {
        println!("No leads in {}.", funnel.name);
        return Ok(());
    }
    for card in &cards {
        let stage = stage_name(&funnel.stages, &card.stage_id);
        println!(
            "{}  {}  {}  {:>10.2}  {}",
            fit(&card.id, 24),
            fit(&card.name, 24),
            fit(&stage, 16),
            card.value,
            card.email.as_deref().unwrap_or("-")
        );
    }
    Ok(())
}

pub async fn show(ctx: &Context, funnel_id: &str, lead_id: &str) -> anyhow::Result<()> {
    let (funnel, lead) = tokio::try_join!(ctx.client.get_funnel(funnel_id), ctx.client.get_lead(lead_id, funnel_id))
        .map_err(friendly_error)?;
    let card = lead_card(&lead, &funnel.lead_fields);
    if ctx.emit_json(&card)? {
        return Ok(());
    }
    println!("{} ({})", card.name, card.id);
    println!("  stage: {}", stage_name(&funnel.stages, &card.stage_id));
    for f in &card.fields {
        println!("  {}: {}", f.name, f.value);
    }
    Ok(())
}

/// Create a lead from `name=value` pairs. Field names match
/// case-insensitively; field ids are accepted too.
pub async fn add(ctx: &Context, funnel_id: &str, stage: Option<&str>, pairs: &[String]) -> anyhow::Result<()> {
    let funnel = ctx.client.get_funnel(funnel_id).await.map_err(friendly_error)?;
    let stage_id = resolve_stage(&funnel.stages, stage)?;
    let lead_data = resolve_fields(&funnel.lead_fields, pairs)?;

    let request = CreateLeadRequest { stage_id, lead_data };
    let lead = ctx
        .client
        .create_lead(funnel_id, &request)
        .await
        .map_err(friendly_error)?;
    let card = lead_card(&lead, &funnel.lead_fields);
    println!("Lead created: {} ({})", card.name, card.id);
    Ok(())
}

/// Move a lead to another stage through the board controller, so a
/// rejected move is rolled back and reported like any board drag.
pub async fn move_to(ctx: &Context, funnel_id: &str, lead_id: &str, stage: &str) -> anyhow::Result<()> {
    let notices = NoticeBoard::new(ctx.config.board.notice_history);
    let controller = BoardController::load(ctx.client.clone(), funnel_id, notices)
        .await
        .map_err(friendly_error)?;
    let stage_id = {
        let board = controller.snapshot().await;
        resolve_stage(board.stages(), Some(stage))?
    };

    match controller.move_lead(lead_id, &stage_id).await {
        DragOutcome::Committed(_) => {
            println!("Lead {lead_id} moved to {stage}");
            Ok(())
        }
        DragOutcome::Ignored(reason) => {
            println!("Nothing to do: {reason}");
            Ok(())
        }
        DragOutcome::Failed { error, .. } => Err(friendly_error(error)),
    }
}

pub async fn remove(ctx: &Context, funnel_id: &str, lead_id: &str) -> anyhow::Result<()> {
    ctx.client
        .delete_lead(lead_id, funnel_id)
        .await
        .map_err(friendly_error)?;
    println!("Lead removed: {lead_id}");
    Ok(())
}

fn stage_name(stages: &[Stage], id: &str) -> String {
    stages
        .iter()
        .find(|s| s.id == id)
        .map(|s| s.name.clone())
        .unwrap_or_else(|| id.to_string())
}

/// A stage by id or case-insensitive name; the first stage when `None`.
fn resolve_stage(stages: &[Stage], wanted: Option<&str>) -> anyhow::Result<String> {
    let mut sorted: Vec<&Stage> = stages.iter().collect();
    sorted.sort_by_key(|s| s.order);
    let found = match wanted {
        None => sorted.first().copied(),
        Some(w) => sorted
            .iter()
            .find(|s| s.id == w || s.name.eq_ignore_ascii_case(w))
            .copied(),
    };
    found
        .map(|s| s.id.clone())
        .with_context(|| match wanted {
            Some(w) => format!("no stage named '{w}' in this funnel"),
            None => "funnel has no stages".to_string(),
        })
}

fn resolve_fields(fields: &[LeadField], pairs: &[String]) -> anyhow::Result<Vec<LeadData>> {
    let mut data = Vec::with_capacity(pairs.len());
    for pair in pairs {
        let (key, value) = pair
            .split_once('=')
            .with_context(|| format!("expected name=value, got '{pair}'"))?;
        let key = key.trim();
        let field = fields
            .iter()
            .find(|f| f.id == key || f.name.eq_ignore_ascii_case(key))
            .with_context(|| format!("unknown lead field '{key}'"))?;
        data.push(LeadData {
            field_id: field.id.clone(),
            value: value.trim().to_string(),
        });
    }

    let missing: Vec<&str> = fields
        .iter()
        .filter(|f| f.required)
        .filter(|f| !data.iter().any(|d| d.field_id == f.id && !d.value.is_empty()))
        .map(|f| f.name.as_str())
        .collect();
    if !missing.is_empty() {
        anyhow::bail!("missing required field(s): {}", missing.join(", "));
    }
    Ok(data)
}
