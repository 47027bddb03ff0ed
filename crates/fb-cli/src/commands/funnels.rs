use fb_api_types::UpdateFunnelRequest;
use fb_core::template::default_funnel;

use super::{fit, friendly_error, Context};

pub async fn list(ctx: &Context) -> anyhow::Result<()> {
    let funnels = ctx.client.list_funnels().await.map_err(friendly_error)?;
    if ctx.emit_json(&funnels)? {
        return Ok(());
    }
    if funnels.is_empty() {
        println!("No funnels yet. Create one with `fb funnels create <name>`.");
        return Ok(());
    }
    println!("{}  {}  {:>6}  {:>6}", fit("ID", 24), fit("NAME", 28), "STAGES", "LEADS");
    for f in &funnels {
        println!(
            "{}  {}  {:>6}  {:>6}",
            fit(&f.id, 24),
            fit(&f.name, 28),
            f.stages.len(),
            f.leads.len()
        );
    }
    Ok(())
}

pub async fn show(ctx: &Context, id: &str) -> anyhow::Result<()> {
    let funnel = ctx.client.get_funnel(id).await.map_err(friendly_error)?;
    if ctx.emit_json(&funnel)? {
        return Ok(());
    }
    println!("{} ({})", funnel.name, funnel.id);
    if let Some(desc) = funnel.description.as_deref().filter(|d| !d.is_empty()) {
        println!("  {desc}");
    }
    let mut stages = funnel.stages.clone();
    stages.sort_by_key(|s| s.order);
    println!("Stages:");
    for s in &stages {
        println!("  {:>2}. {} ({}) {}", s.order, s.name, s.id, s.color);
    }
    println!("Lead fields:");
    for f in &funnel.lead_fields {
        let req = if f.required { " *" } else { "" };
        println!("  - {} [{:?}]{req}", f.name, f.field_type);
    }
    Ok(())
}

/// Create a funnel with the default stages and lead fields.
pub async fn create(ctx: &Context, name: &str, description: Option<String>) -> anyhow::Result<()> {
    let request = default_funnel(name, description);
    let funnel = ctx.client.create_funnel(&request).await.map_err(friendly_error)?;
    if ctx.emit_json(&funnel)? {
        return Ok(());
    }
    println!("Funnel created: {}", funnel.id);
    println!("  name:   {}", funnel.name);
    println!("  stages: {}", funnel.stages.len());
    Ok(())
}

pub async fn rename(ctx: &Context, id: &str, name: Option<String>, description: Option<String>) -> anyhow::Result<()> {
    if name.is_none() && description.is_none() {
        anyhow::bail!("nothing to update: pass --name and/or --description");
    }
    let request = UpdateFunnelRequest {
        name,
        description,
        ..Default::default()
    };
    let funnel = ctx.client.update_funnel(id, &request).await.map_err(friendly_error)?;
    println!("Funnel updated: {} ({})", funnel.name, funnel.id);
    Ok(())
}

pub async fn delete(ctx: &Context, id: &str) -> anyhow::Result<()> {
    ctx.client.delete_funnel(id).await.map_err(friendly_error)?;
    println!("Funnel deleted: {id}");
    Ok(())
}
