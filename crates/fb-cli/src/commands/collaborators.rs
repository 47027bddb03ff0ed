use fb_api_types::{CreateCollaboratorRequest, Permission};

use super::{fit, friendly_error, Context};

pub async fn list(ctx: &Context, funnel_id: &str) -> anyhow::Result<()> {
    let collaborators = ctx
        .client
        .list_collaborators(funnel_id)
        .await
        .map_err(friendly_error)?;
    if ctx.emit_json(&collaborators)? {
        return Ok(());
    }
    if collaborators.is_empty() {
        println!("No collaborators on this funnel.");
        return Ok(());
    }
    for c in &collaborators {
        println!(
            "{}  {}  {}  {}",
            fit(&c.id, 24),
            fit(&c.user.email, 28),
            fit(c.user.name.as_deref().unwrap_or("-"), 20),
            c.permission
        );
    }
    Ok(())
}

/// Grant an existing user access.
pub async fn add(ctx: &Context, funnel_id: &str, email: &str, permission: Permission) -> anyhow::Result<()> {
    let c = ctx
        .client
        .add_collaborator(funnel_id, email, permission)
        .await
        .map_err(friendly_error)?;
    println!("{} can now {} this funnel", c.user.email, verb(c.permission));
    Ok(())
}

/// Create an account for `email` and grant it access in one step.
pub async fn invite(ctx: &Context, funnel_id: &str, request: CreateCollaboratorRequest) -> anyhow::Result<()> {
    let created = ctx
        .client
        .create_and_add_collaborator(funnel_id, &request)
        .await
        .map_err(friendly_error)?;
    println!(
        "Account created for {} with {} access",
        created.collaborator.email, created.funnel_user.permission
    );
    Ok(())
}

pub async fn set_permission(
    ctx: &Context,
    funnel_id: &str,
    collaborator_id: &str,
    permission: Permission,
) -> anyhow::Result<()> {
    ctx.client
        .update_collaborator_permission(funnel_id, collaborator_id, permission)
        .await
        .map_err(friendly_error)?;
    println!("Collaborator {collaborator_id} now has {permission} access");
    Ok(())
}

pub async fn remove(ctx: &Context, funnel_id: &str, collaborator_id: &str) -> anyhow::Result<()> {
    ctx.client
        .remove_collaborator(funnel_id, collaborator_id)
        .await
        .map_err(friendly_error)?;
    println!("Collaborator removed: {collaborator_id}");
    Ok(())
}

fn verb(permission: Permission) -> &'static str {
    match permission {
        Permission::View => "view",
        Permission::Edit => "edit",
        Permission::Delete => "manage",
    }
}
