use fb_api_types::RegisterRequest;

use super::{friendly_error, Context};

pub async fn login(ctx: &Context, email: &str, password: &str) -> anyhow::Result<()> {
    let auth = ctx.client.login(email, password).await.map_err(friendly_error)?;
    if ctx.emit_json(&auth.user)? {
        return Ok(());
    }
    println!("Signed in as {}", auth.user.email);
    println!("  tenant: {}", auth.user.tenant.name);
    if let Some(store) = ctx.client.session_store() {
        println!("  session saved to {}", store.path().display());
    }
    Ok(())
}

pub async fn register(ctx: &Context, request: RegisterRequest) -> anyhow::Result<()> {
    let auth = ctx.client.register(&request).await.map_err(friendly_error)?;
    if ctx.emit_json(&auth.user)? {
        return Ok(());
    }
    println!("Account created for {}", auth.user.email);
    println!("  tenant: {}", auth.user.tenant.name);
    Ok(())
}

pub async fn logout(ctx: &Context) -> anyhow::Result<()> {
    if !ctx.client.is_authenticated() {
        println!("Not signed in.");
        return Ok(());
    }
    ctx.client.logout().await.map_err(friendly_error)?;
    println!("Signed out.");
    Ok(())
}

pub async fn whoami(ctx: &Context) -> anyhow::Result<()> {
    let user = ctx.client.me().await.map_err(friendly_error)?;
    if ctx.emit_json(&user)? {
        return Ok(());
    }
    println!("{}", user.name.as_deref().unwrap_or(&user.email));
    println!("  email:  {}", user.email);
    println!("  role:   {:?}", user.role);
    println!("  tenant: {} ({})", user.tenant.name, user.tenant.domain);
    Ok(())
}
