//! funnelboard CLI -- manage sales funnels, stages and leads against a
//! funnelboard backend.

mod commands;

use std::path::PathBuf;

use anyhow::Context as _;
use clap::{Parser, Subcommand};
use fb_api_types::{CreateCollaboratorRequest, Permission, RegisterRequest};
use fb_client::FunnelClient;
use fb_core::config::Config;
use fb_telemetry::logging::{self, LogFormat};
use tracing::debug;

use commands::Context;

#[global_allocator]
static GLOBAL: mimalloc::MiMalloc = mimalloc::MiMalloc;

/// funnelboard CLI -- drive a multi-tenant sales funnel board.
#[derive(Parser)]
#[command(name = "fb", version, about)]
struct Cli {
    /// Backend base URL (overrides config and FUNNELBOARD_API_URL).
    #[arg(long, global = true)]
    api_url: Option<String>,

    /// Config file to use instead of ~/.funnelboard/config.toml.
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Print machine-readable JSON instead of tables.
    #[arg(long, global = true)]
    json: bool,

    /// Log at debug level.
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Sign in and store the session token.
    Login {
        email: String,
        #[arg(long, env = "FUNNELBOARD_PASSWORD", hide_env_values = true)]
        password: String,
    },

    /// Create an account and a new tenant.
    Register {
        email: String,
        #[arg(long)]
        name: String,
        /// Organisation name for the new tenant.
        #[arg(long)]
        tenant: String,
        #[arg(long, env = "FUNNELBOARD_PASSWORD", hide_env_values = true)]
        password: String,
    },

    /// Sign out and forget the stored session.
    Logout,

    /// Show the signed-in user.
    Whoami,

    /// Create, list and edit funnels.
    #[command(subcommand)]
    Funnels(FunnelCommand),

    /// Manage the stages of a funnel.
    #[command(subcommand)]
    Stages(StageCommand),

    /// Manage the leads of a funnel.
    #[command(subcommand)]
    Leads(LeadCommand),

    /// Render a funnel as a board of stage columns.
    Board { funnel: String },

    /// Show funnel metrics, or the dashboard when no funnel is given.
    Metrics { funnel: Option<String> },

    /// Share a funnel with other users.
    #[command(subcommand)]
    Collaborators(CollaboratorCommand),
}

#[derive(Subcommand)]
enum FunnelCommand {
    List,
    Show {
        id: String,
    },
    /// Create a funnel with the default stages and lead fields.
    Create {
        name: String,
        #[arg(long)]
        description: Option<String>,
    },
    Update {
        id: String,
        #[arg(long)]
        name: Option<String>,
        #[arg(long)]
        description: Option<String>,
    },
    Delete {
        id: String,
    },
}

#[derive(Subcommand)]
enum StageCommand {
    List {
        funnel: String,
    },
    Add {
        funnel: String,
        name: String,
        #[arg(long)]
        color: Option<String>,
        /// Position value; defaults to after the last stage.
        #[arg(long)]
        order: Option<i32>,
    },
    Update {
        funnel: String,
        stage: String,
        #[arg(long)]
        name: Option<String>,
        #[arg(long)]
        color: Option<String>,
    },
    Remove {
        funnel: String,
        stage: String,
    },
    /// Move a stage to a 1-based position.
    Move {
        funnel: String,
        stage: String,
        position: usize,
    },
}

#[derive(Subcommand)]
enum LeadCommand {
    List {
        funnel: String,
    },
    Show {
        funnel: String,
        lead: String,
    },
    Add {
        funnel: String,
        /// Stage id or name; defaults to the first stage.
        #[arg(long)]
        stage: Option<String>,
        /// Field value as NAME=VALUE; repeatable.
        #[arg(long = "field", short = 'f')]
        fields: Vec<String>,
    },
    /// Move a lead to another stage (id or name).
    Move {
        funnel: String,
        lead: String,
        stage: String,
    },
    Remove {
        funnel: String,
        lead: String,
    },
}

#[derive(Subcommand)]
enum CollaboratorCommand {
    List {
        funnel: String,
    },
    /// Grant an existing user access.
    Add {
        funnel: String,
        email: String,
        #[arg(long, default_value = "VIEW")]
        permission: Permission,
    },
    /// Create an account for a new user and grant it access.
    Invite {
        funnel: String,
        email: String,
        #[arg(long)]
        name: String,
        #[arg(long, env = "FUNNELBOARD_INVITE_PASSWORD", hide_env_values = true)]
        password: String,
        #[arg(long, default_value = "VIEW")]
        permission: Permission,
    },
    SetPermission {
        funnel: String,
        collaborator: String,
        permission: Permission,
    },
    Remove {
        funnel: String,
        collaborator: String,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let mut config = match &cli.config {
        Some(path) => Config::load_from(path).with_context(|| format!("loading {}", path.display()))?,
        None => Config::load().context("loading config")?,
    };
    config.override_base_url(cli.api_url.as_deref());
    config.validate()?;

    let level = if cli.verbose {
        "debug"
    } else {
        config.general.log_level.as_str()
    };
    logging::init("fb", level, LogFormat::from_config(&config.general.log_format));
    debug!(base_url = %config.api.base_url, "config loaded");

    let client = FunnelClient::from_config(&config).map_err(commands::friendly_error)?;
    let ctx = Context::new(client, config, cli.json);
    run(&ctx, cli.command).await
}

async fn run(ctx: &Context, command: Commands) -> anyhow::Result<()> {
    use commands::{auth, board, collaborators, funnels, leads, metrics, stages};

    match command {
        Commands::Login { email, password } => auth::login(ctx, &email, &password).await,
        Commands::Register {
            email,
            name,
            tenant,
            password,
        } => {
            let request = RegisterRequest {
                email,
                password,
                name,
                tenant_name: tenant,
            };
            auth::register(ctx, request).await
        }
        Commands::Logout => auth::logout(ctx).await,
        Commands::Whoami => auth::whoami(ctx).await,

        Commands::Funnels(cmd) => match cmd {
            FunnelCommand::List => funnels::list(ctx).await,
            FunnelCommand::Show { id } => funnels::show(ctx, &id).await,
            FunnelCommand::Create { name, description } => funnels::create(ctx, &name, description).await,
            FunnelCommand::Update { id, name, description } => funnels::rename(ctx, &id, name, description).await,
            FunnelCommand::Delete { id } => funnels::delete(ctx, &id).await,
        },

        Commands::Stages(cmd) => match cmd {
            StageCommand::List { funnel } => stages::list(ctx, &funnel).await,
            StageCommand::Add {
                funnel,
                name,
                color,
                order,
            } => stages::add(ctx, &funnel, &name, color, order).await,
            StageCommand::Update {
                funnel,
                stage,
                name,
                color,
            } => stages::update(ctx, &funnel, &stage, name, color).await,
            StageCommand::Remove { funnel, stage } => stages::remove(ctx, &funnel, &stage).await,
            StageCommand::Move {
                funnel,
                stage,
                position,
            } => stages::reorder(ctx, &funnel, &stage, position).await,
        },

        Commands::Leads(cmd) => match cmd {
            LeadCommand::List { funnel } => leads::list(ctx, &funnel).await,
            LeadCommand::Show { funnel, lead } => leads::show(ctx, &funnel, &lead).await,
            LeadCommand::Add { funnel, stage, fields } => leads::add(ctx, &funnel, stage.as_deref(), &fields).await,
            LeadCommand::Move { funnel, lead, stage } => leads::move_to(ctx, &funnel, &lead, &stage).await,
            LeadCommand::Remove { funnel, lead } => leads::remove(ctx, &funnel, &lead).await,
        },

        Commands::Board { funnel } => board::show(ctx, &funnel).await,
        Commands::Metrics { funnel } => metrics::show(ctx, funnel.as_deref()).await,

        Commands::Collaborators(cmd) => match cmd {
            CollaboratorCommand::List { funnel } => collaborators::list(ctx, &funnel).await,
            CollaboratorCommand::Add {
                funnel,
                email,
                permission,
            } => collaborators::add(ctx, &funnel, &email, permission).await,
            CollaboratorCommand::Invite {
                funnel,
                email,
                name,
                password,
                permission,
            } => {
                let request = CreateCollaboratorRequest {
                    email,
                    password,
                    name,
                    permission,
                };
                collaborators::invite(ctx, &funnel, request).await
            }
            CollaboratorCommand::SetPermission {
                funnel,
                collaborator,
                permission,
            } => collaborators::set_permission(ctx, &funnel, &collaborator, permission).await,
            CollaboratorCommand::Remove { funnel, collaborator } => {
                collaborators::remove(ctx, &funnel, &collaborator).await
            }
        },
    }
}

#[cfg(test)]
mod tests {
    use clap::CommandFactory;

    use super::*;

    #[test]
    fn cli_definition_is_valid() {
        Cli::command().debug_assert();
    }

    #[test]
    fn lead_fields_are_repeatable() {
        let cli = Cli::try_parse_from([
            "fb", "leads", "add", "f1", "--stage", "New", "-f", "Name=Ada", "--field", "Value=10",
        ])
        .unwrap();
        match cli.command {
            Commands::Leads(LeadCommand::Add { stage, fields, .. }) => {
                assert_eq!(stage.as_deref(), Some("New"));
                assert_eq!(fields, vec!["Name=Ada", "Value=10"]);
            }
            _ => panic!("parsed the wrong command"),
        }
    }

    #[test]
    fn permissions_parse_from_arguments() {
        let cli = Cli::try_parse_from(["fb", "--json", "collaborators", "set-permission", "f1", "c1", "edit"]).unwrap();
        assert!(cli.json);
        assert!(matches!(
            cli.command,
            Commands::Collaborators(CollaboratorCommand::SetPermission {
                permission: Permission::Edit,
                ..
            })
        ));
        assert!(Cli::try_parse_from(["fb", "collaborators", "set-permission", "f1", "c1", "owner"]).is_err());
    }
}
