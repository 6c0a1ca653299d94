//! driftwood CLI: manage AWS resource lifecycles from the command line
//!
//! Exposes the registry (services, schemas) and the four lifecycle verbs plus
//! import, and a waiter for QBusiness entity status.

use anyhow::{Context, Result, anyhow};
use clap::{Parser, Subcommand};
use driftwood::aws::context::AwsContext;
use driftwood::aws::qbusiness;
use driftwood::config::{AwsSettings, PollSettings, RunConfig};
use driftwood::registry::Registry;
use driftwood::resource::ResourceState;
use tracing::info;

#[derive(Parser, Debug)]
#[command(name = "driftwood")]
#[command(about = "Declarative lifecycle management for AWS resources")]
#[command(version)]
struct Args {
    /// AWS region
    #[arg(long, global = true, default_value = "us-east-2")]
    region: String,

    /// AWS profile to use (overrides AWS_PROFILE env var)
    #[arg(long, global = true)]
    profile: Option<String>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// List registered services and resource types
    Services,

    /// Print the attribute schema of a resource type
    Schema {
        /// Resource type name, e.g. aws_eks_access_policy_association
        type_name: String,
    },

    /// Create a resource from a JSON configuration file
    Create {
        /// Resource type name
        type_name: String,

        /// Path to a JSON file with the resource configuration
        #[arg(long)]
        config: String,
    },

    /// Read current remote state of a resource by external id
    Read {
        /// Resource type name
        type_name: String,

        /// External composite identifier
        #[arg(long)]
        id: String,
    },

    /// Delete a resource by external id (idempotent)
    Delete {
        /// Resource type name
        type_name: String,

        /// External composite identifier
        #[arg(long)]
        id: String,
    },

    /// Import a resource by external id
    Import {
        /// Resource type name
        type_name: String,

        /// External composite identifier
        #[arg(long)]
        id: String,
    },

    /// Wait for a QBusiness application to reach a target status
    WaitApp {
        /// Application id
        #[arg(long)]
        application_id: String,

        /// Target status: active or deleted
        #[arg(long, default_value = "active")]
        target: String,

        /// Maximum time to wait, in seconds
        #[arg(long, default_value = "600")]
        timeout: u64,
    },
}

#[tokio::main]
async fn main() {
    if let Err(e) = run().await {
        print_error(&e);
        std::process::exit(1);
    }
}

/// Print error in a user-friendly way
fn print_error(e: &anyhow::Error) {
    use std::io::Write;

    let mut stderr = std::io::stderr();

    let _ = writeln!(stderr, "\n\x1b[1;31mError:\x1b[0m {e}");

    let mut source = e.source();
    while let Some(cause) = source {
        let _ = writeln!(stderr, "  \x1b[33mCaused by:\x1b[0m {cause}");
        source = cause.source();
    }
}

async fn run() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive(tracing::Level::INFO.into()),
        )
        .init();

    let args = Args::parse();
    let registry = Registry::bootstrap();

    let config = RunConfig {
        aws: AwsSettings {
            region: args.region.clone(),
            profile: args.profile.clone(),
        },
        poll: PollSettings::default(),
    };

    match args.command {
        Command::Services => {
            println!("{:<14} {:<42} {}", "SERVICE", "TYPE", "NAME");
            println!("{}", "-".repeat(80));
            for package in registry.services() {
                if package.resources.is_empty() {
                    println!("{:<14} {:<42} {}", package.service, "-", "-");
                }
                for resource in &package.resources {
                    println!(
                        "{:<14} {:<42} {}",
                        package.service, resource.type_name, resource.name
                    );
                }
            }
        }

        Command::Schema { type_name } => {
            let registration = registry
                .resource(&type_name)
                .ok_or_else(|| anyhow!("unknown resource type '{type_name}'"))?;
            // Schema is static; bind the adapter without remote calls.
            let ctx = load_context(&config).await;
            let adapter = (registration.factory)(&ctx);
            println!("{}", serde_json::to_string_pretty(&adapter.schema())?);
        }

        Command::Create { type_name, config: config_path } => {
            let ctx = load_context(&config).await;
            let adapter = registry
                .adapter(&type_name, &ctx)
                .ok_or_else(|| anyhow!("unknown resource type '{type_name}'"))?;

            let raw = std::fs::read_to_string(&config_path)
                .with_context(|| format!("reading configuration file {config_path}"))?;
            let desired: serde_json::Value =
                serde_json::from_str(&raw).context("parsing configuration JSON")?;

            let state = adapter.create(desired).await?;
            info!(id = %state.id, "Created");
            print_state(&state)?;
        }

        Command::Read { type_name, id } => {
            let ctx = load_context(&config).await;
            let adapter = registry
                .adapter(&type_name, &ctx)
                .ok_or_else(|| anyhow!("unknown resource type '{type_name}'"))?;

            match adapter.read(&ResourceState::with_id(&id)).await? {
                Some(state) => print_state(&state)?,
                None => println!("{type_name} '{id}' no longer exists"),
            }
        }

        Command::Delete { type_name, id } => {
            let ctx = load_context(&config).await;
            let adapter = registry
                .adapter(&type_name, &ctx)
                .ok_or_else(|| anyhow!("unknown resource type '{type_name}'"))?;

            adapter.delete(&ResourceState::with_id(&id)).await?;
            info!(id = %id, "Deleted");
        }

        Command::Import { type_name, id } => {
            let ctx = load_context(&config).await;
            let adapter = registry
                .adapter(&type_name, &ctx)
                .ok_or_else(|| anyhow!("unknown resource type '{type_name}'"))?;

            let state = adapter.import(&id).await?;
            print_state(&state)?;
        }

        Command::WaitApp {
            application_id,
            target,
            timeout,
        } => {
            let ctx = load_context(&config).await;
            let client = ctx.qbusiness_client();
            let poll = RunConfig {
                poll: PollSettings { timeout_secs: timeout },
                ..config
            }
            .poll_config();

            match target.as_str() {
                "active" => {
                    qbusiness::wait_for_application_active(&client, &application_id, poll, None)
                        .await?;
                    println!("application {application_id} is active");
                }
                "deleted" => {
                    qbusiness::wait_for_application_deleted(&client, &application_id, poll, None)
                        .await?;
                    println!("application {application_id} is deleted");
                }
                other => return Err(anyhow!("unknown target status '{other}'")),
            }
        }
    }

    Ok(())
}

async fn load_context(config: &RunConfig) -> AwsContext {
    if let Some(profile) = config.profile() {
        info!(profile = %profile, "Using AWS profile");
    }
    AwsContext::with_profile(config.region(), config.profile()).await
}

fn print_state(state: &ResourceState) -> Result<()> {
    println!("{}", serde_json::to_string_pretty(state)?);
    Ok(())
}
