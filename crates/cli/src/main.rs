mod config;
mod rehearse;

use std::path::PathBuf;

use anyhow::Result;
use clap::{Parser, Subcommand};
use colored::Colorize;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use config::{Overrides, TrainerConfig};

#[derive(Parser)]
#[command(name = "session-trainer")]
#[command(about = "Rehearse mentoring sessions against a simulated mentee", long_about = None)]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,

    /// Config file (defaults to ~/.session-trainer/config.toml)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Backend API root
    #[arg(long, global = true, env = "SESSION_TRAINER_URL")]
    url: Option<String>,

    /// Bearer token for the backend
    #[arg(long, global = true, env = "SESSION_TRAINER_TOKEN", hide_env_values = true)]
    token: Option<String>,
}

#[derive(Subcommand)]
enum Commands {
    /// Write a config file
    Init {
        #[arg(long)]
        course: Option<String>,

        #[arg(long)]
        assignment: Option<String>,

        /// Request timeout in seconds
        #[arg(long)]
        timeout: Option<u64>,

        /// Overwrite an existing config
        #[arg(long)]
        force: bool,
    },
    /// Show the effective configuration
    Status,
    /// Start an interactive rehearsal
    Rehearse {
        #[arg(short, long)]
        expertise: Option<String>,

        #[arg(long)]
        course: Option<String>,

        #[arg(long)]
        assignment: Option<String>,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    init_tracing();

    let path = match cli.config {
        Some(path) => path,
        None => config::default_path()?,
    };
    let overrides = |course, assignment| Overrides {
        url: cli.url.clone(),
        token: cli.token.clone(),
        course,
        assignment,
    };

    match cli.command {
        Some(Commands::Init {
            course,
            assignment,
            timeout,
            force,
        }) => init(&path, overrides(course, assignment), timeout, force).await,
        Some(Commands::Status) => status(&path, overrides(None, None)).await,
        Some(Commands::Rehearse {
            expertise,
            course,
            assignment,
        }) => rehearse(&path, overrides(course, assignment), expertise).await,
        None => rehearse(&path, overrides(None, None), None).await,
    }
}

async fn init(
    path: &std::path::Path,
    overrides: Overrides,
    timeout: Option<u64>,
    force: bool,
) -> Result<()> {
    if path.exists() && !force {
        println!("Config already exists at {}", path.display());
        println!("Use --force to overwrite.");
        return Ok(());
    }

    let mut config = TrainerConfig::default();
    config.apply(overrides);
    config.client.timeout_secs = timeout;
    config::save(path, &config).await?;

    println!("Wrote {}", path.display());
    let missing = config.client.missing_fields();
    if !missing.is_empty() {
        println!();
        println!("Still missing: {}", missing.join(", ").yellow());
        println!("Edit the file or pass them to 'session-trainer rehearse'.");
    }

    Ok(())
}

async fn status(path: &std::path::Path, overrides: Overrides) -> Result<()> {
    let mut config = config::load(path).await?;
    config.apply(overrides);
    let client = &config.client;

    let or_unset = |value: &str| {
        if value.trim().is_empty() {
            "(not set)".dimmed().to_string()
        } else {
            value.to_string()
        }
    };

    println!();
    println!("Config:     {}", path.display());
    println!("Backend:    {}", or_unset(&client.base_url));
    println!("Course:     {}", or_unset(&client.course_id));
    println!("Assignment: {}", or_unset(&client.assignment_id));
    println!(
        "Token:      {}",
        if client.token.is_empty() { "(not set)".dimmed() } else { "set".green() }
    );
    if let Some(secs) = client.timeout_secs {
        println!("Timeout:    {}s", secs);
    }
    println!();

    if client.missing_fields().is_empty() {
        println!("{}", "Ready to rehearse.".green());
    } else {
        println!("Missing: {}", client.missing_fields().join(", ").yellow());
    }

    Ok(())
}

async fn rehearse(
    path: &std::path::Path,
    overrides: Overrides,
    expertise: Option<String>,
) -> Result<()> {
    let mut config = config::load(path).await?;
    config.apply(overrides);
    let expertise = expertise.or(config.rehearsal.default_expertise);

    tracing::info!(base_url = %config.client.base_url, "Starting rehearsal");
    let client = rehearse::client(config.client)?;
    rehearse::run(client, expertise).await
}

fn init_tracing() {
    tracing_subscriber::registry()
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| {
                "session_trainer=info,simulator=info,trainer_api=info".into()
            }),
        )
        .init();
}
