//! `allot`: command-line client for the allot server.
//!
//! # Usage
//!
//! ```text
//! allot agents add --name "Ada Lovelace" --email ada@example.com --mobile "+1 555 0100"
//! allot upload leads.csv
//! allot lists
//! allot show <DISTRIBUTION_ID> --preview 10
//! ```

mod client;
mod display;

use std::path::PathBuf;

use allot_core::agent::{AgentPatch, NewAgent};
use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use client::{ApiClient, ApiConfig};
use serde::Deserialize;
use tracing::level_filters::LevelFilter;
use tracing_subscriber::EnvFilter;
use uuid::Uuid;

const DEFAULT_URL: &str = "http://localhost:5240";

// ─── CLI args ─────────────────────────────────────────────────────────────────

#[derive(Parser, Debug)]
#[command(name = "allot", about = "Distribute lead lists across agents")]
struct Args {
  /// Path to a TOML config file (url).
  #[arg(short, long, value_name = "FILE")]
  config: Option<PathBuf>,

  /// Base URL of the allot server (default: http://localhost:5240).
  #[arg(long, env = "ALLOT_URL")]
  url: Option<String>,

  #[command(subcommand)]
  command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
  /// Manage the agent roster.
  Agents {
    #[command(subcommand)]
    action: AgentAction,
  },
  /// Upload a CSV/XLSX/XLS file and distribute its records.
  Upload {
    file: PathBuf,
  },
  /// List stored distributions, newest first.
  Lists,
  /// Show one distribution.
  Show {
    id: Uuid,
    /// Records to preview per agent.
    #[arg(long, default_value_t = display::DEFAULT_PREVIEW)]
    preview: usize,
  },
}

#[derive(Subcommand, Debug)]
enum AgentAction {
  List,
  Add {
    #[arg(long)]
    name: String,
    #[arg(long)]
    email: String,
    #[arg(long)]
    mobile: String,
  },
  /// Exclude an agent from future distributions.
  Deactivate { id: Uuid },
  Activate { id: Uuid },
  /// Delete an agent. Stored distributions keep their copy of the name.
  Remove { id: Uuid },
}

// ─── Config file ──────────────────────────────────────────────────────────────

/// Shape of the optional TOML config file.
#[derive(Deserialize, Default)]
struct ConfigFile {
  #[serde(default)]
  url: String,
}

// ─── Entry point ──────────────────────────────────────────────────────────────

#[tokio::main]
async fn main() -> Result<()> {
  tracing_subscriber::fmt()
    .with_env_filter(
      EnvFilter::builder()
        .with_default_directive(LevelFilter::WARN.into())
        .from_env_lossy(),
    )
    .with_writer(std::io::stderr)
    .init();

  let args = Args::parse();

  let file_cfg: ConfigFile = if let Some(path) = &args.config {
    let raw = std::fs::read_to_string(path)
      .with_context(|| format!("reading config file {}", path.display()))?;
    toml::from_str(&raw).context("parsing config file")?
  } else {
    ConfigFile::default()
  };

  // CLI flags override config file, which overrides defaults.
  let api_config = ApiConfig {
    base_url: args
      .url
      .or_else(|| (!file_cfg.url.is_empty()).then(|| file_cfg.url.clone()))
      .unwrap_or_else(|| DEFAULT_URL.to_string()),
  };
  tracing::debug!(base_url = %api_config.base_url, "using server");

  let client = ApiClient::new(api_config)?;
  let output = run(&client, args.command).await?;
  print!("{output}");
  Ok(())
}

async fn run(client: &ApiClient, command: Command) -> Result<String> {
  match command {
    Command::Agents { action } => run_agents(client, action).await,
    Command::Upload { file } => {
      let receipt = client.upload(&file).await?;
      Ok(display::receipt(&receipt))
    }
    Command::Lists => {
      let lists = client.list_distributions().await?;
      Ok(display::summaries(&lists))
    }
    Command::Show { id, preview } => {
      let snapshot = client.get_distribution(id).await?;
      Ok(display::snapshot(&snapshot, preview))
    }
  }
}

async fn run_agents(client: &ApiClient, action: AgentAction) -> Result<String> {
  let set_active = |is_active| AgentPatch {
    is_active: Some(is_active),
    ..AgentPatch::default()
  };

  match action {
    AgentAction::List => Ok(display::agents(&client.list_agents().await?)),
    AgentAction::Add { name, email, mobile } => {
      let agent = client.add_agent(&NewAgent { name, email, mobile }).await?;
      Ok(display::agents(std::slice::from_ref(&agent)))
    }
    AgentAction::Deactivate { id } => {
      let agent = client.update_agent(id, &set_active(false)).await?;
      Ok(display::agents(std::slice::from_ref(&agent)))
    }
    AgentAction::Activate { id } => {
      let agent = client.update_agent(id, &set_active(true)).await?;
      Ok(display::agents(std::slice::from_ref(&agent)))
    }
    AgentAction::Remove { id } => {
      client.delete_agent(id).await?;
      Ok(format!("Removed agent {id}.\n"))
    }
  }
}
