use anyhow::Result;
use clap::{Args, Parser, Subcommand};
use complaints::cli::commands;
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "complaints")]
#[command(
  about = "Complaints - Consumer complaint dashboard\nFilter, browse and summarize complaints from the terminal"
)]
#[command(version)]
struct Cli {
  #[command(subcommand)]
  command: Command,
}

/// Dataset location
#[derive(Args)]
struct DataArgs {
  /// Complaint CSV export
  #[arg(long, env = "COMPLAINTS_DATA", default_value = "cleaned_complaints.csv")]
  data: PathBuf,
}

/// Region and organization filter
#[derive(Args)]
struct FilterArgs {
  #[command(flatten)]
  data: DataArgs,
  /// Region code (defaults to the first region in sorted order)
  #[arg(short, long)]
  region: Option<String>,
  /// Organization (defaults to the first organization in the region)
  #[arg(short, long)]
  company: Option<String>,
}

#[derive(Subcommand)]
enum Command {
  /// Counts, issue chart and submission timeline for the selection
  Overview {
    #[command(flatten)]
    filter: FilterArgs,
  },
  /// Browse complaints in the selection and summarize one
  Explore {
    #[command(flatten)]
    filter: FilterArgs,
    /// Complaint to show (defaults to the first in the selection)
    #[arg(long)]
    id: Option<String>,
  },
  /// Summarize complaints related to free text
  Query {
    /// Free-text query
    #[arg(required = true)]
    text: Vec<String>,
  },
  /// Look up a complaint by ID on the query service
  Lookup {
    /// Complaint ID
    id: String,
  },
  /// Organization-wide statistics, ignoring region
  Profile {
    #[command(flatten)]
    filter: FilterArgs,
  },
  /// List the selectable regions
  Regions {
    #[command(flatten)]
    data: DataArgs,
  },
  /// List the organizations offered for a region
  Companies {
    #[command(flatten)]
    data: DataArgs,
    /// Region code (defaults to the first region in sorted order)
    #[arg(short, long)]
    region: Option<String>,
  },
}

async fn handle(command: Command) -> Result<()> {
  match command {
    Command::Overview { filter } => {
      let dataset = commands::load_dataset(&filter.data.data)?;
      commands::overview(&dataset, filter.region.as_deref(), filter.company.as_deref())
    }
    Command::Explore { filter, id } => {
      let dataset = commands::load_dataset(&filter.data.data)?;
      commands::explore(&dataset, filter.region.as_deref(), filter.company.as_deref(), id.as_deref())
        .await
    }
    Command::Query { text } => commands::query(&text.join(" ")).await,
    Command::Lookup { id } => commands::lookup(&id).await,
    Command::Profile { filter } => {
      let dataset = commands::load_dataset(&filter.data.data)?;
      commands::profile(&dataset, filter.region.as_deref(), filter.company.as_deref())
    }
    Command::Regions { data } => {
      let dataset = commands::load_dataset(&data.data)?;
      commands::regions(&dataset)
    }
    Command::Companies { data, region } => {
      let dataset = commands::load_dataset(&data.data)?;
      commands::companies(&dataset, region.as_deref())
    }
  }
}

#[tokio::main]
async fn main() -> Result<()> {
  let cli = Cli::parse();

  handle(cli.command).await?;
  Ok(())
}
