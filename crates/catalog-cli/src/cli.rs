use std::net::SocketAddr;
use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};

#[derive(Parser)]
#[command(
    name = "catalog",
    about = "Inventory catalog: categories, parts and where they are stored",
    version
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,

    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[arg(long, global = true, default_value = "text")]
    pub format: OutputFormat,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, clap::ValueEnum)]
pub enum OutputFormat {
    Text,
    Json,
}

#[derive(Subcommand)]
pub enum Command {
    /// Run the HTTP API
    Serve(ServeArgs),
    /// Insert the demo categories and parts into a catalog file
    Seed(DataArgs),
    /// Audit a catalog file for tree and placement violations
    Check(DataArgs),
    /// Print the category tree
    Categories(DataArgs),
    /// List parts
    Parts(PartsArgs),
}

#[derive(Args)]
pub struct ServeArgs {
    /// TOML configuration file
    #[arg(long, env = "CATALOG_CONFIG")]
    pub config: Option<PathBuf>,
    #[arg(long)]
    pub bind: Option<SocketAddr>,
    /// JSON snapshot to persist to; in-memory when absent
    #[arg(long)]
    pub data: Option<PathBuf>,
    /// Seed demo data on startup
    #[arg(long)]
    pub seed: bool,
}

#[derive(Args)]
pub struct DataArgs {
    /// JSON snapshot holding the catalog
    #[arg(long)]
    pub data: PathBuf,
    /// TOML configuration file; only its `[engine]` table is used here
    #[arg(long, env = "CATALOG_CONFIG")]
    pub config: Option<PathBuf>,
}

#[derive(Args)]
pub struct PartsArgs {
    #[command(flatten)]
    pub data: DataArgs,
    /// Only parts in this category
    #[arg(long)]
    pub category: Option<String>,
}
