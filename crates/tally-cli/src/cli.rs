//! CLI argument definitions.

use clap::{Parser, Subcommand};

use crate::commands::customers::CustomersCommand;
use crate::commands::prices::PricesCommand;

/// Command-line client for the billing API.
#[derive(Parser, Debug)]
#[command(name = "tally")]
#[command(author, version = env!("TALLY_VERSION"), about, long_about = None)]
pub struct Cli {
    /// Increase verbosity (-v, -vv, -vvv)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Output logs as JSON
    #[arg(long, global = true)]
    pub json_logs: bool,

    /// API key (overrides the stored config)
    #[arg(long, global = true, env = "TALLY_API_KEY", hide_env_values = true)]
    pub api_key: Option<String>,

    /// API base URL (overrides the stored config)
    #[arg(long, global = true, env = "TALLY_BASE_URL")]
    pub base_url: Option<String>,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Store the API key (and base URL, if given) in the config file
    Configure,

    /// Price operations
    Prices(PricesCommand),

    /// Customer operations
    Customers(CustomersCommand),
}
