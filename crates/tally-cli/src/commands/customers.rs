//! Customer subcommands.

use anyhow::{Context, Result};
use clap::{Args, Subcommand};
use tokio_util::sync::CancellationToken;

use tally_core::CustomerListParams;
use tally_http::Client;

use super::{ListArgs, print_list};
use crate::output;

#[derive(Args, Debug)]
pub struct CustomersCommand {
    #[command(subcommand)]
    pub command: CustomersSubcommand,
}

#[derive(Subcommand, Debug)]
pub enum CustomersSubcommand {
    /// List customers
    List(ListArgs),

    /// Fetch a single customer
    Get(GetCustomerArgs),
}

#[derive(Args, Debug)]
pub struct GetCustomerArgs {
    /// Customer ID
    pub id: String,

    /// Pretty-print JSON output
    #[arg(long)]
    pub pretty: bool,
}

pub async fn handle(
    cmd: CustomersCommand,
    client: &Client,
    cancel: &CancellationToken,
) -> Result<()> {
    match cmd.command {
        CustomersSubcommand::List(args) => {
            let mut params = CustomerListParams::new();
            params.set_limit(args.limit)?.set_cursor(args.cursor.clone())?;

            let page = client
                .customers()
                .list(params, cancel)
                .await
                .context("Failed to list customers")?;

            print_list(page, &args, cancel).await
        }
        CustomersSubcommand::Get(args) => {
            let customer = client
                .customers()
                .get(&args.id, cancel)
                .await
                .context("Failed to get customer")?;

            output::record(&customer, args.pretty)
        }
    }
}
