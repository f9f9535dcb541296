//! Price subcommands.

use anyhow::{Context, Result};
use clap::{Args, Subcommand};
use tokio_util::sync::CancellationToken;
use tracing::warn;

use tally_core::{PriceListParams, Validate};
use tally_http::Client;

use super::{ListArgs, print_list};
use crate::output;

#[derive(Args, Debug)]
pub struct PricesCommand {
    #[command(subcommand)]
    pub command: PricesSubcommand,
}

#[derive(Subcommand, Debug)]
pub enum PricesSubcommand {
    /// List prices
    List(ListArgs),

    /// Fetch a single price
    Get(GetPriceArgs),
}

#[derive(Args, Debug)]
pub struct GetPriceArgs {
    /// Price ID
    pub id: String,

    /// Pretty-print JSON output
    #[arg(long)]
    pub pretty: bool,
}

pub async fn handle(cmd: PricesCommand, client: &Client, cancel: &CancellationToken) -> Result<()> {
    match cmd.command {
        PricesSubcommand::List(args) => list(args, client, cancel).await,
        PricesSubcommand::Get(args) => get(args, client, cancel).await,
    }
}

async fn list(args: ListArgs, client: &Client, cancel: &CancellationToken) -> Result<()> {
    let mut params = PriceListParams::new();
    params.set_limit(args.limit)?.set_cursor(args.cursor.clone())?;

    let page = client
        .prices()
        .list(params, cancel)
        .await
        .context("Failed to list prices")?;

    print_list(page, &args, cancel).await
}

async fn get(args: GetPriceArgs, client: &Client, cancel: &CancellationToken) -> Result<()> {
    let price = client
        .prices()
        .get(&args.id, cancel)
        .await
        .context("Failed to get price")?;

    if let Err(e) = price.validate() {
        warn!(error = %e, "Price does not match a known model");
    }

    output::record(&price, args.pretty)
}
