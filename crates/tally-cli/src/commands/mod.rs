//! Subcommand implementations.

pub mod configure;
pub mod customers;
pub mod prices;

use std::pin::pin;

use anyhow::{Context, Result, bail};
use clap::Args;
use futures_util::TryStreamExt;
use serde::Serialize;
use tokio_util::sync::CancellationToken;

use tally_core::{CursorParams, Decode, Page};
use tally_http::Client;

use crate::cli::{Cli, Commands};
use crate::config;
use crate::output;

/// Options shared by list commands.
#[derive(Args, Debug)]
pub struct ListArgs {
    /// Page size
    #[arg(long)]
    pub limit: Option<i64>,

    /// Cursor to start from
    #[arg(long)]
    pub cursor: Option<String>,

    /// Follow cursors until the last page
    #[arg(long)]
    pub all: bool,

    /// Pretty-print JSON output
    #[arg(long)]
    pub pretty: bool,
}

pub async fn run(cli: Cli, cancel: CancellationToken) -> Result<()> {
    match cli.command {
        Commands::Configure => configure::run(cli.api_key.as_deref(), cli.base_url.as_deref()),
        Commands::Prices(cmd) => {
            let client = client(cli.api_key.as_deref(), cli.base_url.as_deref())?;
            prices::handle(cmd, &client, &cancel).await
        }
        Commands::Customers(cmd) => {
            let client = client(cli.api_key.as_deref(), cli.base_url.as_deref())?;
            customers::handle(cmd, &client, &cancel).await
        }
    }
}

fn client(api_key: Option<&str>, base_url: Option<&str>) -> Result<Client> {
    let options = config::client_options(api_key, base_url)?;
    Client::new(options).context("Failed to create client")
}

/// Print a page, or with `--all` every page from it onwards.
///
/// Items that decoded are printed even when others on the page did not; the
/// command then fails with the decode error.
async fn print_list<P, T>(page: Page<P, T>, args: &ListArgs, cancel: &CancellationToken) -> Result<()>
where
    P: CursorParams,
    T: Serialize + Decode + Send + 'static,
{
    if args.all {
        let mut items = pin!(page.into_items(cancel.clone()));
        let mut count = 0usize;
        while let Some(item) = items.try_next().await.context("Failed to list items")? {
            output::record(&item, args.pretty)?;
            count += 1;
        }
        output::list_footer(count, None);
        return Ok(());
    }

    for item in page.items() {
        output::record(item, args.pretty)?;
    }

    if let Some(err) = page.decode_error() {
        output::warning(&format!(
            "Printed {} item(s); the rest of the page did not decode",
            page.items().len()
        ));
        bail!("Failed to decode page: {err}");
    }

    let next_cursor = if page.has_next() { page.next_cursor() } else { None };
    output::list_footer(page.items().len(), next_cursor.as_deref());

    Ok(())
}
