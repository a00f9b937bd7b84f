//! CLI argument parsing types.
//!
//! This module provides the command-line interface structure for the pagefetch binary.

use chrono::NaiveDate;
use clap::{Args, Parser, Subcommand};

use crate::paging::PagingModel;

/// Paged JSON fetcher command-line interface.
#[derive(Parser, Debug)]
#[command(name = "pagefetch", about = "Fetch every page of a paginated JSON API", version)]
pub struct Cli {
    /// Output results as JSON instead of a table.
    #[arg(long, global = true, default_value = "false")]
    pub json: bool,

    #[command(subcommand)]
    pub command: Command,
}

/// Available CLI commands.
#[derive(Subcommand, Debug)]
pub enum Command {
    /// List Flickr's interesting photos for a day.
    Interesting {
        /// Day to list, as YYYY-MM-DD (defaults to yesterday).
        #[arg(long)]
        date: Option<NaiveDate>,

        #[command(flatten)]
        pages: PageArgs,

        /// Print every photo in full instead of a table.
        #[arg(long)]
        detailed: bool,
    },

    /// Fetch JSON arrays from any paginated endpoint.
    Fetch {
        /// Base URL of the endpoint.
        url: String,

        #[command(flatten)]
        pages: PageArgs,

        /// Query parameter sent with every page, as key=value.
        #[arg(long = "param", value_name = "KEY=VALUE", value_parser = parse_key_val)]
        params: Vec<(String, String)>,

        /// Header sent with every page, as key=value.
        #[arg(long = "header", value_name = "KEY=VALUE", value_parser = parse_key_val)]
        headers: Vec<(String, String)>,

        /// Fetch the first page, then every page its response advertises.
        #[arg(long, conflicts_with_all = ["page", "last"])]
        discover: bool,
    },
}

/// Page range selection shared by commands.
#[derive(Args, Debug, Clone, Default, PartialEq, Eq)]
pub struct PageArgs {
    /// First page to fetch (1-indexed).
    #[arg(long)]
    pub page: Option<u32>,

    /// Last page to fetch.
    #[arg(long)]
    pub last: Option<u32>,

    /// Number of items per page.
    #[arg(long)]
    pub per: Option<u32>,
}

impl PageArgs {
    /// The paging model these arguments select, or `None` when no page
    /// argument was given.
    pub fn paging(&self) -> Option<PagingModel> {
        if self.page.is_none() && self.last.is_none() && self.per.is_none() {
            return None;
        }
        let page = self.page.unwrap_or(1);
        Some(PagingModel::new(
            page,
            self.last.unwrap_or(page),
            self.per.unwrap_or(0),
        ))
    }
}

fn parse_key_val(raw: &str) -> Result<(String, String), String> {
    match raw.split_once('=') {
        Some((key, value)) if !key.is_empty() => Ok((key.to_string(), value.to_string())),
        _ => Err(format!("expected KEY=VALUE, got `{raw}`")),
    }
}
