//! pagefetch CLI binary.
//!
//! Fetches every page of a paginated JSON API and summarizes the results.

use std::process::ExitCode;

use chrono::{NaiveDate, Utc};
use clap::Parser;
use pagefetch::cli::{Cli, Command, PageArgs};
use pagefetch::output::PrettyPrint;
use pagefetch::{
    FetchError, Fetcher, FetcherConfig, FlickrClient, Paged, PagedResult, Photo,
    RequestDescriptor,
};
use serde::Serialize;
use serde_json::{json, Value};
use tabled::{Table, Tabled};
use tokio::sync::mpsc;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> ExitCode {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    match run(cli).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("Error: {e}");
            if matches!(e, FetchError::ConfigMissing(_)) {
                eprintln!("Hint: Set FLICKR_API_KEY environment variable");
            }
            ExitCode::FAILURE
        }
    }
}

async fn run(cli: Cli) -> pagefetch::Result<()> {
    match cli.command {
        Command::Interesting {
            date,
            pages,
            detailed,
        } => handle_interesting(date, &pages, detailed, cli.json).await,
        Command::Fetch {
            url,
            pages,
            params,
            headers,
            discover,
        } => handle_fetch(url, &pages, params, headers, discover, cli.json).await,
    }
}

async fn handle_interesting(
    date: Option<NaiveDate>,
    pages: &PageArgs,
    detailed: bool,
    json: bool,
) -> pagefetch::Result<()> {
    let client = FlickrClient::from_env()?;
    let today = Utc::now().date_naive();
    let date = date.unwrap_or_else(|| today.pred_opt().unwrap_or(today));

    let results = client
        .collect_interesting_photos(date, pages.paging())
        .await;

    if json {
        return output_json(&results);
    }

    println!("{}", Table::new(results.iter().map(PageRow::from)));

    let photos = results
        .iter()
        .filter_map(|r| r.as_ref().ok())
        .flat_map(|page| page.value.iter());

    if detailed {
        for photo in photos {
            println!("\n{}", photo.pretty_print());
        }
    } else {
        let rows: Vec<PhotoRow> = photos.map(PhotoRow::from).collect();
        if !rows.is_empty() {
            println!("\n{}", Table::new(rows));
        }
    }
    Ok(())
}

async fn handle_fetch(
    url: String,
    pages: &PageArgs,
    params: Vec<(String, String)>,
    headers: Vec<(String, String)>,
    discover: bool,
    json: bool,
) -> pagefetch::Result<()> {
    let fetcher = Fetcher::with_reqwest(FetcherConfig::default())?;

    let descriptor = headers
        .into_iter()
        .fold(RequestDescriptor::new(url), |d, (k, v)| d.header(k, v))
        .parameters(params)
        .with_paging(pages.paging());

    let results: Vec<PagedResult<Vec<Value>>> = if discover {
        let (tx, mut rx) = mpsc::unbounded_channel();
        let handle = fetcher
            .fetch_discovered_pages(&descriptor, move |result| {
                let _ = tx.send(result);
            })
            .await;
        handle.join().await;

        let mut results = Vec::new();
        while let Ok(result) = rx.try_recv() {
            results.push(result);
        }
        results
    } else {
        fetcher.collect_all_pages(&descriptor).await
    };

    if json {
        return output_json(&results);
    }

    println!("{}", Table::new(results.iter().map(PageRow::from)));
    Ok(())
}

fn output_json<T: Serialize>(results: &[PagedResult<T>]) -> pagefetch::Result<()> {
    let pages: Vec<Value> = results
        .iter()
        .map(|result| match result {
            Ok(page) => serde_json::to_value(page),
            Err(e) => Ok(json!({
                "requested": e.requested,
                "error": e.error.to_string(),
                "code": e.code(),
            })),
        })
        .collect::<Result<_, _>>()?;
    println!("{}", serde_json::to_string_pretty(&pages)?);
    Ok(())
}

// Table row types for non-JSON output

#[derive(Tabled)]
struct PageRow {
    requested: String,
    resolved: String,
    items: String,
}

impl<T> From<&PagedResult<Vec<T>>> for PageRow {
    fn from(result: &PagedResult<Vec<T>>) -> Self {
        match result {
            Ok(Paged {
                value,
                paging,
                requested,
            }) => Self {
                requested: requested.to_string(),
                resolved: paging.map(|p| p.to_string()).unwrap_or_else(|| "-".into()),
                items: value.len().to_string(),
            },
            Err(e) => Self {
                requested: e.requested.to_string(),
                resolved: "-".to_string(),
                items: format!("error {}: {}", e.code(), e.error),
            },
        }
    }
}

#[derive(Tabled)]
struct PhotoRow {
    id: String,
    title: String,
    owner: String,
    taken: String,
}

impl From<&Photo> for PhotoRow {
    fn from(p: &Photo) -> Self {
        Self {
            id: p.id.clone(),
            title: p.title.clone(),
            owner: p.owner_name.clone(),
            taken: p
                .date_taken
                .map(|d| d.format("%Y-%m-%d %H:%M").to_string())
                .unwrap_or_default(),
        }
    }
}
