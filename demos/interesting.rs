//! Example browsing Flickr's interesting photos page by page.
//!
//! Run with:
//! ```
//! FLICKR_API_KEY=your-key cargo run --example interesting
//! ```

use chrono::NaiveDate;
use pagefetch::output::PrettyPrint;
use pagefetch::{Dispatch, Fetcher, FetcherConfig, FlickrClient};

#[tokio::main]
async fn main() -> pagefetch::Result<()> {
    // Initialize tracing for debugging (optional)
    tracing_subscriber::fmt::init();

    let api_key = std::env::var("FLICKR_API_KEY")
        .map_err(|_| pagefetch::FetchError::ConfigMissing("FLICKR_API_KEY".to_string()))?;
    let date = NaiveDate::from_ymd_opt(2018, 5, 1).expect("valid date");

    // Completions run one at a time on the queue below
    let (dispatch, mut queue) = Dispatch::queue();
    let fetcher = Fetcher::with_reqwest(FetcherConfig::builder().dispatch(dispatch).build())?;
    let flickr = FlickrClient::new(fetcher, api_key, "https://api.flickr.com/services/rest/");

    // Unpaged first: one request of 100 photos, paging read from the envelope
    println!("--- First page for {date} ---");
    let first = flickr.collect_interesting_photos(date, None).await;
    let page = first.into_iter().next().ok_or(pagefetch::FetchError::NoData)??;
    if let Some(photo) = page.value.first() {
        println!("{}", photo.pretty_print());
    }

    let Some(paging) = page.pagination() else {
        println!("No further pages");
        return Ok(());
    };
    println!("\nResolved {paging}, fetching the rest");

    // Then every remaining page at once
    let Some(rest) = paging.increment() else {
        return Ok(());
    };
    let handle = flickr.interesting_photos(date, Some(rest), |result| match result {
        Ok(page) => println!("{}: {} photos", page.requested, page.value.len()),
        Err(e) => eprintln!("page failed: {e}"),
    });

    let pages = handle.pages();
    handle.join().await;
    for _ in 0..pages {
        queue.run_next().await;
    }

    Ok(())
}
