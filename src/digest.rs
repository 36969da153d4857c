//! One digest run: scrape every configured source, optionally fetch NBA
//! results, and hand the collection to the email composer.

use crate::models::{NbaScores, SourceDigest};
use crate::scrapers::nba::{PlayerMatcher, fetch_nba_scores};
use crate::scrapers::scrape_source;
use crate::scrapers::strategy::SourceConfig;
use futures::future::join_all;
use reqwest::Client;
use tracing::{info, warn};

/// Scrape all sources concurrently and, when `include_sports` holds, fetch
/// last night's NBA results.
///
/// Sources are fully independent, so they all go out at once; a failing
/// source produces an error digest and never aborts the run. The returned
/// digests are in configuration order regardless of completion order.
pub async fn run_digest(
    client: &Client,
    sources: &[SourceConfig],
    include_sports: bool,
    matcher: &PlayerMatcher,
) -> (Vec<SourceDigest>, Option<NbaScores>) {
    info!(sources = sources.len(), "starting news scraping");

    let digests = join_all(sources.iter().map(|config| scrape_source(client, config))).await;

    for digest in &digests {
        match &digest.error {
            Some(error) => warn!(source = %digest.source, %error, "source failed"),
            None => info!(source = %digest.source, count = digest.articles.len(), "source done"),
        }
    }

    let nba = if include_sports {
        info!("fetching NBA scores for the morning digest");
        let scores = fetch_nba_scores(client, matcher).await;
        match &scores.error {
            Some(error) => warn!(%error, "NBA scores unavailable"),
            None => info!(games = scores.games.len(), "NBA scores fetched"),
        }
        Some(scores)
    } else {
        None
    };

    (digests, nba)
}
