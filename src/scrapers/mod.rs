//! Scrapers for the news sources and the NBA scoreboard.
//!
//! News sources all go through the same path: fetch the landing page, parse
//! it, and run the extraction cascade from [`strategy`] with the source's
//! configuration from [`sources`]. The NBA fetcher in [`nba`] talks to a JSON
//! API instead and has its own module.
//!
//! The one contract every entry point here honors: **nothing propagates**. A
//! dead host, a timeout, or a redesigned page yields a digest with its
//! `error` field set (or an [`crate::models::NbaScores`] with `error` set),
//! never a panic or an `Err`. One broken source must not take down the run.

pub mod nba;
pub mod sources;
pub mod strategy;

use crate::fetch::fetch_page;
use crate::models::SourceDigest;
use chrono::Utc;
use reqwest::Client;
use scraper::Html;
use strategy::SourceConfig;
use tracing::{debug, info, warn};

/// Scrape one configured source into its digest. Never fails: every fetch or
/// extraction problem is captured into the digest's `error` field.
pub async fn scrape_source(client: &Client, config: &SourceConfig) -> SourceDigest {
    debug!(source = %config.name, url = %config.url, "fetching landing page");

    let html = match fetch_page(client, &config.url, &config.accept_language, config.encoding).await
    {
        Ok(html) => html,
        Err(e) => {
            warn!(source = %config.name, error = %e, "landing page fetch failed");
            return SourceDigest::failed(&config.name, &config.url, e.to_string());
        }
    };

    let document = Html::parse_document(&html);
    match strategy::scrape_document(&document, config) {
        Ok(articles) => {
            info!(source = %config.name, count = articles.len(), "scraped source");
            SourceDigest {
                source: config.name.clone(),
                source_url: config.url.clone(),
                articles,
                scraped_at: Utc::now(),
                error: None,
            }
        }
        Err(e) => {
            warn!(source = %config.name, error = %e, "extraction failed");
            SourceDigest::failed(&config.name, &config.url, e)
        }
    }
}
