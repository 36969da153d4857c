//! # Morning Paper
//!
//! A batch digest mailer that scrapes Portuguese and international news
//! sources, ranks the extracted headlines with an editorial-priority
//! heuristic, pulls last night's NBA results in the morning, and sends the
//! whole thing as an HTML+text email.
//!
//! ## Usage
//!
//! ```sh
//! morning_paper --recipient you@example.com
//! morning_paper --dry-run --force-sports
//! ```
//!
//! ## Architecture
//!
//! One run is a straight pipeline:
//! 1. **Scrape**: every configured source concurrently; per-source failures
//!    become error digests, never aborts
//! 2. **Sports**: NBA scoreboard + parallel boxscore enrichment, morning runs
//!    only
//! 3. **Compose & send**: priority-ranked digest email via SMTP, the only
//!    step whose failure exits non-zero
//!
//! Designed for cron: no persistence, no retries, bounded by per-request
//! timeouts.

use clap::Parser;
use std::error::Error;
use tracing::{debug, info, warn};
use tracing_subscriber::{EnvFilter, fmt as tfmt};

mod cli;
mod digest;
mod email;
mod fetch;
mod models;
mod priority;
mod scrapers;
mod text;

use cli::Cli;
use scrapers::nba::{self, PlayerMatcher};
use scrapers::sources;

#[tokio::main]
async fn main() -> Result<(), Box<dyn Error>> {
    // --- Tracing init ---
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tfmt()
        .with_env_filter(filter)
        .with_target(true)
        .with_file(false)
        .with_line_number(false)
        .with_timer(tracing_subscriber::fmt::time::UtcTime::rfc_3339())
        .init();

    let start_time = std::time::Instant::now();
    info!("morning_paper starting up");

    let args = Cli::parse();
    debug!(?args.sources, dry_run = args.dry_run, force_sports = args.force_sports, "Parsed CLI arguments");

    let source_configs = match &args.sources {
        Some(keys) => sources::select(keys)?,
        None => sources::all(),
    };

    let matcher = if args.exact_player_match {
        PlayerMatcher::exact(&args.featured_player)
    } else {
        PlayerMatcher::substring(&args.featured_player)
    };

    let include_sports = args.force_sports || nba::is_morning_digest();
    debug!(include_sports, sources = source_configs.len(), "Run plan");

    let client = fetch::build_client()?;
    let (digests, nba_scores) =
        digest::run_digest(&client, &source_configs, include_sports, &matcher).await;

    let total_articles: usize = digests.iter().map(|d| d.articles.len()).sum();
    info!(
        total_articles,
        sources = digests.len(),
        "Scraping complete"
    );
    if total_articles == 0 {
        warn!("No articles found in any source; digest will carry error information only");
    }

    if args.dry_run {
        println!("{}", email::render_text(&digests, nba_scores.as_ref()));
    } else {
        let recipient = args
            .recipient
            .as_deref()
            .ok_or("recipient address missing: pass --recipient or set RECIPIENT_EMAIL")?;
        let config = email::EmailConfig::from_env()?;
        info!(%recipient, "Sending digest");
        email::send_digest_email(&config, recipient, &digests, nba_scores.as_ref()).await?;
    }

    let elapsed = start_time.elapsed();
    info!(
        ?elapsed,
        secs = elapsed.as_secs(),
        millis = elapsed.subsec_millis(),
        "Execution complete"
    );

    Ok(())
}
