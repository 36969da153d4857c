//! Command-line interface definitions for Morning Paper.
//!
//! All options can be provided via command-line flags or environment
//! variables, so the binary works equally well from a shell and from cron.

use clap::Parser;

/// Command-line arguments for the digest run.
///
/// # Examples
///
/// ```sh
/// # Preview the digest without SMTP credentials
/// morning_paper --dry-run
///
/// # Scrape a subset of sources and send
/// morning_paper --sources publico,guardian --recipient you@example.com
///
/// # Include the NBA section outside the morning window
/// morning_paper --force-sports --dry-run
/// ```
#[derive(Parser, Debug)]
#[command(author, version, about)]
pub struct Cli {
    /// Recipient email address for the digest
    #[arg(short, long, env = "RECIPIENT_EMAIL")]
    pub recipient: Option<String>,

    /// Comma-separated source keys to scrape (default: all sources)
    #[arg(long, value_delimiter = ',')]
    pub sources: Option<Vec<String>>,

    /// Player spotlighted in the NBA section
    #[arg(long, env = "FEATURED_PLAYER", default_value = "Neemias Queta")]
    pub featured_player: String,

    /// Match the featured player by exact name instead of substring
    #[arg(long)]
    pub exact_player_match: bool,

    /// Include the NBA section regardless of the time of day
    #[arg(long)]
    pub force_sports: bool,

    /// Print the text digest to stdout instead of sending email
    #[arg(long)]
    pub dry_run: bool,
}
