//! Data models for scraped articles and NBA results.
//!
//! This module defines the core data structures used throughout the application:
//! - [`Article`]: A single extracted headline with its priority score
//! - [`SourceDigest`]: One source's article list (or its failure) for one run
//! - [`NbaGame`], [`PlayerStat`]: A completed game with per-team stat leaders
//! - [`PlayerOfTheNight`], [`FeaturedPlayerStats`]: Derived spotlight records
//! - [`NbaScores`]: The whole sports section for one run
//!
//! All of these are transient: they live for exactly one digest run and are
//! never persisted. Articles are immutable once accepted by a scraper.

use chrono::{DateTime, Utc};
use serde::Serialize;

/// A single article extracted from a news source.
///
/// Uniqueness within one source's result set is enforced by exact-title match
/// during extraction; titles at or below the tier's minimum length never make
/// it into an `Article`.
#[derive(Debug, Clone, Serialize)]
pub struct Article {
    /// Sanitized headline text.
    pub title: String,
    /// Absolute `http(s)` URL of the article.
    pub url: String,
    /// Optional dek/summary paragraph, sanitized.
    pub summary: Option<String>,
    /// Optional section or category label.
    pub category: Option<String>,
    /// Editorial priority in `1..=10`, higher is more important.
    pub priority: u8,
    /// Whether this came from a top-level heading on the page.
    pub is_headline: bool,
    /// Source name, used when articles from several sources are mixed.
    pub source: Option<String>,
}

/// One source's scrape result for a single run.
///
/// Exactly one `SourceDigest` is produced per configured source per run. A
/// failed scrape yields `error: Some(..)` with an empty article list; the two
/// are never both meaningfully populated.
#[derive(Debug, Clone, Serialize)]
pub struct SourceDigest {
    /// Human-readable source name (e.g. "Público").
    pub source: String,
    /// The landing page that was scraped.
    pub source_url: String,
    /// Accepted articles in extraction order, capped at 15.
    pub articles: Vec<Article>,
    /// When the scrape finished.
    pub scraped_at: DateTime<Utc>,
    /// Failure message when the fetch or parse failed.
    pub error: Option<String>,
}

impl SourceDigest {
    /// Build the digest for a failed scrape.
    pub fn failed(source: &str, source_url: &str, error: impl Into<String>) -> Self {
        SourceDigest {
            source: source.to_string(),
            source_url: source_url.to_string(),
            articles: Vec::new(),
            scraped_at: Utc::now(),
            error: Some(error.into()),
        }
    }
}

/// A display-ready stat line for one player, e.g. `"24 PTS"`.
#[derive(Debug, Clone, Serialize)]
pub struct PlayerStat {
    pub name: String,
    pub value: String,
}

impl PlayerStat {
    /// Placeholder used when a leader could not be determined.
    pub fn unavailable() -> Self {
        PlayerStat {
            name: "N/A".to_string(),
            value: String::new(),
        }
    }
}

/// Which side won a completed game. Ties are impossible in basketball.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Winner {
    Home,
    Away,
}

/// A completed NBA game with final score and per-team stat leaders.
///
/// Scorer/rebounder/assists leaders come from the scoreboard payload;
/// steals/blocks/game-score leaders are filled in from the boxscore
/// enrichment pass and stay at [`PlayerStat::unavailable`] when that pass
/// fails for the game.
#[derive(Debug, Clone, Serialize)]
pub struct NbaGame {
    pub home_team: String,
    pub away_team: String,
    pub home_score: u32,
    pub away_score: u32,
    pub winner: Winner,
    pub home_top_scorer: PlayerStat,
    pub away_top_scorer: PlayerStat,
    pub home_top_rebounder: PlayerStat,
    pub away_top_rebounder: PlayerStat,
    pub home_top_assists: PlayerStat,
    pub away_top_assists: PlayerStat,
    pub home_top_steals: PlayerStat,
    pub away_top_steals: PlayerStat,
    pub home_top_blocks: PlayerStat,
    pub away_top_blocks: PlayerStat,
    pub home_top_game_score: PlayerStat,
    pub away_top_game_score: PlayerStat,
    /// AP News search link for coverage of this matchup.
    pub ap_article_url: String,
}

/// The single best composite-score performance across all of last night's
/// games. Recomputed every run, never persisted.
#[derive(Debug, Clone, Serialize)]
pub struct PlayerOfTheNight {
    pub name: String,
    pub team: String,
    pub points: u32,
    pub rebounds: u32,
    pub assists: u32,
    pub steals: u32,
    pub blocks: u32,
    /// Composite game score, rounded to one decimal place.
    pub game_score: f64,
    /// e.g. `"LAL @ BOS"`.
    pub matchup: String,
}

/// Spotlight stat line for the one configured featured player.
///
/// Present whenever the player appears in any boxscore, even with zero
/// minutes; `did_play` is false when the minutes column carries a DNP
/// sentinel.
#[derive(Debug, Clone, Serialize)]
pub struct FeaturedPlayerStats {
    pub name: String,
    pub team: String,
    pub points: u32,
    pub rebounds: u32,
    pub assists: u32,
    pub steals: u32,
    pub blocks: u32,
    pub minutes: String,
    pub matchup: String,
    pub did_play: bool,
}

/// The sports section for one digest run.
#[derive(Debug, Clone, Serialize)]
pub struct NbaScores {
    /// Completed games only; in-progress games are excluded entirely.
    pub games: Vec<NbaGame>,
    /// Human-formatted date the games were played, e.g. "Tuesday, March 4".
    pub date: String,
    pub player_of_the_night: Option<PlayerOfTheNight>,
    pub featured_player: Option<FeaturedPlayerStats>,
    /// Set when the scoreboard fetch itself failed; `games` is then empty.
    pub error: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_failed_digest_shape() {
        let digest = SourceDigest::failed("Expresso", "https://expresso.pt", "timed out");
        assert_eq!(digest.source, "Expresso");
        assert!(digest.articles.is_empty());
        assert_eq!(digest.error.as_deref(), Some("timed out"));
    }

    #[test]
    fn test_article_serialization() {
        let article = Article {
            title: "Governo aprova novo orçamento".to_string(),
            url: "https://expresso.pt/politica/orcamento".to_string(),
            summary: None,
            category: Some("Política".to_string()),
            priority: 8,
            is_headline: true,
            source: Some("Expresso".to_string()),
        };

        let json = serde_json::to_string(&article).unwrap();
        assert!(json.contains("\"priority\":8"));
        assert!(json.contains("orçamento"));
    }

    #[test]
    fn test_winner_serializes_lowercase() {
        assert_eq!(serde_json::to_string(&Winner::Home).unwrap(), "\"home\"");
        assert_eq!(serde_json::to_string(&Winner::Away).unwrap(), "\"away\"");
    }

    #[test]
    fn test_unavailable_stat() {
        let stat = PlayerStat::unavailable();
        assert_eq!(stat.name, "N/A");
        assert!(stat.value.is_empty());
    }
}
