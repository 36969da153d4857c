//! NBA results from ESPN's public scoreboard and summary endpoints.
//!
//! The digest goes out in the morning, Lisbon time, while NBA games finish
//! late at night US time, so the scoreboard is always queried for *yesterday*
//! in UTC, and the whole section is gated on a morning-hours window.
//!
//! Two-phase fetch:
//! 1. One scoreboard call for the date. Completed games only; scores, winner,
//!    and the points/rebounds/assists leaders come straight from this payload.
//! 2. One summary (boxscore) call per completed game, fanned out in parallel
//!    and joined, to compute steals/blocks/game-score leaders per team, the
//!    Player of the Night, and the featured-player spotlight. Any single
//!    boxscore failure degrades that game to scoreboard-only data.

use crate::fetch::{BROWSER_USER_AGENT, PAGE_TIMEOUT};
use crate::models::{
    FeaturedPlayerStats, NbaGame, NbaScores, PlayerOfTheNight, PlayerStat, Winner,
};
use chrono::{Days, NaiveDate, Timelike, Utc};
use futures::future::join_all;
use reqwest::Client;
use reqwest::header::{ACCEPT, USER_AGENT};
use serde::Deserialize;
use std::collections::HashMap;
use std::error::Error;
use std::time::Duration;
use tracing::{debug, info, warn};

const SCOREBOARD_URL: &str =
    "https://site.api.espn.com/apis/site/v2/sports/basketball/nba/scoreboard";
const SUMMARY_URL: &str = "https://site.api.espn.com/apis/site/v2/sports/basketball/nba/summary";

const BOXSCORE_TIMEOUT: Duration = Duration::from_secs(10);

/// Minutes-column values meaning the player did not take the floor.
const DNP_SENTINELS: &[&str] = &["0", "DNP", "--"];

/// How the featured-player spotlight finds its target in boxscore names.
#[derive(Debug, Clone)]
pub enum PlayerMatcher {
    /// Case-insensitive full-name equality.
    Exact(String),
    /// Case-insensitive substring containment.
    Substring(String),
}

impl PlayerMatcher {
    pub fn exact(name: &str) -> Self {
        PlayerMatcher::Exact(name.to_lowercase())
    }

    pub fn substring(name: &str) -> Self {
        PlayerMatcher::Substring(name.to_lowercase())
    }

    pub fn matches(&self, display_name: &str) -> bool {
        let name = display_name.to_lowercase();
        match self {
            PlayerMatcher::Exact(target) => name == *target,
            PlayerMatcher::Substring(target) => name.contains(target.as_str()),
        }
    }
}

// ---- scoreboard payload ----

#[derive(Debug, Deserialize)]
struct ScoreboardResponse {
    #[serde(default)]
    events: Vec<ScoreboardEvent>,
}

#[derive(Debug, Deserialize)]
struct ScoreboardEvent {
    #[serde(default)]
    id: String,
    #[serde(default)]
    status: EventStatus,
    #[serde(default)]
    competitions: Vec<Competition>,
}

#[derive(Debug, Default, Deserialize)]
struct EventStatus {
    #[serde(rename = "type", default)]
    kind: StatusType,
}

#[derive(Debug, Default, Deserialize)]
struct StatusType {
    #[serde(default)]
    completed: bool,
}

#[derive(Debug, Deserialize)]
struct Competition {
    #[serde(default)]
    competitors: Vec<Competitor>,
}

#[derive(Debug, Deserialize)]
struct Competitor {
    #[serde(rename = "homeAway", default)]
    home_away: String,
    #[serde(default)]
    score: String,
    #[serde(default)]
    team: TeamInfo,
    #[serde(default)]
    leaders: Vec<LeaderCategory>,
}

#[derive(Debug, Default, Deserialize)]
struct TeamInfo {
    #[serde(default)]
    abbreviation: String,
}

#[derive(Debug, Deserialize)]
struct LeaderCategory {
    #[serde(default)]
    name: String,
    #[serde(rename = "displayName", default)]
    display_name: String,
    #[serde(default)]
    leaders: Vec<LeaderEntry>,
}

#[derive(Debug, Deserialize)]
struct LeaderEntry {
    #[serde(rename = "displayValue", default)]
    display_value: String,
    #[serde(default)]
    athlete: Option<AthleteRef>,
}

#[derive(Debug, Deserialize)]
struct AthleteRef {
    #[serde(rename = "displayName", default)]
    display_name: String,
}

// ---- summary (boxscore) payload ----

#[derive(Debug, Deserialize)]
struct SummaryResponse {
    #[serde(default)]
    boxscore: Option<BoxscorePayload>,
}

#[derive(Debug, Deserialize)]
struct BoxscorePayload {
    #[serde(default)]
    players: Vec<TeamBoxscore>,
}

#[derive(Debug, Deserialize)]
struct TeamBoxscore {
    #[serde(default)]
    team: TeamInfo,
    #[serde(default)]
    statistics: Vec<StatisticGroup>,
}

#[derive(Debug, Deserialize)]
struct StatisticGroup {
    #[serde(default)]
    athletes: Vec<AthleteLine>,
}

#[derive(Debug, Deserialize)]
struct AthleteLine {
    #[serde(default)]
    athlete: Option<AthleteRef>,
    #[serde(default)]
    stats: Vec<String>,
}

// ---- derived records ----

/// A completed game's id plus its display matchup, e.g. `"LAL @ BOS"`.
#[derive(Debug, Clone)]
struct GameRef {
    id: String,
    matchup: String,
}

/// One player's extracted boxscore line.
#[derive(Debug, Clone)]
struct PlayerLine {
    name: String,
    team: String,
    points: u32,
    rebounds: u32,
    assists: u32,
    steals: u32,
    blocks: u32,
    matchup: String,
}

/// Per-team leaders computed from a boxscore. `None` means nobody recorded a
/// positive value in the category.
#[derive(Debug, Default)]
struct TeamLeaders {
    steals: Option<(String, u32)>,
    blocks: Option<(String, u32)>,
    /// Leader name, rounded game score, and a "X PTS, Y REB, Z AST" line.
    game_score: Option<(String, f64, String)>,
}

#[derive(Debug, Default)]
struct GameBoxscore {
    players: Vec<PlayerLine>,
    featured: Option<FeaturedPlayerStats>,
    team_leaders: HashMap<String, TeamLeaders>,
}

/// Composite single-number performance metric for a boxscore line.
///
/// Steals and blocks are weighted heavily since they are much rarer than
/// points.
fn game_score(points: u32, rebounds: u32, assists: u32, steals: u32, blocks: u32) -> f64 {
    f64::from(points)
        + 0.4 * f64::from(rebounds)
        + 0.7 * f64::from(assists)
        + 2.0 * f64::from(steals)
        + 2.0 * f64::from(blocks)
}

fn round1(value: f64) -> f64 {
    (value * 10.0).round() / 10.0
}

fn did_not_play(minutes: &str) -> bool {
    DNP_SENTINELS.contains(&minutes)
}

/// Whether a run at this UTC hour should carry the sports section.
/// The digest cron fires at 06:00 UTC (07:00 in Portugal); the window is
/// half-open `[5, 8)`.
pub fn is_morning_window(hour: u32) -> bool {
    (5..8).contains(&hour)
}

/// Morning-window predicate against the current clock.
pub fn is_morning_digest() -> bool {
    is_morning_window(Utc::now().hour())
}

fn yesterday() -> NaiveDate {
    Utc::now().date_naive() - Days::new(1)
}

/// Full team name for an ESPN abbreviation, where known.
fn team_full_name(abbreviation: &str) -> Option<&'static str> {
    let name = match abbreviation {
        "ATL" => "Atlanta Hawks",
        "BOS" => "Boston Celtics",
        "BKN" => "Brooklyn Nets",
        "CHA" => "Charlotte Hornets",
        "CHI" => "Chicago Bulls",
        "CLE" => "Cleveland Cavaliers",
        "DAL" => "Dallas Mavericks",
        "DEN" => "Denver Nuggets",
        "DET" => "Detroit Pistons",
        "GS" | "GSW" => "Golden State Warriors",
        "HOU" => "Houston Rockets",
        "IND" => "Indiana Pacers",
        "LAC" => "Los Angeles Clippers",
        "LAL" => "Los Angeles Lakers",
        "MEM" => "Memphis Grizzlies",
        "MIA" => "Miami Heat",
        "MIL" => "Milwaukee Bucks",
        "MIN" => "Minnesota Timberwolves",
        "NO" | "NOP" => "New Orleans Pelicans",
        "NY" | "NYK" => "New York Knicks",
        "OKC" => "Oklahoma City Thunder",
        "ORL" => "Orlando Magic",
        "PHI" => "Philadelphia 76ers",
        "PHX" => "Phoenix Suns",
        "POR" => "Portland Trail Blazers",
        "SA" | "SAS" => "San Antonio Spurs",
        "SAC" => "Sacramento Kings",
        "TOR" => "Toronto Raptors",
        "UTAH" | "UTA" => "Utah Jazz",
        "WAS" => "Washington Wizards",
        _ => return None,
    };
    Some(name)
}

/// AP News search link for a game, using team nicknames for a cleaner query.
fn ap_news_url(away: &str, home: &str) -> String {
    let nickname = |abbr: &str| -> String {
        team_full_name(abbr)
            .and_then(|full| full.split(' ').next_back())
            .unwrap_or(abbr)
            .to_string()
    };
    let query = format!("{} {} NBA", nickname(away), nickname(home));
    format!("https://apnews.com/search?q={}", urlencoding::encode(&query))
}

/// Leader stat for one category straight from the scoreboard payload.
fn scoreboard_leader(competitor: &Competitor, category: &str, suffix: &str) -> PlayerStat {
    let entry = competitor
        .leaders
        .iter()
        .find(|l| l.name == category || l.display_name.eq_ignore_ascii_case(category))
        .and_then(|l| l.leaders.first());
    match entry {
        Some(entry) => PlayerStat {
            name: entry
                .athlete
                .as_ref()
                .map(|a| a.display_name.clone())
                .unwrap_or_else(|| "Unknown".to_string()),
            value: format!("{} {}", entry.display_value, suffix),
        },
        None => PlayerStat::unavailable(),
    }
}

/// Turn the scoreboard payload into game records plus the refs needed for
/// boxscore enrichment. In-progress and scheduled games are dropped entirely.
fn parse_scoreboard(response: ScoreboardResponse) -> (Vec<NbaGame>, Vec<GameRef>) {
    let mut games = Vec::new();
    let mut refs = Vec::new();

    for event in response.events {
        if !event.status.kind.completed {
            continue;
        }
        let Some(competition) = event.competitions.first() else {
            continue;
        };
        let home = competition.competitors.iter().find(|c| c.home_away == "home");
        let away = competition.competitors.iter().find(|c| c.home_away == "away");
        let (Some(home), Some(away)) = (home, away) else {
            continue;
        };

        let home_score = home.score.parse::<u32>().unwrap_or(0);
        let away_score = away.score.parse::<u32>().unwrap_or(0);
        let home_abbr = if home.team.abbreviation.is_empty() {
            "HOME".to_string()
        } else {
            home.team.abbreviation.clone()
        };
        let away_abbr = if away.team.abbreviation.is_empty() {
            "AWAY".to_string()
        } else {
            away.team.abbreviation.clone()
        };

        refs.push(GameRef {
            id: event.id.clone(),
            matchup: format!("{away_abbr} @ {home_abbr}"),
        });

        games.push(NbaGame {
            winner: if home_score > away_score {
                Winner::Home
            } else {
                Winner::Away
            },
            home_top_scorer: scoreboard_leader(home, "points", "PTS"),
            away_top_scorer: scoreboard_leader(away, "points", "PTS"),
            home_top_rebounder: scoreboard_leader(home, "rebounds", "REB"),
            away_top_rebounder: scoreboard_leader(away, "rebounds", "REB"),
            home_top_assists: scoreboard_leader(home, "assists", "AST"),
            away_top_assists: scoreboard_leader(away, "assists", "AST"),
            // Filled in from the boxscore pass; absent when that pass fails.
            home_top_steals: PlayerStat::unavailable(),
            away_top_steals: PlayerStat::unavailable(),
            home_top_blocks: PlayerStat::unavailable(),
            away_top_blocks: PlayerStat::unavailable(),
            home_top_game_score: PlayerStat::unavailable(),
            away_top_game_score: PlayerStat::unavailable(),
            ap_article_url: ap_news_url(&away_abbr, &home_abbr),
            home_team: home_abbr,
            away_team: away_abbr,
            home_score,
            away_score,
        });
    }

    (games, refs)
}

fn stat_at(stats: &[String], index: usize) -> u32 {
    stats
        .get(index)
        .and_then(|s| s.parse::<u32>().ok())
        .unwrap_or(0)
}

/// Extract every player line, the per-team leaders, and the featured player
/// from one game's summary payload.
///
/// Summary-endpoint stat columns, by position:
/// `0 MIN, 1 PTS, 2 FG, 3 3PT, 4 FT, 5 REB, 6 AST, 7 TO, 8 STL, 9 BLK,
/// 10 OREB, 11 DREB, 12 PF, 13 +/-`
fn parse_boxscore(
    response: SummaryResponse,
    matchup: &str,
    matcher: &PlayerMatcher,
) -> GameBoxscore {
    let mut result = GameBoxscore::default();
    let Some(boxscore) = response.boxscore else {
        return result;
    };

    for team in boxscore.players {
        let team_abbr = if team.team.abbreviation.is_empty() {
            "UNK".to_string()
        } else {
            team.team.abbreviation.clone()
        };
        let mut leaders = TeamLeaders::default();

        for group in &team.statistics {
            for line in &group.athletes {
                let Some(athlete) = &line.athlete else {
                    continue;
                };
                if athlete.display_name.is_empty() || line.stats.len() < 10 {
                    continue;
                }

                let minutes = line.stats[0].clone();
                let points = stat_at(&line.stats, 1);
                let rebounds = stat_at(&line.stats, 5);
                let assists = stat_at(&line.stats, 6);
                let steals = stat_at(&line.stats, 8);
                let blocks = stat_at(&line.stats, 9);

                // The spotlight records the featured player even on a DNP night.
                if matcher.matches(&athlete.display_name) {
                    result.featured = Some(FeaturedPlayerStats {
                        name: athlete.display_name.clone(),
                        team: team_abbr.clone(),
                        points,
                        rebounds,
                        assists,
                        steals,
                        blocks,
                        minutes: minutes.clone(),
                        matchup: matchup.to_string(),
                        did_play: !did_not_play(&minutes),
                    });
                }

                if did_not_play(&minutes) {
                    continue;
                }

                if steals > leaders.steals.as_ref().map_or(0, |(_, v)| *v) {
                    leaders.steals = Some((athlete.display_name.clone(), steals));
                }
                if blocks > leaders.blocks.as_ref().map_or(0, |(_, v)| *v) {
                    leaders.blocks = Some((athlete.display_name.clone(), blocks));
                }

                let score = game_score(points, rebounds, assists, steals, blocks);
                if score > leaders.game_score.as_ref().map_or(0.0, |(_, v, _)| *v) {
                    leaders.game_score = Some((
                        athlete.display_name.clone(),
                        round1(score),
                        format!("{points} PTS, {rebounds} REB, {assists} AST"),
                    ));
                }

                result.players.push(PlayerLine {
                    name: athlete.display_name.clone(),
                    team: team_abbr.clone(),
                    points,
                    rebounds,
                    assists,
                    steals,
                    blocks,
                    matchup: matchup.to_string(),
                });
            }
        }

        result.team_leaders.insert(team_abbr, leaders);
    }

    result
}

/// The single best composite performance across every extracted line.
/// A strictly-greater comparison keeps the first-encountered line on ties,
/// stable in game-list then athlete-list order.
fn player_of_the_night(players: &[PlayerLine]) -> Option<PlayerOfTheNight> {
    let mut best: Option<(&PlayerLine, f64)> = None;
    for player in players {
        let score = game_score(
            player.points,
            player.rebounds,
            player.assists,
            player.steals,
            player.blocks,
        );
        let replace = match &best {
            Some((_, best_score)) => score > *best_score,
            None => true,
        };
        if replace {
            best = Some((player, score));
        }
    }
    best.map(|(player, score)| PlayerOfTheNight {
        name: player.name.clone(),
        team: player.team.clone(),
        points: player.points,
        rebounds: player.rebounds,
        assists: player.assists,
        steals: player.steals,
        blocks: player.blocks,
        game_score: round1(score),
        matchup: player.matchup.clone(),
    })
}

fn leader_stat(leader: &Option<(String, u32)>, suffix: &str) -> PlayerStat {
    match leader {
        Some((name, value)) => PlayerStat {
            name: name.clone(),
            value: format!("{value} {suffix}"),
        },
        None => PlayerStat {
            name: "N/A".to_string(),
            value: format!("0 {suffix}"),
        },
    }
}

fn game_score_stat(leader: &Option<(String, f64, String)>) -> PlayerStat {
    match leader {
        Some((name, score, line)) => PlayerStat {
            name: name.clone(),
            value: format!("GmSc: {score} ({line})"),
        },
        None => PlayerStat::unavailable(),
    }
}

fn apply_team_leaders(game: &mut NbaGame, leaders: &HashMap<String, TeamLeaders>) {
    if let Some(home) = leaders.get(&game.home_team) {
        game.home_top_steals = leader_stat(&home.steals, "STL");
        game.home_top_blocks = leader_stat(&home.blocks, "BLK");
        game.home_top_game_score = game_score_stat(&home.game_score);
    }
    if let Some(away) = leaders.get(&game.away_team) {
        game.away_top_steals = leader_stat(&away.steals, "STL");
        game.away_top_blocks = leader_stat(&away.blocks, "BLK");
        game.away_top_game_score = game_score_stat(&away.game_score);
    }
}

async fn fetch_scoreboard(
    client: &Client,
    date_param: &str,
) -> Result<ScoreboardResponse, Box<dyn Error>> {
    let url = format!("{SCOREBOARD_URL}?dates={date_param}");
    let response = client
        .get(&url)
        .header(USER_AGENT, BROWSER_USER_AGENT)
        .header(ACCEPT, "application/json")
        .timeout(PAGE_TIMEOUT)
        .send()
        .await?
        .error_for_status()?
        .json::<ScoreboardResponse>()
        .await?;
    Ok(response)
}

/// Best-effort boxscore fetch for one game. Failures degrade to an empty
/// result so the game keeps its scoreboard-only data.
async fn fetch_game_boxscore(
    client: &Client,
    game: &GameRef,
    matcher: &PlayerMatcher,
) -> GameBoxscore {
    let url = format!("{SUMMARY_URL}?event={}", game.id);
    let response = client
        .get(&url)
        .header(USER_AGENT, BROWSER_USER_AGENT)
        .header(ACCEPT, "application/json")
        .timeout(BOXSCORE_TIMEOUT)
        .send()
        .await
        .and_then(|r| r.error_for_status());

    let payload = match response {
        Ok(response) => response.json::<SummaryResponse>().await,
        Err(e) => {
            warn!(game_id = %game.id, error = %e, "boxscore fetch failed");
            return GameBoxscore::default();
        }
    };

    match payload {
        Ok(payload) => {
            let parsed = parse_boxscore(payload, &game.matchup, matcher);
            debug!(game_id = %game.id, players = parsed.players.len(), "parsed boxscore");
            parsed
        }
        Err(e) => {
            warn!(game_id = %game.id, error = %e, "boxscore decode failed");
            GameBoxscore::default()
        }
    }
}

/// Fetch last night's NBA results. Never fails: a scoreboard-level problem is
/// reported through [`NbaScores::error`] with an empty game list.
pub async fn fetch_nba_scores(client: &Client, matcher: &PlayerMatcher) -> NbaScores {
    let query_date = yesterday();
    let date_param = query_date.format("%Y%m%d").to_string();
    let display_date = query_date.format("%A, %B %-d").to_string();

    let payload = match fetch_scoreboard(client, &date_param).await {
        Ok(payload) => payload,
        Err(e) => {
            warn!(error = %e, date = %date_param, "scoreboard fetch failed");
            return NbaScores {
                games: Vec::new(),
                date: display_date,
                player_of_the_night: None,
                featured_player: None,
                error: Some(e.to_string()),
            };
        }
    };

    let (mut games, refs) = parse_scoreboard(payload);
    info!(games = games.len(), date = %date_param, "completed games on the scoreboard");

    // One boxscore request per game, all in flight at once.
    let boxscores = join_all(
        refs.iter()
            .map(|game| fetch_game_boxscore(client, game, matcher)),
    )
    .await;

    let mut all_players = Vec::new();
    let mut featured = None;
    for (game, boxscore) in games.iter_mut().zip(boxscores) {
        apply_team_leaders(game, &boxscore.team_leaders);
        if boxscore.featured.is_some() {
            featured = boxscore.featured;
        }
        all_players.extend(boxscore.players);
    }

    NbaScores {
        games,
        date: display_date,
        player_of_the_night: player_of_the_night(&all_players),
        featured_player: featured,
        error: None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_game_score_formula() {
        // 40 PTS, 10 REB, 5 AST, 3 STL, 1 BLK -> 40 + 4 + 3.5 + 6 + 2 = 55.5
        assert_eq!(game_score(40, 10, 5, 3, 1), 55.5);
        assert_eq!(game_score(0, 0, 0, 0, 0), 0.0);
    }

    #[test]
    fn test_morning_window_boundaries() {
        assert!(is_morning_window(5));
        assert!(is_morning_window(6));
        assert!(is_morning_window(7));
        assert!(!is_morning_window(8));
        assert!(!is_morning_window(14));
        assert!(!is_morning_window(4));
    }

    #[test]
    fn test_ap_news_url_uses_nicknames() {
        let url = ap_news_url("LAL", "BOS");
        assert_eq!(url, "https://apnews.com/search?q=Lakers%20Celtics%20NBA");
        // Unknown codes fall back to the raw abbreviation.
        let url = ap_news_url("XXX", "BOS");
        assert!(url.contains("XXX%20Celtics"));
    }

    #[test]
    fn test_player_matcher() {
        let substring = PlayerMatcher::substring("queta");
        assert!(substring.matches("Neemias Queta"));
        assert!(substring.matches("NEEMIAS QUETA"));
        assert!(!substring.matches("Nikola Jokic"));

        let exact = PlayerMatcher::exact("Neemias Queta");
        assert!(exact.matches("neemias queta"));
        assert!(!exact.matches("Neemias Queta Jr."));
    }

    fn scoreboard_fixture() -> ScoreboardResponse {
        serde_json::from_value(json!({
            "events": [
                {
                    "id": "401",
                    "status": { "type": { "completed": true } },
                    "competitions": [{
                        "competitors": [
                            {
                                "homeAway": "home",
                                "score": "110",
                                "team": { "abbreviation": "BOS" },
                                "leaders": [{
                                    "name": "points",
                                    "displayName": "Points",
                                    "leaders": [{
                                        "displayValue": "31",
                                        "athlete": { "displayName": "Jayson Tatum" }
                                    }]
                                }]
                            },
                            {
                                "homeAway": "away",
                                "score": "102",
                                "team": { "abbreviation": "LAL" },
                                "leaders": []
                            }
                        ]
                    }]
                },
                {
                    "id": "402",
                    "status": { "type": { "completed": false } },
                    "competitions": [{ "competitors": [] }]
                }
            ]
        }))
        .unwrap()
    }

    #[test]
    fn test_parse_scoreboard_completed_games_only() {
        let (games, refs) = parse_scoreboard(scoreboard_fixture());
        assert_eq!(games.len(), 1);
        assert_eq!(refs.len(), 1);
        assert_eq!(refs[0].matchup, "LAL @ BOS");

        let game = &games[0];
        assert_eq!(game.home_team, "BOS");
        assert_eq!(game.away_team, "LAL");
        assert_eq!(game.winner, Winner::Home);
        assert_eq!(game.home_top_scorer.name, "Jayson Tatum");
        assert_eq!(game.home_top_scorer.value, "31 PTS");
        assert_eq!(game.away_top_scorer.name, "N/A");
        // Boxscore-derived leaders start out unavailable.
        assert_eq!(game.home_top_steals.name, "N/A");
        assert!(game.ap_article_url.contains("apnews.com/search"));
    }

    fn boxscore_fixture() -> SummaryResponse {
        serde_json::from_value(json!({
            "boxscore": {
                "players": [
                    {
                        "team": { "abbreviation": "BOS" },
                        "statistics": [{
                            "athletes": [
                                {
                                    "athlete": { "displayName": "Jayson Tatum" },
                                    "stats": ["38", "40", "15-26", "5-10", "10-11", "10", "5", "2", "3", "1", "2", "8", "1", "+12"]
                                },
                                {
                                    "athlete": { "displayName": "Neemias Queta" },
                                    "stats": ["DNP", "0", "0-0", "0-0", "0-0", "0", "0", "0", "0", "0", "0", "0", "0", "0"]
                                }
                            ]
                        }]
                    },
                    {
                        "team": { "abbreviation": "LAL" },
                        "statistics": [{
                            "athletes": [
                                {
                                    "athlete": { "displayName": "LeBron James" },
                                    "stats": ["36", "28", "11-20", "2-6", "4-5", "8", "11", "4", "1", "1", "1", "7", "2", "-8"]
                                },
                                {
                                    "athlete": { "displayName": "Bench Player" },
                                    "stats": ["0", "0", "0-0", "0-0", "0-0", "0", "0", "0", "0", "0", "0", "0", "0", "0"]
                                }
                            ]
                        }]
                    }
                ]
            }
        }))
        .unwrap()
    }

    #[test]
    fn test_parse_boxscore_leaders_and_dnp() {
        let matcher = PlayerMatcher::substring("queta");
        let result = parse_boxscore(boxscore_fixture(), "LAL @ BOS", &matcher);

        // DNP players are excluded from lines and leader consideration.
        assert_eq!(result.players.len(), 2);

        let bos = &result.team_leaders["BOS"];
        assert_eq!(bos.steals.as_ref().unwrap().0, "Jayson Tatum");
        assert_eq!(bos.steals.as_ref().unwrap().1, 3);
        // 40 + 0.4*10 + 0.7*5 + 2*3 + 2*1 = 55.5
        assert_eq!(bos.game_score.as_ref().unwrap().1, 55.5);
        assert_eq!(bos.game_score.as_ref().unwrap().2, "40 PTS, 10 REB, 5 AST");

        let lal = &result.team_leaders["LAL"];
        // 28 + 3.2 + 7.7 + 2 + 2 = 42.9
        assert_eq!(lal.game_score.as_ref().unwrap().1, 42.9);
    }

    #[test]
    fn test_featured_player_recorded_even_on_dnp() {
        let matcher = PlayerMatcher::substring("queta");
        let result = parse_boxscore(boxscore_fixture(), "LAL @ BOS", &matcher);

        let featured = result.featured.unwrap();
        assert_eq!(featured.name, "Neemias Queta");
        assert_eq!(featured.team, "BOS");
        assert!(!featured.did_play);
        assert_eq!(featured.matchup, "LAL @ BOS");
    }

    #[test]
    fn test_player_of_the_night_picks_documented_maximum() {
        let matcher = PlayerMatcher::substring("queta");
        let result = parse_boxscore(boxscore_fixture(), "LAL @ BOS", &matcher);
        let best = player_of_the_night(&result.players).unwrap();
        assert_eq!(best.name, "Jayson Tatum");
        assert_eq!(best.game_score, 55.5);
        assert_eq!(best.matchup, "LAL @ BOS");
    }

    #[test]
    fn test_player_of_the_night_tie_keeps_first_encountered() {
        let line = |name: &str| PlayerLine {
            name: name.to_string(),
            team: "BOS".to_string(),
            points: 20,
            rebounds: 5,
            assists: 5,
            steals: 1,
            blocks: 1,
            matchup: "LAL @ BOS".to_string(),
        };
        let players = vec![line("First Player"), line("Second Player")];
        assert_eq!(player_of_the_night(&players).unwrap().name, "First Player");
    }

    #[test]
    fn test_apply_team_leaders_formats_display_values() {
        let (mut games, _) = parse_scoreboard(scoreboard_fixture());
        let matcher = PlayerMatcher::substring("queta");
        let boxscore = parse_boxscore(boxscore_fixture(), "LAL @ BOS", &matcher);
        apply_team_leaders(&mut games[0], &boxscore.team_leaders);

        let game = &games[0];
        assert_eq!(game.home_top_steals.value, "3 STL");
        assert_eq!(game.home_top_blocks.value, "1 BLK");
        assert!(game.home_top_game_score.value.starts_with("GmSc: 55.5"));
        assert_eq!(game.away_top_steals.value, "1 STL");
    }

    #[test]
    fn test_empty_scoreboard_parses_to_nothing() {
        let response: ScoreboardResponse = serde_json::from_value(json!({})).unwrap();
        let (games, refs) = parse_scoreboard(response);
        assert!(games.is_empty());
        assert!(refs.is_empty());
    }
}
