//! Digest composition and SMTP delivery.
//!
//! Renders the collected digests into a multipart alternative message (plain
//! text plus styled HTML) and sends it through an SMTP relay configured from
//! the environment. Every piece of scraped text that lands in the HTML body
//! goes through [`escape_html`] on the way in.
//!
//! Sending is the one fatal operation of the whole program: a digest that
//! cannot be delivered is a failed run.

use crate::models::{Article, NbaGame, NbaScores, SourceDigest, Winner};
use crate::text::escape_html;
use chrono::{DateTime, Local, Timelike};
use itertools::Itertools;
use lettre::message::{Mailbox, MultiPart};
use lettre::transport::smtp::authentication::Credentials;
use lettre::{AsyncSmtpTransport, AsyncTransport, Message, Tokio1Executor};
use std::error::Error;
use tracing::info;

const TOP_HEADLINE_COUNT: usize = 5;
const SUBJECT_TITLE_LIMIT: usize = 60;

/// SMTP transport settings, read from the environment.
#[derive(Debug, Clone)]
pub struct EmailConfig {
    pub host: String,
    pub user: String,
    pub pass: String,
}

impl EmailConfig {
    /// `SMTP_HOST` defaults to Gmail; `SMTP_USER`/`SMTP_PASS` are required.
    pub fn from_env() -> Result<Self, Box<dyn Error>> {
        let host = std::env::var("SMTP_HOST").unwrap_or_else(|_| "smtp.gmail.com".to_string());
        let user = std::env::var("SMTP_USER")
            .map_err(|_| "SMTP credentials not configured: set SMTP_USER")?;
        let pass = std::env::var("SMTP_PASS")
            .map_err(|_| "SMTP credentials not configured: set SMTP_PASS")?;
        Ok(EmailConfig { host, user, pass })
    }
}

/// Compose and send the digest. Errors here abort the run.
pub async fn send_digest_email(
    config: &EmailConfig,
    recipient: &str,
    digests: &[SourceDigest],
    nba: Option<&NbaScores>,
) -> Result<(), Box<dyn Error>> {
    let subject = subject_line(digests, Local::now());
    let text = render_text(digests, nba);
    let html = render_html(digests, nba);

    let from: Mailbox = format!("News Digest <{}>", config.user).parse()?;
    let to: Mailbox = recipient.parse()?;
    let message = Message::builder()
        .from(from)
        .to(to)
        .subject(subject.as_str())
        .multipart(MultiPart::alternative_plain_html(text, html))?;

    let credentials = Credentials::new(config.user.clone(), config.pass.clone());
    let mailer = AsyncSmtpTransport::<Tokio1Executor>::relay(&config.host)?
        .credentials(credentials)
        .build();

    mailer.send(message).await?;
    info!(%recipient, %subject, "digest sent");
    Ok(())
}

/// All articles across all sources, tagged with their source name and sorted
/// by priority (descending, stable), truncated to `count`.
fn top_headlines(digests: &[SourceDigest], count: usize) -> Vec<Article> {
    digests
        .iter()
        .flat_map(|digest| {
            digest.articles.iter().map(|article| {
                let mut article = article.clone();
                article.source = Some(digest.source.clone());
                article
            })
        })
        .sorted_by(|a, b| b.priority.cmp(&a.priority))
        .take(count)
        .collect()
}

/// Subject: Portuguese time-of-day label, dd/mm date, and the top story.
pub fn subject_line(digests: &[SourceDigest], now: DateTime<Local>) -> String {
    let label = time_of_day_label(now.hour());
    let date = now.format("%d/%m");
    let top_story = top_headlines(digests, 1)
        .into_iter()
        .next()
        .map(|article| article.title)
        .unwrap_or_else(|| "Your news digest is ready".to_string());

    let truncated: String = top_story.chars().take(SUBJECT_TITLE_LIMIT).collect();
    let ellipsis = if top_story.chars().count() > SUBJECT_TITLE_LIMIT {
        "..."
    } else {
        ""
    };
    format!("📰 {label} ({date}): {truncated}{ellipsis}")
}

fn time_of_day_label(hour: u32) -> &'static str {
    match hour {
        6..=11 => "Manhã",
        12..=13 => "Meio-dia",
        14..=18 => "Tarde",
        _ => "Noite",
    }
}

// ---- HTML rendering ----

const STYLE: &str = "\
  body{font-family:-apple-system,BlinkMacSystemFont,'Segoe UI',Roboto,Arial,sans-serif;\
line-height:1.6;color:#333;max-width:800px;margin:0 auto;padding:20px;background-color:#f5f5f5}\
  .container{background-color:#fff;border-radius:8px;padding:30px;box-shadow:0 2px 4px rgba(0,0,0,.1)}\
  .header{text-align:center;border-bottom:2px solid #e0e0e0;padding-bottom:20px;margin-bottom:30px}\
  .header h1{color:#1a1a1a;margin:0 0 10px 0;font-size:28px}\
  .header .date{color:#666;font-size:14px}\
  .top-headlines{background:#16213e;border-radius:12px;padding:25px;margin-bottom:35px;color:#fff}\
  .top-headlines h2{margin:0 0 20px 0;font-size:22px;color:#ffd700}\
  .top-headline-item{padding:15px 0;border-bottom:1px solid rgba(255,255,255,.1)}\
  .top-headline-item h3{margin:0 0 8px 0;font-size:18px}\
  .top-headline-item h3 a{color:#fff;text-decoration:none}\
  .top-headline-source{background-color:rgba(255,215,0,.2);color:#ffd700;padding:3px 10px;border-radius:12px;font-size:13px}\
  .priority-badge{background-color:rgba(255,255,255,.15);color:rgba(255,255,255,.9);padding:2px 8px;border-radius:10px;font-size:11px}\
  .top-headline-summary{color:rgba(255,255,255,.8);font-size:14px;margin-top:8px}\
  .source-section{margin-bottom:35px}\
  .source-header{margin-bottom:15px;padding-bottom:10px;border-bottom:1px solid #e0e0e0}\
  .source-header h2{margin:0;font-size:20px;color:#2c3e50;display:inline}\
  .source-header a{color:#3498db;text-decoration:none;font-size:14px;margin-left:10px}\
  .article{margin-bottom:15px;padding:12px 0;border-bottom:1px solid #f0f0f0}\
  .article-title{margin:0 0 5px 0;font-size:16px}\
  .article-title a{color:#1a1a1a;text-decoration:none}\
  .article-summary{color:#666;font-size:14px;margin:5px 0 0 0}\
  .article-category{display:inline-block;background-color:#e8f4fc;color:#2980b9;padding:2px 8px;border-radius:4px;font-size:12px;margin-top:5px}\
  .error{color:#e74c3c;font-style:italic;padding:10px;background-color:#fdf2f2;border-radius:4px}\
  .no-articles{color:#999;font-style:italic}\
  .nba-section{background:#0b1c2c;border-radius:12px;padding:25px;margin-bottom:35px;color:#fff}\
  .nba-section h2{margin:0 0 5px 0;font-size:22px;color:#f7a940}\
  .nba-date{color:rgba(255,255,255,.6);font-size:13px;margin-bottom:15px}\
  .nba-game{padding:12px 0;border-bottom:1px solid rgba(255,255,255,.1)}\
  .nba-score{font-size:17px;font-weight:600}\
  .nba-leaders{color:rgba(255,255,255,.75);font-size:13px;margin-top:4px}\
  .nba-card{background:rgba(255,255,255,.08);border-radius:8px;padding:12px;margin-top:15px}\
  .nba-card h3{margin:0 0 6px 0;font-size:15px;color:#f7a940}\
  .nba-recap a{color:#7db7e8;font-size:12px;text-decoration:none}\
  .footer{text-align:center;margin-top:30px;padding-top:20px;border-top:1px solid #e0e0e0;color:#999;font-size:12px}";

/// Render the full HTML body.
pub fn render_html(digests: &[SourceDigest], nba: Option<&NbaScores>) -> String {
    let now = Local::now();
    let mut html = String::with_capacity(16 * 1024);

    html.push_str("<!DOCTYPE html>\n<html lang=\"pt\">\n<head>\n<meta charset=\"UTF-8\">\n");
    html.push_str("<meta name=\"viewport\" content=\"width=device-width, initial-scale=1.0\">\n");
    html.push_str("<title>News Digest</title>\n<style>");
    html.push_str(STYLE);
    html.push_str("</style>\n</head>\n<body>\n<div class=\"container\">\n");

    html.push_str(&format!(
        "<div class=\"header\"><h1>📰 News Digest</h1><p class=\"date\">{}</p></div>\n",
        now.format("%d/%m/%Y %H:%M")
    ));

    let top = top_headlines(digests, TOP_HEADLINE_COUNT);
    if !top.is_empty() {
        html.push_str("<div class=\"top-headlines\">\n<h2>⭐ Top Headlines</h2>\n");
        for article in &top {
            html.push_str(&format!(
                "<div class=\"top-headline-item\">\n<h3><a href=\"{}\">{}</a></h3>\n\
                 <span class=\"top-headline-source\">{}</span> \
                 <span class=\"priority-badge\">Priority: {}/10</span>\n",
                escape_html(&article.url),
                escape_html(&article.title),
                escape_html(article.source.as_deref().unwrap_or("")),
                article.priority,
            ));
            if let Some(summary) = &article.summary {
                html.push_str(&format!(
                    "<p class=\"top-headline-summary\">{}</p>\n",
                    escape_html(summary)
                ));
            }
            html.push_str("</div>\n");
        }
        html.push_str("</div>\n");
    }

    if let Some(scores) = nba {
        render_nba_html(&mut html, scores);
    }

    for digest in digests {
        html.push_str(&format!(
            "<div class=\"source-section\">\n<div class=\"source-header\">\
             <h2>{}</h2><a href=\"{}\">Ver site →</a></div>\n",
            escape_html(&digest.source),
            escape_html(&digest.source_url),
        ));

        if let Some(error) = &digest.error {
            html.push_str(&format!(
                "<p class=\"error\">⚠️ Erro ao carregar: {}</p>\n",
                escape_html(error)
            ));
        } else if digest.articles.is_empty() {
            html.push_str("<p class=\"no-articles\">Nenhum artigo encontrado</p>\n");
        } else {
            for article in &digest.articles {
                html.push_str(&format!(
                    "<div class=\"article\">\n<h3 class=\"article-title\"><a href=\"{}\">{}</a></h3>\n",
                    escape_html(&article.url),
                    escape_html(&article.title),
                ));
                if let Some(summary) = &article.summary {
                    html.push_str(&format!(
                        "<p class=\"article-summary\">{}</p>\n",
                        escape_html(summary)
                    ));
                }
                if let Some(category) = &article.category {
                    html.push_str(&format!(
                        "<span class=\"article-category\">{}</span>\n",
                        escape_html(category)
                    ));
                }
                html.push_str("</div>\n");
            }
        }
        html.push_str("</div>\n");
    }

    html.push_str(
        "<div class=\"footer\"><p>Este digest é gerado automaticamente.</p>\
         <p>Fontes: Expresso, Público, Observador, ZeroZero, The Guardian, The New York Times</p></div>\n",
    );
    html.push_str("</div>\n</body>\n</html>\n");
    html
}

fn render_nba_html(html: &mut String, scores: &NbaScores) {
    html.push_str("<div class=\"nba-section\">\n<h2>🏀 NBA</h2>\n");
    html.push_str(&format!(
        "<p class=\"nba-date\">{}</p>\n",
        escape_html(&scores.date)
    ));

    if let Some(error) = &scores.error {
        html.push_str(&format!(
            "<p class=\"error\">⚠️ Resultados indisponíveis: {}</p>\n",
            escape_html(error)
        ));
        html.push_str("</div>\n");
        return;
    }

    if scores.games.is_empty() {
        html.push_str("<p class=\"no-articles\">Não houve jogos esta noite</p>\n");
    }

    for game in &scores.games {
        html.push_str(&format!(
            "<div class=\"nba-game\">\n<div class=\"nba-score\">{}</div>\n",
            escape_html(&score_line(game))
        ));
        for (label, home, away) in [
            ("PTS", &game.home_top_scorer, &game.away_top_scorer),
            ("REB", &game.home_top_rebounder, &game.away_top_rebounder),
            ("AST", &game.home_top_assists, &game.away_top_assists),
            ("STL", &game.home_top_steals, &game.away_top_steals),
            ("BLK", &game.home_top_blocks, &game.away_top_blocks),
        ] {
            if home.value.is_empty() && away.value.is_empty() {
                continue;
            }
            html.push_str(&format!(
                "<div class=\"nba-leaders\">{label}: {} {} · {} {}</div>\n",
                escape_html(&home.name),
                escape_html(&home.value),
                escape_html(&away.name),
                escape_html(&away.value),
            ));
        }
        if !game.home_top_game_score.value.is_empty() {
            html.push_str(&format!(
                "<div class=\"nba-leaders\">{} · {}</div>\n",
                escape_html(&game.home_top_game_score.value),
                escape_html(&game.away_top_game_score.value),
            ));
        }
        html.push_str(&format!(
            "<div class=\"nba-recap\"><a href=\"{}\">Cobertura AP News →</a></div>\n</div>\n",
            escape_html(&game.ap_article_url)
        ));
    }

    if let Some(best) = &scores.player_of_the_night {
        html.push_str(&format!(
            "<div class=\"nba-card\"><h3>🌟 Player of the Night</h3>\
             <p>{} ({}) - {} PTS, {} REB, {} AST, {} STL, {} BLK - GmSc {} ({})</p></div>\n",
            escape_html(&best.name),
            escape_html(&best.team),
            best.points,
            best.rebounds,
            best.assists,
            best.steals,
            best.blocks,
            best.game_score,
            escape_html(&best.matchup),
        ));
    }

    if let Some(featured) = &scores.featured_player {
        if featured.did_play {
            html.push_str(&format!(
                "<div class=\"nba-card\"><h3>🇵🇹 {}</h3>\
                 <p>{} MIN - {} PTS, {} REB, {} AST, {} STL, {} BLK ({})</p></div>\n",
                escape_html(&featured.name),
                escape_html(&featured.minutes),
                featured.points,
                featured.rebounds,
                featured.assists,
                featured.steals,
                featured.blocks,
                escape_html(&featured.matchup),
            ));
        } else {
            html.push_str(&format!(
                "<div class=\"nba-card\"><h3>🇵🇹 {}</h3><p>Não jogou ({})</p></div>\n",
                escape_html(&featured.name),
                escape_html(&featured.matchup),
            ));
        }
    }

    html.push_str("</div>\n");
}

fn score_line(game: &NbaGame) -> String {
    match game.winner {
        Winner::Home => format!(
            "{} {} @ {} {} (vitória {})",
            game.away_team, game.away_score, game.home_team, game.home_score, game.home_team
        ),
        Winner::Away => format!(
            "{} {} @ {} {} (vitória {})",
            game.away_team, game.away_score, game.home_team, game.home_score, game.away_team
        ),
    }
}

// ---- plain text rendering ----

/// Render the plain-text alternative body. Also used by `--dry-run`.
pub fn render_text(digests: &[SourceDigest], nba: Option<&NbaScores>) -> String {
    let now = Local::now();
    let mut text = String::with_capacity(4 * 1024);

    text.push_str("NEWS DIGEST\n");
    text.push_str(&format!("{}\n", now.format("%d/%m/%Y %H:%M")));
    text.push_str(&"=".repeat(50));
    text.push('\n');

    let top = top_headlines(digests, TOP_HEADLINE_COUNT);
    if !top.is_empty() {
        text.push_str("\nTOP HEADLINES\n");
        text.push_str(&"-".repeat(40));
        text.push('\n');
        for article in &top {
            text.push_str(&format!(
                "\n* {}\n  [{}] Priority: {}/10\n  {}\n",
                article.title,
                article.source.as_deref().unwrap_or(""),
                article.priority,
                article.url
            ));
        }
        text.push('\n');
        text.push_str(&"=".repeat(50));
        text.push('\n');
    }

    if let Some(scores) = nba {
        render_nba_text(&mut text, scores);
    }

    for digest in digests {
        text.push_str(&format!("\n> {}\n", digest.source.to_uppercase()));
        text.push_str(&"-".repeat(40));
        text.push('\n');

        if let Some(error) = &digest.error {
            text.push_str(&format!("Erro: {error}\n"));
        } else if digest.articles.is_empty() {
            text.push_str("Nenhum artigo encontrado\n");
        } else {
            for article in &digest.articles {
                text.push_str(&format!("\n- {}\n  {}\n", article.title, article.url));
                if let Some(summary) = &article.summary {
                    text.push_str(&format!("  {summary}\n"));
                }
            }
        }
    }

    text.push('\n');
    text.push_str(&"=".repeat(50));
    text.push_str("\nEste digest é gerado automaticamente.\n");
    text
}

fn render_nba_text(text: &mut String, scores: &NbaScores) {
    text.push_str(&format!("\nNBA - {}\n", scores.date));
    text.push_str(&"-".repeat(40));
    text.push('\n');

    if let Some(error) = &scores.error {
        text.push_str(&format!("Resultados indisponíveis: {error}\n"));
        return;
    }
    if scores.games.is_empty() {
        text.push_str("Não houve jogos esta noite\n");
    }

    for game in &scores.games {
        text.push_str(&format!("\n{}\n", score_line(game)));
        if !game.home_top_scorer.value.is_empty() {
            text.push_str(&format!(
                "  {} {} · {} {}\n",
                game.home_top_scorer.name,
                game.home_top_scorer.value,
                game.away_top_scorer.name,
                game.away_top_scorer.value
            ));
        }
    }

    if let Some(best) = &scores.player_of_the_night {
        text.push_str(&format!(
            "\nPlayer of the Night: {} ({}) - GmSc {} - {} PTS, {} REB, {} AST ({})\n",
            best.name,
            best.team,
            best.game_score,
            best.points,
            best.rebounds,
            best.assists,
            best.matchup
        ));
    }

    if let Some(featured) = &scores.featured_player {
        if featured.did_play {
            text.push_str(&format!(
                "\n{}: {} MIN - {} PTS, {} REB, {} AST ({})\n",
                featured.name,
                featured.minutes,
                featured.points,
                featured.rebounds,
                featured.assists,
                featured.matchup
            ));
        } else {
            text.push_str(&format!("\n{}: não jogou ({})\n", featured.name, featured.matchup));
        }
    }

    text.push('\n');
    text.push_str(&"=".repeat(50));
    text.push('\n');
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{TimeZone, Utc};

    fn article(title: &str, priority: u8) -> Article {
        Article {
            title: title.to_string(),
            url: format!("https://news.example.com/{priority}"),
            summary: None,
            category: None,
            priority,
            is_headline: false,
            source: None,
        }
    }

    fn digest(source: &str, articles: Vec<Article>) -> SourceDigest {
        SourceDigest {
            source: source.to_string(),
            source_url: "https://news.example.com".to_string(),
            articles,
            scraped_at: Utc::now(),
            error: None,
        }
    }

    #[test]
    fn test_top_headlines_sorted_by_priority() {
        let digests = vec![
            digest("A", vec![article("mid", 6), article("low", 3)]),
            digest("B", vec![article("high", 9)]),
        ];
        let top = top_headlines(&digests, 2);
        assert_eq!(top.len(), 2);
        assert_eq!(top[0].title, "high");
        assert_eq!(top[0].source.as_deref(), Some("B"));
        assert_eq!(top[1].title, "mid");
    }

    #[test]
    fn test_top_headlines_stable_on_equal_priority() {
        let digests = vec![
            digest("A", vec![article("first", 7)]),
            digest("B", vec![article("second", 7)]),
        ];
        let top = top_headlines(&digests, 2);
        assert_eq!(top[0].title, "first");
        assert_eq!(top[1].title, "second");
    }

    #[test]
    fn test_subject_line_truncates_long_titles() {
        let long_title = "An exceptionally long headline that goes on and on far beyond the subject limit";
        let digests = vec![digest("A", vec![article(long_title, 8)])];
        let noon = Local.with_ymd_and_hms(2026, 3, 4, 12, 30, 0).unwrap();
        let subject = subject_line(&digests, noon);
        assert!(subject.contains("Meio-dia"));
        assert!(subject.contains("04/03"));
        assert!(subject.ends_with("..."));
        assert!(!subject.contains("subject limit"));
    }

    #[test]
    fn test_subject_line_without_articles() {
        let evening = Local.with_ymd_and_hms(2026, 3, 4, 22, 0, 0).unwrap();
        let subject = subject_line(&[], evening);
        assert!(subject.contains("Noite"));
        assert!(subject.contains("Your news digest is ready"));
    }

    #[test]
    fn test_html_escapes_scraped_text() {
        let digests = vec![digest(
            "A",
            vec![article("Headline with <script>alert('x')</script> inside", 5)],
        )];
        let html = render_html(&digests, None);
        assert!(!html.contains("<script>"));
        assert!(html.contains("&lt;script&gt;"));
    }

    #[test]
    fn test_html_renders_error_sections() {
        let failed = SourceDigest::failed("Público", "https://www.publico.pt", "connect timeout");
        let html = render_html(&[failed], None);
        assert!(html.contains("Erro ao carregar"));
        assert!(html.contains("connect timeout"));
    }

    #[test]
    fn test_empty_run_still_renders() {
        let empty = digest("Expresso", Vec::new());
        let html = render_html(&[empty.clone()], None);
        assert!(html.contains("Nenhum artigo encontrado"));
        let text = render_text(&[empty], None);
        assert!(text.contains("Nenhum artigo encontrado"));
    }

    #[test]
    fn test_nba_error_renders_in_both_bodies() {
        let scores = NbaScores {
            games: Vec::new(),
            date: "Tuesday, March 3".to_string(),
            player_of_the_night: None,
            featured_player: None,
            error: Some("scoreboard down".to_string()),
        };
        let html = render_html(&[], Some(&scores));
        assert!(html.contains("scoreboard down"));
        let text = render_text(&[], Some(&scores));
        assert!(text.contains("scoreboard down"));
    }

    #[test]
    fn test_time_of_day_labels() {
        assert_eq!(time_of_day_label(7), "Manhã");
        assert_eq!(time_of_day_label(12), "Meio-dia");
        assert_eq!(time_of_day_label(15), "Tarde");
        assert_eq!(time_of_day_label(22), "Noite");
        assert_eq!(time_of_day_label(3), "Noite");
    }
}
