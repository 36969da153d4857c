//! Per-source scraping configuration.
//!
//! Everything here is data consumed by the engine in [`crate::scrapers::strategy`]:
//! selector lists, fallback path markers, exclusion segments, languages, and
//! encodings. When a site redesign breaks extraction, this file is the only
//! place that should need editing.
//!
//! | Source | Key | Language | Notes |
//! |--------|-----|----------|-------|
//! | Expresso | `expresso` | pt-PT | Weekly, headline-heavy front page |
//! | Público | `publico` | pt-PT | `/noticia/` slugs for the link scan |
//! | Observador | `observador` | pt-PT | Richest summary markup |
//! | ZeroZero | `zerozero` | pt-PT | Sports only; still serves Latin-1 |
//! | The Guardian | `guardian` | en-GB | Kickers nested inside headings |
//! | The New York Times | `nyt` | en-US | `data-testid` block markup |

use crate::fetch::PageEncoding;
use crate::scrapers::strategy::SourceConfig;
use chrono::{Datelike, Utc};

/// Anchor scan for sources that date-stamp their article paths, built for the
/// current and previous calendar year so a year rollover needs no edit.
fn dated_path_selector() -> String {
    let year = Utc::now().year();
    format!(r#"a[href*="/{}/"], a[href*="/{}/"]"#, year - 1, year)
}

pub fn expresso() -> SourceConfig {
    SourceConfig {
        key: "expresso".to_string(),
        name: "Expresso".to_string(),
        url: "https://expresso.pt".to_string(),
        accept_language: "pt-PT,pt;q=0.9,en;q=0.8".to_string(),
        encoding: PageEncoding::Utf8,
        card_selector: r#"article, [class*="article"], [class*="headline"], [class*="news-item"]"#
            .to_string(),
        title_selector: r#"h1, h2, h3, h4, [class*="title"]"#.to_string(),
        summary_selector: None,
        category_selector: Some(r#"[class*="category"], [class*="section"]"#.to_string()),
        fallback_selector: None,
        excluded_segments: Vec::new(),
        default_category: None,
        strip_kickers: false,
    }
}

pub fn publico() -> SourceConfig {
    SourceConfig {
        key: "publico".to_string(),
        name: "Público".to_string(),
        url: "https://www.publico.pt".to_string(),
        accept_language: "pt-PT,pt;q=0.9,en;q=0.8".to_string(),
        encoding: PageEncoding::Utf8,
        card_selector:
            r#"article, [class*="card"], [class*="headline"], [class*="story"], [class*="article"]"#
                .to_string(),
        title_selector: r#"h1, h2, h3, h4, [class*="headline"], [class*="title"]"#.to_string(),
        summary_selector: Some(r#"[class*="lead"], [class*="summary"], [class*="excerpt"]"#.to_string()),
        category_selector: Some(r#"[class*="section"], [class*="category"]"#.to_string()),
        fallback_selector: Some(
            r#"a[href*="/noticia/"], a[href*="/opiniao/"], a[href*="/local/"]"#.to_string(),
        ),
        excluded_segments: Vec::new(),
        default_category: None,
        strip_kickers: false,
    }
}

pub fn observador() -> SourceConfig {
    SourceConfig {
        key: "observador".to_string(),
        name: "Observador".to_string(),
        url: "https://observador.pt".to_string(),
        accept_language: "pt-PT,pt;q=0.9,en;q=0.8".to_string(),
        encoding: PageEncoding::Utf8,
        card_selector: r#"article, [class*="article"], [class*="post"], [class*="story"], [class*="headline"], [class*="news-item"]"#
            .to_string(),
        title_selector: r#"h2, h3, h4, [class*="title"], [class*="headline"]"#.to_string(),
        summary_selector: Some(
            r#"[class*="excerpt"], [class*="summary"], [class*="lead"], [class*="description"], p"#
                .to_string(),
        ),
        category_selector: Some(
            r#"[class*="category"], [class*="section"], [class*="tag"]"#.to_string(),
        ),
        fallback_selector: Some(
            r#"a[href*="/noticia/"], a[href*="/artigo/"], a[href*="/opiniao/"]"#.to_string(),
        ),
        excluded_segments: Vec::new(),
        default_category: None,
        strip_kickers: false,
    }
}

pub fn zerozero() -> SourceConfig {
    SourceConfig {
        key: "zerozero".to_string(),
        name: "ZeroZero".to_string(),
        url: "https://www.zerozero.pt".to_string(),
        accept_language: "pt-PT,pt;q=0.9,en;q=0.8".to_string(),
        // The site still serves ISO-8859-1; trusting UTF-8 mangles every accent.
        encoding: PageEncoding::Latin1,
        card_selector:
            r#"article, [class*="news"], [class*="noticia"], [class*="box_news"], [class*="item"]"#
                .to_string(),
        title_selector: r#"h1, h2, h3, h4, [class*="title"], [class*="headline"]"#.to_string(),
        summary_selector: None,
        category_selector: None,
        fallback_selector: Some(r#"a[href*="/noticias/"], a[href*="/noticia/"]"#.to_string()),
        excluded_segments: Vec::new(),
        default_category: Some("Desporto".to_string()),
        strip_kickers: false,
    }
}

pub fn guardian() -> SourceConfig {
    SourceConfig {
        key: "guardian".to_string(),
        name: "The Guardian".to_string(),
        url: "https://www.theguardian.com/international".to_string(),
        accept_language: "en-GB,en;q=0.9".to_string(),
        encoding: PageEncoding::Utf8,
        card_selector: r#"[data-link-name*="article"], [class*="fc-item"], [class*="card"], article"#
            .to_string(),
        title_selector: r#"h2, h3, h4, [class*="headline"], span[class*="title"]"#.to_string(),
        summary_selector: Some(
            r#"[class*="standfirst"], [class*="trail"], [class*="description"]"#.to_string(),
        ),
        category_selector: Some(r#"[class*="kicker"], [class*="section"]"#.to_string()),
        fallback_selector: Some(dated_path_selector()),
        excluded_segments: vec![
            "/live/".to_string(),
            "/video/".to_string(),
            "/gallery/".to_string(),
        ],
        default_category: None,
        strip_kickers: true,
    }
}

pub fn nyt() -> SourceConfig {
    SourceConfig {
        key: "nyt".to_string(),
        name: "The New York Times".to_string(),
        url: "https://www.nytimes.com".to_string(),
        accept_language: "en-US,en;q=0.9".to_string(),
        encoding: PageEncoding::Utf8,
        card_selector: r#"[class*="story"], article, [data-testid="block-link"]"#.to_string(),
        title_selector: r#"h1, h2, h3, h4, [class*="headline"], p[class*="heading"]"#.to_string(),
        summary_selector: Some(r#"[class*="summary"], [class*="description"]"#.to_string()),
        category_selector: Some(r#"[class*="section"], [data-testid="section"]"#.to_string()),
        fallback_selector: Some(dated_path_selector()),
        excluded_segments: vec!["/interactive/".to_string(), "/video/".to_string()],
        default_category: None,
        strip_kickers: false,
    }
}

/// Every configured source, in digest presentation order.
pub fn all() -> Vec<SourceConfig> {
    vec![
        expresso(),
        publico(),
        observador(),
        zerozero(),
        guardian(),
        nyt(),
    ]
}

/// Resolve `--sources` keys, preserving the requested order.
pub fn select(keys: &[String]) -> Result<Vec<SourceConfig>, String> {
    let registry = all();
    let mut selected = Vec::with_capacity(keys.len());
    for key in keys {
        let wanted = key.trim().to_lowercase();
        match registry.iter().find(|config| config.key == wanted) {
            Some(config) => selected.push(config.clone()),
            None => {
                let known: Vec<&str> = registry.iter().map(|c| c.key.as_str()).collect();
                return Err(format!(
                    "unknown source `{key}` (known: {})",
                    known.join(", ")
                ));
            }
        }
    }
    Ok(selected)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_registry_keys_are_unique() {
        let mut keys: Vec<String> = all().into_iter().map(|c| c.key).collect();
        keys.sort();
        keys.dedup();
        assert_eq!(keys.len(), 6);
    }

    #[test]
    fn test_select_by_key() {
        let configs = select(&["guardian".to_string(), "publico".to_string()]).unwrap();
        assert_eq!(configs.len(), 2);
        assert_eq!(configs[0].name, "The Guardian");
        assert_eq!(configs[1].name, "Público");
    }

    #[test]
    fn test_select_unknown_key_errors() {
        let err = select(&["gazette".to_string()]).unwrap_err();
        assert!(err.contains("gazette"));
        assert!(err.contains("expresso"));
    }

    #[test]
    fn test_dated_path_selector_tracks_current_year() {
        let selector = dated_path_selector();
        assert!(selector.contains(&format!("/{}/", Utc::now().year())));
    }

    #[test]
    fn test_only_zerozero_needs_latin1() {
        for config in all() {
            let expected = config.key == "zerozero";
            assert_eq!(config.encoding == PageEncoding::Latin1, expected);
        }
    }
}
