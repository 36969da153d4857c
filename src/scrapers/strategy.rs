//! The extraction cascade shared by every news source.
//!
//! Target markup is external and uncontrolled, so extraction runs as an
//! ordered list of independent strategies over the parsed document, from the
//! most precise to the loosest:
//!
//! 1. [`primary_headlines`]: `h1` elements and their nearest enclosing or
//!    descendant link; the page's lead stories.
//! 2. [`article_cards`]: repeated "card" containers located by tag name or
//!    class-substring patterns; yields sub-headings with optional summary,
//!    category, and thumbnail signals.
//! 3. [`fallback_links`]: a loose scan over anchors whose path matches
//!    source-specific article patterns (date segments, `/noticia/` slugs).
//!
//! Each strategy is a pure function `(document, config, accumulator)`. The
//! [`Accumulator`] owns all cross-strategy state: the dedup set, the position
//! counter, and the article cap. What differs between sources (selector
//! lists, path markers, exclusions, encoding) lives in [`SourceConfig`] as
//! plain data, so adapting to a markup change never touches this module.

use crate::fetch::PageEncoding;
use crate::models::Article;
use crate::priority::calculate_priority;
use crate::text::sanitize_text;
use scraper::{ElementRef, Html, Selector};
use std::collections::HashSet;
use url::Url;

/// Articles kept per source, in acceptance order.
pub const MAX_ARTICLES: usize = 15;

/// Titles at or below this length are navigation chrome, not headlines.
const MIN_TITLE_LEN: usize = 10;
/// The loose link scan needs a stricter threshold to stay useful.
const MIN_FALLBACK_TITLE_LEN: usize = 15;

/// Class-name fragments that mark non-headline text inside a heading.
const KICKER_CLASS_HINTS: &[&str] = &["kicker", "label", "caption"];

/// Everything the engine needs to know about one source, as data.
#[derive(Debug, Clone)]
pub struct SourceConfig {
    /// Short identifier used for `--sources` selection.
    pub key: String,
    /// Human-readable source name.
    pub name: String,
    /// Landing page URL; also the base for resolving relative links.
    pub url: String,
    /// `Accept-Language` header value for the fetch.
    pub accept_language: String,
    /// How the landing page's bytes are decoded.
    pub encoding: PageEncoding,
    /// Tier 2 container selector (tag names and class-substring patterns).
    pub card_selector: String,
    /// Heading lookup within a container (and within fallback anchors).
    pub title_selector: String,
    /// Optional dek/summary lookup within a container.
    pub summary_selector: Option<String>,
    /// Optional section/category label lookup within a container.
    pub category_selector: Option<String>,
    /// Tier 3 anchor scan, e.g. `a[href*="/noticia/"]`.
    pub fallback_selector: Option<String>,
    /// URL substrings that mark non-article pages (video, live blogs, ...).
    pub excluded_segments: Vec<String>,
    /// Category applied when the page carries none.
    pub default_category: Option<String>,
    /// Strip kicker/label/caption nodes out of headline text. The Guardian
    /// nests a category kicker inside its heading elements.
    pub strip_kickers: bool,
}

/// Selectors compiled once per scrape from a [`SourceConfig`].
struct CompiledSelectors {
    headline: Selector,
    link: Selector,
    img: Selector,
    card: Selector,
    title: Selector,
    summary: Option<Selector>,
    category: Option<Selector>,
    fallback: Option<Selector>,
    headline_text: Selector,
}

impl CompiledSelectors {
    fn compile(config: &SourceConfig) -> Result<Self, String> {
        fn parse(raw: &str) -> Result<Selector, String> {
            Selector::parse(raw).map_err(|e| format!("invalid selector `{raw}`: {e}"))
        }
        fn parse_opt(raw: Option<&String>) -> Result<Option<Selector>, String> {
            raw.map(|s| parse(s)).transpose()
        }

        Ok(CompiledSelectors {
            headline: parse("h1")?,
            link: parse("a")?,
            img: parse("img")?,
            card: parse(&config.card_selector)?,
            title: parse(&config.title_selector)?,
            summary: parse_opt(config.summary_selector.as_ref())?,
            category: parse_opt(config.category_selector.as_ref())?,
            fallback: parse_opt(config.fallback_selector.as_ref())?,
            headline_text: parse(r#"[class*="headline-text"]"#)?,
        })
    }
}

/// One extraction candidate before acceptance filtering.
struct Candidate {
    title: String,
    href: String,
    summary: Option<String>,
    category: Option<String>,
    is_headline: bool,
    has_image: bool,
    min_title_len: usize,
}

/// Explicit cross-strategy state: dedup set, position counter, article cap.
struct Accumulator {
    base: Url,
    source_name: String,
    excluded_segments: Vec<String>,
    default_category: Option<String>,
    seen_titles: HashSet<String>,
    articles: Vec<Article>,
    position: usize,
}

impl Accumulator {
    fn new(config: &SourceConfig) -> Result<Self, String> {
        let base = Url::parse(&config.url).map_err(|e| format!("invalid source url: {e}"))?;
        Ok(Accumulator {
            base,
            source_name: config.name.clone(),
            excluded_segments: config.excluded_segments.clone(),
            default_category: config.default_category.clone(),
            seen_titles: HashSet::new(),
            articles: Vec::new(),
            position: 0,
        })
    }

    fn is_full(&self) -> bool {
        self.articles.len() >= MAX_ARTICLES
    }

    /// Apply the acceptance rules and record the candidate if it survives.
    fn push(&mut self, candidate: Candidate) {
        if self.is_full() {
            return;
        }

        let title = candidate.title;
        let title_len = title.chars().count();
        if title_len <= candidate.min_title_len {
            return;
        }
        if self.seen_titles.contains(&title) {
            return;
        }

        let Some(url) = self.resolve(&candidate.href) else {
            return;
        };
        if self
            .excluded_segments
            .iter()
            .any(|segment| url.as_str().contains(segment.as_str()))
        {
            return;
        }

        let priority = calculate_priority(
            self.position,
            candidate.is_headline,
            candidate.has_image,
            title_len,
            candidate.summary.is_some(),
        );

        self.seen_titles.insert(title.clone());
        self.articles.push(Article {
            title,
            url: url.into(),
            summary: candidate.summary,
            category: candidate.category.or_else(|| self.default_category.clone()),
            priority,
            is_headline: candidate.is_headline,
            source: Some(self.source_name.clone()),
        });
        self.position += 1;
    }

    /// Resolve a possibly-relative href against the source origin and reject
    /// anything that is not plain `http(s)`.
    fn resolve(&self, href: &str) -> Option<Url> {
        let href = href.trim();
        if href.is_empty() {
            return None;
        }
        let resolved = self.base.join(href).ok()?;
        match resolved.scheme() {
            "http" | "https" => Some(resolved),
            _ => None,
        }
    }
}

/// Run the full cascade over a parsed document.
pub fn scrape_document(document: &Html, config: &SourceConfig) -> Result<Vec<Article>, String> {
    let selectors = CompiledSelectors::compile(config)?;
    let mut accumulator = Accumulator::new(config)?;

    primary_headlines(document, config, &selectors, &mut accumulator);
    article_cards(document, config, &selectors, &mut accumulator);
    fallback_links(document, config, &selectors, &mut accumulator);

    Ok(accumulator.articles)
}

/// Tier 1: top-level `h1` headings and their nearest link.
fn primary_headlines(
    document: &Html,
    config: &SourceConfig,
    selectors: &CompiledSelectors,
    accumulator: &mut Accumulator,
) {
    for heading in document.select(&selectors.headline) {
        if accumulator.is_full() {
            return;
        }
        let Some(link) = nearest_link(heading, &selectors.link) else {
            continue;
        };
        let mut title = headline_text(heading, config.strip_kickers, selectors);
        if title.is_empty() {
            title = headline_text(link, config.strip_kickers, selectors);
        }
        let href = link.value().attr("href").unwrap_or_default().to_string();

        let card = enclosing_card(link);
        let has_image = card
            .map(|c| c.select(&selectors.img).next().is_some())
            .unwrap_or(false);
        let summary = card.and_then(|c| first_text(c, selectors.summary.as_ref()));
        let category = card.and_then(|c| first_text(c, selectors.category.as_ref()));

        accumulator.push(Candidate {
            title,
            href,
            summary,
            category,
            is_headline: true,
            has_image,
            min_title_len: MIN_TITLE_LEN,
        });
    }
}

/// Tier 2: repeated article-card containers.
fn article_cards(
    document: &Html,
    config: &SourceConfig,
    selectors: &CompiledSelectors,
    accumulator: &mut Accumulator,
) {
    for card in document.select(&selectors.card) {
        if accumulator.is_full() {
            return;
        }
        let Some(link) = card.select(&selectors.link).next() else {
            continue;
        };
        let heading = card.select(&selectors.title).next();
        let is_sub_headline = heading.map(|h| h.value().name() == "h2").unwrap_or(false);

        let mut title = heading
            .map(|h| headline_text(h, config.strip_kickers, selectors))
            .unwrap_or_default();
        if title.is_empty() {
            title = headline_text(link, config.strip_kickers, selectors);
        }
        let href = link.value().attr("href").unwrap_or_default().to_string();

        accumulator.push(Candidate {
            title,
            href,
            summary: first_text(card, selectors.summary.as_ref()),
            category: first_text(card, selectors.category.as_ref()),
            is_headline: is_sub_headline,
            has_image: card.select(&selectors.img).next().is_some(),
            min_title_len: MIN_TITLE_LEN,
        });
    }
}

/// Tier 3: loose anchor scan over source-specific article path patterns.
fn fallback_links(
    document: &Html,
    config: &SourceConfig,
    selectors: &CompiledSelectors,
    accumulator: &mut Accumulator,
) {
    let Some(fallback) = &selectors.fallback else {
        return;
    };
    for link in document.select(fallback) {
        if accumulator.is_full() {
            return;
        }
        let mut title = link
            .select(&selectors.title)
            .next()
            .map(|h| headline_text(h, config.strip_kickers, selectors))
            .unwrap_or_default();
        if title.is_empty() {
            title = headline_text(link, config.strip_kickers, selectors);
        }
        let href = link.value().attr("href").unwrap_or_default().to_string();

        accumulator.push(Candidate {
            title,
            href,
            summary: None,
            category: None,
            is_headline: false,
            has_image: false,
            min_title_len: MIN_FALLBACK_TITLE_LEN,
        });
    }
}

/// The link for a heading: the heading itself if it is an anchor, else its
/// first descendant anchor, else its nearest anchor ancestor.
fn nearest_link<'a>(element: ElementRef<'a>, link_selector: &Selector) -> Option<ElementRef<'a>> {
    if element.value().name() == "a" {
        return Some(element);
    }
    if let Some(descendant) = element.select(link_selector).next() {
        return Some(descendant);
    }
    let mut current = element.parent();
    while let Some(node) = current {
        current = node.parent();
        if let Some(ancestor) = ElementRef::wrap(node) {
            if ancestor.value().name() == "a" {
                return Some(ancestor);
            }
        }
    }
    None
}

/// Walk up from a link to the article/card container it sits in, if any.
fn enclosing_card(element: ElementRef<'_>) -> Option<ElementRef<'_>> {
    let mut current = element.parent();
    while let Some(node) = current {
        current = node.parent();
        if let Some(ancestor) = ElementRef::wrap(node) {
            let value = ancestor.value();
            if value.name() == "article"
                || value.classes().any(|class| {
                    class.contains("card") || class.contains("article") || class.contains("story")
                })
            {
                return Some(ancestor);
            }
        }
    }
    None
}

/// Extract sanitized headline text, optionally working around markup that
/// nests kicker/label elements inside the heading.
fn headline_text(
    element: ElementRef<'_>,
    strip_kickers: bool,
    selectors: &CompiledSelectors,
) -> String {
    if strip_kickers {
        if let Some(inner) = element.select(&selectors.headline_text).next() {
            return sanitize_text(&inner.text().collect::<String>());
        }
        let mut out = String::new();
        collect_text_skipping(element, KICKER_CLASS_HINTS, &mut out);
        return sanitize_text(&out);
    }
    sanitize_text(&element.text().collect::<String>())
}

/// Depth-first text collection that skips figcaptions and elements whose
/// class names match any of the given fragments.
fn collect_text_skipping(element: ElementRef<'_>, skip_hints: &[&str], out: &mut String) {
    for child in element.children() {
        if let Some(text) = child.value().as_text() {
            out.push_str(text);
        } else if let Some(child_element) = ElementRef::wrap(child) {
            let value = child_element.value();
            let skip = value.name() == "figcaption"
                || value
                    .classes()
                    .any(|class| skip_hints.iter().any(|hint| class.contains(hint)));
            if !skip {
                collect_text_skipping(child_element, skip_hints, out);
            }
        }
    }
}

/// First non-empty sanitized text under `element` matching the selector.
fn first_text(element: ElementRef<'_>, selector: Option<&Selector>) -> Option<String> {
    let selector = selector?;
    let found = element.select(selector).next()?;
    let text = sanitize_text(&found.text().collect::<String>());
    (!text.is_empty()).then_some(text)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn test_config() -> SourceConfig {
        SourceConfig {
            key: "test".to_string(),
            name: "Test Source".to_string(),
            url: "https://news.example.com".to_string(),
            accept_language: "en".to_string(),
            encoding: PageEncoding::Utf8,
            card_selector: r#"article, [class*="card"], [class*="story"]"#.to_string(),
            title_selector: r#"h1, h2, h3, h4, [class*="title"], [class*="headline"]"#.to_string(),
            summary_selector: Some(r#"[class*="summary"], [class*="lead"]"#.to_string()),
            category_selector: Some(r#"[class*="category"], [class*="section"]"#.to_string()),
            fallback_selector: Some(r#"a[href*="/noticia/"]"#.to_string()),
            excluded_segments: vec!["/video/".to_string(), "/live/".to_string()],
            default_category: None,
            strip_kickers: false,
        }
    }

    fn scrape(html: &str, config: &SourceConfig) -> Vec<Article> {
        let document = Html::parse_document(html);
        scrape_document(&document, config).unwrap()
    }

    const FIXTURE: &str = r#"<html><body>
      <nav><a href="/politics">Politics</a><a href="/sports">Sports</a></nav>
      <h1><a href="/politics/reform">Prime Minister announces sweeping reform of the health system</a></h1>
      <article class="card">
        <a href="/politics/budget-vote"><h2>Parliament votes on the new budget proposal today</h2></a>
        <p class="summary">The vote is expected to be extremely tight.</p>
        <span class="category">Politics</span>
        <img src="/img/budget.jpg"/>
      </article>
      <div class="story-item">
        <a href="/economy/markets-rally"><h3>Markets rally after surprise interest rate decision</h3></a>
      </div>
      <div class="card">
        <a href="/video/clip-of-day"><h3>Watch the moment the results were announced live</h3></a>
      </div>
      <a href="/noticia/futebol-derbi">Home side claims dramatic stoppage time derby win</a>
      <a href="/noticia/curto">Too short</a>
    </body></html>"#;

    #[test]
    fn test_cascade_extracts_all_tiers() {
        let articles = scrape(FIXTURE, &test_config());
        let titles: Vec<&str> = articles.iter().map(|a| a.title.as_str()).collect();
        assert_eq!(
            titles,
            vec![
                "Prime Minister announces sweeping reform of the health system",
                "Parliament votes on the new budget proposal today",
                "Markets rally after surprise interest rate decision",
                "Home side claims dramatic stoppage time derby win",
            ]
        );
    }

    #[test]
    fn test_primary_headline_flags_and_priority() {
        let articles = scrape(FIXTURE, &test_config());
        let lead = &articles[0];
        assert!(lead.is_headline);
        // position 0 (+3) and headline (+2) and 40 < len < 120 (+1) on base 5, clamped.
        assert_eq!(lead.priority, 10);
        assert_eq!(lead.url, "https://news.example.com/politics/reform");
    }

    #[test]
    fn test_card_summary_category_and_image() {
        let articles = scrape(FIXTURE, &test_config());
        let card = &articles[1];
        assert_eq!(
            card.summary.as_deref(),
            Some("The vote is expected to be extremely tight.")
        );
        assert_eq!(card.category.as_deref(), Some("Politics"));
        assert!(card.is_headline, "h2 sub-heading counts as a headline");
    }

    #[test]
    fn test_excluded_path_segments_are_rejected() {
        let articles = scrape(FIXTURE, &test_config());
        assert!(articles.iter().all(|a| !a.url.contains("/video/")));
    }

    #[test]
    fn test_navigation_chrome_is_rejected() {
        let articles = scrape(FIXTURE, &test_config());
        assert!(articles.iter().all(|a| a.title != "Politics"));
        assert!(articles.iter().all(|a| a.title != "Too short"));
    }

    #[test]
    fn test_duplicate_titles_collapse() {
        let html = r#"<html><body>
          <article><a href="/a"><h2>The exact same headline appears twice on the page</h2></a></article>
          <article><a href="/b"><h2>The exact same headline appears twice on the page</h2></a></article>
        </body></html>"#;
        let articles = scrape(html, &test_config());
        assert_eq!(articles.len(), 1);
        assert_eq!(articles[0].url, "https://news.example.com/a");
    }

    #[test]
    fn test_result_capped_at_fifteen() {
        let mut html = String::from("<html><body>");
        for i in 0..30 {
            html.push_str(&format!(
                r#"<a href="/noticia/{i}">A perfectly ordinary but unique headline number {i:02}</a>"#
            ));
        }
        html.push_str("</body></html>");
        let articles = scrape(&html, &test_config());
        assert_eq!(articles.len(), MAX_ARTICLES);
    }

    #[test]
    fn test_non_http_schemes_are_rejected() {
        let html = r#"<html><body>
          <a href="mailto:tips@example.com">Send us your best investigative story tips today</a>
          <article><a href="javascript:void(0)"><h2>An interactive widget masquerading as a story</h2></a></article>
        </body></html>"#;
        let mut config = test_config();
        config.fallback_selector = Some("a".to_string());
        let articles = scrape(html, &config);
        assert!(articles.is_empty());
    }

    #[test]
    fn test_default_category_applies() {
        let html = r#"<html><body>
          <article><a href="/match"><h2>Campeões garantem vitória folgada fora de casa</h2></a></article>
        </body></html>"#;
        let mut config = test_config();
        config.default_category = Some("Desporto".to_string());
        let articles = scrape(html, &config);
        assert_eq!(articles[0].category.as_deref(), Some("Desporto"));
    }

    #[test]
    fn test_kicker_stripping_prefers_headline_text_span() {
        let html = r#"<html><body>
          <article><a href="/world/accord">
            <h3><div class="kicker">World</div><span class="headline-text">Ministers agree on sweeping new climate accord</span></h3>
          </a></article>
        </body></html>"#;
        let mut config = test_config();
        config.strip_kickers = true;
        let articles = scrape(html, &config);
        assert_eq!(
            articles[0].title,
            "Ministers agree on sweeping new climate accord"
        );
    }

    #[test]
    fn test_kicker_stripping_falls_back_to_skip_list() {
        let html = r#"<html><body>
          <article><a href="/football/derby">
            <h3><span class="card-kicker">Football</span> United claim dramatic stoppage time win over rivals</h3>
          </a></article>
        </body></html>"#;
        let mut config = test_config();
        config.strip_kickers = true;
        let articles = scrape(html, &config);
        assert_eq!(
            articles[0].title,
            "United claim dramatic stoppage time win over rivals"
        );
    }

    #[test]
    fn test_mangled_titles_are_repaired() {
        let html = r#"<html><body>
          <article><a href="/pais/eleicoes"><h2>EleiÃ§Ãµes marcadas para o prÃ³ximo mÃªs de marÃ§o</h2></a></article>
        </body></html>"#;
        let articles = scrape(html, &test_config());
        assert_eq!(
            articles[0].title,
            "Eleições marcadas para o próximo mês de março"
        );
    }

    #[test]
    fn test_positions_assigned_across_tiers() {
        let articles = scrape(FIXTURE, &test_config());
        // The tier-3 item is accepted fourth: base 5, position 3 bonus (+1),
        // 49-char title window bonus (+1), no headline/image/summary signals.
        let last = articles.last().unwrap();
        assert!(!last.is_headline);
        assert_eq!(last.priority, 7);
    }
}
