//! Text sanitization for scraped headlines and HTML escaping for the digest.
//!
//! Headline text arrives in whatever state the source pages are in: raw HTML
//! entities, numeric character references, double-encoded UTF-8 (bytes decoded
//! as Latin-1 upstream and re-encoded), stray C1 controls, and typographic
//! punctuation. [`sanitize_text`] repairs all of that into plain, single-spaced
//! text. [`escape_html`] is the opposite direction: it makes sanitized text
//! safe to interpolate into the HTML email body. The two are never combined.

use once_cell::sync::Lazy;
use regex::{Captures, Regex};

/// Named HTML entities decoded by exact (case-insensitive) match.
const NAMED_ENTITIES: &[(&str, &str)] = &[
    ("amp", "&"),
    ("lt", "<"),
    ("gt", ">"),
    ("quot", "\""),
    ("#39", "'"),
    ("apos", "'"),
    ("nbsp", " "),
    ("ndash", "-"),
    ("mdash", "-"),
    ("lsquo", "'"),
    ("rsquo", "'"),
    ("ldquo", "\""),
    ("rdquo", "\""),
    ("hellip", "..."),
    ("euro", "EUR"),
    ("pound", "GBP"),
    ("copy", "(c)"),
    ("reg", "(R)"),
    ("trade", "(TM)"),
    ("deg", " deg"),
    ("plusmn", "+/-"),
    ("frac12", "1/2"),
    ("frac14", "1/4"),
    ("frac34", "3/4"),
    ("times", "x"),
    ("divide", "/"),
];

/// UTF-8 sequences that were decoded as Windows-1252 somewhere upstream.
///
/// Keys are the mangled two- or three-character forms as they surface in
/// scraped text; bytes that land on undefined or C1 positions are written as
/// escapes. Covers the Portuguese/Western-European accent range plus common
/// smart punctuation. Applied before quote/dash folding, so punctuation
/// repairs here still end up as their ASCII equivalents.
const MOJIBAKE_FIXES: &[(&str, &str)] = &[
    // E2 80 xx smart punctuation
    ("â€™", "\u{2019}"),
    ("â€˜", "\u{2018}"),
    ("â€œ", "\u{201C}"),
    ("â€\u{9d}", "\u{201D}"),
    ("â€“", "\u{2013}"),
    ("â€”", "\u{2014}"),
    ("â€¦", "\u{2026}"),
    ("â€¢", "\u{2022}"),
    ("â‚¬", "€"),
    // C3 xx lowercase accents
    ("Ã¡", "á"),
    ("Ã\u{a0}", "à"),
    ("Ã¢", "â"),
    ("Ã£", "ã"),
    ("Ã¤", "ä"),
    ("Ã©", "é"),
    ("Ã¨", "è"),
    ("Ãª", "ê"),
    ("Ã«", "ë"),
    ("Ã\u{ad}", "í"),
    ("Ã¬", "ì"),
    ("Ã®", "î"),
    ("Ã³", "ó"),
    ("Ã²", "ò"),
    ("Ã´", "ô"),
    ("Ãµ", "õ"),
    ("Ã¶", "ö"),
    ("Ãº", "ú"),
    ("Ã¹", "ù"),
    ("Ã¼", "ü"),
    ("Ã§", "ç"),
    ("Ã±", "ñ"),
    // C3 8x/9x uppercase accents
    ("Ã€", "À"),
    ("Ã\u{81}", "Á"),
    ("Ã‚", "Â"),
    ("Ãƒ", "Ã"),
    ("Ã‡", "Ç"),
    ("Ã‰", "É"),
    ("ÃŠ", "Ê"),
    ("Ã\u{8d}", "Í"),
    ("Ã“", "Ó"),
    ("Ã”", "Ô"),
    ("Ã•", "Õ"),
    ("Ãš", "Ú"),
    // C2 xx artifacts
    ("Â\u{a0}", " "),
    ("Â°", "°"),
    ("Â«", "«"),
    ("Â»", "»"),
];

static RE_ENTITY: Lazy<Regex> = Lazy::new(|| Regex::new(r"&(#?[0-9a-zA-Z]+);").unwrap());
static RE_DEC: Lazy<Regex> = Lazy::new(|| Regex::new(r"&#([0-9]+);").unwrap());
static RE_HEX: Lazy<Regex> = Lazy::new(|| Regex::new(r"&#[xX]([0-9a-fA-F]+);").unwrap());
static RE_WS: Lazy<Regex> = Lazy::new(|| Regex::new(r"\s+").unwrap());

/// Decode a numeric character reference the way the original pipeline did:
/// one UTF-16 code unit at a time. Code points above U+FFFF are masked to 16
/// bits and bare surrogate units are dropped; the news-headline domain never
/// legitimately contains astral-plane references.
fn decode_utf16_unit(code: u32) -> Option<char> {
    char::from_u32(code & 0xFFFF)
}

/// Sanitize and normalize text scraped from a web page.
///
/// Passes, in order: named entities, decimal and hexadecimal numeric
/// references, the double-encoding repair table, C1 control stripping,
/// whitespace collapsing (including non-breaking spaces) with a trim, and
/// finally folding of smart quotes, en/em dashes, ellipsis, middle dot,
/// bullet, and tilde to their ASCII equivalents.
///
/// Idempotent for any input already free of entities and mangled bytes.
pub fn sanitize_text(text: &str) -> String {
    if text.is_empty() {
        return String::new();
    }

    // Named entities; unknown names are left alone for the numeric passes.
    let mut result = RE_ENTITY
        .replace_all(text, |caps: &Captures| {
            let name = caps[1].to_lowercase();
            match NAMED_ENTITIES.iter().find(|(n, _)| *n == name) {
                Some((_, replacement)) => (*replacement).to_string(),
                None => caps[0].to_string(),
            }
        })
        .into_owned();

    result = RE_DEC
        .replace_all(&result, |caps: &Captures| {
            caps[1]
                .parse::<u32>()
                .ok()
                .and_then(decode_utf16_unit)
                .map(String::from)
                .unwrap_or_default()
        })
        .into_owned();

    result = RE_HEX
        .replace_all(&result, |caps: &Captures| {
            u32::from_str_radix(&caps[1], 16)
                .ok()
                .and_then(decode_utf16_unit)
                .map(String::from)
                .unwrap_or_default()
        })
        .into_owned();

    for (mangled, fixed) in MOJIBAKE_FIXES {
        if result.contains(mangled) {
            result = result.replace(mangled, fixed);
        }
    }

    // C1 controls carry no content; non-breaking spaces become plain spaces.
    result = result
        .chars()
        .filter(|c| !('\u{80}'..='\u{9F}').contains(c))
        .map(|c| if c == '\u{A0}' { ' ' } else { c })
        .collect();

    result = RE_WS.replace_all(&result, " ").trim().to_string();

    result
        .replace(['\u{2018}', '\u{2019}', '\u{201A}', '\u{201B}'], "'")
        .replace(['\u{201C}', '\u{201D}', '\u{201E}', '\u{201F}'], "\"")
        .replace(['\u{2013}', '\u{2014}', '\u{2015}'], "-")
        .replace('\u{2026}', "...")
        .replace('\u{B7}', "-")
        .replace('\u{2022}', "-")
        .replace('~', "-")
}

/// Escape the five XML-unsafe characters for interpolation into the HTML
/// email body. Presentation-time only; never applied to text that will be
/// sanitized again.
pub fn escape_html(text: &str) -> String {
    if text.is_empty() {
        return String::new();
    }

    text.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
        .replace('\'', "&#39;")
}
