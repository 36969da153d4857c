//! Shared HTTP plumbing for the scrapers.
//!
//! Every page fetch goes out with a realistic browser `User-Agent` and a
//! source-appropriate `Accept-Language`, since several of the target sites
//! serve reduced or consent-walled markup to obvious bots. One source still
//! serves ISO-8859-1, so the body is pulled as bytes and decoded explicitly
//! instead of trusting `reqwest`'s UTF-8 assumption.

use encoding_rs::WINDOWS_1252;
use reqwest::Client;
use reqwest::header::{ACCEPT, ACCEPT_LANGUAGE, USER_AGENT};
use std::error::Error;
use std::time::Duration;

/// Browser User-Agent sent with every outbound request.
pub const BROWSER_USER_AGENT: &str = "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/120.0.0.0 Safari/537.36";

const ACCEPT_HTML: &str =
    "text/html,application/xhtml+xml,application/xml;q=0.9,image/webp,*/*;q=0.8";

/// Per-request timeout for landing pages and the scoreboard.
pub const PAGE_TIMEOUT: Duration = Duration::from_secs(15);

/// How a source's response bytes should be decoded.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PageEncoding {
    Utf8,
    /// Decoded via the Windows-1252 superset of ISO-8859-1.
    Latin1,
}

/// Build the shared HTTP client used for the whole run.
pub fn build_client() -> Result<Client, Box<dyn Error>> {
    let client = Client::builder()
        .redirect(reqwest::redirect::Policy::limited(10))
        .build()?;
    Ok(client)
}

/// Fetch a landing page and decode it per the source's declared encoding.
///
/// Non-2xx statuses are treated as fetch failures, matching the behavior the
/// scrapers were written against.
pub async fn fetch_page(
    client: &Client,
    url: &str,
    accept_language: &str,
    encoding: PageEncoding,
) -> Result<String, Box<dyn Error>> {
    let response = client
        .get(url)
        .header(USER_AGENT, BROWSER_USER_AGENT)
        .header(ACCEPT, ACCEPT_HTML)
        .header(ACCEPT_LANGUAGE, accept_language)
        .timeout(PAGE_TIMEOUT)
        .send()
        .await?
        .error_for_status()?;

    match encoding {
        PageEncoding::Utf8 => Ok(response.text().await?),
        PageEncoding::Latin1 => {
            let bytes = response.bytes().await?;
            let (text, _, _) = WINDOWS_1252.decode(&bytes);
            Ok(text.into_owned())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_latin1_decoding() {
        let bytes = b"P\xfablico \xe9 not\xedcia";
        let (text, _, _) = WINDOWS_1252.decode(bytes);
        assert_eq!(text, "Público é notícia");
    }

    #[test]
    fn test_client_builds() {
        assert!(build_client().is_ok());
    }
}
