use crate::config::toml_config::{SourceConfig, DEFAULT_SELECTOR};
use crate::domain::model::{FetchFailure, FetchOutcome};
use crate::domain::ports::TitleSource;
use crate::utils::error::{Result, WatchError};
use async_trait::async_trait;
use reqwest::Client;
use scraper::{Html, Selector};
use std::time::Duration;

const DEFAULT_USER_AGENT: &str = concat!(env!("CARGO_PKG_NAME"), "/", env!("CARGO_PKG_VERSION"));

/// Reads titles from the text of every element matching a CSS selector on
/// one HTML page.
pub struct HttpPageSource {
    client: Client,
    url: String,
    selector_text: String,
    selector: Selector,
}

impl HttpPageSource {
    pub fn new(config: &SourceConfig) -> Result<Self> {
        let selector_text = config
            .selector
            .clone()
            .unwrap_or_else(|| DEFAULT_SELECTOR.to_string());
        let selector = parse_selector(&selector_text)?;

        let mut builder = Client::builder().user_agent(
            config
                .user_agent
                .clone()
                .unwrap_or_else(|| DEFAULT_USER_AGENT.to_string()),
        );
        if let Some(seconds) = config.timeout_seconds {
            builder = builder.timeout(Duration::from_secs(seconds));
        }

        Ok(Self {
            client: builder.build()?,
            url: config.url.clone(),
            selector_text,
            selector,
        })
    }
}

pub fn parse_selector(selector: &str) -> Result<Selector> {
    Selector::parse(selector).map_err(|e| WatchError::SelectorError {
        selector: selector.to_string(),
        message: e.to_string(),
    })
}

/// Text of every matching element in document order, whitespace collapsed.
/// Elements without text are dropped.
pub fn extract_titles(html: &str, selector: &Selector) -> Vec<String> {
    let doc = Html::parse_document(html);

    doc.select(selector)
        .map(|element| {
            element
                .text()
                .collect::<String>()
                .split_whitespace()
                .collect::<Vec<_>>()
                .join(" ")
        })
        .filter(|title| !title.is_empty())
        .collect()
}

#[async_trait]
impl TitleSource for HttpPageSource {
    async fn fetch_titles(&self) -> FetchOutcome {
        tracing::debug!("Making request to: {}", self.url);

        let response = match self.client.get(&self.url).send().await {
            Ok(response) => response,
            Err(e) => return FetchOutcome::Failed(FetchFailure::Network(e.to_string())),
        };

        tracing::debug!("Response status: {}", response.status());
        let status = response.status();
        if !status.is_success() {
            return FetchOutcome::Failed(FetchFailure::Status(status.as_u16()));
        }

        let body = match response.text().await {
            Ok(body) => body,
            Err(e) => return FetchOutcome::Failed(FetchFailure::Body(e.to_string())),
        };

        let titles = extract_titles(&body, &self.selector);
        tracing::debug!(
            "Selector '{}' matched {} titles in {} bytes",
            self.selector_text,
            titles.len(),
            body.len()
        );

        if titles.is_empty() {
            FetchOutcome::Failed(FetchFailure::NoMatches {
                selector: self.selector_text.clone(),
            })
        } else {
            FetchOutcome::Titles(titles)
        }
    }

    fn location(&self) -> &str {
        &self.url
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use httpmock::prelude::*;

    const PAGE: &str = r#"
<html><body>
  <div class="thesis">
    <div class="thesistitle">  Eye Tracking for   Smart Glasses </div>
    <div class="supervisor">Dr. Example</div>
  </div>
  <div class="thesis">
    <div class="thesistitle">Haptic Feedback in <b>VR</b>
    Controllers</div>
  </div>
  <div class="thesistitle other">Usable Security &amp; Passwords</div>
  <div class="thesistitle">   </div>
</body></html>
"#;

    fn source_config(url: String) -> SourceConfig {
        SourceConfig {
            url,
            selector: None,
            timeout_seconds: Some(5),
            user_agent: None,
        }
    }

    #[test]
    fn test_extract_titles_in_document_order() {
        let selector = parse_selector(DEFAULT_SELECTOR).unwrap();
        let titles = extract_titles(PAGE, &selector);

        assert_eq!(
            titles,
            vec![
                "Eye Tracking for Smart Glasses".to_string(),
                "Haptic Feedback in VR Controllers".to_string(),
                "Usable Security & Passwords".to_string(),
            ]
        );
    }

    #[test]
    fn test_extract_titles_without_matches() {
        let selector = parse_selector(DEFAULT_SELECTOR).unwrap();
        assert!(extract_titles("<p>Keine Themen</p>", &selector).is_empty());
    }

    #[test]
    fn test_invalid_selector_rejected() {
        let mut config = source_config("https://example.org".to_string());
        config.selector = Some("div[".to_string());

        assert!(matches!(
            HttpPageSource::new(&config),
            Err(WatchError::SelectorError { .. })
        ));
    }

    #[tokio::test]
    async fn test_fetch_titles_from_page() {
        let server = MockServer::start();
        let page_mock = server.mock(|when, then| {
            when.method(GET)
                .path("/themen/index.xhtml-php")
                .query_param("type", "ma");
            then.status(200)
                .header("Content-Type", "text/html; charset=utf-8")
                .body(PAGE);
        });

        let source =
            HttpPageSource::new(&source_config(server.url("/themen/index.xhtml-php?type=ma")))
                .unwrap();
        let outcome = source.fetch_titles().await;

        page_mock.assert();
        match outcome {
            FetchOutcome::Titles(titles) => assert_eq!(titles.len(), 3),
            other => panic!("expected titles, got {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_fetch_reports_error_status() {
        let server = MockServer::start();
        let page_mock = server.mock(|when, then| {
            when.method(GET).path("/themen");
            then.status(503);
        });

        let source = HttpPageSource::new(&source_config(server.url("/themen"))).unwrap();
        let outcome = source.fetch_titles().await;

        page_mock.assert();
        assert_eq!(outcome, FetchOutcome::Failed(FetchFailure::Status(503)));
    }

    #[tokio::test]
    async fn test_fetch_reports_no_matches() {
        let server = MockServer::start();
        server.mock(|when, then| {
            when.method(GET).path("/themen");
            then.status(200).body("<html><body><p>Wartung</p></body></html>");
        });

        let source = HttpPageSource::new(&source_config(server.url("/themen"))).unwrap();

        assert_eq!(
            source.fetch_titles().await,
            FetchOutcome::Failed(FetchFailure::NoMatches {
                selector: DEFAULT_SELECTOR.to_string()
            })
        );
    }

    #[tokio::test]
    async fn test_fetch_reports_network_error() {
        // Nothing listens on port 9 on the test hosts.
        let source = HttpPageSource::new(&source_config("http://127.0.0.1:9/themen".to_string()))
            .unwrap();

        assert!(matches!(
            source.fetch_titles().await,
            FetchOutcome::Failed(FetchFailure::Network(_))
        ));
    }
}
