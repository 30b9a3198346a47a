use super::config::FeedConfig;
use super::feed::fetcher::{build_client, fetch_feed, FetchError};
use super::feed::parser::{parse_news_items, ParseError};
use super::feed::serializer::{items_to_json, EncodingError};
use super::feed::types::NewsItem;

#[derive(Debug, thiserror::Error)]
pub enum NewsError {
    #[error(transparent)]
    Fetch(#[from] FetchError),
    #[error(transparent)]
    Parse(#[from] ParseError),
    #[error(transparent)]
    Encoding(#[from] EncodingError),
}

#[derive(Debug, Clone, Default)]
pub struct NewsService;

impl NewsService {
    pub fn name(&self) -> &'static str {
        "news"
    }

    pub fn status(&self) -> &'static str {
        "ready"
    }
}

#[derive(Debug, Clone)]
pub struct NewsPipeline {
    client: reqwest::Client,
    feed_url: String,
}

impl NewsPipeline {
    pub fn new(config: &FeedConfig) -> Result<Self, FetchError> {
        Ok(Self {
            client: build_client(config.timeout())?,
            feed_url: config.feed_url.clone(),
        })
    }

    pub fn feed_url(&self) -> &str {
        &self.feed_url
    }

    pub async fn fetch_items(&self) -> Result<Vec<NewsItem>, NewsError> {
        let body = fetch_feed(&self.client, &self.feed_url).await?;
        let items = parse_news_items(&body)?;
        Ok(items)
    }

    pub async fn fetch_json(&self) -> Result<String, NewsError> {
        let items = self.fetch_items().await?;
        let json = items_to_json(&items)?;
        tracing::info!(url = %self.feed_url, items = items.len(), "served news feed");
        Ok(json)
    }
}
