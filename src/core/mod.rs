pub mod config;
pub mod feed;
pub mod news;

use std::collections::BTreeMap;

use config::ConfigService;
use feed::FeedService;
use news::NewsService;

#[derive(Debug, Clone, Default)]
pub struct AppServices {
    config: ConfigService,
    feed: FeedService,
    news: NewsService,
}

impl AppServices {
    pub fn health_report(&self) -> BTreeMap<String, String> {
        let mut report = BTreeMap::new();
        report.insert(
            self.config.name().to_string(),
            self.config.status().to_string(),
        );
        report.insert(self.feed.name().to_string(), self.feed.status().to_string());
        report.insert(self.news.name().to_string(), self.news.status().to_string());
        report
    }
}
