#[tokio::main]
async fn main() {
    if let Err(error) = news_feed_lib::run().await {
        tracing::error!(error = %error, "news feed service stopped");
        std::process::exit(1);
    }
}
