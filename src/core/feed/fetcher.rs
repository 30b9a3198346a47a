use std::time::Duration;

use tokio::time::Instant;

#[derive(Debug, thiserror::Error)]
pub enum FetchError {
    #[error("request failed: {0}")]
    Request(#[source] reqwest::Error),
    #[error("unexpected status code: {0}")]
    HttpStatus(u16),
    #[error("feed request timed out")]
    Timeout,
}

impl From<reqwest::Error> for FetchError {
    fn from(error: reqwest::Error) -> Self {
        if error.is_timeout() {
            Self::Timeout
        } else {
            Self::Request(error)
        }
    }
}

pub fn build_client(timeout: Duration) -> Result<reqwest::Client, FetchError> {
    let client = reqwest::Client::builder().timeout(timeout).build()?;
    Ok(client)
}

/// Single GET; a non-2xx status is an error and the body is left unread.
pub async fn fetch_feed(client: &reqwest::Client, url: &str) -> Result<String, FetchError> {
    let response = client.get(url).send().await.inspect_err(|error| {
        tracing::warn!(url, error = %error, "feed request failed");
    })?;
    let status = response.status();
    if !status.is_success() {
        tracing::warn!(url, status = status.as_u16(), "feed returned non-success status");
        return Err(FetchError::HttpStatus(status.as_u16()));
    }

    let body = response.text().await?;
    tracing::debug!(url, status = status.as_u16(), bytes = body.len(), "fetched feed");
    Ok(body)
}

pub async fn fetch_feed_with_deadline(
    client: &reqwest::Client,
    url: &str,
    deadline: Instant,
) -> Result<String, FetchError> {
    match tokio::time::timeout_at(deadline, fetch_feed(client, url)).await {
        Ok(result) => result,
        Err(_) => {
            tracing::warn!(url, "feed request passed caller deadline");
            Err(FetchError::Timeout)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::{header, StatusCode};
    use axum::response::{IntoResponse, Response};
    use axum::routing::get;
    use axum::Router;

    async fn feed_handler() -> Response {
        (
            [(header::CONTENT_TYPE, "application/rss+xml")],
            include_str!("../../../fixtures/google-news.rss.xml"),
        )
            .into_response()
    }

    async fn latin1_handler() -> Response {
        let mut body = b"<rss><channel><item><title>caf".to_vec();
        body.push(0xE9);
        body.extend_from_slice(b"</title></item></channel></rss>");
        (
            [(header::CONTENT_TYPE, "application/rss+xml; charset=iso-8859-1")],
            body,
        )
            .into_response()
    }

    async fn broken_handler() -> Response {
        (StatusCode::INTERNAL_SERVER_ERROR, "temporary failure").into_response()
    }

    async fn slow_handler() -> Response {
        tokio::time::sleep(Duration::from_secs(2)).await;
        "<rss/>".into_response()
    }

    async fn spawn_test_server() -> (String, tokio::task::JoinHandle<()>) {
        let app = Router::new()
            .route("/feed.xml", get(feed_handler))
            .route("/latin1.xml", get(latin1_handler))
            .route("/broken.xml", get(broken_handler))
            .route("/slow.xml", get(slow_handler));
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
            .await
            .expect("listener should bind");
        let address = listener.local_addr().expect("local addr should exist");
        let join_handle = tokio::spawn(async move {
            axum::serve(listener, app).await.expect("server should run");
        });
        (format!("http://{address}"), join_handle)
    }

    #[tokio::test]
    async fn fetch_feed_returns_body_text() {
        let (base, server_task) = spawn_test_server().await;
        let client = build_client(Duration::from_secs(5)).expect("client should build");

        let body = fetch_feed(&client, &format!("{base}/feed.xml"))
            .await
            .expect("fetch should succeed");
        assert!(body.starts_with("<?xml"));
        assert!(body.contains("<item>"));

        server_task.abort();
    }

    #[tokio::test]
    async fn fetch_feed_decodes_declared_charset() {
        let (base, server_task) = spawn_test_server().await;
        let client = build_client(Duration::from_secs(5)).expect("client should build");

        let body = fetch_feed(&client, &format!("{base}/latin1.xml"))
            .await
            .expect("fetch should succeed");
        assert!(body.contains("café"));

        server_task.abort();
    }

    #[tokio::test]
    async fn non_success_status_is_an_error() {
        let (base, server_task) = spawn_test_server().await;
        let client = build_client(Duration::from_secs(5)).expect("client should build");

        let error = fetch_feed(&client, &format!("{base}/broken.xml"))
            .await
            .expect_err("500 must fail");
        assert!(matches!(error, FetchError::HttpStatus(500)));

        let error = fetch_feed(&client, &format!("{base}/missing.xml"))
            .await
            .expect_err("404 must fail");
        assert!(matches!(error, FetchError::HttpStatus(404)));

        server_task.abort();
    }

    #[tokio::test]
    async fn slow_upstream_times_out() {
        let (base, server_task) = spawn_test_server().await;
        let client = build_client(Duration::from_millis(200)).expect("client should build");

        let error = fetch_feed(&client, &format!("{base}/slow.xml"))
            .await
            .expect_err("slow upstream must time out");
        assert!(matches!(error, FetchError::Timeout));

        server_task.abort();
    }

    #[tokio::test]
    async fn caller_deadline_cuts_fetch_short() {
        let (base, server_task) = spawn_test_server().await;
        let client = build_client(Duration::from_secs(30)).expect("client should build");
        let deadline = Instant::now() + Duration::from_millis(100);

        let error = fetch_feed_with_deadline(&client, &format!("{base}/slow.xml"), deadline)
            .await
            .expect_err("deadline must expire first");
        assert!(matches!(error, FetchError::Timeout));

        server_task.abort();
    }

    #[tokio::test]
    async fn unreachable_host_is_a_request_error() {
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
            .await
            .expect("listener should bind");
        let address = listener.local_addr().expect("local addr should exist");
        drop(listener);
        let client = build_client(Duration::from_secs(5)).expect("client should build");

        let error = fetch_feed(&client, &format!("http://{address}/feed.xml"))
            .await
            .expect_err("closed port must fail");
        assert!(matches!(error, FetchError::Request(_)));
    }
}
