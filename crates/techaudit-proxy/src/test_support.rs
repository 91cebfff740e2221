//! In-process stand-in for the PageSpeed endpoint, shared by unit tests.

use std::future::IntoFuture;
use std::sync::Arc;
use std::time::Duration;

use axum::extract::RawQuery;
use axum::http::{header, StatusCode};
use axum::response::{IntoResponse, Response};
use serde_json::Value;
use tokio::sync::Mutex;

/// What the mock answers with.
#[derive(Clone)]
enum Reply {
    Json(Value),
    Html(&'static str),
}

impl Reply {
    fn into_response(self, status: StatusCode) -> Response {
        match self {
            Reply::Json(body) => (status, axum::Json(body)).into_response(),
            Reply::Html(body) => {
                (status, [(header::CONTENT_TYPE, "text/html")], body).into_response()
            }
        }
    }
}

/// A running mock `runPagespeed` endpoint.
pub struct MockUpstream {
    pub url: String,
    queries: Arc<Mutex<Vec<String>>>,
}

impl MockUpstream {
    /// Answer every call with `status` and `body` after `delay`.
    pub async fn start(status: StatusCode, body: Value, delay: Duration) -> Self {
        Self::serve(status, Reply::Json(body), delay).await
    }

    /// Answer every call with a non-JSON page, like a proxy or captive portal would.
    pub async fn html(status: StatusCode, body: &'static str) -> Self {
        Self::serve(status, Reply::Html(body), Duration::ZERO).await
    }

    async fn serve(status: StatusCode, reply: Reply, delay: Duration) -> Self {
        let queries: Arc<Mutex<Vec<String>>> = Arc::new(Mutex::new(Vec::new()));
        let queries_clone = queries.clone();

        let app = axum::Router::new().route(
            "/runPagespeed",
            axum::routing::get(move |RawQuery(query): RawQuery| {
                let queries = queries_clone.clone();
                let reply = reply.clone();
                async move {
                    queries.lock().await.push(query.unwrap_or_default());
                    tokio::time::sleep(delay).await;
                    reply.into_response(status)
                }
            }),
        );

        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(axum::serve(listener, app).into_future());

        Self {
            url: format!("http://{addr}/runPagespeed"),
            queries,
        }
    }

    pub async fn ok(body: Value) -> Self {
        Self::start(StatusCode::OK, body, Duration::ZERO).await
    }

    /// Raw query strings received so far.
    pub async fn queries(&self) -> Vec<String> {
        self.queries.lock().await.clone()
    }

    pub async fn hits(&self) -> usize {
        self.queries.lock().await.len()
    }
}

/// Decode a raw query string into ordered pairs.
pub fn query_pairs(query: &str) -> Vec<(String, String)> {
    reqwest::Url::parse(&format!("http://localhost/?{query}"))
        .unwrap()
        .query_pairs()
        .map(|(k, v)| (k.into_owned(), v.into_owned()))
        .collect()
}
