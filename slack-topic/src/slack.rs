//! Slack Web API client.
//!
//! Two calls: `conversations.list` to fetch the channel directory and
//! `conversations.setTopic` to apply the topic. Both are authenticated with
//! the caller's token as a bearer credential. Slack reports application
//! failures as HTTP 200 with `{"ok": false, "error": "..."}`, which is
//! surfaced separately from transport failures.

use std::time::Duration;

use reqwest::Client;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::{Error, Result};

const DEFAULT_BASE_URL: &str = "https://slack.com/api";
const PAGE_LIMIT: u32 = 200;

/// One entry from the channel directory. The ID is the stable opaque
/// identifier; the name is human-assigned and mutable.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct Channel {
    pub id: String,
    pub name: String,
}

/// Authenticated handle to the Slack Web API.
pub struct SlackApi {
    client: Client,
    token: String,
    base_url: String,
}

impl SlackApi {
    pub fn new(token: String, timeout: Duration) -> Result<Self> {
        let client = Client::builder().timeout(timeout).build()?;
        Ok(Self {
            client,
            token,
            base_url: DEFAULT_BASE_URL.to_string(),
        })
    }

    #[must_use]
    pub fn with_base_url(mut self, url: String) -> Self {
        self.base_url = url;
        self
    }

    /// Fetches the full directory of unarchived public channels, following
    /// pagination cursors until exhausted. Order is whatever Slack returns.
    pub async fn list_channels(&self) -> Result<Vec<Channel>> {
        let mut channels = Vec::new();
        let mut cursor = String::new();

        loop {
            let mut query = vec![
                ("exclude_archived", "true".to_string()),
                ("types", "public_channel".to_string()),
                ("limit", PAGE_LIMIT.to_string()),
            ];
            if !cursor.is_empty() {
                query.push(("cursor", cursor.clone()));
            }

            let page: ListChannelsResponse = self
                .client
                .get(format!("{}/conversations.list", self.base_url))
                .bearer_auth(&self.token)
                .query(&query)
                .send()
                .await?
                .error_for_status()?
                .json()
                .await?;

            if !page.ok {
                return Err(api_error("conversations.list", page.error));
            }

            channels.extend(page.channels);
            cursor = page
                .response_metadata
                .map(|m| m.next_cursor)
                .unwrap_or_default();

            if cursor.is_empty() {
                break;
            }
            debug!(fetched = channels.len(), "following channel list cursor");
        }

        Ok(channels)
    }

    /// Sets the topic on a channel by ID. The single point of mutation.
    pub async fn set_topic(&self, channel_id: &str, topic: &str) -> Result<()> {
        let response: SetTopicResponse = self
            .client
            .post(format!("{}/conversations.setTopic", self.base_url))
            .bearer_auth(&self.token)
            .json(&SetTopicRequest {
                channel: channel_id,
                topic,
            })
            .send()
            .await?
            .error_for_status()?
            .json()
            .await?;

        if !response.ok {
            return Err(api_error("conversations.setTopic", response.error));
        }

        debug!(channel = channel_id, "topic set");
        Ok(())
    }
}

fn api_error(method: &str, reason: Option<String>) -> Error {
    Error::Api {
        method: method.to_string(),
        reason: reason.unwrap_or_else(|| "unknown error".to_string()),
    }
}

#[derive(Serialize)]
struct SetTopicRequest<'a> {
    channel: &'a str,
    topic: &'a str,
}

#[derive(Deserialize)]
struct ListChannelsResponse {
    ok: bool,
    error: Option<String>,
    #[serde(default)]
    channels: Vec<Channel>,
    response_metadata: Option<ResponseMetadata>,
}

#[derive(Deserialize)]
struct ResponseMetadata {
    #[serde(default)]
    next_cursor: String,
}

#[derive(Deserialize)]
struct SetTopicResponse {
    ok: bool,
    error: Option<String>,
}

#[allow(clippy::unwrap_used, clippy::expect_used)]
#[cfg(test)]
mod tests {
    use std::{
        collections::HashMap,
        sync::{Arc, Mutex},
    };

    use axum::{
        Json, Router,
        extract::Query,
        http::HeaderMap,
        routing::{get, post},
    };
    use serde_json::{Value, json};

    use super::*;

    async fn spawn_fake_slack(router: Router) -> String {
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            axum::serve(listener, router).await.unwrap();
        });
        format!("http://{addr}")
    }

    fn api(token: &str, base_url: String) -> SlackApi {
        SlackApi::new(token.to_string(), Duration::from_secs(5))
            .unwrap()
            .with_base_url(base_url)
    }

    #[tokio::test]
    async fn list_channels_follows_pagination_and_sends_bearer_token() {
        let seen_auth: Arc<Mutex<Vec<String>>> = Arc::new(Mutex::new(Vec::new()));
        let auth = Arc::clone(&seen_auth);

        let router = Router::new().route(
            "/conversations.list",
            get(
                move |headers: HeaderMap, Query(query): Query<HashMap<String, String>>| {
                    let auth = Arc::clone(&auth);
                    async move {
                        auth.lock().unwrap().push(
                            headers
                                .get("authorization")
                                .and_then(|v| v.to_str().ok())
                                .unwrap_or_default()
                                .to_string(),
                        );

                        let page = match query.get("cursor").map(String::as_str) {
                            None => json!({
                                "ok": true,
                                "channels": [{"id": "C1", "name": "general"}],
                                "response_metadata": {"next_cursor": "page2"}
                            }),
                            Some("page2") => json!({
                                "ok": true,
                                "channels": [{"id": "C2", "name": "random"}],
                                "response_metadata": {"next_cursor": ""}
                            }),
                            Some(other) => json!({
                                "ok": false,
                                "error": format!("unexpected cursor: {other}")
                            }),
                        };
                        Json(page)
                    }
                },
            ),
        );

        let base_url = spawn_fake_slack(router).await;
        let channels = api("xoxb-test", base_url).list_channels().await.unwrap();

        assert_eq!(
            channels,
            vec![
                Channel {
                    id: "C1".into(),
                    name: "general".into()
                },
                Channel {
                    id: "C2".into(),
                    name: "random".into()
                },
            ]
        );
        let auth = seen_auth.lock().unwrap();
        assert_eq!(auth.len(), 2);
        assert!(auth.iter().all(|h| h == "Bearer xoxb-test"));
    }

    #[tokio::test]
    async fn list_channels_surfaces_ok_false_as_api_error() {
        let router = Router::new().route(
            "/conversations.list",
            get(|| async { Json(json!({"ok": false, "error": "invalid_auth"})) }),
        );

        let base_url = spawn_fake_slack(router).await;
        let err = api("bad-token", base_url).list_channels().await.unwrap_err();

        assert!(
            matches!(err, Error::Api { ref method, ref reason }
                if method == "conversations.list" && reason == "invalid_auth")
        );
    }

    #[tokio::test]
    async fn set_topic_posts_channel_id_and_topic() {
        let received: Arc<Mutex<Option<Value>>> = Arc::new(Mutex::new(None));
        let body_slot = Arc::clone(&received);

        let router = Router::new().route(
            "/conversations.setTopic",
            post(move |Json(body): Json<Value>| {
                let slot = Arc::clone(&body_slot);
                async move {
                    *slot.lock().unwrap() = Some(body);
                    Json(json!({"ok": true}))
                }
            }),
        );

        let base_url = spawn_fake_slack(router).await;
        api("xoxb-test", base_url)
            .set_topic("C2", "Man on duty: Alice")
            .await
            .unwrap();

        let body = received.lock().unwrap().clone().unwrap();
        assert_eq!(body["channel"], "C2");
        assert_eq!(body["topic"], "Man on duty: Alice");
    }

    #[tokio::test]
    async fn set_topic_surfaces_ok_false_as_api_error() {
        let router = Router::new().route(
            "/conversations.setTopic",
            post(|| async { Json(json!({"ok": false, "error": "not_in_channel"})) }),
        );

        let base_url = spawn_fake_slack(router).await;
        let err = api("xoxb-test", base_url)
            .set_topic("C9", "topic")
            .await
            .unwrap_err();

        assert!(
            matches!(err, Error::Api { ref method, ref reason }
                if method == "conversations.setTopic" && reason == "not_in_channel")
        );
    }
}
