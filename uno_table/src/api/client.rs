use reqwest::{header::CONTENT_TYPE, Method};
use serde::Serialize;
use serde_json::{json, Value};
use std::time::Duration;
use tracing::{debug, warn};
use url::Url;

use crate::api::error::{ApiError, ApiResult};
use crate::card::CardColor;

/// Body of `POST /games/{id}/play`.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PlayRequest {
    pub card_id: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub chosen_color: Option<CardColor>,
}

/// Thin client for the game service. Cloning shares the connection pool.
#[derive(Debug, Clone)]
pub struct ApiClient {
    http: reqwest::Client,
    base_url: Url,
    timeout: Duration,
}

impl ApiClient {
    pub fn new(base_url: &str, timeout: Duration) -> ApiResult<Self> {
        let parsed =
            Url::parse(base_url).map_err(|e| ApiError::InvalidUrl(format!("{base_url}: {e}")))?;
        if parsed.cannot_be_a_base() {
            return Err(ApiError::InvalidUrl(base_url.to_string()));
        }

        Ok(Self {
            http: reqwest::Client::new(),
            base_url: parsed,
            timeout,
        })
    }

    pub fn from_config(config: &uno_env::ApiConfig, base_url_flag: Option<&str>) -> ApiResult<Self> {
        Self::new(
            &config.resolve_base_url(base_url_flag),
            Duration::from_millis(config.timeout_ms),
        )
    }

    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    pub fn timeout(&self) -> Duration {
        self.timeout
    }

    pub async fn health(&self) -> ApiResult<Option<Value>> {
        self.request(Method::GET, self.endpoint(&[""]), None).await
    }

    pub async fn get_game_state(&self, game_id: &str) -> ApiResult<Option<Value>> {
        self.request(Method::GET, self.endpoint(&["games", game_id]), None)
            .await
    }

    pub async fn create_game(&self, payload: Option<Value>) -> ApiResult<Option<Value>> {
        self.request(Method::POST, self.endpoint(&["games"]), Some(body_or_empty(payload)))
            .await
    }

    pub async fn join_game(&self, game_id: &str, payload: Option<Value>) -> ApiResult<Option<Value>> {
        self.game_action(Method::POST, game_id, "join", payload).await
    }

    pub async fn draw_card(&self, game_id: &str, payload: Option<Value>) -> ApiResult<Option<Value>> {
        self.game_action(Method::POST, game_id, "draw", payload).await
    }

    pub async fn play_card(&self, game_id: &str, payload: &PlayRequest) -> ApiResult<Option<Value>> {
        let body = serde_json::to_value(payload).unwrap_or_else(|_| json!({}));
        self.game_action(Method::POST, game_id, "play", Some(body)).await
    }

    pub async fn call_uno(&self, game_id: &str, payload: Option<Value>) -> ApiResult<Option<Value>> {
        self.game_action(Method::POST, game_id, "uno", payload).await
    }

    pub async fn restart_game(&self, game_id: &str) -> ApiResult<Option<Value>> {
        self.request(
            Method::POST,
            self.endpoint(&["games", game_id, "restart"]),
            None,
        )
        .await
    }

    pub async fn update_settings(
        &self,
        game_id: &str,
        payload: Option<Value>,
    ) -> ApiResult<Option<Value>> {
        self.game_action(Method::PATCH, game_id, "settings", payload)
            .await
    }

    async fn game_action(
        &self,
        method: Method,
        game_id: &str,
        action: &str,
        payload: Option<Value>,
    ) -> ApiResult<Option<Value>> {
        self.request(
            method,
            self.endpoint(&["games", game_id, action]),
            Some(body_or_empty(payload)),
        )
        .await
    }

    /// Appends `segments` to the base path, percent-encoding each one.
    pub fn endpoint(&self, segments: &[&str]) -> Url {
        let mut url = self.base_url.clone();
        if let Ok(mut path) = url.path_segments_mut() {
            path.pop_if_empty().extend(segments);
        }
        url
    }

    async fn request(
        &self,
        method: Method,
        url: Url,
        body: Option<Value>,
    ) -> ApiResult<Option<Value>> {
        debug!("{} {}", method, url);

        let mut builder = self
            .http
            .request(method.clone(), url.clone())
            .header(CONTENT_TYPE, "application/json");
        if let Some(body) = body {
            builder = builder.body(body.to_string());
        }

        // The wait covers both the response head and the body.
        let exchange = async {
            let response = builder.send().await.map_err(ApiError::Network)?;
            let status = response.status();
            let bytes = response.bytes().await.ok();
            Ok::<_, ApiError>((status, bytes))
        };

        let (status, bytes) = tokio::time::timeout(self.timeout, exchange)
            .await
            .map_err(|_| {
                warn!("{} {} timed out after {:?}", method, url, self.timeout);
                ApiError::Timeout(self.timeout)
            })?
            .inspect_err(|e| warn!("{} {} failed: {:?}", method, url, e))?;

        let body = bytes.as_deref().and_then(safe_json);

        if !status.is_success() {
            let err = ApiError::from_status(status, body);
            warn!("{} {} -> {}: {}", method, url, status.as_u16(), err);
            return Err(err);
        }

        debug!("{} {} -> {}", method, url, status.as_u16());
        Ok(body)
    }
}

fn body_or_empty(payload: Option<Value>) -> Value {
    payload.unwrap_or_else(|| json!({}))
}

/// JSON body or nothing; a body that doesn't parse is treated as absent.
pub fn safe_json(bytes: &[u8]) -> Option<Value> {
    if bytes.iter().all(u8::is_ascii_whitespace) {
        return None;
    }
    match serde_json::from_slice::<Value>(bytes) {
        Ok(Value::Null) | Err(_) => None,
        Ok(v) => Some(v),
    }
}
