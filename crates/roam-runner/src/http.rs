//! The reqwest-backed [`GameClient`].
//!
//! Every request carries the account token in a `token` header and is
//! retried blindly on transport failure, up to the configured count, with a
//! fixed pause between attempts. The agent's destroyed flag is checked
//! before every attempt. Bodies are decoded as an
//! [`Envelope`]; a negative status is a protocol error and is not retried.

use std::future::Future;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use reqwest::Method;
use roam_core::{ClientError, ClientResult, GameClient};
use roam_types::{
    BuyRequest, Envelope, EquipRequest, GameResponse, GoRequest, HeyRequest, LoginRequest,
    PurchaseLine, SellRequest, TaskRequest, UseGoodsRequest,
};
use serde::Serialize;
use serde::de::DeserializeOwned;
use tracing::{debug, warn};

use crate::config::TransportConfig;
use crate::error::RunnerError;

/// Build the shared HTTP client with the configured timeout.
pub fn build_http(config: &TransportConfig) -> Result<reqwest::Client, RunnerError> {
    reqwest::Client::builder()
        .timeout(config.request_timeout)
        .build()
        .map_err(|e| RunnerError::Http(e.to_string()))
}

/// Exchange credentials for a session token.
///
/// # Errors
///
/// [`RunnerError::Login`] when the request fails, the server rejects the
/// credentials, or the answer carries no token.
pub async fn login(
    http: &reqwest::Client,
    config: &TransportConfig,
    username: &str,
    password: &str,
) -> Result<String, RunnerError> {
    let failed = |message: String| RunnerError::Login {
        username: username.to_owned(),
        message,
    };
    let body = LoginRequest {
        username: username.to_owned(),
        password: password.to_owned(),
    };
    let text = http
        .post(format!("{}/login", config.server_url))
        .json(&body)
        .send()
        .await
        .and_then(reqwest::Response::error_for_status)
        .map_err(|e| failed(e.to_string()))?
        .text()
        .await
        .map_err(|e| failed(e.to_string()))?;
    let envelope: Envelope<String> =
        serde_json::from_str(&text).map_err(|e| failed(e.to_string()))?;
    if envelope.is_error() {
        return Err(failed(envelope.msg.unwrap_or_default()));
    }
    envelope
        .data
        .filter(|token| !token.is_empty())
        .ok_or_else(|| failed("no token in response".to_owned()))
}

/// One agent's connection to the game server.
#[derive(Debug, Clone)]
pub struct HttpGameClient {
    http: reqwest::Client,
    config: TransportConfig,
    token: String,
    username: String,
    debug: bool,
    destroyed: Arc<AtomicBool>,
}

impl HttpGameClient {
    /// A client for `username` authenticated by `token`.
    ///
    /// `debug` traces every request and reply at `debug` level.
    pub fn new(
        http: reqwest::Client,
        config: TransportConfig,
        username: &str,
        token: &str,
        debug: bool,
        destroyed: Arc<AtomicBool>,
    ) -> Self {
        Self {
            http,
            config,
            token: token.to_owned(),
            username: username.to_owned(),
            debug,
            destroyed,
        }
    }

    async fn get(&self, path: &str) -> ClientResult {
        self.send(&Method::GET, path, None).await
    }

    async fn post<B: Serialize + Sync>(&self, path: &str, body: &B) -> ClientResult {
        let body = serde_json::to_string(body).map_err(|e| ClientError::Decode {
            message: format!("request body for {path}: {e}"),
        })?;
        self.send(&Method::POST, path, Some(body)).await
    }

    async fn send(&self, method: &Method, path: &str, body: Option<String>) -> ClientResult {
        let url = format!("{}{path}", self.config.server_url);
        let mut attempt: u32 = 0;
        loop {
            if self.destroyed.load(Ordering::Acquire) {
                return Err(ClientError::Destroyed);
            }
            if self.debug {
                debug!(agent = %self.username, method = %method, path, body = ?body, "request");
            }
            match self.request_once(method.clone(), &url, body.as_deref()).await {
                Ok(text) => {
                    if self.debug {
                        debug!(agent = %self.username, path, reply = %text, "reply");
                    }
                    return open(&text);
                }
                Err(e) if attempt < self.config.max_retries => {
                    attempt = attempt.saturating_add(1);
                    warn!(
                        agent = %self.username,
                        path,
                        attempt,
                        error = %e,
                        "request failed, retrying"
                    );
                    tokio::time::sleep(self.config.retry_delay).await;
                }
                Err(e) => {
                    return Err(ClientError::Transport {
                        message: e.to_string(),
                    });
                }
            }
        }
    }

    async fn request_once(
        &self,
        method: Method,
        url: &str,
        body: Option<&str>,
    ) -> Result<String, reqwest::Error> {
        let mut request = self
            .http
            .request(method, url)
            .header("token", self.token.as_str());
        if let Some(body) = body {
            request = request
                .header(reqwest::header::CONTENT_TYPE, "application/json")
                .body(body.to_owned());
        }
        request.send().await?.error_for_status()?.text().await
    }
}

/// Decode an envelope body and unwrap its payload.
fn open(text: &str) -> ClientResult {
    let envelope: Envelope<GameResponse> = decode(text)?;
    if envelope.is_error() {
        return Err(ClientError::Protocol {
            status: envelope.status,
            message: envelope.msg.unwrap_or_default(),
        });
    }
    Ok(envelope.data)
}

fn decode<T: DeserializeOwned>(text: &str) -> Result<T, ClientError> {
    serde_json::from_str(text).map_err(|e| ClientError::Decode {
        message: e.to_string(),
    })
}

impl GameClient for HttpGameClient {
    fn init(&self) -> impl Future<Output = ClientResult> + Send {
        self.get("/init")
    }

    fn hey(
        &self,
        unit_id: &str,
        skill_id: &str,
        x: i64,
        y: i64,
    ) -> impl Future<Output = ClientResult> + Send {
        let body = HeyRequest {
            id: unit_id.to_owned(),
            sklid: skill_id.to_owned(),
            x,
            y,
        };
        async move { self.post("/hey", &body).await }
    }

    fn go(&self, x: i64, y: i64) -> impl Future<Output = ClientResult> + Send {
        async move { self.post("/go", &GoRequest { x, y }).await }
    }

    fn task(&self, npc: &str, tid: &str) -> impl Future<Output = ClientResult> + Send {
        let body = TaskRequest {
            npc: npc.to_owned(),
            tid: tid.to_owned(),
        };
        async move { self.post("/task", &body).await }
    }

    fn use_goods(&self, id: &str, all: bool) -> impl Future<Output = ClientResult> + Send {
        let body = UseGoodsRequest {
            id: id.to_owned(),
            all,
        };
        async move { self.post("/goods", &body).await }
    }

    fn equip(&self, id: u64) -> impl Future<Output = ClientResult> + Send {
        async move { self.post("/equip", &EquipRequest { id }).await }
    }

    fn sell(&self, id: u64) -> impl Future<Output = ClientResult> + Send {
        async move { self.post("/sell", &SellRequest { equip_id: id }).await }
    }

    fn buy(
        &self,
        npc: &str,
        shop_id: &str,
        lines: &[PurchaseLine],
    ) -> impl Future<Output = ClientResult> + Send {
        let body = BuyRequest {
            npc: npc.to_owned(),
            shop_id: shop_id.to_owned(),
            buy_items: lines.to_vec(),
        };
        async move { self.post("/buy", &body).await }
    }

    fn upgrade(&self) -> impl Future<Output = ClientResult> + Send {
        async move { self.post("/fb/upgrade", &serde_json::json!({})).await }
    }

    fn confirm_upgrade(&self) -> impl Future<Output = ClientResult> + Send {
        async move { self.post("/fb/upgrade/confirm", &serde_json::json!({})).await }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use std::time::Duration;

    use super::*;

    fn client(destroyed: bool) -> HttpGameClient {
        let config = TransportConfig {
            server_url: "http://127.0.0.1:9".to_owned(),
            request_timeout: Duration::from_millis(50),
            max_retries: 0,
            retry_delay: Duration::ZERO,
        };
        let http = build_http(&config).unwrap();
        HttpGameClient::new(
            http,
            config,
            "ann",
            "t0k3n",
            false,
            Arc::new(AtomicBool::new(destroyed)),
        )
    }

    #[test]
    fn envelope_payload_is_returned() {
        let body = r#"{"status":0,"data":{"pos":{"name":"Town","sizeX":9,"sizeY":9,"x":1,"y":2}}}"#;
        let reply = open(body).unwrap().unwrap();
        assert_eq!(reply.pos.unwrap().name, "Town");
    }

    #[test]
    fn empty_payload_is_none() {
        assert_eq!(open(r#"{"status":0}"#).unwrap(), None);
    }

    #[test]
    fn negative_status_is_a_protocol_error() {
        let err = open(r#"{"status":-3,"msg":"not logged in"}"#).unwrap_err();
        assert_eq!(
            err,
            ClientError::Protocol {
                status: -3,
                message: "not logged in".to_owned(),
            }
        );
    }

    #[test]
    fn garbage_is_a_decode_error() {
        assert!(matches!(open("<html>"), Err(ClientError::Decode { .. })));
    }

    #[tokio::test]
    async fn destroyed_client_sends_nothing() {
        let err = client(true).init().await.unwrap_err();
        assert_eq!(err, ClientError::Destroyed);
    }

    #[tokio::test]
    async fn exhausted_retries_are_a_transport_error() {
        let err = client(false).go(1, 1).await.unwrap_err();
        assert!(matches!(err, ClientError::Transport { .. }));
    }
}
