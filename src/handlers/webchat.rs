use std::net::SocketAddr;
use std::sync::Arc;

use axum::body::Bytes;
use axum::extract::{ConnectInfo, State};
use axum::http::HeaderMap;
use axum::Json;
use serde::{Deserialize, Serialize};

use crate::models::Inbound;
use crate::state::AppState;

#[derive(Debug, Default, Deserialize)]
pub struct WebChatRequest {
    #[serde(default)]
    pub message: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct WebChatResponse {
    pub reply: String,
}

/// Chat widget endpoint. A body that is not the expected JSON counts as an empty message.
pub async fn webchat(
    State(state): State<Arc<AppState>>,
    connect_info: Option<ConnectInfo<SocketAddr>>,
    headers: HeaderMap,
    body: Bytes,
) -> Json<WebChatResponse> {
    let request: WebChatRequest = serde_json::from_slice(&body).unwrap_or_else(|e| {
        if !body.is_empty() {
            tracing::debug!(error = %e, "malformed webchat body, treating as empty message");
        }
        WebChatRequest::default()
    });
    let text = request.message.unwrap_or_default().trim().to_string();
    let session_id = session_id(&headers, connect_info.map(|ConnectInfo(addr)| addr));

    tracing::info!(session = %session_id, "incoming webchat message");

    let reply = state.dialogue.handle(&Inbound::web(session_id, text)).await;
    Json(WebChatResponse { reply: reply.text })
}

/// First `X-Forwarded-For` hop, else the peer address, else `anon`.
fn session_id(headers: &HeaderMap, peer: Option<SocketAddr>) -> String {
    headers
        .get("x-forwarded-for")
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.split(',').next())
        .map(str::trim)
        .filter(|v| !v.is_empty())
        .map(str::to_string)
        .or_else(|| peer.map(|addr| addr.ip().to_string()))
        .unwrap_or_else(|| "anon".to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::HeaderValue;

    #[test]
    fn test_session_id_prefers_forwarded_for() {
        let mut headers = HeaderMap::new();
        headers.insert("x-forwarded-for", HeaderValue::from_static("203.0.113.7, 10.0.0.1"));
        let peer: SocketAddr = "127.0.0.1:5000".parse().unwrap();
        assert_eq!(session_id(&headers, Some(peer)), "203.0.113.7");
    }

    #[test]
    fn test_session_id_falls_back_to_peer_then_anon() {
        let headers = HeaderMap::new();
        let peer: SocketAddr = "192.0.2.1:5000".parse().unwrap();
        assert_eq!(session_id(&headers, Some(peer)), "192.0.2.1");
        assert_eq!(session_id(&headers, None), "anon");
    }
}
