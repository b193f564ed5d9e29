//! HTTP discovery endpoints (`/json/version`, `/json/list`, ...).
//!
//! Front ends poll these to find the WebSocket URL. Every answer, including
//! the 400 for unknown paths, carries `Cache-Control: no-cache`.

use axum::{
    http::{StatusCode, header},
    response::{IntoResponse, Response},
};
use serde_json::{Value, json};

/// Protocol version advertised by `/json/version`.
pub const PROTOCOL_VERSION: &str = "1.1";

/// Identity of the running inspector as shown to front ends.
#[derive(Debug, Clone)]
pub struct DiscoveryInfo {
    pub product_name: String,
    pub version: String,
    pub host: String,
    pub port: u16,
}

impl DiscoveryInfo {
    pub fn new(product_name: &str, host: &str, port: u16) -> Self {
        Self {
            product_name: product_name.to_string(),
            version: env!("CARGO_PKG_VERSION").to_string(),
            host: host.to_string(),
            port,
        }
    }

    pub fn websocket_url(&self) -> String {
        format!("ws://{}:{}/", self.host, self.port)
    }

    /// Body of `GET /`.
    pub fn banner(&self) -> String {
        format!("{} v{}", self.product_name, self.version)
    }

    /// Body of `GET /json/version`.
    pub fn version_info(&self) -> Value {
        json!({
            "Browser": format!("{}/v{}", self.product_name, self.version),
            "Protocol-Version": PROTOCOL_VERSION,
            "V8-Version": self.version,
            "webSocketDebuggerUrl": self.websocket_url(),
        })
    }

    /// Body of `GET /json/list`: this process as the single target.
    pub fn targets(&self) -> Value {
        let ws = format!("{}:{}", self.host, self.port);
        json!([{
            "description": format!("{} instance", self.product_name),
            "devtoolsFrontendUrl": format!(
                "devtools://devtools/bundled/js_app.html?experiments=true&v8only=true&ws={ws}"
            ),
            "devtoolsFrontendUrlCompat": format!(
                "devtools://devtools/bundled/inspector.html?experiments=true&v8only=true&ws={ws}"
            ),
            "faviconUrl": "https://nodejs.org/static/images/favicons/favicon.ico",
            "id": self.product_name,
            "title": format!("{}[{}]", self.product_name, std::process::id()),
            "type": "node",
            "url": "file://",
            "webSocketDebuggerUrl": self.websocket_url(),
        }])
    }

    /// Body of `GET /json/protocol`. No domains are described.
    pub fn protocol(&self) -> Value {
        json!({
            "version": { "major": "1", "minor": "0" },
            "domains": [],
        })
    }
}

/// Answer a plain HTTP request by path.
pub fn respond(path: &str, info: &DiscoveryInfo) -> Response {
    let path = match path.strip_suffix('/') {
        Some(trimmed) if !trimmed.is_empty() => trimmed,
        _ => path,
    };

    match path {
        "/" => text(StatusCode::OK, info.banner()),
        "/json/version" => json_body(info.version_info()),
        "/json" | "/json/list" => json_body(info.targets()),
        "/json/protocol" => json_body(info.protocol()),
        _ => text(StatusCode::BAD_REQUEST, "400 bad request".to_string()),
    }
}

fn text(status: StatusCode, body: String) -> Response {
    (
        status,
        [
            (header::CONTENT_TYPE, "text/plain; charset=UTF-8"),
            (header::CACHE_CONTROL, "no-cache"),
        ],
        body,
    )
        .into_response()
}

fn json_body(body: Value) -> Response {
    (
        StatusCode::OK,
        [
            (header::CONTENT_TYPE, "application/json; charset=UTF-8"),
            (header::CACHE_CONTROL, "no-cache"),
        ],
        body.to_string(),
    )
        .into_response()
}
