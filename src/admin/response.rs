//! Admin Request and Response Types

use serde::Serialize;
use std::collections::HashMap;
use tracing::error;

/// Uniform result envelope: `{success, data}` or `{success, message}`
#[derive(Debug, Serialize)]
pub struct Envelope<'a, T: Serialize> {
    pub success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<&'a T>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<&'a str>,
}

/// Admin endpoint response
#[derive(Debug, Clone)]
pub struct AdminResponse {
    pub status: u16,
    pub content_type: String,
    pub body: String,
}

impl AdminResponse {
    /// 200 with `data` wrapped in the success envelope
    pub fn ok<T: Serialize>(data: &T) -> Self {
        let envelope = Envelope {
            success: true,
            data: Some(data),
            message: None,
        };

        match serde_json::to_string(&envelope) {
            Ok(body) => Self::json(200, body),
            Err(e) => {
                error!(error = %e, "Failed to serialize admin response");
                Self::error(500, "Internal server error")
            }
        }
    }

    pub fn error(status: u16, message: &str) -> Self {
        let envelope: Envelope<'_, ()> = Envelope {
            success: false,
            data: None,
            message: Some(message),
        };
        let body = serde_json::to_string(&envelope)
            .unwrap_or_else(|_| r#"{"success":false}"#.to_string());
        Self::json(status, body)
    }

    pub fn not_found() -> Self {
        Self::error(404, "Not found")
    }

    pub fn method_not_allowed() -> Self {
        Self::error(405, "Method not allowed")
    }

    pub fn bad_request(message: &str) -> Self {
        Self::error(400, message)
    }

    fn json(status: u16, body: String) -> Self {
        Self {
            status,
            content_type: "application/json".to_string(),
            body,
        }
    }

    /// Whether the request counts as successful for performance tracking
    pub fn is_success(&self) -> bool {
        self.status < 400
    }
}

/// Admin request
#[derive(Debug, Clone)]
pub struct AdminRequest {
    pub method: String,
    pub path: String,
    pub query: HashMap<String, String>,
    pub headers: HashMap<String, String>,
}

impl AdminRequest {
    pub fn new(method: &str, path: &str) -> Self {
        Self {
            method: method.to_uppercase(),
            path: path.to_string(),
            query: HashMap::new(),
            headers: HashMap::new(),
        }
    }

    /// Build from a request target such as `/security?limit=10`
    pub fn from_target(method: &str, target: &str) -> Self {
        let (path, query) = match target.split_once('?') {
            Some((path, query)) => (path, query),
            None => (target, ""),
        };

        let mut req = Self::new(method, path);
        for pair in query.split('&').filter(|p| !p.is_empty()) {
            let (key, value) = pair.split_once('=').unwrap_or((pair, ""));
            req.query.insert(key.to_string(), value.to_string());
        }
        req
    }

    pub fn with_query(mut self, key: &str, value: &str) -> Self {
        self.query.insert(key.to_string(), value.to_string());
        self
    }

    pub fn with_header(mut self, key: &str, value: &str) -> Self {
        self.headers.insert(key.to_lowercase(), value.to_string());
        self
    }

    pub fn get_header(&self, key: &str) -> Option<&String> {
        self.headers.get(&key.to_lowercase())
    }

    /// Positive integer query parameter, if present and valid
    pub fn query_usize(&self, key: &str) -> Option<usize> {
        self.query
            .get(key)
            .and_then(|v| v.parse::<usize>().ok())
            .filter(|n| *n > 0)
    }
}
