//! Security Event Log
//!
//! Bounded, insertion-ordered record of security-relevant occurrences.

use chrono::{DateTime, Utc};
use parking_lot::RwLock;
use rand::distributions::Alphanumeric;
use rand::Rng;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::collections::VecDeque;
use std::fmt;
use tracing::debug;

/// Reported when the log holds no events
pub const NO_RECENT_EVENTS: &str = "No recent events";

/// Security event type. Unknown types are kept verbatim.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum SecurityEventKind {
    FailedLogin,
    BlockedRequest,
    SuspiciousActivity,
    Other(String),
}

impl SecurityEventKind {
    pub fn as_str(&self) -> &str {
        match self {
            SecurityEventKind::FailedLogin => "failed_login",
            SecurityEventKind::BlockedRequest => "blocked_request",
            SecurityEventKind::SuspiciousActivity => "suspicious_activity",
            SecurityEventKind::Other(s) => s.as_str(),
        }
    }
}

impl From<&str> for SecurityEventKind {
    fn from(s: &str) -> Self {
        match s {
            "failed_login" => SecurityEventKind::FailedLogin,
            "blocked_request" => SecurityEventKind::BlockedRequest,
            "suspicious_activity" => SecurityEventKind::SuspiciousActivity,
            other => SecurityEventKind::Other(other.to_string()),
        }
    }
}

impl From<String> for SecurityEventKind {
    fn from(s: String) -> Self {
        SecurityEventKind::from(s.as_str())
    }
}

impl From<SecurityEventKind> for String {
    fn from(kind: SecurityEventKind) -> Self {
        kind.as_str().to_string()
    }
}

impl fmt::Display for SecurityEventKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Event severity
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    Low,
    Medium,
    High,
    Critical,
}

/// Event as submitted by the caller; id and timestamp are assigned on append
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NewSecurityEvent {
    #[serde(rename = "type")]
    pub kind: SecurityEventKind,
    pub severity: Severity,
    #[serde(default)]
    pub details: Map<String, Value>,
}

impl NewSecurityEvent {
    pub fn new(kind: impl Into<SecurityEventKind>, severity: Severity) -> Self {
        Self {
            kind: kind.into(),
            severity,
            details: Map::new(),
        }
    }

    pub fn failed_login(ip: &str) -> Self {
        Self::new(SecurityEventKind::FailedLogin, Severity::Medium).with_ip(ip)
    }

    pub fn blocked_request(ip: &str, reason: &str) -> Self {
        Self::new(SecurityEventKind::BlockedRequest, Severity::Medium)
            .with_ip(ip)
            .with_detail("reason", reason)
    }

    pub fn with_ip(self, ip: &str) -> Self {
        self.with_detail("ip", ip)
    }

    pub fn with_user_agent(self, user_agent: &str) -> Self {
        self.with_detail("userAgent", user_agent)
    }

    pub fn with_user_id(self, user_id: &str) -> Self {
        self.with_detail("userId", user_id)
    }

    pub fn with_detail(mut self, key: &str, value: impl Into<Value>) -> Self {
        self.details.insert(key.to_string(), value.into());
        self
    }
}

/// Stored security event
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SecurityEvent {
    pub id: String,
    #[serde(rename = "type")]
    pub kind: SecurityEventKind,
    pub severity: Severity,
    pub details: Map<String, Value>,
    pub timestamp: DateTime<Utc>,
}

/// Time-based id with a random suffix: `<base36 millis>-<9 alphanumerics>`
fn generate_event_id(now: DateTime<Utc>) -> String {
    let mut millis = now.timestamp_millis().max(0) as u64;
    let mut stamp = Vec::new();
    loop {
        let digit = (millis % 36) as u8;
        stamp.push(if digit < 10 { b'0' + digit } else { b'a' + digit - 10 });
        millis /= 36;
        if millis == 0 {
            break;
        }
    }
    stamp.reverse();

    let suffix: String = rand::thread_rng()
        .sample_iter(&Alphanumeric)
        .take(9)
        .map(|b| (b as char).to_ascii_lowercase())
        .collect();

    format!("{}-{}", String::from_utf8_lossy(&stamp), suffix)
}

/// Bounded security event log
///
/// Appends go to the back; once the cap is exceeded the oldest entries are
/// dropped from the front. Reads return newest first.
#[derive(Debug)]
pub struct SecurityEventLog {
    events: RwLock<VecDeque<SecurityEvent>>,
    max_size: usize,
}

impl SecurityEventLog {
    pub fn new(max_size: usize) -> Self {
        let max_size = max_size.max(1);
        Self {
            events: RwLock::new(VecDeque::with_capacity(max_size)),
            max_size,
        }
    }

    /// Append an event, assigning its id and timestamp.
    ///
    /// The timestamp is taken under the write lock so insertion order and
    /// timestamp order agree across concurrent writers.
    pub fn append(&self, event: NewSecurityEvent) -> SecurityEvent {
        let stored = {
            let mut events = self.events.write();
            let now = Utc::now();
            let stored = SecurityEvent {
                id: generate_event_id(now),
                kind: event.kind,
                severity: event.severity,
                details: event.details,
                timestamp: now,
            };

            events.push_back(stored.clone());
            while events.len() > self.max_size {
                events.pop_front();
            }
            stored
        };

        debug!(id = %stored.id, kind = %stored.kind, severity = ?stored.severity, "Security event");
        stored
    }

    /// Up to `limit` events, newest first
    pub fn query(&self, limit: usize) -> Vec<SecurityEvent> {
        let events = self.events.read();
        events.iter().rev().take(limit).cloned().collect()
    }

    /// Number of retained events of the given type
    pub fn count_by_type(&self, kind: &SecurityEventKind) -> usize {
        let events = self.events.read();
        events.iter().filter(|e| &e.kind == kind).count()
    }

    /// Timestamp of the most recently appended event
    pub fn last_event_at(&self) -> Option<DateTime<Utc>> {
        self.events.read().back().map(|e| e.timestamp)
    }

    /// RFC 3339 timestamp of the newest event, or [`NO_RECENT_EVENTS`]
    pub fn last_event_timestamp(&self) -> String {
        self.last_event_at()
            .map(|t| t.to_rfc3339())
            .unwrap_or_else(|| NO_RECENT_EVENTS.to_string())
    }

    pub fn len(&self) -> usize {
        self.events.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.events.read().is_empty()
    }

    pub fn capacity(&self) -> usize {
        self.max_size
    }
}

impl Default for SecurityEventLog {
    fn default() -> Self {
        Self::new(1000)
    }
}
