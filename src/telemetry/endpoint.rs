//! Endpoint Keys
//!
//! Route normalization so that path parameters don't explode key cardinality.

use serde::Serialize;
use std::fmt;

/// Placeholder substituted for identifier-like path segments
pub const ID_PLACEHOLDER: &str = ":id";

/// (HTTP method, route) pair used to bucket performance samples
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
pub struct EndpointKey {
    pub method: String,
    pub endpoint: String,
}

impl EndpointKey {
    /// Build a key as given, only upper-casing the method
    pub fn raw(method: &str, endpoint: &str) -> Self {
        Self {
            method: method.trim().to_ascii_uppercase(),
            endpoint: endpoint.to_string(),
        }
    }

    /// Build a key keyed on the route template rather than the raw path
    pub fn normalized(method: &str, endpoint: &str) -> Self {
        Self {
            method: method.trim().to_ascii_uppercase(),
            endpoint: normalize_path(endpoint),
        }
    }
}

impl fmt::Display for EndpointKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}", self.method, self.endpoint)
    }
}

/// Strip the query string and trailing slash, and replace identifier
/// segments with [`ID_PLACEHOLDER`].
pub fn normalize_path(path: &str) -> String {
    let path = path.split(['?', '#']).next().unwrap_or_default();

    let segments: Vec<&str> = path
        .split('/')
        .filter(|s| !s.is_empty())
        .map(|s| if looks_like_id(s) { ID_PLACEHOLDER } else { s })
        .collect();

    if segments.is_empty() {
        return "/".to_string();
    }

    let mut out = String::with_capacity(path.len());
    for segment in segments {
        out.push('/');
        out.push_str(segment);
    }
    out
}

fn looks_like_id(segment: &str) -> bool {
    if segment.bytes().all(|b| b.is_ascii_digit()) {
        return true;
    }

    // 8-4-4-4-12 hex groups
    if segment.len() == 36 {
        let groups: Vec<&str> = segment.split('-').collect();
        let lengths = [8, 4, 4, 4, 12];
        if groups.len() == 5
            && groups
                .iter()
                .zip(lengths)
                .all(|(g, len)| g.len() == len && g.bytes().all(|b| b.is_ascii_hexdigit()))
        {
            return true;
        }
    }

    // Object ids, hashes
    segment.len() >= 16 && segment.bytes().all(|b| b.is_ascii_hexdigit())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_normalize_numeric_and_uuid() {
        assert_eq!(normalize_path("/users/42"), "/users/:id");
        assert_eq!(
            normalize_path("/companies/3f2b8c1e-9a4d-4c7e-8f1a-0b2c3d4e5f60/members"),
            "/companies/:id/members"
        );
        assert_eq!(
            normalize_path("/files/507f1f77bcf86cd799439011"),
            "/files/:id"
        );
    }

    #[test]
    fn test_normalize_query_and_slashes() {
        assert_eq!(normalize_path("/content/?page=2"), "/content");
        assert_eq!(normalize_path(""), "/");
        assert_eq!(normalize_path("/"), "/");
        assert_eq!(normalize_path("//users//7/"), "/users/:id");
    }

    #[test]
    fn test_words_are_kept() {
        assert_eq!(normalize_path("/api/v1/reactions"), "/api/v1/reactions");
        assert_eq!(normalize_path("/users/cafe"), "/users/cafe");
    }

    #[test]
    fn test_key_display() {
        let key = EndpointKey::normalized("get", "/users/12");
        assert_eq!(key.to_string(), "GET /users/:id");
        assert_eq!(EndpointKey::raw("post", "/users/12").endpoint, "/users/12");
    }
}
