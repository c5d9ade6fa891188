//! Inbound form extraction and re-encoding.
//!
//! The form is the union of the query string and, for `POST`, `PUT` and
//! `PATCH` requests sent as `application/x-www-form-urlencoded`, the body.
//! Body values come first so they win over query values of the same name.

use axum::http::{header, HeaderMap, Method};
use url::form_urlencoded;

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Form {
    pairs: Vec<(String, String)>,
}

impl Form {
    #[must_use]
    pub fn from_request(method: &Method, query: Option<&str>, headers: &HeaderMap, body: &[u8]) -> Self {
        let mut pairs = Vec::new();

        if carries_form_body(method, headers) {
            pairs.extend(form_urlencoded::parse(body).into_owned());
        }
        if let Some(query) = query {
            pairs.extend(form_urlencoded::parse(query.as_bytes()).into_owned());
        }

        Self { pairs }
    }

    /// First value for `key`, or `""` when absent.
    #[must_use]
    pub fn value(&self, key: &str) -> &str {
        self.pairs
            .iter()
            .find(|(k, _)| k == key)
            .map_or("", |(_, v)| v.as_str())
    }

    /// Re-encode every pair as `application/x-www-form-urlencoded`, sorted
    /// by key. Values of one key keep their original order.
    #[must_use]
    pub fn encode(&self) -> String {
        let mut sorted: Vec<&(String, String)> = self.pairs.iter().collect();
        sorted.sort_by(|a, b| a.0.cmp(&b.0));

        let mut serializer = form_urlencoded::Serializer::new(String::new());
        for (k, v) in sorted {
            serializer.append_pair(k, v);
        }
        serializer.finish()
    }
}

fn carries_form_body(method: &Method, headers: &HeaderMap) -> bool {
    if !matches!(*method, Method::POST | Method::PUT | Method::PATCH) {
        return false;
    }
    headers
        .get(header::CONTENT_TYPE)
        .and_then(|v| v.to_str().ok())
        .and_then(|ct| ct.split(';').next())
        .is_some_and(|mime| {
            mime.trim()
                .eq_ignore_ascii_case("application/x-www-form-urlencoded")
        })
}
