//! Value Objects - Immutable domain primitives
//!
//! Value objects are identified by their value rather than identity.
//! They are immutable and can be freely shared.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Base URL of one directory service instance.
///
/// Endpoints come from configuration and are never reordered canonically;
/// the visiting order is randomized per fetch.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Endpoint(String);

impl Endpoint {
    pub fn new(url: impl Into<String>) -> Self {
        Self(url.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Build the full target URL for `path` on this endpoint.
    ///
    /// Trailing slashes of the endpoint and leading slashes of the cleaned
    /// path are trimmed, then joined with exactly one `/`. A relative path
    /// with leading `..` elements is joined as is; callers reject it with
    /// [`ApiPath::escapes_base`] before parsing the URL.
    ///
    /// # Examples
    /// ```
    /// use stns_fetch::domain::value_objects::{ApiPath, Endpoint};
    ///
    /// let ep = Endpoint::new("https://stns.example.com/v1/");
    /// let path = ApiPath::from_segments(["/user", "name", "alice"]);
    /// assert_eq!(ep.target_url(&path), "https://stns.example.com/v1/user/name/alice");
    /// ```
    pub fn target_url(&self, path: &ApiPath) -> String {
        let cleaned = path.cleaned();
        format!(
            "{}/{}",
            self.0.trim_end_matches('/'),
            cleaned.trim_start_matches('/')
        )
    }
}

impl fmt::Display for Endpoint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for Endpoint {
    fn from(s: &str) -> Self {
        Self::new(s)
    }
}

impl From<String> for Endpoint {
    fn from(s: String) -> Self {
        Self(s)
    }
}

/// Relative API path of a lookup, e.g. `user/name/alice`.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ApiPath(String);

impl ApiPath {
    pub fn new(path: impl Into<String>) -> Self {
        Self(path.into())
    }

    /// Join path segments with `/`.
    pub fn from_segments<I, S>(segments: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let joined = segments
            .into_iter()
            .map(|s| s.as_ref().to_string())
            .collect::<Vec<_>>()
            .join("/");
        Self(joined)
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Lexically cleaned form of the path.
    ///
    /// Repeated slashes collapse, `.` elements are dropped and `..` removes the
    /// preceding element. A rooted path never climbs above `/`; a relative one
    /// keeps leading `..` elements. An empty result is `.` (or `/` if rooted).
    pub fn cleaned(&self) -> String {
        let rooted = self.0.starts_with('/');
        let mut parts: Vec<&str> = Vec::new();

        for part in self.0.split('/') {
            match part {
                "" | "." => {}
                ".." => match parts.last() {
                    Some(&last) if last != ".." => {
                        parts.pop();
                    }
                    _ if rooted => {}
                    _ => parts.push(".."),
                },
                other => parts.push(other),
            }
        }

        let body = parts.join("/");
        match (rooted, body.is_empty()) {
            (true, _) => format!("/{}", body),
            (false, true) => ".".to_string(),
            (false, false) => body,
        }
    }

    /// Whether the cleaned path climbs above the endpoint's base path.
    ///
    /// Only relative paths can: a rooted path is clamped at `/` by cleaning.
    pub fn escapes_base(&self) -> bool {
        let cleaned = self.cleaned();
        cleaned == ".." || cleaned.starts_with("../")
    }
}

impl fmt::Display for ApiPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for ApiPath {
    fn from(s: &str) -> Self {
        Self::new(s)
    }
}
