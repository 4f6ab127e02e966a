use serde::{Deserialize, Serialize};
use std::fmt;

/// HTTP verbs used by the gateway API.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Method {
    Get,
    Post,
    Put,
    Delete,
}

impl fmt::Display for Method {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Method::Get => "GET",
            Method::Post => "POST",
            Method::Put => "PUT",
            Method::Delete => "DELETE",
        };
        f.write_str(s)
    }
}

/// One declared endpoint. Paths use `:name` placeholders.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Endpoint {
    pub method: Method,
    pub path: &'static str,
}

impl Endpoint {
    pub const fn new(method: Method, path: &'static str) -> Self {
        Self { method, path }
    }

    /// The path in axum's router syntax (`/api/contacts/{id}`).
    pub fn router_path(&self) -> String {
        self.path
            .split('/')
            .map(|segment| match segment.strip_prefix(':') {
                Some(name) => format!("{{{name}}}"),
                None => segment.to_string(),
            })
            .collect::<Vec<_>>()
            .join("/")
    }

    pub fn url<K, V>(&self, params: impl IntoIterator<Item = (K, V)>) -> String
    where
        K: AsRef<str>,
        V: fmt::Display,
    {
        build_url(self.path, params)
    }
}

pub mod contacts {
    use super::{Endpoint, Method};

    pub const LIST: Endpoint = Endpoint::new(Method::Get, "/api/contacts");
    pub const CREATE: Endpoint = Endpoint::new(Method::Post, "/api/contacts");
    pub const UPDATE: Endpoint = Endpoint::new(Method::Put, "/api/contacts/:id");
    pub const DELETE: Endpoint = Endpoint::new(Method::Delete, "/api/contacts/:id");
}

pub mod messages {
    use super::{Endpoint, Method};

    pub const LIST: Endpoint = Endpoint::new(Method::Get, "/api/messages");
    pub const SEND: Endpoint = Endpoint::new(Method::Post, "/api/messages/send");
}

pub mod stats {
    use super::{Endpoint, Method};

    pub const GET: Endpoint = Endpoint::new(Method::Get, "/api/stats");
}

pub mod settings {
    use super::{Endpoint, Method};

    pub const LIST: Endpoint = Endpoint::new(Method::Get, "/api/settings");
    pub const UPDATE: Endpoint = Endpoint::new(Method::Put, "/api/settings/:key");
}

pub const HEALTH: Endpoint = Endpoint::new(Method::Get, "/api/health");
pub const EVENTS: Endpoint = Endpoint::new(Method::Get, "/ws/events");

/// Substitutes `:name` placeholders in `path`. Unknown keys are ignored and
/// only the first occurrence of each placeholder is replaced.
pub fn build_url<K, V>(path: &str, params: impl IntoIterator<Item = (K, V)>) -> String
where
    K: AsRef<str>,
    V: fmt::Display,
{
    let mut url = path.to_string();
    for (key, value) in params {
        let placeholder = format!(":{}", key.as_ref());
        if url.contains(&placeholder) {
            url = url.replacen(&placeholder, &value.to_string(), 1);
        }
    }
    url
}

// --- Error bodies ---

/// 400 body: a required field was missing or invalid.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ValidationErrorBody {
    pub message: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub field: Option<String>,
}

/// 404 body.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NotFoundBody {
    pub message: String,
}
