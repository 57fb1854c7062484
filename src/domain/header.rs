use serde::{Deserialize, Serialize};

/// Trim surrounding whitespace and strip every single and double quote.
///
/// Header values end up inside JSON string literals on the collector side,
/// so quotes are removed rather than escaped.
pub fn sanitize(value: &str) -> String {
    let unquoted: String = value.chars().filter(|c| *c != '\'' && *c != '"').collect();
    unquoted.trim().to_string()
}

/// Identifies the source of a report. Values are sanitized when assigned,
/// including when read from a serialized form.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "RawHeaderInfo")]
pub struct HeaderInfo {
    key: String,
    app: String,
    env: String,
    server: String,
}

#[derive(Default, Deserialize)]
#[serde(default)]
struct RawHeaderInfo {
    key: String,
    app: String,
    env: String,
    server: String,
}

impl From<RawHeaderInfo> for HeaderInfo {
    fn from(raw: RawHeaderInfo) -> Self {
        HeaderInfo::new(&raw.key, &raw.app, &raw.env, &raw.server)
    }
}

impl HeaderInfo {
    pub fn new(key: &str, app: &str, env: &str, server: &str) -> Self {
        Self {
            key: sanitize(key),
            app: sanitize(app),
            env: sanitize(env),
            server: sanitize(server),
        }
    }

    pub fn key(&self) -> &str {
        &self.key
    }

    pub fn app(&self) -> &str {
        &self.app
    }

    pub fn env(&self) -> &str {
        &self.env
    }

    pub fn server(&self) -> &str {
        &self.server
    }

    pub fn set_key(&mut self, key: &str) {
        self.key = sanitize(key);
    }

    pub fn set_app(&mut self, app: &str) {
        self.app = sanitize(app);
    }

    pub fn set_env(&mut self, env: &str) {
        self.env = sanitize(env);
    }

    pub fn set_server(&mut self, server: &str) {
        self.server = sanitize(server);
    }

    pub fn with_key(mut self, key: &str) -> Self {
        self.set_key(key);
        self
    }

    pub fn with_app(mut self, app: &str) -> Self {
        self.set_app(app);
        self
    }

    pub fn with_env(mut self, env: &str) -> Self {
        self.set_env(env);
        self
    }

    pub fn with_server(mut self, server: &str) -> Self {
        self.set_server(server);
        self
    }
}
