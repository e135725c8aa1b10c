use std::env;
use std::time::Duration;
use url::Url;

use crate::errors::TransportError;

pub const DEFAULT_BASE_URL: &str = "http://localhost:3000";
pub const DEPLOYMENT_URL_ENV: &str = "JUICI_DEPLOYMENT_URL";
pub const API_URL_ENV: &str = "JUICI_API_URL";

/// Candidate locations of the service, in priority order
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BaseUrlSources {
    /// Host the app is deployed under; `https://` is assumed when no scheme is given
    pub deployment_url: Option<String>,
    /// Explicit override of the public API location
    pub api_url: Option<String>,
    /// Origin of the surface the client runs in
    pub origin: Option<String>,
}

impl BaseUrlSources {
    /// Read the deployment and API overrides from the environment
    pub fn from_env() -> Self {
        BaseUrlSources {
            deployment_url: non_empty_var(DEPLOYMENT_URL_ENV),
            api_url: non_empty_var(API_URL_ENV),
            origin: None,
        }
    }

    pub fn with_origin<S: Into<String>>(mut self, origin: S) -> Self {
        self.origin = Some(origin.into());
        self
    }

    /// First configured source wins, falling back to the local development server
    pub fn resolve(&self) -> String {
        if let Some(deployment) = self.deployment_url.as_deref().filter(|s| !s.is_empty()) {
            return if deployment.contains("://") {
                deployment.to_string()
            } else {
                format!("https://{}", deployment)
            };
        }
        non_empty(&self.api_url)
            .or_else(|| non_empty(&self.origin))
            .unwrap_or(DEFAULT_BASE_URL)
            .to_string()
    }
}

fn non_empty(source: &Option<String>) -> Option<&str> {
    source.as_deref().filter(|s| !s.is_empty())
}

fn non_empty_var(key: &str) -> Option<String> {
    env::var(key).ok().filter(|value| !value.trim().is_empty())
}

/// Everything the transport needs, built once at startup and passed in
#[derive(Debug, Clone)]
pub struct ClientConfig {
    pub base_url: String,
    pub timeout: Duration,
    /// Advertise `text/event-stream` so the service may stream replies
    pub prefer_streaming: bool,
}

impl Default for ClientConfig {
    fn default() -> Self {
        ClientConfig {
            base_url: DEFAULT_BASE_URL.to_string(),
            timeout: Duration::from_secs(120),
            prefer_streaming: true,
        }
    }
}

impl ClientConfig {
    pub fn new<S: Into<String>>(base_url: S) -> Self {
        ClientConfig {
            base_url: base_url.into(),
            ..Default::default()
        }
    }

    pub fn from_sources(sources: &BaseUrlSources) -> Self {
        Self::new(sources.resolve())
    }

    pub fn with_streaming(mut self, prefer_streaming: bool) -> Self {
        self.prefer_streaming = prefer_streaming;
        self
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Absolute URL of an API route such as `chat` or `agents/blogsmith`
    pub fn api_url(&self, route: &str) -> Result<Url, TransportError> {
        let raw = format!(
            "{}/api/{}",
            self.base_url.trim_end_matches('/'),
            route.trim_start_matches('/')
        );
        Url::parse(&raw).map_err(|e| TransportError::Config(format!("{}: {}", raw, e)))
    }
}
