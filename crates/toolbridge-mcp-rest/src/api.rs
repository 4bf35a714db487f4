//! HTTP client shared by every tool of one REST backend.
//!
//! [`ApiClient::call`] is the single request path: it joins the endpoint to
//! the base URL, attaches the auth header, retries once on `401` when the
//! token source can refresh, and decodes the body into JSON.

use crate::auth::Auth;
use crate::error::{RestError, Result};
use reqwest::header::{ACCEPT, HeaderMap, HeaderName, HeaderValue};
use reqwest::{Method, StatusCode, Url};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::fmt;
use std::time::Duration;
use toolbridge_core::TtlCache;

/// `User-Agent` sent with every request.
pub const USER_AGENT: &str = concat!("toolbridge/", env!("CARGO_PKG_VERSION"));

/// HTTP methods a configured tool can use.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum HttpMethod {
    /// GET
    #[default]
    Get,
    /// POST
    Post,
    /// PUT
    Put,
    /// PATCH
    Patch,
    /// DELETE
    Delete,
}

impl HttpMethod {
    /// Upper-case method name.
    pub fn as_str(self) -> &'static str {
        match self {
            HttpMethod::Get => "GET",
            HttpMethod::Post => "POST",
            HttpMethod::Put => "PUT",
            HttpMethod::Patch => "PATCH",
            HttpMethod::Delete => "DELETE",
        }
    }

    /// Whether the method carries a JSON body.
    pub fn has_body(self) -> bool {
        matches!(self, HttpMethod::Post | HttpMethod::Put | HttpMethod::Patch)
    }
}

impl From<HttpMethod> for Method {
    fn from(method: HttpMethod) -> Self {
        match method {
            HttpMethod::Get => Method::GET,
            HttpMethod::Post => Method::POST,
            HttpMethod::Put => Method::PUT,
            HttpMethod::Patch => Method::PATCH,
            HttpMethod::Delete => Method::DELETE,
        }
    }
}

impl fmt::Display for HttpMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// REST client for one backend.
pub struct ApiClient {
    http: reqwest::Client,
    base_url: String,
    auth: Auth,
    headers: HeaderMap,
    cache: Option<TtlCache<String, Value>>,
}

impl ApiClient {
    /// Create a client for `base_url`.
    pub fn new(base_url: impl Into<String>, auth: Auth) -> Result<Self> {
        let http = reqwest::Client::builder().user_agent(USER_AGENT).build()?;
        Ok(Self {
            http,
            base_url: base_url.into(),
            auth,
            headers: HeaderMap::new(),
            cache: None,
        })
    }

    /// Send an extra header with every request.
    pub fn with_header(mut self, name: &str, value: &str) -> Result<Self> {
        let invalid = || RestError::InvalidHeader {
            name: name.to_string(),
        };
        let name = HeaderName::try_from(name).map_err(|_| invalid())?;
        let value = HeaderValue::from_str(value).map_err(|_| invalid())?;
        self.headers.insert(name, value);
        Ok(self)
    }

    /// Cache successful GET responses for `ttl`. A zero TTL disables caching.
    pub fn with_cache_ttl(mut self, ttl: Duration) -> Self {
        self.cache = (!ttl.is_zero()).then(|| TtlCache::new(ttl));
        self
    }

    /// Base URL requests are resolved against.
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// The configured auth scheme.
    pub fn auth(&self) -> &Auth {
        &self.auth
    }

    /// Drop every cached response.
    pub fn clear_cache(&self) {
        if let Some(cache) = &self.cache {
            cache.clear();
        }
    }

    /// Resolve `endpoint` against the base URL and append `query`.
    ///
    /// Absolute `http(s)://` endpoints (pagination links) are used as-is.
    pub fn url(&self, endpoint: &str, query: &[(String, String)]) -> Result<Url> {
        let raw = if endpoint.starts_with("http://") || endpoint.starts_with("https://") {
            endpoint.to_string()
        } else {
            format!(
                "{}/{}",
                self.base_url.trim_end_matches('/'),
                endpoint.trim_start_matches('/')
            )
        };
        let mut url = Url::parse(&raw).map_err(|e| RestError::invalid_url(&raw, e))?;
        if !query.is_empty() {
            url.query_pairs_mut()
                .extend_pairs(query.iter().map(|(k, v)| (k.as_str(), v.as_str())));
        }
        Ok(url)
    }

    /// Perform one API call and decode the response.
    ///
    /// - non-2xx → [`RestError::Status`] with the raw body
    /// - empty body → `null`
    /// - body that is not JSON → a JSON string
    pub async fn call(
        &self,
        method: HttpMethod,
        endpoint: &str,
        query: &[(String, String)],
        body: Option<&Value>,
    ) -> Result<Value> {
        let url = self.url(endpoint, query)?;
        let cache_key = (method == HttpMethod::Get).then(|| url.to_string());

        if let (Some(cache), Some(key)) = (&self.cache, &cache_key)
            && let Some(hit) = cache.get(key)
        {
            tracing::debug!(%url, "Response cache hit");
            return Ok(hit);
        }

        tracing::debug!(%method, %url, "API request");
        let mut response = self.send(method, &url, body).await?;

        if response.status() == StatusCode::UNAUTHORIZED && self.auth.refresh().await? {
            tracing::warn!(%url, "Unauthorized, retrying with refreshed credentials");
            response = self.send(method, &url, body).await?;
        }

        let status = response.status();
        let text = response.text().await?;
        if !status.is_success() {
            tracing::debug!(%url, status = status.as_u16(), "API error response");
            return Err(RestError::Status {
                status: status.as_u16(),
                body: text,
            });
        }

        let value = parse_body(&text);
        match (&self.cache, cache_key) {
            (Some(cache), Some(key)) => cache.insert(key, value.clone()),
            // A successful write may change what a cached GET would return.
            (Some(cache), None) => cache.clear(),
            _ => {}
        }
        Ok(value)
    }

    /// GET `endpoint` without query parameters.
    pub async fn get(&self, endpoint: &str) -> Result<Value> {
        self.call(HttpMethod::Get, endpoint, &[], None).await
    }

    async fn send(
        &self,
        method: HttpMethod,
        url: &Url,
        body: Option<&Value>,
    ) -> Result<reqwest::Response> {
        let mut request = self
            .http
            .request(method.into(), url.clone())
            .header(ACCEPT, "application/json")
            .headers(self.headers.clone());
        if let Some((name, value)) = self.auth.header().await? {
            request = request.header(name, value);
        }
        if let Some(body) = body {
            request = request.json(body);
        }
        Ok(request.send().await?)
    }
}

impl fmt::Debug for ApiClient {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ApiClient")
            .field("base_url", &self.base_url)
            .field("auth", &self.auth)
            .field("cached", &self.cache.is_some())
            .finish_non_exhaustive()
    }
}

fn parse_body(text: &str) -> Value {
    if text.trim().is_empty() {
        return Value::Null;
    }
    serde_json::from_str(text).unwrap_or_else(|_| Value::String(text.to_string()))
}
