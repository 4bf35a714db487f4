//! Authorization header construction.
//!
//! Each backend authenticates one of a handful of ways. [`Auth`] turns the
//! configured credential into exactly one request header:
//!
//! | Variant  | Header                                   |
//! |----------|------------------------------------------|
//! | `Bearer` | `Authorization: Bearer <token>`          |
//! | `Token`  | `Authorization: token <token>`           |
//! | `Basic`  | `Authorization: Basic base64(user:pass)` |
//! | `ApiKey` | `<header>: <value>`                      |
//!
//! Token-based variants read through a [`TokenSource`] so that short-lived
//! tokens can be refreshed after a `401`.

use crate::error::{RestError, Result};
use async_trait::async_trait;
use base64::Engine;
use base64::engine::general_purpose::STANDARD;
use reqwest::header::{AUTHORIZATION, HeaderName, HeaderValue};
use std::fmt;
use std::sync::Arc;

/// Supplies the token for `Bearer` and `Token` auth.
#[async_trait]
pub trait TokenSource: Send + Sync {
    /// The current token.
    async fn token(&self) -> Result<String>;

    /// Obtain a new token after the backend rejected the current one.
    ///
    /// Returns `false` when there is nothing new to try, in which case the
    /// rejected request is not retried.
    async fn refresh(&self) -> Result<bool> {
        Ok(false)
    }
}

/// A fixed token that never refreshes.
#[derive(Clone)]
pub struct StaticToken(String);

impl StaticToken {
    /// Wrap a token.
    pub fn new(token: impl Into<String>) -> Self {
        Self(token.into())
    }
}

impl fmt::Debug for StaticToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("StaticToken(***)")
    }
}

#[async_trait]
impl TokenSource for StaticToken {
    async fn token(&self) -> Result<String> {
        Ok(self.0.clone())
    }
}

/// How a backend authenticates.
#[derive(Clone, Default)]
pub enum Auth {
    /// No credentials.
    #[default]
    None,
    /// `Authorization: Bearer <token>`
    Bearer(Arc<dyn TokenSource>),
    /// `Authorization: token <token>`
    Token(Arc<dyn TokenSource>),
    /// `Authorization: Basic base64(username:password)`
    Basic {
        /// User name
        username: String,
        /// Password or app token
        password: String,
    },
    /// A custom header carrying the key verbatim.
    ApiKey {
        /// Header name, e.g. `X-API-Key`
        header: String,
        /// Key value
        value: String,
    },
}

impl Auth {
    /// Bearer auth with a fixed token.
    pub fn bearer(token: impl Into<String>) -> Self {
        Auth::Bearer(Arc::new(StaticToken::new(token)))
    }

    /// `token` auth with a fixed token.
    pub fn token(token: impl Into<String>) -> Self {
        Auth::Token(Arc::new(StaticToken::new(token)))
    }

    /// Basic auth.
    pub fn basic(username: impl Into<String>, password: impl Into<String>) -> Self {
        Auth::Basic {
            username: username.into(),
            password: password.into(),
        }
    }

    /// API key in a custom header.
    pub fn api_key(header: impl Into<String>, value: impl Into<String>) -> Self {
        Auth::ApiKey {
            header: header.into(),
            value: value.into(),
        }
    }

    /// The header this credential produces, if any.
    pub async fn header(&self) -> Result<Option<(HeaderName, HeaderValue)>> {
        let (name, value) = match self {
            Auth::None => return Ok(None),
            Auth::Bearer(source) => (AUTHORIZATION, format!("Bearer {}", source.token().await?)),
            Auth::Token(source) => (AUTHORIZATION, format!("token {}", source.token().await?)),
            Auth::Basic { username, password } => (
                AUTHORIZATION,
                format!("Basic {}", STANDARD.encode(format!("{username}:{password}"))),
            ),
            Auth::ApiKey { header, value } => {
                let name = HeaderName::try_from(header.as_str()).map_err(|_| {
                    RestError::InvalidHeader {
                        name: header.clone(),
                    }
                })?;
                (name, value.clone())
            }
        };

        let mut value = HeaderValue::from_str(&value).map_err(|_| RestError::InvalidHeader {
            name: name.as_str().to_string(),
        })?;
        value.set_sensitive(true);
        Ok(Some((name, value)))
    }

    /// Ask the token source for a new token. Only token-based variants can
    /// refresh.
    pub async fn refresh(&self) -> Result<bool> {
        match self {
            Auth::Bearer(source) | Auth::Token(source) => source.refresh().await,
            _ => Ok(false),
        }
    }

    /// Short name of the scheme, for logs.
    pub fn scheme(&self) -> &'static str {
        match self {
            Auth::None => "none",
            Auth::Bearer(_) => "bearer",
            Auth::Token(_) => "token",
            Auth::Basic { .. } => "basic",
            Auth::ApiKey { .. } => "api_key",
        }
    }
}

impl fmt::Debug for Auth {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Auth::ApiKey { header, .. } => f
                .debug_struct("ApiKey")
                .field("header", header)
                .finish_non_exhaustive(),
            Auth::Basic { username, .. } => f
                .debug_struct("Basic")
                .field("username", username)
                .finish_non_exhaustive(),
            other => f.write_str(other.scheme()),
        }
    }
}
