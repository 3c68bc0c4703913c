//! Minimal HTTP client with safe logging and flexible auth.
//!
//! - Request options: headers, `Auth`, query params, timeout
//! - Redacts sensitive query params and never logs secret values
//! - JSON helpers (`get_json`/`post_json`) plus `get_text` for HTML pages
//!
//! Example (no_run):
//! ```rust
//! # async fn demo() -> Result<(), prep_http::HttpError> {
//! let client = prep_http::HttpClient::new("https://api.example.com")?;
//! let got: serde_json::Value = client
//!     .get_json("v1/items", prep_http::RequestOpts::default())
//!     .await?;
//! # Ok(()) }
//! ```
//!
//! Every call is a single attempt: a transport failure or non-success status
//! is surfaced to the caller as one typed error, never retried here.
//!
//! Security: `Auth::Bearer` values are sanitized before use, and logs only
//! ever include the auth kind (bearer/header/query/none), not the secret.

use reqwest::header::{HeaderMap, HeaderName, HeaderValue};
use reqwest::{Client, Method, StatusCode, Url};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use std::borrow::Cow;
use std::time::Duration;
use thiserror::Error;
use uuid::Uuid;

// ==============================
// Errors
// ==============================

#[derive(Debug, Error)]
pub enum HttpError {
    #[error("invalid URL: {0}")]
    Url(String),
    #[error("request build failed: {0}")]
    Build(String),
    #[error("network error: {0}")]
    Network(String),
    #[error("decode error: {0}, body_snippet: {1}")]
    Decode(String, String),
    #[error("server returned error {status}: {message}, request_id={request_id}")]
    Api {
        status: StatusCode,
        message: String,
        request_id: String,
    },
}

// ==============================
// Auth & Request Options
// ==============================

/// Authentication strategies supported by the HTTP client helpers.
///
/// ```
/// use prep_http::Auth;
///
/// let bearer = Auth::Bearer("token");
/// match bearer {
///     Auth::Bearer(value) => assert_eq!(value, "token"),
///     _ => unreachable!(),
/// }
/// ```
#[derive(Clone, Debug)]
pub enum Auth<'a> {
    /// Authorization: Bearer <token>
    Bearer(&'a str),
    /// Custom header
    Header {
        name: HeaderName,
        value: HeaderValue,
    },
    /// Auth via query param (e.g. FMP: ?apikey=...)
    Query {
        name: &'a str,
        value: Cow<'a, str>,
    },
    None,
}

/// Per-request tuning knobs for the HTTP client.
///
/// ```
/// use prep_http::{Auth, RequestOpts};
/// use std::borrow::Cow;
/// use std::time::Duration;
///
/// let opts = RequestOpts {
///     timeout: Some(Duration::from_secs(10)),
///     auth: Some(Auth::Query {
///         name: "apikey",
///         value: Cow::Borrowed("demo"),
///     }),
///     ..Default::default()
/// };
///
/// assert_eq!(opts.timeout.unwrap().as_secs(), 10);
/// assert!(opts.allow_absolute == false);
/// ```
#[derive(Clone, Debug, Default)]
pub struct RequestOpts<'a> {
    pub timeout: Option<Duration>,
    pub auth: Option<Auth<'a>>,
    pub headers: Option<HeaderMap>,
    pub query: Option<Vec<(&'a str, Cow<'a, str>)>>, // e.g. [("q", "term".into())]
    /// If true and `path` is an absolute URL, use it as-is (ignore base).
    pub allow_absolute: bool,
}

// ==============================
// Client
// ==============================

#[derive(Clone)]
pub struct HttpClient {
    base: Url,
    inner: Client,
    pub default_timeout: Duration,
}

impl HttpClient {
    /// Construct a client anchored to a base URL.
    ///
    /// ```no_run
    /// use prep_http::{HttpClient, HttpError};
    /// use std::time::Duration;
    ///
    /// let client = HttpClient::new("https://api.example.com")?;
    /// assert_eq!(client.default_timeout, Duration::from_secs(15));
    /// # Ok::<(), HttpError>(())
    /// ```
    pub fn new(base: &str) -> Result<Self, HttpError> {
        let base = Url::parse(base).map_err(|e| HttpError::Url(e.to_string()))?;
        let inner = Client::builder()
            .connect_timeout(Duration::from_secs(5))
            .build()
            .map_err(|e| HttpError::Build(e.to_string()))?;
        Ok(Self {
            base,
            inner,
            default_timeout: Duration::from_secs(15),
        })
    }

    /// Override the default timeout returned by [`HttpClient::new`].
    ///
    /// ```no_run
    /// use prep_http::{HttpClient, HttpError};
    /// use std::time::Duration;
    ///
    /// let client = HttpClient::new("https://api.example.com")?
    ///     .with_timeout(Duration::from_secs(2));
    /// assert_eq!(client.default_timeout, Duration::from_secs(2));
    /// # Ok::<(), HttpError>(())
    /// ```
    pub fn with_timeout(mut self, dur: Duration) -> Self {
        self.default_timeout = dur;
        self
    }

    /// POST JSON using optional Bearer auth.
    pub async fn post_json<B, T>(
        &self,
        path: &str,
        bearer: Option<&str>,
        body: &B,
    ) -> Result<T, HttpError>
    where
        B: Serialize + ?Sized,
        T: DeserializeOwned,
    {
        let auth = bearer.map(Auth::Bearer);
        let opts = RequestOpts {
            auth,
            ..Default::default()
        };
        self.post_json_opts(path, body, opts).await
    }

    /// GET JSON with per-request options (headers/query/auth/timeout).
    pub async fn get_json<T>(&self, path: &str, opts: RequestOpts<'_>) -> Result<T, HttpError>
    where
        T: DeserializeOwned,
    {
        let (bytes, req_id) = self
            .request_internal::<()>(Method::GET, path, None, opts)
            .await?;
        decode_json(&bytes, &req_id)
    }

    /// POST JSON with per-request options (headers/query/auth/timeout).
    pub async fn post_json_opts<B, T>(
        &self,
        path: &str,
        body: &B,
        opts: RequestOpts<'_>,
    ) -> Result<T, HttpError>
    where
        B: Serialize + ?Sized,
        T: DeserializeOwned,
    {
        let (bytes, req_id) = self
            .request_internal(Method::POST, path, Some(body), opts)
            .await?;
        decode_json(&bytes, &req_id)
    }

    /// GET a non-JSON body (HTML pages and the like) as text.
    ///
    /// The status check is identical to the JSON helpers; only decoding
    /// differs, with invalid UTF-8 replaced rather than rejected.
    pub async fn get_text(&self, path: &str, opts: RequestOpts<'_>) -> Result<String, HttpError> {
        let (bytes, _req_id) = self
            .request_internal::<()>(Method::GET, path, None, opts)
            .await?;
        Ok(String::from_utf8_lossy(&bytes).into_owned())
    }

    // ==============================
    // Core request implementation
    // ==============================

    async fn request_internal<B>(
        &self,
        method: Method,
        path: &str,
        body: Option<&B>,
        mut opts: RequestOpts<'_>,
    ) -> Result<(Vec<u8>, String), HttpError>
    where
        B: Serialize + ?Sized,
    {
        // Resolve URL (allow absolute URL when requested).
        let url = if opts.allow_absolute {
            if let Ok(abs) = Url::parse(path) {
                abs
            } else {
                self.base
                    .join(path)
                    .map_err(|e| HttpError::Url(e.to_string()))?
            }
        } else {
            self.base
                .join(path)
                .map_err(|e| HttpError::Url(e.to_string()))?
        };

        // Query-param auth folds into the query list so it is applied exactly
        // once alongside the caller's params.
        if let Some(Auth::Query { name, value }) = &opts.auth {
            let mut q = opts.query.take().unwrap_or_default();
            q.push((*name, value.clone()));
            opts.query = Some(q);
        }

        // ----- Build request -----
        let mut rb = self.inner.request(method.clone(), url.clone());

        let timeout = opts.timeout.unwrap_or(self.default_timeout);
        rb = rb.timeout(timeout);

        if let Some(q) = &opts.query {
            let pairs: Vec<(&str, &str)> = q.iter().map(|(k, v)| (*k, v.as_ref())).collect();
            rb = rb.query(&pairs);
        }

        if let Some(b) = body {
            rb = rb.json(b);
        }

        if let Some(hdrs) = &opts.headers {
            rb = rb.headers(hdrs.clone());
        }

        if let Some(auth) = &opts.auth {
            match auth {
                Auth::Bearer(tok) => {
                    let tok = sanitize_api_key(tok)?;
                    rb = rb.bearer_auth(tok);
                }
                Auth::Header { name, value } => {
                    rb = rb.header(name, value);
                }
                // already folded into the query list above
                Auth::Query { .. } => {}
                Auth::None => {}
            }
        }

        // ----- Safe request logging (pre-send) -----
        let auth_kind = match &opts.auth {
            Some(Auth::Bearer(_)) => "bearer",
            Some(Auth::Header { .. }) => "header",
            Some(Auth::Query { .. }) => "query",
            Some(Auth::None) | None => "none",
        };

        let redacted_q: Vec<(String, String)> = opts
            .query
            .as_ref()
            .map(|q| {
                q.iter()
                    .map(|(k, v)| {
                        (
                            (*k).to_string(),
                            if is_secret_param(k) {
                                "<redacted>".to_string()
                            } else {
                                v.as_ref().to_string()
                            },
                        )
                    })
                    .collect()
            })
            .unwrap_or_default();

        let req_id = format!("r-{}", Uuid::new_v4().simple());

        tracing::debug!(
            req_id=%req_id,
            method=%method,
            host_path=%format!("{}{}", url.domain().unwrap_or("-"), url.path()),
            query=?redacted_q,
            timeout_ms=timeout.as_millis() as u64,
            auth_kind,
            has_body=%body.is_some(),
            "http.request.start"
        );

        // ----- Send (single attempt) -----
        let t0 = std::time::Instant::now();
        let resp = match rb.send().await {
            Ok(resp) => resp,
            Err(err) => {
                let message = err.to_string();
                tracing::warn!(req_id=%req_id, message=%message, "http.network_error.send");
                return Err(HttpError::Network(message));
            }
        };
        let status = resp.status();
        let headers = resp.headers().clone();
        let bytes = match resp.bytes().await {
            Ok(bytes) => bytes,
            Err(err) => {
                let message = err.to_string();
                tracing::warn!(req_id=%req_id, message=%message, "http.network_error.body");
                return Err(HttpError::Network(message));
            }
        };
        let dur_ms = t0.elapsed().as_millis() as u64;

        let req_hdr_id = headers
            .get("x-request-id")
            .or_else(|| headers.get("x-correlation-id"))
            .and_then(|v| v.to_str().ok())
            .unwrap_or("-");

        tracing::debug!(
            req_id=%req_id,
            %status,
            duration_ms=dur_ms,
            body_len=bytes.len(),
            x_request_id=%req_hdr_id,
            "http.response.headers"
        );

        let snippet = snip_body(&bytes);
        tracing::trace!(
            req_id=%req_id,
            body_snippet=%snippet,
            "http.response.body_snippet"
        );

        if status.is_success() {
            return Ok((bytes.to_vec(), req_id));
        }

        let message = extract_error_message(&bytes);
        let request_id = req_hdr_id.to_string();

        tracing::warn!(
            req_id=%req_id,
            %status,
            message=%message,
            x_request_id=%request_id,
            body_snippet=%snippet,
            "http.error"
        );
        Err(HttpError::Api {
            status,
            message,
            request_id,
        })
    }
}

// ==============================
// Helpers
// ==============================

fn decode_json<T: DeserializeOwned>(bytes: &[u8], req_id: &str) -> Result<T, HttpError> {
    let snippet = snip_body(bytes);
    serde_json::from_slice::<T>(bytes).map_err(|e| {
        tracing::warn!(
            req_id=%req_id,
            serde_line=%e.line(),
            serde_col=%e.column(),
            serde_err=%e.to_string(),
            body_snippet=%snippet,
            "http.response.decode_error"
        );
        HttpError::Decode(e.to_string(), snippet)
    })
}

fn is_secret_param(name: &str) -> bool {
    matches!(
        name.to_ascii_lowercase().as_str(),
        "access_token"
            | "authorization"
            | "auth"
            | "key"
            | "api_key"
            | "apikey"
            | "token"
            | "secret"
            | "client_secret"
            | "bearer"
    )
}

fn extract_error_message(body: &[u8]) -> String {
    // Cohere style: {"message":"..."}; OpenAI style: {"error":{"message":"..."}}
    #[derive(Deserialize)]
    struct NestedEnv {
        error: NestedDetail,
    }
    #[derive(Deserialize)]
    struct NestedDetail {
        message: String,
    }

    // Generic: {"message":"..."} or {"detail":"..."} or {"error":"..."}
    #[derive(Deserialize)]
    struct Msg {
        #[serde(default)]
        message: String,
        #[serde(default)]
        detail: String,
        #[serde(default)]
        error: String,
    }

    if let Ok(env) = serde_json::from_slice::<NestedEnv>(body) {
        return env.error.message;
    }
    if let Ok(m) = serde_json::from_slice::<Msg>(body) {
        if !m.message.is_empty() {
            return m.message;
        }
        if !m.detail.is_empty() {
            return m.detail;
        }
        if !m.error.is_empty() {
            return m.error;
        }
    }
    snip_body(body)
}

fn snip_body(body: &[u8]) -> String {
    let mut snip = String::from_utf8_lossy(body).to_string();
    if snip.len() > 500 {
        snip.truncate(500);
        snip.push_str("...");
    }
    snip
}

fn sanitize_api_key(raw: &str) -> Result<String, HttpError> {
    // 1) Trim outer spaces/quotes
    let mut s = raw
        .trim()
        .trim_matches(|c| c == '"' || c == '\'')
        .to_string();

    // 2) Remove *all* ASCII whitespace (spaces, tabs, newlines, carriage returns)
    s.retain(|ch| !ch.is_ascii_whitespace());

    // 3) Ensure ASCII and no control chars
    if !s.is_ascii() {
        return Err(HttpError::Build("API key contains non-ASCII bytes".into()));
    }
    if s.bytes().any(|b| b < 0x20 || b == 0x7F) {
        return Err(HttpError::Build(
            "API key contains control characters".into(),
        ));
    }

    // 4) Validate header value upfront for clear errors
    HeaderValue::from_str(&format!("Bearer {}", s))
        .map_err(|e| HttpError::Build(format!("invalid Authorization header: {e}")))?;
    Ok(s)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sanitize_strips_quotes_and_whitespace() {
        assert_eq!(sanitize_api_key("  \"abc123\"  ").unwrap(), "abc123");
        assert_eq!(sanitize_api_key("ab\nc1 23").unwrap(), "abc123");
    }

    #[test]
    fn sanitize_rejects_non_ascii() {
        assert!(sanitize_api_key("clé-secrète").is_err());
    }

    #[test]
    fn error_message_unwraps_known_envelopes() {
        assert_eq!(
            extract_error_message(br#"{"message":"invalid api token"}"#),
            "invalid api token"
        );
        assert_eq!(
            extract_error_message(br#"{"error":{"message":"bad model"}}"#),
            "bad model"
        );
        assert_eq!(extract_error_message(b"plain text"), "plain text");
    }

    #[test]
    fn secret_params_are_flagged() {
        assert!(is_secret_param("apikey"));
        assert!(is_secret_param("API_KEY"));
        assert!(!is_secret_param("query"));
    }

    #[test]
    fn long_bodies_are_snipped() {
        let body = vec![b'x'; 600];
        let snip = snip_body(&body);
        assert_eq!(snip.len(), 503);
        assert!(snip.ends_with("..."));
    }
}
