//! Request wrapper
//!
//! Adapts a raw inbound request into a stable access surface: method,
//! headers, URI, matched params/query, and lazily decoded body
//! representations. The underlying stream is consumable only once, so the
//! wrapper buffers it on first demand and derives every representation
//! from that copy; each decoded form is memoized and never re-read.

use std::collections::HashMap;
use std::net::SocketAddr;

use http_body_util::BodyExt;
use hyper::body::{Bytes, Incoming};
use hyper::header::HeaderMap;
use hyper::http::request::Parts;
use hyper::{Method, Request, Uri};
use tokio::sync::{Mutex, OnceCell};

use super::error::RouterError;
use super::matcher::{parse_pairs, PathParams, QueryParams};

/// Buffered body plus its declared content type.
#[derive(Debug, Clone)]
pub struct Blob {
    pub content: Bytes,
    pub content_type: String,
}

enum BodySource {
    Stream(Incoming),
    Buffered(Bytes),
    Taken,
}

/// Per-request wrapper owned by one dispatch call.
pub struct RouterRequest {
    parts: Parts,
    peer_addr: Option<SocketAddr>,
    params: PathParams,
    query: QueryParams,
    body: Mutex<BodySource>,
    raw_body: OnceCell<Bytes>,
    text_body: OnceCell<String>,
    json_body: OnceCell<serde_json::Value>,
    form_body: OnceCell<HashMap<String, String>>,
    blob_body: OnceCell<Blob>,
}

impl RouterRequest {
    /// Wrap a hyper request; the body stays unread until first demanded.
    pub fn from_hyper(request: Request<Incoming>, peer_addr: Option<SocketAddr>) -> Self {
        let (parts, body) = request.into_parts();
        Self::new(parts, BodySource::Stream(body), peer_addr)
    }

    /// Wrap a request whose body is already in memory.
    pub fn from_buffered(request: Request<Bytes>, peer_addr: Option<SocketAddr>) -> Self {
        let (parts, body) = request.into_parts();
        Self::new(parts, BodySource::Buffered(body), peer_addr)
    }

    fn new(parts: Parts, body: BodySource, peer_addr: Option<SocketAddr>) -> Self {
        Self {
            parts,
            peer_addr,
            params: PathParams::new(),
            query: QueryParams::new(),
            body: Mutex::new(body),
            raw_body: OnceCell::new(),
            text_body: OnceCell::new(),
            json_body: OnceCell::new(),
            form_body: OnceCell::new(),
            blob_body: OnceCell::new(),
        }
    }

    pub fn method(&self) -> &Method {
        &self.parts.method
    }

    pub fn uri(&self) -> &Uri {
        &self.parts.uri
    }

    pub fn path(&self) -> &str {
        self.parts.uri.path()
    }

    pub fn headers(&self) -> &HeaderMap {
        &self.parts.headers
    }

    /// Header value as a string, `None` when absent or non-ASCII.
    pub fn header(&self, name: &str) -> Option<&str> {
        self.parts.headers.get(name).and_then(|v| v.to_str().ok())
    }

    /// Raw message handle: the original request head, including any
    /// platform-supplied extensions.
    pub fn raw(&self) -> &Parts {
        &self.parts
    }

    pub fn peer_addr(&self) -> Option<SocketAddr> {
        self.peer_addr
    }

    pub fn params(&self) -> &PathParams {
        &self.params
    }

    pub fn param(&self, name: &str) -> Option<&str> {
        self.params.get(name).map(String::as_str)
    }

    pub fn query(&self) -> &QueryParams {
        &self.query
    }

    pub fn query_value(&self, name: &str) -> Option<&str> {
        self.query.get(name).map(String::as_str)
    }

    /// Filled in by the matcher before the pipeline runs.
    pub(crate) fn set_route_data(&mut self, params: PathParams, query: QueryParams) {
        self.params = params;
        self.query = query;
    }

    /// Binary body. Buffers the underlying stream on first call; the
    /// stream is read at most once across all accessors.
    pub async fn bytes(&self) -> Result<Bytes, RouterError> {
        self.raw_body
            .get_or_try_init(|| async {
                let mut source = self.body.lock().await;
                match std::mem::replace(&mut *source, BodySource::Taken) {
                    BodySource::Stream(body) => Ok(body.collect().await?.to_bytes()),
                    BodySource::Buffered(bytes) => Ok(bytes),
                    BodySource::Taken => Err(RouterError::BodyConsumed),
                }
            })
            .await
            .cloned()
    }

    /// Body decoded as text (invalid UTF-8 is replaced, as a lossy read).
    pub async fn text(&self) -> Result<String, RouterError> {
        self.text_body
            .get_or_try_init(|| async {
                let bytes = self.bytes().await?;
                Ok(String::from_utf8_lossy(&bytes).into_owned())
            })
            .await
            .cloned()
    }

    /// Body parsed as JSON. A failed parse is not memoized and surfaces
    /// as a fault from the requesting handler.
    pub async fn json(&self) -> Result<serde_json::Value, RouterError> {
        self.json_body
            .get_or_try_init(|| async {
                let bytes = self.bytes().await?;
                Ok(serde_json::from_slice(&bytes)?)
            })
            .await
            .cloned()
    }

    /// Body parsed as urlencoded form pairs.
    pub async fn form(&self) -> Result<HashMap<String, String>, RouterError> {
        self.form_body
            .get_or_try_init(|| async {
                let text = self.text().await?;
                Ok(parse_pairs(&text))
            })
            .await
            .cloned()
    }

    /// Body with its declared content type attached.
    pub async fn blob(&self) -> Result<Blob, RouterError> {
        self.blob_body
            .get_or_try_init(|| async {
                let content = self.bytes().await?;
                let content_type = self
                    .header("content-type")
                    .unwrap_or("application/octet-stream")
                    .to_string();
                Ok(Blob { content, content_type })
            })
            .await
            .cloned()
    }

    /// Token following a case-insensitive `Bearer` scheme in the
    /// Authorization header, trimmed. `None` when missing or mismatched.
    pub fn bearer(&self) -> Option<String> {
        let value = self.header("authorization")?;
        let (scheme, token) = value.split_once(' ')?;
        if scheme.eq_ignore_ascii_case("bearer") {
            Some(token.trim().to_string())
        } else {
            None
        }
    }
}
