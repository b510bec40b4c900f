//! Request-dispatch engine
//!
//! Matches an inbound request against a registered route table, runs the
//! global + route handler chain strictly sequentially until one produces
//! a response, and decorates handler responses with cross-origin policy
//! headers. The table and CORS policy are configured once at startup and
//! are read-only snapshots during dispatch.

pub mod cors;
pub mod error;
pub mod matcher;
pub mod request;

use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;

use http_body_util::Full;
use hyper::body::Bytes;
use hyper::{Method, Response, StatusCode};

pub use cors::CorsConfig;
pub use error::RouterError;
pub use request::RouterRequest;

use matcher::WILDCARD;

/// Boxed future produced by stored handlers.
pub type BoxFuture<T> = Pin<Box<dyn Future<Output = T> + Send>>;

/// What a handler produced for the current request.
pub enum Outcome {
    /// Terminal response; remaining handlers in the chain are skipped.
    Respond(Response<Full<Bytes>>),
    /// Nothing produced; the next handler runs.
    Next,
}

pub type HandlerResult = Result<Outcome, RouterError>;

/// Per-request envelope passed to every handler invocation.
pub struct Context<E> {
    /// Environment handle: collaborators and configuration.
    pub env: Arc<E>,
    pub req: Arc<RouterRequest>,
    /// Debug flag; handlers may emit diagnostics when set.
    pub dbg: bool,
}

impl<E> Clone for Context<E> {
    fn clone(&self) -> Self {
        Self {
            env: Arc::clone(&self.env),
            req: Arc::clone(&self.req),
            dbg: self.dbg,
        }
    }
}

/// A unit of computation in the pipeline: receives the execution context
/// and either produces a response or defers to the next handler.
pub type Handler<E> = Arc<dyn Fn(Context<E>) -> BoxFuture<HandlerResult> + Send + Sync>;

/// Box an async fn or closure into a storable [`Handler`].
pub fn handler<E, F, Fut>(f: F) -> Handler<E>
where
    F: Fn(Context<E>) -> Fut + Send + Sync + 'static,
    Fut: Future<Output = HandlerResult> + Send + 'static,
{
    Arc::new(move |ctx| Box::pin(f(ctx)))
}

/// A registered (method, pattern, handler-chain) triple. Created at
/// registration time and immutable thereafter.
pub struct Route<E> {
    pub method: String,
    pub pattern: String,
    pub(crate) handlers: Vec<Handler<E>>,
}

/// Ordered route table plus global handlers, CORS policy, and debug mode.
pub struct Router<E> {
    routes: Vec<Route<E>>,
    global_handlers: Vec<Handler<E>>,
    debug_mode: bool,
    cors: Option<CorsConfig>,
}

impl<E> Default for Router<E> {
    fn default() -> Self {
        Self::new()
    }
}

impl<E> Router<E> {
    pub fn new() -> Self {
        Self {
            routes: Vec::new(),
            global_handlers: Vec::new(),
            debug_mode: false,
            cors: None,
        }
    }

    /// Append a global handler, run before every route's own handlers.
    pub fn use_handler<F, Fut>(mut self, f: F) -> Self
    where
        F: Fn(Context<E>) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = HandlerResult> + Send + 'static,
    {
        self.global_handlers.push(handler(f));
        self
    }

    /// Append a route with an ordered handler chain. No pattern syntax is
    /// validated here: a malformed pattern simply never matches.
    pub fn register<I>(mut self, method: &str, pattern: &str, handlers: I) -> Self
    where
        I: IntoIterator<Item = Handler<E>>,
    {
        self.routes.push(Route {
            method: method.to_string(),
            pattern: pattern.to_string(),
            handlers: handlers.into_iter().collect(),
        });
        self
    }

    /// Append a single-handler route.
    pub fn register_one<F, Fut>(self, method: &str, pattern: &str, f: F) -> Self
    where
        F: Fn(Context<E>) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = HandlerResult> + Send + 'static,
    {
        self.register(method, pattern, [handler(f)])
    }

    pub fn connect<F, Fut>(self, pattern: &str, f: F) -> Self
    where
        F: Fn(Context<E>) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = HandlerResult> + Send + 'static,
    {
        self.register_one("CONNECT", pattern, f)
    }

    pub fn delete<F, Fut>(self, pattern: &str, f: F) -> Self
    where
        F: Fn(Context<E>) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = HandlerResult> + Send + 'static,
    {
        self.register_one("DELETE", pattern, f)
    }

    pub fn get<F, Fut>(self, pattern: &str, f: F) -> Self
    where
        F: Fn(Context<E>) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = HandlerResult> + Send + 'static,
    {
        self.register_one("GET", pattern, f)
    }

    pub fn head<F, Fut>(self, pattern: &str, f: F) -> Self
    where
        F: Fn(Context<E>) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = HandlerResult> + Send + 'static,
    {
        self.register_one("HEAD", pattern, f)
    }

    pub fn options<F, Fut>(self, pattern: &str, f: F) -> Self
    where
        F: Fn(Context<E>) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = HandlerResult> + Send + 'static,
    {
        self.register_one("OPTIONS", pattern, f)
    }

    pub fn patch<F, Fut>(self, pattern: &str, f: F) -> Self
    where
        F: Fn(Context<E>) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = HandlerResult> + Send + 'static,
    {
        self.register_one("PATCH", pattern, f)
    }

    pub fn post<F, Fut>(self, pattern: &str, f: F) -> Self
    where
        F: Fn(Context<E>) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = HandlerResult> + Send + 'static,
    {
        self.register_one("POST", pattern, f)
    }

    pub fn put<F, Fut>(self, pattern: &str, f: F) -> Self
    where
        F: Fn(Context<E>) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = HandlerResult> + Send + 'static,
    {
        self.register_one("PUT", pattern, f)
    }

    pub fn trace<F, Fut>(self, pattern: &str, f: F) -> Self
    where
        F: Fn(Context<E>) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = HandlerResult> + Send + 'static,
    {
        self.register_one("TRACE", pattern, f)
    }

    /// Register a route matching any method.
    pub fn any<F, Fut>(self, pattern: &str, f: F) -> Self
    where
        F: Fn(Context<E>) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = HandlerResult> + Send + 'static,
    {
        self.register_one(WILDCARD, pattern, f)
    }

    /// When set, not-found and empty-pipeline replies carry a short
    /// diagnostic body; the 404 status is unaffected.
    pub fn debug(mut self, state: bool) -> Self {
        self.debug_mode = state;
        self
    }

    /// Enable CORS. May be called at most conceptually once per router;
    /// a repeated call replaces the previous policy.
    pub fn cors(mut self, config: CorsConfig) -> Self {
        self.cors = Some(config);
        self
    }

    pub fn routes(&self) -> &[Route<E>] {
        &self.routes
    }
}

impl<E: Send + Sync + 'static> Router<E> {
    /// Dispatch one request to a response.
    ///
    /// Handler faults propagate unmodified as `Err`; the hosting runtime
    /// decides the externally visible failure behavior.
    pub async fn handle(
        &self,
        mut req: RouterRequest,
        env: Arc<E>,
    ) -> Result<Response<Full<Bytes>>, RouterError> {
        // Preflight bypasses matching and the pipeline entirely.
        if let Some(cors) = &self.cors {
            if req.method() == Method::OPTIONS {
                return Ok(cors.preflight_response());
            }
        }

        let method = req.method().as_str().to_string();
        let path = req.path().to_string();
        let Some((route, params)) = matcher::find_route(&self.routes, &method, &path) else {
            return Ok(not_found(self.debug_mode, "Route not found!"));
        };
        let query = matcher::parse_query(req.uri().query());
        req.set_route_data(params, query);

        // Global handlers first, then the route's own, strictly in order.
        let chain: Vec<Handler<E>> = self
            .global_handlers
            .iter()
            .chain(route.handlers.iter())
            .cloned()
            .collect();

        let req = Arc::new(req);
        let mut produced = None;
        for handler in chain {
            let ctx = Context {
                env: Arc::clone(&env),
                req: Arc::clone(&req),
                dbg: self.debug_mode,
            };
            match handler(ctx).await? {
                Outcome::Respond(response) => {
                    produced = Some(response);
                    break;
                }
                Outcome::Next => {}
            }
        }

        let Some(mut response) = produced else {
            return Ok(not_found(
                self.debug_mode,
                "Handler did not return a Response!",
            ));
        };

        if let Some(cors) = &self.cors {
            cors.apply(response.headers_mut());
        }
        Ok(response)
    }
}

fn not_found(debug: bool, diagnostic: &str) -> Response<Full<Bytes>> {
    let body = if debug {
        Bytes::from(diagnostic.to_string())
    } else {
        Bytes::new()
    };
    let mut response = Response::new(Full::new(body));
    *response.status_mut() = StatusCode::NOT_FOUND;
    response
}

#[cfg(test)]
mod tests {
    use super::*;
    use http_body_util::BodyExt;
    use std::sync::atomic::{AtomicUsize, Ordering};

    fn request(method: &str, uri: &str) -> RouterRequest {
        let req = hyper::Request::builder()
            .method(method)
            .uri(uri)
            .body(Bytes::new())
            .unwrap();
        RouterRequest::from_buffered(req, None)
    }

    fn text_response(body: &str) -> Response<Full<Bytes>> {
        Response::new(Full::new(Bytes::from(body.to_string())))
    }

    async fn body_string(response: Response<Full<Bytes>>) -> String {
        let bytes = response.into_body().collect().await.unwrap().to_bytes();
        String::from_utf8(bytes.to_vec()).unwrap()
    }

    #[tokio::test]
    async fn test_route_params_and_query() {
        let router: Router<()> = Router::new().get("/users/:id", |ctx| async move {
            let id = ctx.req.param("id").unwrap_or_default().to_string();
            let tab = ctx.req.query_value("tab").unwrap_or_default().to_string();
            Ok(Outcome::Respond(text_response(&format!("{id}/{tab}"))))
        });

        let response = router
            .handle(request("GET", "/users/42?tab=posts"), Arc::new(()))
            .await
            .unwrap();
        assert_eq!(body_string(response).await, "42/posts");
    }

    #[tokio::test]
    async fn test_pipeline_order_and_short_circuit() {
        static CALLS: AtomicUsize = AtomicUsize::new(0);

        let router: Router<()> = Router::new()
            .use_handler(|_ctx| async {
                assert_eq!(CALLS.fetch_add(1, Ordering::SeqCst), 0); // global runs first
                Ok(Outcome::Next)
            })
            .register(
                "GET",
                "/thing",
                [
                    handler(|_ctx| async {
                        assert_eq!(CALLS.fetch_add(1, Ordering::SeqCst), 1);
                        Ok(Outcome::Respond(text_response("h2")))
                    }),
                    handler(|_ctx| async { panic!("short-circuited handler must never run") }),
                ],
            );

        let response = router
            .handle(request("GET", "/thing"), Arc::new(()))
            .await
            .unwrap();
        assert_eq!(body_string(response).await, "h2");
        assert_eq!(CALLS.load(Ordering::SeqCst), 2);
    }

    #[tokio::test]
    async fn test_not_found_debug_bodies() {
        let router: Router<()> = Router::new();
        let response = router
            .handle(request("POST", "/missing"), Arc::new(()))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
        assert_eq!(body_string(response).await, "");

        let router: Router<()> = Router::new().debug(true);
        let response = router
            .handle(request("POST", "/missing"), Arc::new(()))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
        assert_eq!(body_string(response).await, "Route not found!");
    }

    #[tokio::test]
    async fn test_pipeline_exhausted_is_distinct_diagnostic() {
        let router: Router<()> = Router::new()
            .debug(true)
            .get("/quiet", |_ctx| async { Ok(Outcome::Next) });

        let response = router
            .handle(request("GET", "/quiet"), Arc::new(()))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
        assert_eq!(body_string(response).await, "Handler did not return a Response!");
    }

    #[tokio::test]
    async fn test_preflight_never_reaches_handlers() {
        let router: Router<()> = Router::new()
            .cors(CorsConfig {
                allow_origin: "https://example.com".to_string(),
                ..CorsConfig::default()
            })
            .any("/anything", |_ctx| async {
                panic!("preflight must bypass the pipeline")
            });

        let response = router
            .handle(request("OPTIONS", "/anything"), Arc::new(()))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::NO_CONTENT);
        assert_eq!(
            response.headers()["access-control-allow-origin"],
            "https://example.com"
        );
        assert_eq!(body_string(response).await, "");
    }

    #[tokio::test]
    async fn test_cors_merge_respects_handler_headers() {
        let router: Router<()> = Router::new()
            .cors(CorsConfig::default())
            .get("/custom", |_ctx| async {
                let mut response = text_response("ok");
                response.headers_mut().insert(
                    "access-control-allow-origin",
                    hyper::header::HeaderValue::from_static("https://handler.example"),
                );
                Ok(Outcome::Respond(response))
            });

        let response = router
            .handle(request("GET", "/custom"), Arc::new(()))
            .await
            .unwrap();
        assert_eq!(
            response.headers()["access-control-allow-origin"],
            "https://handler.example"
        );
        // Unset headers still get defaults.
        assert_eq!(response.headers()["access-control-allow-methods"], "*");
    }

    #[tokio::test]
    async fn test_handler_fault_propagates() {
        let router: Router<()> = Router::new().get("/fail", |ctx| async move {
            // Malformed JSON surfaces as a decode fault from the accessor.
            let _ = ctx.req.json().await?;
            Ok(Outcome::Next)
        });

        let req = hyper::Request::builder()
            .method("GET")
            .uri("/fail")
            .body(Bytes::from_static(b"not json"))
            .unwrap();
        let result = router
            .handle(RouterRequest::from_buffered(req, None), Arc::new(()))
            .await;
        assert!(matches!(result, Err(RouterError::Json(_))));
    }

    #[tokio::test]
    async fn test_wildcard_route_as_fallback() {
        let router: Router<()> = Router::new()
            .get("/known", |_ctx| async { Ok(Outcome::Respond(text_response("known"))) })
            .any("*", |_ctx| async { Ok(Outcome::Respond(text_response("fallback"))) });

        let response = router
            .handle(request("GET", "/known"), Arc::new(()))
            .await
            .unwrap();
        assert_eq!(body_string(response).await, "known");

        let response = router
            .handle(request("DELETE", "/definitely/not/registered"), Arc::new(()))
            .await
            .unwrap();
        assert_eq!(body_string(response).await, "fallback");
    }
}
