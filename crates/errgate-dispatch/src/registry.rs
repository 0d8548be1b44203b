use std::collections::{BTreeMap, HashMap, HashSet};
use std::sync::Arc;

use axum::Router;
use axum::routing::{MethodFilter, MethodRouter};
use errgate_core::Request;
use http::Method;
use thiserror::Error;
use tokio_util::sync::CancellationToken;

use crate::dispatch::Endpoint;

/// Errors raised while building a [`Registry`]
#[derive(Debug, Error)]
pub enum RegistryError {
    /// The same method and path were registered twice
    #[error("route registered twice: {method} {path}")]
    Duplicate { method: Method, path: String },

    /// Paths must be absolute and use `{name}` or a trailing `{*name}`
    /// for captures
    #[error("invalid route path: {path}")]
    InvalidPath { path: String },

    /// Two paths capture the same segment under different names
    #[error("route {path} conflicts with {existing}")]
    Conflict { path: String, existing: String },

    /// The router cannot match on this method
    #[error("unsupported route method: {method}")]
    UnsupportedMethod { method: Method },
}

struct Route {
    method: Method,
    filter: MethodFilter,
    path: String,
    endpoint: Arc<dyn Endpoint>,
}

/// Collects routes at startup
#[derive(Default)]
pub struct RegistryBuilder {
    pending: Vec<(Method, String, Arc<dyn Endpoint>)>,
}

impl RegistryBuilder {
    /// Register an endpoint for `method` on `path`
    ///
    /// Paths use the router's syntax, e.g. `/records/{id}`.
    #[must_use]
    pub fn route<T: Endpoint>(mut self, method: Method, path: impl Into<String>, endpoint: T) -> Self {
        let endpoint: Arc<dyn Endpoint> = Arc::new(endpoint);
        self.pending.push((method, path.into(), endpoint));
        self
    }

    /// Validate the collected routes and freeze them
    ///
    /// # Errors
    ///
    /// Returns an error on duplicate registrations, malformed paths,
    /// captures that conflict with an earlier route, or methods the router
    /// cannot match on
    pub fn build(self) -> Result<Registry, RegistryError> {
        let mut seen = HashSet::new();
        let mut captures = HashMap::new();
        let mut routes = Vec::with_capacity(self.pending.len());

        for (method, path, endpoint) in self.pending {
            let segments = parse_path(&path).ok_or_else(|| RegistryError::InvalidPath { path: path.clone() })?;
            check_captures(&path, &segments, &mut captures)?;

            if !seen.insert((method.clone(), path.clone())) {
                return Err(RegistryError::Duplicate { method, path });
            }

            let filter = MethodFilter::try_from(method.clone())
                .map_err(|_| RegistryError::UnsupportedMethod { method: method.clone() })?;

            routes.push(Route {
                method,
                filter,
                path,
                endpoint,
            });
        }

        tracing::debug!(routes = routes.len(), "route registry built");

        Ok(Registry { routes })
    }
}

enum Segment<'a> {
    Static(&'a str),
    Capture(&'a str),
    CatchAll(&'a str),
}

/// Split `path` into segments, or `None` if the router would refuse it
fn parse_path(path: &str) -> Option<Vec<Segment<'_>>> {
    let rest = path.strip_prefix('/')?;
    let raw: Vec<&str> = rest.split('/').collect();
    let last = raw.len() - 1;
    let mut names = HashSet::new();
    let mut segments = Vec::with_capacity(raw.len());

    for (i, segment) in raw.into_iter().enumerate() {
        let parsed = match segment.strip_prefix('{').and_then(|s| s.strip_suffix('}')) {
            Some(inner) => match inner.strip_prefix('*') {
                Some(name) if i == last => Segment::CatchAll(name),
                Some(_) => return None,
                None => Segment::Capture(inner),
            },
            None if segment.contains(['{', '}']) || segment.starts_with([':', '*']) => return None,
            None => Segment::Static(segment),
        };

        if let Segment::Capture(name) | Segment::CatchAll(name) = parsed
            && (!is_capture_name(name) || !names.insert(name))
        {
            return None;
        }

        segments.push(parsed);
    }

    Some(segments)
}

fn is_capture_name(name: &str) -> bool {
    !name.is_empty() && name.chars().all(|c| c.is_ascii_alphanumeric() || c == '_')
}

/// Every capture position must keep one spelling across all routes
///
/// `captures` maps the path up to a capture, with earlier names erased, to
/// the first spelling seen there and the route that introduced it.
fn check_captures(
    path: &str,
    segments: &[Segment<'_>],
    captures: &mut HashMap<String, (String, String)>,
) -> Result<(), RegistryError> {
    let mut prefix = String::new();

    for segment in segments {
        prefix.push('/');
        let spelling = match segment {
            Segment::Static(text) => {
                prefix.push_str(text);
                continue;
            }
            Segment::Capture(name) => format!("{{{name}}}"),
            Segment::CatchAll(name) => format!("{{*{name}}}"),
        };

        let (first, existing) = captures
            .entry(prefix.clone())
            .or_insert_with(|| (spelling.clone(), path.to_owned()));

        if *first != spelling {
            return Err(RegistryError::Conflict {
                path: path.to_owned(),
                existing: existing.clone(),
            });
        }

        prefix.push_str("{}");
    }

    Ok(())
}

/// Immutable table of routes owned by the server
///
/// Built once at startup through [`Registry::builder`]; nothing can be
/// added afterwards.
pub struct Registry {
    routes: Vec<Route>,
}

impl Registry {
    /// Start collecting routes
    pub fn builder() -> RegistryBuilder {
        RegistryBuilder::default()
    }

    /// Registered `(method, path)` pairs in registration order
    pub fn routes(&self) -> impl Iterator<Item = (&Method, &str)> {
        self.routes.iter().map(|route| (&route.method, route.path.as_str()))
    }

    /// Number of registered routes
    pub fn len(&self) -> usize {
        self.routes.len()
    }

    /// Whether no routes were registered
    pub fn is_empty(&self) -> bool {
        self.routes.is_empty()
    }

    /// Turn the registry into a router
    ///
    /// Each request gets a cancellation token derived from `shutdown`.
    /// Paths were checked by [`RegistryBuilder::build`], so the router
    /// accepts every one of them.
    pub fn into_router(self, shutdown: CancellationToken) -> Router {
        let mut by_path: BTreeMap<String, MethodRouter> = BTreeMap::new();

        for route in self.routes {
            let endpoint = route.endpoint;
            let shutdown = shutdown.clone();

            let handler = move |request: Request| {
                let endpoint = Arc::clone(&endpoint);
                let shutdown = shutdown.clone();
                async move { endpoint.serve(request, &shutdown).await }
            };

            let method_router = by_path.remove(&route.path).unwrap_or_else(MethodRouter::new);
            by_path.insert(route.path, method_router.on(route.filter, handler));
        }

        by_path
            .into_iter()
            .fold(Router::new(), |router, (path, method_router)| router.route(&path, method_router))
    }
}

#[cfg(test)]
mod tests {
    use axum::body::{Body, to_bytes};
    use errgate_core::{BoxError, ResponseWriter, StructuredError, handler_fn};
    use http::StatusCode;
    use tower::ServiceExt;

    use super::*;
    use crate::Dispatcher;

    fn ok_with(body: &'static str) -> Dispatcher<impl errgate_core::Handler<BoxError>, BoxError> {
        Dispatcher::bare(handler_fn(move |_ctx, _request| async move {
            let mut response = ResponseWriter::new();
            response.write(body);
            Ok::<_, BoxError>(response)
        }))
    }

    async fn call(router: Router, method: Method, uri: &str) -> (StatusCode, String) {
        let request = http::Request::builder()
            .method(method)
            .uri(uri)
            .body(Body::empty())
            .unwrap();

        let response = router.oneshot(request).await.unwrap();
        let status = response.status();
        let body = to_bytes(response.into_body(), usize::MAX).await.unwrap();

        (status, String::from_utf8(body.to_vec()).unwrap())
    }

    #[test]
    fn duplicate_routes_are_rejected() {
        let result = Registry::builder()
            .route(Method::GET, "/a", ok_with("one"))
            .route(Method::GET, "/a", ok_with("two"))
            .build();

        assert!(matches!(result, Err(RegistryError::Duplicate { .. })));
    }

    #[test]
    fn relative_paths_are_rejected() {
        let result = Registry::builder().route(Method::GET, "a", ok_with("one")).build();

        assert!(matches!(result, Err(RegistryError::InvalidPath { .. })));
    }

    #[test]
    fn malformed_captures_are_rejected() {
        for path in ["/a/{id", "/a/x{id}", "/a/{}", "/a/{*rest}/b", "/a/:id", "/a/{id}/{id}"] {
            let result = Registry::builder().route(Method::GET, path, ok_with("one")).build();
            assert!(matches!(result, Err(RegistryError::InvalidPath { .. })), "{path} was accepted");
        }
    }

    #[test]
    fn conflicting_capture_names_are_rejected() {
        let result = Registry::builder()
            .route(Method::GET, "/a/{id}", ok_with("one"))
            .route(Method::POST, "/a/{name}", ok_with("two"))
            .build();

        let Err(RegistryError::Conflict { path, existing }) = result else {
            panic!("expected a conflict");
        };
        assert_eq!(path, "/a/{name}");
        assert_eq!(existing, "/a/{id}");
    }

    #[test]
    fn captures_conflict_through_longer_paths() {
        let result = Registry::builder()
            .route(Method::GET, "/records/{id}", ok_with("one"))
            .route(Method::GET, "/records/{key}/raw", ok_with("two"))
            .build();

        assert!(matches!(result, Err(RegistryError::Conflict { .. })));
    }

    #[tokio::test]
    async fn shared_capture_names_build_a_router() {
        let router = Registry::builder()
            .route(Method::GET, "/records/{id}", ok_with("show"))
            .route(Method::GET, "/records/{id}/raw", ok_with("raw"))
            .route(Method::GET, "/records/latest", ok_with("latest"))
            .route(Method::GET, "/files/{*rest}", ok_with("file"))
            .build()
            .unwrap()
            .into_router(CancellationToken::new());

        assert_eq!(call(router.clone(), Method::GET, "/records/7/raw").await.1, "raw");
        assert_eq!(call(router.clone(), Method::GET, "/records/latest").await.1, "latest");
        assert_eq!(call(router, Method::GET, "/files/a/b").await.1, "file");
    }

    #[test]
    fn routes_are_listed_in_registration_order() {
        let registry = Registry::builder()
            .route(Method::GET, "/b", ok_with("b"))
            .route(Method::POST, "/a", ok_with("a"))
            .build()
            .unwrap();

        let routes: Vec<_> = registry.routes().map(|(m, p)| (m.clone(), p.to_owned())).collect();
        assert_eq!(routes, vec![(Method::GET, "/b".to_owned()), (Method::POST, "/a".to_owned())]);
        assert_eq!(registry.len(), 2);
    }

    #[tokio::test]
    async fn methods_on_the_same_path_share_a_route() {
        let router = Registry::builder()
            .route(Method::GET, "/items", ok_with("list"))
            .route(Method::POST, "/items", ok_with("create"))
            .build()
            .unwrap()
            .into_router(CancellationToken::new());

        assert_eq!(call(router.clone(), Method::GET, "/items").await, (StatusCode::OK, "list".to_owned()));
        assert_eq!(call(router, Method::POST, "/items").await, (StatusCode::OK, "create".to_owned()));
    }

    #[tokio::test]
    async fn unregistered_paths_fall_through() {
        let router = Registry::builder()
            .route(Method::GET, "/items", ok_with("list"))
            .build()
            .unwrap()
            .into_router(CancellationToken::new());

        let (status, _) = call(router, Method::GET, "/nothing").await;
        assert_eq!(status, StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn failures_are_translated_by_the_router() {
        let failing = Dispatcher::structured(handler_fn(|_ctx, _request| async {
            Err::<ResponseWriter, _>(StructuredError::not_found("not found", "Record not found"))
        }));

        let router = Registry::builder()
            .route(Method::GET, "/records/{id}", failing)
            .build()
            .unwrap()
            .into_router(CancellationToken::new());

        assert_eq!(
            call(router, Method::GET, "/records/7").await,
            (StatusCode::NOT_FOUND, "Record not found".to_owned())
        );
    }

    #[tokio::test]
    async fn handlers_see_the_shutdown_signal() {
        let shutdown = CancellationToken::new();
        let status = Dispatcher::bare(handler_fn(|ctx, _request| async move {
            let mut response = ResponseWriter::new();
            response.write(if ctx.is_cancelled() { "cancelled" } else { "running" });
            Ok::<_, BoxError>(response)
        }));

        let router = Registry::builder()
            .route(Method::GET, "/status", status)
            .build()
            .unwrap()
            .into_router(shutdown.clone());

        shutdown.cancel();
        let (_, body) = call(router, Method::GET, "/status").await;
        assert_eq!(body, "cancelled");
    }
}
