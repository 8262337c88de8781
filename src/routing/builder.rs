//! Route tree compilation.
//!
//! # Responsibilities
//! - Walk the declarative tree once and produce the installed route set
//! - Reject malformed trees (duplicate sibling patterns, empty segments)
//! - Compose each endpoint: filter gate → middleware stack → handler
//! - Install the compiled set into a concrete axum router
//!
//! # Design Decisions
//! - Compilation happens once at startup and is fatal on failure
//! - Compilation is pure: the same tree always yields the same mapping
//!   set, so rebuilding is idempotent
//! - The filter gate is the outermost wrapper; a failed conjunction
//!   answers 403 without invoking middleware or handler
//! - Endpoint middleware composes first-added-outermost
//! - Group middleware is intentionally not inherited (see tree module)

use std::collections::{HashMap, HashSet};

use axum::body::to_bytes;
use axum::extract::{Path, Request};
use axum::http::StatusCode;
use axum::routing::any;
use axum::Router;
use futures_util::FutureExt;
use thiserror::Error;

use crate::routing::context::{BoxHandler, RequestContext, Response};
use crate::routing::filter::conjunction;
use crate::routing::tree::{Endpoint, RouteNode};

/// Upper bound on buffered request bodies.
const MAX_BODY_BYTES: usize = 1024 * 1024;

/// Compilation failure. Startup-fatal, never recovered.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum BuildError {
    #[error("duplicate sibling pattern {pattern:?} under {at:?}")]
    DuplicatePattern { pattern: String, at: String },

    #[error("pattern {pattern:?} under {at:?} contains an empty segment")]
    EmptySegment { pattern: String, at: String },
}

/// One installed mapping: fully composed path → composed handler.
pub struct CompiledRoute {
    pub path: String,
    pub handler: BoxHandler,
}

impl std::fmt::Debug for CompiledRoute {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CompiledRoute")
            .field("path", &self.path)
            .finish_non_exhaustive()
    }
}

/// Compile `tree` mounted at `mount` into the full route set.
pub fn build(tree: &RouteNode, mount: &str) -> Result<Vec<CompiledRoute>, BuildError> {
    let mut routes = Vec::new();
    walk(tree, mount, &mut routes)?;
    Ok(routes)
}

fn walk(node: &RouteNode, prefix: &str, out: &mut Vec<CompiledRoute>) -> Result<(), BuildError> {
    match node {
        RouteNode::Endpoint(endpoint) => {
            out.push(CompiledRoute {
                path: prefix.to_string(),
                handler: compose(endpoint),
            });
        }
        RouteNode::Group(group) => {
            let mut seen = HashSet::new();
            for (pattern, child) in &group.children {
                if !pattern_is_wellformed(pattern) {
                    return Err(BuildError::EmptySegment {
                        pattern: pattern.clone(),
                        at: prefix.to_string(),
                    });
                }
                if !seen.insert(pattern.as_str()) {
                    return Err(BuildError::DuplicatePattern {
                        pattern: pattern.clone(),
                        at: prefix.to_string(),
                    });
                }
                walk(child, &format!("{prefix}{pattern}"), out)?;
            }
        }
    }
    Ok(())
}

/// A pattern is well-formed when every segment between separators is
/// non-empty. A single trailing slash marks a group prefix and is fine.
fn pattern_is_wellformed(pattern: &str) -> bool {
    !pattern.is_empty()
        && !pattern.starts_with('/')
        && !pattern.contains("//")
}

/// Compose the final installed handler for one endpoint.
fn compose(endpoint: &Endpoint) -> BoxHandler {
    let mut handler = endpoint.handler.clone();
    // First-added middleware must wrap all others, so apply in reverse.
    for middleware in endpoint.middleware.iter().rev() {
        handler = middleware(handler);
    }
    let filters = endpoint.filters.clone();
    std::sync::Arc::new(move |ctx: RequestContext| {
        if conjunction(&filters, &ctx) {
            handler(ctx)
        } else {
            async { Response::error(StatusCode::FORBIDDEN, "forbidden") }.boxed()
        }
    })
}

/// Install the compiled routes into a fresh axum router. Any HTTP method
/// dispatches; unmatched paths remain the router's concern.
pub fn into_router(routes: Vec<CompiledRoute>) -> Router {
    let mut router = Router::new();
    for route in routes {
        let path = if route.path.starts_with('/') {
            route.path.clone()
        } else {
            format!("/{}", route.path)
        };
        let handler = route.handler;
        router = router.route(
            &path,
            any(
                move |Path(params): Path<HashMap<String, String>>, request: Request| {
                    let handler = handler.clone();
                    async move { dispatch(handler, params, request).await }
                },
            ),
        );
    }
    router
}

async fn dispatch(
    handler: BoxHandler,
    params: HashMap<String, String>,
    request: Request,
) -> Response {
    let (parts, body) = request.into_parts();
    let body = match to_bytes(body, MAX_BODY_BYTES).await {
        Ok(bytes) => bytes,
        Err(_) => return Response::error(StatusCode::PAYLOAD_TOO_LARGE, "body too large"),
    };

    let mut headers = HashMap::new();
    for (name, value) in parts.headers.iter() {
        if let Ok(value) = value.to_str() {
            // First value wins for repeated headers.
            headers
                .entry(name.as_str().to_string())
                .or_insert_with(|| value.to_string());
        }
    }

    let ctx = RequestContext {
        params,
        method: parts.method.to_string(),
        path: parts.uri.path().to_string(),
        headers,
        body,
        metadata: HashMap::new(),
    };
    handler(ctx).await
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicU32, Ordering};
    use std::sync::{Arc, Mutex};

    use crate::routing::middleware;
    use crate::routing::tree::Group;

    fn ok_endpoint() -> Endpoint {
        Endpoint::new(|_ctx| async { Ok(Response::success()) })
    }

    fn counting_endpoint(counter: Arc<AtomicU32>) -> Endpoint {
        Endpoint::new(move |_ctx| {
            let counter = counter.clone();
            async move {
                counter.fetch_add(1, Ordering::SeqCst);
                Ok(Response::success())
            }
        })
    }

    #[test]
    fn nested_groups_compose_one_full_path() {
        let tree = Group::new()
            .child("a/", Group::new().child("b/", ok_endpoint()))
            .into();

        let routes = build(&tree, "").unwrap();
        assert_eq!(routes.len(), 1);
        assert_eq!(routes[0].path, "a/b/");
    }

    #[test]
    fn each_endpoint_installs_exactly_one_mapping() {
        let tree = Group::new()
            .child(
                "journey/",
                Group::new().child(
                    "{journeyid}/",
                    Group::new()
                        .child("get", ok_endpoint())
                        .child("complete", ok_endpoint()),
                ),
            )
            .into();

        let routes = build(&tree, "").unwrap();
        let mut paths: Vec<_> = routes.iter().map(|r| r.path.clone()).collect();
        paths.sort();
        assert_eq!(
            paths,
            vec!["journey/{journeyid}/complete", "journey/{journeyid}/get"]
        );
    }

    #[test]
    fn rebuilding_yields_the_same_mapping_set() {
        let tree = Group::new()
            .child("user/", Group::new().child("get", ok_endpoint()))
            .into();

        let first: Vec<_> = build(&tree, "").unwrap().iter().map(|r| r.path.clone()).collect();
        let second: Vec<_> = build(&tree, "").unwrap().iter().map(|r| r.path.clone()).collect();
        assert_eq!(first, second);
    }

    #[test]
    fn empty_group_contributes_no_paths() {
        let tree = Group::new().child("a/", Group::new()).into();
        assert!(build(&tree, "").unwrap().is_empty());
    }

    #[test]
    fn duplicate_sibling_pattern_is_rejected() {
        let tree = Group::new()
            .child("get", ok_endpoint())
            .child("get", ok_endpoint())
            .into();

        let err = build(&tree, "user/").unwrap_err();
        assert_eq!(
            err,
            BuildError::DuplicatePattern {
                pattern: "get".into(),
                at: "user/".into()
            }
        );
    }

    #[test]
    fn empty_segment_is_rejected() {
        for bad in ["", "a//b", "/a"] {
            let tree = Group::new().child(bad, ok_endpoint()).into();
            assert!(matches!(
                build(&tree, "").unwrap_err(),
                BuildError::EmptySegment { .. }
            ));
        }
    }

    #[tokio::test]
    async fn failing_filter_never_invokes_handler() {
        let counter = Arc::new(AtomicU32::new(0));
        let tree = Group::new()
            .child(
                "x",
                counting_endpoint(counter.clone()).guard(|_: &RequestContext| false),
            )
            .into();

        let routes = build(&tree, "").unwrap();
        for _ in 0..3 {
            let response = (routes[0].handler)(RequestContext::default()).await;
            assert_eq!(response.status, StatusCode::FORBIDDEN);
            assert_eq!(&response.body[..], br#"{"error":"forbidden"}"#);
        }
        assert_eq!(counter.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn conjunction_with_one_failure_is_forbidden() {
        let counter = Arc::new(AtomicU32::new(0));
        let tree = Group::new()
            .child(
                "x",
                counting_endpoint(counter.clone())
                    .guard(|_: &RequestContext| true)
                    .guard(|_: &RequestContext| false),
            )
            .into();

        let routes = build(&tree, "").unwrap();
        let response = (routes[0].handler)(RequestContext::default()).await;
        assert_eq!(response.status, StatusCode::FORBIDDEN);
        assert_eq!(counter.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn first_added_middleware_is_outermost() {
        let order = Arc::new(Mutex::new(Vec::new()));
        let record = |label: &'static str, order: Arc<Mutex<Vec<&'static str>>>| {
            middleware::from_fn(move |next| {
                let order = order.clone();
                let wrapped: BoxHandler = Arc::new(move |ctx| {
                    order.lock().unwrap().push(label);
                    next(ctx)
                });
                wrapped
            })
        };

        let tree = Group::new()
            .child(
                "x",
                ok_endpoint()
                    .wrap(record("outer", order.clone()))
                    .wrap(record("inner", order.clone())),
            )
            .into();

        let routes = build(&tree, "").unwrap();
        let _ = (routes[0].handler)(RequestContext::default()).await;
        assert_eq!(*order.lock().unwrap(), vec!["outer", "inner"]);
    }

    #[tokio::test]
    async fn group_middleware_is_not_inherited() {
        let touched = Arc::new(AtomicU32::new(0));
        let counter = touched.clone();
        let group_mw = middleware::from_fn(move |next| {
            let counter = counter.clone();
            let wrapped: BoxHandler = Arc::new(move |ctx| {
                counter.fetch_add(1, Ordering::SeqCst);
                next(ctx)
            });
            wrapped
        });

        let tree = Group::new()
            .wrap(group_mw)
            .child("x", ok_endpoint())
            .into();

        let routes = build(&tree, "").unwrap();
        let response = (routes[0].handler)(RequestContext::default()).await;
        assert_eq!(response.status, StatusCode::OK);
        assert_eq!(touched.load(Ordering::SeqCst), 0);
    }
}
