//! # Probe-to-HTTP adapter.
//!
//! ```text
//! GET /live ──► probe_route(live)
//!                  ├─ None        ──► 200 "OK"       (nothing invoked)
//!                  └─ Some(probe) ──► probe.run(root.child())
//!                                        ├─ Ok  ──► 200 "OK"
//!                                        └─ Err ──► 503 "<error text>" + ProbeFailed event
//! ```
//!
//! The probe scope is a child of the supervisor's root scope tied to the
//! request future: if the client goes away, the probe observes cancellation.

use std::sync::Arc;

use axum::{
    Router,
    http::StatusCode,
    routing::{MethodRouter, get},
};

use crate::{
    events::{Bus, Event, EventKind},
    ops::{OpRef, Scope},
};

/// Route of the liveness probe.
pub const LIVE_PATH: &str = "/live";
/// Route of the readiness probe.
pub const READY_PATH: &str = "/ready";

/// What a probe handler needs besides the probe itself.
#[derive(Clone, Debug, Default)]
pub struct ProbeContext {
    scope: Scope,
    bus: Option<Bus>,
}

impl ProbeContext {
    /// Probes run under children of `scope`.
    pub fn new(scope: Scope) -> Self {
        Self { scope, bus: None }
    }

    /// Publishes a `ProbeFailed` event on `bus` for every failed probe.
    pub fn with_bus(mut self, bus: Bus) -> Self {
        self.bus = Some(bus);
        self
    }
}

/// Wraps an optional probe operation as a `GET` handler.
pub fn probe_route(probe: Option<OpRef>, ctx: ProbeContext) -> MethodRouter {
    match probe {
        None => get(|| async { (StatusCode::OK, "OK") }),
        Some(probe) => get(move || {
            let probe = Arc::clone(&probe);
            let ctx = ctx.clone();
            async move { run_probe(probe, ctx).await }
        }),
    }
}

/// Router exposing `/live` and `/ready`.
pub fn health_router(live: Option<OpRef>, ready: Option<OpRef>, ctx: ProbeContext) -> Router {
    Router::new()
        .route(LIVE_PATH, probe_route(live, ctx.clone()))
        .route(READY_PATH, probe_route(ready, ctx))
}

async fn run_probe(probe: OpRef, ctx: ProbeContext) -> (StatusCode, String) {
    let scope = ctx.scope.child();
    let _cancel_on_drop = scope.drop_guard();

    match probe.run(scope).await {
        Ok(()) => (StatusCode::OK, "OK".to_string()),
        Err(err) => {
            let body = err.to_string();
            if let Some(bus) = &ctx.bus {
                bus.publish(
                    Event::new(EventKind::ProbeFailed)
                        .with_name(probe.name())
                        .with_reason(body.as_str()),
                );
            }
            (StatusCode::SERVICE_UNAVAILABLE, body)
        }
    }
}

#[cfg(test)]
mod tests {
    use std::sync::atomic::{AtomicUsize, Ordering};

    use axum::{
        body::{Body, to_bytes},
        http::{Method, Request},
    };
    use tower::ServiceExt;

    use super::*;
    use crate::{OpError, OpFn};

    async fn call(router: Router, method: Method, path: &str) -> (StatusCode, String) {
        let req = Request::builder()
            .method(method)
            .uri(path)
            .body(Body::empty())
            .unwrap();
        let resp = router.oneshot(req).await.unwrap();
        let status = resp.status();
        let body = to_bytes(resp.into_body(), usize::MAX).await.unwrap();
        (status, String::from_utf8(body.to_vec()).unwrap())
    }

    #[tokio::test]
    async fn absent_probes_answer_ok() {
        let router = health_router(None, None, ProbeContext::default());

        assert_eq!(
            call(router.clone(), Method::GET, "/live").await,
            (StatusCode::OK, "OK".to_string())
        );
        assert_eq!(
            call(router, Method::GET, "/ready").await,
            (StatusCode::OK, "OK".to_string())
        );
    }

    #[tokio::test]
    async fn successful_probe_answers_ok_and_runs_once() {
        let calls = Arc::new(AtomicUsize::new(0));
        let counter = Arc::clone(&calls);
        let live: OpRef = OpFn::arc("live", move |_s: Scope| {
            counter.fetch_add(1, Ordering::SeqCst);
            async { Ok::<_, OpError>(()) }
        });

        let router = health_router(Some(live), None, ProbeContext::default());

        assert_eq!(
            call(router, Method::GET, "/live").await,
            (StatusCode::OK, "OK".to_string())
        );
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn failing_probe_answers_503_with_error_text() {
        let bus = Bus::new(8);
        let mut rx = bus.subscribe();
        let ready: OpRef = OpFn::arc("db-ready", |_s: Scope| async {
            Err::<(), _>(OpError::fail("db unreachable"))
        });

        let router = health_router(None, Some(ready), ProbeContext::default().with_bus(bus));

        assert_eq!(
            call(router, Method::GET, "/ready").await,
            (StatusCode::SERVICE_UNAVAILABLE, "db unreachable".to_string())
        );

        let ev = rx.recv().await.unwrap();
        assert_eq!(ev.kind, EventKind::ProbeFailed);
        assert_eq!(ev.name.as_deref(), Some("db-ready"));
        assert_eq!(ev.reason.as_deref(), Some("db unreachable"));
    }

    #[tokio::test]
    async fn probe_sees_root_cancellation() {
        let root = Scope::new();
        let live: OpRef = OpFn::arc("live", |scope: Scope| async move { scope.check() });
        let router = health_router(Some(live), None, ProbeContext::new(root.clone()));

        root.cancel();

        assert_eq!(
            call(router, Method::GET, "/live").await,
            (StatusCode::SERVICE_UNAVAILABLE, "context canceled".to_string())
        );
    }

    #[tokio::test]
    async fn only_get_is_routed() {
        let router = health_router(None, None, ProbeContext::default());

        let (status, _) = call(router.clone(), Method::POST, "/live").await;
        assert_eq!(status, StatusCode::METHOD_NOT_ALLOWED);

        let (status, _) = call(router, Method::GET, "/metrics").await;
        assert_eq!(status, StatusCode::NOT_FOUND);
    }
}
