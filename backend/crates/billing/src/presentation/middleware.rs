//! Request Context Middleware

use crate::presentation::context::RequestContext;
use crate::presentation::handlers::BillingAppState;
use crate::domain::repository::BillingRepository;
use axum::body::Body;
use axum::extract::State;
use axum::http::Request;
use axum::middleware::Next;
use axum::response::{IntoResponse, Response};
use std::time::Instant;
use tracing::Instrument;
use tracing::field::Empty;
use uuid::Uuid;

/// Authenticate the caller and attach a [`RequestContext`] to the request
///
/// Runs in front of every protected route. Authentication failures are
/// written as the response and the handler never runs.
pub async fn populate_context<R>(
    State(state): State<BillingAppState<R>>,
    mut req: Request<Body>,
    next: Next,
) -> Response
where
    R: BillingRepository,
{
    let request_id = Uuid::new_v4();
    let started_at = Instant::now();
    let span = tracing::info_span!(
        "request",
        %request_id,
        method = %req.method(),
        path = %req.uri().path(),
        is_admin = Empty,
        user_id = Empty,
    );

    let response = async move {
        tracing::info!("Started request");

        let identity = match state.authenticator.execute(req.headers()) {
            Ok(identity) => identity,
            Err(e) => return e.into_response(),
        };

        let span = tracing::Span::current();
        span.record("is_admin", identity.is_admin);
        span.record("user_id", identity.user_id());

        req.extensions_mut().insert(RequestContext {
            request_id,
            started_at,
            config: state.config.clone(),
            identity,
            span,
            repo: state.repo.clone(),
            payer: state.payer.clone(),
        });

        next.run(req).await
    }
    .instrument(span.clone())
    .await;

    span.in_scope(|| {
        tracing::info!(
            status = response.status().as_u16(),
            duration_ns = started_at.elapsed().as_nanos() as u64,
            "Completed request"
        );
    });

    response
}
