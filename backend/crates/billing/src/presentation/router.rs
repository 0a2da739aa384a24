//! Billing Router

use crate::application::config::BillingConfig;
use crate::domain::payer::PayerProxy;
use crate::domain::repository::BillingRepository;
use crate::presentation::handlers::{self, BillingAppState};
use crate::presentation::middleware::populate_context;
use axum::http::{Method, header};
use axum::{Router, middleware, routing::get};
use std::sync::Arc;
use tower_http::cors::{AllowOrigin, CorsLayer};

/// Create the billing router for any repository implementation
///
/// `/` is public; every `/subscriptions` route runs behind
/// [`populate_context`].
pub fn billing_router<R>(repo: R, payer: Arc<dyn PayerProxy>, config: BillingConfig) -> Router
where
    R: BillingRepository,
{
    let state = BillingAppState::new(repo, payer, config);

    let protected = Router::new()
        .route("/subscriptions", get(handlers::list_subscriptions::<R>))
        .route(
            "/subscriptions/{type}",
            get(handlers::view_subscription::<R>)
                .put(handlers::create_or_modify_subscription::<R>)
                .delete(handlers::delete_subscription::<R>),
        )
        .route_layer(middleware::from_fn_with_state(
            state.clone(),
            populate_context::<R>,
        ));

    Router::new()
        .route("/", get(handlers::hello))
        .merge(protected)
        .with_state(state)
}

/// CORS policy: credentialed requests from any origin
pub fn cors_layer() -> CorsLayer {
    CorsLayer::new()
        .allow_origin(AllowOrigin::mirror_request())
        .allow_methods([
            Method::GET,
            Method::POST,
            Method::PATCH,
            Method::PUT,
            Method::DELETE,
        ])
        .allow_headers([header::ACCEPT, header::AUTHORIZATION, header::CONTENT_TYPE])
        .allow_credentials(true)
}
