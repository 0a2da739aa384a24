//! HTTP Handlers

use crate::application::config::{APPLICATION_NAME, BillingConfig};
use crate::application::create_or_modify::{CreateOrModifyInput, CreateOrModifyUseCase};
use crate::application::delete_subscription::DeleteSubscriptionUseCase;
use crate::application::list_subscriptions::ListSubscriptionsUseCase;
use crate::application::view_subscription::ViewSubscriptionUseCase;
use crate::domain::payer::PayerProxy;
use crate::domain::repository::BillingRepository;
use crate::error::BillingResult;
use crate::presentation::context::RequestContext;
use crate::presentation::dto::{
    HelloResponse, SubscriptionRequest, SubscriptionResponse, ViewQuery,
};
use auth::AuthenticateUseCase;
use axum::Json;
use axum::body::Bytes;
use axum::extract::{Extension, Path, Query};
use axum::http::StatusCode;
use axum::response::IntoResponse;
use std::sync::Arc;
use tracing::Instrument;

/// Shared state for billing handlers
///
/// Process-wide handles; each request copies them into its context.
#[derive(Clone)]
pub struct BillingAppState<R>
where
    R: BillingRepository,
{
    pub repo: Arc<R>,
    pub payer: Arc<dyn PayerProxy>,
    pub config: Arc<BillingConfig>,
    pub authenticator: AuthenticateUseCase,
}

impl<R> BillingAppState<R>
where
    R: BillingRepository,
{
    pub fn new(repo: R, payer: Arc<dyn PayerProxy>, config: BillingConfig) -> Self {
        Self {
            repo: Arc::new(repo),
            payer,
            authenticator: AuthenticateUseCase::new(&config.auth),
            config: Arc::new(config),
        }
    }
}

/// GET /
pub async fn hello() -> Json<HelloResponse> {
    Json(HelloResponse {
        version: env!("CARGO_PKG_VERSION").to_string(),
        application: APPLICATION_NAME.to_string(),
    })
}

/// GET /subscriptions
pub async fn list_subscriptions<R>(
    Extension(ctx): Extension<RequestContext<R>>,
) -> BillingResult<Json<Vec<SubscriptionResponse>>>
where
    R: BillingRepository,
{
    let use_case = ListSubscriptionsUseCase::new(ctx.repo.clone());
    let subscriptions = use_case.execute(ctx.user_id()).await?;

    Ok(Json(
        subscriptions
            .into_iter()
            .map(SubscriptionResponse::from)
            .collect(),
    ))
}

/// GET /subscriptions/{type}
pub async fn view_subscription<R>(
    Extension(ctx): Extension<RequestContext<R>>,
    Path(kind): Path<String>,
    Query(query): Query<ViewQuery>,
) -> BillingResult<Json<SubscriptionResponse>>
where
    R: BillingRepository,
{
    let use_case = ViewSubscriptionUseCase::new(ctx.repo.clone());
    let subscription = use_case
        .execute(&ctx.identity, &kind, query.user_id.as_deref())
        .instrument(tracing::debug_span!(parent: &ctx.span, "subscription", "type" = %kind))
        .await?;

    Ok(Json(subscription.into()))
}

/// PUT /subscriptions/{type}
pub async fn create_or_modify_subscription<R>(
    Extension(ctx): Extension<RequestContext<R>>,
    Path(kind): Path<String>,
    body: Bytes,
) -> BillingResult<Json<SubscriptionResponse>>
where
    R: BillingRepository,
{
    let payload: SubscriptionRequest = serde_json::from_slice(&body)?;

    let span = tracing::info_span!(
        parent: &ctx.span,
        "subscription",
        "type" = %kind,
        plan = %payload.plan,
    );

    let use_case = CreateOrModifyUseCase::new(ctx.repo.clone(), ctx.payer.clone());
    let input = CreateOrModifyInput {
        kind,
        plan: payload.plan,
        payment_token: payload.stripe_key,
    };

    let subscription = use_case
        .execute(&ctx.identity, input)
        .instrument(span)
        .await?;

    Ok(Json(subscription.into()))
}

/// DELETE /subscriptions/{type}
pub async fn delete_subscription<R>(
    Extension(ctx): Extension<RequestContext<R>>,
    Path(kind): Path<String>,
) -> BillingResult<impl IntoResponse>
where
    R: BillingRepository,
{
    let span = tracing::info_span!(parent: &ctx.span, "subscription", "type" = %kind);

    let use_case = DeleteSubscriptionUseCase::new(ctx.repo.clone(), ctx.payer.clone());
    use_case
        .execute(ctx.user_id(), &kind)
        .instrument(span)
        .await?;

    Ok((StatusCode::ACCEPTED, Json(serde_json::json!({}))))
}
