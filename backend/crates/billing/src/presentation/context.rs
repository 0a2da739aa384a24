//! Request Context
//!
//! Typed, request-scoped state assembled by the context middleware and read
//! by every protected handler.

use crate::application::config::BillingConfig;
use crate::domain::payer::PayerProxy;
use crate::domain::repository::BillingRepository;
use auth::Identity;
use std::sync::Arc;
use std::time::Instant;
use tracing::Span;
use uuid::Uuid;

#[derive(Clone)]
pub struct RequestContext<R>
where
    R: BillingRepository,
{
    pub request_id: Uuid,
    pub started_at: Instant,
    pub config: Arc<BillingConfig>,
    pub identity: Identity,
    /// Span carrying request id, method, path, admin flag and user id
    pub span: Span,
    pub repo: Arc<R>,
    pub payer: Arc<dyn PayerProxy>,
}

impl<R> RequestContext<R>
where
    R: BillingRepository,
{
    pub fn user_id(&self) -> &str {
        self.identity.user_id()
    }

    pub fn is_admin(&self) -> bool {
        self.identity.is_admin
    }
}
