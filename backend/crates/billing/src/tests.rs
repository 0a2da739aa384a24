//! Tests for the billing crate
//! HTTP behaviour is exercised in-process against the real router, the
//! in-memory store and a recording payment proxy.

#[cfg(test)]
pub(crate) mod support {
    use crate::domain::payer::{PayerError, PayerProxy};
    use async_trait::async_trait;
    use auth::{Claims, Identity};
    use jsonwebtoken::{EncodingKey, Header, encode};
    use std::sync::Mutex;

    pub const SECRET: &str = "secret";
    pub const ADMIN_GROUP: &str = "admin";

    pub fn claims(user_id: &str, groups: &[&str], exp_offset_secs: i64) -> Claims {
        Claims {
            id: user_id.to_string(),
            email: format!("{user_id}@dc.com"),
            groups: groups.iter().map(|g| g.to_string()).collect(),
            exp: chrono::Utc::now().timestamp() + exp_offset_secs,
        }
    }

    pub fn identity(user_id: &str, is_admin: bool) -> Identity {
        let groups: &[&str] = if is_admin { &[ADMIN_GROUP] } else { &[] };
        Identity::new(claims(user_id, groups, 3600), ADMIN_GROUP)
    }

    pub fn token(user_id: &str, groups: &[&str], exp_offset_secs: i64) -> String {
        encode(
            &Header::default(),
            &claims(user_id, groups, exp_offset_secs),
            &EncodingKey::from_secret(SECRET.as_bytes()),
        )
        .unwrap()
    }

    #[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
    pub struct PayerCalls {
        pub create_customer: usize,
        pub create: usize,
        pub update: usize,
        pub delete: usize,
    }

    #[derive(Default)]
    struct Recorded {
        calls: PayerCalls,
        created_for: Vec<String>,
        deleted: Vec<String>,
        last_remote_id: String,
        seq: usize,
    }

    /// Payment proxy that succeeds and remembers every call
    #[derive(Default)]
    pub struct RecordingPayer {
        recorded: Mutex<Recorded>,
        fixed_remote_id: Option<String>,
        yield_on_create: bool,
    }

    impl RecordingPayer {
        pub fn new() -> Self {
            Self::default()
        }

        /// Answer every create/update with `remote_id`
        pub fn returning_remote_id(mut self, remote_id: &str) -> Self {
            self.fixed_remote_id = Some(remote_id.to_string());
            self
        }

        /// Suspend inside `create` so concurrent requests interleave
        pub fn yielding(mut self) -> Self {
            self.yield_on_create = true;
            self
        }

        pub fn calls(&self) -> PayerCalls {
            self.recorded.lock().unwrap().calls
        }

        /// Customer ids passed to `create`
        pub fn created_for(&self) -> Vec<String> {
            self.recorded.lock().unwrap().created_for.clone()
        }

        /// Remote ids passed to `delete`
        pub fn deleted(&self) -> Vec<String> {
            self.recorded.lock().unwrap().deleted.clone()
        }

        pub fn last_remote_id(&self) -> String {
            self.recorded.lock().unwrap().last_remote_id.clone()
        }

        fn next_remote_id(&self, recorded: &mut Recorded) -> String {
            recorded.seq += 1;
            let id = self
                .fixed_remote_id
                .clone()
                .unwrap_or_else(|| format!("sub_{}", recorded.seq));
            recorded.last_remote_id = id.clone();
            id
        }
    }

    #[async_trait]
    impl PayerProxy for RecordingPayer {
        async fn create_customer(
            &self,
            user_id: &str,
            _email: &str,
            _payment_token: &str,
        ) -> Result<String, PayerError> {
            self.recorded.lock().unwrap().calls.create_customer += 1;
            Ok(format!("cus_{user_id}"))
        }

        async fn create(
            &self,
            customer_id: &str,
            _plan: &str,
            _payment_token: &str,
        ) -> Result<String, PayerError> {
            let id = {
                let mut recorded = self.recorded.lock().unwrap();
                recorded.calls.create += 1;
                recorded.created_for.push(customer_id.to_string());
                self.next_remote_id(&mut recorded)
            };
            if self.yield_on_create {
                tokio::task::yield_now().await;
            }
            Ok(id)
        }

        async fn update(
            &self,
            _remote_id: &str,
            _plan: &str,
            _payment_token: &str,
        ) -> Result<String, PayerError> {
            let mut recorded = self.recorded.lock().unwrap();
            recorded.calls.update += 1;
            Ok(self.next_remote_id(&mut recorded))
        }

        async fn delete(&self, remote_id: &str) -> Result<(), PayerError> {
            let mut recorded = self.recorded.lock().unwrap();
            recorded.calls.delete += 1;
            recorded.deleted.push(remote_id.to_string());
            Ok(())
        }
    }
}

#[cfg(test)]
mod http_tests {
    use super::support::*;
    use crate::application::config::BillingConfig;
    use crate::domain::entities::{Subscription, User};
    use crate::domain::payer::PayerProxy;
    use crate::domain::repository::{SubscriptionRepository, UserRepository};
    use crate::infra::memory::MemoryBillingRepository;
    use crate::infra::payer::ErrorProxy;
    use crate::presentation::dto::SubscriptionResponse;
    use crate::presentation::router::{billing_router, cors_layer};
    use axum::Router;
    use axum::body::Body;
    use axum::http::{Method, Request, StatusCode, header};
    use serde_json::{Value, json};
    use std::sync::Arc;
    use tower::ServiceExt;

    fn app(repo: &MemoryBillingRepository, payer: Arc<dyn PayerProxy>) -> Router {
        billing_router(repo.clone(), payer, BillingConfig::new(SECRET, ADMIN_GROUP))
            .layer(cors_layer())
    }

    fn request(method: Method, uri: &str, token: Option<&str>, body: Option<Value>) -> Request<Body> {
        let mut builder = Request::builder().method(method).uri(uri);
        if let Some(token) = token {
            builder = builder.header(header::AUTHORIZATION, format!("Bearer {token}"));
        }
        match body {
            Some(body) => builder
                .header(header::CONTENT_TYPE, "application/json")
                .body(Body::from(body.to_string()))
                .unwrap(),
            None => builder.body(Body::empty()).unwrap(),
        }
    }

    async fn send(app: Router, req: Request<Body>) -> (StatusCode, Value) {
        let response = app.oneshot(req).await.unwrap();
        let status = response.status();
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        let body = if bytes.is_empty() {
            Value::Null
        } else {
            serde_json::from_slice(&bytes).unwrap()
        };
        (status, body)
    }

    async fn seed(repo: &MemoryBillingRepository, user: &str, kind: &str, remote_id: &str) -> Subscription {
        let sub = Subscription::new(user, kind, "gold", remote_id).unwrap();
        repo.create_subscription(&sub).await.unwrap();
        sub
    }

    fn put_body(plan: &str, stripe_key: &str) -> Option<Value> {
        Some(json!({"plan": plan, "stripe_key": stripe_key}))
    }

    #[tokio::test]
    async fn test_hello_is_public() {
        let repo = MemoryBillingRepository::new();
        let (status, body) = send(
            app(&repo, Arc::new(ErrorProxy)),
            request(Method::GET, "/", None, None),
        )
        .await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["application"], "netlify-subscriptions");
        assert_eq!(body["version"], env!("CARGO_PKG_VERSION"));
    }

    #[tokio::test]
    async fn test_missing_token_is_bad_request() {
        let repo = MemoryBillingRepository::new();
        let (status, body) = send(
            app(&repo, Arc::new(ErrorProxy)),
            request(Method::GET, "/subscriptions", None, None),
        )
        .await;

        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body, json!({"code": 400, "msg": "Must provide a valid JWT Token"}));
    }

    #[tokio::test]
    async fn test_nonsense_token_is_unauthorized() {
        let repo = MemoryBillingRepository::new();
        let (status, body) = send(
            app(&repo, Arc::new(ErrorProxy)),
            request(Method::GET, "/subscriptions", Some("NONSENSE"), None),
        )
        .await;

        assert_eq!(status, StatusCode::UNAUTHORIZED);
        assert_eq!(body["code"], 401);
    }

    #[tokio::test]
    async fn test_malformed_header_is_bad_request() {
        let repo = MemoryBillingRepository::new();
        let req = Request::builder()
            .uri("/subscriptions")
            .header(header::AUTHORIZATION, "Token abc")
            .body(Body::empty())
            .unwrap();

        let (status, body) = send(app(&repo, Arc::new(ErrorProxy)), req).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["msg"], "Bad authentication header");
    }

    #[tokio::test]
    async fn test_expired_token_is_unauthorized() {
        let repo = MemoryBillingRepository::new();
        let expired = token("joker", &[], -10);

        let (status, body) = send(
            app(&repo, Arc::new(ErrorProxy)),
            request(Method::GET, "/subscriptions", Some(&expired), None),
        )
        .await;

        assert_eq!(status, StatusCode::UNAUTHORIZED);
        assert!(body["msg"].as_str().unwrap().starts_with("Token expired at"));
    }

    #[tokio::test]
    async fn test_create_for_new_user() {
        let repo = MemoryBillingRepository::new();
        let payer = Arc::new(RecordingPayer::new());

        let (status, body) = send(
            app(&repo, payer.clone()),
            request(
                Method::PUT,
                "/subscriptions/membership",
                Some(&token("joker", &[], 3600)),
                put_body("gold", "tok_visa"),
            ),
        )
        .await;

        assert_eq!(status, StatusCode::OK);
        let created: SubscriptionResponse = serde_json::from_value(body).unwrap();
        assert_eq!(created.kind, "membership");
        assert_eq!(created.user_id, "joker");
        assert_eq!(created.plan, "gold");
        assert_eq!(created.remote_id, payer.last_remote_id());

        assert_eq!(
            payer.calls(),
            PayerCalls {
                create_customer: 1,
                create: 1,
                update: 0,
                delete: 0
            }
        );

        let stored = repo.find_unscoped(created.id).await.unwrap().unwrap();
        assert_eq!(stored.remote_id, created.remote_id);
        assert!(repo.find_user("joker").await.unwrap().is_some());
    }

    #[tokio::test]
    async fn test_create_for_known_customer_skips_customer_creation() {
        let repo = MemoryBillingRepository::new();
        repo.create_user(&User::new("joker", "joker@dc.com", "cus_known"))
            .await
            .unwrap();
        let payer = Arc::new(RecordingPayer::new());

        let (status, _) = send(
            app(&repo, payer.clone()),
            request(
                Method::PUT,
                "/subscriptions/membership",
                Some(&token("joker", &[], 3600)),
                put_body("gold", "tok_visa"),
            ),
        )
        .await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(payer.calls().create_customer, 0);
        assert_eq!(payer.calls().create, 1);
        assert_eq!(payer.created_for(), vec!["cus_known".to_string()]);
    }

    #[tokio::test]
    async fn test_second_write_updates() {
        let repo = MemoryBillingRepository::new();
        let payer = Arc::new(RecordingPayer::new());
        let app = app(&repo, payer.clone());
        let jwt = token("joker", &[], 3600);

        let (_, first) = send(
            app.clone(),
            request(Method::PUT, "/subscriptions/membership", Some(&jwt), put_body("gold", "tok")),
        )
        .await;
        let (status, second) = send(
            app,
            request(
                Method::PUT,
                "/subscriptions/membership",
                Some(&jwt),
                put_body("platinum", "tok"),
            ),
        )
        .await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(first["id"], second["id"]);
        assert_eq!(payer.calls().create, 1);
        assert_eq!(payer.calls().update, 1);

        let stored = repo
            .find_by_user_and_type("joker", "membership")
            .await
            .unwrap()
            .unwrap();
        assert_eq!(stored.plan, "platinum");
        assert_eq!(stored.remote_id, payer.last_remote_id());
        assert_eq!(second["remote_id"], stored.remote_id.as_str());
    }

    #[tokio::test]
    async fn test_delete_missing_is_accepted_without_processor_call() {
        let repo = MemoryBillingRepository::new();
        let payer = Arc::new(RecordingPayer::new());

        let (status, body) = send(
            app(&repo, payer.clone()),
            request(
                Method::DELETE,
                "/subscriptions/membership",
                Some(&token("joker", &[], 3600)),
                None,
            ),
        )
        .await;

        assert_eq!(status, StatusCode::ACCEPTED);
        assert_eq!(body, json!({}));
        assert_eq!(payer.calls(), PayerCalls::default());
    }

    #[tokio::test]
    async fn test_delete_cancels_remotely_then_soft_deletes() {
        let repo = MemoryBillingRepository::new();
        let sub = seed(&repo, "joker", "membership", "sub_remote").await;
        let payer = Arc::new(RecordingPayer::new());
        let app = app(&repo, payer.clone());
        let jwt = token("joker", &[], 3600);

        let (status, body) = send(
            app.clone(),
            request(Method::DELETE, "/subscriptions/membership", Some(&jwt), None),
        )
        .await;

        assert_eq!(status, StatusCode::ACCEPTED);
        assert_eq!(body, json!({}));
        assert_eq!(payer.calls().delete, 1);
        assert_eq!(payer.deleted(), vec!["sub_remote".to_string()]);

        let row = repo.find_unscoped(sub.id).await.unwrap().unwrap();
        assert!(row.deleted_at.is_some());

        let (status, body) = send(
            app,
            request(Method::GET, "/subscriptions/membership", Some(&jwt), None),
        )
        .await;
        assert_eq!(status, StatusCode::NOT_FOUND);
        assert_eq!(body, json!({"code": 404, "msg": "No subscription found"}));
    }

    #[tokio::test]
    async fn test_list_returns_only_callers_rows() {
        let repo = MemoryBillingRepository::new();
        seed(&repo, "joker", "membership", "sub_a").await;
        seed(&repo, "joker", "support", "sub_b").await;
        seed(&repo, "batman", "membership", "sub_c").await;
        seed(&repo, "robin", "membership", "sub_d").await;

        let (status, body) = send(
            app(&repo, Arc::new(ErrorProxy)),
            request(Method::GET, "/subscriptions", Some(&token("joker", &[], 3600)), None),
        )
        .await;

        assert_eq!(status, StatusCode::OK);
        let subs: Vec<SubscriptionResponse> = serde_json::from_value(body).unwrap();
        assert_eq!(subs.len(), 2);
        assert!(subs.iter().all(|s| s.user_id == "joker"));
    }

    #[tokio::test]
    async fn test_empty_list_is_ok() {
        let repo = MemoryBillingRepository::new();
        seed(&repo, "batman", "membership", "sub_c").await;

        let (status, body) = send(
            app(&repo, Arc::new(ErrorProxy)),
            request(Method::GET, "/subscriptions", Some(&token("joker", &[], 3600)), None),
        )
        .await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(body, json!([]));
    }

    #[tokio::test]
    async fn test_missing_fields_are_named() {
        let repo = MemoryBillingRepository::new();
        let payer = Arc::new(RecordingPayer::new());
        let app = app(&repo, payer.clone());
        let jwt = token("joker", &[], 3600);

        let (status, body) = send(
            app.clone(),
            request(Method::PUT, "/subscriptions/membership", Some(&jwt), Some(json!({}))),
        )
        .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(
            body["msg"],
            "Failed to provide a valid request: Missing fields: stripe_key,plan"
        );

        let (status, body) = send(
            app,
            request(
                Method::PUT,
                "/subscriptions/membership",
                Some(&jwt),
                Some(json!({"stripe_key": "tok"})),
            ),
        )
        .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert!(body["msg"].as_str().unwrap().ends_with("Missing fields: plan"));

        assert_eq!(payer.calls(), PayerCalls::default());
    }

    #[tokio::test]
    async fn test_undecodable_payload_is_bad_request() {
        let repo = MemoryBillingRepository::new();
        let req = Request::builder()
            .method(Method::PUT)
            .uri("/subscriptions/membership")
            .header(header::AUTHORIZATION, format!("Bearer {}", token("joker", &[], 3600)))
            .body(Body::from("{not json"))
            .unwrap();

        let (status, body) = send(app(&repo, Arc::new(ErrorProxy)), req).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert!(
            body["msg"]
                .as_str()
                .unwrap()
                .starts_with("failed to decode payload")
        );
    }

    #[tokio::test]
    async fn test_fail_closed_proxy_fails_every_write() {
        let repo = MemoryBillingRepository::new();
        let app = app(&repo, Arc::new(ErrorProxy));
        let jwt = token("joker", &[], 3600);

        // create (no customer yet)
        let (status, body) = send(
            app.clone(),
            request(Method::PUT, "/subscriptions/membership", Some(&jwt), put_body("gold", "tok")),
        )
        .await;
        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
        assert!(body["msg"].as_str().unwrap().contains("no payer proxy provided"));
        assert!(repo.find_by_user("joker").await.unwrap().is_empty());

        // create (known customer)
        repo.create_user(&User::new("joker", "joker@dc.com", "cus_1"))
            .await
            .unwrap();
        let (status, body) = send(
            app.clone(),
            request(Method::PUT, "/subscriptions/membership", Some(&jwt), put_body("gold", "tok")),
        )
        .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(
            body["msg"],
            "Failed to create new subscription for plan gold: no payer proxy provided"
        );

        // update
        let sub = seed(&repo, "joker", "membership", "sub_1").await;
        let (status, body) = send(
            app.clone(),
            request(Method::PUT, "/subscriptions/membership", Some(&jwt), put_body("platinum", "tok")),
        )
        .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert!(body["msg"].as_str().unwrap().contains("no payer proxy provided"));

        // delete
        let (status, body) = send(
            app,
            request(Method::DELETE, "/subscriptions/membership", Some(&jwt), None),
        )
        .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert!(body["msg"].as_str().unwrap().contains("no payer proxy provided"));

        // nothing changed locally
        let row = repo.find_unscoped(sub.id).await.unwrap().unwrap();
        assert_eq!(row.plan, "gold");
        assert!(row.deleted_at.is_none());
    }

    #[tokio::test]
    async fn test_admin_may_view_other_users() {
        let repo = MemoryBillingRepository::new();
        seed(&repo, "batman", "membership", "sub_bat").await;
        let app = app(&repo, Arc::new(ErrorProxy));

        let (status, body) = send(
            app.clone(),
            request(
                Method::GET,
                "/subscriptions/membership?user_id=batman",
                Some(&token("joker", &[ADMIN_GROUP], 3600)),
                None,
            ),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["user_id"], "batman");
        assert_eq!(body["remote_id"], "sub_bat");

        let (status, body) = send(
            app,
            request(
                Method::GET,
                "/subscriptions/membership?user_id=batman",
                Some(&token("joker", &["villains"], 3600)),
                None,
            ),
        )
        .await;
        assert_eq!(status, StatusCode::UNAUTHORIZED);
        assert_eq!(body["code"], 401);
    }

    #[tokio::test]
    async fn test_view_own_subscription() {
        let repo = MemoryBillingRepository::new();
        let sub = seed(&repo, "joker", "membership", "sub_j").await;

        let (status, body) = send(
            app(&repo, Arc::new(ErrorProxy)),
            request(
                Method::GET,
                "/subscriptions/membership",
                Some(&token("joker", &[], 3600)),
                None,
            ),
        )
        .await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["id"], sub.id.to_string());
        assert_eq!(body["type"], "membership");
        assert!(body.get("deleted_at").is_none());
    }

    #[tokio::test]
    async fn test_cors_preflight_allows_credentials() {
        let repo = MemoryBillingRepository::new();
        let req = Request::builder()
            .method(Method::OPTIONS)
            .uri("/subscriptions")
            .header(header::ORIGIN, "https://app.example.com")
            .header(header::ACCESS_CONTROL_REQUEST_METHOD, "PUT")
            .header(header::ACCESS_CONTROL_REQUEST_HEADERS, "authorization")
            .body(Body::empty())
            .unwrap();

        let response = app(&repo, Arc::new(ErrorProxy)).oneshot(req).await.unwrap();
        let headers = response.headers();

        assert_eq!(
            headers[header::ACCESS_CONTROL_ALLOW_ORIGIN],
            "https://app.example.com"
        );
        assert_eq!(headers[header::ACCESS_CONTROL_ALLOW_CREDENTIALS], "true");
        let methods = headers[header::ACCESS_CONTROL_ALLOW_METHODS].to_str().unwrap();
        assert!(methods.contains("PUT") && methods.contains("DELETE"));
    }

    /// Two first writes for the same key both reach the processor; only the
    /// store's active-key uniqueness keeps a single local row. Known race.
    #[tokio::test]
    async fn test_concurrent_first_writes_race() {
        let repo = MemoryBillingRepository::new();
        repo.create_user(&User::new("joker", "joker@dc.com", "cus_1"))
            .await
            .unwrap();
        let payer = Arc::new(RecordingPayer::new().yielding());
        let app = app(&repo, payer.clone());
        let jwt = token("joker", &[], 3600);

        let (a, b) = tokio::join!(
            send(
                app.clone(),
                request(Method::PUT, "/subscriptions/membership", Some(&jwt), put_body("gold", "tok")),
            ),
            send(
                app,
                request(Method::PUT, "/subscriptions/membership", Some(&jwt), put_body("silver", "tok")),
            ),
        );

        let mut statuses = [a.0.as_u16(), b.0.as_u16()];
        statuses.sort();
        assert_eq!(statuses, [200, 500]);
        assert_eq!(payer.calls().create, 2);
        assert_eq!(payer.calls().update, 0);
        assert_eq!(repo.find_by_user("joker").await.unwrap().len(), 1);
    }
}

#[cfg(test)]
mod context_tests {
    use super::support::*;
    use crate::application::config::BillingConfig;
    use crate::infra::memory::MemoryBillingRepository;
    use crate::infra::payer::ErrorProxy;
    use crate::presentation::context::RequestContext;
    use crate::presentation::handlers::BillingAppState;
    use crate::presentation::middleware::populate_context;
    use crate::presentation::router::billing_router;
    use axum::body::Body;
    use axum::extract::Extension;
    use axum::http::{Method, Request, StatusCode, header};
    use axum::routing::get;
    use axum::{Json, Router, middleware};
    use serde_json::{Value, json};
    use std::io::Write;
    use std::sync::{Arc, Mutex};
    use tower::ServiceExt;

    async fn probe(Extension(ctx): Extension<RequestContext<MemoryBillingRepository>>) -> Json<Value> {
        Json(json!({
            "request_id": ctx.request_id.to_string(),
            "user_id": ctx.user_id(),
            "is_admin": ctx.is_admin(),
            "admin_group": ctx.config.auth.admin_group_name,
        }))
    }

    fn probe_app() -> Router {
        let state = BillingAppState::new(
            MemoryBillingRepository::new(),
            Arc::new(ErrorProxy),
            BillingConfig::new(SECRET, ADMIN_GROUP),
        );
        Router::new()
            .route("/probe", get(probe))
            .route_layer(middleware::from_fn_with_state(
                state.clone(),
                populate_context::<MemoryBillingRepository>,
            ))
            .with_state(state)
    }

    async fn call(app: Router, token: &str) -> Value {
        let req = Request::builder()
            .uri("/probe")
            .header(header::AUTHORIZATION, format!("Bearer {token}"))
            .body(Body::empty())
            .unwrap();
        let response = app.oneshot(req).await.unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        serde_json::from_slice(&bytes).unwrap()
    }

    #[tokio::test]
    async fn test_context_carries_identity_and_fresh_request_id() {
        let app = probe_app();
        let admin = call(app.clone(), &token("joker", &[ADMIN_GROUP], 3600)).await;
        let plain = call(app, &token("batman", &["heroes"], 3600)).await;

        assert_eq!(admin["user_id"], "joker");
        assert_eq!(admin["is_admin"], true);
        assert_eq!(admin["admin_group"], ADMIN_GROUP);
        assert_eq!(plain["user_id"], "batman");
        assert_eq!(plain["is_admin"], false);
        assert_ne!(admin["request_id"], plain["request_id"]);
    }

    /// Collects formatted log output in memory
    #[derive(Clone, Default)]
    struct LogBuffer(Arc<Mutex<Vec<u8>>>);

    impl Write for LogBuffer {
        fn write(&mut self, buf: &[u8]) -> std::io::Result<usize> {
            self.0.lock().unwrap().extend_from_slice(buf);
            Ok(buf.len())
        }

        fn flush(&mut self) -> std::io::Result<()> {
            Ok(())
        }
    }

    impl LogBuffer {
        fn lines(&self) -> Vec<String> {
            String::from_utf8(self.0.lock().unwrap().clone())
                .unwrap()
                .lines()
                .map(str::to_string)
                .collect()
        }
    }

    fn line_with<'a>(lines: &'a [String], message: &str) -> &'a str {
        lines
            .iter()
            .find(|line| line.contains(message))
            .unwrap_or_else(|| panic!("no log line with {message:?} in {lines:#?}"))
    }

    #[tokio::test]
    async fn test_request_logs_carry_context_fields() {
        let buffer = LogBuffer::default();
        let writer = buffer.clone();
        let subscriber = tracing_subscriber::fmt()
            .with_writer(move || writer.clone())
            .with_ansi(false)
            .with_max_level(tracing::Level::INFO)
            .finish();
        let _guard = tracing::subscriber::set_default(subscriber);

        let app = billing_router(
            MemoryBillingRepository::new(),
            Arc::new(RecordingPayer::new()),
            BillingConfig::new(SECRET, ADMIN_GROUP),
        );
        let req = Request::builder()
            .method(Method::PUT)
            .uri("/subscriptions/membership")
            .header(
                header::AUTHORIZATION,
                format!("Bearer {}", token("joker", &[], 3600)),
            )
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(r#"{"plan":"gold","stripe_key":"tok"}"#))
            .unwrap();
        let response = app.oneshot(req).await.unwrap();
        assert_eq!(response.status(), StatusCode::OK);

        let lines = buffer.lines();

        let started = line_with(&lines, "Started request");
        let request_id = started
            .split("request_id=")
            .nth(1)
            .and_then(|rest| rest.split_whitespace().next())
            .unwrap()
            .to_string();
        assert!(started.contains("method=PUT"));
        assert!(started.contains("path=/subscriptions/membership"));

        // Every line of the request correlates by id.
        for line in &lines {
            assert!(line.contains(&format!("request_id={request_id}")), "{line}");
        }

        let created = line_with(&lines, "Created subscription");
        for field in [
            "method=PUT",
            "path=/subscriptions/membership",
            "is_admin=false",
            r#"user_id="joker""#,
            "type=membership",
            "plan=gold",
        ] {
            assert!(created.contains(field), "{field} missing from {created}");
        }

        let completed = line_with(&lines, "Completed request");
        assert!(completed.contains("status=200"), "{completed}");
        assert!(completed.contains("duration_ns="), "{completed}");
        assert!(completed.contains(r#"user_id="joker""#), "{completed}");
    }
}
