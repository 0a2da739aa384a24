//! PostgreSQL Repository Implementations
//!
//! Table names carry the configured namespace as a prefix
//! (`<namespace>_subscriptions`, `<namespace>_users`) so several services can
//! share one database.

use crate::domain::entities::{Subscription, User};
use crate::domain::repository::{SubscriptionRepository, UserRepository};
use crate::error::{BillingError, BillingResult};
use chrono::{DateTime, Utc};
use kernel::id::SubscriptionId;
use sqlx::PgPool;
use uuid::Uuid;

const SUBSCRIPTION_COLUMNS: &str =
    "id, type, user_id, remote_id, plan, created_at, updated_at, deleted_at";

/// PostgreSQL-backed repository
#[derive(Clone)]
pub struct PgBillingRepository {
    pool: PgPool,
    subscriptions_table: String,
    users_table: String,
}

impl PgBillingRepository {
    /// `namespace` may be empty; otherwise it must be a plain SQL identifier
    pub fn new(pool: PgPool, namespace: &str) -> BillingResult<Self> {
        let valid = namespace
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '_');
        if !valid {
            return Err(BillingError::Store(format!(
                "invalid table namespace: {namespace:?}"
            )));
        }

        Ok(Self {
            pool,
            subscriptions_table: table_name(namespace, "subscriptions"),
            users_table: table_name(namespace, "users"),
        })
    }

    /// Round-trip to the database
    pub async fn ping(&self) -> BillingResult<()> {
        sqlx::query("SELECT 1").execute(&self.pool).await?;
        Ok(())
    }

    /// Create tables and the active-key index if missing
    pub async fn migrate(&self) -> BillingResult<()> {
        let statements = [
            format!(
                r#"
                CREATE TABLE IF NOT EXISTS {users} (
                    id TEXT PRIMARY KEY,
                    email TEXT NOT NULL DEFAULT '',
                    remote_id TEXT NOT NULL,
                    created_at TIMESTAMPTZ NOT NULL DEFAULT now(),
                    updated_at TIMESTAMPTZ NOT NULL DEFAULT now()
                )
                "#,
                users = self.users_table
            ),
            format!(
                r#"
                CREATE TABLE IF NOT EXISTS {subs} (
                    id UUID PRIMARY KEY,
                    type TEXT NOT NULL,
                    user_id TEXT NOT NULL,
                    remote_id TEXT NOT NULL,
                    plan TEXT NOT NULL,
                    created_at TIMESTAMPTZ NOT NULL DEFAULT now(),
                    updated_at TIMESTAMPTZ NOT NULL DEFAULT now(),
                    deleted_at TIMESTAMPTZ
                )
                "#,
                subs = self.subscriptions_table
            ),
            format!(
                r#"
                CREATE UNIQUE INDEX IF NOT EXISTS {subs}_active_user_type
                ON {subs} (user_id, type)
                WHERE deleted_at IS NULL
                "#,
                subs = self.subscriptions_table
            ),
        ];

        for statement in &statements {
            sqlx::query(statement).execute(&self.pool).await?;
        }

        tracing::info!(
            subscriptions = %self.subscriptions_table,
            users = %self.users_table,
            "Billing tables migrated"
        );
        Ok(())
    }
}

fn table_name(namespace: &str, name: &str) -> String {
    if namespace.is_empty() {
        name.to_string()
    } else {
        format!("{namespace}_{name}")
    }
}

impl SubscriptionRepository for PgBillingRepository {
    async fn find_by_user(&self, user_id: &str) -> BillingResult<Vec<Subscription>> {
        let rows = sqlx::query_as::<_, SubscriptionRow>(&format!(
            "SELECT {SUBSCRIPTION_COLUMNS} FROM {} \
             WHERE user_id = $1 AND deleted_at IS NULL ORDER BY created_at",
            self.subscriptions_table
        ))
        .bind(user_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(rows.into_iter().map(SubscriptionRow::into_subscription).collect())
    }

    async fn find_by_user_and_type(
        &self,
        user_id: &str,
        kind: &str,
    ) -> BillingResult<Option<Subscription>> {
        let row = sqlx::query_as::<_, SubscriptionRow>(&format!(
            "SELECT {SUBSCRIPTION_COLUMNS} FROM {} \
             WHERE user_id = $1 AND type = $2 AND deleted_at IS NULL",
            self.subscriptions_table
        ))
        .bind(user_id)
        .bind(kind)
        .fetch_optional(&self.pool)
        .await?;

        Ok(row.map(SubscriptionRow::into_subscription))
    }

    async fn find_unscoped(&self, id: SubscriptionId) -> BillingResult<Option<Subscription>> {
        let row = sqlx::query_as::<_, SubscriptionRow>(&format!(
            "SELECT {SUBSCRIPTION_COLUMNS} FROM {} WHERE id = $1",
            self.subscriptions_table
        ))
        .bind(id.into_uuid())
        .fetch_optional(&self.pool)
        .await?;

        Ok(row.map(SubscriptionRow::into_subscription))
    }

    async fn create_subscription(&self, subscription: &Subscription) -> BillingResult<()> {
        subscription.validate()?;

        sqlx::query(&format!(
            r#"
            INSERT INTO {} (id, type, user_id, remote_id, plan, created_at, updated_at)
            VALUES ($1, $2, $3, $4, $5, $6, $7)
            "#,
            self.subscriptions_table
        ))
        .bind(subscription.id.into_uuid())
        .bind(&subscription.kind)
        .bind(&subscription.user_id)
        .bind(&subscription.remote_id)
        .bind(&subscription.plan)
        .bind(subscription.created_at)
        .bind(subscription.updated_at)
        .execute(&self.pool)
        .await?;

        tracing::debug!(subscription_id = %subscription.id, "Subscription row inserted");
        Ok(())
    }

    async fn update_subscription(&self, subscription: &Subscription) -> BillingResult<()> {
        subscription.validate()?;

        let affected = sqlx::query(&format!(
            "UPDATE {} SET plan = $2, remote_id = $3, updated_at = $4 \
             WHERE id = $1 AND deleted_at IS NULL",
            self.subscriptions_table
        ))
        .bind(subscription.id.into_uuid())
        .bind(&subscription.plan)
        .bind(&subscription.remote_id)
        .bind(subscription.updated_at)
        .execute(&self.pool)
        .await?
        .rows_affected();

        if affected == 0 {
            return Err(BillingError::NotFound);
        }
        Ok(())
    }

    async fn soft_delete_subscription(&self, id: SubscriptionId) -> BillingResult<()> {
        sqlx::query(&format!(
            "UPDATE {} SET deleted_at = now() WHERE id = $1 AND deleted_at IS NULL",
            self.subscriptions_table
        ))
        .bind(id.into_uuid())
        .execute(&self.pool)
        .await?;

        tracing::debug!(subscription_id = %id, "Subscription row soft-deleted");
        Ok(())
    }
}

impl UserRepository for PgBillingRepository {
    async fn find_user(&self, id: &str) -> BillingResult<Option<User>> {
        let row = sqlx::query_as::<_, UserRow>(&format!(
            "SELECT id, email, remote_id, created_at, updated_at FROM {} WHERE id = $1",
            self.users_table
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(row.map(UserRow::into_user))
    }

    async fn create_user(&self, user: &User) -> BillingResult<()> {
        sqlx::query(&format!(
            r#"
            INSERT INTO {} (id, email, remote_id, created_at, updated_at)
            VALUES ($1, $2, $3, $4, $5)
            "#,
            self.users_table
        ))
        .bind(&user.id)
        .bind(&user.email)
        .bind(&user.remote_id)
        .bind(user.created_at)
        .bind(user.updated_at)
        .execute(&self.pool)
        .await?;

        Ok(())
    }
}

// Internal row types for sqlx mapping
#[derive(sqlx::FromRow)]
struct SubscriptionRow {
    id: Uuid,
    #[sqlx(rename = "type")]
    kind: String,
    user_id: String,
    remote_id: String,
    plan: String,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
    deleted_at: Option<DateTime<Utc>>,
}

impl SubscriptionRow {
    fn into_subscription(self) -> Subscription {
        Subscription {
            id: SubscriptionId::from_uuid(self.id),
            kind: self.kind,
            user_id: self.user_id,
            remote_id: self.remote_id,
            plan: self.plan,
            created_at: self.created_at,
            updated_at: self.updated_at,
            deleted_at: self.deleted_at,
        }
    }
}

#[derive(sqlx::FromRow)]
struct UserRow {
    id: String,
    email: String,
    remote_id: String,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl UserRow {
    fn into_user(self) -> User {
        User {
            id: self.id,
            email: self.email,
            remote_id: self.remote_id,
            created_at: self.created_at,
            updated_at: self.updated_at,
        }
    }
}
