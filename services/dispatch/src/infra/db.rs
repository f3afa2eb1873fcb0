use anyhow::Context as _;
use chrono::Utc;
use sea_orm::{
    ActiveValue::Set, ColumnTrait, ConnectionTrait, DatabaseConnection, EntityTrait,
    FromQueryResult, QueryFilter, QueryOrder, QuerySelect, Statement, sea_query::Expr,
};
use uuid::Uuid;

use relay_dispatch_schema::{webhook_subscriptions, webhooklogs};
use relay_domain::id::SubscriptionId;
use relay_domain::pagination::PageRequest;

use crate::domain::repository::{SubscriptionRepository, WebhookLogRepository};
use crate::domain::types::{
    AttemptRecord, Delivery, DeliveryStatus, FailureKind, NewSubscription, RetryClaim,
    Subscription, WebhookLog,
};
use crate::error::DispatchServiceError;

// ── Subscription repository ──────────────────────────────────────────────────

fn subscription_from_model(
    m: webhook_subscriptions::Model,
) -> Result<Subscription, DispatchServiceError> {
    Ok(Subscription {
        id: m.id,
        account_id: m.account_id,
        url: m.url,
        events: serde_json::from_value(m.events).context("subscription events")?,
        is_active: m.is_active,
        created_at: m.created_at,
        updated_at: m.updated_at,
    })
}

#[derive(Clone)]
pub struct DbSubscriptionRepository {
    pub db: DatabaseConnection,
}

impl SubscriptionRepository for DbSubscriptionRepository {
    async fn create(&self, new: NewSubscription) -> Result<Subscription, DispatchServiceError> {
        let now = Utc::now();
        let am = webhook_subscriptions::ActiveModel {
            id: Set(Uuid::now_v7()),
            account_id: Set(new.account_id),
            url: Set(new.url),
            events: Set(serde_json::to_value(&new.events).context("encode events")?),
            is_active: Set(true),
            created_at: Set(now),
            updated_at: Set(now),
        };
        let model = webhook_subscriptions::Entity::insert(am)
            .exec_with_returning(&self.db)
            .await
            .context("insert subscription")?;
        subscription_from_model(model)
    }

    async fn list_active(
        &self,
        account_id: Uuid,
    ) -> Result<Vec<Subscription>, DispatchServiceError> {
        webhook_subscriptions::Entity::find()
            .filter(webhook_subscriptions::Column::AccountId.eq(account_id))
            .filter(webhook_subscriptions::Column::IsActive.eq(true))
            .order_by_desc(webhook_subscriptions::Column::CreatedAt)
            .all(&self.db)
            .await
            .context("list subscriptions")?
            .into_iter()
            .map(subscription_from_model)
            .collect()
    }

    async fn deactivate(
        &self,
        account_id: Uuid,
        id: SubscriptionId,
    ) -> Result<bool, DispatchServiceError> {
        let result = webhook_subscriptions::Entity::update_many()
            .col_expr(webhook_subscriptions::Column::IsActive, Expr::value(false))
            .col_expr(webhook_subscriptions::Column::UpdatedAt, Expr::value(Utc::now()))
            .filter(webhook_subscriptions::Column::Id.eq(id.0))
            .filter(webhook_subscriptions::Column::AccountId.eq(account_id))
            .filter(webhook_subscriptions::Column::IsActive.eq(true))
            .exec(&self.db)
            .await
            .context("deactivate subscription")?;
        Ok(result.rows_affected > 0)
    }
}

// ── Webhook log repository ───────────────────────────────────────────────────

fn log_from_model(m: webhooklogs::Model) -> Result<WebhookLog, DispatchServiceError> {
    Ok(WebhookLog {
        id: m.id,
        account_id: m.account_id,
        subscription_id: m.subscription_id,
        url: m.url,
        event_type: m.event_type.parse().context("log event type")?,
        payload: m.payload,
        status: m.status.parse().context("log status")?,
        failure_kind: m
            .failure_kind
            .map(|k| k.parse::<FailureKind>())
            .transpose()
            .context("log failure kind")?,
        attempts: u32::try_from(m.attempts).context("log attempts")?,
        last_status_code: m
            .last_status_code
            .map(u16::try_from)
            .transpose()
            .context("log status code")?,
        last_error: m.last_error,
        created_at: m.created_at,
        updated_at: m.updated_at,
        delivered_at: m.delivered_at,
    })
}

#[derive(Clone)]
pub struct DbWebhookLogRepository {
    pub db: DatabaseConnection,
}

impl WebhookLogRepository for DbWebhookLogRepository {
    async fn create(&self, delivery: &Delivery) -> Result<WebhookLog, DispatchServiceError> {
        let now = Utc::now();
        let am = webhooklogs::ActiveModel {
            id: Set(Uuid::now_v7()),
            account_id: Set(delivery.account_id),
            subscription_id: Set(delivery.subscription_id),
            url: Set(delivery.url.clone()),
            event_type: Set(delivery.event_type.as_str().to_owned()),
            payload: Set(delivery.payload.clone()),
            status: Set(DeliveryStatus::Pending.as_str().to_owned()),
            failure_kind: Set(None),
            attempts: Set(0),
            last_status_code: Set(None),
            last_error: Set(None),
            created_at: Set(now),
            updated_at: Set(now),
            delivered_at: Set(None),
        };
        let model = webhooklogs::Entity::insert(am)
            .exec_with_returning(&self.db)
            .await
            .context("insert webhook log")?;
        log_from_model(model)
    }

    async fn record_attempt(
        &self,
        id: Uuid,
        record: &AttemptRecord,
    ) -> Result<(), DispatchServiceError> {
        let delivered_at = (record.status == DeliveryStatus::Delivered).then_some(record.at);
        webhooklogs::Entity::update_many()
            .col_expr(webhooklogs::Column::Attempts, Expr::value(record.attempts as i32))
            .col_expr(webhooklogs::Column::Status, Expr::value(record.status.as_str()))
            .col_expr(
                webhooklogs::Column::FailureKind,
                Expr::value(record.failure_kind.map(|k| k.as_str().to_owned())),
            )
            .col_expr(
                webhooklogs::Column::LastStatusCode,
                Expr::value(record.status_code.map(i32::from)),
            )
            .col_expr(webhooklogs::Column::LastError, Expr::value(record.error.clone()))
            .col_expr(webhooklogs::Column::DeliveredAt, Expr::value(delivered_at))
            .col_expr(webhooklogs::Column::UpdatedAt, Expr::value(record.at))
            .filter(webhooklogs::Column::Id.eq(id))
            .exec(&self.db)
            .await
            .context("record webhook attempt")?;
        Ok(())
    }

    async fn claim_retryable(
        &self,
        claim: &RetryClaim,
    ) -> Result<Vec<WebhookLog>, DispatchServiceError> {
        // SKIP LOCKED keeps concurrent sweeps from claiming the same row.
        let sql = r#"
            UPDATE webhooklogs SET status = 'pending', updated_at = $1
            WHERE id IN (
                SELECT id FROM webhooklogs
                WHERE (status = 'failed' OR (status = 'pending' AND updated_at < $6))
                  AND created_at > $2
                  AND attempts < $3
                  AND ($4::uuid IS NULL OR account_id = $4)
                ORDER BY created_at
                LIMIT $5
                FOR UPDATE SKIP LOCKED
            )
            RETURNING *
        "#;
        webhooklogs::Model::find_by_statement(Statement::from_sql_and_values(
            self.db.get_database_backend(),
            sql,
            [
                Utc::now().into(),
                claim.created_after.into(),
                (claim.max_attempts as i32).into(),
                claim.account_id.into(),
                (claim.limit as i64).into(),
                claim.stalled_before.into(),
            ],
        ))
        .all(&self.db)
        .await
        .context("claim failed webhook logs")?
        .into_iter()
        .map(log_from_model)
        .collect()
    }

    async fn list_by_account(
        &self,
        account_id: Uuid,
        page: PageRequest,
    ) -> Result<Vec<WebhookLog>, DispatchServiceError> {
        webhooklogs::Entity::find()
            .filter(webhooklogs::Column::AccountId.eq(account_id))
            .order_by_desc(webhooklogs::Column::CreatedAt)
            .order_by_desc(webhooklogs::Column::Id)
            .offset(page.offset())
            .limit(page.limit())
            .all(&self.db)
            .await
            .context("list webhook logs")?
            .into_iter()
            .map(log_from_model)
            .collect()
    }
}
