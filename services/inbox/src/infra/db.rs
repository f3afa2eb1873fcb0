use anyhow::Context as _;
use chrono::{DateTime, Utc};
use sea_orm::{
    ActiveValue::{NotSet, Set},
    ColumnTrait, ConnectionTrait, DatabaseConnection, EntityTrait, FromQueryResult, IdenStatic,
    QueryFilter, QueryOrder, QuerySelect, Statement, TransactionTrait,
    sea_query::{Expr, OnConflict},
};
use uuid::Uuid;

use relay_domain::pagination::PageRequest;
use relay_inbox_schema::{accounts, conversations, messages, phonenumbers};

use crate::domain::repository::{
    AccountRepository, ConversationRepository, MessageRepository, PhoneNumberRepository,
};
use crate::domain::types::{
    Account, Conversation, ConversationKey, Message, MessageStatus, PhoneNumber, Recorded,
    UpsertedConversation,
};
use crate::error::InboxServiceError;

/// Unique key a conversation upsert conflicts on.
const CONVERSATION_ISOLATION_KEY: [conversations::Column; 4] = [
    conversations::Column::AccountId,
    conversations::Column::WorkspaceId,
    conversations::Column::PhoneNumberId,
    conversations::Column::CustomerNumber,
];

/// Unique key a redelivered message collides on.
const MESSAGE_DEDUP_KEY: [messages::Column; 2] =
    [messages::Column::ConversationId, messages::Column::ExternalId];

fn column_list<C: IdenStatic>(columns: &[C]) -> String {
    columns
        .iter()
        .map(|c| c.as_str())
        .collect::<Vec<_>>()
        .join(", ")
}

// ── Account repository ───────────────────────────────────────────────────────

#[derive(Clone)]
pub struct DbAccountRepository {
    pub db: DatabaseConnection,
}

impl AccountRepository for DbAccountRepository {
    async fn find_active_by_waba_id(
        &self,
        waba_id: &str,
    ) -> Result<Option<Account>, InboxServiceError> {
        let model = accounts::Entity::find()
            .filter(accounts::Column::WabaId.eq(waba_id))
            .filter(accounts::Column::IsActive.eq(true))
            .one(&self.db)
            .await
            .context("find account by waba id")?;
        Ok(model.map(|m| Account {
            id: m.id,
            name: m.name,
            waba_id: m.waba_id,
            business_id: m.business_id,
            default_workspace_id: m.default_workspace_id,
            is_active: m.is_active,
        }))
    }
}

// ── Phone number repository ──────────────────────────────────────────────────

#[derive(Clone)]
pub struct DbPhoneNumberRepository {
    pub db: DatabaseConnection,
}

impl PhoneNumberRepository for DbPhoneNumberRepository {
    async fn find_active(
        &self,
        account_id: Uuid,
        phone_number_id: &str,
    ) -> Result<Option<PhoneNumber>, InboxServiceError> {
        let model = phonenumbers::Entity::find()
            .filter(phonenumbers::Column::AccountId.eq(account_id))
            .filter(phonenumbers::Column::PhoneNumberId.eq(phone_number_id))
            .filter(phonenumbers::Column::IsActive.eq(true))
            .one(&self.db)
            .await
            .context("find active phone number")?;
        Ok(model.map(|m| PhoneNumber {
            id: m.id,
            phone_number_id: m.phone_number_id,
            waba_id: m.waba_id,
            account_id: m.account_id,
            workspace_id: m.workspace_id,
            display_phone_number: m.display_phone_number,
            is_active: m.is_active,
        }))
    }
}

// ── Conversation repository ──────────────────────────────────────────────────

const CONVERSATION_COLUMNS: &str = "id, account_id, workspace_id, phone_number_id, \
     customer_number, customer_name, status, last_message_at, unread_count, created_at, updated_at";

#[derive(Debug, FromQueryResult)]
struct ConversationRow {
    id: Uuid,
    account_id: Uuid,
    workspace_id: Uuid,
    phone_number_id: String,
    customer_number: String,
    customer_name: Option<String>,
    status: String,
    last_message_at: DateTime<Utc>,
    unread_count: i32,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
    /// Set by the upsert; other statements select `FALSE AS inserted`.
    inserted: bool,
}

impl ConversationRow {
    fn into_domain(self) -> Result<Conversation, InboxServiceError> {
        Ok(Conversation {
            id: self.id,
            account_id: self.account_id,
            workspace_id: self.workspace_id,
            phone_number_id: self.phone_number_id,
            customer_number: self.customer_number,
            customer_name: self.customer_name,
            status: self.status.parse().context("conversation status")?,
            last_message_at: self.last_message_at,
            unread_count: self.unread_count,
            created_at: self.created_at,
            updated_at: self.updated_at,
        })
    }
}

fn conversation_from_model(m: conversations::Model) -> Result<Conversation, InboxServiceError> {
    ConversationRow {
        id: m.id,
        account_id: m.account_id,
        workspace_id: m.workspace_id,
        phone_number_id: m.phone_number_id,
        customer_number: m.customer_number,
        customer_name: m.customer_name,
        status: m.status,
        last_message_at: m.last_message_at,
        unread_count: m.unread_count,
        created_at: m.created_at,
        updated_at: m.updated_at,
        inserted: false,
    }
    .into_domain()
}

#[derive(Clone)]
pub struct DbConversationRepository {
    pub db: DatabaseConnection,
}

impl ConversationRepository for DbConversationRepository {
    async fn upsert(
        &self,
        key: &ConversationKey,
        customer_name: Option<&str>,
        at: DateTime<Utc>,
    ) -> Result<UpsertedConversation, InboxServiceError> {
        // `xmax = 0` only holds for a row version created by this statement's INSERT.
        let conflict_target = column_list(&CONVERSATION_ISOLATION_KEY);
        let sql = format!(
            r#"
            INSERT INTO conversations (
                id, account_id, workspace_id, phone_number_id, customer_number,
                customer_name, status, last_message_at, unread_count, created_at, updated_at
            )
            VALUES ($1, $2, $3, $4, $5, $6, 'open', $7, 0, $8, $8)
            ON CONFLICT ({conflict_target})
            DO UPDATE SET
                status = 'open',
                last_message_at = GREATEST(conversations.last_message_at, EXCLUDED.last_message_at),
                customer_name = COALESCE(EXCLUDED.customer_name, conversations.customer_name),
                updated_at = EXCLUDED.updated_at
            RETURNING {CONVERSATION_COLUMNS}, (xmax = 0) AS inserted
            "#
        );

        let row = ConversationRow::find_by_statement(Statement::from_sql_and_values(
            self.db.get_database_backend(),
            &sql,
            [
                Uuid::now_v7().into(),
                key.account_id.into(),
                key.workspace_id.into(),
                key.phone_number_id.clone().into(),
                key.customer_number.clone().into(),
                customer_name.map(str::to_owned).into(),
                at.into(),
                Utc::now().into(),
            ],
        ))
        .one(&self.db)
        .await
        .context("upsert conversation")?
        .context("upsert conversation returned no row")?;

        let created = row.inserted;
        Ok(UpsertedConversation {
            conversation: row.into_domain()?,
            created,
        })
    }

    async fn find_by_id(&self, id: Uuid) -> Result<Option<Conversation>, InboxServiceError> {
        conversations::Entity::find_by_id(id)
            .one(&self.db)
            .await
            .context("find conversation by id")?
            .map(conversation_from_model)
            .transpose()
    }

    async fn list_by_account(
        &self,
        account_id: Uuid,
        page: PageRequest,
    ) -> Result<Vec<Conversation>, InboxServiceError> {
        conversations::Entity::find()
            .filter(conversations::Column::AccountId.eq(account_id))
            .order_by_desc(conversations::Column::LastMessageAt)
            .order_by_desc(conversations::Column::Id)
            .offset(page.offset())
            .limit(page.limit())
            .all(&self.db)
            .await
            .context("list conversations")?
            .into_iter()
            .map(conversation_from_model)
            .collect()
    }

    async fn mark_read(&self, id: Uuid) -> Result<Option<Conversation>, InboxServiceError> {
        conversations::Entity::update_many()
            .col_expr(conversations::Column::UnreadCount, Expr::value(0))
            .col_expr(conversations::Column::UpdatedAt, Expr::value(Utc::now()))
            .filter(conversations::Column::Id.eq(id))
            .exec(&self.db)
            .await
            .context("mark conversation read")?;
        self.find_by_id(id).await
    }
}

// ── Message repository ───────────────────────────────────────────────────────

fn message_from_model(m: messages::Model) -> Result<Message, InboxServiceError> {
    Ok(Message {
        id: m.id,
        seq: m.seq,
        conversation_id: m.conversation_id,
        account_id: m.account_id,
        workspace_id: m.workspace_id,
        phone_number_id: m.phone_number_id,
        direction: m.direction.parse().context("message direction")?,
        message_type: m.message_type,
        content: m.content,
        external_id: m.external_id,
        status: m.status.parse().context("message status")?,
        error: m.error,
        timestamp: m.timestamp,
        created_at: m.created_at,
        updated_at: m.updated_at,
    })
}

#[derive(Clone)]
pub struct DbMessageRepository {
    pub db: DatabaseConnection,
}

impl MessageRepository for DbMessageRepository {
    async fn insert_dedup(
        &self,
        message: &Message,
        unread_increment: i32,
    ) -> Result<Recorded, InboxServiceError> {
        let txn = self.db.begin().await.context("begin message insert")?;

        let am = messages::ActiveModel {
            id: Set(message.id),
            seq: NotSet,
            conversation_id: Set(message.conversation_id),
            account_id: Set(message.account_id),
            workspace_id: Set(message.workspace_id),
            phone_number_id: Set(message.phone_number_id.clone()),
            direction: Set(message.direction.as_str().to_owned()),
            message_type: Set(message.message_type.clone()),
            content: Set(message.content.clone()),
            external_id: Set(message.external_id.clone()),
            status: Set(message.status.as_str().to_owned()),
            error: Set(message.error.clone()),
            timestamp: Set(message.timestamp),
            created_at: Set(message.created_at),
            updated_at: Set(message.updated_at),
        };
        let inserted = messages::Entity::insert(am)
            .on_conflict(
                OnConflict::columns(MESSAGE_DEDUP_KEY)
                    .do_nothing()
                    .to_owned(),
            )
            .exec_without_returning(&txn)
            .await
            .context("insert message")?;

        if inserted == 0 {
            let existing = messages::Entity::find()
                .filter(messages::Column::ConversationId.eq(message.conversation_id))
                .filter(messages::Column::ExternalId.eq(message.external_id.as_str()))
                .one(&txn)
                .await
                .context("find duplicate message")?
                .context("conflicting message disappeared")?;
            txn.commit().await.context("commit duplicate lookup")?;
            return Ok(Recorded::Duplicate(message_from_model(existing)?));
        }

        let sql = format!(
            r#"
            UPDATE conversations SET
                unread_count = unread_count + $1,
                last_message_at = GREATEST(last_message_at, $2),
                updated_at = $3
            WHERE id = $4
            RETURNING {CONVERSATION_COLUMNS}, FALSE AS inserted
            "#
        );
        let conversation = ConversationRow::find_by_statement(Statement::from_sql_and_values(
            txn.get_database_backend(),
            &sql,
            [
                unread_increment.into(),
                message.timestamp.into(),
                Utc::now().into(),
                message.conversation_id.into(),
            ],
        ))
        .one(&txn)
        .await
        .context("bump conversation counters")?
        .context("conversation of new message not found")?;

        let stored = messages::Entity::find_by_id(message.id)
            .one(&txn)
            .await
            .context("reload inserted message")?
            .context("inserted message not found")?;

        txn.commit().await.context("commit message insert")?;

        Ok(Recorded::Created {
            message: message_from_model(stored)?,
            conversation: conversation.into_domain()?,
        })
    }

    async fn find_by_external_id(
        &self,
        account_id: Uuid,
        phone_number_id: &str,
        external_id: &str,
    ) -> Result<Option<Message>, InboxServiceError> {
        messages::Entity::find()
            .filter(messages::Column::AccountId.eq(account_id))
            .filter(messages::Column::PhoneNumberId.eq(phone_number_id))
            .filter(messages::Column::ExternalId.eq(external_id))
            .one(&self.db)
            .await
            .context("find message by external id")?
            .map(message_from_model)
            .transpose()
    }

    async fn advance_status(
        &self,
        id: Uuid,
        status: MessageStatus,
        error: Option<&str>,
    ) -> Result<Option<Message>, InboxServiceError> {
        let from: Vec<&str> = status.advances_from().iter().map(|s| s.as_str()).collect();
        let result = messages::Entity::update_many()
            .col_expr(messages::Column::Status, Expr::value(status.as_str()))
            .col_expr(messages::Column::Error, Expr::value(error.map(str::to_owned)))
            .col_expr(messages::Column::UpdatedAt, Expr::value(Utc::now()))
            .filter(messages::Column::Id.eq(id))
            .filter(messages::Column::Status.is_in(from))
            .exec(&self.db)
            .await
            .context("advance message status")?;
        if result.rows_affected == 0 {
            return Ok(None);
        }

        messages::Entity::find_by_id(id)
            .one(&self.db)
            .await
            .context("reload message after status update")?
            .map(message_from_model)
            .transpose()
    }

    async fn list_by_conversation(
        &self,
        conversation_id: Uuid,
        page: PageRequest,
    ) -> Result<Vec<Message>, InboxServiceError> {
        messages::Entity::find()
            .filter(messages::Column::ConversationId.eq(conversation_id))
            .order_by_asc(messages::Column::Timestamp)
            .order_by_asc(messages::Column::Seq)
            .offset(page.offset())
            .limit(page.limit())
            .all(&self.db)
            .await
            .context("list messages")?
            .into_iter()
            .map(message_from_model)
            .collect()
    }
}
