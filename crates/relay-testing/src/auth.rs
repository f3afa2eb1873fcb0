//! Mock auth helpers for integration tests.
//!
//! Services behind the gateway receive `x-relay-user-id`, `x-relay-account-id` and
//! `x-relay-user-role` headers injected by the gateway. In tests, `MockAuth`
//! produces these headers directly so no real gateway is needed.

use axum::http::{HeaderMap, HeaderName, HeaderValue};
use uuid::Uuid;

use relay_auth_types::identity::{ACCOUNT_ID_HEADER, USER_ID_HEADER, USER_ROLE_HEADER};
use relay_domain::role::MemberRole;

/// Configurable identity injected into test requests.
pub struct MockAuth {
    pub user_id: Uuid,
    pub account_id: Uuid,
    pub role: MemberRole,
}

impl MockAuth {
    pub fn new(account_id: Uuid, role: MemberRole) -> Self {
        Self {
            user_id: Uuid::new_v4(),
            account_id,
            role,
        }
    }

    pub fn agent(account_id: Uuid) -> Self {
        Self::new(account_id, MemberRole::Agent)
    }

    pub fn admin(account_id: Uuid) -> Self {
        Self::new(account_id, MemberRole::Admin)
    }

    /// Header pairs as if the gateway injected them.
    pub fn header_pairs(&self) -> Vec<(HeaderName, HeaderValue)> {
        let value = |s: String| HeaderValue::from_str(&s).unwrap();
        vec![
            (
                HeaderName::from_static(USER_ID_HEADER),
                value(self.user_id.to_string()),
            ),
            (
                HeaderName::from_static(ACCOUNT_ID_HEADER),
                value(self.account_id.to_string()),
            ),
            (
                HeaderName::from_static(USER_ROLE_HEADER),
                value(self.role.as_u8().to_string()),
            ),
        ]
    }

    /// Return headers as if the gateway injected them.
    pub fn headers(&self) -> HeaderMap {
        self.header_pairs().into_iter().collect()
    }
}
