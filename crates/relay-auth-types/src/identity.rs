//! Gateway-injected identity headers extractor.

use axum::extract::FromRequestParts;
use http::StatusCode;
use http::request::Parts;
use uuid::Uuid;

use relay_domain::id::AccountId;
use relay_domain::role::MemberRole;

pub const USER_ID_HEADER: &str = "x-relay-user-id";
pub const ACCOUNT_ID_HEADER: &str = "x-relay-account-id";
pub const USER_ROLE_HEADER: &str = "x-relay-user-role";

/// Member identity injected by the gateway via `x-relay-user-id`,
/// `x-relay-account-id` and `x-relay-user-role` headers.
///
/// Returns 401 if any header is absent or cannot be parsed.
/// Account scoping and role enforcement (403) are done by handlers after extraction.
#[derive(Debug, Clone)]
pub struct IdentityHeaders {
    pub user_id: Uuid,
    pub account_id: AccountId,
    pub role: MemberRole,
}

impl IdentityHeaders {
    pub fn is_admin(&self) -> bool {
        self.role >= MemberRole::Admin
    }
}

fn header_value<'a>(parts: &'a Parts, name: &str) -> Option<&'a str> {
    parts.headers.get(name).and_then(|v| v.to_str().ok())
}

impl<S> FromRequestParts<S> for IdentityHeaders
where
    S: Send + Sync,
{
    type Rejection = StatusCode;

    // axum-core 0.5 defines this as `fn -> impl Future + Send` (not `async fn`).
    // Extract values synchronously, return a 'static async move block.
    fn from_request_parts(
        parts: &mut Parts,
        _state: &S,
    ) -> impl std::future::Future<Output = Result<Self, Self::Rejection>> + Send {
        let user_id = header_value(parts, USER_ID_HEADER).and_then(|s| s.parse::<Uuid>().ok());
        let account_id =
            header_value(parts, ACCOUNT_ID_HEADER).and_then(|s| s.parse::<AccountId>().ok());
        let role = header_value(parts, USER_ROLE_HEADER)
            .and_then(|s| s.parse::<u8>().ok())
            .and_then(MemberRole::from_u8);

        async move {
            Ok(Self {
                user_id: user_id.ok_or(StatusCode::UNAUTHORIZED)?,
                account_id: account_id.ok_or(StatusCode::UNAUTHORIZED)?,
                role: role.ok_or(StatusCode::UNAUTHORIZED)?,
            })
        }
    }
}
