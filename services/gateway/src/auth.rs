use crate::error::AppError;
use axum::{async_trait, extract::FromRequestParts, http::request::Parts};
use types::ids::UserId;
use uuid::Uuid;

/// Identity of the caller, taken from the `X-User-Id` header.
///
/// The gateway sits behind an authenticating proxy that verifies
/// credentials and forwards the resolved user id, so the header is
/// trusted as-is here. Per-trade authorization (who may deposit,
/// release, refund) still happens in the escrow engine.
#[derive(Debug)]
pub struct AuthenticatedUser {
    pub user_id: UserId,
}

#[async_trait]
impl<S> FromRequestParts<S> for AuthenticatedUser
where
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        let header = parts
            .headers
            .get("X-User-Id")
            .ok_or_else(|| AppError::Unauthorized("Missing X-User-Id header".to_string()))?;

        let raw = header
            .to_str()
            .map_err(|_| AppError::Unauthorized("Invalid X-User-Id header".to_string()))?;

        let uuid = Uuid::parse_str(raw)
            .map_err(|_| AppError::Unauthorized("X-User-Id must be a UUID".to_string()))?;

        Ok(AuthenticatedUser {
            user_id: UserId::from_uuid(uuid),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::Request;

    fn parts_with_headers(headers: &[(&str, &str)]) -> Parts {
        let mut builder = Request::builder().uri("/v1/accounts");
        for (name, value) in headers {
            builder = builder.header(*name, *value);
        }
        builder.body(()).unwrap().into_parts().0
    }

    #[tokio::test]
    async fn test_valid_header_resolves_user() {
        let user_id = UserId::new();
        let mut parts = parts_with_headers(&[("X-User-Id", &user_id.to_string())]);
        let user = AuthenticatedUser::from_request_parts(&mut parts, &())
            .await
            .unwrap();
        assert_eq!(user.user_id, user_id);
    }

    #[tokio::test]
    async fn test_missing_header_is_unauthorized() {
        let mut parts = parts_with_headers(&[]);
        let err = AuthenticatedUser::from_request_parts(&mut parts, &())
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::Unauthorized(_)));
    }

    #[tokio::test]
    async fn test_malformed_uuid_is_unauthorized() {
        let mut parts = parts_with_headers(&[("X-User-Id", "not-a-uuid")]);
        let err = AuthenticatedUser::from_request_parts(&mut parts, &())
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::Unauthorized(_)));
    }
}
