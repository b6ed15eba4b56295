use axum::{
    extract::{FromRef, FromRequestParts},
    http::{header, request::Parts},
};
use jsonwebtoken::{decode, DecodingKey, Validation};
use serde::{Deserialize, Serialize};
use std::sync::Arc;

use crate::{config::AdminConfig, error::AppError, AppState};

const ADMIN_ROLE: &str = "admin";

#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct Claims {
    pub sub: String,  // Admin username
    pub role: String, // Always "admin" for now
    pub exp: usize,   // Expiration time
}

#[derive(Debug, Clone)]
pub struct AdminUser {
    pub username: String,
}

/// Extractor for requests carrying an admin JWT
impl<S> FromRequestParts<S> for AdminUser
where
    S: Send + Sync,
    Arc<AppState>: FromRef<S>,
{
    type Rejection = AppError;

    fn from_request_parts(
        parts: &mut Parts,
        state: &S,
    ) -> impl std::future::Future<Output = Result<Self, Self::Rejection>> + Send {
        let app_state = Arc::<AppState>::from_ref(state);

        // Authorization header first, then the query string (browsers can't set headers on WebSocket upgrades)
        let token = parts
            .headers
            .get(header::AUTHORIZATION)
            .and_then(|h| h.to_str().ok())
            .and_then(|s| s.strip_prefix("Bearer "))
            .map(String::from)
            .or_else(|| parts.uri.query().and_then(token_from_query));

        async move {
            let token = token.ok_or(AppError::Unauthorized)?;
            decode_token(&token, &app_state.config.security.jwt_secret)
                .ok_or(AppError::Unauthorized)
        }
    }
}

/// Pull a `token` parameter out of a raw query string
pub fn token_from_query(query: &str) -> Option<String> {
    serde_urlencoded::from_str::<Vec<(String, String)>>(query)
        .ok()?
        .into_iter()
        .find(|(k, _)| k == "token")
        .map(|(_, v)| v)
}

/// Validate a token and return the admin it was issued to
pub fn decode_token(token: &str, jwt_secret: &str) -> Option<AdminUser> {
    let token_data = decode::<Claims>(
        token,
        &DecodingKey::from_secret(jwt_secret.as_ref()),
        &Validation::default(),
    )
    .ok()?;

    if token_data.claims.role != ADMIN_ROLE {
        return None;
    }

    Some(AdminUser {
        username: token_data.claims.sub,
    })
}

/// Generate a JWT for a logged-in admin
pub fn generate_token(
    username: &str,
    jwt_secret: &str,
    ttl_hours: i64,
) -> anyhow::Result<String> {
    let expiration = chrono::Duration::try_hours(ttl_hours)
        .and_then(|ttl| chrono::Utc::now().checked_add_signed(ttl))
        .ok_or_else(|| anyhow::anyhow!("Token lifetime of {} hours is out of range", ttl_hours))?
        .timestamp();

    let claims = Claims {
        sub: username.to_string(),
        role: ADMIN_ROLE.to_string(),
        exp: expiration.max(0) as usize,
    };

    let token = jsonwebtoken::encode(
        &jsonwebtoken::Header::default(),
        &claims,
        &jsonwebtoken::EncodingKey::from_secret(jwt_secret.as_ref()),
    )?;
    Ok(token)
}

/// Check a username/passcode pair against the configured admin account
pub fn verify_credentials(admin: &AdminConfig, username: &str, passcode: &str) -> bool {
    username == admin.username && passcode == admin.passcode
}

#[cfg(test)]
mod tests {
    use super::*;

    fn admin_config() -> AdminConfig {
        AdminConfig {
            username: "host".to_string(),
            passcode: "s3cret".to_string(),
        }
    }

    #[test]
    fn test_verify_credentials() {
        let admin = admin_config();
        assert!(verify_credentials(&admin, "host", "s3cret"));
        assert!(!verify_credentials(&admin, "host", "wrong"));
        assert!(!verify_credentials(&admin, "guest", "s3cret"));
    }

    #[test]
    fn test_token_round_trip() {
        let token = generate_token("host", "secret", 1).unwrap();
        let admin = decode_token(&token, "secret").expect("token should decode");
        assert_eq!(admin.username, "host");
    }

    #[test]
    fn test_token_rejected_with_wrong_secret() {
        let token = generate_token("host", "secret", 1).unwrap();
        assert!(decode_token(&token, "other-secret").is_none());
    }

    #[test]
    fn test_token_lifetime_out_of_range() {
        assert!(generate_token("host", "secret", i64::MAX).is_err());
        assert!(generate_token("host", "secret", i64::MIN).is_err());
    }

    #[test]
    fn test_expired_token_rejected() {
        let token = generate_token("host", "secret", -2).unwrap();
        assert!(decode_token(&token, "secret").is_none());
    }

    #[test]
    fn test_token_from_query() {
        assert_eq!(
            token_from_query("role=admin&token=abc.def"),
            Some("abc.def".to_string())
        );
        assert_eq!(token_from_query("role=admin"), None);
    }
}
