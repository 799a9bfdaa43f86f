use chrono::{DateTime, Duration, Utc};
use jsonwebtoken::{Algorithm, DecodingKey, EncodingKey, Header, Validation, decode, encode};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use uuid::Uuid;

use crate::config::Config;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Claims {
    pub sub: Uuid, // 用户ID
    pub iat: i64,  // 签发时间
    pub exp: i64,  // 过期时间
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum AuthError {
    #[error("invalid token")]
    InvalidToken,
    #[error("token expired")]
    Expired,
}

/// 有效期上限（一百年），避免计算过期时间时溢出
const MAX_LIFETIME: std::time::Duration = std::time::Duration::from_secs(100 * 365 * 24 * 3600);

/// 会话令牌的签发与校验
///
/// 令牌为 HS256 签名的 JWT，只携带用户ID和签发时间，
/// 服务端不保存吊销列表，过期前始终有效。
#[derive(Clone)]
pub struct TokenService {
    encoding: EncodingKey,
    decoding: DecodingKey,
    lifetime: Duration,
}

impl TokenService {
    pub fn new(secret: &str, lifetime_secs: u64) -> Self {
        Self::with_lifetime(secret, std::time::Duration::from_secs(lifetime_secs))
    }

    pub fn from_config(config: &Config) -> Self {
        Self::with_lifetime(&config.jwt_secret, config.jwt_expiration())
    }

    fn with_lifetime(secret: &str, lifetime: std::time::Duration) -> Self {
        Self {
            encoding: EncodingKey::from_secret(secret.as_bytes()),
            decoding: DecodingKey::from_secret(secret.as_bytes()),
            lifetime: Duration::from_std(lifetime.min(MAX_LIFETIME)).unwrap_or(Duration::zero()),
        }
    }

    pub fn issue(&self, user_id: Uuid) -> Result<String, jsonwebtoken::errors::Error> {
        self.issue_at(user_id, Utc::now())
    }

    pub fn issue_at(
        &self,
        user_id: Uuid,
        now: DateTime<Utc>,
    ) -> Result<String, jsonwebtoken::errors::Error> {
        let claims = Claims {
            sub: user_id,
            iat: now.timestamp(),
            exp: (now + self.lifetime).timestamp(),
        };

        encode(&Header::new(Algorithm::HS256), &claims, &self.encoding)
    }

    pub fn verify(&self, token: &str) -> Result<Uuid, AuthError> {
        self.verify_at(token, Utc::now())
    }

    pub fn verify_at(&self, token: &str, now: DateTime<Utc>) -> Result<Uuid, AuthError> {
        // 过期由下面按传入时间判断，便于模拟时钟
        let mut validation = Validation::new(Algorithm::HS256);
        validation.validate_exp = false;

        let claims = decode::<Claims>(token, &self.decoding, &validation)
            .map_err(|_| AuthError::InvalidToken)?
            .claims;

        if now.timestamp() >= claims.exp {
            return Err(AuthError::Expired);
        }

        Ok(claims.sub)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    fn service() -> TokenService {
        TokenService::new("test-secret", 3600)
    }

    #[test]
    fn verify_returns_issued_user() {
        let tokens = service();
        let user_id = Uuid::new_v4();
        let token = tokens.issue(user_id).unwrap();
        assert_eq!(tokens.verify(&token), Ok(user_id));
    }

    #[test]
    fn token_expires_after_one_hour() {
        let tokens = service();
        let user_id = Uuid::new_v4();
        let issued = Utc::now();
        let token = tokens.issue_at(user_id, issued).unwrap();

        let almost = issued + Duration::seconds(3599);
        assert_eq!(tokens.verify_at(&token, almost), Ok(user_id));

        let elapsed = issued + Duration::seconds(3600);
        assert_eq!(tokens.verify_at(&token, elapsed), Err(AuthError::Expired));
    }

    #[test]
    fn from_config_uses_configured_expiration() {
        let mut config = Config::local("test-secret");
        config.jwt_expiration_secs = 60;
        let tokens = TokenService::from_config(&config);
        let user_id = Uuid::new_v4();
        let issued = Utc::now();
        let token = tokens.issue_at(user_id, issued).unwrap();

        assert_eq!(
            tokens.verify_at(&token, issued + Duration::seconds(59)),
            Ok(user_id)
        );
        assert_eq!(
            tokens.verify_at(&token, issued + Duration::seconds(60)),
            Err(AuthError::Expired)
        );
    }

    #[test]
    fn rejects_token_signed_with_other_secret() {
        let token = TokenService::new("other-secret", 3600)
            .issue(Uuid::new_v4())
            .unwrap();
        assert_eq!(service().verify(&token), Err(AuthError::InvalidToken));
    }

    #[test]
    fn rejects_tampered_payload() {
        let tokens = service();
        let token = tokens.issue(Uuid::new_v4()).unwrap();
        let other = tokens.issue(Uuid::new_v4()).unwrap();

        let parts: Vec<&str> = token.split('.').collect();
        let other_parts: Vec<&str> = other.split('.').collect();
        let forged = format!("{}.{}.{}", parts[0], other_parts[1], parts[2]);
        assert_eq!(tokens.verify(&forged), Err(AuthError::InvalidToken));
    }

    #[rstest]
    #[case("")]
    #[case("garbage")]
    #[case("a.b.c")]
    #[case("eyJhbGciOiJIUzI1NiJ9.%%%.sig")]
    fn garbage_is_a_typed_failure(#[case] token: &str) {
        assert_eq!(service().verify(token), Err(AuthError::InvalidToken));
    }
}
