//! HMAC-signed bearer token verification.
//!
//! Tokens use the compact JWS layout with the HS256 algorithm:
//!
//! ```text
//! base64url(header) "." base64url(claims) "." base64url(HMAC-SHA256(secret, header "." claims))
//! ```
//!
//! A token proves who the caller is; the user record (profile, role and
//! memberships) always comes from the [`UserDirectory`].

use std::sync::Arc;

use async_trait::async_trait;
use base64::{Engine as _, engine::general_purpose::URL_SAFE_NO_PAD};
use hmac::{Hmac, Mac};
use serde::{Deserialize, Serialize};
use sha2::Sha256;
use tsudoi_shared::time::Clock;
use uuid::Uuid;

use crate::domain::{AuthError, IdentityProvider, Role, UserDirectory, UserId, UserIdentity};

type HmacSha256 = Hmac<Sha256>;

const BEARER_PREFIX: &str = "Bearer ";

#[derive(Debug, Serialize, Deserialize)]
struct TokenHeader {
    alg: String,
    typ: String,
}

/// Claims carried by a bearer token
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TokenClaims {
    /// User id
    pub sub: Uuid,
    pub role: Role,
    /// Expiry, seconds since the Unix epoch
    pub exp: i64,
}

/// Sign `claims` with `secret`
pub fn issue_token(claims: &TokenClaims, secret: &[u8]) -> Result<String, AuthError> {
    let header = TokenHeader {
        alg: "HS256".to_string(),
        typ: "JWT".to_string(),
    };
    let header = serde_json::to_vec(&header).map_err(|e| AuthError::MalformedToken(e.to_string()))?;
    let claims = serde_json::to_vec(claims).map_err(|e| AuthError::MalformedToken(e.to_string()))?;
    let signing_input = format!(
        "{}.{}",
        URL_SAFE_NO_PAD.encode(header),
        URL_SAFE_NO_PAD.encode(claims)
    );
    let signature = mac(secret)?
        .chain_update(signing_input.as_bytes())
        .finalize()
        .into_bytes();
    Ok(format!("{}.{}", signing_input, URL_SAFE_NO_PAD.encode(signature)))
}

fn mac(secret: &[u8]) -> Result<HmacSha256, AuthError> {
    HmacSha256::new_from_slice(secret).map_err(|e| AuthError::MalformedToken(e.to_string()))
}

/// Verifies HS256 tokens and resolves the user through a [`UserDirectory`]
pub struct TokenIdentityProvider {
    directory: Arc<dyn UserDirectory>,
    secret: Vec<u8>,
    clock: Arc<dyn Clock>,
}

impl TokenIdentityProvider {
    pub fn new(directory: Arc<dyn UserDirectory>, secret: impl Into<Vec<u8>>, clock: Arc<dyn Clock>) -> Self {
        Self {
            directory,
            secret: secret.into(),
            clock,
        }
    }

    /// Check signature and expiry, returning the claims
    pub fn verify(&self, token: &str) -> Result<TokenClaims, AuthError> {
        let mut parts = token.split('.');
        let (Some(header_b64), Some(claims_b64), Some(signature_b64), None) =
            (parts.next(), parts.next(), parts.next(), parts.next())
        else {
            return Err(AuthError::MalformedToken(
                "expected three dot-separated segments".to_string(),
            ));
        };

        let header: TokenHeader = decode_segment(header_b64)?;
        if header.alg != "HS256" {
            return Err(AuthError::MalformedToken(format!(
                "unsupported algorithm '{}'",
                header.alg
            )));
        }

        let signature = URL_SAFE_NO_PAD
            .decode(signature_b64)
            .map_err(|e| AuthError::MalformedToken(e.to_string()))?;
        let mut verifier = mac(&self.secret)?;
        verifier.update(header_b64.as_bytes());
        verifier.update(b".");
        verifier.update(claims_b64.as_bytes());
        // Constant-time comparison
        verifier
            .verify_slice(&signature)
            .map_err(|_| AuthError::InvalidSignature)?;

        let claims: TokenClaims = decode_segment(claims_b64)?;
        if claims.exp <= self.clock.now().timestamp() {
            return Err(AuthError::Expired);
        }
        Ok(claims)
    }
}

fn decode_segment<T: serde::de::DeserializeOwned>(segment: &str) -> Result<T, AuthError> {
    let bytes = URL_SAFE_NO_PAD
        .decode(segment)
        .map_err(|e| AuthError::MalformedToken(e.to_string()))?;
    serde_json::from_slice(&bytes).map_err(|e| AuthError::MalformedToken(e.to_string()))
}

#[async_trait]
impl IdentityProvider for TokenIdentityProvider {
    async fn authenticate(&self, credential: &str) -> Result<UserIdentity, AuthError> {
        let credential = credential.trim_start();
        let token = credential
            .strip_prefix(BEARER_PREFIX)
            .unwrap_or(credential)
            .trim();
        if token.is_empty() {
            return Err(AuthError::MissingCredential);
        }

        let claims = self.verify(token)?;
        let identity = self
            .directory
            .find_identity(&UserId::new(claims.sub))
            .await
            .map_err(|e| AuthError::Directory(e.to_string()))?
            .ok_or(AuthError::UnknownUser)?;

        if identity.role != claims.role {
            return Err(AuthError::RoleMismatch);
        }

        tracing::debug!(user_id = %identity.user_id(), "Authenticated user '{}'", identity.profile.username);
        Ok(identity)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{MockUserDirectory, RepositoryError, RoomId, UserColor, UserProfile};
    use crate::infrastructure::repository::InMemoryUserDirectory;
    use chrono::{Duration, TimeZone, Utc};
    use tsudoi_shared::time::ManualClock;

    const SECRET: &[u8] = b"test-secret";

    struct Fixture {
        clock: Arc<ManualClock>,
        provider: TokenIdentityProvider,
        identity: UserIdentity,
    }

    async fn setup() -> Fixture {
        let clock = Arc::new(ManualClock::new(
            Utc.with_ymd_and_hms(2024, 5, 1, 12, 0, 0).unwrap(),
        ));
        let directory = Arc::new(InMemoryUserDirectory::new());
        let identity = UserIdentity {
            profile: UserProfile {
                user_id: UserId::generate(),
                name: "Alice".to_string(),
                username: "alice".to_string(),
                profile_pic: String::new(),
                color: UserColor::Blue,
            },
            role: Role::AppUser,
            joined_rooms: vec![RoomId::generate()],
        };
        directory.insert(identity.clone()).await;
        let provider = TokenIdentityProvider::new(directory, SECRET, clock.clone());
        Fixture {
            clock,
            provider,
            identity,
        }
    }

    fn claims_for(fixture: &Fixture, role: Role, ttl: Duration) -> TokenClaims {
        TokenClaims {
            sub: fixture.identity.user_id().as_uuid(),
            role,
            exp: (fixture.clock.now() + ttl).timestamp(),
        }
    }

    #[tokio::test]
    async fn test_authenticate_valid_token() {
        // テスト項目: 正しいトークンでユーザー情報（参加コミュニティを含む）が得られる
        // given (前提条件):
        let fixture = setup().await;
        let token = issue_token(&claims_for(&fixture, Role::AppUser, Duration::hours(1)), SECRET).unwrap();

        // when (操作):
        let plain = fixture.provider.authenticate(&token).await;
        let bearer = fixture.provider.authenticate(&format!("Bearer {token}")).await;

        // then (期待する結果):
        assert_eq!(plain.unwrap(), fixture.identity);
        assert_eq!(bearer.unwrap(), fixture.identity);
    }

    #[tokio::test]
    async fn test_authenticate_expired_token() {
        // テスト項目: 有効期限切れのトークンは Expired になる
        // given (前提条件):
        let fixture = setup().await;
        let token = issue_token(&claims_for(&fixture, Role::AppUser, Duration::minutes(5)), SECRET).unwrap();
        fixture.clock.advance(Duration::minutes(5));

        // when (操作):
        let result = fixture.provider.authenticate(&token).await;

        // then (期待する結果):
        assert_eq!(result, Err(AuthError::Expired));
    }

    #[tokio::test]
    async fn test_authenticate_wrong_secret() {
        // テスト項目: 別の鍵で署名されたトークンは InvalidSignature になる
        // given (前提条件):
        let fixture = setup().await;
        let token = issue_token(
            &claims_for(&fixture, Role::AppUser, Duration::hours(1)),
            b"another-secret",
        )
        .unwrap();

        // when (操作):
        let result = fixture.provider.authenticate(&token).await;

        // then (期待する結果):
        assert_eq!(result, Err(AuthError::InvalidSignature));
    }

    #[tokio::test]
    async fn test_authenticate_unknown_user() {
        // テスト項目: ディレクトリに存在しないユーザーは UnknownUser になる
        // given (前提条件):
        let fixture = setup().await;
        let claims = TokenClaims {
            sub: Uuid::new_v4(),
            role: Role::AppUser,
            exp: (fixture.clock.now() + Duration::hours(1)).timestamp(),
        };
        let token = issue_token(&claims, SECRET).unwrap();

        // when (操作):
        let result = fixture.provider.authenticate(&token).await;

        // then (期待する結果):
        assert_eq!(result, Err(AuthError::UnknownUser));
    }

    #[tokio::test]
    async fn test_authenticate_role_mismatch() {
        // テスト項目: トークンのロールがユーザーレコードと異なる場合は RoleMismatch になる
        // given (前提条件):
        let fixture = setup().await;
        let token = issue_token(&claims_for(&fixture, Role::AdminUser, Duration::hours(1)), SECRET).unwrap();

        // when (操作):
        let result = fixture.provider.authenticate(&token).await;

        // then (期待する結果):
        assert_eq!(result, Err(AuthError::RoleMismatch));
    }

    #[tokio::test]
    async fn test_authenticate_malformed_and_missing() {
        // テスト項目: 形式不正・空のクレデンシャルは拒否される
        // given (前提条件):
        let fixture = setup().await;

        // when (操作):
        let malformed = fixture.provider.authenticate("not-a-token").await;
        let empty = fixture.provider.authenticate("Bearer ").await;

        // then (期待する結果):
        assert!(matches!(malformed, Err(AuthError::MalformedToken(_))));
        assert_eq!(empty, Err(AuthError::MissingCredential));
    }

    #[tokio::test]
    async fn test_authenticate_directory_unavailable() {
        // テスト項目: ユーザーディレクトリの障害は Directory エラーになる
        // given (前提条件):
        let clock = Arc::new(ManualClock::new(
            Utc.with_ymd_and_hms(2024, 5, 1, 12, 0, 0).unwrap(),
        ));
        let mut directory = MockUserDirectory::new();
        directory
            .expect_find_identity()
            .times(1)
            .returning(|_| Err(RepositoryError::Storage("connection refused".to_string())));
        let provider = TokenIdentityProvider::new(Arc::new(directory), SECRET, clock.clone());
        let claims = TokenClaims {
            sub: Uuid::new_v4(),
            role: Role::AppUser,
            exp: (clock.now() + Duration::hours(1)).timestamp(),
        };
        let token = issue_token(&claims, SECRET).unwrap();

        // when (操作):
        let result = provider.authenticate(&token).await;

        // then (期待する結果):
        assert!(matches!(result, Err(AuthError::Directory(_))));
    }
}
