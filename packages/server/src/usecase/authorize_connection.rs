//! UseCase: 接続の認可（Identity Gate）
//!
//! ## テスト実装の作業記録
//!
//! ### 何をテストしているか
//! - AuthorizeConnectionUseCase::execute() メソッド
//! - クレデンシャル検証、ロール確認、コミュニティ参加確認
//!
//! ### なぜこのテストが必要か
//! - 認可されていない接続がルームに参加しないことを保証
//! - 失敗理由ごとに正しいエラー（ステータスコード）が返ることを確認
//!
//! ### どのような状況を想定しているか
//! - 正常系：app_user かつ参加済みコミュニティへの接続
//! - 異常系：クレデンシャルなし・期限切れ、不正なコミュニティ ID、admin ロール、未参加コミュニティ
//! - エッジケース：コミュニティ ID とクレデンシャルの両方が不正（コミュニティ ID を先に検証）

use std::sync::Arc;

use crate::domain::{IdentityProvider, Role, RoomId, UserIdentity};

use super::error::ConnectError;

/// 接続要求（UI 層がクエリ・ヘッダーから組み立てる）
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ConnectionRequest {
    pub credential: Option<String>,
    pub room_id: Option<String>,
}

/// 接続の認可のユースケース
pub struct AuthorizeConnectionUseCase {
    identity_provider: Arc<dyn IdentityProvider>,
}

impl AuthorizeConnectionUseCase {
    pub fn new(identity_provider: Arc<dyn IdentityProvider>) -> Self {
        Self { identity_provider }
    }

    /// 接続要求を検証し、認証済みユーザーと参加先のルームを返す
    ///
    /// 参加確認は認証時点の `joined_rooms` のみで行う（追加の問い合わせはしない）。
    pub async fn execute(
        &self,
        request: ConnectionRequest,
    ) -> Result<(UserIdentity, RoomId), ConnectError> {
        // 1. コミュニティ ID（I/O なし）
        let room_id = parse_room_id(request.room_id.as_deref())?;

        // 2. クレデンシャル
        let identity = self.authenticate(request.credential.as_deref()).await?;

        // 3. 参加確認
        if !identity.is_member(&room_id) {
            tracing::info!(
                user_id = %identity.user_id(),
                room_id = %room_id,
                "User is not a member of the community"
            );
            return Err(ConnectError::NotFound);
        }

        Ok((identity, room_id))
    }

    /// クレデンシャルを検証し、app_user ロールであることを確認する
    pub async fn authenticate(&self, credential: Option<&str>) -> Result<UserIdentity, ConnectError> {
        let credential = credential
            .map(str::trim)
            .filter(|c| !c.is_empty())
            .ok_or_else(|| ConnectError::Unauthenticated("credential is missing".to_string()))?;

        let identity = self
            .identity_provider
            .authenticate(credential)
            .await
            .inspect_err(|e| tracing::info!("Authentication failed: {}", e))?;

        if identity.role != Role::AppUser {
            tracing::info!(user_id = %identity.user_id(), role = identity.role.as_str(), "Role is not allowed");
            return Err(ConnectError::Forbidden);
        }

        Ok(identity)
    }
}

/// コミュニティ ID をパースする
pub fn parse_room_id(raw: Option<&str>) -> Result<RoomId, ConnectError> {
    let raw = raw
        .map(str::trim)
        .filter(|r| !r.is_empty())
        .ok_or_else(|| ConnectError::BadRequest("communityId is required".to_string()))?;
    raw.parse::<RoomId>()
        .map_err(|e| ConnectError::BadRequest(e.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{AuthError, MockIdentityProvider, UserColor, UserId, UserProfile};

    fn identity(role: Role, joined_rooms: Vec<RoomId>) -> UserIdentity {
        UserIdentity {
            profile: UserProfile {
                user_id: UserId::generate(),
                name: "Alice".to_string(),
                username: "alice".to_string(),
                profile_pic: String::new(),
                color: UserColor::Green,
            },
            role,
            joined_rooms,
        }
    }

    fn provider_returning(result: Result<UserIdentity, AuthError>) -> Arc<MockIdentityProvider> {
        let mut provider = MockIdentityProvider::new();
        provider
            .expect_authenticate()
            .returning(move |_| result.clone());
        Arc::new(provider)
    }

    fn request(credential: Option<&str>, room_id: Option<String>) -> ConnectionRequest {
        ConnectionRequest {
            credential: credential.map(str::to_string),
            room_id,
        }
    }

    #[tokio::test]
    async fn test_authorize_member_success() {
        // テスト項目: 参加済みコミュニティへの app_user の接続が認可される
        // given (前提条件):
        let room = RoomId::generate();
        let alice = identity(Role::AppUser, vec![room]);
        let usecase = AuthorizeConnectionUseCase::new(provider_returning(Ok(alice.clone())));

        // when (操作):
        let result = usecase
            .execute(request(Some("token"), Some(room.to_string())))
            .await;

        // then (期待する結果):
        assert_eq!(result, Ok((alice, room)));
    }

    #[tokio::test]
    async fn test_authorize_expired_credential() {
        // テスト項目: 期限切れのクレデンシャルは Unauthenticated (401) になる
        // given (前提条件):
        let usecase = AuthorizeConnectionUseCase::new(provider_returning(Err(AuthError::Expired)));

        // when (操作):
        let result = usecase
            .execute(request(Some("expired"), Some(RoomId::generate().to_string())))
            .await;

        // then (期待する結果):
        let error = result.unwrap_err();
        assert!(matches!(error, ConnectError::Unauthenticated(_)));
        assert_eq!(error.status_code(), 401);
    }

    #[tokio::test]
    async fn test_authorize_missing_credential_skips_provider() {
        // テスト項目: クレデンシャルがない場合はプロバイダを呼ばずに Unauthenticated になる
        // given (前提条件):
        let mut provider = MockIdentityProvider::new();
        provider.expect_authenticate().never();
        let usecase = AuthorizeConnectionUseCase::new(Arc::new(provider));

        // when (操作):
        let result = usecase
            .execute(request(Some("   "), Some(RoomId::generate().to_string())))
            .await;

        // then (期待する結果):
        assert!(matches!(result, Err(ConnectError::Unauthenticated(_))));
    }

    #[tokio::test]
    async fn test_authorize_room_id_checked_first() {
        // テスト項目: コミュニティ ID が不正な場合はクレデンシャル検証前に BadRequest になる
        // given (前提条件):
        let mut provider = MockIdentityProvider::new();
        provider.expect_authenticate().never();
        let usecase = AuthorizeConnectionUseCase::new(Arc::new(provider));

        // when (操作):
        let malformed = usecase
            .execute(request(None, Some("not-a-uuid".to_string())))
            .await;
        let missing = usecase.execute(request(Some("token"), None)).await;

        // then (期待する結果):
        assert!(matches!(malformed, Err(ConnectError::BadRequest(_))));
        assert!(matches!(missing, Err(ConnectError::BadRequest(_))));
    }

    #[tokio::test]
    async fn test_authorize_admin_is_forbidden() {
        // テスト項目: app_user 以外のロールは Forbidden (403) になる
        // given (前提条件):
        let room = RoomId::generate();
        let admin = identity(Role::AdminUser, vec![room]);
        let usecase = AuthorizeConnectionUseCase::new(provider_returning(Ok(admin)));

        // when (操作):
        let result = usecase
            .execute(request(Some("token"), Some(room.to_string())))
            .await;

        // then (期待する結果):
        assert_eq!(result, Err(ConnectError::Forbidden));
    }

    #[tokio::test]
    async fn test_authorize_non_member_not_found() {
        // テスト項目: 参加していないコミュニティへの接続は NotFound (404) になる
        // given (前提条件):
        let alice = identity(Role::AppUser, vec![RoomId::generate()]);
        let usecase = AuthorizeConnectionUseCase::new(provider_returning(Ok(alice)));

        // when (操作):
        let result = usecase
            .execute(request(Some("token"), Some(RoomId::generate().to_string())))
            .await;

        // then (期待する結果):
        assert_eq!(result, Err(ConnectError::NotFound));
    }
}
