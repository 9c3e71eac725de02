//! UseCase: メッセージ履歴取得（History Service）
//!
//! ## テスト実装の作業記録
//!
//! ### 何をテストしているか
//! - GetMessageHistoryUseCase::execute() メソッド
//! - カーソルの解釈、ページサイズ、グルーピング
//!
//! ### なぜこのテストが必要か
//! - カーソルより厳密に前のメッセージだけがページに含まれることを保証
//! - 不正なカーソルが「現在時刻」として扱われることを確認
//!
//! ### どのような状況を想定しているか
//! - 正常系：カーソル指定あり・なし
//! - 異常系：ストレージ障害
//! - エッジケース：空のページ、不正なカーソル文字列

use std::sync::Arc;

use chrono::Duration;
use tsudoi_shared::time::{Clock, parse_cursor};

use crate::domain::{MessageGroup, MessageRepository, RoomId, Timestamp, group_messages};

use super::error::HistoryError;

/// 1 ページあたりのデフォルト件数
pub const DEFAULT_PAGE_SIZE: usize = 50;

/// メッセージ履歴取得のユースケース
pub struct GetMessageHistoryUseCase {
    repository: Arc<dyn MessageRepository>,
    clock: Arc<dyn Clock>,
    page_size: usize,
    window: Duration,
}

impl GetMessageHistoryUseCase {
    pub fn new(
        repository: Arc<dyn MessageRepository>,
        clock: Arc<dyn Clock>,
        page_size: usize,
        window: Duration,
    ) -> Self {
        Self {
            repository,
            clock,
            page_size,
            window,
        }
    }

    /// メッセージ履歴取得を実行
    ///
    /// # Arguments
    ///
    /// * `room_id` - 対象のルーム
    /// * `cursor` - このタイムスタンプより前のメッセージを取得する（なし・不正な場合は現在時刻）
    ///
    /// # Returns
    ///
    /// * 新しいグループが先頭のメッセージグループ一覧（各グループ内は古い順）
    pub async fn execute(
        &self,
        room_id: &RoomId,
        cursor: Option<&str>,
    ) -> Result<Vec<MessageGroup>, HistoryError> {
        let before = match cursor.and_then(parse_cursor) {
            Some(instant) => instant,
            None => {
                if let Some(raw) = cursor.filter(|c| !c.trim().is_empty()) {
                    tracing::debug!("Ignoring unparsable history cursor '{}'", raw);
                }
                self.clock.now()
            }
        };

        let messages = self
            .repository
            .fetch_before(room_id, Timestamp::new(before), self.page_size)
            .await
            .inspect_err(|e| tracing::error!(room_id = %room_id, "Failed to fetch messages: {}", e))?;

        Ok(group_messages(messages, self.window))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{
        MessageContent, MessageId, MockMessageRepository, RepositoryError, StoredMessage,
        UserColor, UserId, UserProfile, grouping_window,
    };
    use chrono::{DateTime, TimeZone, Utc};
    use mockall::predicate::eq;
    use tsudoi_shared::time::ManualClock;

    fn now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 5, 1, 12, 0, 0).unwrap()
    }

    fn message(room_id: RoomId, author: &UserProfile, at: DateTime<Utc>) -> StoredMessage {
        StoredMessage {
            id: MessageId::generate(),
            room_id,
            author: author.clone(),
            content: MessageContent::new("hi".to_string()).unwrap(),
            created_at: Timestamp::new(at),
        }
    }

    fn author(username: &str) -> UserProfile {
        UserProfile {
            user_id: UserId::generate(),
            name: username.to_string(),
            username: username.to_string(),
            profile_pic: String::new(),
            color: UserColor::Purple,
        }
    }

    fn usecase(repository: MockMessageRepository, page_size: usize) -> GetMessageHistoryUseCase {
        GetMessageHistoryUseCase::new(
            Arc::new(repository),
            Arc::new(ManualClock::new(now())),
            page_size,
            grouping_window(),
        )
    }

    #[tokio::test]
    async fn test_history_with_cursor() {
        // テスト項目: カーソルのタイムスタンプとページサイズでリポジトリが呼ばれる
        // given (前提条件):
        let room = RoomId::generate();
        let cursor = Utc.with_ymd_and_hms(2024, 4, 30, 8, 15, 0).unwrap()
            + Duration::milliseconds(250);
        let mut repository = MockMessageRepository::new();
        repository
            .expect_fetch_before()
            .with(eq(room), eq(Timestamp::new(cursor)), eq(20))
            .times(1)
            .returning(|_, _, _| Ok(Vec::new()));
        let usecase = usecase(repository, 20);

        // when (操作):
        let result = usecase
            .execute(&room, Some("2024-04-30T08:15:00.250Z"))
            .await;

        // then (期待する結果):
        assert_eq!(result, Ok(Vec::new()));
    }

    #[tokio::test]
    async fn test_history_invalid_cursor_means_now() {
        // テスト項目: 不正なカーソル・カーソルなしは現在時刻として扱われる
        // given (前提条件):
        let room = RoomId::generate();
        let mut repository = MockMessageRepository::new();
        repository
            .expect_fetch_before()
            .with(eq(room), eq(Timestamp::new(now())), eq(DEFAULT_PAGE_SIZE))
            .times(2)
            .returning(|_, _, _| Ok(Vec::new()));
        let usecase = usecase(repository, DEFAULT_PAGE_SIZE);

        // when (操作):
        let invalid = usecase.execute(&room, Some("yesterday")).await;
        let missing = usecase.execute(&room, None).await;

        // then (期待する結果):
        assert!(invalid.unwrap().is_empty());
        assert!(missing.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_history_groups_page() {
        // テスト項目: 取得したページが著者と時間間隔でグループ化される
        // given (前提条件):
        let room = RoomId::generate();
        let alice = author("alice");
        let bob = author("bob");
        let t0 = now() - Duration::minutes(10);
        // newest first
        let page = vec![
            message(room, &alice, t0 + Duration::seconds(200)),
            message(room, &bob, t0 + Duration::seconds(40)),
            message(room, &alice, t0 + Duration::seconds(30)),
            message(room, &alice, t0),
        ];
        let mut repository = MockMessageRepository::new();
        repository
            .expect_fetch_before()
            .returning(move |_, _, _| Ok(page.clone()));
        let usecase = usecase(repository, DEFAULT_PAGE_SIZE);

        // when (操作):
        let groups = usecase.execute(&room, None).await.unwrap();

        // then (期待する結果):
        let shape: Vec<(String, usize)> = groups
            .iter()
            .map(|g| (g.author.username.clone(), g.messages.len()))
            .collect();
        assert_eq!(
            shape,
            vec![
                ("alice".to_string(), 1),
                ("bob".to_string(), 1),
                ("alice".to_string(), 2),
            ]
        );
        assert_eq!(groups[2].messages[0].timestamp, Timestamp::new(t0));
    }

    #[tokio::test]
    async fn test_history_storage_failure() {
        // テスト項目: ストレージ障害は HistoryError::Storage (500) になる
        // given (前提条件):
        let mut repository = MockMessageRepository::new();
        repository
            .expect_fetch_before()
            .returning(|_, _, _| Err(RepositoryError::Storage("timeout".to_string())));
        let usecase = usecase(repository, DEFAULT_PAGE_SIZE);

        // when (操作):
        let result = usecase.execute(&RoomId::generate(), None).await;

        // then (期待する結果):
        let error = result.unwrap_err();
        assert!(matches!(error, HistoryError::Storage(_)));
        assert_eq!(error.status_code(), 500);
    }
}
