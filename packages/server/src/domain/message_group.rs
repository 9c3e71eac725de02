//! Grouping of history pages into chat-bubble runs.
//!
//! Pure functions only, so the rules are testable without storage.

use chrono::Duration;

use super::{
    entity::{GroupedMessage, MessageGroup, StoredMessage},
    value_object::MessageGroupId,
};

/// Maximum gap between consecutive same-author messages in one group
pub const GROUPING_WINDOW_SECS: i64 = 120;

pub fn grouping_window() -> Duration {
    Duration::seconds(GROUPING_WINDOW_SECS)
}

/// Group a newest-first page of messages.
///
/// A message joins the current group when its author matches and it is no
/// more than `window` away from the message most recently added to that
/// group. Messages inside each group are returned oldest to newest; the
/// groups themselves stay newest-group-first.
pub fn group_messages(messages: Vec<StoredMessage>, window: Duration) -> Vec<MessageGroup> {
    let mut groups: Vec<MessageGroup> = Vec::new();

    for message in messages {
        if let Some(current) = groups.last_mut()
            && current.author.user_id == message.author.user_id
            && let Some(latest) = current.messages.last()
            && (latest.timestamp.value() - message.created_at.value()).abs() <= window
        {
            current.messages.push(message.into());
            continue;
        }

        groups.push(MessageGroup {
            id: MessageGroupId::generate(),
            author: message.author.clone(),
            messages: vec![GroupedMessage::from(message)],
        });
    }

    for group in &mut groups {
        group.messages.reverse();
    }

    groups
}
