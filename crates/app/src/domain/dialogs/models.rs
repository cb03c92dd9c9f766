//! Dialog Models

use bazaar::ids::Id;
use jiff::Timestamp;

/// Dialog Id
pub type DialogId = Id<Dialog>;

/// A messenger conversation with another user.
#[derive(Debug, Clone, PartialEq)]
pub struct Dialog {
    pub id: DialogId,
    pub peer_name: String,
    pub last_message: Option<String>,
    pub unread_count: u32,
    pub updated_at: Timestamp,
}

/// Unread messages across a set of dialogs.
pub fn unread_total<'a>(dialogs: impl IntoIterator<Item = &'a Dialog>) -> u64 {
    dialogs
        .into_iter()
        .map(|dialog| u64::from(dialog.unread_count))
        .sum()
}
