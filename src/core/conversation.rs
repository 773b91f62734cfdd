//! # Conversation Store
//!
//! The ordered transcript plus the busy flag. This is what gets rendered.
//!
//! ```text
//! append_local(m)   [Confirmed.., PendingLocal(m)]          optimistic
//! replace_all(t)    [Confirmed(t0), Confirmed(t1), ..]      authoritative
//! mark_pending_failed()  PendingLocal(m) → Failed(m)        send failed
//! ```
//!
//! `replace_all` is the only way confirmed content gets in, and it wins
//! outright: whatever pending or failed entries were on screen are dropped.

use crate::api::Message;

/// A displayed transcript entry, tagged by how much we trust it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Entry {
    /// Shown immediately after submit, not yet acknowledged by the agent.
    PendingLocal(Message),
    /// Part of the transcript the agent returned.
    Confirmed(Message),
    /// A local message whose send failed; kept visible until retried or superseded.
    Failed(Message),
}

impl Entry {
    pub fn message(&self) -> &Message {
        match self {
            Entry::PendingLocal(m) | Entry::Confirmed(m) | Entry::Failed(m) => m,
        }
    }

    pub fn is_confirmed(&self) -> bool {
        matches!(self, Entry::Confirmed(_))
    }
}

#[derive(Debug, Default)]
pub struct ConversationStore {
    entries: Vec<Entry>,
    busy: bool,
}

impl ConversationStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Optimistically shows a locally authored message at the end.
    pub fn append_local(&mut self, message: Message) {
        self.entries.push(Entry::PendingLocal(message));
    }

    /// Replaces everything with the agent's transcript, exactly as delivered.
    pub fn replace_all(&mut self, transcript: Vec<Message>) {
        self.entries = transcript.into_iter().map(Entry::Confirmed).collect();
    }

    pub fn set_busy(&mut self, busy: bool) {
        self.busy = busy;
    }

    pub fn is_busy(&self) -> bool {
        self.busy
    }

    pub fn entries(&self) -> &[Entry] {
        &self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// The messages the agent has acknowledged, in order.
    pub fn confirmed_transcript(&self) -> Vec<Message> {
        self.entries
            .iter()
            .filter(|e| e.is_confirmed())
            .map(|e| e.message().clone())
            .collect()
    }

    /// Marks every pending entry as failed. Returns how many changed.
    pub fn mark_pending_failed(&mut self) -> usize {
        let mut changed = 0;
        for entry in &mut self.entries {
            if let Entry::PendingLocal(m) = entry {
                *entry = Entry::Failed(m.clone());
                changed += 1;
            }
        }
        changed
    }

    /// Removes the most recent failed entry and hands back its message.
    pub fn take_failed(&mut self) -> Option<Message> {
        let idx = self
            .entries
            .iter()
            .rposition(|e| matches!(e, Entry::Failed(_)))?;
        Some(self.entries.remove(idx).message().clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn starts_empty_and_idle() {
        let store = ConversationStore::new();
        assert!(store.is_empty());
        assert!(!store.is_busy());
    }

    #[test]
    fn append_local_is_pending() {
        let mut store = ConversationStore::new();
        store.append_local(Message::user("Hello"));
        assert_eq!(store.entries(), &[Entry::PendingLocal(Message::user("Hello"))]);
        assert!(store.confirmed_transcript().is_empty());
    }

    #[test]
    fn replace_all_overwrites_optimistic_state() {
        let mut store = ConversationStore::new();
        store.append_local(Message::user("typo'd"));
        store.replace_all(vec![Message::user("Hello"), Message::bot("Hi!")]);

        assert_eq!(
            store.entries(),
            &[
                Entry::Confirmed(Message::user("Hello")),
                Entry::Confirmed(Message::bot("Hi!")),
            ]
        );
    }

    #[test]
    fn replace_all_preserves_order_and_duplicates() {
        let mut store = ConversationStore::new();
        let transcript = vec![
            Message::bot("b"),
            Message::user("a"),
            Message::user("a"),
            Message::bot("b"),
        ];
        store.replace_all(transcript.clone());
        assert_eq!(store.confirmed_transcript(), transcript);
    }

    #[test]
    fn replace_all_with_empty_clears() {
        let mut store = ConversationStore::new();
        store.replace_all(vec![Message::user("x")]);
        store.append_local(Message::user("y"));
        store.replace_all(vec![]);
        assert!(store.is_empty());
    }

    #[test]
    fn mark_pending_failed_only_touches_pending() {
        let mut store = ConversationStore::new();
        store.replace_all(vec![Message::user("Hi"), Message::bot("Hello")]);
        store.append_local(Message::user("Funds?"));

        assert_eq!(store.mark_pending_failed(), 1);
        assert_eq!(store.entries()[2], Entry::Failed(Message::user("Funds?")));
        assert!(store.entries()[0].is_confirmed());
        assert_eq!(store.mark_pending_failed(), 0);
    }

    #[test]
    fn take_failed_returns_latest() {
        let mut store = ConversationStore::new();
        store.append_local(Message::user("first"));
        store.mark_pending_failed();
        store.append_local(Message::user("second"));
        store.mark_pending_failed();

        assert_eq!(store.take_failed(), Some(Message::user("second")));
        assert_eq!(store.len(), 1);
        assert_eq!(store.take_failed(), Some(Message::user("first")));
        assert_eq!(store.take_failed(), None);
    }

    #[test]
    fn busy_flag_toggles() {
        let mut store = ConversationStore::new();
        store.set_busy(true);
        assert!(store.is_busy());
        store.set_busy(false);
        assert!(!store.is_busy());
    }
}
