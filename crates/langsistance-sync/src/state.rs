//! Shared session state.
//!
//! The conversation, the latest backend metadata and the sync flags are
//! shared between the sync loop and concurrent submits. Each lives behind
//! its own lock; every mutation is an append or an overwrite, and events
//! are published after the lock is released.

use parking_lot::{Mutex, RwLock, RwLockReadGuard};
use tokio::sync::broadcast;

use langsistance_core::{
    AnswerPayload, AppendOutcome, Conversation, LatestMetadata, Message, MessageId, MessageKind,
    PendingQuery, SyncStatus,
};

use crate::events::SyncEvent;

#[derive(Debug, Default)]
struct Flags {
    status: SyncStatus,
    pending: Option<PendingQuery>,
    next_ticket: u64,
}

/// State shared by all components of one sync session.
#[derive(Debug)]
pub struct SessionState {
    conversation: RwLock<Conversation>,
    metadata: RwLock<LatestMetadata>,
    flags: Mutex<Flags>,
    events: broadcast::Sender<SyncEvent>,
}

impl Default for SessionState {
    fn default() -> Self {
        Self::new(Conversation::default(), 256)
    }
}

impl SessionState {
    /// Create session state around an existing conversation.
    ///
    /// `event_capacity` bounds how far a subscriber may lag before it
    /// starts missing events; it is raised to 1 if zero.
    #[must_use]
    pub fn new(conversation: Conversation, event_capacity: usize) -> Self {
        let (events, _) = broadcast::channel(event_capacity.max(1));
        Self {
            conversation: RwLock::new(conversation),
            metadata: RwLock::new(LatestMetadata::default()),
            flags: Mutex::new(Flags::default()),
            events,
        }
    }

    /// Subscribe to state change events.
    #[must_use]
    pub fn subscribe(&self) -> broadcast::Receiver<SyncEvent> {
        self.events.subscribe()
    }

    fn publish(&self, event: SyncEvent) {
        // No subscribers is fine.
        let _ = self.events.send(event);
    }

    // =========================================================================
    // Reads
    // =========================================================================

    /// Read access to the conversation.
    ///
    /// The guard must not be held across an `.await`.
    pub fn conversation(&self) -> RwLockReadGuard<'_, Conversation> {
        self.conversation.read()
    }

    /// Copy of a single message.
    #[must_use]
    pub fn message(&self, id: MessageId) -> Option<Message> {
        self.conversation.read().get(id).cloned()
    }

    /// Copy of all messages.
    #[must_use]
    pub fn messages(&self) -> Vec<Message> {
        self.conversation.read().messages().to_vec()
    }

    /// Current displayed status.
    #[must_use]
    pub fn status_text(&self) -> String {
        self.conversation.read().status().to_string()
    }

    /// Current sync flags.
    #[must_use]
    pub fn sync_status(&self) -> SyncStatus {
        self.flags.lock().status.clone()
    }

    /// The outstanding query, if any.
    #[must_use]
    pub fn pending_query(&self) -> Option<PendingQuery> {
        self.flags.lock().pending.clone()
    }

    /// Metadata of the most recent backend payload.
    #[must_use]
    pub fn metadata(&self) -> LatestMetadata {
        self.metadata.read().clone()
    }

    // =========================================================================
    // Conversation
    // =========================================================================

    /// Append a user message.
    pub fn push_user(&self, content: &str) -> MessageId {
        let id = self.conversation.write().push_user(content);
        self.publish(SyncEvent::MessageAppended {
            id,
            kind: MessageKind::User,
        });
        id
    }

    /// Append an error message.
    pub fn push_error(&self, content: &str) -> MessageId {
        let id = self.conversation.write().push_error(content);
        self.publish(SyncEvent::MessageAppended {
            id,
            kind: MessageKind::Error,
        });
        id
    }

    /// Offer an agent answer; see [`Conversation::append_answer`].
    ///
    /// The duplicate check and the append happen under one write lock.
    pub fn append_answer(&self, payload: &AnswerPayload) -> AppendOutcome {
        let (outcome, status) = {
            let mut conversation = self.conversation.write();
            let before = conversation.status().to_string();
            let outcome = conversation.append_answer(payload);
            let after = conversation.status();
            let changed = (after != before).then(|| after.to_string());
            (outcome, changed)
        };

        if let AppendOutcome::Appended(id) = outcome {
            self.publish(SyncEvent::MessageAppended {
                id,
                kind: MessageKind::Agent,
            });
        }
        if let Some(status) = status {
            self.publish(SyncEvent::StatusChanged(status));
        }
        outcome
    }

    /// Replace the displayed status.
    pub fn set_status_text(&self, status: &str) {
        let changed = {
            let mut conversation = self.conversation.write();
            let changed = conversation.status() != status;
            conversation.set_status(status);
            changed
        };
        if changed {
            self.publish(SyncEvent::StatusChanged(status.to_string()));
        }
    }

    /// Flip the reasoning panel of a message.
    ///
    /// # Errors
    ///
    /// Returns an error if no message has this ID.
    pub fn toggle_reasoning(&self, id: MessageId) -> langsistance_core::Result<bool> {
        self.conversation.write().toggle_reasoning(id)
    }

    /// Merge a payload into the latest metadata.
    pub fn merge_metadata(&self, payload: &AnswerPayload) {
        self.metadata.write().merge(payload);
    }

    // =========================================================================
    // Flags
    // =========================================================================

    /// Record the result of a health probe. Returns true if the flag flipped.
    pub fn set_online(&self, online: bool) -> bool {
        let changed = {
            let mut flags = self.flags.lock();
            let changed = flags.status.is_online != online;
            flags.status.is_online = online;
            changed
        };
        if changed {
            self.publish(SyncEvent::ConnectivityChanged { online });
        }
        changed
    }

    /// Mark a query as outstanding and return its ticket.
    ///
    /// Clears any previous error.
    pub fn begin_query(&self, text: &str) -> u64 {
        let (ticket, was_busy) = {
            let mut flags = self.flags.lock();
            let ticket = flags.next_ticket;
            flags.next_ticket += 1;
            flags.pending = Some(PendingQuery::new(ticket, text));
            flags.status.last_error = None;
            let was_busy = std::mem::replace(&mut flags.status.is_busy, true);
            (ticket, was_busy)
        };
        if !was_busy {
            self.publish(SyncEvent::BusyChanged { busy: true });
        }
        ticket
    }

    /// Complete the query holding `ticket`, optionally recording an error.
    ///
    /// Only the pending query's ticket clears the busy flag or records an
    /// error; a stale completion leaves a newer submission untouched.
    pub fn finish_query(&self, ticket: u64, error: Option<&str>) {
        let cleared = {
            let mut flags = self.flags.lock();
            if flags.pending.as_ref().is_some_and(|p| p.ticket == ticket) {
                flags.pending = None;
                if let Some(error) = error {
                    flags.status.last_error = Some(error.to_string());
                }
                std::mem::replace(&mut flags.status.is_busy, false)
            } else {
                false
            }
        };
        if cleared {
            self.publish(SyncEvent::BusyChanged { busy: false });
        }
    }

    /// Drop any outstanding query and clear the busy and error flags.
    pub fn clear_pending(&self) {
        let was_busy = {
            let mut flags = self.flags.lock();
            flags.pending = None;
            flags.status.last_error = None;
            std::mem::replace(&mut flags.status.is_busy, false)
        };
        if was_busy {
            self.publish(SyncEvent::BusyChanged { busy: false });
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn append_publishes_message_and_status() {
        let state = SessionState::default();
        let mut events = state.subscribe();

        let outcome = state.append_answer(&AnswerPayload::with_answer("hi").status("done"));

        let id = match outcome {
            AppendOutcome::Appended(id) => id,
            other => panic!("unexpected outcome: {other:?}"),
        };
        assert_eq!(
            events.try_recv().unwrap(),
            SyncEvent::MessageAppended {
                id,
                kind: MessageKind::Agent
            }
        );
        assert_eq!(
            events.try_recv().unwrap(),
            SyncEvent::StatusChanged("done".to_string())
        );
        assert!(events.try_recv().is_err());
    }

    #[test]
    fn duplicate_publishes_nothing() {
        let state = SessionState::default();
        state.append_answer(&AnswerPayload::with_answer("hi"));
        let mut events = state.subscribe();

        state.append_answer(&AnswerPayload::with_answer("HI!"));

        assert!(events.try_recv().is_err());
        assert_eq!(state.messages().len(), 1);
    }

    #[test]
    fn online_flag_only_publishes_flips() {
        let state = SessionState::default();
        let mut events = state.subscribe();

        assert!(state.set_online(true));
        assert!(!state.set_online(true));
        assert!(state.sync_status().is_online);
        assert_eq!(
            events.try_recv().unwrap(),
            SyncEvent::ConnectivityChanged { online: true }
        );
        assert!(events.try_recv().is_err());
    }

    #[test]
    fn stale_ticket_does_not_clear_newer_query() {
        let state = SessionState::default();
        let first = state.begin_query("one");
        state.clear_pending();
        let second = state.begin_query("two");

        state.finish_query(first, None);
        assert!(state.sync_status().is_busy);
        assert_eq!(state.pending_query().unwrap().text, "two");

        state.finish_query(second, Some("Failed to process query."));
        let status = state.sync_status();
        assert!(!status.is_busy);
        assert_eq!(status.last_error.as_deref(), Some("Failed to process query."));
        assert!(state.pending_query().is_none());
    }

    #[test]
    fn stale_failure_does_not_leak_error_into_newer_query() {
        let state = SessionState::default();
        let first = state.begin_query("one");
        state.clear_pending();
        let second = state.begin_query("two");

        state.finish_query(first, Some("Failed to process query."));
        let status = state.sync_status();
        assert!(status.is_busy);
        assert!(status.last_error.is_none());

        state.finish_query(second, None);
        let status = state.sync_status();
        assert!(!status.is_busy);
        assert!(status.last_error.is_none());
    }

    #[test]
    fn begin_query_clears_previous_error() {
        let state = SessionState::default();
        let ticket = state.begin_query("one");
        state.finish_query(ticket, Some("boom"));

        state.begin_query("two");
        assert!(state.sync_status().last_error.is_none());
    }

    #[test]
    fn set_status_text_publishes_on_change() {
        let state = SessionState::default();
        let mut events = state.subscribe();

        state.set_status_text("Agents ready");
        assert!(events.try_recv().is_err());

        state.set_status_text("Requesting stop...");
        assert_eq!(state.status_text(), "Requesting stop...");
        assert_eq!(
            events.try_recv().unwrap(),
            SyncEvent::StatusChanged("Requesting stop...".to_string())
        );
    }
}
