//! Session events for front ends.

use langsistance_core::{MessageId, MessageKind};

/// A change to session state, published after the change is applied.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SyncEvent {
    /// A message was appended to the conversation.
    MessageAppended {
        /// ID of the new message.
        id: MessageId,
        /// Who produced it.
        kind: MessageKind,
    },
    /// The displayed agent status changed.
    StatusChanged(String),
    /// The health probe flipped the online flag.
    ConnectivityChanged {
        /// New online state.
        online: bool,
    },
    /// A query started or stopped being outstanding.
    BusyChanged {
        /// New busy state.
        busy: bool,
    },
}
