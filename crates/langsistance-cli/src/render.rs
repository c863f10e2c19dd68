//! Plain-text rendering of conversation entries.

use langsistance_core::{Message, MessageKind, SyncStatus};

/// Format a message for the terminal.
///
/// Agent messages show the agent name and, when `expanded`, their reasoning
/// indented under a marker line.
pub fn message(message: &Message, expanded: bool) -> String {
    let header = match message.kind {
        MessageKind::User => format!("[{}] you", message.id.get()),
        MessageKind::Agent => format!(
            "[{}] {}",
            message.id.get(),
            message.agent_name.as_deref().unwrap_or("agent")
        ),
        MessageKind::Error => format!("[{}] error", message.id.get()),
    };

    let mut out = format!("{header}: {}", message.content.trim_end());

    if message.is_agent() && message.has_reasoning() {
        if expanded {
            out.push_str("\n  ▼ reasoning");
            for line in message.reasoning.as_deref().unwrap_or_default().lines() {
                out.push_str("\n    ");
                out.push_str(line);
            }
        } else {
            out.push_str(&format!("\n  ▶ reasoning (/reasoning {})", message.id.get()));
        }
    }

    out
}

/// One-line summary of connectivity and agent status.
pub fn status_line(status: &SyncStatus, agent_status: &str) -> String {
    let connectivity = if status.is_online { "online" } else { "offline" };
    let mut line = format!("[{connectivity}] {agent_status}");
    if status.is_busy {
        line.push_str(" (waiting for response...)");
    }
    if let Some(error) = &status.last_error {
        line.push_str(&format!(" - {error}"));
    }
    line
}

#[cfg(test)]
mod tests {
    use super::*;
    use langsistance_core::{AnswerPayload, AppendOutcome, Conversation};

    fn agent_message(payload: &AnswerPayload) -> Message {
        let mut conversation = Conversation::default();
        match conversation.append_answer(payload) {
            AppendOutcome::Appended(id) => conversation.get(id).unwrap().clone(),
            other => panic!("unexpected outcome: {other:?}"),
        }
    }

    #[test]
    fn user_and_error_lines() {
        let mut conversation = Conversation::default();
        let user = conversation.push_user("What is 2+2?");
        let error = conversation.push_error("Error: Unable to get a response.");

        assert_eq!(message(conversation.get(user).unwrap(), false), "[0] you: What is 2+2?");
        assert_eq!(
            message(conversation.get(error).unwrap(), false),
            "[1] error: Error: Unable to get a response."
        );
    }

    #[test]
    fn collapsed_reasoning_shows_hint() {
        let msg = agent_message(
            &AnswerPayload::with_answer("4")
                .agent_name("Math Agent")
                .reasoning("2 plus 2"),
        );

        assert_eq!(
            message(&msg, false),
            "[0] Math Agent: 4\n  ▶ reasoning (/reasoning 0)"
        );
    }

    #[test]
    fn expanded_reasoning_is_indented() {
        let msg = agent_message(&AnswerPayload::with_answer("4").reasoning("add\ncarry"));

        assert_eq!(
            message(&msg, true),
            "[0] agent: 4\n  ▼ reasoning\n    add\n    carry"
        );
    }

    #[test]
    fn status_line_flags() {
        let status = SyncStatus {
            is_online: false,
            is_busy: true,
            last_error: Some("Failed to process query.".to_string()),
        };
        assert_eq!(
            status_line(&status, "Agents ready"),
            "[offline] Agents ready (waiting for response...) - Failed to process query."
        );
        assert_eq!(
            status_line(&SyncStatus { is_online: true, ..SyncStatus::default() }, "done"),
            "[online] done"
        );
    }
}
