//! Input line parsing.

use langsistance_core::MessageId;

/// What a line of user input asks for.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    /// Submit the text as a query.
    Query(String),
    /// Ask the backend to stop.
    Stop,
    /// Toggle the reasoning panel of a message.
    ToggleReasoning(MessageId),
    /// Print connectivity and status.
    Status,
    /// Print the whole conversation.
    History,
    /// Print the command list.
    Help,
    /// Leave the client.
    Quit,
    /// Blank line.
    Nothing,
    /// A slash command that could not be understood.
    Invalid(String),
}

impl Command {
    /// Parse one input line.
    pub fn parse(line: &str) -> Self {
        let trimmed = line.trim();
        if trimmed.is_empty() {
            return Self::Nothing;
        }

        let Some(rest) = trimmed.strip_prefix('/') else {
            return Self::Query(line.trim_end_matches(['\r', '\n']).to_string());
        };

        let mut parts = rest.split_whitespace();
        match (parts.next(), parts.next(), parts.next()) {
            (Some("stop"), None, _) => Self::Stop,
            (Some("status"), None, _) => Self::Status,
            (Some("history"), None, _) => Self::History,
            (Some("help"), None, _) => Self::Help,
            (Some("quit" | "exit"), None, _) => Self::Quit,
            (Some("reasoning" | "r"), Some(n), None) => match n.trim_start_matches('#').parse::<u64>() {
                Ok(n) => Self::ToggleReasoning(MessageId::new(n)),
                Err(_) => Self::Invalid(format!("not a message number: {n}")),
            },
            (Some("reasoning" | "r"), _, _) => Self::Invalid("usage: /reasoning <n>".to_string()),
            _ => Self::Invalid(format!("unknown command: /{rest}")),
        }
    }
}

/// Help text for the slash commands.
pub const HELP: &str = "\
Type a question and press Enter to send it.
  /stop           ask the agent to stop
  /reasoning <n>  show or hide the reasoning of message n
  /status         show connection and agent status
  /history        print the conversation
  /quit           leave";

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn plain_text_is_a_query() {
        assert_eq!(
            Command::parse("What is 2+2?\n"),
            Command::Query("What is 2+2?".to_string())
        );
    }

    #[test]
    fn blank_line_is_nothing() {
        assert_eq!(Command::parse("   \n"), Command::Nothing);
    }

    #[test]
    fn slash_commands() {
        assert_eq!(Command::parse("/stop"), Command::Stop);
        assert_eq!(Command::parse(" /status "), Command::Status);
        assert_eq!(Command::parse("/exit"), Command::Quit);
        assert_eq!(Command::parse("/history"), Command::History);
        assert_eq!(
            Command::parse("/reasoning #3"),
            Command::ToggleReasoning(MessageId::new(3))
        );
        assert_eq!(Command::parse("/r 0"), Command::ToggleReasoning(MessageId::new(0)));
    }

    #[test]
    fn bad_commands_are_invalid() {
        assert!(matches!(Command::parse("/reasoning x"), Command::Invalid(_)));
        assert!(matches!(Command::parse("/reasoning"), Command::Invalid(_)));
        assert!(matches!(Command::parse("/stop now"), Command::Invalid(_)));
        assert!(matches!(Command::parse("/dance"), Command::Invalid(_)));
    }
}
