//! Mention-text command parsing.

/// A recognized "health report" command.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HealthCommand {
    /// Target repository name, lowercased.
    pub target: String,
}

/// Parse a mention's text into a command.
///
/// The text is lowercased and split on whitespace; the first token is the
/// mention marker itself. A report is requested when at least three tokens
/// are present and either exactly three tokens are present or the second
/// token contains "health" (inclusive OR). Anything shorter is "no command
/// recognized", never an error.
pub fn parse_command(text: &str) -> Option<HealthCommand> {
    let text = text.to_lowercase();
    let tokens: Vec<&str> = text.split_whitespace().collect();
    if tokens.len() < 3 {
        return None;
    }
    if tokens.len() == 3 || tokens[1].contains("health") {
        return Some(HealthCommand {
            target: tokens[2].to_string(),
        });
    }
    None
}
