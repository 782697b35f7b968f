use crate::core::models::{ChatMessage, Role};

/// Fixed instructions sent ahead of the transcript when summarizing.
pub const SUMMARY_INSTRUCTIONS: &str = "Write a concise, objective summary of the following \
customer-support conversation, highlighting the main points discussed and the overall sentiment.";

/// Requirements appended after the transcript.
pub const SUMMARY_REQUIREMENTS: [&str; 4] = [
    "Use at most 300 words",
    "Highlight the main topics",
    "Identify the overall sentiment of the conversation (positive, negative, neutral)",
    "Preserve information that is critical for future context",
];

/// Maximum characters of a single message kept in the transcript line.
pub const MAX_TRANSCRIPT_LINE_LEN: usize = 4000;

#[must_use]
pub const fn role_label(role: Role) -> &'static str {
    match role {
        Role::User => "Customer",
        Role::Assistant => "Agent",
        Role::System => "System",
    }
}

/// Flatten a message body onto one transcript line: line breaks become
/// spaces, other control characters are dropped, and the line is truncated.
#[must_use]
pub fn sanitize_transcript_line(raw: &str) -> String {
    raw.chars()
        .filter_map(|c| match c {
            '\n' | '\r' | '\t' => Some(' '),
            c if c.is_control() => None,
            c => Some(c),
        })
        .take(MAX_TRANSCRIPT_LINE_LEN)
        .collect::<String>()
        .trim()
        .to_string()
}

/// Numbered transcript, one `N. Label: content` line per message.
#[must_use]
pub fn format_transcript(messages: &[ChatMessage]) -> String {
    messages
        .iter()
        .enumerate()
        .map(|(index, msg)| {
            format!(
                "{}. {}: {}",
                index + 1,
                role_label(msg.role),
                sanitize_transcript_line(&msg.content)
            )
        })
        .collect::<Vec<_>>()
        .join("\n")
}

/// Full single-shot prompt for the completion service.
#[must_use]
pub fn build_summary_prompt(messages: &[ChatMessage]) -> String {
    let requirements = SUMMARY_REQUIREMENTS
        .iter()
        .enumerate()
        .map(|(i, r)| format!("{}. {}", i + 1, r))
        .collect::<Vec<_>>()
        .join("\n");

    format!(
        "{SUMMARY_INSTRUCTIONS}\n\n{}\n\nThe summary must:\n{requirements}",
        format_transcript(messages)
    )
}
