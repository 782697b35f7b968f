use ticket_relay::core::models::ChatMessage;
use ticket_relay::prompt::{
    MAX_TRANSCRIPT_LINE_LEN, SUMMARY_INSTRUCTIONS, build_summary_prompt, format_transcript,
    sanitize_transcript_line,
};

#[test]
fn test_format_transcript_numbers_and_labels() {
    let messages = vec![
        ChatMessage::user("Hi, my card was charged twice"),
        ChatMessage::assistant("Let me check that for you"),
        ChatMessage::system("Ticket moved to Billing"),
    ];
    assert_eq!(
        format_transcript(&messages),
        "1. Customer: Hi, my card was charged twice\n\
         2. Agent: Let me check that for you\n\
         3. System: Ticket moved to Billing"
    );
}

#[test]
fn test_sanitize_transcript_line() {
    assert_eq!(
        sanitize_transcript_line("line one\nline two\u{0000}"),
        "line one line two"
    );
    let long_input = "a".repeat(MAX_TRANSCRIPT_LINE_LEN + 10);
    assert_eq!(
        sanitize_transcript_line(&long_input).len(),
        MAX_TRANSCRIPT_LINE_LEN
    );
}

#[test]
fn test_build_summary_prompt_contains_rules() {
    let prompt = build_summary_prompt(&[ChatMessage::user("Where is my order?")]);
    assert!(prompt.starts_with(SUMMARY_INSTRUCTIONS));
    assert!(prompt.contains("1. Customer: Where is my order?"));
    assert!(prompt.contains("at most 300 words"));
    assert!(prompt.contains("positive, negative, neutral"));
}
