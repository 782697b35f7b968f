use once_cell::sync::Lazy;
use regex::{Captures, Regex};

use crate::core::models::Contact;

static PLACEHOLDER: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\{\{\s*([A-Za-z]+)\s*\}\}").expect("static regex compile"));

/// Render contact placeholders (`{{name}}`, `{{firstName}}`, `{{number}}`) in an
/// outbound body. Unknown placeholders are left untouched.
#[must_use]
pub fn format_body(body: &str, contact: &Contact) -> String {
    PLACEHOLDER
        .replace_all(body, |caps: &Captures| match &caps[1] {
            "name" => contact.name.trim().to_string(),
            "firstName" => contact
                .name
                .split_whitespace()
                .next()
                .unwrap_or_default()
                .to_string(),
            "number" => contact.number.clone(),
            _ => caps[0].to_string(),
        })
        .into_owned()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_body_substitutes_known_placeholders() {
        let contact = Contact {
            name: "Maria Silva".to_string(),
            number: "5511999".to_string(),
            ..Contact::default()
        };
        assert_eq!(
            format_body("Hi {{ firstName }}, ticket for {{name}} ({{number}}) {{queue}}", &contact),
            "Hi Maria, ticket for Maria Silva (5511999) {{queue}}"
        );
    }

    #[test]
    fn test_format_body_without_placeholders_is_unchanged() {
        let contact = Contact::default();
        assert_eq!(format_body("plain text", &contact), "plain text");
    }
}
