//! File-name helpers for document sends.

use uuid::Uuid;

/// Characters that are not allowed in generated file names.
pub const ILLEGAL_FILE_NAME_CHARS: [char; 9] = ['\\', '/', ':', '"', '*', '?', '<', '>', '|'];

pub const FILE_NAME_PLACEHOLDER: char = '-';

pub const RANDOM_SUFFIX_LEN: usize = 5;

/// Replace characters that are illegal in file names with `-`.
#[must_use]
pub fn sanitize_caption(caption: &str) -> String {
    caption
        .chars()
        .map(|c| {
            if ILLEGAL_FILE_NAME_CHARS.contains(&c) {
                FILE_NAME_PLACEHOLDER
            } else {
                c
            }
        })
        .collect()
}

/// Short random alphanumeric suffix for generated file names.
#[must_use]
pub fn random_suffix() -> String {
    Uuid::new_v4()
        .simple()
        .to_string()
        .chars()
        .take(RANDOM_SUFFIX_LEN)
        .collect()
}
