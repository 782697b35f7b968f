//! MIME utilities shared across modules

/// MIME type for an outbound document, guessed from its file name.
#[must_use]
pub fn document_mime(file_name: &str) -> String {
    mime_guess::from_path(file_name)
        .first_or_octet_stream()
        .essence_str()
        .to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_document_mime() {
        assert_eq!(document_mime("invoice-a1b2c.pdf"), "application/pdf");
        assert_eq!(document_mime("no-extension"), "application/octet-stream");
    }
}
