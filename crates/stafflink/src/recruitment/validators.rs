//! Input validation shared by the public and back-office flows.

use crate::config::UploadConfig;
use crate::recruitment::domain::DocumentType;

/// Field-aware validation failure.
#[derive(Debug, thiserror::Error)]
#[error("{message}")]
pub struct ValidationError {
    pub message: String,
    pub field: Option<&'static str>,
}

impl ValidationError {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            field: None,
        }
    }

    pub fn for_field(message: impl Into<String>, field: &'static str) -> Self {
        Self {
            message: message.into(),
            field: Some(field),
        }
    }
}

/// Normalize and validate a document number for the given type.
///
/// DNI numbers are exactly 8 digits; CE numbers are 9 or 12 characters.
pub fn validate_document(
    document_type: DocumentType,
    document_number: &str,
) -> Result<String, ValidationError> {
    let normalized = document_number.trim().to_uppercase();
    match document_type {
        DocumentType::Dni => {
            if normalized.len() != 8 || !normalized.chars().all(|ch| ch.is_ascii_digit()) {
                return Err(ValidationError::for_field(
                    "DNI must be exactly 8 digits.",
                    "document_number",
                ));
            }
        }
        DocumentType::Ce => {
            if normalized.len() != 9 && normalized.len() != 12 {
                return Err(ValidationError::for_field(
                    "CE must be 9 or 12 characters.",
                    "document_number",
                ));
            }
        }
    }
    Ok(normalized)
}

/// Enforce the configured upload size and extension limits.
pub fn validate_upload(
    config: &UploadConfig,
    original_name: &str,
    size_bytes: u64,
) -> Result<(), ValidationError> {
    if size_bytes > config.max_size_bytes {
        return Err(ValidationError::for_field(
            "File exceeds the allowed size.",
            "file",
        ));
    }

    let extension = original_name
        .rsplit_once('.')
        .map(|(_, ext)| ext.to_ascii_lowercase())
        .unwrap_or_default();
    if !config.allowed_extensions.iter().any(|allowed| *allowed == extension) {
        return Err(ValidationError::for_field(
            "File type is not allowed.",
            "file",
        ));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn upload_config() -> UploadConfig {
        UploadConfig {
            max_size_bytes: 1024,
            allowed_extensions: vec!["pdf".to_string(), "jpg".to_string()],
        }
    }

    #[test]
    fn dni_requires_exactly_eight_digits() {
        assert_eq!(
            validate_document(DocumentType::Dni, "87654321").expect("valid dni"),
            "87654321"
        );
        assert!(validate_document(DocumentType::Dni, "1234567").is_err());
        assert!(validate_document(DocumentType::Dni, "123456789").is_err());
        assert!(validate_document(DocumentType::Dni, "8765432a").is_err());
    }

    #[test]
    fn ce_accepts_nine_or_twelve_characters() {
        assert_eq!(
            validate_document(DocumentType::Ce, "abc123def").expect("valid ce"),
            "ABC123DEF"
        );
        assert!(validate_document(DocumentType::Ce, "abc123def456").is_ok());
        assert!(validate_document(DocumentType::Ce, "abc1234").is_err());
        assert!(validate_document(DocumentType::Ce, "abc123def4").is_err());
    }

    #[test]
    fn document_numbers_are_uppercased() {
        let normalized = validate_document(DocumentType::Ce, "ce8812733").expect("valid ce");
        assert_eq!(normalized, "CE8812733");
    }

    #[test]
    fn upload_rejects_oversize_and_unknown_extensions() {
        let config = upload_config();
        assert!(validate_upload(&config, "scan.pdf", 512).is_ok());
        assert!(validate_upload(&config, "scan.pdf", 2048).is_err());
        assert!(validate_upload(&config, "scan.exe", 10).is_err());
        assert!(validate_upload(&config, "no-extension", 10).is_err());
    }
}
