use thiserror::Error;

use crate::registry::FormType;

#[derive(Error, Debug)]
pub enum FormError {
    #[error("Unknown field: {0}")]
    UnknownField(String),

    #[error("No signature field for {form} on page {page}")]
    UnknownSignatureField { form: FormType, page: u32 },

    #[error("Field registry conflict: {0}")]
    RegistryConflict(String),

    #[error("Template error: {0}")]
    Template(String),

    #[error("Invalid form input: {0}")]
    Validation(String),

    #[error("Too many deposit accounts: {0} supplied, template holds 3")]
    TooManyAccounts(usize),

    #[error("Signature is required to generate a signed document")]
    MissingSignature,

    #[error("Invalid signature date: {0}")]
    InvalidDate(String),

    #[error("Invalid signature image: {0}")]
    InvalidSignatureImage(String),

    /// A caller-supplied PDF that cannot be loaded or lacks the page asked for
    #[error("Invalid document: {0}")]
    InvalidDocument(String),

    #[error("PDF operation failed: {0}")]
    Pdf(String),
}

/// Coarse classification used by callers to pick a response status.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// Template and registry disagree. Fatal, never retried.
    Configuration,
    /// The caller supplied bad input.
    Validation,
    Internal,
}

impl FormError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            FormError::UnknownField(_)
            | FormError::UnknownSignatureField { .. }
            | FormError::RegistryConflict(_)
            | FormError::Template(_) => ErrorKind::Configuration,
            FormError::Validation(_)
            | FormError::TooManyAccounts(_)
            | FormError::MissingSignature
            | FormError::InvalidDate(_)
            | FormError::InvalidSignatureImage(_)
            | FormError::InvalidDocument(_) => ErrorKind::Validation,
            FormError::Pdf(_) => ErrorKind::Internal,
        }
    }

    /// Stable machine-readable code for response bodies.
    pub fn code(&self) -> &'static str {
        match self {
            FormError::UnknownField(_) => "UNKNOWN_FIELD",
            FormError::UnknownSignatureField { .. } => "UNKNOWN_SIGNATURE_FIELD",
            FormError::RegistryConflict(_) => "REGISTRY_CONFLICT",
            FormError::Template(_) => "TEMPLATE_ERROR",
            FormError::Validation(_) => "VALIDATION_ERROR",
            FormError::TooManyAccounts(_) => "TOO_MANY_ACCOUNTS",
            FormError::MissingSignature => "MISSING_SIGNATURE",
            FormError::InvalidDate(_) => "INVALID_DATE",
            FormError::InvalidSignatureImage(_) => "INVALID_SIGNATURE_IMAGE",
            FormError::InvalidDocument(_) => "INVALID_DOCUMENT",
            FormError::Pdf(_) => "PDF_ERROR",
        }
    }
}

impl From<lopdf::Error> for FormError {
    fn from(err: lopdf::Error) -> Self {
        FormError::Pdf(err.to_string())
    }
}
