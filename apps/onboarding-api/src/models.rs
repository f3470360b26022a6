//! Request and response bodies for the onboarding API

use onboarding_forms::{DocumentMetadata, GeneratedDocument};
use serde::{Deserialize, Serialize};

use base64::{engine::general_purpose::STANDARD as BASE64, Engine};

/// Successful response envelope
#[derive(Debug, Serialize)]
pub struct ApiResponse<T> {
    pub success: bool,
    pub data: T,
}

impl<T> ApiResponse<T> {
    pub fn ok(data: T) -> Self {
        Self {
            success: true,
            data,
        }
    }
}

/// Health check response
#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub status: &'static str,
    pub service: &'static str,
    pub version: &'static str,
}

/// A generated PDF ready for download
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DocumentResponse {
    /// Base64-encoded PDF
    pub pdf: String,
    pub filename: String,
    pub warnings: Vec<String>,
    pub metadata: DocumentMetadata,
}

impl DocumentResponse {
    pub fn new(pdf: &[u8], filename: String, warnings: Vec<String>, metadata: DocumentMetadata) -> Self {
        Self {
            pdf: BASE64.encode(pdf),
            filename,
            warnings,
            metadata,
        }
    }
}

impl From<GeneratedDocument> for DocumentResponse {
    fn from(doc: GeneratedDocument) -> Self {
        Self::new(&doc.pdf, doc.filename, doc.warnings, doc.metadata)
    }
}

/// Body of `POST /api/forms/:form_type/signature`
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct SignatureRequest {
    /// Base64-encoded PDF to sign
    pub pdf: String,
    /// Base64 PNG, optionally as a data URL
    pub signature_data: String,
    #[serde(default)]
    pub signature_date: Option<String>,
    pub page: u32,
}

/// Entry of `GET /api/forms`
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FormInfo {
    pub form_type: String,
    pub title: String,
    pub template_file: String,
    pub pages_required: u32,
    pub signature_page: Option<u32>,
    pub sections: Vec<SectionInfo>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SectionInfo {
    pub label: String,
    pub fields: Vec<String>,
}
