//! HTTP handlers for the onboarding API

use std::sync::Arc;

use axum::{
    extract::{rejection::JsonRejection, Path, State},
    Json,
};
use base64::{engine::general_purpose::STANDARD as BASE64, Engine};
use onboarding_forms::{DocumentMetadata, FieldKey, FormInput, FormType};
use tracing::{debug, info};

use crate::error::ApiError;
use crate::models::*;
use crate::state::AppState;

/// Handler: GET /health
pub async fn health() -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "healthy",
        service: "onboarding-api",
        version: env!("CARGO_PKG_VERSION"),
    })
}

/// Handler: GET /api/forms
pub async fn list_forms() -> Json<ApiResponse<Vec<FormInfo>>> {
    let registry = AppState::registry();
    let forms = FormType::ALL
        .into_iter()
        .map(|form| FormInfo {
            form_type: form.as_str().to_string(),
            title: form.title().to_string(),
            template_file: form.template_file(),
            pages_required: registry.pages_required(form),
            signature_page: registry
                .spec(FieldKey::Signature(form))
                .ok()
                .map(|spec| spec.page),
            sections: registry
                .sections(form)
                .into_iter()
                .map(|section| SectionInfo {
                    label: section.label(),
                    fields: registry
                        .all_fields_for(section)
                        .into_iter()
                        .map(|spec| spec.name.clone())
                        .collect(),
                })
                .collect(),
        })
        .collect();

    Json(ApiResponse::ok(forms))
}

fn parse_form(form_type: &str) -> Result<FormType, ApiError> {
    form_type
        .parse()
        .map_err(|_| ApiError::UnknownForm(form_type.to_string()))
}

fn json_body<T>(body: Result<Json<T>, JsonRejection>) -> Result<T, ApiError> {
    body.map(|Json(value)| value)
        .map_err(|rejection| ApiError::InvalidRequest(rejection.body_text()))
}

async fn generate(
    state: Arc<AppState>,
    form_type: &str,
    body: Result<Json<serde_json::Value>, JsonRejection>,
    preview: bool,
) -> Result<Json<ApiResponse<DocumentResponse>>, ApiError> {
    let form = parse_form(form_type)?;
    let input = FormInput::from_json(form, json_body(body)?)?;
    debug!(form = %form, preview, employee = ?input.employee_id, "Generating form");

    // PDF work is synchronous and CPU-bound
    let doc = tokio::task::spawn_blocking(move || {
        let template = state.templates.load(form)?;
        state.engine().generate(&template, &input, preview)
    })
    .await??;

    info!(filename = %doc.filename, warnings = doc.warnings.len(), "Form generated");
    Ok(Json(ApiResponse::ok(doc.into())))
}

/// Handler: POST /api/forms/:form_type/preview
pub async fn preview_form(
    State(state): State<Arc<AppState>>,
    Path(form_type): Path<String>,
    body: Result<Json<serde_json::Value>, JsonRejection>,
) -> Result<Json<ApiResponse<DocumentResponse>>, ApiError> {
    generate(state, &form_type, body, true).await
}

/// Handler: POST /api/forms/:form_type/sign
pub async fn sign_form(
    State(state): State<Arc<AppState>>,
    Path(form_type): Path<String>,
    body: Result<Json<serde_json::Value>, JsonRejection>,
) -> Result<Json<ApiResponse<DocumentResponse>>, ApiError> {
    generate(state, &form_type, body, false).await
}

/// Handler: POST /api/forms/:form_type/signature
///
/// Signs a PDF the caller already holds, e.g. a preview generated earlier.
pub async fn add_signature(
    State(state): State<Arc<AppState>>,
    Path(form_type): Path<String>,
    body: Result<Json<SignatureRequest>, JsonRejection>,
) -> Result<Json<ApiResponse<DocumentResponse>>, ApiError> {
    let form = parse_form(&form_type)?;
    let request = json_body(body)?;
    let pdf = BASE64
        .decode(request.pdf.trim())
        .map_err(|e| ApiError::InvalidRequest(format!("Invalid PDF base64: {}", e)))?;

    let signed = tokio::task::spawn_blocking(move || {
        let signed = state.engine().compositor(form).add_signature(
            &pdf,
            &request.signature_data,
            request.signature_date.as_deref(),
            request.page,
        )?;
        let metadata = DocumentMetadata::describe(&signed, form, true)?;
        Ok::<_, onboarding_forms::FormError>((signed, metadata))
    })
    .await??;

    let (pdf, metadata) = signed;
    let filename = format!("{}_signed.pdf", form.as_str());
    info!(filename = %filename, "Signature added to uploaded document");
    Ok(Json(ApiResponse::ok(DocumentResponse::new(
        &pdf,
        filename,
        Vec::new(),
        metadata,
    ))))
}
