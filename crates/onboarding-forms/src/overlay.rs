//! Form Overlay Engine

use chrono::{DateTime, Utc};
use lopdf::Document;
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use tracing::{debug, info, warn};

use crate::actions::StampAction;
use crate::dates::{format_us, resolve_signature_date, DatePolicy};
use crate::error::FormError;
use crate::forms;
use crate::model::FormInput;
use crate::registry::{FieldKey, FieldRegistry, FormType};
use crate::signature::{SignatureCompositor, SignatureImage};
use crate::stamp::{stamp, StampStyle};

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct EngineConfig {
    pub date_policy: DatePolicy,
    pub style: StampStyle,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DocumentMetadata {
    pub form_type: FormType,
    pub page_count: u32,
    pub signed: bool,
    /// Hex SHA-256 of the output bytes
    pub sha256: String,
    pub generated_at: DateTime<Utc>,
}

/// A filled form
#[derive(Debug, Clone)]
pub struct GeneratedDocument {
    pub pdf: Vec<u8>,
    pub filename: String,
    pub warnings: Vec<String>,
    pub actions: Vec<StampAction>,
    pub metadata: DocumentMetadata,
}

impl DocumentMetadata {
    pub fn describe(pdf: &[u8], form_type: FormType, signed: bool) -> Result<Self, FormError> {
        let page_count = Document::load_mem(pdf)?.get_pages().len() as u32;
        Ok(Self {
            form_type,
            page_count,
            signed,
            sha256: hex::encode(Sha256::digest(pdf)),
            generated_at: Utc::now(),
        })
    }
}

/// `w4_emp_1042_signed.pdf`
pub fn document_filename(input: &FormInput, signed: bool) -> String {
    let owner = input
        .employee_id
        .clone()
        .or_else(|| {
            input
                .personal_info
                .as_ref()
                .map(|info| info.full_name())
                .filter(|name| !name.is_empty())
        })
        .unwrap_or_else(|| "employee".to_string());
    let kind = if signed { "signed" } else { "preview" };

    let stem: String = format!("{}_{}_{}", input.form_type().as_str(), owner, kind)
        .to_lowercase()
        .chars()
        .map(|c| if c.is_ascii_alphanumeric() { c } else { '_' })
        .collect();
    format!("{}.pdf", stem)
}

/// Fills templates from [`FormInput`]
#[derive(Debug, Clone)]
pub struct OverlayEngine<'a> {
    registry: &'a FieldRegistry,
    config: EngineConfig,
}

impl<'a> OverlayEngine<'a> {
    pub fn new(registry: &'a FieldRegistry, config: EngineConfig) -> Self {
        Self { registry, config }
    }

    pub fn registry(&self) -> &FieldRegistry {
        self.registry
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    pub fn compositor(&self, form: FormType) -> SignatureCompositor<'a> {
        SignatureCompositor::new(self.registry, form, self.config.date_policy)
            .with_style(self.config.style.clone())
    }

    /// Stamp `input` onto `template`. With `preview = false` the signature
    /// block is required and composited after stamping.
    pub fn generate(
        &self,
        template: &[u8],
        input: &FormInput,
        preview: bool,
    ) -> Result<GeneratedDocument, FormError> {
        let form = input.form_type();

        // Signing requirements are checked before any work is done
        let signing = if preview {
            None
        } else {
            let block = input
                .signature
                .as_ref()
                .filter(|s| !s.signature_data.trim().is_empty())
                .ok_or(FormError::MissingSignature)?;
            let date = resolve_signature_date(block.signed_date.as_deref(), self.config.date_policy)?;
            let image = SignatureImage::from_base64(&block.signature_data)?;
            Some((date, image))
        };

        let resolution = forms::resolve(input, self.registry)?;
        let mut actions = resolution.actions;
        let mut warnings = resolution.warnings;

        let (mut pdf, render_warnings) =
            stamp(template, &actions, self.registry, &self.config.style)?;
        warnings.extend(render_warnings);

        if let Some((date, image)) = signing {
            let page = self.registry.spec(FieldKey::Signature(form))?.page;
            pdf = self.compositor(form).composite(&pdf, &image, date, page)?;
            let date_action = StampAction::write(FieldKey::SignatureDate(form), format_us(date));
            debug!(field = %date_action.field_name, value = ?date_action.value, "Stamped signature date");
            actions.push(date_action);
        }

        for warning in &warnings {
            warn!(form = %form, "{}", warning);
        }

        let signed = !preview;
        let metadata = DocumentMetadata::describe(&pdf, form, signed)?;
        info!(
            form = %form,
            pages = metadata.page_count,
            signed,
            actions = actions.len(),
            warnings = warnings.len(),
            "Generated document"
        );

        Ok(GeneratedDocument {
            pdf,
            filename: document_filename(input, signed),
            warnings,
            actions,
            metadata,
        })
    }
}
