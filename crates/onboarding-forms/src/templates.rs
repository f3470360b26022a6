//! Blank form templates on disk

use std::fs;
use std::path::{Path, PathBuf};

use lopdf::Document;
use tracing::{info, warn};

use crate::error::FormError;
use crate::page::blank_document;
use crate::registry::{FieldRegistry, FormType};

/// A plain Letter document with `pages` empty pages
pub fn blank_template(pages: u32) -> Result<Vec<u8>, FormError> {
    if pages == 0 {
        return Err(FormError::Template(
            "a template needs at least one page".to_string(),
        ));
    }
    let mut buffer = Vec::new();
    blank_document(pages)
        .save_to(&mut buffer)
        .map_err(|e| FormError::Pdf(e.to_string()))?;
    Ok(buffer)
}

/// Directory holding one `<form>.pdf` per form type
#[derive(Debug, Clone)]
pub struct TemplateStore {
    dir: PathBuf,
}

impl TemplateStore {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    pub fn path_for(&self, form: FormType) -> PathBuf {
        self.dir.join(form.template_file())
    }

    pub fn load(&self, form: FormType) -> Result<Vec<u8>, FormError> {
        let path = self.path_for(form);
        fs::read(&path)
            .map_err(|e| FormError::Template(format!("cannot read {}: {}", path.display(), e)))
    }

    /// Every template exists, parses, and has the pages its fields need
    pub fn verify(&self, registry: &FieldRegistry) -> Result<(), FormError> {
        for form in FormType::ALL {
            let bytes = self.load(form)?;
            let doc = Document::load_mem(&bytes).map_err(|e| {
                FormError::Template(format!("{} is not a valid PDF: {}", form.template_file(), e))
            })?;

            let pages = doc.get_pages().len() as u32;
            let required = registry.pages_required(form);
            if pages < required {
                return Err(FormError::Template(format!(
                    "{} has {} page(s) but fields are placed on page {}",
                    form.template_file(),
                    pages,
                    required
                )));
            }
            info!(form = %form, pages, "Template verified");
        }
        Ok(())
    }

    /// Write a blank template for each missing form. Returns the forms written.
    pub fn write_missing_blank(&self, registry: &FieldRegistry) -> Result<Vec<FormType>, FormError> {
        fs::create_dir_all(&self.dir).map_err(|e| {
            FormError::Template(format!("cannot create {}: {}", self.dir.display(), e))
        })?;

        let mut written = Vec::new();
        for form in FormType::ALL {
            let path = self.path_for(form);
            if path.exists() {
                continue;
            }
            let pages = registry.pages_required(form).max(1);
            fs::write(&path, blank_template(pages)?).map_err(|e| {
                FormError::Template(format!("cannot write {}: {}", path.display(), e))
            })?;
            warn!(form = %form, path = %path.display(), "Wrote blank placeholder template");
            written.push(form);
        }
        Ok(written)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn test_blank_template_rejects_zero_pages() {
        assert!(blank_template(0).is_err());
        let pdf = blank_template(2).unwrap();
        assert_eq!(Document::load_mem(&pdf).unwrap().get_pages().len(), 2);
    }

    #[test]
    fn test_missing_templates_fail_verification() {
        let dir = tempdir().unwrap();
        let store = TemplateStore::new(dir.path());
        let err = store.verify(FieldRegistry::standard()).unwrap_err();
        assert!(matches!(err, FormError::Template(_)));
    }

    #[test]
    fn test_write_missing_then_verify() {
        let dir = tempdir().unwrap();
        let store = TemplateStore::new(dir.path());
        let registry = FieldRegistry::standard();

        let written = store.write_missing_blank(registry).unwrap();
        assert_eq!(written.len(), FormType::ALL.len());
        store.verify(registry).unwrap();

        // Second run leaves existing files alone
        assert!(store.write_missing_blank(registry).unwrap().is_empty());
    }

    #[test]
    fn test_short_template_fails_verification() {
        let dir = tempdir().unwrap();
        let store = TemplateStore::new(dir.path());
        let registry = FieldRegistry::standard();
        store.write_missing_blank(registry).unwrap();

        // Health insurance dependents and signature live on page 2
        fs::write(
            store.path_for(FormType::HealthInsurance),
            blank_template(1).unwrap(),
        )
        .unwrap();
        let err = store.verify(registry).unwrap_err();
        assert!(err.to_string().contains("health_insurance.pdf"));
    }

    #[test]
    fn test_garbage_template_is_rejected() {
        let dir = tempdir().unwrap();
        let store = TemplateStore::new(dir.path());
        store.write_missing_blank(FieldRegistry::standard()).unwrap();
        fs::write(store.path_for(FormType::W4), b"not a pdf").unwrap();
        assert!(store.verify(FieldRegistry::standard()).is_err());
    }
}
