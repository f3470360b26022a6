//! Field Registry
//!
//! Static mapping from typed field keys to their page and rectangle on each
//! template. The registry is pure data: it is built once per process and
//! shared read-only across requests.

mod keys;
mod layout;

pub use keys::{
    BankBlock, BankField, DependentField, EmployeeField, FieldKey, I9Detail, PlanRow, Section,
    W4Line,
};
pub use layout::{standard_fields, DEPENDENT_ROWS, PAGE_HEIGHT, PAGE_WIDTH};

use std::collections::HashMap;
use std::fmt;
use std::str::FromStr;

use lazy_static::lazy_static;
use serde::{Deserialize, Serialize};

use crate::error::FormError;

lazy_static! {
    static ref STANDARD_REGISTRY: FieldRegistry = FieldRegistry::from_specs(standard_fields());
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FormType {
    HealthInsurance,
    DirectDeposit,
    W4,
    I9,
}

impl FormType {
    pub const ALL: [FormType; 4] = [
        FormType::HealthInsurance,
        FormType::DirectDeposit,
        FormType::W4,
        FormType::I9,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            FormType::HealthInsurance => "health_insurance",
            FormType::DirectDeposit => "direct_deposit",
            FormType::W4 => "w4",
            FormType::I9 => "i9",
        }
    }

    /// Prefix used in field names belonging to this form
    pub fn field_prefix(&self) -> &'static str {
        match self {
            FormType::HealthInsurance => "health",
            FormType::DirectDeposit => "deposit",
            FormType::W4 => "w4",
            FormType::I9 => "i9",
        }
    }

    pub fn template_file(&self) -> String {
        format!("{}.pdf", self.as_str())
    }

    pub fn title(&self) -> &'static str {
        match self {
            FormType::HealthInsurance => "Health Insurance Enrollment",
            FormType::DirectDeposit => "Direct Deposit Authorization",
            FormType::W4 => "Form W-4",
            FormType::I9 => "Form I-9 Section 1",
        }
    }
}

impl fmt::Display for FormType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for FormType {
    type Err = FormError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().replace('-', "_").as_str() {
            "health_insurance" | "health" => Ok(FormType::HealthInsurance),
            "direct_deposit" | "deposit" => Ok(FormType::DirectDeposit),
            "w4" | "w_4" => Ok(FormType::W4),
            "i9" | "i_9" => Ok(FormType::I9),
            other => Err(FormError::Validation(format!("Unknown form type: {}", other))),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum FieldKind {
    Text,
    Checkbox,
    Signature,
}

/// Rectangle in PDF user space (origin bottom-left, points)
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Rect {
    pub x0: f64,
    pub y0: f64,
    pub x1: f64,
    pub y1: f64,
}

impl Rect {
    pub fn new(x0: f64, y0: f64, x1: f64, y1: f64) -> Self {
        Self {
            x0: x0.min(x1),
            y0: y0.min(y1),
            x1: x0.max(x1),
            y1: y0.max(y1),
        }
    }

    pub fn width(&self) -> f64 {
        self.x1 - self.x0
    }

    pub fn height(&self) -> f64 {
        self.y1 - self.y0
    }

    /// Interiors intersect; touching edges do not count
    pub fn overlaps(&self, other: &Rect) -> bool {
        self.x0 < other.x1 && other.x0 < self.x1 && self.y0 < other.y1 && other.y0 < self.y1
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FieldSpec {
    #[serde(skip)]
    pub key: FieldKey,
    pub name: String,
    /// 1-based page number
    pub page: u32,
    pub rect: Rect,
    pub kind: FieldKind,
}

impl FieldSpec {
    pub fn new(key: FieldKey, page: u32, rect: Rect, kind: FieldKind) -> Self {
        Self {
            name: key.name(),
            key,
            page,
            rect,
            kind,
        }
    }

    pub fn section(&self) -> Section {
        self.key.section()
    }

    pub fn form(&self) -> FormType {
        self.key.form()
    }
}

#[derive(Debug, Clone)]
pub struct FieldRegistry {
    specs: Vec<FieldSpec>,
    by_key: HashMap<FieldKey, usize>,
    by_name: HashMap<String, usize>,
}

impl FieldRegistry {
    /// Index `specs`. The first spec wins on duplicate keys or names;
    /// [`FieldRegistry::validate`] reports them.
    pub fn from_specs(specs: Vec<FieldSpec>) -> Self {
        let mut by_key = HashMap::with_capacity(specs.len());
        let mut by_name = HashMap::with_capacity(specs.len());
        for (index, spec) in specs.iter().enumerate() {
            by_key.entry(spec.key).or_insert(index);
            by_name.entry(spec.name.clone()).or_insert(index);
        }
        Self {
            specs,
            by_key,
            by_name,
        }
    }

    /// Layout of the current template versions
    pub fn standard() -> &'static FieldRegistry {
        &STANDARD_REGISTRY
    }

    pub fn len(&self) -> usize {
        self.specs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.specs.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &FieldSpec> {
        self.specs.iter()
    }

    pub fn lookup(&self, field_name: &str) -> Result<&FieldSpec, FormError> {
        self.by_name
            .get(field_name)
            .map(|&i| &self.specs[i])
            .ok_or_else(|| FormError::UnknownField(field_name.to_string()))
    }

    pub fn spec(&self, key: FieldKey) -> Result<&FieldSpec, FormError> {
        self.by_key
            .get(&key)
            .map(|&i| &self.specs[i])
            .ok_or_else(|| FormError::UnknownField(key.name()))
    }

    pub fn contains(&self, key: FieldKey) -> bool {
        self.by_key.contains_key(&key)
    }

    pub fn all_fields_for(&self, section: Section) -> Vec<&FieldSpec> {
        self.specs.iter().filter(|s| s.section() == section).collect()
    }

    /// Sections of a form in template order
    pub fn sections(&self, form: FormType) -> Vec<Section> {
        let mut sections = Vec::new();
        for spec in self.specs.iter().filter(|s| s.form() == form) {
            let section = spec.section();
            if !sections.contains(&section) {
                sections.push(section);
            }
        }
        sections
    }

    /// Signature rectangle of `form`, which must sit on `page`
    pub fn signature_field(&self, form: FormType, page: u32) -> Result<&FieldSpec, FormError> {
        match self.by_key.get(&FieldKey::Signature(form)) {
            Some(&i) if self.specs[i].page == page => Ok(&self.specs[i]),
            _ => Err(FormError::UnknownSignatureField { form, page }),
        }
    }

    /// Highest page any field of `form` is placed on
    pub fn pages_required(&self, form: FormType) -> u32 {
        self.specs
            .iter()
            .filter(|s| s.form() == form)
            .map(|s| s.page)
            .max()
            .unwrap_or(0)
    }

    /// Reject duplicate keys/names and overlapping rectangles within a
    /// form page.
    pub fn validate(&self) -> Result<(), FormError> {
        if self.by_name.len() != self.specs.len() || self.by_key.len() != self.specs.len() {
            let mut seen = HashMap::new();
            for spec in &self.specs {
                if let Some(prev) = seen.insert(spec.name.as_str(), spec) {
                    return Err(FormError::RegistryConflict(format!(
                        "duplicate field name {}",
                        prev.name
                    )));
                }
            }
            return Err(FormError::RegistryConflict(
                "duplicate field key".to_string(),
            ));
        }

        for (i, a) in self.specs.iter().enumerate() {
            if a.page == 0 || a.rect.width() <= 0.0 || a.rect.height() <= 0.0 {
                return Err(FormError::RegistryConflict(format!(
                    "{} has an empty rectangle or page 0",
                    a.name
                )));
            }
            for b in &self.specs[i + 1..] {
                if a.form() == b.form() && a.page == b.page && a.rect.overlaps(&b.rect) {
                    return Err(FormError::RegistryConflict(format!(
                        "{} overlaps {} on {} page {}",
                        a.name,
                        b.name,
                        a.form(),
                        a.page
                    )));
                }
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{BenefitCategory, MedicalPlan, Tier};

    #[test]
    fn test_standard_registry_is_consistent() {
        FieldRegistry::standard().validate().unwrap();
    }

    #[test]
    fn test_lookup_by_name() {
        let registry = FieldRegistry::standard();
        let spec = registry.lookup("bank1_routing").unwrap();
        assert_eq!(spec.key, FieldKey::Bank(BankBlock::First, BankField::Routing));
        assert_eq!(spec.kind, FieldKind::Text);
        assert_eq!(spec.form(), FormType::DirectDeposit);
    }

    #[test]
    fn test_lookup_unknown_name_fails() {
        let err = FieldRegistry::standard().lookup("bank4_routing").unwrap_err();
        assert!(matches!(err, FormError::UnknownField(name) if name == "bank4_routing"));
    }

    #[test]
    fn test_medical_matrix_is_three_by_four() {
        let fields = FieldRegistry::standard().all_fields_for(Section::Benefit(BenefitCategory::Medical));
        let boxes: Vec<_> = fields
            .iter()
            .filter(|s| matches!(s.key, FieldKey::Coverage(..)))
            .collect();
        assert_eq!(boxes.len(), MedicalPlan::ALL.len() * Tier::ALL.len());
        assert!(fields
            .iter()
            .any(|s| s.key == FieldKey::Decline(BenefitCategory::Medical)));
    }

    #[test]
    fn test_signature_fields_differ_per_form() {
        let registry = FieldRegistry::standard();
        let health = registry.signature_field(FormType::HealthInsurance, 2).unwrap();
        let w4 = registry.signature_field(FormType::W4, 1).unwrap();
        assert_ne!(health.rect, w4.rect);
        assert_eq!(health.kind, FieldKind::Signature);
    }

    #[test]
    fn test_signature_on_wrong_page_fails() {
        let err = FieldRegistry::standard()
            .signature_field(FormType::HealthInsurance, 1)
            .unwrap_err();
        assert!(matches!(
            err,
            FormError::UnknownSignatureField {
                form: FormType::HealthInsurance,
                page: 1
            }
        ));
    }

    #[test]
    fn test_validate_catches_overlap() {
        let registry = FieldRegistry::from_specs(vec![
            FieldSpec::new(
                FieldKey::Bank(BankBlock::First, BankField::Routing),
                1,
                Rect::new(72.0, 600.0, 200.0, 616.0),
                FieldKind::Text,
            ),
            FieldSpec::new(
                FieldKey::Bank(BankBlock::First, BankField::Account),
                1,
                Rect::new(150.0, 605.0, 300.0, 620.0),
                FieldKind::Text,
            ),
        ]);
        let err = registry.validate().unwrap_err();
        assert!(err.to_string().contains("bank1_routing overlaps bank1_account"));
    }

    #[test]
    fn test_same_rect_on_different_forms_is_allowed() {
        let rect = Rect::new(72.0, 150.0, 300.0, 190.0);
        let registry = FieldRegistry::from_specs(vec![
            FieldSpec::new(
                FieldKey::Signature(FormType::W4),
                1,
                rect,
                FieldKind::Signature,
            ),
            FieldSpec::new(
                FieldKey::Signature(FormType::I9),
                1,
                rect,
                FieldKind::Signature,
            ),
        ]);
        registry.validate().unwrap();
    }

    #[test]
    fn test_pages_required() {
        let registry = FieldRegistry::standard();
        assert_eq!(registry.pages_required(FormType::HealthInsurance), 2);
        assert_eq!(registry.pages_required(FormType::DirectDeposit), 1);
    }

    #[test]
    fn test_form_type_parsing() {
        assert_eq!("health-insurance".parse::<FormType>().unwrap(), FormType::HealthInsurance);
        assert_eq!("W-4".parse::<FormType>().unwrap(), FormType::W4);
        assert!("1099".parse::<FormType>().is_err());
    }
}
