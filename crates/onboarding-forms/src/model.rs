//! Typed request payloads for each onboarding form
//!
//! Every struct rejects unknown fields so drift between the frontend and the
//! overlay engine surfaces as a validation error instead of a blank box on a
//! signed government form.

use serde::{Deserialize, Serialize};

use crate::error::FormError;
use crate::registry::FormType;

/// Employee identity shared by every form
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields, default)]
pub struct PersonalInfo {
    pub first_name: String,
    pub middle_initial: String,
    pub last_name: String,
    pub other_last_names: String,
    pub ssn: String,
    pub date_of_birth: String,
    pub address: String,
    pub apt_number: String,
    pub city: String,
    pub state: String,
    pub zip_code: String,
    pub phone: String,
    pub email: String,
}

impl PersonalInfo {
    pub fn full_name(&self) -> String {
        join_non_empty(&[&self.first_name, &self.middle_initial, &self.last_name], " ")
    }

    pub fn first_and_initial(&self) -> String {
        join_non_empty(&[&self.first_name, &self.middle_initial], " ")
    }

    /// "City, ST 12345" with missing parts dropped
    pub fn city_state_zip(&self) -> String {
        let region = join_non_empty(&[&self.state, &self.zip_code], " ");
        join_non_empty(&[&self.city, &region], ", ")
    }
}

fn join_non_empty(parts: &[&str], sep: &str) -> String {
    parts
        .iter()
        .map(|p| p.trim())
        .filter(|p| !p.is_empty())
        .collect::<Vec<_>>()
        .join(sep)
}

/// Captured signature attached to a signing request
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct SignatureBlock {
    /// Base64 PNG, optionally as a `data:image/png;base64,` URL
    pub signature_data: String,
    #[serde(default, alias = "signatureDate")]
    pub signed_date: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BenefitCategory {
    Medical,
    Dental,
    Vision,
}

impl BenefitCategory {
    pub const ALL: [BenefitCategory; 3] = [
        BenefitCategory::Medical,
        BenefitCategory::Dental,
        BenefitCategory::Vision,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            BenefitCategory::Medical => "medical",
            BenefitCategory::Dental => "dental",
            BenefitCategory::Vision => "vision",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum MedicalPlan {
    #[serde(rename = "hra_2k", alias = "hra2k")]
    Hra2k,
    #[serde(rename = "hra_4k", alias = "hra4k")]
    Hra4k,
    #[serde(rename = "hra_6k", alias = "hra6k")]
    Hra6k,
}

impl MedicalPlan {
    pub const ALL: [MedicalPlan; 3] = [MedicalPlan::Hra2k, MedicalPlan::Hra4k, MedicalPlan::Hra6k];

    pub fn code(&self) -> &'static str {
        match self {
            MedicalPlan::Hra2k => "hra2k",
            MedicalPlan::Hra4k => "hra4k",
            MedicalPlan::Hra6k => "hra6k",
        }
    }
}

/// Coverage tier, one column of each benefit matrix
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Tier {
    #[serde(alias = "employee_only")]
    Employee,
    #[serde(alias = "employee_plus_spouse")]
    EmployeeSpouse,
    #[serde(alias = "employee_plus_children")]
    EmployeeChildren,
    Family,
}

impl Tier {
    pub const ALL: [Tier; 4] = [
        Tier::Employee,
        Tier::EmployeeSpouse,
        Tier::EmployeeChildren,
        Tier::Family,
    ];

    pub fn code(&self) -> &'static str {
        match self {
            Tier::Employee => "employee",
            Tier::EmployeeSpouse => "employee_spouse",
            Tier::EmployeeChildren => "employee_children",
            Tier::Family => "family",
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields, default)]
pub struct Dependent {
    pub first_name: String,
    pub last_name: String,
    pub relationship: String,
    pub date_of_birth: String,
    pub ssn: String,
    pub has_medical: bool,
    pub has_dental: bool,
    pub has_vision: bool,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields, default)]
pub struct HealthInsuranceData {
    pub medical_plan: Option<MedicalPlan>,
    pub medical_tier: Option<Tier>,
    pub medical_waived: bool,
    pub dental_tier: Option<Tier>,
    pub dental_waived: bool,
    pub vision_tier: Option<Tier>,
    pub vision_waived: bool,
    pub dependents: Vec<Dependent>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DepositType {
    Full,
    Partial,
    Split,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AccountType {
    #[default]
    Checking,
    Savings,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields, default)]
pub struct BankAccount {
    pub bank_name: String,
    pub routing_number: String,
    pub account_number: String,
    pub account_type: AccountType,
    /// Only read from the primary account
    pub deposit_type: Option<DepositType>,
    pub percentage: Option<f64>,
    pub amount: Option<f64>,
}

impl BankAccount {
    pub fn is_empty(&self) -> bool {
        self.bank_name.trim().is_empty()
            && self.routing_number.trim().is_empty()
            && self.account_number.trim().is_empty()
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct DirectDepositData {
    pub primary_account: BankAccount,
    #[serde(default)]
    pub additional_accounts: Vec<BankAccount>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FilingStatus {
    #[serde(alias = "married_filing_separately")]
    Single,
    #[serde(alias = "married")]
    MarriedJointly,
    HeadOfHousehold,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct W4Data {
    pub filing_status: FilingStatus,
    #[serde(default)]
    pub multiple_jobs: bool,
    #[serde(default)]
    pub qualifying_children: u32,
    #[serde(default)]
    pub other_dependents: u32,
    #[serde(default)]
    pub other_income: f64,
    #[serde(default)]
    pub deductions: f64,
    #[serde(default)]
    pub extra_withholding: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CitizenshipStatus {
    Citizen,
    NoncitizenNational,
    PermanentResident,
    AuthorizedAlien,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct I9Data {
    pub citizenship_status: CitizenshipStatus,
    #[serde(default)]
    pub uscis_number: Option<String>,
    #[serde(default)]
    pub alien_number: Option<String>,
    #[serde(default)]
    pub work_authorization_expiration: Option<String>,
    #[serde(default)]
    pub i94_number: Option<String>,
    #[serde(default)]
    pub foreign_passport_number: Option<String>,
    #[serde(default)]
    pub passport_country: Option<String>,
}

/// Per-form payload
#[derive(Debug, Clone, PartialEq)]
pub enum FormData {
    HealthInsurance(HealthInsuranceData),
    DirectDeposit(DirectDepositData),
    W4(W4Data),
    I9(I9Data),
}

impl FormData {
    pub fn form_type(&self) -> FormType {
        match self {
            FormData::HealthInsurance(_) => FormType::HealthInsurance,
            FormData::DirectDeposit(_) => FormType::DirectDeposit,
            FormData::W4(_) => FormType::W4,
            FormData::I9(_) => FormType::I9,
        }
    }
}

/// Everything needed to fill one form for one employee
#[derive(Debug, Clone, PartialEq)]
pub struct FormInput {
    pub employee_id: Option<String>,
    pub personal_info: Option<PersonalInfo>,
    pub signature: Option<SignatureBlock>,
    pub data: FormData,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
struct RawFormInput {
    #[serde(default)]
    employee_id: Option<String>,
    #[serde(default)]
    personal_info: Option<PersonalInfo>,
    #[serde(default)]
    signature: Option<SignatureBlock>,
    form: serde_json::Value,
}

impl FormInput {
    pub fn new(data: FormData) -> Self {
        Self {
            employee_id: None,
            personal_info: None,
            signature: None,
            data,
        }
    }

    pub fn form_type(&self) -> FormType {
        self.data.form_type()
    }

    /// Decode a request body of shape
    /// `{employeeId?, personalInfo?, signature?, form: {...}}` for `form_type`.
    pub fn from_json(form_type: FormType, value: serde_json::Value) -> Result<Self, FormError> {
        let raw: RawFormInput = serde_json::from_value(value)
            .map_err(|e| FormError::Validation(e.to_string()))?;

        let data = match form_type {
            FormType::HealthInsurance => {
                FormData::HealthInsurance(decode_section(form_type, raw.form)?)
            }
            FormType::DirectDeposit => FormData::DirectDeposit(decode_section(form_type, raw.form)?),
            FormType::W4 => FormData::W4(decode_section(form_type, raw.form)?),
            FormType::I9 => FormData::I9(decode_section(form_type, raw.form)?),
        };

        Ok(Self {
            employee_id: raw.employee_id.filter(|id| !id.trim().is_empty()),
            personal_info: raw.personal_info,
            signature: raw.signature,
            data,
        })
    }
}

fn decode_section<T: serde::de::DeserializeOwned>(
    form_type: FormType,
    value: serde_json::Value,
) -> Result<T, FormError> {
    serde_json::from_value(value)
        .map_err(|e| FormError::Validation(format!("{} form: {}", form_type, e)))
}
