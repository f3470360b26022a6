//! Typed field keys
//!
//! A [`FieldKey`] names one stamping location on one template. Its string
//! form (`bank2_routing`, `medical_hra6k_employee`, ...) is what audit logs
//! and stored documents refer to, so `name()` must stay stable across
//! template versions.

use serde::Serialize;

use super::FormType;
use crate::model::{BenefitCategory, CitizenshipStatus, FilingStatus, MedicalPlan, Tier};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum EmployeeField {
    FullName,
    FirstName,
    FirstAndInitial,
    MiddleInitial,
    LastName,
    OtherLastNames,
    Ssn,
    DateOfBirth,
    Address,
    AptNumber,
    City,
    State,
    Zip,
    CityStateZip,
    Phone,
    Email,
}

impl EmployeeField {
    pub fn code(&self) -> &'static str {
        match self {
            EmployeeField::FullName => "employee_name",
            EmployeeField::FirstName => "first_name",
            EmployeeField::FirstAndInitial => "first_name_mi",
            EmployeeField::MiddleInitial => "middle_initial",
            EmployeeField::LastName => "last_name",
            EmployeeField::OtherLastNames => "other_last_names",
            EmployeeField::Ssn => "ssn",
            EmployeeField::DateOfBirth => "date_of_birth",
            EmployeeField::Address => "address",
            EmployeeField::AptNumber => "apt_number",
            EmployeeField::City => "city",
            EmployeeField::State => "state",
            EmployeeField::Zip => "zip",
            EmployeeField::CityStateZip => "city_state_zip",
            EmployeeField::Phone => "phone",
            EmployeeField::Email => "email",
        }
    }
}

/// One row of a benefit matrix
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum PlanRow {
    Medical(MedicalPlan),
    Dental,
    Vision,
}

impl PlanRow {
    pub fn category(&self) -> BenefitCategory {
        match self {
            PlanRow::Medical(_) => BenefitCategory::Medical,
            PlanRow::Dental => BenefitCategory::Dental,
            PlanRow::Vision => BenefitCategory::Vision,
        }
    }

    fn prefix(&self) -> String {
        match self {
            PlanRow::Medical(plan) => format!("medical_{}", plan.code()),
            PlanRow::Dental => "dental".to_string(),
            PlanRow::Vision => "vision".to_string(),
        }
    }

    /// Every plan row offered for a category, top to bottom
    pub fn rows_for(category: BenefitCategory) -> Vec<PlanRow> {
        match category {
            BenefitCategory::Medical => MedicalPlan::ALL.iter().map(|p| PlanRow::Medical(*p)).collect(),
            BenefitCategory::Dental => vec![PlanRow::Dental],
            BenefitCategory::Vision => vec![PlanRow::Vision],
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum DependentField {
    Name,
    Relationship,
    DateOfBirth,
    Ssn,
}

impl DependentField {
    pub const ALL: [DependentField; 4] = [
        DependentField::Name,
        DependentField::Relationship,
        DependentField::DateOfBirth,
        DependentField::Ssn,
    ];

    fn code(&self) -> &'static str {
        match self {
            DependentField::Name => "name",
            DependentField::Relationship => "relationship",
            DependentField::DateOfBirth => "dob",
            DependentField::Ssn => "ssn",
        }
    }
}

/// The three bank blocks printed on the direct deposit template
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
pub enum BankBlock {
    First,
    Second,
    Third,
}

impl BankBlock {
    pub const ALL: [BankBlock; 3] = [BankBlock::First, BankBlock::Second, BankBlock::Third];

    /// 1-based position on the template
    pub fn number(&self) -> u8 {
        match self {
            BankBlock::First => 1,
            BankBlock::Second => 2,
            BankBlock::Third => 3,
        }
    }

    pub fn from_index(index: usize) -> Option<BankBlock> {
        Self::ALL.get(index).copied()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum BankField {
    BankName,
    Routing,
    Account,
    Checking,
    Savings,
    Percentage,
    Amount,
    EntireNet,
    Remainder,
}

impl BankField {
    pub const ALL: [BankField; 9] = [
        BankField::BankName,
        BankField::Routing,
        BankField::Account,
        BankField::Checking,
        BankField::Savings,
        BankField::Percentage,
        BankField::Amount,
        BankField::EntireNet,
        BankField::Remainder,
    ];

    fn code(&self) -> &'static str {
        match self {
            BankField::BankName => "name",
            BankField::Routing => "routing",
            BankField::Account => "account",
            BankField::Checking => "checking",
            BankField::Savings => "savings",
            BankField::Percentage => "percentage",
            BankField::Amount => "amount",
            BankField::EntireNet => "entire_net",
            BankField::Remainder => "remainder",
        }
    }
}

/// Dollar lines on steps 3 and 4 of the W-4
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum W4Line {
    ChildrenCredit,
    OtherDependentsCredit,
    TotalCredits,
    OtherIncome,
    Deductions,
    ExtraWithholding,
}

impl W4Line {
    fn code(&self) -> &'static str {
        match self {
            W4Line::ChildrenCredit => "step3_children",
            W4Line::OtherDependentsCredit => "step3_other",
            W4Line::TotalCredits => "step3_total",
            W4Line::OtherIncome => "step4a_other_income",
            W4Line::Deductions => "step4b_deductions",
            W4Line::ExtraWithholding => "step4c_extra_withholding",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum I9Detail {
    UscisNumber,
    WorkAuthorizationExpiration,
    AlienNumber,
    I94Number,
    ForeignPassport,
}

impl I9Detail {
    fn code(&self) -> &'static str {
        match self {
            I9Detail::UscisNumber => "uscis_number",
            I9Detail::WorkAuthorizationExpiration => "work_authorization_expiration",
            I9Detail::AlienNumber => "alien_number",
            I9Detail::I94Number => "i94_number",
            I9Detail::ForeignPassport => "foreign_passport",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum FieldKey {
    Employee(FormType, EmployeeField),
    Coverage(PlanRow, Tier),
    Decline(BenefitCategory),
    /// Dependent row, 1-based
    Dependent(u8, DependentField),
    Bank(BankBlock, BankField),
    FilingStatus(FilingStatus),
    MultipleJobs,
    W4Amount(W4Line),
    Citizenship(CitizenshipStatus),
    I9Detail(I9Detail),
    Signature(FormType),
    SignatureDate(FormType),
}

impl FieldKey {
    pub fn name(&self) -> String {
        match self {
            FieldKey::Employee(form, field) => format!("{}_{}", form.field_prefix(), field.code()),
            FieldKey::Coverage(row, tier) => format!("{}_{}", row.prefix(), tier.code()),
            FieldKey::Decline(category) => format!("{}_decline", category.as_str()),
            FieldKey::Dependent(row, field) => format!("dependent{}_{}", row, field.code()),
            FieldKey::Bank(block, field) => format!("bank{}_{}", block.number(), field.code()),
            FieldKey::FilingStatus(status) => format!(
                "w4_filing_{}",
                match status {
                    FilingStatus::Single => "single",
                    FilingStatus::MarriedJointly => "married_jointly",
                    FilingStatus::HeadOfHousehold => "head_of_household",
                }
            ),
            FieldKey::MultipleJobs => "w4_multiple_jobs".to_string(),
            FieldKey::W4Amount(line) => format!("w4_{}", line.code()),
            FieldKey::Citizenship(status) => format!(
                "i9_{}",
                match status {
                    CitizenshipStatus::Citizen => "citizen",
                    CitizenshipStatus::NoncitizenNational => "noncitizen_national",
                    CitizenshipStatus::PermanentResident => "permanent_resident",
                    CitizenshipStatus::AuthorizedAlien => "authorized_alien",
                }
            ),
            FieldKey::I9Detail(detail) => format!("i9_{}", detail.code()),
            FieldKey::Signature(form) => format!("{}_signature", form.field_prefix()),
            FieldKey::SignatureDate(form) => format!("{}_signature_date", form.field_prefix()),
        }
    }

    pub fn section(&self) -> Section {
        match self {
            FieldKey::Employee(form, _) => Section::Employee(*form),
            FieldKey::Coverage(row, _) => Section::Benefit(row.category()),
            FieldKey::Decline(category) => Section::Benefit(*category),
            FieldKey::Dependent(..) => Section::Dependents,
            FieldKey::Bank(block, _) => Section::Bank(*block),
            FieldKey::FilingStatus(_) | FieldKey::MultipleJobs => Section::W4Withholding,
            FieldKey::W4Amount(_) => Section::W4Amounts,
            FieldKey::Citizenship(_) | FieldKey::I9Detail(_) => Section::I9Attestation,
            FieldKey::Signature(form) | FieldKey::SignatureDate(form) => Section::Signature(*form),
        }
    }

    pub fn form(&self) -> FormType {
        self.section().form()
    }

    pub fn is_signature(&self) -> bool {
        matches!(self, FieldKey::Signature(_) | FieldKey::SignatureDate(_))
    }
}

/// Logical group of fields on one template
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum Section {
    Employee(FormType),
    Benefit(BenefitCategory),
    Dependents,
    Bank(BankBlock),
    W4Withholding,
    W4Amounts,
    I9Attestation,
    Signature(FormType),
}

impl Section {
    pub fn form(&self) -> FormType {
        match self {
            Section::Employee(form) | Section::Signature(form) => *form,
            Section::Benefit(_) | Section::Dependents => FormType::HealthInsurance,
            Section::Bank(_) => FormType::DirectDeposit,
            Section::W4Withholding | Section::W4Amounts => FormType::W4,
            Section::I9Attestation => FormType::I9,
        }
    }

    pub fn label(&self) -> String {
        match self {
            Section::Employee(_) => "employee".to_string(),
            Section::Benefit(category) => category.as_str().to_string(),
            Section::Dependents => "dependents".to_string(),
            Section::Bank(block) => format!("bank{}", block.number()),
            Section::W4Withholding => "withholding".to_string(),
            Section::W4Amounts => "amounts".to_string(),
            Section::I9Attestation => "attestation".to_string(),
            Section::Signature(_) => "signature".to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_names_follow_template_conventions() {
        assert_eq!(
            FieldKey::Bank(BankBlock::First, BankField::Routing).name(),
            "bank1_routing"
        );
        assert_eq!(
            FieldKey::Coverage(PlanRow::Medical(MedicalPlan::Hra6k), Tier::Employee).name(),
            "medical_hra6k_employee"
        );
        assert_eq!(
            FieldKey::Coverage(PlanRow::Dental, Tier::Family).name(),
            "dental_family"
        );
        assert_eq!(
            FieldKey::Decline(BenefitCategory::Vision).name(),
            "vision_decline"
        );
        assert_eq!(
            FieldKey::Dependent(2, DependentField::DateOfBirth).name(),
            "dependent2_dob"
        );
        assert_eq!(
            FieldKey::Signature(FormType::HealthInsurance).name(),
            "health_signature"
        );
    }

    #[test]
    fn test_sections_belong_to_forms() {
        assert_eq!(
            FieldKey::Decline(BenefitCategory::Dental).form(),
            FormType::HealthInsurance
        );
        assert_eq!(
            FieldKey::Bank(BankBlock::Third, BankField::Amount).form(),
            FormType::DirectDeposit
        );
        assert_eq!(FieldKey::MultipleJobs.form(), FormType::W4);
        assert_eq!(
            FieldKey::I9Detail(I9Detail::AlienNumber).form(),
            FormType::I9
        );
    }
}
