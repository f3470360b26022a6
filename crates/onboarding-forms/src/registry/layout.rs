//! Coordinates of the current template versions
//!
//! All templates are US Letter. Rectangles are in points with the origin at
//! the bottom-left corner of the page.

use super::keys::{
    BankBlock, BankField, DependentField, EmployeeField, FieldKey, I9Detail, PlanRow, W4Line,
};
use super::{FieldKind, FieldSpec, FormType, Rect};
use crate::model::{BenefitCategory, CitizenshipStatus, FilingStatus, Tier};

pub const PAGE_WIDTH: f64 = 612.0;
pub const PAGE_HEIGHT: f64 = 792.0;

/// Dependent rows printed on page 2 of the health insurance form
pub const DEPENDENT_ROWS: u8 = 4;

const LINE_HEIGHT: f64 = 16.0;
const BOX: f64 = 10.0;

// Tier columns shared by every benefit matrix
const TIER_COLUMNS: [f64; 4] = [300.0, 360.0, 420.0, 480.0];

fn text(key: FieldKey, page: u32, x0: f64, y0: f64, x1: f64) -> FieldSpec {
    FieldSpec::new(key, page, Rect::new(x0, y0, x1, y0 + LINE_HEIGHT), FieldKind::Text)
}

fn checkbox(key: FieldKey, page: u32, x0: f64, y0: f64) -> FieldSpec {
    FieldSpec::new(key, page, Rect::new(x0, y0, x0 + BOX, y0 + BOX), FieldKind::Checkbox)
}

fn signature(form: FormType, page: u32, x0: f64, y0: f64, x1: f64, y1: f64) -> [FieldSpec; 2] {
    // The date sits immediately to the right of the signature block
    let date_x0 = x1 + 20.0;
    [
        FieldSpec::new(
            FieldKey::Signature(form),
            page,
            Rect::new(x0, y0, x1, y1),
            FieldKind::Signature,
        ),
        text(FieldKey::SignatureDate(form), page, date_x0, y0, date_x0 + 100.0),
    ]
}

pub fn standard_fields() -> Vec<FieldSpec> {
    let mut fields = Vec::new();
    fields.extend(health_insurance());
    fields.extend(direct_deposit());
    fields.extend(w4());
    fields.extend(i9());
    fields
}

fn health_insurance() -> Vec<FieldSpec> {
    use EmployeeField::*;
    let form = FormType::HealthInsurance;
    let emp = |field| FieldKey::Employee(form, field);

    let mut fields = vec![
        text(emp(FullName), 1, 72.0, 700.0, 330.0),
        text(emp(Ssn), 1, 340.0, 700.0, 460.0),
        text(emp(DateOfBirth), 1, 470.0, 700.0, 560.0),
        text(emp(Address), 1, 72.0, 675.0, 330.0),
        text(emp(City), 1, 340.0, 675.0, 450.0),
        text(emp(State), 1, 455.0, 675.0, 490.0),
        text(emp(Zip), 1, 495.0, 675.0, 560.0),
        text(emp(Phone), 1, 72.0, 650.0, 230.0),
        text(emp(Email), 1, 240.0, 650.0, 560.0),
    ];

    // (category, y of the first plan row, y of the decline box)
    let matrices = [
        (BenefitCategory::Medical, 580.0, 515.0),
        (BenefitCategory::Dental, 460.0, 440.0),
        (BenefitCategory::Vision, 390.0, 370.0),
    ];
    for (category, first_row_y, decline_y) in matrices {
        for (row_index, row) in PlanRow::rows_for(category).into_iter().enumerate() {
            let y = first_row_y - 20.0 * row_index as f64;
            for (tier, x) in Tier::ALL.iter().zip(TIER_COLUMNS) {
                fields.push(checkbox(FieldKey::Coverage(row, *tier), 1, x, y));
            }
        }
        fields.push(checkbox(FieldKey::Decline(category), 1, 72.0, decline_y));
    }

    let columns = [
        (DependentField::Name, 72.0, 260.0),
        (DependentField::Relationship, 270.0, 370.0),
        (DependentField::DateOfBirth, 380.0, 470.0),
        (DependentField::Ssn, 480.0, 560.0),
    ];
    for row in 1..=DEPENDENT_ROWS {
        let y = 730.0 - 30.0 * row as f64;
        for (field, x0, x1) in columns {
            fields.push(text(FieldKey::Dependent(row, field), 2, x0, y, x1));
        }
    }

    fields.extend(signature(form, 2, 72.0, 150.0, 300.0, 190.0));
    fields
}

fn direct_deposit() -> Vec<FieldSpec> {
    use EmployeeField::*;
    let form = FormType::DirectDeposit;
    let emp = |field| FieldKey::Employee(form, field);

    let mut fields = vec![
        text(emp(FullName), 1, 72.0, 720.0, 330.0),
        text(emp(Ssn), 1, 340.0, 720.0, 460.0),
        text(emp(Phone), 1, 470.0, 720.0, 560.0),
    ];

    for block in BankBlock::ALL {
        let y = 640.0 - 140.0 * (block.number() - 1) as f64;
        let key = |field| FieldKey::Bank(block, field);
        fields.extend([
            text(key(BankField::BankName), 1, 72.0, y, 330.0),
            text(key(BankField::Routing), 1, 72.0, y - 25.0, 230.0),
            text(key(BankField::Account), 1, 240.0, y - 25.0, 430.0),
            checkbox(key(BankField::Checking), 1, 440.0, y - 23.0),
            checkbox(key(BankField::Savings), 1, 500.0, y - 23.0),
            text(key(BankField::Percentage), 1, 72.0, y - 50.0, 150.0),
            text(key(BankField::Amount), 1, 160.0, y - 50.0, 260.0),
            checkbox(key(BankField::EntireNet), 1, 280.0, y - 48.0),
            checkbox(key(BankField::Remainder), 1, 400.0, y - 48.0),
        ]);
    }

    fields.extend(signature(form, 1, 72.0, 150.0, 300.0, 190.0));
    fields
}

fn w4() -> Vec<FieldSpec> {
    use EmployeeField::*;
    let form = FormType::W4;
    let emp = |field| FieldKey::Employee(form, field);

    let mut fields = vec![
        text(emp(FirstAndInitial), 1, 72.0, 700.0, 250.0),
        text(emp(LastName), 1, 260.0, 700.0, 420.0),
        text(emp(Ssn), 1, 430.0, 700.0, 560.0),
        text(emp(Address), 1, 72.0, 675.0, 420.0),
        text(emp(CityStateZip), 1, 72.0, 650.0, 420.0),
        checkbox(FieldKey::FilingStatus(FilingStatus::Single), 1, 80.0, 620.0),
        checkbox(FieldKey::FilingStatus(FilingStatus::MarriedJointly), 1, 80.0, 605.0),
        checkbox(FieldKey::FilingStatus(FilingStatus::HeadOfHousehold), 1, 80.0, 590.0),
        checkbox(FieldKey::MultipleJobs, 1, 530.0, 540.0),
        text(FieldKey::W4Amount(W4Line::ChildrenCredit), 1, 380.0, 480.0, 460.0),
        text(FieldKey::W4Amount(W4Line::OtherDependentsCredit), 1, 380.0, 455.0, 460.0),
        text(FieldKey::W4Amount(W4Line::TotalCredits), 1, 480.0, 430.0, 560.0),
        text(FieldKey::W4Amount(W4Line::OtherIncome), 1, 480.0, 400.0, 560.0),
        text(FieldKey::W4Amount(W4Line::Deductions), 1, 480.0, 375.0, 560.0),
        text(FieldKey::W4Amount(W4Line::ExtraWithholding), 1, 480.0, 350.0, 560.0),
    ];

    fields.extend(signature(form, 1, 72.0, 260.0, 330.0, 290.0));
    fields
}

fn i9() -> Vec<FieldSpec> {
    use EmployeeField::*;
    let form = FormType::I9;
    let emp = |field| FieldKey::Employee(form, field);

    let mut fields = vec![
        text(emp(LastName), 1, 72.0, 700.0, 220.0),
        text(emp(FirstName), 1, 225.0, 700.0, 370.0),
        text(emp(MiddleInitial), 1, 375.0, 700.0, 410.0),
        text(emp(OtherLastNames), 1, 415.0, 700.0, 560.0),
        text(emp(Address), 1, 72.0, 675.0, 300.0),
        text(emp(AptNumber), 1, 305.0, 675.0, 350.0),
        text(emp(City), 1, 355.0, 675.0, 460.0),
        text(emp(State), 1, 465.0, 675.0, 495.0),
        text(emp(Zip), 1, 500.0, 675.0, 560.0),
        text(emp(DateOfBirth), 1, 72.0, 650.0, 170.0),
        text(emp(Ssn), 1, 175.0, 650.0, 300.0),
        text(emp(Email), 1, 305.0, 650.0, 460.0),
        text(emp(Phone), 1, 465.0, 650.0, 560.0),
        checkbox(FieldKey::Citizenship(CitizenshipStatus::Citizen), 1, 72.0, 610.0),
        checkbox(FieldKey::Citizenship(CitizenshipStatus::NoncitizenNational), 1, 72.0, 595.0),
        checkbox(FieldKey::Citizenship(CitizenshipStatus::PermanentResident), 1, 72.0, 580.0),
        checkbox(FieldKey::Citizenship(CitizenshipStatus::AuthorizedAlien), 1, 72.0, 565.0),
        FieldSpec::new(
            FieldKey::I9Detail(I9Detail::UscisNumber),
            1,
            Rect::new(300.0, 578.0, 450.0, 592.0),
            FieldKind::Text,
        ),
        FieldSpec::new(
            FieldKey::I9Detail(I9Detail::WorkAuthorizationExpiration),
            1,
            Rect::new(300.0, 563.0, 400.0, 577.0),
            FieldKind::Text,
        ),
        FieldSpec::new(
            FieldKey::I9Detail(I9Detail::AlienNumber),
            1,
            Rect::new(405.0, 563.0, 560.0, 577.0),
            FieldKind::Text,
        ),
        FieldSpec::new(
            FieldKey::I9Detail(I9Detail::I94Number),
            1,
            Rect::new(300.0, 548.0, 420.0, 562.0),
            FieldKind::Text,
        ),
        FieldSpec::new(
            FieldKey::I9Detail(I9Detail::ForeignPassport),
            1,
            Rect::new(425.0, 548.0, 560.0, 562.0),
            FieldKind::Text,
        ),
    ];

    fields.extend(signature(form, 1, 72.0, 480.0, 330.0, 510.0));
    fields
}
