//! Per-form resolution of input data into stamp actions

pub mod deposit;
pub mod health;
pub mod i9;
pub mod w4;

use crate::actions::Resolution;
use crate::dates::display_date;
use crate::error::FormError;
use crate::model::{FormData, FormInput, PersonalInfo};
use crate::registry::{EmployeeField, FieldKey, FieldRegistry, FormType, Section};

pub const NO_PERSONAL_INFO: &str = "no personal info supplied, using blank defaults";

/// Dollar amounts at or above this are rejected before they reach `format_currency`
pub const MAX_AMOUNT: f64 = 1e12;

/// Resolve every non-signature action for `input`
pub fn resolve(input: &FormInput, registry: &FieldRegistry) -> Result<Resolution, FormError> {
    let mut resolution =
        employee_actions(input.form_type(), input.personal_info.as_ref(), registry);

    let form = match &input.data {
        FormData::HealthInsurance(data) => health::resolve(data)?,
        FormData::DirectDeposit(data) => deposit::resolve(data)?,
        FormData::W4(data) => w4::resolve(data)?,
        FormData::I9(data) => i9::resolve(data)?,
    };
    resolution.merge(form);
    Ok(resolution)
}

/// Identity writes for whichever employee fields the form's template carries
fn employee_actions(
    form: FormType,
    info: Option<&PersonalInfo>,
    registry: &FieldRegistry,
) -> Resolution {
    let mut resolution = Resolution::new();
    let Some(info) = info else {
        resolution.warn(NO_PERSONAL_INFO);
        return resolution;
    };

    for spec in registry.all_fields_for(Section::Employee(form)) {
        if let FieldKey::Employee(_, field) = spec.key {
            resolution.write(spec.key, employee_value(info, field));
        }
    }
    resolution
}

fn employee_value(info: &PersonalInfo, field: EmployeeField) -> String {
    match field {
        EmployeeField::FullName => info.full_name(),
        EmployeeField::FirstName => info.first_name.clone(),
        EmployeeField::FirstAndInitial => info.first_and_initial(),
        EmployeeField::MiddleInitial => info.middle_initial.clone(),
        EmployeeField::LastName => info.last_name.clone(),
        EmployeeField::OtherLastNames => info.other_last_names.clone(),
        EmployeeField::Ssn => info.ssn.clone(),
        EmployeeField::DateOfBirth => display_date(&info.date_of_birth),
        EmployeeField::Address => info.address.clone(),
        EmployeeField::AptNumber => info.apt_number.clone(),
        EmployeeField::City => info.city.clone(),
        EmployeeField::State => info.state.clone(),
        EmployeeField::Zip => info.zip_code.clone(),
        EmployeeField::CityStateZip => info.city_state_zip(),
        EmployeeField::Phone => info.phone.clone(),
        EmployeeField::Email => info.email.clone(),
    }
}

/// `60`, `62.5`, `33.33`
pub fn format_percentage(value: f64) -> String {
    let formatted = format!("{:.2}", value);
    formatted
        .trim_end_matches('0')
        .trim_end_matches('.')
        .to_string()
}

/// `1,250.00`
pub fn format_currency(value: f64) -> String {
    let cents = (value * 100.0).round() as i64;
    let sign = if cents < 0 { "-" } else { "" };
    let cents = cents.abs();
    let whole = (cents / 100).to_string();

    let mut grouped = String::with_capacity(whole.len() + whole.len() / 3);
    for (i, ch) in whole.chars().enumerate() {
        if i > 0 && (whole.len() - i) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(ch);
    }
    format!("{}{}.{:02}", sign, grouped, cents % 100)
}
