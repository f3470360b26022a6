//! Form W-4 withholding elections

use crate::actions::Resolution;
use crate::error::FormError;
use crate::model::W4Data;
use crate::registry::{FieldKey, W4Line};

use super::{format_currency, MAX_AMOUNT};

/// Step 3 credit per qualifying child under 17
pub const CHILD_CREDIT: f64 = 2000.0;
/// Step 3 credit per other dependent
pub const OTHER_DEPENDENT_CREDIT: f64 = 500.0;

fn non_negative(value: f64, label: &str) -> Result<f64, FormError> {
    if !value.is_finite() || !(0.0..MAX_AMOUNT).contains(&value) {
        return Err(FormError::Validation(format!(
            "W-4 {} must be a non-negative amount below {}, got {}",
            label,
            format_currency(MAX_AMOUNT),
            value
        )));
    }
    Ok(value)
}

pub fn resolve(data: &W4Data) -> Result<Resolution, FormError> {
    let mut resolution = Resolution::new();

    resolution.check(FieldKey::FilingStatus(data.filing_status));
    if data.multiple_jobs {
        resolution.check(FieldKey::MultipleJobs);
    }

    let children = f64::from(data.qualifying_children) * CHILD_CREDIT;
    let others = f64::from(data.other_dependents) * OTHER_DEPENDENT_CREDIT;
    if children > 0.0 {
        resolution.write(
            FieldKey::W4Amount(W4Line::ChildrenCredit),
            format_currency(children),
        );
    }
    if others > 0.0 {
        resolution.write(
            FieldKey::W4Amount(W4Line::OtherDependentsCredit),
            format_currency(others),
        );
    }
    if children + others > 0.0 {
        resolution.write(
            FieldKey::W4Amount(W4Line::TotalCredits),
            format_currency(children + others),
        );
    }

    let step4 = [
        (W4Line::OtherIncome, data.other_income, "other income"),
        (W4Line::Deductions, data.deductions, "deductions"),
        (W4Line::ExtraWithholding, data.extra_withholding, "extra withholding"),
    ];
    for (line, value, label) in step4 {
        if non_negative(value, label)? > 0.0 {
            resolution.write(FieldKey::W4Amount(line), format_currency(value));
        }
    }

    Ok(resolution)
}
