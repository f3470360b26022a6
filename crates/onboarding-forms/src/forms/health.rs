//! Health insurance enrollment: benefit matrices and dependents

use crate::actions::Resolution;
use crate::dates::display_date;
use crate::error::FormError;
use crate::model::{BenefitCategory, Dependent, HealthInsuranceData, Tier};
use crate::registry::{DependentField, FieldKey, PlanRow, DEPENDENT_ROWS};

/// What the form records for one benefit category
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Election {
    NotSelected,
    Waived,
    Enrolled(PlanRow, Tier),
}

impl Election {
    /// The single box this election marks, if any
    pub fn checkbox(&self, category: BenefitCategory) -> Option<FieldKey> {
        match self {
            Election::NotSelected => None,
            Election::Waived => Some(FieldKey::Decline(category)),
            Election::Enrolled(row, tier) => Some(FieldKey::Coverage(*row, *tier)),
        }
    }
}

/// Decide the election for `category`. A waiver wins over any plan or tier
/// supplied alongside it.
pub fn election(
    data: &HealthInsuranceData,
    category: BenefitCategory,
    resolution: &mut Resolution,
) -> Election {
    let name = category.as_str();
    let (waived, row, tier) = match category {
        BenefitCategory::Medical => (
            data.medical_waived,
            data.medical_plan.map(PlanRow::Medical),
            data.medical_tier,
        ),
        BenefitCategory::Dental => (data.dental_waived, Some(PlanRow::Dental), data.dental_tier),
        BenefitCategory::Vision => (data.vision_waived, Some(PlanRow::Vision), data.vision_tier),
    };

    if waived {
        let plan_given = category == BenefitCategory::Medical && data.medical_plan.is_some();
        if tier.is_some() || plan_given {
            resolution.warn(format!(
                "{} coverage waived; ignoring the selected plan and tier",
                name
            ));
        }
        return Election::Waived;
    }

    match (row, tier) {
        (Some(row), Some(tier)) => Election::Enrolled(row, tier),
        (Some(_), None) if category == BenefitCategory::Medical => {
            resolution.warn("medical plan selected without a tier; no medical box marked");
            Election::NotSelected
        }
        (None, Some(_)) => {
            resolution.warn("medical tier selected without a plan; no medical box marked");
            Election::NotSelected
        }
        _ => {
            resolution.warn(format!(
                "no {} election; neither enrollment nor decline marked",
                name
            ));
            Election::NotSelected
        }
    }
}

/// Dependent name as printed, with coverage markers appended:
/// `"Jane Doe (M,V)"`.
pub fn dependent_display_name(dependent: &Dependent) -> String {
    let name = [dependent.first_name.trim(), dependent.last_name.trim()]
        .iter()
        .filter(|p| !p.is_empty())
        .copied()
        .collect::<Vec<_>>()
        .join(" ");

    let markers: Vec<&str> = [
        (dependent.has_medical, "M"),
        (dependent.has_dental, "D"),
        (dependent.has_vision, "V"),
    ]
    .iter()
    .filter(|(covered, _)| *covered)
    .map(|(_, marker)| *marker)
    .collect();

    if markers.is_empty() {
        name
    } else {
        format!("{} ({})", name, markers.join(","))
    }
}

fn has_name(dependent: &Dependent) -> bool {
    !dependent.first_name.trim().is_empty() || !dependent.last_name.trim().is_empty()
}

fn covers(dependent: &Dependent, category: BenefitCategory) -> bool {
    match category {
        BenefitCategory::Medical => dependent.has_medical,
        BenefitCategory::Dental => dependent.has_dental,
        BenefitCategory::Vision => dependent.has_vision,
    }
}

pub fn resolve(data: &HealthInsuranceData) -> Result<Resolution, FormError> {
    let mut resolution = Resolution::new();

    for category in BenefitCategory::ALL {
        let election = election(data, category, &mut resolution);
        if let Some(key) = election.checkbox(category) {
            resolution.check(key);
        }

        let dependents_covered = data.dependents.iter().any(|d| covers(d, category));
        match election {
            Election::Enrolled(_, Tier::Employee) if dependents_covered => {
                resolution.warn(format!(
                    "dependents marked for {} coverage but the {} tier is employee only",
                    category.as_str(),
                    category.as_str()
                ));
            }
            Election::Waived if dependents_covered => {
                resolution.warn(format!(
                    "dependents marked for {} coverage but {} is waived",
                    category.as_str(),
                    category.as_str()
                ));
            }
            _ => {}
        }
    }

    let mut row: u8 = 0;
    for (index, dependent) in data.dependents.iter().enumerate() {
        if !has_name(dependent) {
            resolution.warn(format!("dependent {} has no name; row skipped", index + 1));
            continue;
        }
        if row == DEPENDENT_ROWS {
            let omitted = data.dependents[index..].iter().filter(|d| has_name(d)).count();
            resolution.warn(format!(
                "{} dependent(s) exceed the {} rows on the form and were omitted",
                omitted, DEPENDENT_ROWS
            ));
            break;
        }
        row += 1;

        resolution.write(
            FieldKey::Dependent(row, DependentField::Name),
            dependent_display_name(dependent),
        );
        resolution.write(
            FieldKey::Dependent(row, DependentField::Relationship),
            dependent.relationship.clone(),
        );
        resolution.write(
            FieldKey::Dependent(row, DependentField::DateOfBirth),
            display_date(&dependent.date_of_birth),
        );
        resolution.write(FieldKey::Dependent(row, DependentField::Ssn), dependent.ssn.clone());
    }

    Ok(resolution)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::MedicalPlan;
    use pretty_assertions::assert_eq;

    fn spouse() -> Dependent {
        Dependent {
            first_name: "Luis".into(),
            last_name: "Ruiz".into(),
            relationship: "spouse".into(),
            date_of_birth: "1988-03-02".into(),
            ssn: "123-45-6789".into(),
            has_medical: true,
            has_dental: true,
            has_vision: true,
        }
    }

    #[test]
    fn test_hra4k_family_with_spouse() {
        let data = HealthInsuranceData {
            medical_plan: Some(MedicalPlan::Hra4k),
            medical_tier: Some(Tier::Family),
            dental_waived: true,
            vision_waived: true,
            dependents: vec![spouse()],
            ..Default::default()
        };
        let resolution = resolve(&data).unwrap();

        let medical: Vec<_> = resolution
            .checked()
            .filter(|k| k.section() == crate::registry::Section::Benefit(BenefitCategory::Medical))
            .collect();
        assert_eq!(
            medical,
            vec![&FieldKey::Coverage(PlanRow::Medical(MedicalPlan::Hra4k), Tier::Family)]
        );
        assert_eq!(
            resolution.value_of(FieldKey::Dependent(1, DependentField::Name)),
            Some("Luis Ruiz (M,D,V)")
        );
        assert_eq!(
            resolution.value_of(FieldKey::Dependent(1, DependentField::DateOfBirth)),
            Some("03/02/1988")
        );
        assert!(resolution.value_of(FieldKey::Dependent(2, DependentField::Name)).is_none());
    }

    #[test]
    fn test_waiver_overrides_tier() {
        let data = HealthInsuranceData {
            medical_plan: Some(MedicalPlan::Hra2k),
            medical_tier: Some(Tier::EmployeeSpouse),
            medical_waived: true,
            dental_tier: Some(Tier::Employee),
            vision_tier: Some(Tier::Employee),
            ..Default::default()
        };
        let resolution = resolve(&data).unwrap();
        let checked: Vec<_> = resolution.checked().copied().collect();

        assert!(checked.contains(&FieldKey::Decline(BenefitCategory::Medical)));
        assert!(!checked
            .iter()
            .any(|k| matches!(k, FieldKey::Coverage(PlanRow::Medical(_), _))));
        assert!(resolution
            .warnings
            .iter()
            .any(|w| w.starts_with("medical coverage waived")));
    }

    #[test]
    fn test_plan_without_tier_marks_nothing() {
        let data = HealthInsuranceData {
            medical_plan: Some(MedicalPlan::Hra6k),
            dental_waived: true,
            vision_waived: true,
            ..Default::default()
        };
        let resolution = resolve(&data).unwrap();
        assert_eq!(
            resolution.checked().copied().collect::<Vec<_>>(),
            vec![
                FieldKey::Decline(BenefitCategory::Dental),
                FieldKey::Decline(BenefitCategory::Vision)
            ]
        );
        assert_eq!(resolution.warnings.len(), 1);
    }

    #[test]
    fn test_markers_only_for_covered_benefits() {
        let mut child = spouse();
        child.first_name = "Sofia".into();
        child.has_dental = false;
        assert_eq!(dependent_display_name(&child), "Sofia Ruiz (M,V)");

        child.has_medical = false;
        child.has_vision = false;
        assert_eq!(dependent_display_name(&child), "Sofia Ruiz");
    }

    #[test]
    fn test_extra_dependents_are_omitted_with_warning() {
        let data = HealthInsuranceData {
            medical_waived: true,
            dental_waived: true,
            vision_waived: true,
            dependents: vec![spouse(); 6],
            ..Default::default()
        };
        let resolution = resolve(&data).unwrap();
        assert!(resolution
            .value_of(FieldKey::Dependent(DEPENDENT_ROWS, DependentField::Name))
            .is_some());
        assert!(resolution
            .warnings
            .iter()
            .any(|w| w.starts_with("2 dependent(s) exceed")));
    }

    #[test]
    fn test_employee_only_tier_with_covered_dependent_warns() {
        let data = HealthInsuranceData {
            medical_plan: Some(MedicalPlan::Hra2k),
            medical_tier: Some(Tier::Employee),
            dental_waived: true,
            vision_waived: true,
            dependents: vec![Dependent {
                has_dental: false,
                has_vision: false,
                ..spouse()
            }],
            ..Default::default()
        };
        let resolution = resolve(&data).unwrap();
        assert_eq!(
            resolution.warnings,
            vec!["dependents marked for medical coverage but the medical tier is employee only"]
        );
    }

    #[test]
    fn test_nameless_dependents_are_skipped_with_warning() {
        let data = HealthInsuranceData {
            medical_waived: true,
            dental_waived: true,
            vision_waived: true,
            dependents: vec![Dependent::default(), spouse()],
            ..Default::default()
        };
        let resolution = resolve(&data).unwrap();
        assert_eq!(
            resolution.value_of(FieldKey::Dependent(1, DependentField::Name)),
            Some("Luis Ruiz (M,D,V)")
        );
        assert!(resolution
            .value_of(FieldKey::Dependent(2, DependentField::Name))
            .is_none());
        assert!(resolution
            .warnings
            .contains(&"dependent 1 has no name; row skipped".to_string()));
    }

    #[test]
    fn test_omitted_count_ignores_nameless_dependents() {
        let mut dependents = vec![spouse(); 5];
        dependents.push(Dependent::default());
        dependents.push(Dependent::default());
        let data = HealthInsuranceData {
            medical_waived: true,
            dental_waived: true,
            vision_waived: true,
            dependents,
            ..Default::default()
        };
        let resolution = resolve(&data).unwrap();
        assert!(resolution
            .warnings
            .iter()
            .any(|w| w.starts_with("1 dependent(s) exceed")));
    }
}
