//! Form I-9 section 1 attestation

use crate::actions::Resolution;
use crate::dates::display_date;
use crate::error::FormError;
use crate::model::{CitizenshipStatus, I9Data};
use crate::registry::{FieldKey, I9Detail};

fn present(value: &Option<String>) -> Option<&str> {
    value.as_deref().map(str::trim).filter(|v| !v.is_empty())
}

fn passport(data: &I9Data) -> Option<String> {
    let number = present(&data.foreign_passport_number)?;
    Some(match present(&data.passport_country) {
        Some(country) => format!("{} ({})", number, country),
        None => number.to_string(),
    })
}

pub fn resolve(data: &I9Data) -> Result<Resolution, FormError> {
    let mut resolution = Resolution::new();
    resolution.check(FieldKey::Citizenship(data.citizenship_status));

    match data.citizenship_status {
        CitizenshipStatus::Citizen | CitizenshipStatus::NoncitizenNational => {
            let extras = [
                &data.uscis_number,
                &data.alien_number,
                &data.work_authorization_expiration,
                &data.i94_number,
                &data.foreign_passport_number,
            ];
            if extras.iter().any(|v| present(v).is_some()) {
                resolution.warn("immigration document numbers ignored for citizens and nationals");
            }
        }
        CitizenshipStatus::PermanentResident => {
            let number = present(&data.uscis_number)
                .or_else(|| present(&data.alien_number))
                .ok_or_else(|| {
                    FormError::Validation(
                        "permanent residents must provide a USCIS or A-number".to_string(),
                    )
                })?;
            resolution.write(FieldKey::I9Detail(I9Detail::UscisNumber), number);
        }
        CitizenshipStatus::AuthorizedAlien => {
            let expiration = present(&data.work_authorization_expiration).ok_or_else(|| {
                FormError::Validation(
                    "authorized aliens must provide a work authorization expiration date or N/A"
                        .to_string(),
                )
            })?;
            let expiration = if expiration.eq_ignore_ascii_case("n/a") {
                "N/A".to_string()
            } else {
                display_date(expiration)
            };
            resolution.write(
                FieldKey::I9Detail(I9Detail::WorkAuthorizationExpiration),
                expiration,
            );

            let alien = present(&data.alien_number);
            let i94 = present(&data.i94_number);
            let passport = passport(data);
            if alien.is_none() && i94.is_none() && passport.is_none() {
                return Err(FormError::Validation(
                    "authorized aliens must provide an A-number, I-94 number, or foreign passport"
                        .to_string(),
                ));
            }
            if let Some(alien) = alien {
                resolution.write(FieldKey::I9Detail(I9Detail::AlienNumber), alien);
            }
            if let Some(i94) = i94 {
                resolution.write(FieldKey::I9Detail(I9Detail::I94Number), i94);
            }
            if let Some(passport) = passport {
                resolution.write(FieldKey::I9Detail(I9Detail::ForeignPassport), passport);
            }
        }
    }

    Ok(resolution)
}
