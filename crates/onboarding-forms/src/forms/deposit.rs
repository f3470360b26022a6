//! Multi-account splitter for direct deposit
//!
//! The template holds three bank blocks. The primary account's
//! `depositType` picks the mode:
//! - `full`: all pay to block 1, "entire net amount" marked
//! - `partial`: a fixed dollar amount to block 1, rest by paper check
//! - `split`: two or three accounts, each by percentage or fixed amount,
//!   the last one optionally taking the remainder

use crate::actions::Resolution;
use crate::error::FormError;
use crate::model::{AccountType, BankAccount, DepositType, DirectDepositData};
use crate::registry::{BankBlock, BankField, FieldKey};

use super::{format_currency, format_percentage, MAX_AMOUNT};

pub const MAX_ACCOUNTS: usize = 3;

const PERCENT_EPSILON: f64 = 1e-6;

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Allocation {
    EntireNet,
    Percentage(f64),
    Amount(f64),
    Remainder,
}

#[derive(Debug, Clone, PartialEq)]
pub struct PlannedDeposit<'a> {
    pub block: BankBlock,
    pub account: &'a BankAccount,
    pub allocation: Allocation,
}

#[derive(Debug, Clone, PartialEq)]
pub struct DepositPlan<'a> {
    pub mode: DepositType,
    pub deposits: Vec<PlannedDeposit<'a>>,
    pub warnings: Vec<String>,
}

/// Routing numbers are nine digits. Returns whether the ABA checksum holds.
pub fn validate_routing_number(routing: &str) -> Result<bool, FormError> {
    let routing = routing.trim();
    if routing.len() != 9 || !routing.chars().all(|c| c.is_ascii_digit()) {
        return Err(FormError::Validation(format!(
            "routing number {:?} must be 9 digits",
            routing
        )));
    }
    let digits: Vec<u32> = routing.chars().filter_map(|c| c.to_digit(10)).collect();
    let checksum = 3 * (digits[0] + digits[3] + digits[6])
        + 7 * (digits[1] + digits[4] + digits[7])
        + (digits[2] + digits[5] + digits[8]);
    Ok(checksum % 10 == 0)
}

fn validate_account_number(account: &str) -> Result<(), FormError> {
    let account = account.trim();
    let digits = account.chars().filter(|c| c.is_ascii_digit()).count();
    let well_formed = account.chars().all(|c| c.is_ascii_digit() || c == '-');
    if !well_formed || !(4..=17).contains(&digits) {
        return Err(FormError::Validation(format!(
            "account number must be 4-17 digits, got {:?}",
            account
        )));
    }
    Ok(())
}

fn validate_account(
    account: &BankAccount,
    block: BankBlock,
    warnings: &mut Vec<String>,
) -> Result<(), FormError> {
    if !validate_routing_number(&account.routing_number)? {
        warnings.push(format!(
            "bank{} routing number {} fails the ABA checksum",
            block.number(),
            account.routing_number.trim()
        ));
    }
    validate_account_number(&account.account_number)?;
    if account.bank_name.trim().is_empty() {
        warnings.push(format!("bank{} has no bank name", block.number()));
    }
    Ok(())
}

fn percentage(value: f64, block: BankBlock) -> Result<f64, FormError> {
    if !value.is_finite() || value <= 0.0 || value > 100.0 + PERCENT_EPSILON {
        return Err(FormError::Validation(format!(
            "bank{} percentage must be between 0 and 100, got {}",
            block.number(),
            value
        )));
    }
    Ok(value)
}

fn amount(value: f64, block: BankBlock) -> Result<f64, FormError> {
    if !value.is_finite() || value <= 0.0 || value >= MAX_AMOUNT {
        return Err(FormError::Validation(format!(
            "bank{} amount must be positive and below {}, got {}",
            block.number(),
            format_currency(MAX_AMOUNT),
            value
        )));
    }
    Ok(value)
}

/// Explicit allocation of an account, if it carries one
fn explicit_allocation(
    account: &BankAccount,
    block: BankBlock,
) -> Result<Option<Allocation>, FormError> {
    match (account.percentage, account.amount) {
        (Some(_), Some(_)) => Err(FormError::Validation(format!(
            "bank{} has both a percentage and an amount",
            block.number()
        ))),
        (Some(p), None) => Ok(Some(Allocation::Percentage(percentage(p, block)?))),
        (None, Some(a)) => Ok(Some(Allocation::Amount(amount(a, block)?))),
        (None, None) => Ok(None),
    }
}

pub fn plan(data: &DirectDepositData) -> Result<DepositPlan<'_>, FormError> {
    let primary = &data.primary_account;
    if primary.is_empty() {
        return Err(FormError::Validation(
            "primary deposit account is required".to_string(),
        ));
    }

    let additional: Vec<&BankAccount> = data
        .additional_accounts
        .iter()
        .filter(|a| !a.is_empty())
        .collect();
    let total = 1 + additional.len();
    if total > MAX_ACCOUNTS {
        return Err(FormError::TooManyAccounts(total));
    }

    let mut warnings = Vec::new();
    let mode = match primary.deposit_type {
        Some(mode) => mode,
        None => {
            warnings.push("primary account has no depositType; assuming full".to_string());
            DepositType::Full
        }
    };

    let mut deposits = Vec::with_capacity(total);
    match mode {
        DepositType::Full => {
            if primary.percentage.is_some() || primary.amount.is_some() {
                warnings.push("full deposit ignores the primary account amount".to_string());
            }
            deposits.push(PlannedDeposit {
                block: BankBlock::First,
                account: primary,
                allocation: Allocation::EntireNet,
            });
        }
        DepositType::Partial => {
            if primary.percentage.is_some() {
                return Err(FormError::Validation(
                    "partial deposit takes a dollar amount, not a percentage".to_string(),
                ));
            }
            let value = primary.amount.ok_or_else(|| {
                FormError::Validation("partial deposit requires an amount".to_string())
            })?;
            deposits.push(PlannedDeposit {
                block: BankBlock::First,
                account: primary,
                allocation: Allocation::Amount(amount(value, BankBlock::First)?),
            });
        }
        DepositType::Split => {
            if total < 2 {
                warnings.push("split deposit lists a single account".to_string());
            }
            let accounts = std::iter::once(primary).chain(additional.iter().copied());
            for (index, account) in accounts.enumerate() {
                let block = BankBlock::from_index(index).ok_or(FormError::TooManyAccounts(total))?;
                let allocation = match explicit_allocation(account, block)? {
                    Some(allocation) => allocation,
                    None if index + 1 == total => Allocation::Remainder,
                    None => {
                        return Err(FormError::Validation(format!(
                            "bank{} has no percentage or amount; only the last account may take the remainder",
                            block.number()
                        )))
                    }
                };
                deposits.push(PlannedDeposit {
                    block,
                    account,
                    allocation,
                });
            }
            check_split_totals(&deposits, &mut warnings)?;
        }
    }

    if mode != DepositType::Split && !additional.is_empty() {
        warnings.push(format!(
            "{} deposit writes only the primary account; {} additional account(s) ignored",
            match mode {
                DepositType::Full => "full",
                _ => "partial",
            },
            additional.len()
        ));
    }

    for deposit in &deposits {
        validate_account(deposit.account, deposit.block, &mut warnings)?;
    }

    Ok(DepositPlan {
        mode,
        deposits,
        warnings,
    })
}

fn check_split_totals(
    deposits: &[PlannedDeposit<'_>],
    warnings: &mut Vec<String>,
) -> Result<(), FormError> {
    let percent_total: f64 = deposits
        .iter()
        .filter_map(|d| match d.allocation {
            Allocation::Percentage(p) => Some(p),
            _ => None,
        })
        .sum();
    if percent_total > 100.0 + PERCENT_EPSILON {
        return Err(FormError::Validation(format!(
            "split percentages total {}%, more than 100%",
            format_percentage(percent_total)
        )));
    }

    let has_remainder = deposits
        .iter()
        .any(|d| d.allocation == Allocation::Remainder);
    let all_percent = deposits
        .iter()
        .all(|d| matches!(d.allocation, Allocation::Percentage(_)));

    if !has_remainder {
        if all_percent && percent_total < 100.0 - PERCENT_EPSILON {
            warnings.push(format!(
                "split percentages total {}%; the rest of net pay is unallocated",
                format_percentage(percent_total)
            ));
        } else if !all_percent {
            warnings.push(
                "no remainder account; pay beyond the fixed amounts is paid by check".to_string(),
            );
        }
    }
    Ok(())
}

impl DepositPlan<'_> {
    pub fn into_resolution(self) -> Resolution {
        let mut resolution = Resolution::new();
        for deposit in &self.deposits {
            let key = |field| FieldKey::Bank(deposit.block, field);
            let account = deposit.account;

            resolution.write(key(BankField::BankName), account.bank_name.clone());
            resolution.write(key(BankField::Routing), account.routing_number.clone());
            resolution.write(key(BankField::Account), account.account_number.clone());
            resolution.check(match account.account_type {
                AccountType::Checking => key(BankField::Checking),
                AccountType::Savings => key(BankField::Savings),
            });

            match deposit.allocation {
                Allocation::EntireNet => resolution.check(key(BankField::EntireNet)),
                Allocation::Percentage(p) => {
                    resolution.write(key(BankField::Percentage), format_percentage(p))
                }
                Allocation::Amount(a) => resolution.write(key(BankField::Amount), format_currency(a)),
                Allocation::Remainder => resolution.check(key(BankField::Remainder)),
            }
        }
        for warning in self.warnings {
            resolution.warn(warning);
        }
        resolution
    }
}

pub fn resolve(data: &DirectDepositData) -> Result<Resolution, FormError> {
    Ok(plan(data)?.into_resolution())
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn account(deposit_type: Option<DepositType>) -> BankAccount {
        BankAccount {
            bank_name: "First National".into(),
            routing_number: "021000021".into(),
            account_number: "123456789".into(),
            account_type: AccountType::Checking,
            deposit_type,
            percentage: None,
            amount: None,
        }
    }

    #[test]
    fn test_routing_checksum() {
        assert!(validate_routing_number("021000021").unwrap());
        assert!(validate_routing_number("011000015").unwrap());
        assert!(!validate_routing_number("123456789").unwrap());
        assert!(validate_routing_number("12345").is_err());
        assert!(validate_routing_number("02100002a").is_err());
    }

    #[test]
    fn test_full_marks_entire_net_and_leaves_amount_blank() {
        let data = DirectDepositData {
            primary_account: account(Some(DepositType::Full)),
            additional_accounts: vec![],
        };
        let resolution = resolve(&data).unwrap();

        assert!(resolution
            .checked()
            .any(|k| *k == FieldKey::Bank(BankBlock::First, BankField::EntireNet)));
        assert!(resolution
            .value_of(FieldKey::Bank(BankBlock::First, BankField::Amount))
            .is_none());
        assert!(resolution
            .value_of(FieldKey::Bank(BankBlock::First, BankField::Percentage))
            .is_none());
        assert!(resolution.warnings.is_empty());
    }

    #[test]
    fn test_partial_writes_amount_only_for_primary() {
        let mut primary = account(Some(DepositType::Partial));
        primary.amount = Some(250.0);
        let data = DirectDepositData {
            primary_account: primary,
            additional_accounts: vec![account(None)],
        };
        let plan = plan(&data).unwrap();
        assert_eq!(plan.deposits.len(), 1);
        assert_eq!(plan.deposits[0].allocation, Allocation::Amount(250.0));
        assert_eq!(plan.warnings.len(), 1);

        let resolution = plan.into_resolution();
        assert_eq!(
            resolution.value_of(FieldKey::Bank(BankBlock::First, BankField::Amount)),
            Some("250.00")
        );
        assert!(resolution
            .actions
            .iter()
            .all(|a| !matches!(a.key, FieldKey::Bank(BankBlock::Second, _))));
    }

    #[test]
    fn test_partial_without_amount_is_rejected() {
        let data = DirectDepositData {
            primary_account: account(Some(DepositType::Partial)),
            additional_accounts: vec![],
        };
        assert!(matches!(plan(&data), Err(FormError::Validation(_))));
    }

    #[test]
    fn test_split_sixty_forty() {
        let mut primary = account(Some(DepositType::Split));
        primary.percentage = Some(60.0);
        let mut secondary = account(Some(DepositType::Split));
        secondary.routing_number = "011000015".into();
        secondary.account_type = AccountType::Savings;
        secondary.percentage = Some(40.0);

        let data = DirectDepositData {
            primary_account: primary,
            additional_accounts: vec![secondary],
        };
        let resolution = resolve(&data).unwrap();

        assert_eq!(
            resolution.value_of(FieldKey::Bank(BankBlock::First, BankField::Percentage)),
            Some("60")
        );
        assert_eq!(
            resolution.value_of(FieldKey::Bank(BankBlock::Second, BankField::Percentage)),
            Some("40")
        );
        assert_eq!(
            resolution.value_of(FieldKey::Bank(BankBlock::Second, BankField::Routing)),
            Some("011000015")
        );
        assert!(resolution
            .checked()
            .any(|k| *k == FieldKey::Bank(BankBlock::Second, BankField::Savings)));
        assert!(resolution
            .actions
            .iter()
            .all(|a| !matches!(a.key, FieldKey::Bank(BankBlock::Third, _))));
        assert!(resolution.warnings.is_empty());
    }

    #[test]
    fn test_split_last_account_takes_remainder() {
        let mut primary = account(Some(DepositType::Split));
        primary.amount = Some(100.0);
        let mut second = account(None);
        second.percentage = Some(25.0);
        let third = account(None);

        let data = DirectDepositData {
            primary_account: primary,
            additional_accounts: vec![second, third],
        };
        let plan = plan(&data).unwrap();
        let allocations: Vec<_> = plan.deposits.iter().map(|d| d.allocation).collect();
        assert_eq!(
            allocations,
            vec![
                Allocation::Amount(100.0),
                Allocation::Percentage(25.0),
                Allocation::Remainder
            ]
        );
        assert!(plan.warnings.is_empty());
    }

    #[test]
    fn test_split_middle_account_without_allocation_is_rejected() {
        let mut primary = account(Some(DepositType::Split));
        primary.percentage = Some(50.0);
        let mut third = account(None);
        third.percentage = Some(50.0);

        let data = DirectDepositData {
            primary_account: primary,
            additional_accounts: vec![account(None), third],
        };
        let err = plan(&data).unwrap_err();
        assert!(err.to_string().contains("bank2"));
    }

    #[test]
    fn test_split_percentages_over_100_are_rejected() {
        let mut primary = account(Some(DepositType::Split));
        primary.percentage = Some(70.0);
        let mut second = account(None);
        second.percentage = Some(40.0);

        let data = DirectDepositData {
            primary_account: primary,
            additional_accounts: vec![second],
        };
        assert!(matches!(plan(&data), Err(FormError::Validation(_))));
    }

    #[test]
    fn test_split_percentages_under_100_warn() {
        let mut primary = account(Some(DepositType::Split));
        primary.percentage = Some(50.0);
        let mut second = account(None);
        second.percentage = Some(30.0);

        let data = DirectDepositData {
            primary_account: primary,
            additional_accounts: vec![second],
        };
        let plan = plan(&data).unwrap();
        assert_eq!(
            plan.warnings,
            vec!["split percentages total 80%; the rest of net pay is unallocated"]
        );
    }

    #[test]
    fn test_four_accounts_is_too_many() {
        let data = DirectDepositData {
            primary_account: account(Some(DepositType::Split)),
            additional_accounts: vec![account(None), account(None), account(None)],
        };
        assert!(matches!(plan(&data), Err(FormError::TooManyAccounts(4))));
    }

    #[test]
    fn test_empty_additional_accounts_are_skipped() {
        let mut primary = account(Some(DepositType::Split));
        primary.percentage = Some(100.0);
        let data = DirectDepositData {
            primary_account: primary,
            additional_accounts: vec![BankAccount::default(), BankAccount::default(), BankAccount::default()],
        };
        let plan = plan(&data).unwrap();
        assert_eq!(plan.deposits.len(), 1);
        assert_eq!(plan.warnings, vec!["split deposit lists a single account"]);
    }

    #[test]
    fn test_bad_account_number_is_rejected() {
        let mut primary = account(Some(DepositType::Full));
        primary.account_number = "12".into();
        let data = DirectDepositData {
            primary_account: primary,
            additional_accounts: vec![],
        };
        assert!(matches!(plan(&data), Err(FormError::Validation(_))));
    }

    #[test]
    fn test_partial_with_percentage_is_rejected() {
        let mut primary = account(Some(DepositType::Partial));
        primary.percentage = Some(50.0);
        let data = DirectDepositData {
            primary_account: primary,
            additional_accounts: vec![],
        };
        let err = plan(&data).unwrap_err();
        assert!(err.to_string().contains("dollar amount"));
    }

    #[test]
    fn test_huge_amount_is_rejected() {
        let mut primary = account(Some(DepositType::Partial));
        primary.amount = Some(1e20);
        let data = DirectDepositData {
            primary_account: primary,
            additional_accounts: vec![],
        };
        assert!(matches!(plan(&data), Err(FormError::Validation(_))));
    }

    #[test]
    fn test_missing_deposit_type_assumes_full() {
        let data = DirectDepositData {
            primary_account: account(None),
            additional_accounts: vec![],
        };
        let plan = plan(&data).unwrap();
        assert_eq!(plan.mode, DepositType::Full);
        assert_eq!(plan.deposits[0].allocation, Allocation::EntireNet);
        assert_eq!(
            plan.warnings,
            vec!["primary account has no depositType; assuming full"]
        );
    }

    #[test]
    fn test_percentage_and_amount_together_are_rejected() {
        let mut primary = account(Some(DepositType::Split));
        primary.percentage = Some(60.0);
        let mut second = account(None);
        second.percentage = Some(40.0);
        second.amount = Some(100.0);
        let data = DirectDepositData {
            primary_account: primary,
            additional_accounts: vec![second],
        };
        let err = plan(&data).unwrap_err();
        assert!(matches!(err, FormError::Validation(_)));
        assert!(err.to_string().contains("bank2 has both a percentage and an amount"));
    }

    #[test]
    fn test_routing_checksum_failure_warns() {
        let mut primary = account(Some(DepositType::Full));
        primary.routing_number = "123456789".into();
        let data = DirectDepositData {
            primary_account: primary,
            additional_accounts: vec![],
        };
        let plan = plan(&data).unwrap();
        assert_eq!(
            plan.warnings,
            vec!["bank1 routing number 123456789 fails the ABA checksum"]
        );
    }
}
