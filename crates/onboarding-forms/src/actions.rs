//! Resolved stamping instructions
//!
//! Resolution turns a [`FormInput`](crate::model::FormInput) into a list of
//! [`StampAction`]s without touching any PDF. The same list drives rendering
//! and the audit trail returned to callers.

use serde::Serialize;

use crate::registry::FieldKey;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum StampKind {
    Write,
    Check,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct StampAction {
    #[serde(skip)]
    pub key: FieldKey,
    pub field_name: String,
    pub action: StampKind,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub value: Option<String>,
}

impl StampAction {
    pub fn write(key: FieldKey, value: impl Into<String>) -> Self {
        Self {
            key,
            field_name: key.name(),
            action: StampKind::Write,
            value: Some(value.into()),
        }
    }

    pub fn check(key: FieldKey) -> Self {
        Self {
            key,
            field_name: key.name(),
            action: StampKind::Check,
            value: None,
        }
    }
}

/// Actions plus the non-fatal warnings collected while resolving them
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Resolution {
    pub actions: Vec<StampAction>,
    pub warnings: Vec<String>,
}

impl Resolution {
    pub fn new() -> Self {
        Self::default()
    }

    /// Queue a text write; blank values are skipped
    pub fn write(&mut self, key: FieldKey, value: impl Into<String>) {
        let value = value.into();
        let value = value.trim();
        if !value.is_empty() {
            self.actions.push(StampAction::write(key, value));
        }
    }

    pub fn check(&mut self, key: FieldKey) {
        self.actions.push(StampAction::check(key));
    }

    pub fn warn(&mut self, warning: impl Into<String>) {
        self.warnings.push(warning.into());
    }

    pub fn merge(&mut self, other: Resolution) {
        self.actions.extend(other.actions);
        self.warnings.extend(other.warnings);
    }

    pub fn checked(&self) -> impl Iterator<Item = &FieldKey> {
        self.actions
            .iter()
            .filter(|a| a.action == StampKind::Check)
            .map(|a| &a.key)
    }

    pub fn value_of(&self, key: FieldKey) -> Option<&str> {
        self.actions
            .iter()
            .find(|a| a.key == key)
            .and_then(|a| a.value.as_deref())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::registry::{BankBlock, BankField};

    #[test]
    fn test_blank_writes_are_dropped() {
        let mut resolution = Resolution::new();
        resolution.write(FieldKey::Bank(BankBlock::First, BankField::BankName), "   ");
        resolution.write(FieldKey::Bank(BankBlock::First, BankField::Routing), " 021000021 ");
        assert_eq!(resolution.actions.len(), 1);
        assert_eq!(
            resolution.value_of(FieldKey::Bank(BankBlock::First, BankField::Routing)),
            Some("021000021")
        );
    }

    #[test]
    fn test_action_serializes_without_key() {
        let action = StampAction::check(FieldKey::Bank(BankBlock::Second, BankField::Savings));
        let json = serde_json::to_value(&action).unwrap();
        assert_eq!(
            json,
            serde_json::json!({"field_name": "bank2_savings", "action": "check"})
        );
    }
}
