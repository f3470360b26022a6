//! Render stamp actions onto a template

use std::collections::BTreeMap;

use lopdf::content::Operation;
use lopdf::{Document, Object, StringFormat};
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::actions::{StampAction, StampKind};
use crate::error::FormError;
use crate::page::{add_stamp_font, append_operations, page_id, STAMP_FONT};
use crate::registry::{FieldKind, FieldRegistry, FieldSpec, Rect};

// Horizontal padding inside text boxes
const TEXT_INSET: f64 = 2.0;
// Checkmark inset from the box edge
const CHECK_INSET: f64 = 2.0;
const CHECK_LINE_WIDTH: f64 = 1.2;

/// Appearance of stamped values
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct StampStyle {
    pub font_size: f64,
    /// Smallest size text may shrink to before it is allowed to overflow
    pub min_font_size: f64,
    /// Hex color, e.g. `#000000`
    pub color: String,
}

impl Default for StampStyle {
    fn default() -> Self {
        Self {
            font_size: 10.0,
            min_font_size: 6.0,
            color: "#000000".to_string(),
        }
    }
}

/// Parse hex color string (e.g., "#FF0000" or "FF0000") to RGB floats (0-1 range)
pub fn parse_hex_color(color: &str) -> (f32, f32, f32) {
    let hex = color.trim_start_matches('#');
    if hex.len() >= 6 && hex.is_ascii() {
        let channel = |range: std::ops::Range<usize>| {
            u8::from_str_radix(&hex[range], 16).unwrap_or(0) as f32 / 255.0
        };
        (channel(0..2), channel(2..4), channel(4..6))
    } else {
        (0.0, 0.0, 0.0)
    }
}

/// Encode for Helvetica/WinAnsiEncoding. Characters outside Latin-1 become
/// `?`; the flag reports whether that happened.
pub fn encode_win_ansi(text: &str) -> (Vec<u8>, bool) {
    let mut replaced = false;
    let bytes = text
        .chars()
        .map(|c| match u8::try_from(u32::from(c)) {
            Ok(b) if b >= 0x20 => b,
            _ => {
                replaced = true;
                b'?'
            }
        })
        .collect();
    (bytes, replaced)
}

// Helvetica advance widths for 0x20..=0x7E, in 1/1000 em
const HELVETICA_WIDTHS: [u16; 95] = [
    278, 278, 355, 556, 556, 889, 667, 191, 333, 333, 389, 584, 278, 333, 278, 278, // space - /
    556, 556, 556, 556, 556, 556, 556, 556, 556, 556, // 0 - 9
    278, 278, 584, 584, 584, 556, 1015, // : - @
    667, 667, 722, 722, 667, 611, 778, 722, 278, 500, 667, 556, 833, // A - M
    722, 778, 667, 778, 722, 667, 611, 722, 667, 944, 667, 667, 611, // N - Z
    278, 278, 278, 469, 556, 333, // [ - `
    556, 556, 500, 556, 556, 278, 556, 556, 222, 222, 500, 222, 833, // a - m
    556, 556, 556, 556, 333, 500, 278, 556, 500, 722, 500, 500, 500, // n - z
    334, 260, 334, 584, // { - ~
];
const DEFAULT_WIDTH: u16 = 556;

/// Width of WinAnsi `bytes` set in Helvetica at `font_size`
pub fn text_width(bytes: &[u8], font_size: f64) -> f64 {
    let units: u32 = bytes
        .iter()
        .map(|&b| match b {
            0x20..=0x7E => u32::from(HELVETICA_WIDTHS[usize::from(b - 0x20)]),
            _ => u32::from(DEFAULT_WIDTH),
        })
        .sum();
    f64::from(units) * font_size / 1000.0
}

/// Largest size in `[min, max]` at which `bytes` fit `available` points
pub fn fit_font_size(bytes: &[u8], available: f64, style: &StampStyle) -> (f64, bool) {
    let natural = text_width(bytes, style.font_size);
    if natural <= available {
        return (style.font_size, true);
    }
    let scaled = style.font_size * available / natural;
    if scaled >= style.min_font_size {
        (scaled, true)
    } else {
        (style.min_font_size, false)
    }
}

fn real(value: f64) -> Object {
    Object::Real(value as f32)
}

fn text_operations(
    rect: &Rect,
    bytes: Vec<u8>,
    font_size: f64,
    color: (f32, f32, f32),
) -> Vec<Operation> {
    // Vertically center a cap-height line in the box
    let baseline = rect.y0 + ((rect.height() - font_size * 0.7) / 2.0).max(1.0);
    let (r, g, b) = color;
    vec![
        Operation::new("BT", vec![]),
        Operation::new("rg", vec![Object::Real(r), Object::Real(g), Object::Real(b)]),
        Operation::new("Tf", vec![STAMP_FONT.into(), real(font_size)]),
        Operation::new("Td", vec![real(rect.x0 + TEXT_INSET), real(baseline)]),
        Operation::new("Tj", vec![Object::String(bytes, StringFormat::Literal)]),
        Operation::new("ET", vec![]),
    ]
}

fn check_operations(rect: &Rect, color: (f32, f32, f32)) -> Vec<Operation> {
    let inset = CHECK_INSET.min(rect.width() / 4.0).min(rect.height() / 4.0);
    let (x0, y0) = (rect.x0 + inset, rect.y0 + inset);
    let (x1, y1) = (rect.x1 - inset, rect.y1 - inset);
    let (r, g, b) = color;
    vec![
        Operation::new("q", vec![]),
        Operation::new("RG", vec![Object::Real(r), Object::Real(g), Object::Real(b)]),
        Operation::new("w", vec![real(CHECK_LINE_WIDTH)]),
        Operation::new("m", vec![real(x0), real(y0)]),
        Operation::new("l", vec![real(x1), real(y1)]),
        Operation::new("m", vec![real(x0), real(y1)]),
        Operation::new("l", vec![real(x1), real(y0)]),
        Operation::new("S", vec![]),
        Operation::new("Q", vec![]),
    ]
}

fn operations_for(
    spec: &FieldSpec,
    action: &StampAction,
    style: &StampStyle,
    warnings: &mut Vec<String>,
) -> Result<Vec<Operation>, FormError> {
    let color = parse_hex_color(&style.color);
    match (action.action, spec.kind) {
        (StampKind::Check, FieldKind::Checkbox) => Ok(check_operations(&spec.rect, color)),
        (StampKind::Write, FieldKind::Text) => {
            let value = action.value.as_deref().unwrap_or_default();
            let (bytes, replaced) = encode_win_ansi(value);
            if replaced {
                warnings.push(format!(
                    "{}: characters outside the template font were replaced with '?'",
                    spec.name
                ));
            }
            let available = spec.rect.width() - 2.0 * TEXT_INSET;
            let (size, fits) = fit_font_size(&bytes, available, style);
            if !fits {
                warnings.push(format!(
                    "{}: value does not fit its box even at {}pt",
                    spec.name, style.min_font_size
                ));
            }
            Ok(text_operations(&spec.rect, bytes, size, color))
        }
        (kind, field_kind) => Err(FormError::RegistryConflict(format!(
            "{} is a {:?} field and cannot take a {:?} action",
            spec.name, field_kind, kind
        ))),
    }
}

/// Draw `actions` onto `template`, returning the new document and any
/// rendering warnings.
pub fn stamp(
    template: &[u8],
    actions: &[StampAction],
    registry: &FieldRegistry,
    style: &StampStyle,
) -> Result<(Vec<u8>, Vec<String>), FormError> {
    let mut doc = Document::load_mem(template)?;
    let mut warnings = Vec::new();

    // Group per page so each page gets one overlay stream
    let mut per_page: BTreeMap<u32, Vec<Operation>> = BTreeMap::new();
    for action in actions {
        let spec = registry.spec(action.key)?;
        debug!(field = %spec.name, page = spec.page, action = ?action.action, "Stamping field");
        let ops = operations_for(spec, action, style, &mut warnings)?;
        per_page.entry(spec.page).or_default().extend(ops);
    }

    for (page_num, operations) in per_page {
        let id = page_id(&doc, page_num)?;
        add_stamp_font(&mut doc, id)?;
        append_operations(&mut doc, id, operations)?;
    }

    let mut output = Vec::new();
    doc.save_to(&mut output)
        .map_err(|e| FormError::Pdf(e.to_string()))?;
    Ok((output, warnings))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::page::{blank_document, text_runs};
    use crate::registry::{BankBlock, BankField, FieldKey};

    fn create_test_pdf(pages: u32) -> Vec<u8> {
        let mut doc = blank_document(pages);
        let mut buffer = Vec::new();
        doc.save_to(&mut buffer).unwrap();
        buffer
    }

    #[test]
    fn test_parse_hex_color() {
        assert_eq!(parse_hex_color("#FF0000"), (1.0, 0.0, 0.0));
        assert_eq!(parse_hex_color("00ff00"), (0.0, 1.0, 0.0));
        assert_eq!(parse_hex_color("bad"), (0.0, 0.0, 0.0));
    }

    #[test]
    fn test_parse_hex_color_non_ascii_falls_back_to_black() {
        assert_eq!(parse_hex_color("#é0000"), (0.0, 0.0, 0.0));
        assert_eq!(parse_hex_color("0é000000"), (0.0, 0.0, 0.0));
    }

    #[test]
    fn test_encode_win_ansi_replaces_wide_characters() {
        assert_eq!(encode_win_ansi("José"), (b"Jos\xe9".to_vec(), false));
        let (bytes, replaced) = encode_win_ansi("李");
        assert_eq!(bytes, b"?".to_vec());
        assert!(replaced);
    }

    #[test]
    fn test_long_values_shrink_then_overflow() {
        let style = StampStyle::default();
        let (size, fits) = fit_font_size(b"Ana", 100.0, &style);
        assert_eq!((size, fits), (10.0, true));

        let (size, fits) = fit_font_size(b"A rather long bank name", 100.0, &style);
        assert!(fits);
        assert!(size < 10.0 && size >= style.min_font_size);

        let (size, fits) = fit_font_size(&[b'W'; 80], 100.0, &style);
        assert!(!fits);
        assert_eq!(size, style.min_font_size);
    }

    #[test]
    fn test_stamp_writes_and_checks() {
        let pdf = create_test_pdf(1);
        let actions = vec![
            StampAction::write(FieldKey::Bank(BankBlock::First, BankField::BankName), "Chase"),
            StampAction::check(FieldKey::Bank(BankBlock::First, BankField::Checking)),
        ];
        let (stamped, warnings) =
            stamp(&pdf, &actions, FieldRegistry::standard(), &StampStyle::default()).unwrap();

        assert!(warnings.is_empty());
        assert!(stamped.starts_with(b"%PDF-"));
        assert_eq!(text_runs(&stamped, 1).unwrap(), vec!["Chase".to_string()]);
    }

    #[test]
    fn test_action_kind_must_match_field_kind() {
        let pdf = create_test_pdf(1);
        let actions = vec![StampAction::check(FieldKey::Bank(
            BankBlock::First,
            BankField::Routing,
        ))];
        let err = stamp(&pdf, &actions, FieldRegistry::standard(), &StampStyle::default())
            .unwrap_err();
        assert!(matches!(err, FormError::RegistryConflict(_)));
    }

    #[test]
    fn test_missing_page_is_a_template_error() {
        // Dependents live on page 2 of the health form
        let pdf = create_test_pdf(1);
        let actions = vec![StampAction::write(
            FieldKey::Dependent(1, crate::registry::DependentField::Name),
            "Luis Ruiz",
        )];
        let err = stamp(&pdf, &actions, FieldRegistry::standard(), &StampStyle::default())
            .unwrap_err();
        assert!(matches!(err, FormError::Template(_)));
    }
}
