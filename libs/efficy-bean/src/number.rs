//! Locale-ambiguous number parsing.
//!
//! CRM amounts arrive formatted for whatever locale the record was saved in:
//! `1 234,56 €`, `1,234.56`, `1.234,56`. The rules:
//!
//! 1. whitespace (including no-break spaces) and currency symbols are dropped;
//! 2. when both `,` and `.` occur, whichever appears last is the decimal point and the
//!    other is a thousands separator;
//! 3. when only `,` occurs once, it is the decimal point;
//! 4. a separator repeated with no other separator present (`1.234.567`, `1,234,567`)
//!    is a thousands separator.
//!
//! Anything that still does not parse yields `0.0`.

const CURRENCY_SYMBOLS: &[char] = &[
    '$', '\u{a2}', '\u{a3}', '\u{a4}', '\u{a5}', '\u{20a3}', '\u{20a4}', '\u{20ac}', '\u{20b9}',
];

/// Parse a number formatted in an unknown locale. Never fails; garbage yields `0.0`.
#[must_use]
pub fn parse_locale_number(input: &str) -> f64 {
    let cleaned: String = input
        .chars()
        .filter(|c| !c.is_whitespace() && !CURRENCY_SYMBOLS.contains(c))
        .collect();

    if cleaned.is_empty() {
        return 0.0;
    }

    let normalized = normalize_separators(&cleaned);
    match normalized.parse::<f64>() {
        Ok(value) if value.is_finite() => value,
        _ => 0.0,
    }
}

fn normalize_separators(text: &str) -> String {
    let last_comma = text.rfind(',');
    let last_dot = text.rfind('.');

    match (last_comma, last_dot) {
        (Some(comma), Some(dot)) => {
            let (decimal, thousands) = if comma > dot { (',', '.') } else { ('.', ',') };
            text.chars()
                .filter(|&c| c != thousands)
                .map(|c| if c == decimal { '.' } else { c })
                .collect()
        }
        (Some(_), None) => {
            if text.matches(',').count() == 1 {
                text.replace(',', ".")
            } else {
                text.replace(',', "")
            }
        }
        (None, Some(_)) => {
            if text.matches('.').count() == 1 {
                text.to_owned()
            } else {
                text.replace('.', "")
            }
        }
        (None, None) => text.to_owned(),
    }
}
