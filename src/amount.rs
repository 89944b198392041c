//! Sum conversion between rubles (as typed) and kopecks (as stored and encoded)
//!
//! The form holds the amount in rubles. The payload and the persisted record
//! carry it in kopecks. Text that does not parse as a decimal is passed
//! through unchanged in both directions so that storing and loading stays
//! idempotent.

use rust_decimal::{Decimal, RoundingStrategy};
use std::str::FromStr;

/// Convert a ruble amount to an integer kopeck string.
///
/// Returns `None` for empty input. Accepts `,` as the decimal separator.
/// Fractions of a kopeck are rounded half away from zero. Amounts too large
/// to scale are passed through like non-numeric text.
pub fn to_minor_units(rubles: &str) -> Option<String> {
    let trimmed = rubles.trim();
    if trimmed.is_empty() {
        return None;
    }

    let kopecks =
        parse_decimal(trimmed).and_then(|value| value.checked_mul(Decimal::ONE_HUNDRED));
    match kopecks {
        Some(kopecks) => Some(
            kopecks
                .round_dp_with_strategy(0, RoundingStrategy::MidpointAwayFromZero)
                .normalize()
                .to_string(),
        ),
        None => {
            tracing::warn!(
                sum = trimmed,
                "Sum is not a representable number, embedding as typed"
            );
            Some(trimmed.to_string())
        }
    }
}

/// Convert a stored kopeck amount back to rubles for display.
///
/// Returns an empty string for empty input.
pub fn from_minor_units(kopecks: &str) -> String {
    let trimmed = kopecks.trim();
    if trimmed.is_empty() {
        return String::new();
    }

    // Only divide when multiplying back restores the stored value exactly.
    let rubles = parse_decimal(trimmed).and_then(|value| {
        let rubles = value.checked_div(Decimal::ONE_HUNDRED)?;
        (rubles.checked_mul(Decimal::ONE_HUNDRED)? == value).then_some(rubles)
    });
    match rubles {
        Some(rubles) => rubles.normalize().to_string(),
        None => trimmed.to_string(),
    }
}

fn parse_decimal(value: &str) -> Option<Decimal> {
    let normalized = value.replace(',', ".");
    Decimal::from_str(&normalized).ok()
}
