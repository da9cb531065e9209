use super::averaging::round_half_up;
use super::config::{CategoryRules, GradingConfig};
use super::error::GradingError;

/// Adjustments are spread over this many integers, centred on zero (-6..=+6).
const ADJUSTMENT_SPAN: f64 = 13.0;
const ADJUSTMENT_SHIFT: i64 = 6;

/// How an external mark was derived. Kept so callers can explain a memo.
#[derive(Debug, Clone, PartialEq)]
pub struct ExternalBreakdown {
    pub seed: f64,
    pub adjustment: i64,
    pub multiplier: f64,
    pub offset: i64,
    /// Formula result before clamping
    pub unclamped: f64,
    pub external: u32,
}

/// Read the leading base-36 integer of `text`.
///
/// Leading whitespace and one sign character are accepted; digits are
/// consumed up to the first character that is not `0-9`, `a-z` or `A-Z`.
/// Returns `None` when there is no digit to read or the value overflows.
pub fn parse_seed(text: &str) -> Option<f64> {
    let text = text.trim_start();
    let (negative, digits) = match text.chars().next() {
        Some('-') => (true, &text[1..]),
        Some('+') => (false, &text[1..]),
        _ => (false, text),
    };

    let mut value = 0.0_f64;
    let mut consumed = 0usize;
    for digit in digits.chars().map_while(|c| c.to_digit(36)) {
        value = value * 36.0 + digit as f64;
        consumed += 1;
    }

    if consumed == 0 || !value.is_finite() {
        return None;
    }
    Some(if negative { -value } else { value })
}

/// Deterministic value in [0, 1) for a seed: the fractional part of
/// `sin(seed) * 10000`.
pub fn pseudo_random(seed: f64) -> f64 {
    let x = seed.sin() * 10000.0;
    let fraction = x - x.floor();
    // A tiny negative x rounds up to exactly 1.0
    if fraction >= 1.0 {
        0.0
    } else {
        fraction
    }
}

/// Integer adjustment in [-6, 6] for a seed.
pub fn adjustment_for(seed: f64) -> i64 {
    (pseudo_random(seed) * ADJUSTMENT_SPAN).floor() as i64 - ADJUSTMENT_SHIFT
}

/// Seed for one subject of one student: identifier and code read together as
/// a base-36 number.
pub fn seed_for(identifier: &str, subject_code: u32) -> Result<f64, GradingError> {
    parse_seed(&format!("{}{}", identifier, subject_code))
        .ok_or_else(|| GradingError::MalformedIdentifier(identifier.to_string()))
}

/// Derive the external mark for one subject.
///
/// `internal` is the averaged mark before clamping. The result is clamped to
/// `[0, rules.external_max]`.
pub fn synthesize_external(
    identifier: &str,
    subject_code: u32,
    internal: u32,
    rules: &CategoryRules,
    config: &GradingConfig,
) -> Result<ExternalBreakdown, GradingError> {
    let seed = seed_for(identifier, subject_code)?;
    let adjustment = adjustment_for(seed);
    let multiplier = config.multiplier_for(subject_code);
    let offset = config.offset_for(subject_code);

    let unclamped =
        round_half_up(multiplier * internal as f64 + offset as f64 + adjustment as f64);
    let external = unclamped.clamp(0.0, rules.external_max as f64) as u32;

    tracing::trace!(
        identifier,
        subject_code,
        seed,
        adjustment,
        multiplier,
        offset,
        unclamped,
        external,
        "synthesized external mark"
    );

    Ok(ExternalBreakdown {
        seed,
        adjustment,
        multiplier,
        offset,
        unclamped,
        external,
    })
}
