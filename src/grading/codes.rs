use super::config::{GradingConfig, DEFAULT_UNIT_START_CODE};

/// `count` consecutive subject codes beginning at `start`, or `None` when
/// the run would not fit in a `u32`.
pub fn generate_codes(start: u32, count: usize) -> Option<Vec<u32>> {
    let count = u32::try_from(count).ok()?;
    if count > 0 {
        start.checked_add(count - 1)?;
    }
    Some((0..count).map(|i| start + i).collect())
}

/// First unit subject code for an identifier.
///
/// Prefix rules are checked in order; the first prefix the identifier starts
/// with decides. Otherwise the configured unit start code applies.
pub fn unit_start_code(identifier: &str, config: &GradingConfig) -> u32 {
    let fallback = config.unit_start_code.unwrap_or(DEFAULT_UNIT_START_CODE);
    config
        .start_code_rules
        .as_deref()
        .unwrap_or_default()
        .iter()
        .find(|rule| identifier.starts_with(rule.prefix.as_str()))
        .map(|rule| rule.start_code)
        .unwrap_or(fallback)
}

/// Sessional codes pick up right after the last unit code, or at the unit
/// start code when there are no unit subjects.
pub fn sessional_start_code(unit_codes: &[u32], unit_start: u32) -> Option<u32> {
    match unit_codes.last() {
        Some(code) => code.checked_add(1),
        None => Some(unit_start),
    }
}
