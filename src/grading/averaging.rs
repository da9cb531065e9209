/// Round to the nearest integer with halves going up (`floor(x + 0.5)`).
///
/// All marks on the memo use this rule: 16.5 becomes 17, -4.5 becomes -4.
pub fn round_half_up(x: f64) -> f64 {
    (x + 0.5).floor()
}

/// Average consecutive pairs of attempts into one mark per subject.
///
/// A trailing unpaired attempt is averaged against 0. Marks are expected to be
/// validated (finite, non-negative) by the caller.
pub fn average_pairs(marks: &[f64]) -> Vec<u32> {
    marks
        .chunks(2)
        .map(|pair| {
            let first = pair[0];
            let second = pair.get(1).copied().unwrap_or(0.0);
            round_half_up((first + second) / 2.0) as u32
        })
        .collect()
}

/// One mark per subject, rounded. Used for categories that are not paired.
pub fn round_each(marks: &[f64]) -> Vec<u32> {
    marks.iter().map(|m| round_half_up(*m) as u32).collect()
}
