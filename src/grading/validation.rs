use super::config::{Category, CategoryConfig, GradingConfig, MAX_INTERNAL_MARKS, MAX_START_CODE};
use std::collections::HashSet;

/// Validate grading configuration at startup.
/// Returns all validation errors at once (not just the first).
pub fn validate_grading(config: &GradingConfig) -> Result<(), Vec<String>> {
    let mut errors = Vec::new();

    if let Some(ref unit) = config.unit {
        validate_category("grading.unit", Category::Unit, unit, &mut errors);
    }
    if let Some(ref sessional) = config.sessional {
        validate_category("grading.sessional", Category::Sessional, sessional, &mut errors);
    }

    if let Some(max) = config.internal_max {
        if max == 0 || max > MAX_INTERNAL_MARKS {
            errors.push(format!(
                "grading.internal_max: must be between 1 and {}",
                MAX_INTERNAL_MARKS
            ));
        }
    }

    if let Some(start) = config.unit_start_code {
        if start > MAX_START_CODE {
            errors.push(format!(
                "grading.unit_start_code: must be at most {}",
                MAX_START_CODE
            ));
        }
    }

    if let Some(base) = config.base_multiplier {
        if !base.is_finite() || base < 0.0 {
            errors.push("grading.base_multiplier: must be a non-negative number".to_string());
        }
    }

    if let Some(step) = config.multiplier_step {
        if !step.is_finite() {
            errors.push("grading.multiplier_step: must be a finite number".to_string());
        }
    }

    if let Some(ref rules) = config.start_code_rules {
        let mut seen = HashSet::new();
        for (i, rule) in rules.iter().enumerate() {
            if rule.prefix.is_empty() {
                errors.push(format!("grading.start_code_rules[{}].prefix: must not be empty", i));
            } else if !seen.insert(rule.prefix.as_str()) {
                errors.push(format!(
                    "grading.start_code_rules[{}].prefix: duplicate prefix '{}'",
                    i, rule.prefix
                ));
            }
            if rule.start_code > MAX_START_CODE {
                errors.push(format!(
                    "grading.start_code_rules[{}].start_code: must be at most {}",
                    i, MAX_START_CODE
                ));
            }
        }
    }

    if let Some(ref offsets) = config.offsets {
        let mut seen = HashSet::new();
        for (i, entry) in offsets.iter().enumerate() {
            if entry.code > 999 {
                errors.push(format!(
                    "grading.offsets[{}].code: {} is not a three-digit code suffix",
                    i, entry.code
                ));
            } else if !seen.insert(entry.code) {
                errors.push(format!(
                    "grading.offsets[{}].code: duplicate code {}",
                    i, entry.code
                ));
            }
        }
    }

    if let Some(pass_mark) = config.pass_mark {
        if !pass_mark.is_finite() {
            errors.push("grading.pass_mark: must be a finite number".to_string());
        }
    }

    // Bands must be strictly descending with non-increasing points so that a
    // higher total never earns fewer grade points.
    if let Some(ref bands) = config.bands {
        for (i, band) in bands.iter().enumerate() {
            if !band.min.is_finite() {
                errors.push(format!("grading.bands[{}].min: must be a finite number", i));
            }
            if band.grade.trim().is_empty() {
                errors.push(format!("grading.bands[{}].grade: must not be empty", i));
            }
            if let Some(prev) = i.checked_sub(1).map(|p| &bands[p]) {
                if band.min >= prev.min {
                    errors.push(format!(
                        "grading.bands[{}].min: {} must be lower than the previous band's {}",
                        i, band.min, prev.min
                    ));
                }
                if band.points > prev.points {
                    errors.push(format!(
                        "grading.bands[{}].points: {} exceeds the previous band's {}",
                        i, band.points, prev.points
                    ));
                }
            }
        }
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}

fn validate_category(
    path: &str,
    category: Category,
    section: &CategoryConfig,
    errors: &mut Vec<String>,
) {
    if let Some(max) = section.external_max {
        let cap = category.external_cap();
        if max == 0 || max > cap {
            errors.push(format!("{}.external_max: must be between 1 and {}", path, cap));
        }
    }
    if let Some(credits) = section.credits {
        if !credits.is_finite() || credits < 0.0 {
            errors.push(format!("{}.credits: must be non-negative", path));
        }
    }
}
