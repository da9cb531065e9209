use super::averaging::{average_pairs, round_each};
use super::bands::grade_for;
use super::codes::{generate_codes, sessional_start_code, unit_start_code};
use super::config::{Category, CategoryRules, GradingConfig};
use super::error::GradingError;
use super::synthesis::{parse_seed, synthesize_external};
use crate::report::types::{
    CategoryTotals, RawMark, Report, ReportRequest, ReportTotals, SubjectResult,
};

/// Build the complete memo for one student.
///
/// Unit and sessional marks are processed independently with their own
/// category rules. Either a full report is returned or an error; nothing is
/// computed partially.
pub fn build_report(
    request: &ReportRequest,
    config: &GradingConfig,
) -> Result<Report, GradingError> {
    let identifier = request.identifier.as_str();
    check_identifier(identifier)?;

    let unit_rules = config.rules_for(Category::Unit);
    let session_rules = config.rules_for(Category::Sessional);

    let unit_internal = internal_marks(&request.unit_marks, &unit_rules)?;
    let session_internal = internal_marks(&request.session_marks, &session_rules)?;

    let unit_start = unit_start_code(identifier, config);
    let unit_codes = subject_codes(unit_start, unit_internal.len())?;
    let session_start =
        sessional_start_code(&unit_codes, unit_start).ok_or(GradingError::CodeOverflow {
            start: unit_start,
            count: unit_codes.len() + session_internal.len(),
        })?;
    let session_codes = subject_codes(session_start, session_internal.len())?;

    let unit_results =
        grade_category(identifier, &unit_codes, &unit_internal, &unit_rules, config)?;
    let session_results =
        grade_category(identifier, &session_codes, &session_internal, &session_rules, config)?;

    let totals = ReportTotals::from_categories(
        CategoryTotals::from_results(&unit_results),
        CategoryTotals::from_results(&session_results),
    );

    tracing::debug!(
        identifier,
        unit_subjects = unit_results.len(),
        session_subjects = session_results.len(),
        grand_total = totals.grand_total,
        "built report"
    );

    Ok(Report {
        pin: request.identifier.clone(),
        name: request.name.clone(),
        father: request.father.clone(),
        branch: request.branch.clone(),
        unit_results,
        session_results,
        totals,
    })
}

/// Compute one subject's result from its averaged (unclamped) internal mark.
///
/// The external mark is synthesized from the raw internal value first; the
/// internal mark is clamped afterwards for the total.
pub fn grade_subject(
    identifier: &str,
    subject_code: u32,
    internal: u32,
    rules: &CategoryRules,
    config: &GradingConfig,
) -> Result<SubjectResult, GradingError> {
    let breakdown = synthesize_external(identifier, subject_code, internal, rules, config)?;
    let internal_marks = internal.min(config.internal_max());
    let external_marks = breakdown.external;
    let total_marks = internal_marks + external_marks;
    let outcome = grade_for(total_marks as f64, &config.bands(), config.pass_mark());

    tracing::debug!(
        category = %rules.category,
        subject_code,
        internal_marks,
        external_marks,
        total_marks,
        grade = %outcome.grade,
        "graded subject"
    );

    Ok(SubjectResult {
        subject_code,
        internal_marks,
        external_marks,
        total_marks,
        grade_points: outcome.points,
        credits: rules.credits,
        grade: outcome.grade,
        status: outcome.status,
    })
}

fn subject_codes(start: u32, count: usize) -> Result<Vec<u32>, GradingError> {
    generate_codes(start, count).ok_or(GradingError::CodeOverflow { start, count })
}

fn grade_category(
    identifier: &str,
    codes: &[u32],
    internal: &[u32],
    rules: &CategoryRules,
    config: &GradingConfig,
) -> Result<Vec<SubjectResult>, GradingError> {
    codes
        .iter()
        .zip(internal)
        .map(|(&code, &mark)| grade_subject(identifier, code, mark, rules, config))
        .collect()
}

fn check_identifier(identifier: &str) -> Result<(), GradingError> {
    match parse_seed(identifier) {
        Some(_) => Ok(()),
        None => Err(GradingError::MalformedIdentifier(identifier.to_string())),
    }
}

/// Validate raw marks and reduce them to one internal mark per subject.
fn internal_marks(raw: &[RawMark], rules: &CategoryRules) -> Result<Vec<u32>, GradingError> {
    let values = raw
        .iter()
        .enumerate()
        .map(|(i, mark)| match mark.value() {
            Some(v) if v.is_finite() && v >= 0.0 => Ok(v),
            _ => Err(GradingError::InvalidInput {
                category: rules.category,
                position: i + 1,
                value: mark.to_string(),
            }),
        })
        .collect::<Result<Vec<f64>, _>>()?;

    let mut marks = if rules.paired {
        average_pairs(&values)
    } else {
        round_each(&values)
    };

    if let Some(expected) = rules.subjects {
        if marks.len() < expected {
            return Err(GradingError::InsufficientData {
                category: rules.category,
                expected,
                found: marks.len(),
            });
        }
        if marks.len() > expected {
            tracing::debug!(
                category = %rules.category,
                expected,
                found = marks.len(),
                "ignoring marks beyond the declared subject count"
            );
            marks.truncate(expected);
        }
    }

    Ok(marks)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::grading::{CategoryConfig, Status};

    fn sample_request() -> ReportRequest {
        let mut request = ReportRequest::new("2301234")
            .with_unit_marks([18u32, 16, 20, 19, 15, 15, 12, 10, 19, 20])
            .with_session_marks([45u32, 52, 38, 60]);
        request.name = "Ravi Kumar".to_string();
        request.father = "Suresh".to_string();
        request.branch = "CME".to_string();
        request
    }

    fn config_with(unit: CategoryConfig, sessional: CategoryConfig) -> GradingConfig {
        GradingConfig {
            unit: Some(unit),
            sessional: Some(sessional),
            ..GradingConfig::default()
        }
    }

    #[test]
    fn test_report_shape() {
        let report = build_report(&sample_request(), &GradingConfig::default()).unwrap();

        assert_eq!(report.pin, "2301234");
        assert_eq!(report.name, "Ravi Kumar");
        assert_eq!(report.father, "Suresh");
        assert_eq!(report.branch, "CME");
        assert_eq!(report.unit_results.len(), 5);
        assert_eq!(report.session_results.len(), 4);
    }

    #[test]
    fn test_unit_marks_are_averaged() {
        let report = build_report(&sample_request(), &GradingConfig::default()).unwrap();
        let internal: Vec<u32> = report.unit_results.iter().map(|r| r.internal_marks).collect();
        assert_eq!(internal, vec![17, 20, 15, 11, 20]);
    }

    #[test]
    fn test_sessional_marks_not_paired_by_default() {
        let report = build_report(&sample_request(), &GradingConfig::default()).unwrap();
        let internal: Vec<u32> = report
            .session_results
            .iter()
            .map(|r| r.internal_marks)
            .collect();
        assert_eq!(internal, vec![45, 52, 38, 60]);
    }

    #[test]
    fn test_sessional_pairing_is_configurable() {
        let config = config_with(
            CategoryConfig::default(),
            CategoryConfig {
                paired: Some(true),
                ..CategoryConfig::default()
            },
        );
        let report = build_report(&sample_request(), &config).unwrap();
        let internal: Vec<u32> = report
            .session_results
            .iter()
            .map(|r| r.internal_marks)
            .collect();
        assert_eq!(internal, vec![49, 49]);
    }

    #[test]
    fn test_subject_codes_contiguous() {
        let report = build_report(&sample_request(), &GradingConfig::default()).unwrap();
        let unit: Vec<u32> = report.unit_results.iter().map(|r| r.subject_code).collect();
        let session: Vec<u32> = report.session_results.iter().map(|r| r.subject_code).collect();
        assert_eq!(unit, vec![401, 402, 403, 404, 405]);
        assert_eq!(session, vec![406, 407, 408, 409]);
    }

    #[test]
    fn test_prefix_identifier_shifts_codes() {
        let mut request = sample_request();
        request.identifier = "24001-CM-017".to_string();
        let report = build_report(&request, &GradingConfig::default()).unwrap();
        assert_eq!(report.unit_results[0].subject_code, 101);
        assert_eq!(report.session_results[0].subject_code, 106);
    }

    #[test]
    fn test_report_is_deterministic() {
        let config = GradingConfig::default();
        let first = build_report(&sample_request(), &config).unwrap();
        let second = build_report(&sample_request(), &config).unwrap();
        assert_eq!(first, second);
    }

    #[test]
    fn test_single_subject_example() {
        let request = ReportRequest::new("2301234").with_unit_marks([18u32, 16]);
        let config = GradingConfig::default();
        let report = build_report(&request, &config).unwrap();

        let subject = &report.unit_results[0];
        assert_eq!(subject.subject_code, 401);
        assert_eq!(subject.internal_marks, 17);

        let rules = config.rules_for(Category::Unit);
        let expected = synthesize_external("2301234", 401, 17, &rules, &config).unwrap();
        assert_eq!(subject.external_marks, expected.external);
        assert_eq!(subject.total_marks, 17 + expected.external);
    }

    #[test]
    fn test_marks_within_bounds() {
        let request = ReportRequest::new("2301234")
            .with_unit_marks([200u32, 180, 0, 0, 95, 100])
            .with_session_marks([150u32, 0, 80]);
        let report = build_report(&request, &GradingConfig::default()).unwrap();

        for r in &report.unit_results {
            assert!(r.internal_marks <= 80);
            assert!(r.external_marks <= 80);
        }
        for r in &report.session_results {
            assert!(r.internal_marks <= 80);
            assert!(r.external_marks <= 60);
        }
        assert_eq!(report.unit_results[0].internal_marks, 80);
        assert_eq!(report.session_results[0].internal_marks, 80);
    }

    #[test]
    fn test_external_uses_unclamped_internal() {
        let config = GradingConfig {
            base_multiplier: Some(0.3),
            multiplier_step: Some(0.0),
            ..GradingConfig::default()
        };
        let request = ReportRequest::new("2301234").with_session_marks([120u32]);
        let report = build_report(&request, &config).unwrap();

        let rules = config.rules_for(Category::Sessional);
        let from_raw = synthesize_external("2301234", 401, 120, &rules, &config).unwrap();
        let from_clamped = synthesize_external("2301234", 401, 80, &rules, &config).unwrap();
        let subject = &report.session_results[0];
        assert_eq!(subject.internal_marks, 80);
        assert_eq!(subject.external_marks, from_raw.external);
        assert_ne!(subject.external_marks, from_clamped.external);
    }

    #[test]
    fn test_oversized_maxima_are_capped() {
        let config = GradingConfig {
            sessional: Some(CategoryConfig {
                external_max: Some(80),
                ..CategoryConfig::default()
            }),
            internal_max: Some(100),
            base_multiplier: Some(5.0),
            ..GradingConfig::default()
        };
        let request = ReportRequest::new("2301234")
            .with_unit_marks([95u32, 95])
            .with_session_marks([95u32]);
        let report = build_report(&request, &config).unwrap();

        assert_eq!(report.unit_results[0].internal_marks, 80);
        assert_eq!(report.session_results[0].internal_marks, 80);
        assert_eq!(report.session_results[0].external_marks, 60);
    }

    #[test]
    fn test_start_code_overflow_is_an_error() {
        let config = GradingConfig {
            unit_start_code: Some(u32::MAX),
            start_code_rules: Some(vec![]),
            ..GradingConfig::default()
        };
        let request = ReportRequest::new("2301234").with_unit_marks([18u32, 16, 20, 19]);
        assert_eq!(
            build_report(&request, &config),
            Err(GradingError::CodeOverflow {
                start: u32::MAX,
                count: 2,
            })
        );

        // A single unit subject fits, but sessional codes have nowhere to go
        let request = ReportRequest::new("2301234")
            .with_unit_marks([18u32, 16])
            .with_session_marks([45u32]);
        assert_eq!(
            build_report(&request, &config),
            Err(GradingError::CodeOverflow {
                start: u32::MAX,
                count: 2,
            })
        );
    }

    #[test]
    fn test_grade_depends_on_total_only() {
        let report = build_report(&sample_request(), &GradingConfig::default()).unwrap();
        let config = GradingConfig::default();
        for r in report.unit_results.iter().chain(&report.session_results) {
            let outcome = grade_for(r.total_marks as f64, &config.bands(), config.pass_mark());
            assert_eq!(r.grade_points, outcome.points);
            assert_eq!(r.grade, outcome.grade);
            assert_eq!(r.status, outcome.status);
            assert_eq!(r.status == Status::Pass, r.total_marks >= 40);
        }
    }

    #[test]
    fn test_credits_per_category() {
        let report = build_report(&sample_request(), &GradingConfig::default()).unwrap();
        assert!(report.unit_results.iter().all(|r| r.credits == 2.5));
        assert!(report.session_results.iter().all(|r| r.credits == 1.0));
    }

    #[test]
    fn test_totals_add_up() {
        let report = build_report(&sample_request(), &GradingConfig::default()).unwrap();
        let t = &report.totals;

        let unit_internal: u32 = report.unit_results.iter().map(|r| r.internal_marks).sum();
        let unit_external: u32 = report.unit_results.iter().map(|r| r.external_marks).sum();
        assert_eq!(t.total_internal_unit, unit_internal);
        assert_eq!(t.total_external_unit, unit_external);
        assert_eq!(
            t.grand_total,
            t.total_internal_unit
                + t.total_external_unit
                + t.total_internal_session
                + t.total_external_session
        );

        let subject_sum: u32 = report
            .unit_results
            .iter()
            .chain(&report.session_results)
            .map(|r| r.total_marks)
            .sum();
        assert_eq!(t.grand_total, subject_sum);
    }

    #[test]
    fn test_empty_marks_produce_empty_report() {
        let request = ReportRequest::new("2301234");
        let report = build_report(&request, &GradingConfig::default()).unwrap();
        assert!(report.unit_results.is_empty());
        assert!(report.session_results.is_empty());
        assert_eq!(report.totals.grand_total, 0);
    }

    #[test]
    fn test_odd_unit_marks_pad_with_zero() {
        let request = ReportRequest::new("2301234").with_unit_marks([18u32, 16, 20]);
        let report = build_report(&request, &GradingConfig::default()).unwrap();
        assert_eq!(report.unit_results.len(), 2);
        assert_eq!(report.unit_results[1].internal_marks, 10);
    }

    #[test]
    fn test_negative_mark_rejected() {
        let request = ReportRequest::new("2301234").with_unit_marks([18.0, -1.0]);
        let err = build_report(&request, &GradingConfig::default()).unwrap_err();
        assert_eq!(
            err,
            GradingError::InvalidInput {
                category: Category::Unit,
                position: 2,
                value: "-1".to_string(),
            }
        );
    }

    #[test]
    fn test_non_numeric_mark_rejected() {
        let request = ReportRequest::new("2301234").with_session_marks(["45", "AB"]);
        let err = build_report(&request, &GradingConfig::default()).unwrap_err();
        assert!(matches!(
            err,
            GradingError::InvalidInput {
                category: Category::Sessional,
                position: 2,
                ..
            }
        ));
    }

    #[test]
    fn test_non_finite_mark_rejected() {
        let request = ReportRequest::new("2301234").with_unit_marks([f64::NAN]);
        let err = build_report(&request, &GradingConfig::default()).unwrap_err();
        assert!(matches!(err, GradingError::InvalidInput { .. }));
    }

    #[test]
    fn test_blank_cell_counts_as_zero() {
        let request = ReportRequest::new("2301234").with_session_marks(["", " 30 "]);
        let report = build_report(&request, &GradingConfig::default()).unwrap();
        assert_eq!(report.session_results[0].internal_marks, 0);
        assert_eq!(report.session_results[1].internal_marks, 30);
    }

    #[test]
    fn test_malformed_identifier() {
        for identifier in ["", "   ", "#2301234", "-"] {
            let request = ReportRequest::new(identifier).with_unit_marks([18u32, 16]);
            let err = build_report(&request, &GradingConfig::default()).unwrap_err();
            assert_eq!(err, GradingError::MalformedIdentifier(identifier.to_string()));
        }
    }

    #[test]
    fn test_declared_count_shortfall() {
        let config = config_with(
            CategoryConfig {
                subjects: Some(5),
                ..CategoryConfig::default()
            },
            CategoryConfig::default(),
        );
        let request = ReportRequest::new("2301234").with_unit_marks([18u32, 16, 20, 19]);
        let err = build_report(&request, &config).unwrap_err();
        assert_eq!(
            err,
            GradingError::InsufficientData {
                category: Category::Unit,
                expected: 5,
                found: 2,
            }
        );
    }

    #[test]
    fn test_declared_count_truncates_extra_marks() {
        let config = config_with(
            CategoryConfig::default(),
            CategoryConfig {
                subjects: Some(2),
                ..CategoryConfig::default()
            },
        );
        let report = build_report(&sample_request(), &config).unwrap();
        assert_eq!(report.session_results.len(), 2);
        assert_eq!(report.session_results[1].subject_code, 407);
    }

    #[test]
    fn test_declared_count_accepts_missing_last_attempt() {
        let config = config_with(
            CategoryConfig {
                subjects: Some(2),
                ..CategoryConfig::default()
            },
            CategoryConfig::default(),
        );
        let request = ReportRequest::new("2301234").with_unit_marks([18u32, 16, 20]);
        assert!(build_report(&request, &config).is_ok());
    }
}
