use anyhow::{Context, Result};
use owo_colors::OwoColorize;
use std::io::IsTerminal;

use crate::grading::Status;
use crate::report::{CategoryTotals, Report, SubjectResult};

const HEADER: [&str; 8] = [
    "Code", "Internal", "External", "Total", "GP", "Credits", "Grade", "Status",
];
const WIDTHS: [usize; 8] = [6, 9, 9, 6, 3, 8, 6, 6];

/// Check if stdout is a TTY (for auto-detecting color support)
pub fn should_use_colors() -> bool {
    std::io::stdout().is_terminal()
}

/// Credits print without a trailing ".0" for whole numbers ("1", "2.5").
pub fn format_credits(credits: f64) -> String {
    if credits.fract() == 0.0 {
        format!("{:.0}", credits)
    } else {
        format!("{}", credits)
    }
}

fn pad_row(cells: &[String]) -> String {
    cells
        .iter()
        .zip(WIDTHS)
        .map(|(cell, width)| format!("{:<width$}", cell, width = width))
        .collect::<Vec<_>>()
        .join(" ")
        .trim_end()
        .to_string()
}

fn format_subject_row(result: &SubjectResult, use_colors: bool) -> String {
    let row = pad_row(&[
        result.subject_code.to_string(),
        result.internal_marks.to_string(),
        result.external_marks.to_string(),
        result.total_marks.to_string(),
        result.grade_points.to_string(),
        format_credits(result.credits),
        result.grade.clone(),
        result.status.as_str().to_string(),
    ]);

    if !use_colors {
        return row;
    }
    match result.status {
        Status::Pass => row.green().to_string(),
        Status::Fail => row.red().to_string(),
    }
}

fn format_section(
    title: &str,
    results: &[SubjectResult],
    totals: CategoryTotals,
    use_colors: bool,
) -> String {
    let mut lines = Vec::new();

    if use_colors {
        lines.push(title.bold().to_string());
    } else {
        lines.push(title.to_string());
    }

    if results.is_empty() {
        lines.push("  (no subjects)".to_string());
        return lines.join("\n");
    }

    let header = pad_row(&HEADER.map(str::to_string));
    lines.push(if use_colors {
        header.dimmed().to_string()
    } else {
        header
    });
    lines.extend(results.iter().map(|r| format_subject_row(r, use_colors)));
    lines.push(format!(
        "Internal: {}  External: {}  Total: {}",
        totals.internal,
        totals.external,
        totals.total()
    ));
    lines.join("\n")
}

/// Format a report as a human-readable memo: student details, one table per
/// category, then the totals.
pub fn format_report_table(report: &Report, use_colors: bool) -> String {
    let detail = |label: &str, value: &str| {
        let value = if value.is_empty() { "-" } else { value };
        if use_colors {
            format!("{:<8}: {}", label, value.cyan())
        } else {
            format!("{:<8}: {}", label, value)
        }
    };

    let mut sections = vec![[
        detail("PIN", &report.pin),
        detail("Name", &report.name),
        detail("Father", &report.father),
        detail("Branch", &report.branch),
    ]
    .join("\n")];

    sections.push(format_section(
        "Unit Test Marks",
        &report.unit_results,
        report.totals.unit(),
        use_colors,
    ));
    sections.push(format_section(
        "Sessional Marks",
        &report.session_results,
        report.totals.session(),
        use_colors,
    ));

    let grand = format!("Grand Total: {}", report.totals.grand_total);
    sections.push(if use_colors {
        grand.bold().to_string()
    } else {
        grand
    });

    sections.join("\n\n")
}

/// Pretty-printed JSON in the memo's published shape.
pub fn format_report_json(report: &Report) -> Result<String> {
    serde_json::to_string_pretty(report).context("Failed to serialize report")
}

/// Format a report as tab-separated values for scripting.
/// Columns: pin, category, code, internal, external, total, points, credits,
/// grade, status (no headers, no colors)
pub fn format_report_tsv(report: &Report) -> String {
    let rows = report
        .unit_results
        .iter()
        .map(|r| ("unit", r))
        .chain(report.session_results.iter().map(|r| ("sessional", r)));

    rows.map(|(category, r)| {
        format!(
            "{}\t{}\t{}\t{}\t{}\t{}\t{}\t{}\t{}\t{}",
            report.pin,
            category,
            r.subject_code,
            r.internal_marks,
            r.external_marks,
            r.total_marks,
            r.grade_points,
            format_credits(r.credits),
            r.grade,
            r.status.as_str()
        )
    })
    .collect::<Vec<_>>()
    .join("\n")
}
