use serde::{Deserialize, Serialize};

use crate::grading::Status;

/// A raw mark as it arrives from the caller: a number, or the text of a
/// scraped table cell.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum RawMark {
    Score(f64),
    Text(String),
}

impl RawMark {
    /// Numeric value of the mark. Blank text counts as 0; other text must
    /// parse as a number. Validity (finite, non-negative) is checked by the
    /// engine.
    pub fn value(&self) -> Option<f64> {
        match self {
            RawMark::Score(v) => Some(*v),
            RawMark::Text(s) if s.trim().is_empty() => Some(0.0),
            RawMark::Text(s) => s.trim().parse().ok(),
        }
    }
}

impl From<f64> for RawMark {
    fn from(v: f64) -> Self {
        RawMark::Score(v)
    }
}

impl From<u32> for RawMark {
    fn from(v: u32) -> Self {
        RawMark::Score(v as f64)
    }
}

impl From<&str> for RawMark {
    fn from(s: &str) -> Self {
        RawMark::Text(s.to_string())
    }
}

impl std::fmt::Display for RawMark {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            RawMark::Score(v) => write!(f, "{}", v),
            RawMark::Text(s) => write!(f, "{}", s),
        }
    }
}

/// Everything the engine needs for one student.
///
/// Also the on-disk shape of a student record file (JSON or YAML).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReportRequest {
    /// Opaque student identifier (PIN); only used to seed external marks
    #[serde(alias = "pin")]
    pub identifier: String,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub father: String,
    #[serde(default)]
    pub branch: String,
    #[serde(default)]
    pub unit_marks: Vec<RawMark>,
    #[serde(default, alias = "sessionalMarks")]
    pub session_marks: Vec<RawMark>,
}

impl ReportRequest {
    pub fn new(identifier: impl Into<String>) -> Self {
        Self {
            identifier: identifier.into(),
            name: String::new(),
            father: String::new(),
            branch: String::new(),
            unit_marks: Vec::new(),
            session_marks: Vec::new(),
        }
    }

    pub fn with_unit_marks<M: Into<RawMark>>(mut self, marks: impl IntoIterator<Item = M>) -> Self {
        self.unit_marks = marks.into_iter().map(Into::into).collect();
        self
    }

    pub fn with_session_marks<M: Into<RawMark>>(
        mut self,
        marks: impl IntoIterator<Item = M>,
    ) -> Self {
        self.session_marks = marks.into_iter().map(Into::into).collect();
        self
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SubjectResult {
    pub subject_code: u32,
    pub internal_marks: u32,
    pub external_marks: u32,
    pub total_marks: u32,
    pub grade_points: u32,
    pub credits: f64,
    pub grade: String,
    pub status: Status,
}

/// Internal and external sums for one category.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CategoryTotals {
    pub internal: u32,
    pub external: u32,
}

impl CategoryTotals {
    pub fn from_results(results: &[SubjectResult]) -> Self {
        results.iter().fold(Self::default(), |acc, r| Self {
            internal: acc.internal + r.internal_marks,
            external: acc.external + r.external_marks,
        })
    }

    pub fn total(&self) -> u32 {
        self.internal + self.external
    }
}

/// The totals block of a memo, keyed the way downstream consumers read it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReportTotals {
    pub total_internal_unit: u32,
    pub total_external_unit: u32,
    pub total_internal_session: u32,
    pub total_external_session: u32,
    #[serde(rename = "GrandTotal")]
    pub grand_total: u32,
}

impl ReportTotals {
    pub fn from_categories(unit: CategoryTotals, session: CategoryTotals) -> Self {
        Self {
            total_internal_unit: unit.internal,
            total_external_unit: unit.external,
            total_internal_session: session.internal,
            total_external_session: session.external,
            grand_total: unit.internal + unit.external + session.internal + session.external,
        }
    }

    pub fn unit(&self) -> CategoryTotals {
        CategoryTotals {
            internal: self.total_internal_unit,
            external: self.total_external_unit,
        }
    }

    pub fn session(&self) -> CategoryTotals {
        CategoryTotals {
            internal: self.total_internal_session,
            external: self.total_external_session,
        }
    }
}

/// A finished memo. Built once, never mutated.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Report {
    pub pin: String,
    pub name: String,
    pub father: String,
    pub branch: String,
    pub unit_results: Vec<SubjectResult>,
    pub session_results: Vec<SubjectResult>,
    pub totals: ReportTotals,
}
