use serde::{Deserialize, Serialize};

use super::config::GradeBand;

pub const FAIL_GRADE: &str = "F";

/// Pass/fail flag printed on the memo.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Status {
    #[serde(rename = "P")]
    Pass,
    #[serde(rename = "F")]
    Fail,
}

impl Status {
    pub fn as_str(&self) -> &'static str {
        match self {
            Status::Pass => "P",
            Status::Fail => "F",
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct GradeOutcome {
    pub points: u32,
    pub grade: String,
    pub status: Status,
}

/// Map a subject total to grade points, letter grade and status.
///
/// Bands are scanned highest first and the first inclusive lower bound that
/// the total reaches wins. Anything below every band, including negative
/// totals and NaN, gets 0 points and an F. Totals above 100 stay in the top
/// band.
pub fn grade_for(total: f64, bands: &[GradeBand], pass_mark: f64) -> GradeOutcome {
    let (points, grade) = bands
        .iter()
        .find(|band| total >= band.min)
        .map(|band| (band.points, band.grade.clone()))
        .unwrap_or_else(|| (0, FAIL_GRADE.to_string()));

    let status = if total >= pass_mark {
        Status::Pass
    } else {
        Status::Fail
    };

    GradeOutcome {
        points,
        grade,
        status,
    }
}
