pub mod averaging;
pub mod bands;
pub mod codes;
pub mod config;
pub mod engine;
pub mod error;
pub mod synthesis;
pub mod validation;

pub use bands::{grade_for, GradeOutcome, Status};
pub use config::*;
pub use engine::{build_report, grade_subject};
pub use error::GradingError;
pub use synthesis::{pseudo_random, synthesize_external, ExternalBreakdown};
pub use validation::validate_grading;
