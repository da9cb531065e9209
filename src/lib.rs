//! Turns a student's raw internal marks into a complete, reproducible marks
//! memo: averaged internals, seeded external marks, grades and totals.
//!
//! The engine entry point is [`grading::build_report`]; everything else here
//! is configuration loading and presentation around it.

pub mod config;
pub mod grading;
pub mod output;
pub mod report;

pub use grading::{build_report, GradingConfig, GradingError};
pub use report::{RawMark, Report, ReportRequest};
