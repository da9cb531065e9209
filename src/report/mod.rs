pub mod record;
pub mod types;

pub use record::{expand_patterns, load_records};
pub use types::{CategoryTotals, RawMark, Report, ReportRequest, ReportTotals, SubjectResult};
