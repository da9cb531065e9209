pub mod formatter;

pub use formatter::{
    format_credits, format_report_json, format_report_table, format_report_tsv,
    should_use_colors,
};
