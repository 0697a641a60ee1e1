pub mod json;
pub mod terminal;

use crate::report::DiagnosticReport;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputFormat {
    Terminal,
    Json,
}

pub fn print_report(report: &DiagnosticReport, format: OutputFormat) {
    match format {
        OutputFormat::Json => json::print(report),
        OutputFormat::Terminal => terminal::print(report),
    }
}
