use serde::Serialize;

use crate::report::DiagnosticReport;

#[derive(Serialize)]
struct JsonReport<'a> {
    version: &'static str,
    #[serde(flatten)]
    report: &'a DiagnosticReport,
}

pub fn render(report: &DiagnosticReport) -> serde_json::Result<String> {
    serde_json::to_string_pretty(&JsonReport {
        version: env!("CARGO_PKG_VERSION"),
        report,
    })
}

pub fn print(report: &DiagnosticReport) {
    match render(report) {
        Ok(json) => println!("{}", json),
        Err(e) => eprintln!("Failed to serialize JSON: {}", e),
    }
}
