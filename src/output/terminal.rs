use chrono::Utc;
use colored::Colorize;

use crate::model::saml_response::SamlResponse;
use crate::parsers::certificate::Certificate;
use crate::report::DiagnosticReport;

pub fn print(report: &DiagnosticReport) {
    print_errors(report.errors());

    if let Some(saml) = report.saml().filter(|_| report.saml_is_valid()) {
        print_saml(saml);
    }
    if let Some(cert) = report.certificate() {
        print_certificate(cert);
    }

    println!();
    print_summary(report);
}

fn print_errors(errors: &[String]) {
    if errors.is_empty() {
        return;
    }

    println!("\n{}", "── Errors ──".bold());
    for error in errors {
        let mut lines = error.trim_end().lines();
        if let Some(first) = lines.next() {
            let status = if first.starts_with("WARNING") {
                "WARN".yellow().bold()
            } else {
                "FAIL".red().bold()
            };
            let first = first.trim_start_matches("WARNING: ");
            println!("  {} {}", status, first);
        }
        for line in lines {
            println!("       {} {}", "→".dimmed(), line.dimmed());
        }
    }
}

fn print_saml(saml: &SamlResponse) {
    println!("\n{}", "── SAML response ──".bold());
    print_field("Issuer", saml.issuer.as_deref());
    print_field("NameID", saml.name_id.as_deref());
    print_field("NameID format", saml.name_id_format.as_deref());
    print_field("Audience", saml.audience.as_deref());
    print_field("ACS URL", saml.acs.as_deref());

    if saml.attributes.is_empty() {
        return;
    }

    println!("  {}", "Attributes:".dimmed());
    let width = saml.attributes.keys().map(|k| k.len()).max().unwrap_or(0);
    for (name, values) in &saml.attributes {
        println!(
            "    {} {:<width$}  {}",
            "•".dimmed(),
            name,
            values.join(", "),
            width = width
        );
    }
}

fn print_certificate(cert: &Certificate) {
    println!("\n{}", "── IdP certificate ──".bold());
    print_field("Common name", cert.common_name.as_deref());
    print_field("Organization", cert.organization.as_deref());
    print_field("Subject", Some(cert.subject.as_str()));
    print_field("Issuer", Some(cert.issuer.as_str()));
    print_field("Serial", Some(cert.serial.as_str()));
    let key_size = format!("{} bits", cert.key_size_bits);
    print_field("Key size", Some(key_size.as_str()));
    let not_before = cert.not_before.to_rfc3339();
    print_field("Not before", Some(not_before.as_str()));

    let not_after = cert.not_after.to_rfc3339();
    if cert.is_expired_at(Utc::now()) {
        println!(
            "  {:<14} {} {}",
            "Not after:".dimmed(),
            not_after,
            "(expired)".red().bold()
        );
    } else {
        print_field("Not after", Some(not_after.as_str()));
    }
}

fn print_field(label: &str, value: Option<&str>) {
    let label = format!("{}:", label);
    match value {
        Some(v) => println!("  {:<14} {}", label.dimmed(), v),
        None => println!("  {:<14} {}", label.dimmed(), "(not found)".dimmed()),
    }
}

fn print_summary(report: &DiagnosticReport) {
    let flag = |valid: bool| if valid { "valid" } else { "invalid" };
    let line = format!(
        "Summary: SAML {} | certificate {} | parser {} | {} messages",
        flag(report.saml_is_valid()),
        flag(report.cert_is_valid()),
        report.parser_tier(),
        report.errors().len(),
    );

    if !report.saml_is_valid() {
        println!("{}", line.red().bold());
    } else if !report.errors().is_empty() {
        println!("{}", line.yellow().bold());
    } else {
        println!("{}", line.green().bold());
    }
}
