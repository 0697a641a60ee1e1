mod cli;
mod decode;
mod error;
mod model;
mod orchestrator;
mod output;
mod parsers;
mod rc_config;
mod reader;
mod report;
mod source;

use std::process;

use clap::Parser;
use colored::control;
use tracing::debug;
use tracing_subscriber::EnvFilter;

use cli::Cli;
use decode::InputType;
use orchestrator::ParseOrchestrator;
use output::OutputFormat;
use rc_config::RcConfig;
use source::Source;

fn main() {
    let cli = Cli::parse();

    let cwd = std::env::current_dir().unwrap_or_default();
    let rc = match RcConfig::load(&cwd) {
        Ok(rc) => rc,
        Err(e) => {
            eprintln!("Error: {:#}", e);
            process::exit(2);
        }
    };

    init_logging(cli.verbose.max(rc.verbose.unwrap_or(0)));

    if cli.no_color || rc.no_color.unwrap_or(false) {
        control::set_override(false);
    }

    let type_name = cli
        .input_type
        .clone()
        .or(rc.input_type.clone())
        .unwrap_or_else(|| "xml".to_string());
    let input_type: InputType = match type_name.parse() {
        Ok(t) => t,
        Err(e) => {
            eprintln!("Error: {}", e);
            process::exit(2);
        }
    };

    let source = match (&cli.path, cli.clip) {
        (Some(path), _) => Source::File(path.clone()),
        (None, true) => Source::Clipboard,
        (None, false) => Source::Stdin,
    };
    debug!(?source, %input_type, "starting");

    let report = match source
        .acquire()
        .and_then(|raw| reader::read(&raw, input_type, &ParseOrchestrator::default()))
    {
        Ok(report) => report,
        Err(e) => {
            eprintln!("Error: {}", e);
            process::exit(2);
        }
    };

    let format = if cli.json || rc.json.unwrap_or(false) {
        OutputFormat::Json
    } else {
        OutputFormat::Terminal
    };
    output::print_report(&report, format);

    if !report.saml_is_valid() {
        process::exit(1);
    }
}

fn init_logging(verbosity: u8) {
    let level = match verbosity {
        0 => "warn",
        1 => "debug",
        _ => "trace",
    };
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(format!("{}={}", env!("CARGO_CRATE_NAME"), level)));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}
