use clap::{ArgAction, Parser};
use std::path::PathBuf;

/// SAML response reader
#[derive(Parser, Debug)]
#[command(
    name = "saml_reader",
    version,
    about = "Decode and diagnose SAML responses",
    long_about = "Reads a SAML response as base64, raw XML, or from a HAR capture of the \
                  login flow, parses it with progressively more lenient parsers, and reports \
                  the identity provider values, signing certificate, and any problems found.",
    after_help = "\
EXAMPLES:
  saml_reader response.xml                 Read raw XML from a file
  saml_reader -t base64 --clip             Read base64 from the clipboard
  pbpaste | saml_reader -t base64 --stdin  Read base64 from a pipe
  saml_reader -t har login.har --json      Extract from a HAR capture, print JSON

EXIT CODES:
  0  SAML response parsed
  1  Input read, but no usable SAML response (see errors)
  2  Tool failure (e.g., file not found, invalid input)

DEFAULTS:
  Defaults for --type, --json, --no-color and --verbose can be set in a
  .samlreaderrc TOML file in the current directory or $HOME."
)]
pub struct Cli {
    /// File containing the input data
    #[arg(value_name = "PATH", conflicts_with_all = ["stdin", "clip"])]
    pub path: Option<PathBuf>,

    /// Read input from stdin (the default when no PATH is given)
    #[arg(long, conflicts_with = "clip")]
    pub stdin: bool,

    /// Read input from the system clipboard
    #[arg(long)]
    pub clip: bool,

    /// Input data type: base64, xml or har [default: xml]
    #[arg(short = 't', long = "type", value_name = "TYPE")]
    pub input_type: Option<String>,

    /// Output the report as JSON
    #[arg(long)]
    pub json: bool,

    /// Disable colored output
    #[arg(long)]
    pub no_color: bool,

    /// Log parser decisions to stderr (-vv for trace)
    #[arg(short, long, action = ArgAction::Count)]
    pub verbose: u8,
}
