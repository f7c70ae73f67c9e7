use std::path::PathBuf;
use std::process;

use clap::Parser;
use tracing::Level;

use vulcanize::config::{build_options, ModeFlags};
use vulcanize::core::{create_vulcanized_document, write_output, VulcanizeResult};

const ANSI_COLOR_RED: &str = "\x1b[31m";
const ANSI_COLOR_RESET: &str = "\x1b[0m";

/// Flatten HTML imports into a single file
#[derive(Parser, Debug)]
#[command(name = "vulcanize")]
#[command(version, about, long_about = None)]
struct Cli {
    /// Input file name
    #[arg(short, long = "input", value_name = "FILE")]
    input_flag: Option<PathBuf>,

    /// Input file name, taking precedence over --input
    #[arg(value_name = "INPUT")]
    input: Option<PathBuf>,

    /// Output file name [default: <input dir>/vulcanized.html]
    #[arg(short, long, value_name = "FILE")]
    output: Option<PathBuf>,

    /// Read a given config file
    #[arg(short, long, value_name = "FILE")]
    config: Option<PathBuf>,

    /// Extract inline scripts to a separate file (uses <output file name>.js)
    #[arg(long)]
    csp: bool,

    /// Inline external scripts into the document
    #[arg(long)]
    inline: bool,

    /// Remove comments and empty text nodes
    #[arg(long)]
    strip: bool,

    /// More verbose logging
    #[arg(short, long)]
    verbose: bool,
}

fn main() {
    let cli = Cli::parse();

    tracing_subscriber::fmt()
        .with_max_level(if cli.verbose {
            Level::DEBUG
        } else {
            Level::INFO
        })
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();

    if let Err(error) = run(&cli) {
        print_error_message(&error.to_string());
        process::exit(1);
    }
}

fn run(cli: &Cli) -> VulcanizeResult<()> {
    let options = build_options(
        cli.input.as_deref().or(cli.input_flag.as_deref()),
        cli.output.as_deref(),
        cli.config.as_deref(),
        ModeFlags {
            csp: cli.csp,
            inline: cli.inline,
            strip: cli.strip,
            verbose: cli.verbose,
        },
    )?;

    let output = create_vulcanized_document(&options)?;
    write_output(&options, &output)
}

/// Prints an error message to stderr, in red when stderr is a terminal
fn print_error_message(msg: &str) {
    if atty::is(atty::Stream::Stderr) {
        eprintln!("{ANSI_COLOR_RED}{msg}{ANSI_COLOR_RESET}");
    } else {
        eprintln!("{msg}");
    }
}
