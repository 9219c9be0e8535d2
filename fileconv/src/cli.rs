//! # fileconv CLI
//!
//! Argument parsing, validation and the user-visible run loop. Everything that
//! touches file contents lives in `fileconv-core`; this module only wires the
//! flags, the optional YAML config and the console output together.
//!
//! - For command-line users: `fileconv --input people.csv --output people.xml`.
//! - For programmatic use and integration tests: call [`run`] with a [`Cli`].

use crate::load_config::{load_config, resolve_config_path};
use anyhow::Result;
use clap::Parser;
use fileconv_core::contract::{ConversionReport, ConversionRequest, FormatConverter};
use fileconv_core::{validate_file, ConvertOptions, SimpleFormatConverter};
use std::fmt;
use std::path::{Path, PathBuf};

/// Convert data files between JSON, XML and CSV.
#[derive(Parser, Debug, Clone)]
#[clap(
    name = "fileconv",
    version,
    about = "Convert data files between JSON, XML and CSV; formats follow the file extensions"
)]
pub struct Cli {
    /// Input file (.json, .xml or .csv)
    #[clap(long, value_name = "INPUT_FILE")]
    pub input: String,

    /// Output file (.json, .xml or .csv); missing directories are created
    #[clap(long, value_name = "OUTPUT_FILE")]
    pub output: String,

    /// Write CSV output without a header row
    #[clap(long)]
    pub csv_mapping: bool,

    /// YAML file with conversion options (falls back to $FILECONV_CONFIG)
    #[clap(long, value_name = "YAML")]
    pub config: Option<PathBuf>,
}

/// Validated view of the positional parts of a [`Cli`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommandLineArgs {
    input_file: String,
    output_file: String,
    csv_mapping: bool,
}

impl CommandLineArgs {
    pub fn new(input_file: impl Into<String>, output_file: impl Into<String>) -> Self {
        Self {
            input_file: input_file.into(),
            output_file: output_file.into(),
            csv_mapping: false,
        }
    }

    pub fn with_csv_mapping(mut self, csv_mapping: bool) -> Self {
        self.csv_mapping = csv_mapping;
        self
    }

    pub fn input_file(&self) -> &str {
        &self.input_file
    }

    pub fn output_file(&self) -> &str {
        &self.output_file
    }

    pub fn is_csv_mapping(&self) -> bool {
        self.csv_mapping
    }

    /// Rejects blank input or output paths.
    pub fn validate(&self) -> Result<()> {
        if self.input_file.trim().is_empty() {
            anyhow::bail!("Input file path cannot be null or empty");
        }
        if self.output_file.trim().is_empty() {
            anyhow::bail!("Output file path cannot be null or empty");
        }
        Ok(())
    }
}

impl From<&Cli> for CommandLineArgs {
    fn from(cli: &Cli) -> Self {
        CommandLineArgs::new(cli.input.clone(), cli.output.clone()).with_csv_mapping(cli.csv_mapping)
    }
}

impl fmt::Display for CommandLineArgs {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "CommandLineArgs{{input_file='{}', output_file='{}', csv_mapping={}}}",
            self.input_file, self.output_file, self.csv_mapping
        )
    }
}

/// Extracted async CLI logic entrypoint for integration tests and main()
pub async fn run(cli: Cli) -> Result<ConversionReport> {
    // Emit a top-level 'trace_initialised' event at the very start
    tracing::info!("trace_initialised");

    let args = CommandLineArgs::from(&cli);
    args.validate()?;
    tracing::debug!(%args, "Arguments validated");

    validate_file(args.input_file())?;

    let mut options = match resolve_config_path(cli.config) {
        Some(path) => load_config(path)?.options,
        None => ConvertOptions::default(),
    };
    if args.is_csv_mapping() {
        options.csv.write_headers = false;
    }

    print_banner(&args);
    let converter = SimpleFormatConverter::with_options(options);
    let report = convert_files(&args, &converter).await?;

    println!();
    println!("Conversion completed successfully!");
    Ok(report)
}

/// Runs one conversion through `converter` and prints the outcome.
pub async fn convert_files(
    args: &CommandLineArgs,
    converter: &dyn FormatConverter,
) -> Result<ConversionReport> {
    let request = ConversionRequest::new(args.input_file(), args.output_file());
    tracing::info!(
        input = args.input_file(),
        output = args.output_file(),
        csv_mapping = args.is_csv_mapping(),
        "Starting conversion"
    );

    let report = match converter.convert(request).await {
        Ok(report) => report,
        Err(e) => {
            tracing::error!(
                input = args.input_file(),
                output = args.output_file(),
                invalid_input = e.is_invalid_input(),
                error = %e,
                "Conversion failed"
            );
            return Err(e.into());
        }
    };

    println!(
        "Conversion successful: {} -> {}",
        display_name(&report.input),
        display_name(&report.output)
    );
    println!("Converted {} record(s)", report.records);
    tracing::info!(
        input_format = %report.input_format,
        output_format = %report.output_format,
        records = report.records,
        "Conversion completed"
    );
    Ok(report)
}

fn print_banner(args: &CommandLineArgs) {
    println!("fileconv: JSON / XML / CSV converter");
    println!("====================================");
    println!("Input file: {}", args.input_file());
    println!("Output file: {}", args.output_file());
    if args.is_csv_mapping() {
        println!("CSV mapping: enabled (no headers)");
    }
    println!();
}

fn display_name(path: &Path) -> String {
    path.file_name()
        .map(|name| name.to_string_lossy().into_owned())
        .unwrap_or_else(|| path.display().to_string())
}
