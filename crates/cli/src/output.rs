//! Output formatting for the lockstep binary

use clap::ValueEnum;

use lockstep_core::CaptureRecord;

/// Output format
#[derive(Debug, Clone, Copy, ValueEnum, Default)]
pub enum OutputFormat {
    /// Single JSON object mapping group name to captured value
    #[default]
    Json,
    /// One `name=value` line per captured group
    Plain,
}

/// Print a completed record to stdout
pub fn print_record(record: &CaptureRecord, format: OutputFormat) {
    match format {
        OutputFormat::Json => {
            println!("{}", serde_json::to_string_pretty(record).unwrap_or_default());
        }
        OutputFormat::Plain => {
            for (name, value) in record.iter() {
                println!("{}={}", name, value);
            }
        }
    }
}

/// Report the partial groups of a failed capture on stderr
pub fn print_partial(record: &CaptureRecord) {
    if record.is_empty() {
        return;
    }
    eprintln!("Captured before failure:");
    for (name, value) in record.iter() {
        eprintln!("  {}={}", name, value);
    }
}
