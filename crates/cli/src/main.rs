//! lockstep - capture ordered patterns from a line stream on stdin
//!
//! Pipe a process's output through `lockstep` with an ordered list of
//! patterns; it prints the named capture groups once every pattern has
//! matched, in order:
//!
//! ```text
//! mvn camel:run | lockstep \
//!     -e 'Total (?P<total>\d+) routes, of which (?P<started>\d+) are started' \
//!     -e 'Camel (?P<version>\d+\.\d+\.\d+) started'
//! ```
//!
//! Exit codes: 0 capture complete, 1 capture failed (timeout or the stream
//! ended early), 2 configuration or I/O error.

use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use clap::Parser;
use tokio::io::BufReader;
use tracing::debug;
use tracing_subscriber::EnvFilter;

use lockstep_core::{
    spawn_reader, CaptureRecord, CaptureSession, CaptureSpec, Error, MatcherSpec, Result,
};

mod output;

use output::OutputFormat;

/// Capture ordered patterns from a line stream on stdin
#[derive(Parser, Debug)]
#[command(name = "lockstep")]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Path to a YAML capture spec
    #[arg(short, long, conflicts_with = "pattern")]
    spec: Option<PathBuf>,

    /// Pattern to match, in order; repeatable
    #[arg(short = 'e', long = "pattern")]
    pattern: Vec<MatcherSpec>,

    /// Completion timeout in seconds (overrides the spec's timeout)
    #[arg(short, long)]
    timeout_secs: Option<u64>,

    /// Output format
    #[arg(long, default_value = "json")]
    format: OutputFormat,

    /// Enable verbose output
    #[arg(short, long)]
    verbose: bool,
}

fn main() {
    let args = Args::parse();

    // Logging goes to stderr; stdout carries the captured record
    let log_level = if args.verbose { "debug" } else { "warn" };
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(log_level)),
        )
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();

    let format = args.format;

    let rt = tokio::runtime::Runtime::new().expect("Failed to create tokio runtime");
    match rt.block_on(run(args)) {
        Ok(record) => {
            output::print_record(&record, format);
        }
        Err(err @ (Error::Timeout { .. } | Error::StreamClosed { .. })) => {
            eprintln!("Capture failed: {}", err);
            std::process::exit(1);
        }
        Err(err) => {
            eprintln!("Error: {}", err);
            std::process::exit(2);
        }
    }
}

async fn run(args: Args) -> Result<CaptureRecord> {
    let (matchers, timeout) = configure(&args)?;
    debug!(patterns = matchers.len(), ?timeout, "capture configured");

    let session = Arc::new(CaptureSession::with_matchers(matchers));
    let pump = spawn_reader(BufReader::new(tokio::io::stdin()), session.clone());

    let result = session.await_completion(timeout).await;

    // stdin may stay open past completion or expiry; the pump has no more
    // work to do either way
    pump.abort();

    if result.is_err() {
        output::print_partial(&session.snapshot());
    }
    result
}

/// Resolve matchers and timeout from a spec file or inline patterns
fn configure(args: &Args) -> Result<(Vec<MatcherSpec>, Duration)> {
    if let Some(path) = &args.spec {
        let spec = CaptureSpec::from_file(path)?;
        let timeout = args
            .timeout_secs
            .map(Duration::from_secs)
            .unwrap_or_else(|| spec.timeout());
        Ok((spec.matchers()?, timeout))
    } else if args.pattern.is_empty() {
        Err(Error::Configuration(
            "no patterns given: pass --spec or at least one -e pattern".to_string(),
        ))
    } else {
        let timeout = Duration::from_secs(args.timeout_secs.unwrap_or(30));
        Ok((args.pattern.clone(), timeout))
    }
}
