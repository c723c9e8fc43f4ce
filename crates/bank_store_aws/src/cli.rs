//! Command-line front end shared by the `populate_*` binaries.

use std::ffi::OsString;
use std::io::{self, Write};
use std::process::ExitCode;

use bank_store_core::entity::Domain;
use bank_store_core::generators::generate_dataset;
use chrono::{DateTime, Utc};
use clap::error::ErrorKind;
use clap::{CommandFactory, FromArgMatches, Parser};
use rand::rngs::StdRng;
use rand::SeedableRng;
use serde_json::json;

use crate::adapters::dynamodb::DynamoDbTableStore;
use crate::adapters::log_sink::{JsonStderrSink, LogSink};
use crate::adapters::store::TableWriter;
use crate::handlers::loader::{BulkLoader, LoadReport, LoaderConfig, LoaderError};

#[derive(Debug, Clone, PartialEq, Eq, Parser)]
#[command(
    version,
    about = "Generate a synthetic dataset and bulk-load it into a table"
)]
pub struct PopulateArgs {
    /// Target table; it must already exist.
    pub table_name: String,

    /// Seed for reproducible datasets. Random when omitted.
    #[arg(long)]
    pub seed: Option<u64>,

    /// Exit non-zero when some items could not be written after retries.
    #[arg(long, env = "SEED_FAIL_ON_UNWRITTEN")]
    pub fail_on_unwritten: bool,
}

impl PopulateArgs {
    pub fn loader_config(&self) -> LoaderConfig {
        LoaderConfig {
            fail_on_unwritten: self.fail_on_unwritten,
            ..LoaderConfig::default()
        }
    }
}

pub fn parse_args<I, T>(domain: Domain, args: I) -> Result<PopulateArgs, clap::Error>
where
    I: IntoIterator<Item = T>,
    T: Into<OsString> + Clone,
{
    let matches = PopulateArgs::command()
        .name(domain.loader_name())
        .bin_name(domain.loader_name())
        .try_get_matches_from(args)?;
    PopulateArgs::from_arg_matches(&matches)
}

/// Help and version requests succeed; every other usage error exits 1.
pub fn usage_exit_code(error: &clap::Error) -> u8 {
    match error.kind() {
        ErrorKind::DisplayHelp | ErrorKind::DisplayVersion => 0,
        _ => 1,
    }
}

/// Writes a usage error where clap would: help and version to stdout,
/// everything else to stderr.
pub fn write_usage(
    error: &clap::Error,
    stdout: &mut dyn Write,
    stderr: &mut dyn Write,
) -> io::Result<()> {
    let target: &mut dyn Write = if error.use_stderr() { stderr } else { stdout };
    write!(target, "{}", error.render())
}

pub fn exit_code(result: &Result<LoadReport, LoaderError>, config: &LoaderConfig) -> u8 {
    match result {
        Ok(report) if config.fail_on_unwritten && !report.is_complete() => 1,
        Ok(_) => 0,
        Err(_) => 1,
    }
}

pub fn run_populate(
    domain: Domain,
    args: &PopulateArgs,
    writer: &dyn TableWriter,
    sink: &dyn LogSink,
    now: DateTime<Utc>,
) -> Result<LoadReport, LoaderError> {
    let mut rng = match args.seed {
        Some(seed) => StdRng::seed_from_u64(seed),
        None => StdRng::from_entropy(),
    };
    let dataset = generate_dataset(domain, &mut rng, now);
    sink.info(
        "dataset_generated",
        json!({
            "domain": domain.as_str(),
            "seed": args.seed,
            "total": dataset.len(),
            "summary": dataset.summary(),
        }),
    );

    BulkLoader::new(writer, sink, args.loader_config()).load(&args.table_name, &dataset)
}

pub async fn populate_main(domain: Domain) -> ExitCode {
    let args = match parse_args(domain, std::env::args_os()) {
        Ok(args) => args,
        Err(error) => {
            let printed = write_usage(&error, &mut io::stdout(), &mut io::stderr());
            if let Err(io_error) = printed {
                eprintln!("failed to print usage: {io_error}");
            }
            return ExitCode::from(usage_exit_code(&error));
        }
    };

    let store = DynamoDbTableStore::from_env().await;
    let sink = JsonStderrSink::new(domain.loader_name());
    let result = run_populate(domain, &args, &store, &sink, Utc::now());

    match &result {
        Ok(report) => println!(
            "Loaded {}/{} {domain} entities into {}",
            report.written, report.total, report.table
        ),
        Err(error) => sink.error(
            "load_failed",
            json!({"table": args.table_name, "error": error.to_string()}),
        ),
    }

    ExitCode::from(exit_code(&result, &args.loader_config()))
}
