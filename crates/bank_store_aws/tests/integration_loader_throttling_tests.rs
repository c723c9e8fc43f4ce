mod support;

use std::time::Duration;

use bank_store_aws::adapters::log_sink::LogLevel;
use bank_store_aws::cli::exit_code;
use bank_store_aws::handlers::loader::{BulkLoader, LoaderConfig, LoaderError};
use bank_store_core::entity::Domain;
use support::fixtures::seeded_dataset;
use support::sink::CapturingSink;
use support::store::InMemoryStore;

fn config(fail_on_unwritten: bool) -> LoaderConfig {
    LoaderConfig {
        retry_base_delay: Duration::ZERO,
        fail_on_unwritten,
        ..LoaderConfig::default()
    }
}

#[test]
fn throttled_items_land_after_retry() {
    let store = InMemoryStore::with_tables(&["devices"]);
    store.script_rejections(&[10, 3]);
    let sink = CapturingSink::default();
    let dataset = seeded_dataset(Domain::Devices, 1);

    let report = BulkLoader::new(&store, &sink, config(true))
        .load("devices", &dataset)
        .expect("load should succeed");

    assert_eq!(report.written, 100);
    assert_eq!(report.retries, 2);
    assert_eq!(store.entities("devices").len(), 100);
    assert_eq!(store.batch_sizes()[..3], [25, 10, 3]);
    assert!(store.batch_sizes().iter().all(|size| *size <= 25));
    assert_eq!(exit_code(&Ok(report), &config(true)), 0);
}

#[test]
fn persistent_throttling_is_reported_once_and_the_run_continues() {
    let store = InMemoryStore::with_tables(&["atms"]);
    store.script_rejections(&[2, 2, 2, 2]);
    let sink = CapturingSink::default();
    let dataset = seeded_dataset(Domain::Atms, 2);

    let report = BulkLoader::new(&store, &sink, config(false))
        .load("atms", &dataset)
        .expect("partial failure does not abort");

    assert_eq!(report.total, 25);
    assert_eq!(report.written, 23);
    assert_eq!(report.unwritten, 2);
    assert_eq!(store.entities("atms").len(), 23);

    let unwritten = sink.named("batch_items_unwritten");
    assert_eq!(unwritten.len(), 1);
    assert_eq!(unwritten[0].level, LogLevel::Error);
    assert_eq!(
        unwritten[0].details["message"],
        "could not write 2 items after 3 retries"
    );
    assert_eq!(sink.named("batch_retry").len(), 3);
    assert_eq!(sink.named("load_incomplete").len(), 1);

    assert_eq!(exit_code(&Ok(report.clone()), &config(false)), 0);
    assert_eq!(exit_code(&Ok(report), &config(true)), 1);
}

#[test]
fn missing_table_exits_one_without_writes() {
    let store = InMemoryStore::with_tables(&[]);
    let sink = CapturingSink::default();
    let dataset = seeded_dataset(Domain::Balances, 3);

    let result = BulkLoader::new(&store, &sink, config(false)).load("balances", &dataset);

    assert!(matches!(result, Err(LoaderError::MissingTable { .. })));
    assert!(store.batch_sizes().is_empty());
    assert_eq!(exit_code(&result, &config(false)), 1);
}

#[test]
fn progress_is_reported_after_every_batch() {
    let store = InMemoryStore::with_tables(&["investments"]);
    let sink = CapturingSink::default();
    let dataset = seeded_dataset(Domain::Investments, 4);

    let report = BulkLoader::new(&store, &sink, config(false))
        .load("investments", &dataset)
        .expect("load should succeed");

    let progress = sink.named("progress");
    assert_eq!(progress.len(), report.batches);
    let last = progress.last().expect("at least one batch");
    assert_eq!(last.details["written"], dataset.len());
    assert_eq!(last.details["total"], dataset.len());

    let completed = sink.named("load_completed");
    assert_eq!(completed.len(), 1);
    assert_eq!(completed[0].details["unwritten"], 0);
}
