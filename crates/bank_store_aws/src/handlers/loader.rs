use std::time::Duration;

use bank_store_core::batching::plan_batches;
use bank_store_core::entity::{Entity, ValidationError, MAX_BATCH_WRITE_ITEMS};
use bank_store_core::generators::DomainDataset;
use serde::Serialize;
use serde_json::json;

use crate::adapters::log_sink::LogSink;
use crate::adapters::store::{StoreError, TableStatus, TableWriter};

pub const DEFAULT_MAX_RETRIES: u32 = 3;
pub const DEFAULT_RETRY_BASE_DELAY: Duration = Duration::from_millis(100);

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LoaderConfig {
    pub batch_size: usize,
    /// Resubmissions of rejected items per batch, on top of the first attempt.
    pub max_retries: u32,
    /// Delay before the first retry; doubles on every following retry.
    pub retry_base_delay: Duration,
    pub fail_on_unwritten: bool,
}

impl Default for LoaderConfig {
    fn default() -> Self {
        Self {
            batch_size: MAX_BATCH_WRITE_ITEMS,
            max_retries: DEFAULT_MAX_RETRIES,
            retry_base_delay: DEFAULT_RETRY_BASE_DELAY,
            fail_on_unwritten: false,
        }
    }
}

impl LoaderConfig {
    pub fn backoff_delay(&self, attempt: u32) -> Duration {
        let exponent = attempt.saturating_sub(1).min(16);
        self.retry_base_delay.saturating_mul(1u32 << exponent)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct LoadReport {
    pub table: String,
    pub total: usize,
    pub written: usize,
    pub unwritten: usize,
    pub batches: usize,
    pub retries: u32,
}

impl LoadReport {
    pub fn is_complete(&self) -> bool {
        self.unwritten == 0
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LoaderError {
    MissingTable { table: String },
    InvalidPlan(ValidationError),
    Store(StoreError),
}

impl std::fmt::Display for LoaderError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::MissingTable { table } => {
                write!(
                    f,
                    "Table '{table}' does not exist; create it before seeding"
                )
            }
            Self::InvalidPlan(error) => write!(f, "invalid batch plan: {error}"),
            Self::Store(error) => write!(f, "{error}"),
        }
    }
}

impl std::error::Error for LoaderError {}

impl From<StoreError> for LoaderError {
    fn from(error: StoreError) -> Self {
        Self::Store(error)
    }
}

impl From<ValidationError> for LoaderError {
    fn from(error: ValidationError) -> Self {
        Self::InvalidPlan(error)
    }
}

/// Writes a generated dataset into one table, batch by batch.
///
/// Batches run strictly in order. Items the store rejects are resubmitted
/// alone with exponential back-off; items still rejected once retries run
/// out are reported and skipped so the rest of the dataset still lands.
pub struct BulkLoader<'a> {
    writer: &'a dyn TableWriter,
    sink: &'a dyn LogSink,
    config: LoaderConfig,
}

impl<'a> BulkLoader<'a> {
    pub fn new(writer: &'a dyn TableWriter, sink: &'a dyn LogSink, config: LoaderConfig) -> Self {
        Self {
            writer,
            sink,
            config,
        }
    }

    pub fn config(&self) -> &LoaderConfig {
        &self.config
    }

    pub fn load(&self, table: &str, dataset: &DomainDataset) -> Result<LoadReport, LoaderError> {
        if self.writer.describe_table(table)? == TableStatus::NotFound {
            self.sink.error(
                "table_missing",
                json!({"table": table, "domain": dataset.domain()}),
            );
            return Err(LoaderError::MissingTable {
                table: table.to_string(),
            });
        }
        self.sink.info("table_verified", json!({"table": table}));

        let entities = dataset.entities();
        let plan = plan_batches(entities.len(), self.config.batch_size)?;
        self.sink.info(
            "load_started",
            json!({
                "table": table,
                "domain": dataset.domain(),
                "total": entities.len(),
                "batches": plan.len(),
                "summary": dataset.summary(),
            }),
        );

        let mut report = LoadReport {
            table: table.to_string(),
            total: entities.len(),
            written: 0,
            unwritten: 0,
            batches: plan.len(),
            retries: 0,
        };

        for batch in &plan {
            let slice = &entities[batch.start_index..batch.end_index_exclusive];
            let outcome = self.write_batch(table, batch.batch_id, slice)?;
            report.written += outcome.written;
            report.unwritten += outcome.unwritten;
            report.retries += outcome.retries;

            self.sink.info(
                "progress",
                json!({
                    "table": table,
                    "batch_id": batch.batch_id,
                    "written": report.written,
                    "total": report.total,
                }),
            );
        }

        self.sink.info("load_completed", json!(report));
        if !report.is_complete() {
            self.sink.warn(
                "load_incomplete",
                json!({
                    "table": table,
                    "unwritten": report.unwritten,
                    "total": report.total,
                }),
            );
        }

        Ok(report)
    }

    fn write_batch(
        &self,
        table: &str,
        batch_id: usize,
        entities: &[Entity],
    ) -> Result<BatchOutcome, LoaderError> {
        let submission = self.writer.batch_write(table, entities)?;
        let mut written = submission.accepted.len();
        let mut pending = submission.rejected;
        let mut attempt = 0u32;

        while !pending.is_empty() && attempt < self.config.max_retries {
            attempt += 1;
            let delay = self.config.backoff_delay(attempt);
            self.sink.warn(
                "batch_retry",
                json!({
                    "table": table,
                    "batch_id": batch_id,
                    "attempt": attempt,
                    "pending": pending.len(),
                    "delay_ms": delay.as_millis() as u64,
                }),
            );
            if !delay.is_zero() {
                std::thread::sleep(delay);
            }

            let retry = self.writer.batch_write(table, &pending)?;
            written += retry.accepted.len();
            pending = retry.rejected;
        }

        let unwritten = pending.len();
        if unwritten > 0 {
            self.sink.error(
                "batch_items_unwritten",
                json!({
                    "table": table,
                    "batch_id": batch_id,
                    "unwritten": unwritten,
                    "message": format!(
                        "could not write {unwritten} items after {} retries",
                        self.config.max_retries
                    ),
                    "keys": pending.iter().map(|entity| &entity.key).collect::<Vec<_>>(),
                }),
            );
        }

        Ok(BatchOutcome {
            written,
            unwritten,
            retries: attempt,
        })
    }
}

struct BatchOutcome {
    written: usize,
    unwritten: usize,
    retries: u32,
}

#[cfg(test)]
mod tests {
    use std::collections::VecDeque;
    use std::sync::Mutex;

    use bank_store_core::entity::{Domain, Entity};
    use bank_store_core::keys::make_key;
    use serde_json::Value;

    use super::*;
    use crate::adapters::log_sink::LogLevel;
    use crate::adapters::store::BatchSubmission;

    enum Step {
        RejectAll,
        RejectLast(usize),
        Fail,
    }

    struct ScriptedWriter {
        status: TableStatus,
        steps: Mutex<VecDeque<Step>>,
        calls: Mutex<Vec<usize>>,
    }

    impl ScriptedWriter {
        fn new(status: TableStatus, steps: Vec<Step>) -> Self {
            Self {
                status,
                steps: Mutex::new(steps.into()),
                calls: Mutex::new(Vec::new()),
            }
        }

        fn calls(&self) -> Vec<usize> {
            self.calls.lock().expect("poisoned mutex").clone()
        }
    }

    impl TableWriter for ScriptedWriter {
        fn describe_table(&self, _table: &str) -> Result<TableStatus, StoreError> {
            Ok(self.status)
        }

        fn batch_write(
            &self,
            _table: &str,
            entities: &[Entity],
        ) -> Result<BatchSubmission, StoreError> {
            self.calls
                .lock()
                .expect("poisoned mutex")
                .push(entities.len());
            let step = self.steps.lock().expect("poisoned mutex").pop_front();
            let reject = match step {
                None => 0,
                Some(Step::RejectAll) => entities.len(),
                Some(Step::RejectLast(count)) => count.min(entities.len()),
                Some(Step::Fail) => {
                    return Err(StoreError::Transport("connection reset".to_string()))
                }
            };
            let split = entities.len() - reject;
            Ok(BatchSubmission {
                accepted: entities[..split].to_vec(),
                rejected: entities[split..].to_vec(),
            })
        }
    }

    #[derive(Default)]
    struct CapturingSink {
        events: Mutex<Vec<(LogLevel, String, Value)>>,
    }

    impl CapturingSink {
        fn events_named(&self, name: &str) -> Vec<(LogLevel, Value)> {
            self.events
                .lock()
                .expect("poisoned mutex")
                .iter()
                .filter(|(_, event, _)| event == name)
                .map(|(level, _, details)| (*level, details.clone()))
                .collect()
        }
    }

    impl LogSink for CapturingSink {
        fn log(&self, level: LogLevel, event: &str, details: Value) {
            self.events
                .lock()
                .expect("poisoned mutex")
                .push((level, event.to_string(), details));
        }
    }

    fn dataset(count: usize) -> DomainDataset {
        let entities = (0..count)
            .map(|idx| {
                let id = format!("atm-{idx}");
                Entity::new(
                    make_key(Domain::Atms, "medellin", &[id.as_str()]).expect("key should build"),
                )
                .with("city", "medellin")
            })
            .collect();
        DomainDataset::new(Domain::Atms, entities)
    }

    fn instant_config() -> LoaderConfig {
        LoaderConfig {
            retry_base_delay: Duration::ZERO,
            ..LoaderConfig::default()
        }
    }

    #[test]
    fn backoff_doubles_from_base_delay() {
        let config = LoaderConfig::default();
        assert_eq!(config.backoff_delay(1), Duration::from_millis(100));
        assert_eq!(config.backoff_delay(2), Duration::from_millis(200));
        assert_eq!(config.backoff_delay(3), Duration::from_millis(400));
    }

    #[test]
    fn writes_everything_in_batches_of_at_most_25() {
        let writer = ScriptedWriter::new(TableStatus::Exists, Vec::new());
        let sink = CapturingSink::default();

        let report = BulkLoader::new(&writer, &sink, instant_config())
            .load("atms", &dataset(60))
            .expect("load should succeed");

        assert_eq!(writer.calls(), vec![25, 25, 10]);
        assert_eq!(report.written, 60);
        assert_eq!(report.batches, 3);
        assert!(report.is_complete());
        assert_eq!(sink.events_named("progress").len(), 3);
        assert!(sink.events_named("load_incomplete").is_empty());
    }

    #[test]
    fn missing_table_aborts_before_any_write() {
        let writer = ScriptedWriter::new(TableStatus::NotFound, Vec::new());
        let sink = CapturingSink::default();

        let error = BulkLoader::new(&writer, &sink, instant_config())
            .load("missing", &dataset(3))
            .expect_err("missing table should fail");

        assert_eq!(
            error,
            LoaderError::MissingTable {
                table: "missing".to_string()
            }
        );
        assert!(writer.calls().is_empty());
    }

    #[test]
    fn rejected_items_are_retried_alone() {
        let writer = ScriptedWriter::new(TableStatus::Exists, vec![Step::RejectLast(4)]);
        let sink = CapturingSink::default();

        let report = BulkLoader::new(&writer, &sink, instant_config())
            .load("atms", &dataset(10))
            .expect("load should succeed");

        assert_eq!(writer.calls(), vec![10, 4]);
        assert_eq!(report.written, 10);
        assert_eq!(report.retries, 1);
        assert_eq!(sink.events_named("batch_retry").len(), 1);
        assert!(sink.events_named("batch_items_unwritten").is_empty());
    }

    #[test]
    fn exhausted_retries_log_one_unwritten_event_and_continue() {
        let writer = ScriptedWriter::new(
            TableStatus::Exists,
            vec![
                Step::RejectAll,
                Step::RejectAll,
                Step::RejectAll,
                Step::RejectAll,
            ],
        );
        let sink = CapturingSink::default();

        let report = BulkLoader::new(&writer, &sink, instant_config())
            .load("atms", &dataset(30))
            .expect("partial failure is not an error");

        assert_eq!(writer.calls(), vec![25, 25, 25, 25, 5]);
        assert_eq!(report.written, 5);
        assert_eq!(report.unwritten, 25);
        assert_eq!(report.retries, 3);

        let unwritten = sink.events_named("batch_items_unwritten");
        assert_eq!(unwritten.len(), 1);
        assert_eq!(unwritten[0].0, LogLevel::Error);
        assert_eq!(
            unwritten[0].1["message"],
            "could not write 25 items after 3 retries"
        );
        assert_eq!(sink.events_named("load_incomplete").len(), 1);
        assert_eq!(unwritten[0].1["keys"][0]["PK"], "CITY#medellin");
        assert_eq!(unwritten[0].1["keys"][0]["SK"], "ATM#atm-0");
    }

    #[test]
    fn transport_error_aborts_the_run() {
        let writer = ScriptedWriter::new(TableStatus::Exists, vec![Step::Fail]);
        let sink = CapturingSink::default();

        let error = BulkLoader::new(&writer, &sink, instant_config())
            .load("atms", &dataset(40))
            .expect_err("transport failure should abort");

        assert!(matches!(
            error,
            LoaderError::Store(StoreError::Transport(_))
        ));
        assert_eq!(writer.calls(), vec![25]);
        assert!(sink.events_named("load_completed").is_empty());
    }

    #[test]
    fn oversized_batch_configuration_is_rejected() {
        let writer = ScriptedWriter::new(TableStatus::Exists, Vec::new());
        let sink = CapturingSink::default();
        let config = LoaderConfig {
            batch_size: 26,
            ..instant_config()
        };

        let error = BulkLoader::new(&writer, &sink, config)
            .load("atms", &dataset(3))
            .expect_err("batch size above the store limit should fail");

        assert!(matches!(error, LoaderError::InvalidPlan(_)));
        assert!(writer.calls().is_empty());
    }

    #[test]
    fn empty_dataset_completes_without_writes() {
        let writer = ScriptedWriter::new(TableStatus::Exists, Vec::new());
        let sink = CapturingSink::default();

        let report = BulkLoader::new(&writer, &sink, instant_config())
            .load("atms", &dataset(0))
            .expect("empty load should succeed");

        assert_eq!(report.batches, 0);
        assert!(writer.calls().is_empty());
        assert_eq!(sink.events_named("load_completed").len(), 1);
    }
}
