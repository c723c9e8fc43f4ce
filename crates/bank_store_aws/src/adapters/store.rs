use bank_store_core::entity::Entity;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TableStatus {
    Exists,
    NotFound,
}

/// Result of one batch submission, split by what the store acknowledged.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct BatchSubmission {
    pub accepted: Vec<Entity>,
    /// Items the store declined to process this round, typically throttled.
    pub rejected: Vec<Entity>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StoreError {
    /// The store could not be reached or refused the request outright.
    Transport(String),
    /// The store answered with data that does not fit the entity model.
    MalformedItem(String),
}

impl std::fmt::Display for StoreError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Transport(message) => write!(f, "store request failed: {message}"),
            Self::MalformedItem(message) => write!(f, "malformed store item: {message}"),
        }
    }
}

impl std::error::Error for StoreError {}

pub trait TableWriter {
    fn describe_table(&self, table: &str) -> Result<TableStatus, StoreError>;

    /// Submits at most one store request worth of entities.
    fn batch_write(&self, table: &str, entities: &[Entity]) -> Result<BatchSubmission, StoreError>;
}

pub trait TableReader {
    /// Every entity whose partition key equals `partition_key`.
    fn query_partition(&self, table: &str, partition_key: &str) -> Result<Vec<Entity>, StoreError>;

    fn scan_table(&self, table: &str) -> Result<Vec<Entity>, StoreError>;
}
