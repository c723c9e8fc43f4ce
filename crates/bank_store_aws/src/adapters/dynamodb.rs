use std::collections::{HashMap, HashSet};
use std::future::Future;

use aws_sdk_dynamodb::error::{DisplayErrorContext, SdkError};
use aws_sdk_dynamodb::operation::describe_table::DescribeTableError;
use aws_sdk_dynamodb::types::{AttributeValue, PutRequest, WriteRequest};
use aws_sdk_dynamodb::Client;
use bank_store_core::entity::{Entity, Scalar};
use bank_store_core::keys::{EntityKey, PARTITION_KEY_ATTRIBUTE, SORT_KEY_ATTRIBUTE};

use crate::adapters::store::{BatchSubmission, StoreError, TableReader, TableStatus, TableWriter};

pub type DynamoItem = HashMap<String, AttributeValue>;

/// DynamoDB-backed table access shared by the loaders and the lookup Lambda.
#[derive(Debug, Clone)]
pub struct DynamoDbTableStore {
    client: Client,
}

impl DynamoDbTableStore {
    pub fn new(client: Client) -> Self {
        Self { client }
    }

    /// Region, credentials and `AWS_ENDPOINT_URL` come from the environment.
    pub async fn from_env() -> Self {
        let config = aws_config::load_defaults(aws_config::BehaviorVersion::latest()).await;
        Self::new(Client::new(&config))
    }
}

fn block_on<F: Future>(future: F) -> F::Output {
    tokio::task::block_in_place(|| tokio::runtime::Handle::current().block_on(future))
}

fn transport_error<E>(action: &str, table: &str, error: E) -> StoreError
where
    E: std::error::Error,
{
    StoreError::Transport(format!(
        "failed to {action} table '{table}': {}",
        DisplayErrorContext(&error)
    ))
}

impl TableWriter for DynamoDbTableStore {
    fn describe_table(&self, table: &str) -> Result<TableStatus, StoreError> {
        let result = block_on(self.client.describe_table().table_name(table).send());

        match result {
            Ok(_) => Ok(TableStatus::Exists),
            Err(SdkError::ServiceError(service_err))
                if matches!(
                    service_err.err(),
                    DescribeTableError::ResourceNotFoundException(_)
                ) =>
            {
                Ok(TableStatus::NotFound)
            }
            Err(error) => Err(transport_error("describe", table, error)),
        }
    }

    fn batch_write(&self, table: &str, entities: &[Entity]) -> Result<BatchSubmission, StoreError> {
        if entities.is_empty() {
            return Ok(BatchSubmission::default());
        }

        let mut requests = Vec::with_capacity(entities.len());
        for entity in entities {
            let put_request = PutRequest::builder()
                .set_item(Some(entity_to_item(entity)))
                .build()
                .map_err(|error| {
                    StoreError::MalformedItem(format!("invalid put request: {error}"))
                })?;
            requests.push(WriteRequest::builder().put_request(put_request).build());
        }

        let output = block_on(
            self.client
                .batch_write_item()
                .request_items(table, requests)
                .send(),
        )
        .map_err(|error| transport_error("batch write to", table, error))?;

        let unprocessed = output
            .unprocessed_items
            .unwrap_or_default()
            .remove(table)
            .unwrap_or_default();

        let mut rejected = Vec::with_capacity(unprocessed.len());
        for request in unprocessed {
            if let Some(put_request) = request.put_request {
                rejected.push(item_to_entity(put_request.item)?);
            }
        }

        Ok(split_submission(entities, rejected))
    }
}

impl TableReader for DynamoDbTableStore {
    fn query_partition(&self, table: &str, partition_key: &str) -> Result<Vec<Entity>, StoreError> {
        let mut entities = Vec::new();
        let mut start_key: Option<DynamoItem> = None;

        loop {
            let output = block_on(
                self.client
                    .query()
                    .table_name(table)
                    .key_condition_expression("#pk = :pk")
                    .expression_attribute_names("#pk", PARTITION_KEY_ATTRIBUTE)
                    .expression_attribute_values(
                        ":pk",
                        AttributeValue::S(partition_key.to_string()),
                    )
                    .set_exclusive_start_key(start_key.take())
                    .send(),
            )
            .map_err(|error| transport_error("query", table, error))?;

            for item in output.items.unwrap_or_default() {
                entities.push(item_to_entity(item)?);
            }

            match output.last_evaluated_key {
                Some(key) if !key.is_empty() => start_key = Some(key),
                _ => break,
            }
        }

        Ok(entities)
    }

    fn scan_table(&self, table: &str) -> Result<Vec<Entity>, StoreError> {
        let mut entities = Vec::new();
        let mut start_key: Option<DynamoItem> = None;

        loop {
            let output = block_on(
                self.client
                    .scan()
                    .table_name(table)
                    .set_exclusive_start_key(start_key.take())
                    .send(),
            )
            .map_err(|error| transport_error("scan", table, error))?;

            for item in output.items.unwrap_or_default() {
                entities.push(item_to_entity(item)?);
            }

            match output.last_evaluated_key {
                Some(key) if !key.is_empty() => start_key = Some(key),
                _ => break,
            }
        }

        Ok(entities)
    }
}

/// Everything submitted that did not come back as unprocessed was accepted.
fn split_submission(submitted: &[Entity], rejected: Vec<Entity>) -> BatchSubmission {
    let rejected_keys: HashSet<&EntityKey> = rejected.iter().map(|entity| &entity.key).collect();
    let accepted = submitted
        .iter()
        .filter(|entity| !rejected_keys.contains(&entity.key))
        .cloned()
        .collect();
    BatchSubmission { accepted, rejected }
}

pub fn entity_to_item(entity: &Entity) -> DynamoItem {
    let mut item = HashMap::with_capacity(entity.attributes.len() + 2);
    item.insert(
        PARTITION_KEY_ATTRIBUTE.to_string(),
        AttributeValue::S(entity.key.partition_key.clone()),
    );
    item.insert(
        SORT_KEY_ATTRIBUTE.to_string(),
        AttributeValue::S(entity.key.sort_key.clone()),
    );
    for (name, scalar) in &entity.attributes {
        let value = match scalar {
            Scalar::String(value) => AttributeValue::S(value.clone()),
            Scalar::Number(text) => AttributeValue::N(text.clone()),
            Scalar::Bool(value) => AttributeValue::Bool(*value),
        };
        item.insert(name.clone(), value);
    }
    item
}

pub fn item_to_entity(mut item: DynamoItem) -> Result<Entity, StoreError> {
    let partition_key = take_key_attribute(&mut item, PARTITION_KEY_ATTRIBUTE)?;
    let sort_key = take_key_attribute(&mut item, SORT_KEY_ATTRIBUTE)?;

    let mut entity = Entity::new(EntityKey {
        partition_key,
        sort_key,
    });
    for (name, value) in item {
        let scalar = match value {
            AttributeValue::S(value) => Scalar::String(value),
            AttributeValue::N(text) => Scalar::Number(text),
            AttributeValue::Bool(value) => Scalar::Bool(value),
            _ => {
                return Err(StoreError::MalformedItem(format!(
                    "attribute '{name}' has an unsupported type"
                )))
            }
        };
        entity.attributes.insert(name, scalar);
    }
    Ok(entity)
}

fn take_key_attribute(item: &mut DynamoItem, name: &str) -> Result<String, StoreError> {
    match item.remove(name) {
        Some(AttributeValue::S(value)) => Ok(value),
        Some(_) => Err(StoreError::MalformedItem(format!(
            "key attribute '{name}' must be a string"
        ))),
        None => Err(StoreError::MalformedItem(format!(
            "item is missing key attribute '{name}'"
        ))),
    }
}
