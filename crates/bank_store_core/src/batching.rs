use crate::entity::{ValidationError, MAX_BATCH_WRITE_ITEMS};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BatchRange {
    pub batch_id: usize,
    pub start_index: usize,
    pub end_index_exclusive: usize,
}

impl BatchRange {
    pub fn len(&self) -> usize {
        self.end_index_exclusive - self.start_index
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// Slices `total_items` into consecutive ranges of at most `batch_size`.
///
/// Only the last range may be shorter. An empty dataset yields an empty plan.
pub fn plan_batches(
    total_items: usize,
    batch_size: usize,
) -> Result<Vec<BatchRange>, ValidationError> {
    if batch_size == 0 {
        return Err(ValidationError::new(
            "batch_size must be a positive integer",
        ));
    }

    if batch_size > MAX_BATCH_WRITE_ITEMS {
        return Err(ValidationError::new(format!(
            "batch_size {batch_size} exceeds the store limit of {MAX_BATCH_WRITE_ITEMS}"
        )));
    }

    let batch_count = total_items.div_ceil(batch_size);
    let mut batches = Vec::with_capacity(batch_count);
    let mut cursor = 0usize;

    for batch_id in 0..batch_count {
        let end_index_exclusive = (cursor + batch_size).min(total_items);
        batches.push(BatchRange {
            batch_id,
            start_index: cursor,
            end_index_exclusive,
        });
        cursor = end_index_exclusive;
    }

    validate_batches(total_items, &batches)?;
    Ok(batches)
}

fn validate_batches(total_items: usize, batches: &[BatchRange]) -> Result<(), ValidationError> {
    let Some(last) = batches.last() else {
        return Ok(());
    };

    if batches[0].start_index != 0 || last.end_index_exclusive != total_items {
        return Err(ValidationError::new(
            "Batch boundaries do not cover the full dataset",
        ));
    }

    for idx in 1..batches.len() {
        if batches[idx - 1].end_index_exclusive != batches[idx].start_index {
            return Err(ValidationError::new(
                "Batch boundaries overlap or leave gaps",
            ));
        }
    }

    if batches.iter().any(|batch| batch.is_empty()) {
        return Err(ValidationError::new("Batch plan contains an empty batch"));
    }

    Ok(())
}
