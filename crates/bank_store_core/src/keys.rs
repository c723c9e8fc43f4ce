//! Single-table key convention shared by the loaders and the lookup handlers.
//!
//! Every domain table addresses its entities with a composite key:
//! `PK = "<SCOPE>#<grouping value>"` and `SK = "<KIND>#<segment>[#<segment>...]"`.
//! Lookups only ever use an equality condition on `PK`.

use serde::{Deserialize, Serialize};

use crate::entity::Domain;

pub const PARTITION_KEY_ATTRIBUTE: &str = "PK";
pub const SORT_KEY_ATTRIBUTE: &str = "SK";
pub const KEY_SEPARATOR: char = '#';

#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct EntityKey {
    #[serde(rename = "PK")]
    pub partition_key: String,
    #[serde(rename = "SK")]
    pub sort_key: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum KeyError {
    EmptyGroupingValue { domain: Domain },
    EmptySortSegment { domain: Domain },
}

impl std::fmt::Display for KeyError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::EmptyGroupingValue { domain } => {
                write!(f, "{domain} keys require a non-empty grouping value")
            }
            Self::EmptySortSegment { domain } => {
                write!(f, "{domain} sort keys require non-empty segments")
            }
        }
    }
}

impl std::error::Error for KeyError {}

/// Builds the composite key for one entity.
///
/// Kinds that are unique per partition pass their kind value as the only
/// segment (`ACCOUNT#checking`); everything else passes a generated token
/// (`ATM#<uuid>`, `INVESTMENT#<type>#<id>`).
pub fn make_key(
    domain: Domain,
    grouping_value: &str,
    sort_segments: &[&str],
) -> Result<EntityKey, KeyError> {
    let partition_key =
        query_predicate(domain, grouping_value).ok_or(KeyError::EmptyGroupingValue { domain })?;

    if sort_segments.is_empty() || sort_segments.iter().any(|s| s.trim().is_empty()) {
        return Err(KeyError::EmptySortSegment { domain });
    }

    let mut sort_key = domain.entity_kind().to_string();
    for segment in sort_segments {
        sort_key.push(KEY_SEPARATOR);
        sort_key.push_str(segment.trim());
    }

    Ok(EntityKey {
        partition_key,
        sort_key,
    })
}

/// Partition key value a lookup filters on, or `None` when there is nothing
/// to filter by and the caller should fall back to a scan.
pub fn query_predicate(domain: Domain, grouping_value: &str) -> Option<String> {
    let trimmed = grouping_value.trim();
    if trimmed.is_empty() {
        return None;
    }
    Some(format!(
        "{}{KEY_SEPARATOR}{trimmed}",
        domain.partition_scope()
    ))
}
