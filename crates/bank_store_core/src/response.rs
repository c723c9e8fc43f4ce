//! JSON shaping of lookup results.

use serde_json::{Map, Number, Value};

use crate::entity::{Domain, Entity, Scalar};
use crate::keys::{PARTITION_KEY_ATTRIBUTE, SORT_KEY_ATTRIBUTE};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MalformedValue {
    pub attribute: String,
    pub raw: String,
}

impl std::fmt::Display for MalformedValue {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "attribute '{}' holds a non-numeric value '{}'",
            self.attribute, self.raw
        )
    }
}

impl std::error::Error for MalformedValue {}

/// Converts a store decimal into a JSON number: integral values become
/// integers, anything with a fractional part becomes a float.
pub fn normalize_number(text: &str) -> Option<Value> {
    let trimmed = text.trim();
    if let Ok(integer) = trimmed.parse::<i64>() {
        return Some(Value::from(integer));
    }

    let float: f64 = trimmed.parse().ok()?;
    if !float.is_finite() {
        return None;
    }
    if float.fract() == 0.0 && float >= i64::MIN as f64 && float < i64::MAX as f64 {
        return Some(Value::from(float as i64));
    }
    Number::from_f64(float).map(Value::Number)
}

pub fn scalar_to_json(attribute: &str, scalar: &Scalar) -> Result<Value, MalformedValue> {
    match scalar {
        Scalar::String(value) => Ok(Value::String(value.clone())),
        Scalar::Bool(value) => Ok(Value::Bool(*value)),
        Scalar::Number(text) => normalize_number(text).ok_or_else(|| MalformedValue {
            attribute: attribute.to_string(),
            raw: text.clone(),
        }),
    }
}

/// Entity as returned to callers: key attributes plus every stored attribute.
pub fn entity_to_json(entity: &Entity) -> Result<Value, MalformedValue> {
    let mut object = Map::new();
    object.insert(
        PARTITION_KEY_ATTRIBUTE.to_string(),
        Value::String(entity.key.partition_key.clone()),
    );
    object.insert(
        SORT_KEY_ATTRIBUTE.to_string(),
        Value::String(entity.key.sort_key.clone()),
    );
    for (name, scalar) in &entity.attributes {
        object.insert(name.clone(), scalar_to_json(name, scalar)?);
    }
    Ok(Value::Object(object))
}

/// `{ "<collection>": [...], "count": N, "<param>": filter }`.
pub fn lookup_envelope(
    domain: Domain,
    entities: &[Entity],
    filter: Option<&str>,
) -> Result<Value, MalformedValue> {
    let items = entities
        .iter()
        .map(entity_to_json)
        .collect::<Result<Vec<_>, _>>()?;

    let mut envelope = Map::new();
    envelope.insert(domain.collection_key().to_string(), Value::Array(items));
    envelope.insert("count".to_string(), Value::from(entities.len()));
    if let Some(filter) = filter {
        envelope.insert(
            domain.filter_param().to_string(),
            Value::String(filter.to_string()),
        );
    }
    Ok(Value::Object(envelope))
}
