use std::collections::BTreeMap;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::keys::EntityKey;

/// Store-side ceiling on the number of items accepted by one batch write.
pub const MAX_BATCH_WRITE_ITEMS: usize = 25;

/// One independent entity category, backed by its own table.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Domain {
    Atms,
    Devices,
    Balances,
    Investments,
}

impl Domain {
    pub const ALL: [Domain; 4] = [
        Domain::Atms,
        Domain::Devices,
        Domain::Balances,
        Domain::Investments,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Atms => "atms",
            Self::Devices => "devices",
            Self::Balances => "balances",
            Self::Investments => "investments",
        }
    }

    /// Prefix of the partition key, i.e. what the grouping value names.
    pub fn partition_scope(self) -> &'static str {
        match self {
            Self::Atms | Self::Devices => "CITY",
            Self::Balances | Self::Investments => "USER",
        }
    }

    /// Prefix of the sort key.
    pub fn entity_kind(self) -> &'static str {
        match self {
            Self::Atms => "ATM",
            Self::Devices => "DATAFONO",
            Self::Balances => "ACCOUNT",
            Self::Investments => "INVESTMENT",
        }
    }

    /// Name of the request parameter carrying the grouping value.
    pub fn filter_param(self) -> &'static str {
        match self {
            Self::Atms | Self::Devices => "city",
            Self::Balances | Self::Investments => "username",
        }
    }

    /// Per-user domains are never scanned as a whole.
    pub fn filter_required(self) -> bool {
        matches!(self, Self::Balances | Self::Investments)
    }

    /// Key under which lookup results are returned.
    pub fn collection_key(self) -> &'static str {
        match self {
            Self::Atms => "atms",
            Self::Devices => "devices",
            Self::Balances => "accounts",
            Self::Investments => "investments",
        }
    }

    pub fn not_found_message(self, filter: &str) -> String {
        match self {
            Self::Atms => format!("No ATMs found for city: {filter}"),
            Self::Devices => format!("No devices found for city: {filter}"),
            Self::Balances => format!("No accounts found for user: {filter}"),
            Self::Investments => format!("No investment products found for user: {filter}"),
        }
    }

    /// Attribute used to break a generated dataset down in loader summaries.
    pub fn summary_attribute(self) -> &'static str {
        match self {
            Self::Atms | Self::Devices => "city",
            Self::Balances => "account_type",
            Self::Investments => "product_type",
        }
    }

    pub fn loader_name(self) -> &'static str {
        match self {
            Self::Atms => "populate_atms",
            Self::Devices => "populate_devices",
            Self::Balances => "populate_balances",
            Self::Investments => "populate_investments",
        }
    }
}

impl std::fmt::Display for Domain {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Domain {
    type Err = ValidationError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim().to_ascii_lowercase().as_str() {
            "atms" | "atm" => Ok(Self::Atms),
            "devices" | "device" | "datafonos" | "datafono" => Ok(Self::Devices),
            "balances" | "balance" => Ok(Self::Balances),
            "investments" | "investment" => Ok(Self::Investments),
            other => Err(ValidationError::new(format!(
                "Unsupported domain '{other}' (expected atms, devices, balances, or investments)"
            ))),
        }
    }
}

/// Typed scalar attribute value.
///
/// Numbers keep the store's decimal text representation so values read back
/// from the store are never reinterpreted through a float before shaping.
#[derive(Debug, Clone, PartialEq)]
pub enum Scalar {
    String(String),
    Number(String),
    Bool(bool),
}

impl Scalar {
    pub fn integer(value: i64) -> Self {
        Self::Number(value.to_string())
    }

    pub fn decimal(value: f64) -> Self {
        Self::Number(value.to_string())
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            Self::String(value) => Some(value),
            _ => None,
        }
    }

    pub fn as_f64(&self) -> Option<f64> {
        match self {
            Self::Number(text) => text.parse().ok(),
            _ => None,
        }
    }

    pub fn as_i64(&self) -> Option<i64> {
        match self {
            Self::Number(text) => text.parse().ok(),
            _ => None,
        }
    }
}

impl From<&str> for Scalar {
    fn from(value: &str) -> Self {
        Self::String(value.to_string())
    }
}

impl From<String> for Scalar {
    fn from(value: String) -> Self {
        Self::String(value)
    }
}

impl From<bool> for Scalar {
    fn from(value: bool) -> Self {
        Self::Bool(value)
    }
}

impl From<i64> for Scalar {
    fn from(value: i64) -> Self {
        Self::integer(value)
    }
}

impl From<f64> for Scalar {
    fn from(value: f64) -> Self {
        Self::decimal(value)
    }
}

/// One record in a domain table.
#[derive(Debug, Clone, PartialEq)]
pub struct Entity {
    pub key: EntityKey,
    pub attributes: BTreeMap<String, Scalar>,
}

impl Entity {
    pub fn new(key: EntityKey) -> Self {
        Self {
            key,
            attributes: BTreeMap::new(),
        }
    }

    pub fn with(mut self, name: &str, value: impl Into<Scalar>) -> Self {
        self.attributes.insert(name.to_string(), value.into());
        self
    }

    pub fn partition_key(&self) -> &str {
        &self.key.partition_key
    }

    pub fn sort_key(&self) -> &str {
        &self.key.sort_key
    }

    pub fn attribute(&self, name: &str) -> Option<&Scalar> {
        self.attributes.get(name)
    }

    pub fn str_attribute(&self, name: &str) -> Option<&str> {
        self.attribute(name).and_then(Scalar::as_str)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidationError {
    message: String,
}

impl ValidationError {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }

    pub fn message(&self) -> &str {
        &self.message
    }
}

impl std::fmt::Display for ValidationError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.message)
    }
}

impl std::error::Error for ValidationError {}
