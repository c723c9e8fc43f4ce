use bank_store_core::entity::{Domain, ValidationError};
use bank_store_core::keys::query_predicate;
use bank_store_core::response::lookup_envelope;
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};

use crate::adapters::log_sink::LogSink;
use crate::adapters::store::TableReader;

pub const TABLE_NAME_ENV: &str = "TABLE_NAME";
pub const LOOKUP_DOMAIN_ENV: &str = "LOOKUP_DOMAIN";

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ApiGatewayResponse {
    #[serde(rename = "statusCode")]
    pub status_code: u16,
    pub headers: Value,
    pub body: String,
}

impl ApiGatewayResponse {
    pub fn body_json(&self) -> Option<Value> {
        serde_json::from_str(&self.body).ok()
    }
}

/// Runtime configuration of one lookup function.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LookupConfig {
    pub table_name: String,
    pub domain: Domain,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConfigError {
    MissingVariable(&'static str),
    InvalidDomain(ValidationError),
}

impl std::fmt::Display for ConfigError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::MissingVariable(name) => write!(f, "{name} must be configured"),
            Self::InvalidDomain(error) => write!(f, "{LOOKUP_DOMAIN_ENV} is invalid: {error}"),
        }
    }
}

impl std::error::Error for ConfigError {}

impl LookupConfig {
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let non_blank = |name: &'static str| {
            lookup(name)
                .filter(|value| !value.trim().is_empty())
                .ok_or(ConfigError::MissingVariable(name))
        };

        let table_name = non_blank(TABLE_NAME_ENV)?;
        let domain = non_blank(LOOKUP_DOMAIN_ENV)?
            .parse::<Domain>()
            .map_err(ConfigError::InvalidDomain)?;

        Ok(Self {
            table_name: table_name.trim().to_string(),
            domain,
        })
    }
}

/// What a lookup resolved to, before it is shaped into a gateway response.
#[derive(Debug, Clone, PartialEq)]
pub enum LookupOutcome {
    Found(Value),
    NotFound { message: String },
    MissingParameter { param: &'static str },
    Failed { detail: String },
}

impl LookupOutcome {
    pub fn status_code(&self) -> u16 {
        match self {
            Self::Found(_) => 200,
            Self::MissingParameter { .. } => 400,
            Self::NotFound { .. } => 404,
            Self::Failed { .. } => 500,
        }
    }

    pub fn into_response(self) -> ApiGatewayResponse {
        let status_code = self.status_code();
        let body = match self {
            Self::Found(envelope) => envelope,
            Self::NotFound { message } => json!({
                "error": "not_found",
                "message": message,
            }),
            Self::MissingParameter { param } => json!({
                "error": "missing_parameter",
                "message": format!("Missing required parameter: {param}"),
            }),
            Self::Failed { detail } => json!({
                "error": "internal_error",
                "message": format!("Internal server error: {detail}"),
            }),
        };
        json_response(status_code, body)
    }
}

/// Reads the filter from `pathParameters.<param>`, falling back to a
/// top-level `<param>` field. Blank values count as absent.
pub fn extract_filter(event: &Value, param: &str) -> Option<String> {
    let from_path = event
        .get("pathParameters")
        .and_then(|parameters| parameters.get(param))
        .and_then(Value::as_str);
    let from_top_level = event.get(param).and_then(Value::as_str);

    from_path
        .into_iter()
        .chain(from_top_level)
        .map(str::trim)
        .find(|value| !value.is_empty())
        .map(str::to_string)
}

pub fn resolve_lookup(
    event: &Value,
    domain: Domain,
    table: &str,
    reader: &dyn TableReader,
) -> LookupOutcome {
    let filter = extract_filter(event, domain.filter_param());

    let entities = match filter.as_deref() {
        Some(value) => {
            let Some(partition_key) = query_predicate(domain, value) else {
                return LookupOutcome::MissingParameter {
                    param: domain.filter_param(),
                };
            };
            match reader.query_partition(table, &partition_key) {
                Ok(entities) if entities.is_empty() => {
                    return LookupOutcome::NotFound {
                        message: domain.not_found_message(value),
                    };
                }
                Ok(entities) => entities,
                Err(error) => {
                    return LookupOutcome::Failed {
                        detail: error.to_string(),
                    }
                }
            }
        }
        None if domain.filter_required() => {
            return LookupOutcome::MissingParameter {
                param: domain.filter_param(),
            };
        }
        None => match reader.scan_table(table) {
            Ok(entities) => entities,
            Err(error) => {
                return LookupOutcome::Failed {
                    detail: error.to_string(),
                }
            }
        },
    };

    match lookup_envelope(domain, &entities, filter.as_deref()) {
        Ok(envelope) => LookupOutcome::Found(envelope),
        Err(error) => LookupOutcome::Failed {
            detail: error.to_string(),
        },
    }
}

/// Lambda entry point logic: resolves the lookup and logs its outcome.
pub fn handle_lookup_event(
    event: &Value,
    domain: Domain,
    table: &str,
    reader: &dyn TableReader,
    sink: &dyn LogSink,
) -> ApiGatewayResponse {
    let outcome = resolve_lookup(event, domain, table, reader);

    let details = json!({
        "domain": domain.as_str(),
        "table": table,
        "status_code": outcome.status_code(),
    });
    match &outcome {
        LookupOutcome::Failed { detail } => sink.error(
            "lookup_failed",
            json!({"domain": domain.as_str(), "table": table, "error": detail}),
        ),
        LookupOutcome::MissingParameter { .. } => sink.warn("lookup_rejected", details),
        LookupOutcome::Found(_) | LookupOutcome::NotFound { .. } => {
            sink.info("lookup_completed", details)
        }
    }

    outcome.into_response()
}

pub fn misconfiguration_response(error: &ConfigError) -> ApiGatewayResponse {
    json_response(
        500,
        json!({
            "error": "misconfiguration",
            "message": error.to_string(),
        }),
    )
}

fn json_response(status_code: u16, payload: Value) -> ApiGatewayResponse {
    ApiGatewayResponse {
        status_code,
        headers: json!({"Content-Type": "application/json"}),
        body: payload.to_string(),
    }
}
