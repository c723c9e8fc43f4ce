use bank_store_aws::adapters::dynamodb::DynamoDbTableStore;
use bank_store_aws::adapters::log_sink::{JsonStderrSink, LogSink};
use bank_store_aws::handlers::lookup::{
    handle_lookup_event, misconfiguration_response, ApiGatewayResponse, LookupConfig,
};
use lambda_runtime::{service_fn, Error, LambdaEvent};
use serde_json::{json, Value};

async fn handle_request(event: LambdaEvent<Value>) -> Result<ApiGatewayResponse, Error> {
    let sink = JsonStderrSink::new("lookup_lambda");

    let config = match LookupConfig::from_env() {
        Ok(config) => config,
        Err(error) => {
            sink.error("misconfiguration", json!({"error": error.to_string()}));
            return Ok(misconfiguration_response(&error));
        }
    };

    sink.info(
        "lookup_received",
        json!({
            "domain": config.domain.as_str(),
            "request_id": event.context.request_id.as_str(),
        }),
    );

    let store = DynamoDbTableStore::from_env().await;
    Ok(handle_lookup_event(
        &event.payload,
        config.domain,
        &config.table_name,
        &store,
        &sink,
    ))
}

#[tokio::main]
async fn main() -> Result<(), Error> {
    lambda_runtime::run(service_fn(handle_request)).await
}
