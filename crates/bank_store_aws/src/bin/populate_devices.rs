use std::process::ExitCode;

use bank_store_aws::cli::populate_main;
use bank_store_core::entity::Domain;

#[tokio::main]
async fn main() -> ExitCode {
    populate_main(Domain::Devices).await
}
