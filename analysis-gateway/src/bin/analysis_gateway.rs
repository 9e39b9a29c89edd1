//! Analysis Gateway Lambda - Handles every complaint analysis endpoint.
//!
//! Endpoints:
//! - GET / and /health - List registered operations
//! - POST /quick-triage - Category and priority from partial text
//! - POST /full-analyze - Full classification with 0-100 priority score
//! - POST /status-explain - Plain-language status explanation
//! - POST /generate-email - Follow-up email draft in a chosen tone
//! - POST /user-chat - Conversational answer about a resident's complaints
//! - POST /personal-report - Resident report with locally computed stats
//! - POST /admin-insights - Aggregate insights for administrators
//! - POST /generate-reminder - Reminder about an open complaint

use analysis_gateway::{handler, Gateway, Operation};
use lambda_http::{run, service_fn, Error};
use std::sync::Arc;
use tracing::info;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> Result<(), Error> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .json()
        .init();

    Operation::validate_registry()?;
    info!("Registered operations: {}", Operation::names().join(", "));

    let gateway = Arc::new(Gateway::from_env());

    run(service_fn(move |event| {
        let gateway = Arc::clone(&gateway);
        async move { handler(gateway, event).await }
    }))
    .await
}
