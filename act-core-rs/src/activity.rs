//! Unit-of-work executor for an ACT request.
//! Runs on a worker process under the budget set by the workflow; the
//! identity it reports is the one observed through the engine-provided
//! activity context, not the one the adapter computed.

use std::time::Duration;

use durable_engine::{ActivityContext, EngineError};
use serde_json::Value;

use crate::identity::ExecutionIdentity;
use crate::models::{ActRequest, ActResponse};

const SIMULATED_WORK: Duration = Duration::from_secs(2);
const HEARTBEAT_EVERY: Duration = Duration::from_millis(500);

/// Perform the (simulated) service operation for one ACT request.
///
/// Heartbeats are recorded while the operation runs so the engine can rule a
/// stalled worker failed. On success the response status carries the
/// worker-observed identity; any internal fault is returned as an error
/// value, never discarded.
pub async fn execute_act_request_operation(
    ctx: ActivityContext,
    input: Value,
) -> Result<Value, EngineError> {
    let request: ActRequest = serde_json::from_value(input)
        .map_err(|e| EngineError::Serialization(e.to_string()))?;

    log::info!(
        "executing act operation: identifier_id={} execution_id={} run_id={}",
        request.identifier_id,
        ctx.execution_id(),
        ctx.run_id()
    );

    // Simulated unit of work, heartbeating within the configured window
    let mut remaining = SIMULATED_WORK;
    while remaining > Duration::ZERO {
        let slice = remaining.min(HEARTBEAT_EVERY);
        tokio::time::sleep(slice).await;
        ctx.record_heartbeat();
        remaining -= slice;
    }

    let identity = ExecutionIdentity::new(ctx.execution_id(), ctx.run_id());
    let response = ActResponse {
        status: identity.completed_status(),
        error: None,
    };

    serde_json::to_value(&response).map_err(|e| EngineError::Serialization(e.to_string()))
}
