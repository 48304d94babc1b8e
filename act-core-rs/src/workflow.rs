//! Durable execution definition for an ACT request.
//!
//! The orchestration body is deterministic: it reads nothing from the clock,
//! takes no random choices, and performs no I/O, because the engine may
//! replay it from history after a crash. All side effects live in the single
//! delegated activity.

use std::time::Duration;

use durable_engine::{ActivityOptions, EngineError, WorkflowContext};
use serde_json::Value;

/// Workflow name registered with the worker
pub const WORKFLOW_NAME: &str = "act-request-workflow";

/// Activity name scheduled by the workflow
pub const ACTIVITY_NAME: &str = "execute-act-request-operation";

/// Maximum wall-clock budget for the unit of work
pub const START_TO_CLOSE_TIMEOUT: Duration = Duration::from_secs(60 * 60);

/// Liveness window within which the unit of work must heartbeat
pub const HEARTBEAT_TIMEOUT: Duration = Duration::from_secs(30);

/// Orchestrate one ACT request: a single activity invocation under the
/// configured time budget. Activity failures and timeouts terminate the
/// workflow unmodified; there is no orchestration-level retry beyond what
/// the engine's activity policy provides.
pub async fn act_request_workflow(
    ctx: WorkflowContext,
    input: Value,
) -> Result<Value, EngineError> {
    log::debug!(
        "act_request_workflow scheduling activity: execution_id={}",
        ctx.execution_id()
    );

    let options = ActivityOptions {
        start_to_close_timeout: START_TO_CLOSE_TIMEOUT,
        heartbeat_timeout: HEARTBEAT_TIMEOUT,
    };

    ctx.execute_activity(ACTIVITY_NAME, options, input).await
}
