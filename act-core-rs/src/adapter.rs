//! Dispatch adapter: bridges a synchronous caller to an asynchronous,
//! potentially long-running durable execution.

use std::sync::Arc;

use config_rs::EngineConfig;
use durable_engine::{EngineError, ExecutionEngine, StartExecutionOptions};

use crate::identity::{derive_execution_id, ExecutionIdentity};
use crate::models::{ActRequest, ActResponse};
use crate::workflow::WORKFLOW_NAME;

/// Failure taxonomy of a dispatch. Neither variant is retried here; retry
/// policy belongs to the engine's activity configuration.
#[derive(Debug, thiserror::Error)]
pub enum DispatchError {
    /// The submission call itself failed; no wait was attempted
    #[error("workflow submission failed: {0}")]
    Submission(EngineError),

    /// The execution reached a terminal failure, or the wait itself errored.
    /// Display is transparent so an explicit unit-of-work failure reaches
    /// the boundary verbatim.
    #[error(transparent)]
    Wait(EngineError),
}

/// Submits ACT requests as durable executions and awaits their terminal
/// results. Holds its collaborators explicitly: the engine handle and the
/// task-queue name are injected at construction, never looked up ambiently.
pub struct DispatchAdapter {
    engine: Arc<dyn ExecutionEngine>,
    task_queue: String,
}

impl DispatchAdapter {
    pub fn new(engine: Arc<dyn ExecutionEngine>, config: &EngineConfig) -> Self {
        Self {
            engine,
            task_queue: config.task_queue.clone(),
        }
    }

    /// Submit the request as a durable execution and block until the engine
    /// reports a terminal result.
    ///
    /// The execution id is derived deterministically from the correlation id
    /// (an empty id is passed through; the engine's deduplication will
    /// collide on the bare prefix). The wait is a single blocking call with
    /// no timeout of its own - it inherits the deadlines of the boundary and
    /// of the activity options.
    ///
    /// On success the response status is recomputed from the handle's
    /// engine-confirmed identity, replacing whatever the worker reported.
    /// The handle is the single canonical source of the identity; the
    /// worker-side status is diagnostic only.
    pub async fn submit_and_await(&self, request: ActRequest) -> Result<ActResponse, DispatchError> {
        let execution_id = derive_execution_id(&request.identifier_id);
        let options = StartExecutionOptions {
            execution_id,
            task_queue: self.task_queue.clone(),
            workflow: WORKFLOW_NAME.to_string(),
        };

        let input = serde_json::to_value(&request)
            .map_err(|e| DispatchError::Submission(EngineError::Serialization(e.to_string())))?;

        let handle = self
            .engine
            .start_execution(options, input)
            .await
            .map_err(DispatchError::Submission)?;

        log::info!(
            "started workflow: execution_id={} run_id={}",
            handle.execution_id(),
            handle.run_id()
        );

        let value = handle.await_result().await.map_err(DispatchError::Wait)?;
        let mut response: ActResponse = serde_json::from_value(value)
            .map_err(|e| DispatchError::Wait(EngineError::Serialization(e.to_string())))?;

        let identity = ExecutionIdentity::new(handle.execution_id(), handle.run_id());
        response.status = identity.completed_status();

        log::info!("workflow completed: status={}", response.status);
        Ok(response)
    }
}
