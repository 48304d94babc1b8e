//! # Durable Engine - Execution Scheduling for ACT Dispatch
//!
//! Engine surface consumed by the dispatch layer: submit a named workflow
//! with a caller-chosen execution id, get back a handle, and block on the
//! handle for the terminal result. Ships an in-process engine that provides
//! the collaborator semantics the dispatch layer relies on: task-queue worker
//! registration, execution-id deduplication, start-to-close timeouts,
//! heartbeat liveness, and retained terminal results.

use std::collections::HashMap;
use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;
use std::sync::Mutex as StdMutex;
use std::time::Duration;

use async_trait::async_trait;
use serde_json::Value;
use tokio::sync::{watch, Mutex, RwLock};
use tokio::time::Instant;
use uuid::Uuid;

/// Errors surfaced by the engine and its handles
#[derive(Debug, Clone, thiserror::Error)]
pub enum EngineError {
    #[error("no worker registered for task queue '{0}'")]
    NoWorker(String),

    #[error("no workflow '{0}' registered on task queue")]
    UnknownWorkflow(String),

    #[error("no activity '{0}' registered on task queue")]
    UnknownActivity(String),

    #[error("activity exceeded start-to-close timeout of {0:?}")]
    ActivityTimeout(Duration),

    #[error("activity heartbeat stalled beyond {0:?}")]
    HeartbeatTimeout(Duration),

    // Display is the bare message so an explicit unit-of-work failure
    // reaches the caller verbatim.
    #[error("{0}")]
    ActivityFailed(String),

    #[error("payload serialization failed: {0}")]
    Serialization(String),

    #[error("execution ended without a terminal result")]
    ResultChannelClosed,
}

/// Lifecycle of a single durable execution. Terminal states are final.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExecutionStatus {
    Scheduled,
    Running,
    Completed,
    Failed,
    TimedOut,
}

/// Options for starting one durable execution
#[derive(Debug, Clone)]
pub struct StartExecutionOptions {
    /// Caller-derived execution id; the engine deduplicates on this value
    pub execution_id: String,
    /// Task queue whose worker runs the workflow
    pub task_queue: String,
    /// Registered workflow name
    pub workflow: String,
}

/// Time budget applied to a single activity invocation
#[derive(Debug, Clone)]
pub struct ActivityOptions {
    pub start_to_close_timeout: Duration,
    pub heartbeat_timeout: Duration,
}

type ExecutionResult = Result<Value, EngineError>;
type ResultSlot = Option<ExecutionResult>;

type WorkflowFn = Arc<
    dyn Fn(WorkflowContext, Value) -> Pin<Box<dyn Future<Output = ExecutionResult> + Send>>
        + Send
        + Sync,
>;
type ActivityFn = Arc<
    dyn Fn(ActivityContext, Value) -> Pin<Box<dyn Future<Output = ExecutionResult> + Send>>
        + Send
        + Sync,
>;

/// Liveness signal recorder shared between a running activity and the
/// engine-side watchdog that rules a silent worker failed.
#[derive(Clone)]
pub struct HeartbeatMonitor {
    last_beat: Arc<StdMutex<Instant>>,
}

impl HeartbeatMonitor {
    pub fn new() -> Self {
        Self {
            last_beat: Arc::new(StdMutex::new(Instant::now())),
        }
    }

    /// Record a liveness signal from the running activity
    pub fn record(&self) {
        let mut last = self.last_beat.lock().unwrap_or_else(|e| e.into_inner());
        *last = Instant::now();
    }

    /// Resolves once no heartbeat has been recorded for a full window
    async fn stalled(&self, window: Duration) {
        loop {
            tokio::time::sleep(window).await;
            let elapsed = {
                let last = self.last_beat.lock().unwrap_or_else(|e| e.into_inner());
                last.elapsed()
            };
            if elapsed >= window {
                return;
            }
        }
    }
}

impl Default for HeartbeatMonitor {
    fn default() -> Self {
        Self::new()
    }
}

/// Execution context handed to an activity by the engine. The identity here
/// is the worker-observed one, read from the engine rather than from the
/// original request.
#[derive(Clone)]
pub struct ActivityContext {
    execution_id: String,
    run_id: String,
    heartbeat: HeartbeatMonitor,
}

impl ActivityContext {
    /// Build a context detached from any engine. Used by in-memory fakes and
    /// activity unit tests.
    pub fn detached(execution_id: impl Into<String>, run_id: impl Into<String>) -> Self {
        Self {
            execution_id: execution_id.into(),
            run_id: run_id.into(),
            heartbeat: HeartbeatMonitor::new(),
        }
    }

    pub fn execution_id(&self) -> &str {
        &self.execution_id
    }

    pub fn run_id(&self) -> &str {
        &self.run_id
    }

    pub fn record_heartbeat(&self) {
        self.heartbeat.record();
    }
}

/// Execution context handed to a workflow. Workflows must stay deterministic:
/// no clock reads, randomness, or I/O here - side effects belong to the
/// activities scheduled through `execute_activity`.
#[derive(Clone)]
pub struct WorkflowContext {
    execution_id: String,
    run_id: String,
    registry: Arc<WorkerRegistry>,
}

impl WorkflowContext {
    pub fn execution_id(&self) -> &str {
        &self.execution_id
    }

    pub fn run_id(&self) -> &str {
        &self.run_id
    }

    /// Run one registered activity under the given time budget.
    ///
    /// The activity is raced against two engine-side watchdogs: the
    /// start-to-close timeout bounds total wall-clock duration, and the
    /// heartbeat watchdog rules the activity failed when it stays silent for
    /// a full heartbeat window.
    pub async fn execute_activity(
        &self,
        name: &str,
        options: ActivityOptions,
        input: Value,
    ) -> ExecutionResult {
        let activity = self
            .registry
            .activities
            .get(name)
            .cloned()
            .ok_or_else(|| EngineError::UnknownActivity(name.to_string()))?;

        let heartbeat = HeartbeatMonitor::new();
        let activity_ctx = ActivityContext {
            execution_id: self.execution_id.clone(),
            run_id: self.run_id.clone(),
            heartbeat: heartbeat.clone(),
        };

        let heartbeat_window = options.heartbeat_timeout;
        let bounded = tokio::time::timeout(options.start_to_close_timeout, async {
            tokio::select! {
                result = activity(activity_ctx, input) => result,
                _ = heartbeat.stalled(heartbeat_window) => {
                    Err(EngineError::HeartbeatTimeout(heartbeat_window))
                }
            }
        });

        match bounded.await {
            Ok(result) => result,
            Err(_) => Err(EngineError::ActivityTimeout(options.start_to_close_timeout)),
        }
    }
}

/// Handle to one durable execution: its engine-confirmed identity plus a
/// single blocking wait for the terminal result.
#[derive(Clone, Debug)]
pub struct ExecutionHandle {
    execution_id: String,
    run_id: String,
    result: watch::Receiver<ResultSlot>,
}

impl ExecutionHandle {
    /// Build a handle whose result is already terminal. Used for retained
    /// results and by fake engines in tests.
    pub fn resolved(
        execution_id: impl Into<String>,
        run_id: impl Into<String>,
        result: ExecutionResult,
    ) -> Self {
        let (_tx, rx) = watch::channel(Some(result));
        Self {
            execution_id: execution_id.into(),
            run_id: run_id.into(),
            result: rx,
        }
    }

    pub fn execution_id(&self) -> &str {
        &self.execution_id
    }

    pub fn run_id(&self) -> &str {
        &self.run_id
    }

    /// Block until the execution reaches a terminal state and return its
    /// result. There is no timeout at this layer; callers inherit whatever
    /// deadline the boundary or the activity options enforce.
    pub async fn await_result(&self) -> ExecutionResult {
        let mut rx = self.result.clone();
        loop {
            let settled = rx.borrow_and_update().clone();
            if let Some(result) = settled {
                return result;
            }
            if rx.changed().await.is_err() {
                // Sender side went away; surface whatever was last written.
                let settled = rx.borrow().clone();
                return settled.unwrap_or(Err(EngineError::ResultChannelClosed));
            }
        }
    }
}

/// The engine surface the dispatch layer depends on
#[async_trait]
pub trait ExecutionEngine: Send + Sync {
    /// Submit a workflow for durable execution and return a handle to it.
    /// Submission fails when no worker serves the task queue or the workflow
    /// name is unknown; it succeeds idempotently for a duplicate execution id.
    async fn start_execution(
        &self,
        options: StartExecutionOptions,
        input: Value,
    ) -> Result<ExecutionHandle, EngineError>;
}

struct WorkerRegistry {
    workflows: HashMap<String, WorkflowFn>,
    activities: HashMap<String, ActivityFn>,
}

/// Registration unit for one task queue: the workflows and activities a
/// worker process serves.
pub struct Worker {
    task_queue: String,
    workflows: HashMap<String, WorkflowFn>,
    activities: HashMap<String, ActivityFn>,
}

impl Worker {
    pub fn new(task_queue: impl Into<String>) -> Self {
        Self {
            task_queue: task_queue.into(),
            workflows: HashMap::new(),
            activities: HashMap::new(),
        }
    }

    pub fn register_workflow<F, Fut>(&mut self, name: &str, workflow: F)
    where
        F: Fn(WorkflowContext, Value) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = ExecutionResult> + Send + 'static,
    {
        self.workflows.insert(
            name.to_string(),
            Arc::new(move |ctx, input| Box::pin(workflow(ctx, input))),
        );
    }

    pub fn register_activity<F, Fut>(&mut self, name: &str, activity: F)
    where
        F: Fn(ActivityContext, Value) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = ExecutionResult> + Send + 'static,
    {
        self.activities.insert(
            name.to_string(),
            Arc::new(move |ctx, input| Box::pin(activity(ctx, input))),
        );
    }
}

struct ExecutionEntry {
    run_id: String,
    status: Arc<StdMutex<ExecutionStatus>>,
    result: watch::Receiver<ResultSlot>,
}

/// In-process durable-execution engine.
///
/// Executions are keyed by execution id: a second start with the same id
/// attaches to the running execution, and a start after completion returns
/// the retained terminal result. Spawned executions are detached from the
/// submitting caller - dropping the handle never cancels the work.
pub struct InProcessEngine {
    namespace: String,
    workers: RwLock<HashMap<String, Arc<WorkerRegistry>>>,
    executions: Mutex<HashMap<String, ExecutionEntry>>,
}

impl InProcessEngine {
    pub fn new(namespace: impl Into<String>) -> Self {
        Self {
            namespace: namespace.into(),
            workers: RwLock::new(HashMap::new()),
            executions: Mutex::new(HashMap::new()),
        }
    }

    /// Attach a worker's registrations to its task queue
    pub async fn attach_worker(&self, worker: Worker) {
        log::info!(
            "attaching worker: namespace={} task_queue={} workflows={} activities={}",
            self.namespace,
            worker.task_queue,
            worker.workflows.len(),
            worker.activities.len()
        );
        let registry = Arc::new(WorkerRegistry {
            workflows: worker.workflows,
            activities: worker.activities,
        });
        let mut workers = self.workers.write().await;
        workers.insert(worker.task_queue, registry);
    }

    /// Current lifecycle state of an execution, if the engine knows it
    pub async fn execution_status(&self, execution_id: &str) -> Option<ExecutionStatus> {
        let executions = self.executions.lock().await;
        executions.get(execution_id).map(|entry| {
            let status = entry.status.lock().unwrap_or_else(|e| e.into_inner());
            *status
        })
    }
}

#[async_trait]
impl ExecutionEngine for InProcessEngine {
    async fn start_execution(
        &self,
        options: StartExecutionOptions,
        input: Value,
    ) -> Result<ExecutionHandle, EngineError> {
        let registry = {
            let workers = self.workers.read().await;
            workers
                .get(&options.task_queue)
                .cloned()
                .ok_or_else(|| EngineError::NoWorker(options.task_queue.clone()))?
        };
        let workflow = registry
            .workflows
            .get(&options.workflow)
            .cloned()
            .ok_or_else(|| EngineError::UnknownWorkflow(options.workflow.clone()))?;

        let mut executions = self.executions.lock().await;
        if let Some(entry) = executions.get(&options.execution_id) {
            // Deduplicated: attach to the existing execution. A terminal
            // entry resolves immediately from its retained result.
            log::info!(
                "duplicate start for execution_id={}, attaching to run_id={}",
                options.execution_id,
                entry.run_id
            );
            return Ok(ExecutionHandle {
                execution_id: options.execution_id.clone(),
                run_id: entry.run_id.clone(),
                result: entry.result.clone(),
            });
        }

        let run_id = format!("run-{}", Uuid::new_v4().simple());
        let status = Arc::new(StdMutex::new(ExecutionStatus::Scheduled));
        let (tx, rx) = watch::channel(None);

        executions.insert(
            options.execution_id.clone(),
            ExecutionEntry {
                run_id: run_id.clone(),
                status: Arc::clone(&status),
                result: rx.clone(),
            },
        );
        drop(executions);

        let ctx = WorkflowContext {
            execution_id: options.execution_id.clone(),
            run_id: run_id.clone(),
            registry,
        };

        log::info!(
            "started execution: namespace={} execution_id={} run_id={}",
            self.namespace,
            options.execution_id,
            run_id
        );

        let execution_id = options.execution_id.clone();
        tokio::spawn(async move {
            set_status(&status, ExecutionStatus::Running);
            let result = workflow(ctx, input).await;
            let terminal = match &result {
                Ok(_) => ExecutionStatus::Completed,
                Err(EngineError::ActivityTimeout(_)) | Err(EngineError::HeartbeatTimeout(_)) => {
                    ExecutionStatus::TimedOut
                }
                Err(_) => ExecutionStatus::Failed,
            };
            set_status(&status, terminal);
            match &result {
                Ok(_) => log::info!(
                    "execution completed: execution_id={} status={:?}",
                    execution_id,
                    terminal
                ),
                Err(e) => log::error!(
                    "execution ended: execution_id={} status={:?} error={}",
                    execution_id,
                    terminal,
                    e
                ),
            }
            let _ = tx.send(Some(result));
        });

        Ok(ExecutionHandle {
            execution_id: options.execution_id,
            run_id,
            result: rx,
        })
    }
}

fn set_status(status: &Arc<StdMutex<ExecutionStatus>>, next: ExecutionStatus) {
    let mut guard = status.lock().unwrap_or_else(|e| e.into_inner());
    *guard = next;
}
