//! act-core-rs/lib.rs
//! Dispatch-and-correlate core: turns an inbound ACT request into a uniquely
//! identified durable execution, blocks until the engine reports completion,
//! and maps engine identifiers into the caller-facing status string.

pub mod activity;
pub mod adapter;
pub mod auth;
pub mod identity;
pub mod models;
pub mod workflow;

pub use adapter::{DispatchAdapter, DispatchError};
pub use auth::{AllowAllChecker, AuthorizationChecker};
pub use identity::{derive_execution_id, ExecutionIdentity, EXECUTION_ID_PREFIX};
pub use models::{ActRequest, ActRequestMeta, ActResponse, ActResponseError, OpaquePayload};
