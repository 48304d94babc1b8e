//! Authorization capability for the HTTP boundary.
//! The core depends only on the trait; the default implementation is an
//! explicit no-op stub that always permits.

use async_trait::async_trait;

/// Decides whether a caller-supplied token is allowed to dispatch requests
#[async_trait]
pub trait AuthorizationChecker: Send + Sync {
    /// Returns true when the token is allowed
    async fn checks(&self, token: &str) -> bool;
}

/// No-op authorization stub. Every token, including an absent one, is
/// permitted. Swap in a real checker at construction time to enforce access.
pub struct AllowAllChecker;

#[async_trait]
impl AuthorizationChecker for AllowAllChecker {
    async fn checks(&self, _token: &str) -> bool {
        true
    }
}
