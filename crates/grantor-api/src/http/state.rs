//! Application state for HTTP handlers.

use std::sync::Arc;

use grantor_storage::AuthStore;

use crate::service::{AccessPolicy, AuthorizationService};

/// Application state shared across all HTTP handlers.
///
/// # Type Parameters
///
/// * `S` - The storage backend implementing `AuthStore`
#[derive(Clone)]
pub struct AppState<S: AuthStore> {
    /// The authorization service facade.
    pub service: Arc<AuthorizationService<S>>,
}

impl<S: AuthStore> AppState<S> {
    /// Creates application state with an empty access policy.
    pub fn new(storage: Arc<S>) -> Self {
        Self::with_policy(storage, AccessPolicy::default())
    }

    /// Creates application state with the given access policy.
    pub fn with_policy(storage: Arc<S>, policy: AccessPolicy) -> Self {
        Self {
            service: Arc::new(AuthorizationService::with_policy(storage, policy)),
        }
    }
}
