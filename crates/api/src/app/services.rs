//! Service wiring shared by every handler.

use userbase_infra::UserStore;

use crate::config::Environment;

/// Everything a request handler may touch.
///
/// Built once by the entry point and handed to the router; the store inside is
/// the process's only storage handle.
#[derive(Debug, Clone)]
pub struct AppState {
    pub store: UserStore,
    pub environment: Environment,
}

impl AppState {
    pub fn new(store: UserStore, environment: Environment) -> Self {
        Self { store, environment }
    }
}
