//! Application state shared across all handlers and extractors.

use std::sync::Arc;

use sso_auth::{RbacEnforcer, SessionManager, StoreDeadline};
use sso_core::config::AppConfig;
use sso_core::result::AppResult;
use sso_core::traits::Clock;
use sso_database::CredentialStore;
use sso_service::{AdminUserService, InviteService, UserService};

/// Application state containing all shared dependencies.
///
/// Passed to every handler via `State<AppState>`. All fields are
/// `Arc`-wrapped for cheap cloning across tasks.
#[derive(Debug, Clone)]
pub struct AppState {
    /// Application configuration.
    pub config: Arc<AppConfig>,
    /// Credential store.
    pub store: Arc<dyn CredentialStore>,
    /// Register, login and validate flows.
    pub session_manager: Arc<SessionManager>,
    /// User self-service.
    pub user_service: Arc<UserService>,
    /// Admin user management.
    pub admin_service: Arc<AdminUserService>,
    /// Invite issuance.
    pub invite_service: Arc<InviteService>,
}

impl AppState {
    /// Wires every service over the given store and clock.
    pub fn new(
        config: AppConfig,
        store: Arc<dyn CredentialStore>,
        clock: Arc<dyn Clock>,
    ) -> AppResult<Self> {
        let deadline = StoreDeadline::from_config(&config.auth);
        let rbac = RbacEnforcer::new();

        let session_manager =
            SessionManager::from_config(&config.auth, Arc::clone(&store), clock)?;
        let invite_service =
            InviteService::new(Arc::clone(session_manager.ledger()), rbac);

        Ok(Self {
            user_service: Arc::new(UserService::new(Arc::clone(&store), deadline)),
            admin_service: Arc::new(AdminUserService::new(Arc::clone(&store), rbac, deadline)),
            invite_service: Arc::new(invite_service),
            session_manager: Arc::new(session_manager),
            store,
            config: Arc::new(config),
        })
    }
}
