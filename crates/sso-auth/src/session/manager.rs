//! Session lifecycle manager: register, login and validate flows.

use std::sync::Arc;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use sso_core::config::auth::AuthConfig;
use sso_core::error::{AppError, ErrorKind};
use sso_core::result::AppResult;
use sso_core::traits::Clock;
use sso_database::CredentialStore;
use sso_entity::{Permissions, Role, User, UserPublic};

use crate::deadline::StoreDeadline;
use crate::invite::InviteLedger;
use crate::jwt::TokenService;
use crate::password::{CredentialPolicy, PasswordHasher};

/// Result of a successful login.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoginResult {
    /// Signed session token.
    pub token: String,
    /// When the token stops being accepted (before leeway).
    pub expires_at: DateTime<Utc>,
    /// The authenticated user.
    pub user: UserPublic,
}

/// Orchestrates the credential and session lifecycle.
///
/// Holds no mutable state of its own. Every uniqueness and single-use
/// guarantee comes from the store, so any number of managers (or
/// processes) can run against the same store.
#[derive(Clone)]
pub struct SessionManager {
    store: Arc<dyn CredentialStore>,
    ledger: Arc<InviteLedger>,
    hasher: Arc<PasswordHasher>,
    tokens: Arc<TokenService>,
    policy: CredentialPolicy,
    clock: Arc<dyn Clock>,
    deadline: StoreDeadline,
}

impl std::fmt::Debug for SessionManager {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SessionManager")
            .field("tokens", &self.tokens)
            .field("policy", &self.policy)
            .field("deadline", &self.deadline)
            .finish()
    }
}

impl SessionManager {
    /// Creates a session manager with all required dependencies.
    pub fn new(
        store: Arc<dyn CredentialStore>,
        ledger: Arc<InviteLedger>,
        hasher: Arc<PasswordHasher>,
        tokens: Arc<TokenService>,
        policy: CredentialPolicy,
        clock: Arc<dyn Clock>,
        deadline: StoreDeadline,
    ) -> Self {
        Self {
            store,
            ledger,
            hasher,
            tokens,
            policy,
            clock,
            deadline,
        }
    }

    /// Builds the manager and its collaborators from auth configuration.
    pub fn from_config(
        config: &AuthConfig,
        store: Arc<dyn CredentialStore>,
        clock: Arc<dyn Clock>,
    ) -> AppResult<Self> {
        let deadline = StoreDeadline::from_config(config);
        let ledger = Arc::new(InviteLedger::new(
            Arc::clone(&store),
            Arc::clone(&clock),
            deadline,
        ));
        Ok(Self::new(
            store,
            ledger,
            Arc::new(PasswordHasher::new(&config.password_hash)?),
            Arc::new(TokenService::new(config)?),
            CredentialPolicy::new(config),
            clock,
            deadline,
        ))
    }

    /// The invite ledger this manager redeems against.
    pub fn ledger(&self) -> &Arc<InviteLedger> {
        &self.ledger
    }

    /// The token service used for issuance and validation.
    pub fn tokens(&self) -> &Arc<TokenService> {
        &self.tokens
    }

    /// Registers a new user by redeeming an invite code.
    ///
    /// 1. Reject malformed input
    /// 2. Fail with `Conflict` if the email is taken
    /// 3. Check the invite (optimistic, may be stale)
    /// 4. Hash the password
    /// 5. Create the user and redeem the invite atomically
    ///
    /// No token is issued; the caller logs in separately.
    pub async fn register(
        &self,
        email: &str,
        password: &str,
        invite_code: &str,
    ) -> AppResult<UserPublic> {
        // Step 1: Input shape
        self.policy.check_email(email)?;
        self.policy.check_password(password)?;
        if invite_code.trim().is_empty() {
            return Err(AppError::invalid_invite("Invite code is required"));
        }

        // Step 2: Email uniqueness (the store re-checks inside the unit)
        let existing = self
            .deadline
            .run("find_user_by_email", self.store.find_user_by_email(email))
            .await?;
        if existing.is_some() {
            return Err(AppError::conflict("Email already registered"));
        }

        // Step 3: Invite pre-flight
        self.ledger.check(invite_code).await?;

        // Step 4: Hash off the async executor
        let password_hash = self.hash_password(password).await?;

        // Step 5: Atomic create + redeem
        let now = self.clock.now();
        let user = User::new(
            email,
            password_hash,
            Permissions::from_roles(&[Role::User]),
            now,
        );
        self.ledger
            .redeem_for_new_user(&user, invite_code, now)
            .await?;

        info!(user_id = %user.id, "User registered");
        Ok(user.to_public())
    }

    /// Checks credentials and issues a session token.
    ///
    /// An unknown email and a wrong password produce the same
    /// `InvalidCredentials` error after comparable work.
    pub async fn login(&self, email: &str, password: &str) -> AppResult<LoginResult> {
        let user = self
            .deadline
            .run("find_user_by_email", self.store.find_user_by_email(email))
            .await?;

        let Some(user) = user else {
            self.dummy_verify(password).await?;
            debug!("Login rejected: unknown account");
            return Err(AppError::invalid_credentials());
        };

        if !self.verify_password(password, &user.password_hash).await? {
            debug!(user_id = %user.id, "Login rejected: password mismatch");
            return Err(AppError::invalid_credentials());
        }

        let issued = self.tokens.issue(user.id, self.clock.now())?;
        info!(user_id = %user.id, jti = %issued.jti, "Session token issued");

        Ok(LoginResult {
            token: issued.token,
            expires_at: issued.expires_at,
            user: user.to_public(),
        })
    }

    /// Resolves a presented token to the user it was issued to.
    ///
    /// Fails with `Unauthenticated` if the token does not verify or its
    /// subject no longer exists.
    pub async fn validate_session(&self, token: &str) -> AppResult<UserPublic> {
        let claims = self
            .tokens
            .verify(token, self.clock.now())
            .map_err(|e| {
                debug!(reason = %e, "Session token rejected");
                AppError::from(e)
            })?;

        let user = self
            .deadline
            .run("find_user_by_id", self.store.find_user_by_id(claims.sub))
            .await?
            .ok_or_else(|| {
                debug!(user_id = %claims.sub, "Session subject no longer exists");
                AppError::unauthenticated("Invalid session: user no longer exists")
            })?;

        Ok(user.to_public())
    }

    async fn hash_password(&self, password: &str) -> AppResult<String> {
        let hasher = Arc::clone(&self.hasher);
        let password = password.to_owned();
        tokio::task::spawn_blocking(move || hasher.hash(&password))
            .await
            .map_err(|e| AppError::with_source(ErrorKind::Internal, "Password hashing task failed", e))?
    }

    async fn verify_password(&self, password: &str, digest: &str) -> AppResult<bool> {
        let hasher = Arc::clone(&self.hasher);
        let password = password.to_owned();
        let digest = digest.to_owned();
        tokio::task::spawn_blocking(move || hasher.verify(&password, &digest))
            .await
            .map_err(|e| {
                AppError::with_source(ErrorKind::Internal, "Password verification task failed", e)
            })?
    }

    async fn dummy_verify(&self, password: &str) -> AppResult<()> {
        let hasher = Arc::clone(&self.hasher);
        let password = password.to_owned();
        tokio::task::spawn_blocking(move || hasher.dummy_verify(&password))
            .await
            .map_err(|e| {
                AppError::with_source(ErrorKind::Internal, "Password verification task failed", e)
            })
    }
}
