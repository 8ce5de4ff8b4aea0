//! Argon2id password hashing and verification.

use argon2::{
    Algorithm, Argon2, Params, Version,
    password_hash::{
        PasswordHash, PasswordHasher as ArgonHasher, PasswordVerifier, SaltString, rand_core::OsRng,
    },
};

use sso_core::config::auth::PasswordHashConfig;
use sso_core::error::AppError;

/// Plaintext behind the dummy digest used to equalize login timing.
const DUMMY_PASSWORD: &str = "sso-timing-equalizer";

/// Hashes and verifies passwords with Argon2id.
///
/// Digests are PHC strings carrying their own salt and parameters, so
/// digests produced under an older work factor keep verifying after the
/// configuration changes.
#[derive(Debug, Clone)]
pub struct PasswordHasher {
    params: Params,
    dummy_hash: String,
}

impl PasswordHasher {
    /// Creates a hasher with the configured work factor.
    pub fn new(config: &PasswordHashConfig) -> Result<Self, AppError> {
        let params = Params::new(config.memory_kib, config.iterations, config.parallelism, None)
            .map_err(|e| AppError::configuration(format!("Invalid Argon2 parameters: {e}")))?;

        let mut hasher = Self {
            params,
            dummy_hash: String::new(),
        };
        hasher.dummy_hash = hasher.hash(DUMMY_PASSWORD)?;
        Ok(hasher)
    }

    fn argon2(&self) -> Argon2<'static> {
        Argon2::new(Algorithm::Argon2id, Version::V0x13, self.params.clone())
    }

    /// Hashes a plaintext password with a fresh random salt.
    pub fn hash(&self, password: &str) -> Result<String, AppError> {
        let salt = SaltString::generate(&mut OsRng);
        let hash = self
            .argon2()
            .hash_password(password.as_bytes(), &salt)
            .map_err(|e| AppError::internal(format!("Password hashing failed: {e}")))?;
        Ok(hash.to_string())
    }

    /// Verifies a plaintext password against a stored digest.
    ///
    /// A mismatch is `Ok(false)`. Only an unparseable digest or a failure
    /// inside the algorithm is an error.
    pub fn verify(&self, password: &str, digest: &str) -> Result<bool, AppError> {
        let parsed = PasswordHash::new(digest)
            .map_err(|e| AppError::internal(format!("Invalid password hash format: {e}")))?;

        match self.argon2().verify_password(password.as_bytes(), &parsed) {
            Ok(()) => Ok(true),
            Err(argon2::password_hash::Error::Password) => Ok(false),
            Err(e) => Err(AppError::internal(format!(
                "Password verification failed: {e}"
            ))),
        }
    }

    /// Performs a full verification that always fails.
    ///
    /// Called when the account does not exist so that the response time
    /// does not reveal whether an email is registered.
    pub fn dummy_verify(&self, password: &str) {
        let _ = self.verify(password, &self.dummy_hash);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn hasher() -> PasswordHasher {
        PasswordHasher::new(&PasswordHashConfig {
            memory_kib: 1024,
            iterations: 1,
            parallelism: 1,
        })
        .expect("valid params")
    }

    #[test]
    fn test_hash_then_verify() {
        let hasher = hasher();
        let digest = hasher.hash("pw123").expect("hash");
        assert!(digest.starts_with("$argon2id$"));
        assert!(!digest.contains("pw123"));
        assert!(hasher.verify("pw123", &digest).expect("verify"));
        assert!(!hasher.verify("pw124", &digest).expect("verify"));
    }

    #[test]
    fn test_salts_differ() {
        let hasher = hasher();
        let a = hasher.hash("same").expect("hash");
        let b = hasher.hash("same").expect("hash");
        assert_ne!(a, b);
    }

    #[test]
    fn test_garbage_digest_is_error() {
        assert!(hasher().verify("pw", "not-a-phc-string").is_err());
    }

    #[test]
    fn test_digest_from_other_work_factor_verifies() {
        let strong = PasswordHasher::new(&PasswordHashConfig {
            memory_kib: 2048,
            iterations: 2,
            parallelism: 1,
        })
        .expect("valid params");
        let digest = strong.hash("pw").expect("hash");
        assert!(hasher().verify("pw", &digest).expect("verify"));
    }

    #[test]
    fn test_invalid_params_rejected() {
        let result = PasswordHasher::new(&PasswordHashConfig {
            memory_kib: 1,
            iterations: 0,
            parallelism: 0,
        });
        assert!(result.is_err());
    }
}
