//! Authentication configuration.

use serde::{Deserialize, Serialize};

/// Minimum accepted length of the token signing secret, in bytes.
pub const MIN_SECRET_LENGTH: usize = 32;

/// Longest accepted token lifetime, one year.
pub const MAX_TOKEN_TTL_HOURS: u64 = 24 * 365;

/// Authentication and credential configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AuthConfig {
    /// Symmetric secret for token signing (HMAC-SHA256).
    ///
    /// Fixed for the process lifetime. Changing it invalidates every
    /// outstanding token.
    #[serde(default)]
    pub token_secret: String,
    /// Session token lifetime in hours.
    #[serde(default = "default_token_ttl")]
    pub token_ttl_hours: u64,
    /// Clock skew tolerated past a token's expiry, in seconds.
    #[serde(default = "default_leeway")]
    pub token_leeway_seconds: u64,
    /// Upper bound on any single store call made during a request.
    #[serde(default = "default_store_timeout")]
    pub store_timeout_seconds: u64,
    /// Minimum password length in characters.
    #[serde(default = "default_password_min")]
    pub password_min_length: usize,
    /// Maximum password length in bytes. Bounds the hashing cost of a request.
    #[serde(default = "default_password_max")]
    pub password_max_length: usize,
    /// Work factor for the password hash.
    #[serde(default)]
    pub password_hash: PasswordHashConfig,
}

impl Default for AuthConfig {
    fn default() -> Self {
        Self {
            token_secret: String::new(),
            token_ttl_hours: default_token_ttl(),
            token_leeway_seconds: default_leeway(),
            store_timeout_seconds: default_store_timeout(),
            password_min_length: default_password_min(),
            password_max_length: default_password_max(),
            password_hash: PasswordHashConfig::default(),
        }
    }
}

/// Argon2id cost parameters.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct PasswordHashConfig {
    /// Memory cost in KiB.
    #[serde(default = "default_memory_kib")]
    pub memory_kib: u32,
    /// Number of passes.
    #[serde(default = "default_iterations")]
    pub iterations: u32,
    /// Degree of parallelism.
    #[serde(default = "default_parallelism")]
    pub parallelism: u32,
}

impl Default for PasswordHashConfig {
    fn default() -> Self {
        Self {
            memory_kib: default_memory_kib(),
            iterations: default_iterations(),
            parallelism: default_parallelism(),
        }
    }
}

fn default_token_ttl() -> u64 {
    72
}

fn default_leeway() -> u64 {
    5
}

fn default_store_timeout() -> u64 {
    5
}

fn default_password_min() -> usize {
    1
}

fn default_password_max() -> usize {
    1024
}

fn default_memory_kib() -> u32 {
    19_456
}

fn default_iterations() -> u32 {
    2
}

fn default_parallelism() -> u32 {
    1
}
