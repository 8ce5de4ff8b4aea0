//! Token issuance and verification.

use std::collections::HashSet;

use chrono::{DateTime, Duration, Utc};
use jsonwebtoken::errors::ErrorKind as JwtErrorKind;
use jsonwebtoken::{Algorithm, DecodingKey, EncodingKey, Header, Validation, decode, encode};
use thiserror::Error;
use uuid::Uuid;

use sso_core::config::auth::{AuthConfig, MAX_TOKEN_TTL_HOURS, MIN_SECRET_LENGTH};
use sso_core::error::{AppError, ErrorKind};
use sso_core::types::UserId;

use super::claims::Claims;

/// The only accepted signing algorithm.
const ALGORITHM: Algorithm = Algorithm::HS256;

/// Why a token was rejected.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum VerifyError {
    /// Not a decodable JWT, or required claims are missing.
    #[error("malformed token")]
    Malformed,
    /// Signature does not match the process secret.
    #[error("bad token signature")]
    BadSignature,
    /// The header names an algorithm other than HS256.
    #[error("unsupported token algorithm")]
    UnsupportedAlgorithm,
    /// `now` is past expiry plus leeway.
    #[error("token expired")]
    Expired,
}

impl From<VerifyError> for AppError {
    fn from(err: VerifyError) -> Self {
        AppError::unauthenticated(format!("Invalid session: {err}"))
    }
}

/// A freshly signed token.
#[derive(Debug, Clone)]
pub struct IssuedToken {
    /// Compact JWT.
    pub token: String,
    /// Expiry instant, for cookie lifetimes.
    pub expires_at: DateTime<Utc>,
    /// Token id.
    pub jti: Uuid,
}

/// Signs and verifies stateless session tokens.
///
/// The secret is fixed for the life of the service. Rotating it
/// invalidates every outstanding token; there is no refresh or revocation.
#[derive(Clone)]
pub struct TokenService {
    encoding_key: EncodingKey,
    decoding_key: DecodingKey,
    validation: Validation,
    ttl: Duration,
    leeway_seconds: i64,
}

impl std::fmt::Debug for TokenService {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TokenService")
            .field("algorithm", &ALGORITHM)
            .field("ttl", &self.ttl)
            .field("leeway_seconds", &self.leeway_seconds)
            .finish()
    }
}

impl TokenService {
    /// Creates the service from auth configuration.
    pub fn new(config: &AuthConfig) -> Result<Self, AppError> {
        if config.token_secret.len() < MIN_SECRET_LENGTH {
            return Err(AppError::configuration(format!(
                "Token secret must be at least {MIN_SECRET_LENGTH} bytes"
            )));
        }
        let ttl = Some(config.token_ttl_hours)
            .filter(|h| (1..=MAX_TOKEN_TTL_HOURS).contains(h))
            .and_then(|h| i64::try_from(h).ok())
            .and_then(Duration::try_hours)
            .ok_or_else(|| {
                AppError::configuration(format!(
                    "Token TTL must be between 1 and {MAX_TOKEN_TTL_HOURS} hours"
                ))
            })?;
        let leeway_seconds = i64::try_from(config.token_leeway_seconds)
            .map_err(|_| AppError::configuration("Token leeway is out of range"))?;

        // Expiry is checked by hand against the caller's clock.
        let mut validation = Validation::new(ALGORITHM);
        validation.validate_exp = false;
        validation.leeway = 0;
        validation.required_spec_claims =
            HashSet::from(["exp".to_string(), "sub".to_string()]);

        Ok(Self {
            encoding_key: EncodingKey::from_secret(config.token_secret.as_bytes()),
            decoding_key: DecodingKey::from_secret(config.token_secret.as_bytes()),
            validation,
            ttl,
            leeway_seconds,
        })
    }

    /// Lifetime of newly issued tokens.
    pub fn ttl(&self) -> Duration {
        self.ttl
    }

    /// Signs a token for `subject`, valid from `now` for the configured TTL.
    pub fn issue(&self, subject: UserId, now: DateTime<Utc>) -> Result<IssuedToken, AppError> {
        let expires_at = now
            .checked_add_signed(self.ttl)
            .ok_or_else(|| AppError::internal("Token expiry is out of range"))?;
        let claims = Claims {
            sub: subject,
            iat: now.timestamp(),
            exp: expires_at.timestamp(),
            jti: Uuid::new_v4(),
        };

        let token = encode(&Header::new(ALGORITHM), &claims, &self.encoding_key)
            .map_err(|e| AppError::with_source(ErrorKind::Internal, "Failed to sign token", e))?;

        Ok(IssuedToken {
            token,
            expires_at,
            jti: claims.jti,
        })
    }

    /// Verifies a token as of `now` and returns its claims.
    pub fn verify(&self, token: &str, now: DateTime<Utc>) -> Result<Claims, VerifyError> {
        let data = decode::<Claims>(token, &self.decoding_key, &self.validation).map_err(|e| {
            match e.kind() {
                JwtErrorKind::InvalidSignature => VerifyError::BadSignature,
                JwtErrorKind::InvalidAlgorithm | JwtErrorKind::InvalidAlgorithmName => {
                    VerifyError::UnsupportedAlgorithm
                }
                _ => VerifyError::Malformed,
            }
        })?;

        if now.timestamp() > data.claims.exp.saturating_add(self.leeway_seconds) {
            return Err(VerifyError::Expired);
        }
        Ok(data.claims)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use base64::Engine;
    use base64::engine::general_purpose::URL_SAFE_NO_PAD;

    const SECRET: &str = "0123456789abcdef0123456789abcdef";

    fn config(secret: &str) -> AuthConfig {
        AuthConfig {
            token_secret: secret.to_string(),
            ..AuthConfig::default()
        }
    }

    fn service() -> TokenService {
        TokenService::new(&config(SECRET)).expect("valid config")
    }

    #[test]
    fn test_issue_then_verify() {
        let service = service();
        let user = UserId::new();
        let now = Utc::now();
        let issued = service.issue(user, now).expect("issue");
        assert_eq!(issued.expires_at, now + Duration::hours(72));

        let claims = service.verify(&issued.token, now).expect("verify");
        assert_eq!(claims.sub, user);
        assert_eq!(claims.jti, issued.jti);
        assert_eq!(claims.exp - claims.iat, 72 * 3600);
    }

    #[test]
    fn test_expiry_respects_leeway() {
        let service = service();
        let t0 = DateTime::from_timestamp(1_700_000_000, 0).expect("valid timestamp");
        let token = service.issue(UserId::new(), t0).expect("issue").token;
        let expiry = t0 + Duration::hours(72);

        assert!(service.verify(&token, expiry).is_ok());
        assert!(service.verify(&token, expiry + Duration::seconds(5)).is_ok());
        assert_eq!(
            service.verify(&token, expiry + Duration::seconds(6)),
            Err(VerifyError::Expired)
        );
    }

    #[test]
    fn test_token_issued_in_past_is_expired() {
        let service = service();
        let now = Utc::now();
        let token = service
            .issue(UserId::new(), now - Duration::hours(73))
            .expect("issue")
            .token;
        assert_eq!(service.verify(&token, now), Err(VerifyError::Expired));
    }

    #[test]
    fn test_foreign_secret_rejected() {
        let other = TokenService::new(&config("ffffffffffffffffffffffffffffffff")).expect("valid");
        let now = Utc::now();
        let token = other.issue(UserId::new(), now).expect("issue").token;
        assert_eq!(service().verify(&token, now), Err(VerifyError::BadSignature));
    }

    #[test]
    fn test_other_hmac_algorithm_rejected() {
        let now = Utc::now();
        let claims = Claims {
            sub: UserId::new(),
            iat: now.timestamp(),
            exp: (now + Duration::hours(1)).timestamp(),
            jti: Uuid::new_v4(),
        };
        let token = encode(
            &Header::new(Algorithm::HS384),
            &claims,
            &EncodingKey::from_secret(SECRET.as_bytes()),
        )
        .expect("encode");
        assert_eq!(
            service().verify(&token, now),
            Err(VerifyError::UnsupportedAlgorithm)
        );
    }

    #[test]
    fn test_unsigned_token_rejected() {
        let now = Utc::now();
        let header = URL_SAFE_NO_PAD.encode(br#"{"alg":"none","typ":"JWT"}"#);
        let payload = URL_SAFE_NO_PAD.encode(
            serde_json::json!({
                "sub": UserId::new(),
                "iat": now.timestamp(),
                "exp": now.timestamp() + 3600,
                "jti": Uuid::new_v4(),
            })
            .to_string(),
        );
        let token = format!("{header}.{payload}.");
        assert!(service().verify(&token, now).is_err());
    }

    #[test]
    fn test_garbage_is_malformed() {
        let now = Utc::now();
        assert_eq!(service().verify("", now), Err(VerifyError::Malformed));
        assert_eq!(service().verify("a.b.c", now), Err(VerifyError::Malformed));
    }

    #[test]
    fn test_tampered_payload_rejected() {
        let service = service();
        let now = Utc::now();
        let token = service.issue(UserId::new(), now).expect("issue").token;
        let mut parts: Vec<&str> = token.split('.').collect();
        let forged = URL_SAFE_NO_PAD.encode(
            serde_json::json!({
                "sub": UserId::new(),
                "iat": now.timestamp(),
                "exp": now.timestamp() + 3600,
                "jti": Uuid::new_v4(),
            })
            .to_string(),
        );
        parts[1] = &forged;
        assert_eq!(
            service.verify(&parts.join("."), now),
            Err(VerifyError::BadSignature)
        );
    }

    #[test]
    fn test_short_secret_refused() {
        assert!(TokenService::new(&config("short")).is_err());
    }

    #[test]
    fn test_out_of_range_ttl_refused() {
        for hours in [0, MAX_TOKEN_TTL_HOURS + 1, 10_000_000_000, u64::MAX] {
            let config = AuthConfig {
                token_ttl_hours: hours,
                ..config(SECRET)
            };
            let err = TokenService::new(&config).expect_err("ttl out of range");
            assert_eq!(err.kind, ErrorKind::Configuration);
        }
    }

    #[test]
    fn test_issue_near_end_of_time_fails_cleanly() {
        let config = AuthConfig {
            token_ttl_hours: MAX_TOKEN_TTL_HOURS,
            ..config(SECRET)
        };
        let service = TokenService::new(&config).expect("longest ttl accepted");
        let err = service
            .issue(UserId::new(), DateTime::<Utc>::MAX_UTC)
            .expect_err("expiry overflows");
        assert_eq!(err.kind, ErrorKind::Internal);

        let issued = service.issue(UserId::new(), Utc::now()).expect("issue");
        assert!(issued.expires_at > Utc::now() + Duration::days(364));
    }
}
