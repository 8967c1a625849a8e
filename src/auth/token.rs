//! Session tokens (signed JWTs) and password-reset tokens (random bytes,
//! stored only as a SHA-256 digest).

use chrono::{DateTime, Duration, Utc};
use jsonwebtoken::{decode, encode, DecodingKey, EncodingKey, Header, Validation};
use rand::RngCore;
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use uuid::Uuid;

use crate::error::ApiError;

pub const RESET_TOKEN_TTL_MINUTES: i64 = 30;

const RESET_TOKEN_BYTES: usize = 20;

#[derive(Debug, Serialize, Deserialize)]
pub struct Claims {
    pub sub: String,
    pub iat: i64,
    pub exp: i64,
}

/// Issues and verifies the session tokens handed to clients.
#[derive(Clone)]
pub struct TokenService {
    encoding_key: EncodingKey,
    decoding_key: DecodingKey,
    validation: Validation,
    lifetime: Duration,
}

impl TokenService {
    pub fn new(secret: &[u8], lifetime_hours: i64) -> Self {
        // Zero leeway: an expired token is expired, full stop.
        let mut validation = Validation::default();
        validation.leeway = 0;
        TokenService {
            encoding_key: EncodingKey::from_secret(secret),
            decoding_key: DecodingKey::from_secret(secret),
            validation,
            lifetime: Duration::hours(lifetime_hours),
        }
    }

    pub fn issue(&self, user_id: Uuid) -> Result<String, ApiError> {
        self.issue_with_lifetime(user_id, self.lifetime)
    }

    fn issue_with_lifetime(&self, user_id: Uuid, lifetime: Duration) -> Result<String, ApiError> {
        let now = Utc::now();
        let claims = Claims {
            sub: user_id.to_string(),
            iat: now.timestamp(),
            exp: (now + lifetime).timestamp(),
        };
        encode(&Header::default(), &claims, &self.encoding_key)
            .map_err(|e| ApiError::Unexpected(format!("token signing failed: {}", e)))
    }

    /// Decodes the token and returns the subject id. Tampered, foreign,
    /// malformed, and expired tokens all fail the same way.
    pub fn verify(&self, token: &str) -> Result<Uuid, ApiError> {
        let data = decode::<Claims>(token, &self.decoding_key, &self.validation)
            .map_err(|_| unauthorized())?;
        Uuid::parse_str(&data.claims.sub).map_err(|_| unauthorized())
    }

    pub fn lifetime_seconds(&self) -> i64 {
        self.lifetime.num_seconds()
    }
}

fn unauthorized() -> ApiError {
    ApiError::Unauthorized("not authorized to access this route".to_string())
}

/// A freshly minted reset token. The plaintext goes out by email once; only
/// the digest and expiry are persisted.
pub struct ResetToken {
    pub plaintext: String,
    pub digest: String,
    pub expires_at: DateTime<Utc>,
}

pub fn issue_reset_token() -> ResetToken {
    let mut bytes = [0u8; RESET_TOKEN_BYTES];
    rand::thread_rng().fill_bytes(&mut bytes);
    let plaintext: String = bytes.iter().map(|b| format!("{:02x}", b)).collect();
    ResetToken {
        digest: reset_token_digest(&plaintext),
        expires_at: Utc::now() + Duration::minutes(RESET_TOKEN_TTL_MINUTES),
        plaintext,
    }
}

/// Digest used both when storing a token and when looking one up.
pub fn reset_token_digest(plaintext: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(plaintext.as_bytes());
    format!("{:x}", hasher.finalize())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn service() -> TokenService {
        TokenService::new(b"test-secret", 24)
    }

    #[test]
    fn issue_verify_roundtrip_recovers_the_id() {
        let tokens = service();
        let id = Uuid::new_v4();
        let jwt = tokens.issue(id).unwrap();
        assert_eq!(tokens.verify(&jwt).unwrap(), id);
    }

    #[test]
    fn expired_token_is_rejected() {
        let tokens = service();
        let jwt = tokens
            .issue_with_lifetime(Uuid::new_v4(), Duration::minutes(-5))
            .unwrap();
        assert!(matches!(
            tokens.verify(&jwt),
            Err(ApiError::Unauthorized(_))
        ));
    }

    #[test]
    fn foreign_signature_is_rejected() {
        let theirs = TokenService::new(b"other-secret", 24);
        let jwt = theirs.issue(Uuid::new_v4()).unwrap();
        assert!(service().verify(&jwt).is_err());
    }

    #[test]
    fn garbage_tokens_are_rejected() {
        let tokens = service();
        assert!(tokens.verify("").is_err());
        assert!(tokens.verify("none").is_err());
        assert!(tokens.verify("a.b.c").is_err());
    }

    #[test]
    fn tampered_payload_is_rejected() {
        let tokens = service();
        let jwt = tokens.issue(Uuid::new_v4()).unwrap();
        let mut parts: Vec<String> = jwt.split('.').map(str::to_string).collect();
        parts[1] = format!("x{}", parts[1]);
        assert!(tokens.verify(&parts.join(".")).is_err());
    }

    #[test]
    fn reset_token_shape_and_expiry() {
        let token = issue_reset_token();
        assert_eq!(token.plaintext.len(), RESET_TOKEN_BYTES * 2);
        assert!(token.plaintext.chars().all(|c| c.is_ascii_hexdigit()));
        assert_eq!(token.digest.len(), 64);
        assert_ne!(token.digest, token.plaintext);

        let remaining = token.expires_at - Utc::now();
        assert!(remaining > Duration::minutes(RESET_TOKEN_TTL_MINUTES - 1));
        assert!(remaining <= Duration::minutes(RESET_TOKEN_TTL_MINUTES));
    }

    #[test]
    fn digest_is_stable_for_lookup() {
        let token = issue_reset_token();
        assert_eq!(reset_token_digest(&token.plaintext), token.digest);
    }

    #[test]
    fn distinct_tokens_every_time() {
        let a = issue_reset_token();
        let b = issue_reset_token();
        assert_ne!(a.plaintext, b.plaintext);
        assert_ne!(a.digest, b.digest);
    }
}
