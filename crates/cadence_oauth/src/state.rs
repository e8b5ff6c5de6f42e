//! Signed OAuth `state` parameter.
//!
//! The redirect carries `(user, provider)` across the provider round-trip
//! without a session cookie. The payload is HMAC-signed and embeds a
//! single-use nonce; the callback consumes the nonce exactly once, so a
//! replayed or forged state cannot link an account to a foreign user.

use crate::{OauthError, OauthErrorKind};
use cadence_core::{Provider, UserId};
use chrono::{Duration, Utc};
use jsonwebtoken::{DecodingKey, EncodingKey, Header, Validation, decode, encode};
use serde::{Deserialize, Serialize};

#[derive(Debug, Serialize, Deserialize)]
struct StateClaims {
    sub: UserId,
    provider: Provider,
    nonce: String,
    exp: i64,
}

/// A freshly signed state token and the nonce embedded in it.
#[derive(Debug, Clone)]
pub struct IssuedState {
    /// Signed token to embed in the provider redirect URL.
    pub token: String,
    /// Nonce to store for single-use validation.
    pub nonce: String,
}

/// Validated claims recovered from a state token.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VerifiedState {
    /// User who started the connect flow.
    pub user: UserId,
    /// Provider being connected.
    pub provider: Provider,
    /// Nonce to consume.
    pub nonce: String,
}

/// Signs and validates the redirect `state` parameter.
pub struct StateCodec {
    encoding: EncodingKey,
    decoding: DecodingKey,
    validation: Validation,
    ttl: Duration,
}

impl StateCodec {
    /// Create a codec over the given server secret.
    ///
    /// `ttl` bounds how long a redirect may take before the state expires.
    pub fn new(secret: &[u8], ttl: Duration) -> Self {
        let mut validation = Validation::default();
        validation.leeway = 0;
        Self {
            encoding: EncodingKey::from_secret(secret),
            decoding: DecodingKey::from_secret(secret),
            validation,
            ttl,
        }
    }

    /// Issue a signed state token for a connect flow.
    ///
    /// The embedded nonce must be stored (`OauthStateStore::issue_nonce`)
    /// before the redirect is handed to the browser.
    pub fn issue(&self, user: UserId, provider: Provider) -> Result<IssuedState, OauthError> {
        let nonce = format!("{:032x}", rand::random::<u128>());
        let claims = StateClaims {
            sub: user,
            provider,
            nonce: nonce.clone(),
            exp: (Utc::now() + self.ttl).timestamp(),
        };
        let token = encode(&Header::default(), &claims, &self.encoding)?;
        Ok(IssuedState { token, nonce })
    }

    /// Validate a state token's signature and expiry, recovering its claims.
    pub fn verify(&self, token: &str) -> Result<VerifiedState, OauthError> {
        let data = decode::<StateClaims>(token, &self.decoding, &self.validation)?;
        Ok(VerifiedState {
            user: data.claims.sub,
            provider: data.claims.provider,
            nonce: data.claims.nonce,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_round_trip() {
        let codec = StateCodec::new(b"test-secret", Duration::minutes(10));
        let user = UserId::new();

        let issued = codec.issue(user, Provider::Facebook).unwrap();
        let verified = codec.verify(&issued.token).unwrap();

        assert_eq!(verified.user, user);
        assert_eq!(verified.provider, Provider::Facebook);
        assert_eq!(verified.nonce, issued.nonce);
    }

    #[test]
    fn test_foreign_signature_rejected() {
        let codec = StateCodec::new(b"test-secret", Duration::minutes(10));
        let forger = StateCodec::new(b"other-secret", Duration::minutes(10));

        let forged = forger.issue(UserId::new(), Provider::Instagram).unwrap();
        let err = codec.verify(&forged.token).unwrap_err();
        assert!(matches!(err.kind(), OauthErrorKind::InvalidState(_)));
    }

    #[test]
    fn test_expired_state_rejected() {
        let codec = StateCodec::new(b"test-secret", Duration::seconds(-30));
        let issued = codec.issue(UserId::new(), Provider::Facebook).unwrap();

        let err = codec.verify(&issued.token).unwrap_err();
        assert!(matches!(err.kind(), OauthErrorKind::InvalidState(_)));
    }

    #[test]
    fn test_nonces_are_unique() {
        let codec = StateCodec::new(b"test-secret", Duration::minutes(10));
        let a = codec.issue(UserId::new(), Provider::Facebook).unwrap();
        let b = codec.issue(UserId::new(), Provider::Facebook).unwrap();
        assert_ne!(a.nonce, b.nonce);
    }
}
