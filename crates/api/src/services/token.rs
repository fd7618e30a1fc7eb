//! Session token issuance and verification.
//!
//! Tokens are compact HS256 JWS strings. They are never stored: whether a
//! token's customer is still logged in is checked against the customer
//! record, not against the token.

use std::time::Duration;

use jsonwebtoken::{Algorithm, DecodingKey, EncodingKey, Header, Validation, errors::ErrorKind};
use secrecy::ExposeSecret;
use thiserror::Error;

use merchant_bank_core::{Role, RoleClaim};

use crate::config::TokenConfig;
use crate::models::customer::Customer;
use crate::models::session::Claims;

/// Errors that can occur while issuing or verifying a token.
#[derive(Debug, Error)]
pub enum TokenError {
    /// The token could not be signed.
    #[error("failed to sign token: {0}")]
    Encode(#[source] jsonwebtoken::errors::Error),

    /// Bad signature, malformed token or missing claims.
    #[error("failed to parse token")]
    InvalidSignature,

    /// The token was issued by someone else.
    #[error("invalid issuer or claims")]
    InvalidIssuer,

    /// The token is past its expiry.
    #[error("token has expired")]
    Expired,
}

/// Issues and verifies session tokens.
#[derive(Clone)]
pub struct TokenService {
    encoding: EncodingKey,
    decoding: DecodingKey,
    validation: Validation,
    issuer: String,
    lifetime: Duration,
}

impl std::fmt::Debug for TokenService {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TokenService")
            .field("keys", &"[REDACTED]")
            .field("issuer", &self.issuer)
            .field("lifetime", &self.lifetime)
            .finish_non_exhaustive()
    }
}

impl TokenService {
    /// Build a token service from configuration.
    #[must_use]
    pub fn new(config: &TokenConfig) -> Self {
        let key = config.signing_key.expose_secret().as_bytes();

        let mut validation = Validation::new(Algorithm::HS256);
        validation.leeway = 0;

        Self {
            encoding: EncodingKey::from_secret(key),
            decoding: DecodingKey::from_secret(key),
            validation,
            issuer: config.issuer.clone(),
            lifetime: config.lifetime,
        }
    }

    /// The issuer stamped on, and required of, every token.
    #[must_use]
    pub fn issuer(&self) -> &str {
        &self.issuer
    }

    /// Issue a token for `customer`, valid from now for the configured
    /// lifetime, carrying the `customer` role.
    ///
    /// # Errors
    ///
    /// Returns `TokenError::Encode` if signing fails.
    pub fn issue(&self, customer: &Customer) -> Result<String, TokenError> {
        let now = jsonwebtoken::get_current_timestamp();
        let claims = Claims {
            sub: customer.id.clone(),
            iss: self.issuer.clone(),
            iat: now,
            exp: now.saturating_add(self.lifetime.as_secs()),
            role: Some(RoleClaim::from(Role::customer())),
        };

        self.sign(&claims)
    }

    fn sign(&self, claims: &Claims) -> Result<String, TokenError> {
        jsonwebtoken::encode(&Header::new(Algorithm::HS256), claims, &self.encoding)
            .map_err(TokenError::Encode)
    }

    /// Check a token's signature, expiry and issuer.
    ///
    /// # Errors
    ///
    /// Returns `TokenError::Expired` past the expiry,
    /// `TokenError::InvalidIssuer` if the issuer does not match, and
    /// `TokenError::InvalidSignature` for anything else wrong with the token.
    pub fn verify(&self, token: &str) -> Result<Claims, TokenError> {
        let data = jsonwebtoken::decode::<Claims>(token, &self.decoding, &self.validation)
            .map_err(|e| match e.kind() {
                ErrorKind::ExpiredSignature => TokenError::Expired,
                _ => TokenError::InvalidSignature,
            })?;

        if data.claims.iss != self.issuer {
            return Err(TokenError::InvalidIssuer);
        }

        Ok(data.claims)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use merchant_bank_core::{CustomerId, Username};
    use secrecy::SecretString;

    fn config(key: &str, issuer: &str) -> TokenConfig {
        TokenConfig::new(
            SecretString::from(key.to_owned()),
            issuer,
            Duration::from_secs(24 * 60 * 60),
        )
        .unwrap()
    }

    fn customer() -> Customer {
        Customer {
            id: CustomerId::new("1"),
            username: Username::parse("alice").unwrap(),
            password_hash: String::new(),
            logged_in: true,
        }
    }

    #[test]
    fn test_issue_then_verify() {
        let tokens = TokenService::new(&config("test-signing-key", "bank"));
        let token = tokens.issue(&customer()).unwrap();
        assert!(!token.is_empty());

        let claims = tokens.verify(&token).unwrap();
        assert_eq!(claims.sub.as_str(), "1");
        assert_eq!(claims.iss, "bank");
        assert_eq!(claims.exp - claims.iat, 24 * 60 * 60);
        assert!(claims.role.unwrap().matches_any(&[Role::customer()]));
    }

    #[test]
    fn test_wrong_key_is_invalid_signature() {
        let issuer = TokenService::new(&config("key-one", "bank"));
        let verifier = TokenService::new(&config("key-two", "bank"));
        let token = issuer.issue(&customer()).unwrap();

        assert!(matches!(
            verifier.verify(&token),
            Err(TokenError::InvalidSignature)
        ));
    }

    #[test]
    fn test_garbage_is_invalid_signature() {
        let tokens = TokenService::new(&config("test-signing-key", "bank"));
        assert!(matches!(
            tokens.verify("not.a.token"),
            Err(TokenError::InvalidSignature)
        ));
        assert!(matches!(tokens.verify(""), Err(TokenError::InvalidSignature)));
    }

    #[test]
    fn test_other_issuer_rejected() {
        let theirs = TokenService::new(&config("shared-key", "someone-else"));
        let ours = TokenService::new(&config("shared-key", "bank"));
        let token = theirs.issue(&customer()).unwrap();

        assert!(matches!(ours.verify(&token), Err(TokenError::InvalidIssuer)));
    }

    #[test]
    fn test_expired_token_rejected() {
        let tokens = TokenService::new(&config("test-signing-key", "bank"));
        let now = jsonwebtoken::get_current_timestamp();
        let token = tokens
            .sign(&Claims {
                sub: CustomerId::new("1"),
                iss: "bank".to_owned(),
                iat: now - 120,
                exp: now - 60,
                role: None,
            })
            .unwrap();

        assert!(matches!(tokens.verify(&token), Err(TokenError::Expired)));
    }

    #[test]
    fn test_debug_redacts_keys() {
        let tokens = TokenService::new(&config("super-secret-key", "bank"));
        let debug = format!("{tokens:?}");
        assert!(!debug.contains("super-secret-key"));
        assert!(debug.contains("REDACTED"));
    }
}
