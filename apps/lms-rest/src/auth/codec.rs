use std::fmt;
use std::time::SystemTime;

use jsonwebtoken::errors::ErrorKind;
use jsonwebtoken::{decode, encode, Algorithm, DecodingKey, EncodingKey, Header, Validation};

use super::token::{Token, TokenClaims, TokenError, TokenKind};
use crate::state::security_config::SecurityConfig;

/// Signs and verifies tokens as compact JWTs.
pub struct TokenCodec {
    algorithm: Algorithm,
    encoding_key: EncodingKey,
    decoding_key: DecodingKey,
}

impl fmt::Debug for TokenCodec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TokenCodec")
            .field("algorithm", &self.algorithm)
            .finish_non_exhaustive()
    }
}

impl TokenCodec {
    pub fn new(security: &SecurityConfig) -> Self {
        Self {
            algorithm: security.algorithm,
            encoding_key: EncodingKey::from_secret(&security.token_secret),
            decoding_key: DecodingKey::from_secret(&security.token_secret),
        }
    }

    pub fn encode(&self, token: &Token) -> Result<String, jsonwebtoken::errors::Error> {
        encode(&Header::new(self.algorithm), &token.claims(), &self.encoding_key)
    }

    /// Verify a token that must be of `expected` kind.
    ///
    /// Checks run in order: signature, kind, secret entropy, expiry.
    pub fn decode(
        &self,
        raw: &str,
        expected: TokenKind,
        now: SystemTime,
    ) -> Result<Token, TokenError> {
        let claims = self.verify_signature(raw)?;
        if claims.typ != expected {
            return Err(TokenError::WrongType);
        }
        finish(claims, now)
    }

    /// Verify a token of either kind (revocation reads the kind from the token).
    pub fn decode_any(&self, raw: &str, now: SystemTime) -> Result<Token, TokenError> {
        let claims = self.verify_signature(raw)?;
        finish(claims, now)
    }

    fn verify_signature(&self, raw: &str) -> Result<TokenClaims, TokenError> {
        let mut validation = Validation::new(self.algorithm);
        // exp is compared against the caller's clock with zero leeway in `finish`.
        validation.validate_exp = false;

        decode::<TokenClaims>(raw, &self.decoding_key, &validation)
            .map(|data| data.claims)
            .map_err(|e| match e.kind() {
                ErrorKind::InvalidSignature => TokenError::RevokedOrUnknown,
                _ => TokenError::Malformed,
            })
    }
}

fn finish(claims: TokenClaims, now: SystemTime) -> Result<Token, TokenError> {
    let token = Token::from_claims(claims)?;
    if token.is_expired_at(now) {
        return Err(TokenError::Expired);
    }
    Ok(token)
}
