use base64::{engine::general_purpose::URL_SAFE_NO_PAD, Engine};
use chrono::Utc;
use hmac::{Hmac, Mac};
use sha2::Sha256;
use thiserror::Error;
use tracing::debug;

use shared_models::auth::{JwtClaims, JwtHeader};

type HmacSha256 = Hmac<Sha256>;

const ALGORITHM: &str = "HS256";

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TokenError {
    #[error("JWT secret is not set")]
    MissingSecret,

    #[error("Token expired")]
    Expired,

    #[error("{0}")]
    Malformed(&'static str),
}

fn mac_for(secret: &str) -> Result<HmacSha256, TokenError> {
    if secret.is_empty() {
        return Err(TokenError::MissingSecret);
    }
    HmacSha256::new_from_slice(secret.as_bytes()).map_err(|_| TokenError::MissingSecret)
}

/// Encodes and signs `claims` as an HS256 JWT.
pub fn sign_token(claims: &JwtClaims, secret: &str) -> Result<String, TokenError> {
    let mut mac = mac_for(secret)?;

    let header = JwtHeader {
        alg: ALGORITHM.to_string(),
        typ: "JWT".to_string(),
    };
    let header_json = serde_json::to_vec(&header).map_err(|_| TokenError::Malformed("Invalid header"))?;
    let claims_json = serde_json::to_vec(claims).map_err(|_| TokenError::Malformed("Invalid claims"))?;

    let signing_input = format!(
        "{}.{}",
        URL_SAFE_NO_PAD.encode(header_json),
        URL_SAFE_NO_PAD.encode(claims_json)
    );
    mac.update(signing_input.as_bytes());
    let signature = URL_SAFE_NO_PAD.encode(mac.finalize().into_bytes());

    Ok(format!("{}.{}", signing_input, signature))
}

/// Verifies signature and expiry against the current time.
pub fn decode_token(token: &str, secret: &str) -> Result<JwtClaims, TokenError> {
    decode_token_at(token, secret, Utc::now().timestamp())
}

/// Verifies signature first, then structure, then `now < exp`.
pub fn decode_token_at(token: &str, secret: &str, now: i64) -> Result<JwtClaims, TokenError> {
    let mut mac = mac_for(secret)?;

    // Split token into parts
    let parts: Vec<&str> = token.split('.').collect();
    if parts.len() != 3 {
        return Err(TokenError::Malformed("Invalid token format"));
    }

    let (header_b64, claims_b64, signature_b64) = (parts[0], parts[1], parts[2]);

    let signature = URL_SAFE_NO_PAD.decode(signature_b64).map_err(|e| {
        debug!("Failed to decode signature: {}", e);
        TokenError::Malformed("Invalid signature encoding")
    })?;

    mac.update(format!("{}.{}", header_b64, claims_b64).as_bytes());
    if mac.verify_slice(&signature).is_err() {
        debug!("Token signature verification failed");
        return Err(TokenError::Malformed("Invalid token signature"));
    }

    let header: JwtHeader = URL_SAFE_NO_PAD
        .decode(header_b64)
        .ok()
        .and_then(|bytes| serde_json::from_slice(&bytes).ok())
        .ok_or(TokenError::Malformed("Invalid header encoding"))?;
    if header.alg != ALGORITHM {
        return Err(TokenError::Malformed("Unsupported token algorithm"));
    }

    let claims_bytes = URL_SAFE_NO_PAD
        .decode(claims_b64)
        .map_err(|_| TokenError::Malformed("Invalid claims encoding"))?;
    let claims: JwtClaims = serde_json::from_slice(&claims_bytes).map_err(|e| {
        debug!("Failed to parse claims: {}", e);
        TokenError::Malformed("Invalid claims format")
    })?;

    if now >= claims.exp {
        debug!("Token expired at {} (now: {})", claims.exp, now);
        return Err(TokenError::Expired);
    }

    Ok(claims)
}

#[cfg(test)]
mod tests {
    use super::*;
    use shared_models::auth::Role;

    const SECRET: &str = "unit-test-secret";

    fn claims(exp: i64) -> JwtClaims {
        JwtClaims {
            sub: 7,
            email: "patient@clinic.test".to_string(),
            role: Role::Patient,
            iat: exp - 86_400,
            exp,
            jti: "abc".to_string(),
        }
    }

    #[test]
    fn signed_token_decodes_before_expiry() {
        let token = sign_token(&claims(2_000), SECRET).unwrap();
        let decoded = decode_token_at(&token, SECRET, 1_999).unwrap();
        assert_eq!(decoded, claims(2_000));
    }

    #[test]
    fn expiry_is_exclusive() {
        let token = sign_token(&claims(2_000), SECRET).unwrap();
        assert_eq!(decode_token_at(&token, SECRET, 2_000), Err(TokenError::Expired));
    }

    #[test]
    fn wrong_secret_is_malformed() {
        let token = sign_token(&claims(2_000), SECRET).unwrap();
        assert_eq!(
            decode_token_at(&token, "other-secret", 1_000),
            Err(TokenError::Malformed("Invalid token signature"))
        );
    }

    #[test]
    fn tampered_claims_fail_signature() {
        let token = sign_token(&claims(2_000), SECRET).unwrap();
        let mut parts: Vec<String> = token.split('.').map(str::to_string).collect();
        let mut forged = claims(2_000);
        forged.role = Role::Admin;
        parts[1] = URL_SAFE_NO_PAD.encode(serde_json::to_vec(&forged).unwrap());

        assert!(matches!(
            decode_token_at(&parts.join("."), SECRET, 1_000),
            Err(TokenError::Malformed(_))
        ));
    }

    #[test]
    fn structural_garbage_is_malformed() {
        assert_eq!(
            decode_token_at("not-a-token", SECRET, 0),
            Err(TokenError::Malformed("Invalid token format"))
        );
        assert!(matches!(decode_token_at("a.b.!!", SECRET, 0), Err(TokenError::Malformed(_))));
    }

    #[test]
    fn empty_secret_cannot_sign() {
        assert_eq!(sign_token(&claims(2_000), ""), Err(TokenError::MissingSecret));
    }
}
