// crates/gamelog-core/src/runtime/signature.rs
// ============================================================================
// Module: Request Signature Verifier
// Description: HMAC-SHA256 signing and constant-time verification of bodies.
// Purpose: Authenticate score writes against a per-game shared secret.
// Dependencies: hex, hmac, sha2, subtle
// ============================================================================

//! ## Overview
//! A write is authentic when the `Authorization: Bearer <hex>` header carries
//! the lowercase or uppercase hex encoding of HMAC-SHA256 over the exact raw
//! request body, keyed by the game's secret. The comparison runs over decoded
//! bytes in constant time. Every failure mode collapses into the single
//! [`SignatureError::Invalid`] so callers cannot distinguish causes.
//! Security posture: headers and bodies are untrusted; no I/O is performed.

// ============================================================================
// SECTION: Imports
// ============================================================================

use hmac::Hmac;
use hmac::Mac;
use sha2::Sha256;
use subtle::ConstantTimeEq;
use thiserror::Error;

use crate::core::GameName;

// ============================================================================
// SECTION: Constants
// ============================================================================

/// Maximum accepted authorization header size in bytes.
pub const MAX_AUTH_HEADER_BYTES: usize = 8 * 1024;

/// HMAC-SHA256 keyed hasher.
type HmacSha256 = Hmac<Sha256>;

// ============================================================================
// SECTION: Errors
// ============================================================================

/// Signature verification failure.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum SignatureError {
    /// Signature is missing, malformed, or does not match.
    #[error("invalid signature")]
    Invalid,
}

// ============================================================================
// SECTION: Signing
// ============================================================================

/// Computes the lowercase hex HMAC-SHA256 signature of `body` under `secret`.
///
/// # Errors
///
/// Returns [`SignatureError::Invalid`] when the key cannot initialize the MAC.
pub fn sign_body(body: &[u8], secret: &str) -> Result<String, SignatureError> {
    Ok(hex::encode(compute_mac(body, secret)?))
}

/// Verifies a presented signature for a game's request body.
///
/// `presented` may be a full `Bearer <hex>` header value or the bare hex
/// string. The game name does not influence the outcome.
///
/// # Errors
///
/// Returns [`SignatureError::Invalid`] when the signature is missing, too
/// large, not hex, of the wrong length, or does not match.
pub fn verify_signature(
    _game_name: &GameName,
    body: &[u8],
    presented: Option<&str>,
    secret: &str,
) -> Result<(), SignatureError> {
    let header = presented.ok_or(SignatureError::Invalid)?;
    let token = parse_bearer_token(header)?;
    let provided = hex::decode(token).map_err(|_| SignatureError::Invalid)?;
    let expected = compute_mac(body, secret)?;
    if expected.len() != provided.len() {
        return Err(SignatureError::Invalid);
    }
    if bool::from(expected.as_slice().ct_eq(provided.as_slice())) {
        Ok(())
    } else {
        Err(SignatureError::Invalid)
    }
}

/// Extracts the signature token from an authorization header value.
///
/// A leading `Bearer` scheme (case-insensitive) is stripped; a value without a
/// scheme is returned trimmed.
///
/// # Errors
///
/// Returns [`SignatureError::Invalid`] for oversized or empty values.
pub fn parse_bearer_token(header: &str) -> Result<&str, SignatureError> {
    if header.len() > MAX_AUTH_HEADER_BYTES {
        return Err(SignatureError::Invalid);
    }
    let trimmed = header.trim();
    let token = match trimmed.split_once(' ') {
        Some((scheme, rest)) if scheme.eq_ignore_ascii_case("bearer") => rest.trim(),
        Some(_) => return Err(SignatureError::Invalid),
        None => trimmed,
    };
    if token.is_empty() {
        return Err(SignatureError::Invalid);
    }
    Ok(token)
}

/// Computes raw HMAC-SHA256 bytes.
fn compute_mac(body: &[u8], secret: &str) -> Result<Vec<u8>, SignatureError> {
    let mut mac =
        HmacSha256::new_from_slice(secret.as_bytes()).map_err(|_| SignatureError::Invalid)?;
    mac.update(body);
    Ok(mac.finalize().into_bytes().to_vec())
}

// ============================================================================
// SECTION: Tests
// ============================================================================
