// crates/gamelog-core/tests/proptest_signature.rs
// ============================================================================
// Module: Signature Property Tests
// Description: Property-based tests for HMAC signature verification.
// Purpose: Ensure any single-byte change to body, signature, or secret fails.
// Dependencies: gamelog-core, proptest
// ============================================================================

//! ## Overview
//! Verification succeeds exactly for the hex HMAC-SHA256 of the body under the
//! secret; flipping any one byte of the inputs must flip the outcome.

#![allow(
    clippy::panic,
    clippy::unwrap_used,
    clippy::expect_used,
    reason = "Test-only assertions and helpers are permitted."
)]

use gamelog_core::GameName;
use gamelog_core::sign_body;
use gamelog_core::verify_signature;
use proptest::prelude::*;

fn game() -> GameName {
    GameName::parse("prop").unwrap()
}

/// Returns a different lowercase hex digit.
const fn other_hex_digit(digit: u8) -> u8 {
    if digit == b'0' { b'1' } else { b'0' }
}

proptest! {
    #[test]
    fn genuine_signature_verifies(
        body in proptest::collection::vec(any::<u8>(), 0 .. 256),
        secret in "[ -~]{0,48}",
    ) {
        let signature = sign_body(&body, &secret).unwrap();
        prop_assert!(verify_signature(&game(), &body, Some(&signature), &secret).is_ok());
    }

    #[test]
    fn body_mutation_fails(
        body in proptest::collection::vec(any::<u8>(), 1 .. 256),
        secret in "[ -~]{1,48}",
        index in any::<prop::sample::Index>(),
        flip in 1u8 ..= 255,
    ) {
        let signature = sign_body(&body, &secret).unwrap();
        let mut mutated = body.clone();
        let at = index.index(mutated.len());
        mutated[at] ^= flip;
        prop_assert!(verify_signature(&game(), &mutated, Some(&signature), &secret).is_err());
    }

    #[test]
    fn signature_mutation_fails(
        body in proptest::collection::vec(any::<u8>(), 0 .. 256),
        secret in "[ -~]{1,48}",
        index in any::<prop::sample::Index>(),
    ) {
        let signature = sign_body(&body, &secret).unwrap();
        let mut mutated = signature.into_bytes();
        let at = index.index(mutated.len());
        mutated[at] = other_hex_digit(mutated[at]);
        let mutated = String::from_utf8(mutated).unwrap();
        prop_assert!(verify_signature(&game(), &body, Some(&mutated), &secret).is_err());
    }

    #[test]
    fn secret_mutation_fails(
        body in proptest::collection::vec(any::<u8>(), 0 .. 256),
        secret in "[a-z]{1,48}",
        index in any::<prop::sample::Index>(),
    ) {
        let signature = sign_body(&body, &secret).unwrap();
        let mut mutated = secret.into_bytes();
        let at = index.index(mutated.len());
        mutated[at] = if mutated[at] == b'a' { b'b' } else { b'a' };
        let mutated = String::from_utf8(mutated).unwrap();
        prop_assert!(verify_signature(&game(), &body, Some(&signature), &mutated).is_err());
    }
}
