//! Blake2b-256 binding for the SMT proof engine.
//!
//! CONSTITUTIONAL RULE: Blake2b with a 32-byte output, empty key, and the
//! personalization string `ckb-default-hash` — the standard CKB hash
//! personalization, carried here because the reference validator links
//! against CKB's `blake2b.h` rather than a bare Blake2b. Inputs are
//! concatenated in the specified order with no framing beyond that: no
//! length prefixes, no extra domain-separation bytes. This matches
//! `original_source/c/validator.h`'s `blake2b_init(&ctx, 32)` /
//! `blake2b_update` / `blake2b_final` sequence, where `blake2b_init`
//! resolves to the personalized CKB variant. No further separation is
//! layered on top of the personalization — the SMT proof grammar itself
//! (which opcode touched which stack slot) is what keeps leaf and
//! internal hashing from colliding.
//!
//! The all-zero 32-byte digest is the canonical empty-subtree digest at
//! every height. It is never produced by this hasher — proofs simply
//! never need to hash anything to arrive at it.

use crate::{Digest, Key, Value};

const PERSONAL: &[u8; 16] = b"ckb-default-hash";

fn params() -> blake2b_simd::Params {
    let mut p = blake2b_simd::Params::new();
    p.hash_length(32).personal(PERSONAL);
    p
}

/// Hash a leaf: Blake2b-256(key ‖ value).
pub fn hash_leaf(key: &Key, value: &Value) -> Digest {
    let mut state = params().to_state();
    state.update(key);
    state.update(value);
    finalize(state)
}

/// Hash two 32-byte digests in the given order: Blake2b-256(left ‖ right).
///
/// Used by both PROOF (leaf digest combined with a witness sibling) and
/// MERGE (two stack digests combined with each other) — the proof
/// interpreter decides the order, this function just hashes what it is
/// given.
pub fn hash_pair(left: &Digest, right: &Digest) -> Digest {
    let mut state = params().to_state();
    state.update(left);
    state.update(right);
    finalize(state)
}

fn finalize(state: blake2b_simd::State) -> Digest {
    let mut out = [0u8; 32];
    out.copy_from_slice(state.finalize().as_bytes());
    out
}
