//! SMT account-state validator — Sparse Merkle Tree proof engine core.
//! Version: 0.1.0
//!
//! Physics engine for an on-chain account-state validator. No networking,
//! no host I/O, no async, no threading. The crate computes and checks
//! Sparse Merkle Tree roots against a compressed multi-leaf proof; it does
//! not perform any syscalls, does not parse transaction structure beyond
//! the witness content byte layout, and does not ship a VM.
//!
//! INVARIANTS:
//! 1. No dynamic allocation in the core (bits, change set, proof
//!    interpreter, hasher). Buffers are caller-owned slices or fixed-size
//!    arrays.
//! 2. Keys and values are always exactly 32 bytes.
//! 3. The SMT key order compares byte 31 down to byte 0 (see `bits`) —
//!    never lexicographic byte-0-first order.
//! 4. Feature flags that alter validation semantics are forbidden; there
//!    are no features on this crate.

pub mod bits;
pub mod change_set;
pub mod hasher;
pub mod proof;
pub mod validator;
pub mod vm;
pub mod witness;

/// Number of bytes in a key.
pub const KEY_BYTES: usize = 32;
/// Number of bytes in a value.
pub const VALUE_BYTES: usize = 32;

/// A 32-byte key identifying a leaf.
pub type Key = [u8; KEY_BYTES];
/// A 32-byte value stored at a leaf.
pub type Value = [u8; VALUE_BYTES];
/// A 32-byte Blake2b digest.
pub type Digest = [u8; 32];

/// The canonical error type for all validator failures.
///
/// Flat and data-free except `VmAborted`, matching the error kinds of
/// spec §7: every error is fatal at the point it is detected — there is
/// no recovery path inside the core.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CsalError {
    /// Malformed opcode, truncated operand, wrong leaf count at
    /// termination, or digest mismatch during `verify`.
    InvalidProof,
    /// Stack underflow, overflow, or non-singleton at termination.
    InvalidStack,
    /// A MERGE opcode's two operands fail the bit-flip sibling relation.
    InvalidSibling,
    /// A change-set insert of a new key was attempted past capacity.
    InsufficientCapacity,
    /// A change-set fetch found no entry for the given key.
    NotFound,
    /// Malformed witness content or cell data.
    InvalidData,
    /// Reserved script-args flag bits were set.
    UnsupportedFlags,
    /// The read-set or write-set exceeded the 1024-entry ceiling.
    TooManyChanges,
    /// The recomputed root did not match the claimed output root.
    InvalidRootHash,
    /// The VM returned a non-zero status; the validator aborts with it.
    VmAborted(i32),
}
