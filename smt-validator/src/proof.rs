//! The SMT proof interpreter: a stack machine that folds a compressed
//! proof and a sorted leaf batch into a single root digest.
//!
//! `update_root` and `verify` are the same algorithm; `verify` just
//! compares the recomputed root to a claimed one. Because the proof bytes
//! never encode leaf *values* — only sibling digests and heights — the
//! identical proof can verify a batch under its old values and, in a
//! second call, recompute the root under new values. That reuse is what
//! makes the double-invocation pattern in `validator` possible.

use crate::bits::{bit, parent_path, zero_low_bits};
use crate::change_set::ChangeSet;
use crate::hasher::{hash_leaf, hash_pair};
use crate::{CsalError, Digest, Key};

const STACK_SIZE: usize = 32;

const OP_PUSH_LEAF: u8 = 0x4C;
const OP_PROOF: u8 = 0x50;
const OP_MERGE: u8 = 0x48;

#[derive(Clone, Copy)]
struct StackItem {
    key: Key,
    digest: Digest,
}

struct Stack {
    items: [StackItem; STACK_SIZE],
    top: usize,
}

impl Stack {
    fn new() -> Self {
        Stack {
            items: [StackItem {
                key: [0u8; 32],
                digest: [0u8; 32],
            }; STACK_SIZE],
            top: 0,
        }
    }

    fn push(&mut self, item: StackItem) -> Result<(), CsalError> {
        if self.top >= STACK_SIZE {
            return Err(CsalError::InvalidStack);
        }
        self.items[self.top] = item;
        self.top += 1;
        Ok(())
    }

    fn top_mut(&mut self) -> Result<&mut StackItem, CsalError> {
        if self.top == 0 {
            return Err(CsalError::InvalidStack);
        }
        Ok(&mut self.items[self.top - 1])
    }

    /// Pop the top two items as `(below, above)` — `below` was pushed
    /// first and sits at `top - 2`.
    fn pop_pair(&mut self) -> Result<(StackItem, StackItem), CsalError> {
        if self.top < 2 {
            return Err(CsalError::InvalidStack);
        }
        let above = self.items[self.top - 1];
        let below = self.items[self.top - 2];
        self.top -= 2;
        Ok((below, above))
    }
}

struct Cursor<'a> {
    proof: &'a [u8],
    index: usize,
}

impl<'a> Cursor<'a> {
    fn new(proof: &'a [u8]) -> Self {
        Cursor { proof, index: 0 }
    }

    fn has_next(&self) -> bool {
        self.index < self.proof.len()
    }

    fn take_opcode(&mut self) -> u8 {
        let op = self.proof[self.index];
        self.index += 1;
        op
    }

    fn take_byte(&mut self) -> Result<u8, CsalError> {
        let byte = *self.proof.get(self.index).ok_or(CsalError::InvalidProof)?;
        self.index += 1;
        Ok(byte)
    }

    fn take_digest(&mut self) -> Result<Digest, CsalError> {
        let end = self.index + 32;
        let slice = self
            .proof
            .get(self.index..end)
            .ok_or(CsalError::InvalidProof)?;
        self.index = end;
        let mut out = [0u8; 32];
        out.copy_from_slice(slice);
        Ok(out)
    }
}

/// Recompute the root obtained by folding `proof` over `batch` (an
/// organized change set) — this is the shared engine behind both
/// `update_root` and `verify`.
pub fn update_root(batch: &ChangeSet, proof: &[u8]) -> Result<Digest, CsalError> {
    let entries = batch.as_slice();
    if entries.is_empty() && proof.is_empty() {
        return Ok([0u8; 32]);
    }
    let mut cursor = Cursor::new(proof);
    let mut stack = Stack::new();
    let mut leaf_cursor = 0usize;

    while cursor.has_next() {
        match cursor.take_opcode() {
            OP_PUSH_LEAF => {
                let entry = entries.get(leaf_cursor).ok_or(CsalError::InvalidProof)?;
                let digest = hash_leaf(&entry.key, &entry.value);
                stack.push(StackItem {
                    key: entry.key,
                    digest,
                })?;
                leaf_cursor += 1;
            }
            OP_PROOF => {
                let height = cursor.take_byte()?;
                let sibling = cursor.take_digest()?;
                let item = stack.top_mut()?;
                item.digest = if bit(&item.key, height as usize) {
                    hash_pair(&sibling, &item.digest)
                } else {
                    hash_pair(&item.digest, &sibling)
                };
                parent_path(&mut item.key, height);
            }
            OP_MERGE => {
                let height = cursor.take_byte()?;
                let (mut below, mut above) = stack.pop_pair()?;
                let a_set = bit(&below.key, height as usize);
                let b_set = bit(&above.key, height as usize);
                zero_low_bits(&mut below.key, height as usize);
                zero_low_bits(&mut above.key, height as usize);

                let mut sibling_key_a = below.key;
                if !a_set {
                    crate::bits::set_bit(&mut sibling_key_a, height as usize);
                }
                if sibling_key_a != above.key || a_set == b_set {
                    return Err(CsalError::InvalidSibling);
                }

                let digest = if a_set {
                    hash_pair(&above.digest, &below.digest)
                } else {
                    hash_pair(&below.digest, &above.digest)
                };
                stack.push(StackItem {
                    key: below.key,
                    digest,
                })?;
            }
            _ => return Err(CsalError::InvalidProof),
        }
    }

    if leaf_cursor != entries.len() {
        return Err(CsalError::InvalidProof);
    }
    if stack.top != 1 {
        return Err(CsalError::InvalidStack);
    }
    Ok(stack.items[0].digest)
}

/// Verify that folding `proof` over `batch` yields exactly `root`.
pub fn verify(root: &Digest, batch: &ChangeSet, proof: &[u8]) -> Result<(), CsalError> {
    let computed = update_root(batch, proof)?;
    if &computed != root {
        return Err(CsalError::InvalidProof);
    }
    Ok(())
}
