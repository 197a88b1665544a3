//! The validator harness: wires host-loaded bytes through the change
//! set, proof interpreter, and pluggable VM.
//!
//! This module does not perform any host I/O — no cell loads, no
//! witness container unmolding, no script-context syscalls. It takes
//! already-resolved inputs (the caller owns loading cell data and
//! locating the witness content bytes) and runs the seven-step
//! validation contract in `validate_account_transition`.

use crate::change_set::{ChangeSet, Entry};
use crate::proof;
use crate::vm::ExecuteVm;
use crate::witness::{self, Reader, MAX_CHANGES};
use crate::{CsalError, Digest};

/// Run one account-state transition check.
///
/// - `script_args`: the 8-byte-or-longer script args; only the leading
///   flag word is consulted, and only to reject reserved bits.
/// - `input_root`: the input cell's committed root, already resolved to
///   all-zero by the caller if the cell did not previously exist.
/// - `output_root`: the output cell's committed root, or `None` if the
///   output cell does not exist (a destruction, valid only when
///   `witness_content` is empty).
/// - `witness_content`: the already-located witness content bytes (lock
///   or type field, as the caller's flag/transaction-structure handling
///   decided).
/// - `vm`: the pluggable execution contract.
pub fn validate_account_transition(
    script_args: &[u8],
    input_root: Digest,
    output_root: Option<Digest>,
    witness_content: &[u8],
    vm: &impl ExecuteVm,
) -> Result<(), CsalError> {
    witness::parse_flags(script_args)?;

    let output_root = match output_root {
        Some(root) => root,
        None if witness_content.is_empty() => return Ok(()),
        None => return Err(CsalError::InvalidData),
    };

    let mut reader = Reader::new(witness_content);
    let head = witness::parse_head(&mut reader)?;

    let mut read_buffer = [Entry {
        key: [0u8; 32],
        value: [0u8; 32],
        order: 0,
    }; MAX_CHANGES];
    let mut reads = ChangeSet::new(&mut read_buffer);
    for entry in head.reads.as_slice() {
        reads.insert(entry.key, entry.value)?;
    }
    reads.organize();
    proof::verify(&input_root, &reads, head.read_proof)?;

    let mut write_buffer = [Entry {
        key: [0u8; 32],
        value: [0u8; 32],
        order: 0,
    }; MAX_CHANGES];
    let mut writes = ChangeSet::new(&mut write_buffer);
    vm.execute(head.source, &mut reads, &mut writes)
        .map_err(CsalError::VmAborted)?;
    writes.organize();

    let tail = witness::parse_tail(&mut reader, writes.len())?;

    let mut old_value_buffer = [Entry {
        key: [0u8; 32],
        value: [0u8; 32],
        order: 0,
    }; MAX_CHANGES];
    let mut old_values = ChangeSet::new(&mut old_value_buffer);
    for (entry, old_value) in writes
        .as_slice()
        .iter()
        .zip(tail.old_values.iter().take(writes.len()))
    {
        old_values.insert(entry.key, *old_value)?;
    }
    proof::verify(&input_root, &old_values, tail.write_proof)?;

    let candidate_root = proof::update_root(&writes, tail.write_proof)?;
    if candidate_root != output_root {
        return Err(CsalError::InvalidRootHash);
    }
    Ok(())
}
