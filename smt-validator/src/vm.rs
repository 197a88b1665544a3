//! The pluggable execution contract. The validator harness is generic
//! over `ExecuteVm`; no concrete VM lives in this crate — integrators
//! supply one (a JS VM, a Forth-like VM, EVM, Move VM, or a minimal
//! test fixture).

use crate::change_set::ChangeSet;

/// Runs `source` against `existing_values` (the verified read-set) and
/// records every write into `changes` via `ChangeSet::insert`.
///
/// `existing_values` is mutable so a VM may cache its own writes there to
/// make later reads in the same execution observe them; the validator
/// never reads `existing_values` back once `execute` returns. Beyond
/// that, implementations MUST: substitute the all-zero value for any key
/// `fetch` reports `NotFound` for (a missing key is not itself an error —
/// it is the VM's definition of "unset"); append writes to `changes` in
/// execution order; halt with the same status an `insert` failure
/// returns. `Ok(())` means success; `Err(status)` with a non-zero status
/// aborts the validator, which reports it as `CsalError::VmAborted(status)`.
pub trait ExecuteVm {
    fn execute(
        &self,
        source: &[u8],
        existing_values: &mut ChangeSet,
        changes: &mut ChangeSet,
    ) -> Result<(), i32>;
}
