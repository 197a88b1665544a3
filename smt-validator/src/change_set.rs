//! `ChangeSet` — caller-owned (key, value) buffer with stable
//! de-duplication and canonical SMT-order sorting.
//!
//! The VM writes entries in execution order and may overwrite the same
//! key multiple times; the proof interpreter requires a duplicate-free,
//! SMT-ordered batch. `organize` bridges the two worlds while preserving
//! last-write-wins semantics — see `Entry::order` below.
//!
//! No heap allocation: a `ChangeSet` borrows its storage from the caller
//! and never grows beyond the borrowed slice's length.

use crate::bits::smt_key_cmp;
use crate::{CsalError, Key, Value};

/// One (key, value) pair plus the position it was inserted at.
///
/// `order` exists solely to make de-duplication deterministic: Rust's
/// `sort_by` is already stable, but `order` is also the tiebreaker
/// `organize` uses to decide which of several raw entries for the same
/// key survives, so it is retained explicitly rather than relied on
/// implicitly via slice position.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Entry {
    pub key: Key,
    pub value: Value,
    pub order: u32,
}

/// A buffer of entries, borrowed from the caller, in either *raw*
/// (insertion order, possibly duplicate keys) or *organized* (sorted,
/// duplicate-free) state.
pub struct ChangeSet<'a> {
    entries: &'a mut [Entry],
    length: usize,
}

impl<'a> ChangeSet<'a> {
    /// Attach external storage. Length starts at zero; `buffer.len()` is
    /// the capacity and is never exceeded.
    pub fn new(buffer: &'a mut [Entry]) -> Self {
        ChangeSet {
            entries: buffer,
            length: 0,
        }
    }

    /// Total capacity of the backing buffer.
    pub fn capacity(&self) -> usize {
        self.entries.len()
    }

    /// Number of live entries.
    pub fn len(&self) -> usize {
        self.length
    }

    pub fn is_empty(&self) -> bool {
        self.length == 0
    }

    /// The live entries, in whatever order they currently occupy
    /// (insertion order before `organize`, SMT order after).
    pub fn as_slice(&self) -> &[Entry] {
        &self.entries[..self.length]
    }

    /// Insert `(key, value)`.
    ///
    /// If there is spare capacity, appends a new entry with
    /// `order = length`. Otherwise scans from the tail for an entry with
    /// a matching key; if found, overwrites its value (`order` is left
    /// unchanged) and succeeds. If no matching key is found, capacity is
    /// truly exhausted and this fails with `InsufficientCapacity`.
    pub fn insert(&mut self, key: Key, value: Value) -> Result<(), CsalError> {
        if self.length < self.entries.len() {
            self.entries[self.length] = Entry {
                key,
                value,
                order: self.length as u32,
            };
            self.length += 1;
            return Ok(());
        }
        for entry in self.entries[..self.length].iter_mut().rev() {
            if entry.key == key {
                entry.value = value;
                return Ok(());
            }
        }
        Err(CsalError::InsufficientCapacity)
    }

    /// Fetch the value for `key`, scanning from the tail so the latest
    /// insert dominates (relevant before `organize` collapses duplicates).
    pub fn fetch(&self, key: &Key) -> Result<Value, CsalError> {
        self.entries[..self.length]
            .iter()
            .rev()
            .find(|entry| &entry.key == key)
            .map(|entry| entry.value)
            .ok_or(CsalError::NotFound)
    }

    /// Normalize into a duplicate-free, SMT-ordered batch.
    ///
    /// 1. Reassign `order := position` for every live entry (this is what
    ///    makes `organize` idempotent: calling it twice reassigns the same
    ///    orders it just assigned).
    /// 2. Sort by SMT key order, breaking ties by ascending `order`.
    /// 3. Collapse runs of equal keys, keeping the LAST entry of each run
    ///    (the entry with the largest `order`, i.e. the most recent write).
    pub fn organize(&mut self) {
        for (i, entry) in self.entries[..self.length].iter_mut().enumerate() {
            entry.order = i as u32;
        }
        self.entries[..self.length].sort_by(|a, b| {
            smt_key_cmp(&a.key, &b.key).then_with(|| a.order.cmp(&b.order))
        });

        let mut write = 0usize;
        let mut read = 0usize;
        while read < self.length {
            let run_start = read;
            let mut run_end = read + 1;
            while run_end < self.length && self.entries[run_end].key == self.entries[run_start].key
            {
                run_end += 1;
            }
            // The run is sorted by ascending order, so the last element
            // of the run is the surviving (last-write-wins) entry.
            self.entries[write] = self.entries[run_end - 1];
            write += 1;
            read = run_end;
        }
        self.length = write;
    }
}
