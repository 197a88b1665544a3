//! Wire-format parsing for witness content and the script-args flag word.
//!
//! Byte layout (all multi-byte integers little endian):
//!
//! ```text
//! u32          source_len
//! byte[SL]     source
//! u32          reads_count        (<= MAX_CHANGES)
//! [key32 value32] * reads_count
//! u32          read_proof_len
//! byte[RPL]    read_proof
//! [value32]    * writes_count     (old values, aligned to organized writes)
//! u32          write_proof_len
//! byte[WPL]    write_proof
//! ```
//!
//! `writes_count` is not itself encoded: it equals the number of entries
//! the VM produced, discovered only after `execute_vm` runs. Parsing the
//! witness is therefore split across `parse_head` (everything up to and
//! including `read_proof`) and `read_old_values` (the remainder, called
//! once the organized write count is known).

use crate::{CsalError, Key, Value};

/// Read-set and write-set entries are bounded to guard the fixed-size
/// change-set buffers the harness allocates.
pub const MAX_CHANGES: usize = 1024;

/// Bit 0 of the script-args flag word: 0 = witness lives in the lock
/// field, 1 = witness lives in the type field. All other bits reserved.
pub const FLAG_WITNESS_LOCATION: u64 = 0x1;
const RESERVED_FLAGS_MASK: u64 = !FLAG_WITNESS_LOCATION;

/// `type_slot` tells the *caller* which cell field to load the witness
/// content from before calling `validate_account_transition` — this
/// crate does no cell I/O itself, so it only validates the flag word and
/// hands the bit back rather than acting on it.
pub struct WitnessFlags {
    pub type_slot: bool,
}

/// Parse the 8-byte little-endian flag word from script args.
pub fn parse_flags(args: &[u8]) -> Result<WitnessFlags, CsalError> {
    if args.len() < 8 {
        return Err(CsalError::InvalidData);
    }
    let mut raw = [0u8; 8];
    raw.copy_from_slice(&args[..8]);
    let flags = u64::from_le_bytes(raw);
    if flags & RESERVED_FLAGS_MASK != 0 {
        return Err(CsalError::UnsupportedFlags);
    }
    Ok(WitnessFlags {
        type_slot: flags & FLAG_WITNESS_LOCATION != 0,
    })
}

/// A byte cursor over witness content, mirroring the reference `reader_t`.
pub struct Reader<'a> {
    data: &'a [u8],
    offset: usize,
}

impl<'a> Reader<'a> {
    pub fn new(data: &'a [u8]) -> Self {
        Reader { data, offset: 0 }
    }

    fn take(&mut self, len: usize) -> Result<&'a [u8], CsalError> {
        let end = self.offset.checked_add(len).ok_or(CsalError::InvalidData)?;
        let slice = self.data.get(self.offset..end).ok_or(CsalError::InvalidData)?;
        self.offset = end;
        Ok(slice)
    }

    fn take_u32(&mut self) -> Result<u32, CsalError> {
        let bytes = self.take(4)?;
        let mut raw = [0u8; 4];
        raw.copy_from_slice(bytes);
        Ok(u32::from_le_bytes(raw))
    }

    fn take_key(&mut self) -> Result<Key, CsalError> {
        let bytes = self.take(32)?;
        let mut out = [0u8; 32];
        out.copy_from_slice(bytes);
        Ok(out)
    }

    fn take_value(&mut self) -> Result<Value, CsalError> {
        self.take_key()
    }
}

/// One (key, value) read entry as laid out in the witness.
pub struct ReadEntry {
    pub key: Key,
    pub value: Value,
}

/// Parsed head of the witness: VM source, the read-set, and the proof
/// that verifies it against the input root.
pub struct WitnessHead<'a> {
    pub source: &'a [u8],
    pub reads: ReadsBuf,
    pub read_proof: &'a [u8],
}

/// Fixed-capacity storage for parsed read entries, avoiding a heap
/// allocation for a witness-supplied count.
pub struct ReadsBuf {
    pub entries: [ReadEntry; MAX_CHANGES],
    pub len: usize,
}

impl ReadsBuf {
    pub fn as_slice(&self) -> &[ReadEntry] {
        &self.entries[..self.len]
    }
}

fn empty_reads_buf() -> ReadsBuf {
    ReadsBuf {
        entries: core::array::from_fn(|_| ReadEntry {
            key: [0u8; 32],
            value: [0u8; 32],
        }),
        len: 0,
    }
}

/// Parse everything up to and including the read proof.
pub fn parse_head<'a>(reader: &mut Reader<'a>) -> Result<WitnessHead<'a>, CsalError> {
    let source_len = reader.take_u32()? as usize;
    let source = reader.take(source_len)?;

    let reads_count = reader.take_u32()? as usize;
    if reads_count > MAX_CHANGES {
        return Err(CsalError::TooManyChanges);
    }
    let mut reads = empty_reads_buf();
    for _ in 0..reads_count {
        let key = reader.take_key()?;
        let value = reader.take_value()?;
        reads.entries[reads.len] = ReadEntry { key, value };
        reads.len += 1;
    }

    let read_proof_len = reader.take_u32()? as usize;
    let read_proof = reader.take(read_proof_len)?;

    Ok(WitnessHead {
        source,
        reads,
        read_proof,
    })
}

/// Old-value entries for the organized write-set, followed by the write
/// proof. `writes_count` MUST equal the organized write-set's length —
/// the witness author is expected to align `write_old_values` to that
/// order.
pub struct WitnessTail<'a> {
    pub old_values: [Value; MAX_CHANGES],
    pub write_proof: &'a [u8],
}

pub fn parse_tail<'a>(
    reader: &mut Reader<'a>,
    writes_count: usize,
) -> Result<WitnessTail<'a>, CsalError> {
    if writes_count > MAX_CHANGES {
        return Err(CsalError::TooManyChanges);
    }
    let mut old_values = [[0u8; 32]; MAX_CHANGES];
    for slot in old_values.iter_mut().take(writes_count) {
        *slot = reader.take_value()?;
    }
    let write_proof_len = reader.take_u32()? as usize;
    let write_proof = reader.take(write_proof_len)?;
    Ok(WitnessTail {
        old_values,
        write_proof,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn le32(n: u32) -> [u8; 4] {
        n.to_le_bytes()
    }

    #[test]
    fn parse_flags_rejects_reserved_bits() {
        let args = (1u64 << 3).to_le_bytes();
        assert_eq!(parse_flags(&args), Err(CsalError::UnsupportedFlags));
    }

    #[test]
    fn parse_flags_reads_witness_location_bit() {
        let args = 0u64.to_le_bytes();
        let flags = parse_flags(&args).unwrap();
        assert!(!flags.type_slot);

        let args = 1u64.to_le_bytes();
        let flags = parse_flags(&args).unwrap();
        assert!(flags.type_slot);
    }

    #[test]
    fn parse_flags_rejects_short_args() {
        let args = [0u8; 4];
        assert_eq!(parse_flags(&args), Err(CsalError::InvalidData));
    }

    #[test]
    fn parse_head_round_trips_empty_reads() {
        let mut content = Vec::new();
        content.extend_from_slice(&le32(0)); // source_len
        content.extend_from_slice(&le32(0)); // reads_count
        content.extend_from_slice(&le32(0)); // read_proof_len
        let mut reader = Reader::new(&content);
        let head = parse_head(&mut reader).unwrap();
        assert_eq!(head.source.len(), 0);
        assert_eq!(head.reads.len, 0);
        assert_eq!(head.read_proof.len(), 0);
    }

    #[test]
    fn parse_head_reads_source_and_entries() {
        let mut content = Vec::new();
        content.extend_from_slice(&le32(3));
        content.extend_from_slice(&[1u8, 2, 3]);
        content.extend_from_slice(&le32(1));
        content.extend_from_slice(&[9u8; 32]);
        content.extend_from_slice(&[8u8; 32]);
        content.extend_from_slice(&le32(2));
        content.extend_from_slice(&[0xaa, 0xbb]);
        let mut reader = Reader::new(&content);
        let head = parse_head(&mut reader).unwrap();
        assert_eq!(head.source, &[1u8, 2, 3]);
        assert_eq!(head.reads.len, 1);
        assert_eq!(head.reads.as_slice()[0].key, [9u8; 32]);
        assert_eq!(head.reads.as_slice()[0].value, [8u8; 32]);
        assert_eq!(head.read_proof, &[0xaa, 0xbb]);
    }

    #[test]
    fn parse_head_rejects_reads_count_over_limit() {
        let mut content = Vec::new();
        content.extend_from_slice(&le32(0));
        content.extend_from_slice(&le32((MAX_CHANGES + 1) as u32));
        let mut reader = Reader::new(&content);
        assert_eq!(parse_head(&mut reader), Err(CsalError::TooManyChanges));
    }

    #[test]
    fn parse_head_rejects_truncated_content() {
        let content = le32(5).to_vec(); // claims 5 bytes of source, none present
        let mut reader = Reader::new(&content);
        assert_eq!(parse_head(&mut reader), Err(CsalError::InvalidData));
    }

    #[test]
    fn parse_tail_reads_old_values_then_proof() {
        let mut content = Vec::new();
        content.extend_from_slice(&[1u8; 32]);
        content.extend_from_slice(&[2u8; 32]);
        content.extend_from_slice(&le32(1));
        content.push(0x4c);
        let mut reader = Reader::new(&content);
        let tail = parse_tail(&mut reader, 2).unwrap();
        assert_eq!(tail.old_values[0], [1u8; 32]);
        assert_eq!(tail.old_values[1], [2u8; 32]);
        assert_eq!(tail.write_proof, &[0x4c]);
    }

    #[test]
    fn parse_tail_rejects_count_over_limit() {
        let content = Vec::new();
        let mut reader = Reader::new(&content);
        assert_eq!(
            parse_tail(&mut reader, MAX_CHANGES + 1),
            Err(CsalError::TooManyChanges)
        );
    }
}
