//! Line fingerprinting: a 64-bit MurmurHash over either the whole line or
//! a user-selected set of key columns.

use anyhow::{bail, Context, Result};
use memchr::memmem;

/// Which bytes of an input line feed the fingerprint.
///
/// Column indices are 1-based and kept in user order. Any index ≤ 0 (the
/// default key is `-1`) disables column selection, so the whole line is
/// hashed as-is.
#[derive(Debug, Clone)]
pub struct KeySpec {
    columns: Vec<i64>,
    separator: Vec<u8>,
    min: i64,
    max: i64,
}

impl KeySpec {
    /// Parse a comma-separated list of 1-based column indices plus the field
    /// separator. A non-integer column or an empty separator is fatal.
    pub fn parse(key: &str, separator: &str) -> Result<Self> {
        if separator.is_empty() {
            bail!("field separator must not be empty");
        }
        let columns = key
            .split(',')
            .map(|tok| {
                tok.trim()
                    .parse::<i64>()
                    .with_context(|| format!("invalid column index in --key: {tok:?}"))
            })
            .collect::<Result<Vec<i64>>>()?;
        // `split` yields at least one token, so min/max exist.
        let min = columns.iter().copied().min().unwrap_or(0);
        let max = columns.iter().copied().max().unwrap_or(0);
        Ok(Self {
            columns,
            separator: separator.as_bytes().to_vec(),
            min,
            max,
        })
    }

    /// True when column selection is active (every index is positive).
    pub fn uses_columns(&self) -> bool {
        self.min > 0
    }

    /// Fingerprint one line (without its trailing newline).
    ///
    /// `scratch` holds the column concatenation and is reused across calls
    /// to avoid a per-line allocation.
    pub fn fingerprint(&self, line: &[u8], scratch: &mut Vec<u8>) -> u64 {
        if self.min <= 0 {
            return hash(line);
        }
        let fields = split_fields(line, &self.separator);
        // A line with fewer fields than the highest requested column falls
        // back to whole-line hashing. `max` is 1-based, so a field count
        // equal to `max` means the max-indexed column exists.
        if (fields.len() as i64) < self.max {
            return hash(line);
        }
        scratch.clear();
        for &col in &self.columns {
            scratch.extend_from_slice(fields[(col - 1) as usize]);
        }
        hash(scratch)
    }
}

/// Split on every separator occurrence, left to right, keeping zero-length
/// fields. Text after the last separator is the final field, so a line with
/// no separator is a single field.
fn split_fields<'a>(line: &'a [u8], separator: &[u8]) -> Vec<&'a [u8]> {
    let mut fields = Vec::new();
    let mut start = 0;
    for pos in memmem::find_iter(line, separator) {
        fields.push(&line[start..pos]);
        start = pos + separator.len();
    }
    fields.push(&line[start..]);
    fields
}

/// MurmurHash64A with seed 0, matching the reference implementation so
/// fingerprints are reproducible across runs and machines.
fn hash(data: &[u8]) -> u64 {
    murmurhash64::murmur_hash64a(data, 0)
}
