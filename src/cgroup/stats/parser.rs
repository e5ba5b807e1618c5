//! Generic parsing traits for cgroup stat files.
//!
//! - [`KeyValueStat`] parses `key value` per-line files such as `cpu.stat` and
//!   `memory.stat` by dispatching each known key to a setter.
//! - [`SingleLineStat`] parses one-line files such as `memory.current`.

use std::collections::{HashMap, HashSet};
use std::io::BufRead;

use super::StatParseError;

/// A `key value` per-line stat file.
///
/// Unknown keys are ignored. A known key appearing twice is an error, since
/// the kernel never repeats keys in these files.
pub trait KeyValueStat: Default
where
    Self: 'static,
{
    /// Known keys and the setter applying a parsed value to `Self`.
    fn field_handlers() -> &'static HashMap<&'static str, fn(&mut Self, u64)>;

    /// Parses all lines of `buf`.
    ///
    /// # Errors
    ///
    /// Returns an `io::Error` if reading fails, or a [`StatParseError`] wrapped in
    /// `io::Error` if a known key carries a non-numeric value or is repeated.
    fn from_reader<R: BufRead>(buf: &mut R) -> std::io::Result<Self> {
        let mut stat = Self::default();
        let handlers = Self::field_handlers();
        let mut seen_keys: HashSet<&'static str> = HashSet::with_capacity(handlers.len());

        let mut line = String::new();
        let mut lineno = 0;
        while buf.read_line(&mut line)? != 0 {
            lineno += 1;
            let mut parts = line.split_whitespace();
            if let (Some(key), Some(val)) = (parts.next(), parts.next()) {
                if let Some((k, handler)) = handlers.get_key_value(key) {
                    let parsed =
                        val.parse::<u64>()
                            .map_err(|source| StatParseError::InvalidKeyValue {
                                key: key.to_string(),
                                value: val.to_string(),
                                line: lineno,
                                source,
                            })?;
                    if !seen_keys.insert(k) {
                        return Err(StatParseError::DuplicateField {
                            field: key.to_string(),
                            line: lineno,
                        }
                        .into());
                    }
                    handler(&mut stat, parsed);
                }
            }
            line.clear();
        }

        Ok(stat)
    }
}

/// A single-line, single-value stat file.
pub trait SingleLineStat: Sized {
    fn from_reader<R: BufRead>(buf: &mut R) -> std::io::Result<Self>;
}

/// Reads the first line of `buf` as either a number or the keyword `max`.
///
/// Returns `Ok(None)` for `max`.
pub(super) fn read_u64_or_max<R: BufRead>(buf: &mut R) -> std::io::Result<Option<u64>> {
    let mut line = String::new();
    buf.read_line(&mut line)?;
    let value = line.trim();
    if value == "max" {
        return Ok(None);
    }
    value
        .parse::<u64>()
        .map(Some)
        .map_err(|source| {
            StatParseError::InvalidValue {
                value: value.to_string(),
                line: 1,
                source,
            }
            .into()
        })
}
