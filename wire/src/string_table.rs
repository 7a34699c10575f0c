//! String table model and the entry list codec.

use std::collections::VecDeque;

use bitstream::{log2, BitBuf, BitReader, BitWriter};

use crate::error::{WireError, WireResult};

/// Number of recent entries a substring reference can point at.
pub const STRING_HISTORY_LEN: usize = 32;

/// Width of the byte length prefix of variable sized user data.
pub const USER_DATA_LENGTH_BITS: usize = 14;

const SUBSTRING_INDEX_BITS: usize = 5;
const SUBSTRING_LENGTH_BITS: usize = 5;

/// One string table entry.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct StringTableEntry {
    pub text: Option<String>,
    pub extra_data: Option<BitBuf>,
}

impl StringTableEntry {
    #[must_use]
    pub fn new(text: impl Into<String>) -> Self {
        Self {
            text: Some(text.into()),
            extra_data: None,
        }
    }

    /// Attaches user data.
    #[must_use]
    pub fn with_extra_data(mut self, extra_data: BitBuf) -> Self {
        self.extra_data = Some(extra_data);
        self
    }
}

/// A named table of optional entries, addressed by position.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct StringTable {
    pub name: String,
    pub entries: Vec<Option<StringTableEntry>>,
    pub max_entries: u16,
    pub fixed_user_data_size: u16,
    pub fixed_user_data_size_bits: u8,
    pub compressed: bool,
}

impl StringTable {
    /// Creates an empty table.
    #[must_use]
    pub fn new(name: impl Into<String>, max_entries: u16) -> Self {
        Self {
            name: name.into(),
            max_entries,
            ..Self::default()
        }
    }

    /// Width of an absolute entry index.
    #[must_use]
    pub fn entry_bits(&self) -> usize {
        log2(u32::from(self.max_entries))
    }

    /// Width of the entry count field of a table packet.
    #[must_use]
    pub fn entry_count_bits(&self) -> usize {
        self.entry_bits() + 1
    }

    /// Returns `true` if user data has a fixed bit width.
    #[must_use]
    pub const fn has_fixed_user_data(&self) -> bool {
        self.fixed_user_data_size != 0 && self.fixed_user_data_size_bits != 0
    }

    /// Number of entries that are present.
    #[must_use]
    pub fn present_entries(&self) -> usize {
        self.entries.iter().flatten().count()
    }

    /// Returns the entry at `index`, if present.
    #[must_use]
    pub fn get(&self, index: usize) -> Option<&StringTableEntry> {
        self.entries.get(index).and_then(Option::as_ref)
    }

    /// Decodes `count` entries from `reader` into this table.
    ///
    /// Entries already present are updated in place: decoded text or user
    /// data replaces the old value, absent fields keep it.
    pub fn parse_entries(&mut self, reader: &mut BitReader<'_>, count: usize) -> WireResult<()> {
        let entry_bits = self.entry_bits();
        let mut last_index: isize = -1;
        let mut history: VecDeque<Option<Vec<u8>>> = VecDeque::with_capacity(STRING_HISTORY_LEN + 1);

        for _ in 0..count {
            let index = if reader.read_bool()? {
                (last_index + 1) as usize
            } else {
                reader.read_bits(entry_bits)? as usize
            };
            last_index = index as isize;
            if index >= usize::from(self.max_entries) {
                return Err(WireError::EntryIndexOutOfRange {
                    index,
                    max_entries: self.max_entries,
                });
            }

            let text = if reader.read_bool()? {
                Some(read_entry_text(reader, &history)?)
            } else {
                None
            };

            let extra_data = if reader.read_bool()? {
                let bits = if self.has_fixed_user_data() {
                    usize::from(self.fixed_user_data_size_bits)
                } else {
                    reader.read_bits(USER_DATA_LENGTH_BITS)? as usize * 8
                };
                Some(reader.read_bit_buf(bits)?)
            } else {
                None
            };

            if self.entries.len() <= index {
                self.entries.resize(index + 1, None);
            }
            let entry = self.entries[index].get_or_insert_with(StringTableEntry::default);
            if let Some(text) = text {
                entry.text = Some(String::from_utf8_lossy(&text).into_owned());
            }
            if extra_data.is_some() {
                entry.extra_data = extra_data;
            }

            history.push_back(entry.text.as_ref().map(|text| text.as_bytes().to_vec()));
            if history.len() > STRING_HISTORY_LEN {
                history.pop_front();
            }
        }
        Ok(())
    }

    /// Encodes every present entry.
    ///
    /// The output is canonical: text is written literally, never as a
    /// substring reference. With `previous`, text equal to the previous
    /// entry at the same index is omitted.
    pub fn encode_entries(
        &self,
        writer: &mut BitWriter,
        previous: Option<&[Option<StringTableEntry>]>,
    ) -> WireResult<()> {
        let entry_bits = self.entry_bits();
        let mut last_index: isize = -1;

        for (index, entry) in self.entries.iter().enumerate() {
            let Some(entry) = entry else {
                continue;
            };
            if index >= usize::from(self.max_entries) {
                return Err(WireError::EntryIndexOutOfRange {
                    index,
                    max_entries: self.max_entries,
                });
            }

            if index as isize == last_index + 1 {
                writer.write_bool(true);
            } else {
                writer.write_bool(false);
                writer.write_bits(index as u64, entry_bits)?;
            }
            last_index = index as isize;

            let old_text = previous
                .and_then(|old| old.get(index))
                .and_then(Option::as_ref)
                .and_then(|old| old.text.as_deref());
            match entry.text.as_deref() {
                Some(text) if old_text != Some(text) => {
                    check_text(text)?;
                    writer.write_bool(true);
                    writer.write_bool(false);
                    writer.write_string(text, None);
                }
                _ => writer.write_bool(false),
            }

            match &entry.extra_data {
                Some(data) => {
                    writer.write_bool(true);
                    self.write_user_data(writer, data)?;
                }
                None => writer.write_bool(false),
            }
        }
        Ok(())
    }

    /// Upper bound of the encoded entry list size in bytes.
    #[must_use]
    pub fn guess_encoded_len(&self) -> usize {
        let index_bits = 1 + self.entry_bits();
        let bits: usize = self
            .entries
            .iter()
            .flatten()
            .map(|entry| {
                let text_bits = entry.text.as_ref().map_or(0, |text| (text.len() + 1) * 8);
                let data_bits = entry
                    .extra_data
                    .as_ref()
                    .map_or(0, |data| USER_DATA_LENGTH_BITS + data.bit_len().max(self.fixed_bits()) + 8);
                index_bits + 3 + text_bits + data_bits
            })
            .sum();
        bits.div_ceil(8) + 1
    }

    fn fixed_bits(&self) -> usize {
        usize::from(self.fixed_user_data_size_bits)
    }

    fn write_user_data(&self, writer: &mut BitWriter, data: &BitBuf) -> WireResult<()> {
        if self.has_fixed_user_data() {
            let width = self.fixed_bits();
            if data.bit_len() > width {
                return Err(WireError::UserDataTooLong {
                    bits: data.bit_len(),
                    max_bits: width,
                });
            }
            writer.write_bit_buf(data);
            pad(writer, width - data.bit_len());
        } else {
            let bytes = data.bit_len().div_ceil(8);
            let max_bytes = (1usize << USER_DATA_LENGTH_BITS) - 1;
            if bytes > max_bytes {
                return Err(WireError::UserDataTooLong {
                    bits: data.bit_len(),
                    max_bits: max_bytes * 8,
                });
            }
            writer.write_bits(bytes as u64, USER_DATA_LENGTH_BITS)?;
            writer.write_bit_buf(data);
            pad(writer, bytes * 8 - data.bit_len());
        }
        Ok(())
    }
}

fn read_entry_text(
    reader: &mut BitReader<'_>,
    history: &VecDeque<Option<Vec<u8>>>,
) -> WireResult<Vec<u8>> {
    if !reader.read_bool()? {
        return Ok(reader.read_string_bytes(None)?);
    }

    let index = reader.read_bits(SUBSTRING_INDEX_BITS)? as usize;
    let copy = reader.read_bits(SUBSTRING_LENGTH_BITS)? as usize;
    let suffix = reader.read_string_bytes(None)?;

    let base = history
        .get(index)
        .ok_or(WireError::InvalidSubstringReference {
            index,
            history_len: history.len(),
        })?;
    let mut text = base
        .as_deref()
        .map(|base| base[..copy.min(base.len())].to_vec())
        .unwrap_or_default();
    text.extend_from_slice(&suffix);
    Ok(text)
}

/// Rejects text that a null terminator would cut short on the wire.
pub(crate) fn check_text(text: &str) -> WireResult<()> {
    if text.contains('\0') {
        return Err(WireError::EmbeddedNul {
            text: text.to_owned(),
        });
    }
    Ok(())
}

fn pad(writer: &mut BitWriter, bits: usize) {
    for _ in 0..bits {
        writer.write_bool(false);
    }
}
