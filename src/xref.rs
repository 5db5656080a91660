//! Cross-reference table parser.
//!
//! The xref table maps object numbers to byte offsets, enabling random access
//! to indirect objects. Classic tables (PDF 1.0-1.4 syntax) are parsed,
//! following `/Prev` chains of incremental updates. When the table is
//! damaged, [`reconstruct_xref`] rebuilds one by scanning for `N G obj`
//! headers.

use crate::error::{Error, Result};
use crate::object::{Dict, Object, ObjectRef};
use crate::parser::{parse_indirect_object, parse_object};
use std::collections::{BTreeMap, HashSet};

/// Limit on `/Prev` chain length.
const MAX_PREV_CHAIN: usize = 100;

/// Cross-reference table entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct XRefEntry {
    /// Byte offset of the object (or next free object number for free entries)
    pub offset: u64,
    /// Generation number
    pub generation: u16,
    /// Whether the object is in use
    pub in_use: bool,
}

impl XRefEntry {
    /// Create an in-use entry.
    pub fn in_use(offset: u64, generation: u16) -> Self {
        Self {
            offset,
            generation,
            in_use: true,
        }
    }

    /// Create a free entry.
    pub fn free(next_free: u64, generation: u16) -> Self {
        Self {
            offset: next_free,
            generation,
            in_use: false,
        }
    }
}

/// Cross-reference table that maps object numbers to their locations.
#[derive(Debug, Clone, Default)]
pub struct CrossRefTable {
    entries: BTreeMap<u32, XRefEntry>,
    trailer: Option<Dict>,
}

impl CrossRefTable {
    /// Create a new empty cross-reference table.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the trailer dictionary.
    pub fn set_trailer(&mut self, trailer: Dict) {
        self.trailer = Some(trailer);
    }

    /// Get the trailer dictionary if present.
    pub fn trailer(&self) -> Option<&Dict> {
        self.trailer.as_ref()
    }

    /// Take ownership of the trailer dictionary.
    pub fn take_trailer(&mut self) -> Option<Dict> {
        self.trailer.take()
    }

    /// Add an entry to the cross-reference table.
    pub fn add_entry(&mut self, object_number: u32, entry: XRefEntry) {
        self.entries.insert(object_number, entry);
    }

    /// Get an entry by object number.
    pub fn get(&self, object_number: u32) -> Option<&XRefEntry> {
        self.entries.get(&object_number)
    }

    /// Check if an in-use object with this number exists.
    pub fn contains(&self, object_number: u32) -> bool {
        self.entries.get(&object_number).is_some_and(|e| e.in_use)
    }

    /// References of all in-use objects, ascending by object number.
    pub fn in_use_refs(&self) -> impl Iterator<Item = ObjectRef> + '_ {
        self.entries
            .iter()
            .filter(|(_, e)| e.in_use)
            .map(|(&id, e)| ObjectRef::new(id, e.generation))
    }

    /// Merge entries from an older section; entries already present win.
    pub fn merge_from(&mut self, other: CrossRefTable) {
        for (obj_num, entry) in other.entries {
            self.entries.entry(obj_num).or_insert(entry);
        }
        if self.trailer.is_none() {
            self.trailer = other.trailer;
        }
    }

    /// Get the number of entries in the table.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Check if the table is empty.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// Split off one line, accepting CR, LF and CRLF endings.
fn next_line(data: &[u8], pos: usize) -> Option<(&[u8], usize)> {
    if pos >= data.len() {
        return None;
    }
    let rest = &data[pos..];
    match rest.iter().position(|&c| c == b'\r' || c == b'\n') {
        Some(end) => {
            let mut next = pos + end + 1;
            if rest[end] == b'\r' && rest.get(end + 1) == Some(&b'\n') {
                next += 1;
            }
            Some((&rest[..end], next))
        },
        None => Some((rest, data.len())),
    }
}

/// Find the byte offset of the xref section from the `startxref` keyword.
///
/// Only the last 2 KB of the file are searched.
pub fn find_xref_offset(data: &[u8]) -> Result<u64> {
    let tail_start = data.len().saturating_sub(2048);
    let tail = &data[tail_start..];
    let keyword = b"startxref";

    let pos = tail
        .windows(keyword.len())
        .rposition(|w| w == keyword)
        .ok_or(Error::InvalidXref)?;

    String::from_utf8_lossy(&tail[pos + keyword.len()..])
        .split_whitespace()
        .next()
        .and_then(|s| s.parse::<u64>().ok())
        .ok_or(Error::InvalidXref)
}

/// Parse the xref section at `offset`, following `/Prev` pointers.
pub fn parse_xref(data: &[u8], offset: u64) -> Result<CrossRefTable> {
    let mut visited = HashSet::new();
    let mut next = Some(offset);
    let mut merged: Option<CrossRefTable> = None;

    while let Some(offset) = next {
        if !visited.insert(offset) {
            log::warn!("xref /Prev chain loops back to offset {}", offset);
            break;
        }
        if visited.len() > MAX_PREV_CHAIN {
            return Err(Error::InvalidPdf(format!(
                "xref /Prev chain longer than {}",
                MAX_PREV_CHAIN
            )));
        }

        let section = parse_traditional_xref(data, offset)?;
        next = section
            .trailer()
            .and_then(|t| t.get("Prev"))
            .and_then(Object::as_integer)
            .and_then(|p| u64::try_from(p).ok());

        merged = Some(match merged {
            Some(mut newer) => {
                newer.merge_from(section);
                newer
            },
            None => section,
        });
    }

    merged.ok_or(Error::InvalidXref)
}

/// Parse a classic cross-reference table.
///
/// ```text
/// xref
/// 0 3
/// 0000000000 65535 f
/// 0000000015 00000 n
/// 0000000079 00000 n
/// trailer
/// << /Size 3 /Root 1 0 R >>
/// ```
fn parse_traditional_xref(data: &[u8], offset: u64) -> Result<CrossRefTable> {
    let start = usize::try_from(offset).map_err(|_| Error::InvalidXref)?;
    if start >= data.len() {
        return Err(Error::InvalidXref);
    }

    let mut pos = start;
    loop {
        let (line, next) = next_line(data, pos).ok_or(Error::InvalidXref)?;
        let trimmed = String::from_utf8_lossy(line);
        let trimmed = trimmed.trim();
        pos = next;
        if trimmed.is_empty() {
            continue;
        }
        if trimmed == "xref" {
            break;
        }
        if trimmed.starts_with(|c: char| c.is_ascii_digit()) {
            return Err(Error::Unsupported("cross-reference streams".to_string()));
        }
        return Err(Error::InvalidXref);
    }

    let mut xref = CrossRefTable::new();
    let mut subsection: Option<(u32, u32, u32)> = None; // (start, count, read)

    loop {
        let line_start = pos;
        let (line, next) = next_line(data, pos).ok_or(Error::InvalidXref)?;
        pos = next;
        let text = String::from_utf8_lossy(line);
        let text = text.trim();

        if text.is_empty() || text.starts_with('%') {
            continue;
        }

        if text.starts_with("trailer") {
            let keyword = line
                .windows(7)
                .position(|w| w == b"trailer")
                .ok_or(Error::InvalidXref)?;
            let keyword_end = line_start + keyword + 7;
            let (_, trailer) = parse_object(&data[keyword_end..]).map_err(|_| {
                Error::ParseError {
                    offset: keyword_end,
                    reason: "unreadable trailer dictionary".to_string(),
                }
            })?;
            match trailer {
                Object::Dictionary(dict) => xref.set_trailer(dict),
                other => {
                    return Err(Error::InvalidObjectType {
                        expected: "Dictionary".to_string(),
                        found: other.type_name().to_string(),
                    })
                },
            }
            return Ok(xref);
        }

        let parts: Vec<&str> = text.split_whitespace().collect();
        match (subsection, parts.as_slice()) {
            (Some((first, count, read)), [offset, generation, flag, ..]) if read < count => {
                let object_number = first + read;
                let entry = match (offset.parse::<u64>(), generation.parse::<u16>(), *flag) {
                    (Ok(offset), Ok(generation), "n") => XRefEntry::in_use(offset, generation),
                    (Ok(offset), Ok(generation), "f") => XRefEntry::free(offset, generation),
                    _ => {
                        log::warn!("Malformed xref entry for object {}: {:?}", object_number, text);
                        XRefEntry::free(0, 65535)
                    },
                };
                xref.add_entry(object_number, entry);
                subsection = Some((first, count, read + 1));
            },
            (_, [first, count]) => {
                let first = first.parse().map_err(|_| Error::InvalidXref)?;
                let count: u32 = count.parse().map_err(|_| Error::InvalidXref)?;
                if count > 1_000_000 {
                    return Err(Error::InvalidPdf(
                        "xref subsection count exceeds limit".to_string(),
                    ));
                }
                subsection = Some((first, count, 0));
            },
            _ => {
                log::warn!("Skipping unexpected xref line: {:?}", text);
            },
        }
    }
}

/// Rebuild a cross-reference table by scanning the whole file.
///
/// Later definitions of the same object number win, matching incremental
/// update semantics. The trailer is taken from the last `trailer` keyword;
/// without one, a `/Root` is synthesized from the first `/Type /Catalog`
/// object found.
pub fn reconstruct_xref(data: &[u8]) -> Result<CrossRefTable> {
    let mut xref = CrossRefTable::new();
    let mut catalog: Option<ObjectRef> = None;
    let mut pos = 0;

    while let Some((line, next)) = next_line(data, pos) {
        let indent = line.iter().take_while(|c| c.is_ascii_whitespace()).count();
        if line.get(indent).is_some_and(u8::is_ascii_digit) {
            let at = pos + indent;
            if let Ok((_, (obj_ref, obj))) = parse_indirect_object(&data[at..]) {
                xref.add_entry(obj_ref.id, XRefEntry::in_use(at as u64, obj_ref.gen));
                let is_catalog = obj
                    .as_dict()
                    .and_then(|d| d.get("Type"))
                    .and_then(Object::as_name)
                    == Some("Catalog");
                if is_catalog && catalog.is_none() {
                    catalog = Some(obj_ref);
                }
            }
        }
        pos = next;
    }

    if xref.is_empty() {
        return Err(Error::InvalidXref);
    }

    let keyword = b"trailer";
    let trailer = data
        .windows(keyword.len())
        .rposition(|w| w == keyword)
        .and_then(|p| parse_object(&data[p + keyword.len()..]).ok())
        .and_then(|(_, obj)| match obj {
            Object::Dictionary(d) => Some(d),
            _ => None,
        });

    let trailer = match (trailer, catalog) {
        (Some(t), _) => t,
        (None, Some(root)) => {
            let mut t = Dict::new();
            t.insert("Root".to_string(), Object::Reference(root));
            t
        },
        (None, None) => return Err(Error::InvalidPdf("no trailer and no catalog".to_string())),
    };

    log::info!("Reconstructed xref with {} objects", xref.len());
    xref.set_trailer(trailer);
    Ok(xref)
}
