//! PDF object serialization.
//!
//! Turns [`Object`] values into PDF syntax (ISO 32000-1:2008, 7.3).
//! Dictionary entries come out in their stored order, so the same object
//! always serializes to the same bytes.

use crate::error::Result;
use crate::object::{Dict, Object};
use std::io::{self, Write};

/// Whitespace policy of a serializer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
enum Layout {
    /// One dictionary entry per line, indented by nesting depth.
    #[default]
    Pretty,
    /// Single spaces between tokens only.
    Compact,
}

/// Serializer for PDF objects.
#[derive(Debug, Clone, Default)]
pub struct ObjectSerializer {
    layout: Layout,
}

impl ObjectSerializer {
    /// Create a serializer with readable, indented output.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a serializer with minimal whitespace.
    pub fn compact() -> Self {
        Self {
            layout: Layout::Compact,
        }
    }

    /// Serialize an object to bytes.
    pub fn serialize(&self, obj: &Object) -> Result<Vec<u8>> {
        let mut buf = Vec::new();
        self.write_object(&mut buf, obj)?;
        Ok(buf)
    }

    /// Serialize an object to a string, replacing non-UTF-8 stream bytes.
    pub fn serialize_to_string(&self, obj: &Object) -> Result<String> {
        Ok(String::from_utf8_lossy(&self.serialize(obj)?).into_owned())
    }

    /// Write `id gen obj`, the object and `endobj`.
    pub fn write_indirect<W: Write>(&self, w: &mut W, id: u32, gen: u16, obj: &Object) -> io::Result<()> {
        writeln!(w, "{} {} obj", id, gen)?;
        self.write_object(w, obj)?;
        w.write_all(b"\nendobj\n")
    }

    /// Write a direct object.
    pub fn write_object<W: Write>(&self, w: &mut W, obj: &Object) -> io::Result<()> {
        self.emit(w, obj, 0)
    }

    fn emit<W: Write>(&self, w: &mut W, obj: &Object, depth: usize) -> io::Result<()> {
        match obj {
            Object::Null => w.write_all(b"null"),
            Object::Boolean(true) => w.write_all(b"true"),
            Object::Boolean(false) => w.write_all(b"false"),
            Object::Integer(i) => write!(w, "{}", i),
            Object::Real(r) => w.write_all(format_real(*r).as_bytes()),
            Object::String(s) => write_string(w, s),
            Object::Name(n) => write_name(w, n),
            Object::Array(items) => {
                w.write_all(b"[")?;
                for (i, item) in items.iter().enumerate() {
                    if i > 0 {
                        w.write_all(b" ")?;
                    }
                    self.emit(w, item, depth + 1)?;
                }
                w.write_all(b"]")
            },
            Object::Dictionary(dict) => self.emit_dict(w, dict, depth),
            Object::Stream { dict, data } => {
                let mut dict = dict.clone();
                dict.insert("Length".to_string(), Object::Integer(data.len() as i64));
                self.emit_dict(w, &dict, depth)?;
                w.write_all(b"\nstream\n")?;
                w.write_all(data)?;
                w.write_all(b"\nendstream")
            },
            Object::Reference(r) => write!(w, "{} {} R", r.id, r.gen),
        }
    }

    fn emit_dict<W: Write>(&self, w: &mut W, dict: &Dict, depth: usize) -> io::Result<()> {
        if dict.is_empty() {
            return w.write_all(b"<<>>");
        }
        w.write_all(b"<<")?;
        for (i, (key, value)) in dict.iter().enumerate() {
            match self.layout {
                Layout::Pretty => write!(w, "\n{:width$}", "", width = 2 * (depth + 1))?,
                Layout::Compact if i > 0 => w.write_all(b" ")?,
                Layout::Compact => {},
            }
            write_name(w, key)?;
            w.write_all(b" ")?;
            self.emit(w, value, depth + 1)?;
        }
        if self.layout == Layout::Pretty {
            write!(w, "\n{:width$}", "", width = 2 * depth)?;
        }
        w.write_all(b">>")
    }
}

/// Shortest decimal form with at most five fractional digits.
///
/// PDF has no syntax for NaN or infinities; those are written as `0`.
fn format_real(value: f64) -> String {
    if !value.is_finite() {
        return "0".to_string();
    }
    if value.fract() == 0.0 && value.abs() < 1e15 {
        return format!("{}", value as i64);
    }
    let fixed = format!("{:.5}", value);
    let trimmed = fixed.trim_end_matches('0').trim_end_matches('.');
    match trimmed {
        "-0" => "0".to_string(),
        other => other.to_string(),
    }
}

/// Escape sequence for a byte inside a literal string, if it needs one.
fn literal_escape(byte: u8) -> Option<&'static [u8]> {
    match byte {
        b'(' => Some(b"\\("),
        b')' => Some(b"\\)"),
        b'\\' => Some(b"\\\\"),
        b'\n' => Some(b"\\n"),
        b'\r' => Some(b"\\r"),
        b'\t' => Some(b"\\t"),
        _ => None,
    }
}

/// Literal `(...)` when every byte is printable ASCII or a common control,
/// hex `<...>` otherwise.
fn write_string<W: Write>(w: &mut W, data: &[u8]) -> io::Result<()> {
    let literal = data
        .iter()
        .all(|&b| matches!(b, b'\n' | b'\r' | b'\t' | 0x20..=0x7E));
    if !literal {
        w.write_all(b"<")?;
        for byte in data {
            write!(w, "{:02X}", byte)?;
        }
        return w.write_all(b">");
    }

    w.write_all(b"(")?;
    for &byte in data {
        match literal_escape(byte) {
            Some(escaped) => w.write_all(escaped)?,
            None => w.write_all(&[byte])?,
        }
    }
    w.write_all(b")")
}

/// Regular characters may appear unescaped in a name.
fn is_regular(byte: u8) -> bool {
    (0x21..=0x7E).contains(&byte)
        && !matches!(byte, b'(' | b')' | b'<' | b'>' | b'[' | b']' | b'{' | b'}' | b'/' | b'%' | b'#')
}

fn write_name<W: Write>(w: &mut W, name: &str) -> io::Result<()> {
    w.write_all(b"/")?;
    for byte in name.bytes() {
        if is_regular(byte) {
            w.write_all(&[byte])?;
        } else {
            write!(w, "#{:02X}", byte)?;
        }
    }
    Ok(())
}
