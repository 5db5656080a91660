//! PDF object types.
//!
//! Dictionaries keep their entries in declared order so that a projected tree
//! lists children exactly as the file declares them.

use indexmap::IndexMap;

/// Ordered PDF dictionary.
pub type Dict = IndexMap<String, Object>;

/// PDF object representation.
#[derive(Debug, Clone, PartialEq)]
pub enum Object {
    /// Null object
    Null,
    /// Boolean value
    Boolean(bool),
    /// Integer value
    Integer(i64),
    /// Real (floating-point) value
    Real(f64),
    /// String (byte array)
    String(Vec<u8>),
    /// Name (starting with /)
    Name(String),
    /// Array of objects
    Array(Vec<Object>),
    /// Dictionary (key-value pairs, declared order)
    Dictionary(Dict),
    /// Stream (dictionary + raw, still-encoded data)
    Stream {
        /// Stream dictionary
        dict: Dict,
        /// Stream data
        data: bytes::Bytes,
    },
    /// Indirect object reference
    Reference(ObjectRef),
}

/// Reference to an indirect object.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ObjectRef {
    /// Object number
    pub id: u32,
    /// Generation number
    pub gen: u16,
}

impl ObjectRef {
    /// Create a new object reference.
    pub fn new(id: u32, gen: u16) -> Self {
        Self { id, gen }
    }
}

impl std::fmt::Display for ObjectRef {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} {} R", self.id, self.gen)
    }
}

impl Object {
    /// Variant name, for diagnostics.
    pub fn type_name(&self) -> &'static str {
        match self {
            Object::Null => "Null",
            Object::Boolean(_) => "Boolean",
            Object::Integer(_) => "Integer",
            Object::Real(_) => "Real",
            Object::String(_) => "String",
            Object::Name(_) => "Name",
            Object::Array(_) => "Array",
            Object::Dictionary(_) => "Dictionary",
            Object::Stream { .. } => "Stream",
            Object::Reference(_) => "Reference",
        }
    }

    /// The value of an integer.
    pub fn as_integer(&self) -> Option<i64> {
        if let Object::Integer(i) = self {
            Some(*i)
        } else {
            None
        }
    }

    /// The text of a name, without the leading `/`.
    pub fn as_name(&self) -> Option<&str> {
        if let Object::Name(n) = self {
            Some(n)
        } else {
            None
        }
    }

    /// Entries of a dictionary, or of a stream's dictionary.
    pub fn as_dict(&self) -> Option<&Dict> {
        match self {
            Object::Dictionary(dict) | Object::Stream { dict, .. } => Some(dict),
            _ => None,
        }
    }

    /// Items of an array.
    pub fn as_array(&self) -> Option<&[Object]> {
        if let Object::Array(items) = self {
            Some(items)
        } else {
            None
        }
    }

    /// `/Type` of a dictionary or stream.
    fn declared_type(&self) -> Option<&str> {
        self.as_dict()?.get("Type")?.as_name()
    }

    /// Short one-line rendering used for tree labels.
    ///
    /// Containers are summarised by size; strings are shown lossily and
    /// truncated.
    pub fn summary(&self) -> String {
        const MAX_CHARS: usize = 40;
        match self {
            Object::Null => "null".to_string(),
            Object::Boolean(b) => b.to_string(),
            Object::Integer(i) => i.to_string(),
            Object::Real(r) => r.to_string(),
            Object::String(s) => {
                let text = String::from_utf8_lossy(s);
                match text.char_indices().nth(MAX_CHARS) {
                    Some((cut, _)) => format!("({}...)", &text[..cut]),
                    None => format!("({})", text),
                }
            },
            Object::Name(n) => format!("/{}", n),
            Object::Array(items) => format!("Array [{} items]", items.len()),
            Object::Dictionary(d) => match self.declared_type() {
                Some(t) => format!("Dictionary /{}", t),
                None => format!("Dictionary <<{} entries>>", d.len()),
            },
            Object::Stream { data, .. } => match self.declared_type() {
                Some(t) => format!("Stream /{} ({} bytes)", t, data.len()),
                None => format!("Stream ({} bytes)", data.len()),
            },
            Object::Reference(r) => r.to_string(),
        }
    }
}
